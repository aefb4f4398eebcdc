// Library root: re-exports all modules so integration tests and the
// `hoopdraft` binary share one public API.

pub mod app;
pub mod command;
pub mod config;
pub mod dataset;
pub mod display;
pub mod session;
