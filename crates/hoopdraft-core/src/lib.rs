// Library root: the snake-draft engine. Pure state transitions over
// immutable snapshots; no I/O.

pub mod draft;
pub mod player;

pub use draft::{DraftPick, DraftState, League, PickError, SlotKind, SortKey};
pub use player::{normalize_records, Player, PlayerId, PlayerMeta, StatKey};
