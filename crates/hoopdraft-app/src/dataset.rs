// Dataset files: raw player records on disk, normalized into the draft pool.
//
// A dataset named `proj_25_26` lives at `<dir>/proj_25_26.json` (an array of
// records, or an object with a `players` array) or, failing that,
// `<dir>/proj_25_26.csv` (header row, one record per line).

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use hoopdraft_core::player::{normalize_records, Player};
use serde_json::{Map, Value};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset `{name}` is not configured (`dataset` lists the choices)")]
    NotConfigured { name: String },

    #[error("invalid dataset name `{name}`: expected a plain file stem")]
    InvalidName { name: String },

    #[error("dataset `{name}` not found in {dir} (looked for .json and .csv)")]
    NotFound { name: String, dir: PathBuf },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path}: expected an array of records or an object with a `players` array")]
    Format { path: String },

    #[error("dataset {path} contains no players")]
    Empty { path: String },
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

/// Raw records from a JSON document.
fn records_from_json(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(records) => Some(records),
        Value::Object(mut fields) => match fields.remove("players") {
            Some(Value::Array(records)) => Some(records),
            _ => None,
        },
        _ => None,
    }
}

/// Raw records from CSV: every cell becomes a string field keyed by its
/// header. Malformed rows are skipped.
fn records_from_csv<R: Read>(rdr: R) -> Result<Vec<Value>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut records = Vec::new();
    for (idx, result) in reader.deserialize::<HashMap<String, String>>().enumerate() {
        match result {
            Ok(row) => {
                let fields: Map<String, Value> = row
                    .into_iter()
                    .filter(|(_, cell)| !cell.is_empty())
                    .map(|(header, cell)| (header, Value::String(cell)))
                    .collect();
                records.push(Value::Object(fields));
            }
            Err(e) => warn!("skipping malformed CSV row {}: {}", idx + 1, e),
        }
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load and normalize a JSON dataset file.
pub fn load_json(path: &Path) -> Result<Vec<Player>, DatasetError> {
    let text = std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|e| DatasetError::Json {
        path: path.display().to_string(),
        source: e,
    })?;
    let records = records_from_json(value).ok_or_else(|| DatasetError::Format {
        path: path.display().to_string(),
    })?;
    non_empty(path, normalize_records(&records))
}

/// Load and normalize a CSV dataset file.
pub fn load_csv(path: &Path) -> Result<Vec<Player>, DatasetError> {
    let file = std::fs::File::open(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let records = records_from_csv(file).map_err(|e| DatasetError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    non_empty(path, normalize_records(&records))
}

/// Load the dataset `name` from `dir`, preferring JSON over CSV.
///
/// `name` must be a bare file stem; anything that could leave `dir` is
/// rejected.
pub fn load_dataset(dir: &Path, name: &str) -> Result<Vec<Player>, DatasetError> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(DatasetError::InvalidName {
            name: name.to_string(),
        });
    }

    let json_path = dir.join(format!("{name}.json"));
    let csv_path = dir.join(format!("{name}.csv"));

    let players = if json_path.is_file() {
        load_json(&json_path)?
    } else if csv_path.is_file() {
        load_csv(&csv_path)?
    } else {
        return Err(DatasetError::NotFound {
            name: name.to_string(),
            dir: dir.to_path_buf(),
        });
    };

    info!("Loaded dataset '{}': {} players", name, players.len());
    Ok(players)
}

fn non_empty(path: &Path, players: Vec<Player>) -> Result<Vec<Player>, DatasetError> {
    if players.is_empty() {
        return Err(DatasetError::Empty {
            path: path.display().to_string(),
        });
    }
    Ok(players)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
