// Configuration loading and parsing (draft.toml).

use std::io::Write;
use std::path::{Path, PathBuf};

use hoopdraft_core::draft::{SlotKind, SortKey, DEFAULT_TEAM_COUNT, DEFAULT_TOTAL_ROUNDS, STANDARD_ROSTER};
use hoopdraft_core::League;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Name of the only config file.
pub const CONFIG_FILE: &str = "draft.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub draft: DraftConfig,
    pub bot: BotConfig,
    pub data: DataConfig,
    pub datasets: Vec<DatasetOption>,
}

/// League and draft shape, with the roster and sort already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftConfig {
    pub num_teams: usize,
    pub total_rounds: u32,
    /// 1-based draft position of the human team. Clamped when a draft starts.
    pub user_pick: usize,
    pub roster: Vec<SlotKind>,
    pub default_sort: Option<SortKey>,
}

impl DraftConfig {
    pub fn league(&self) -> League {
        League::new(self.num_teams, self.roster.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BotConfig {
    /// Fixed RNG seed for reproducible drafts. Entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: String,
    pub default_dataset: String,
}

/// A selectable dataset: file stem plus display label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetOption {
    pub value: String,
    pub label: String,
}

impl DatasetOption {
    fn new(value: &str, label: &str) -> Self {
        DatasetOption {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

impl Config {
    /// Look up a dataset by its `value`.
    pub fn dataset(&self, value: &str) -> Option<&DatasetOption> {
        self.datasets.iter().find(|d| d.value == value)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            draft: DraftConfig {
                num_teams: DEFAULT_TEAM_COUNT,
                total_rounds: DEFAULT_TOTAL_ROUNDS,
                user_pick: 1,
                roster: STANDARD_ROSTER.to_vec(),
                default_sort: None,
            },
            bot: BotConfig::default(),
            data: DataConfig {
                dir: default_data_dir(),
                default_dataset: "proj_25_26".into(),
            },
            datasets: vec![
                DatasetOption::new("proj_25_26", "2025-26 Projected"),
                DatasetOption::new("avg_24_25", "2024-25 Average"),
                DatasetOption::new("total_24_25", "2024-25 Total"),
            ],
        }
    }
}

fn default_data_dir() -> String {
    "data".into()
}

fn default_user_pick() -> usize {
    1
}

// ---------------------------------------------------------------------------
// draft.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire draft.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    draft: DraftSection,
    #[serde(default)]
    bot: BotConfig,
    data: DataConfig,
    #[serde(default)]
    datasets: Vec<DatasetOption>,
}

#[derive(Debug, Clone, Deserialize)]
struct DraftSection {
    num_teams: usize,
    total_rounds: u32,
    #[serde(default = "default_user_pick")]
    user_pick: usize,
    #[serde(default)]
    roster: Option<Vec<String>>,
    #[serde(default)]
    default_sort: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/draft.toml` relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    parse_config(&text).map_err(|e| match e {
        ParseFailure::Toml(source) => ConfigError::ParseError { path, source },
        ParseFailure::Invalid(e) => e,
    })
}

enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(ConfigError),
}

fn parse_config(text: &str) -> Result<Config, ParseFailure> {
    let file: ConfigFile = toml::from_str(text).map_err(ParseFailure::Toml)?;
    assemble(file).map_err(ParseFailure::Invalid)
}

/// Turn the raw file into a typed config, validating as it goes.
fn assemble(file: ConfigFile) -> Result<Config, ConfigError> {
    let roster = match file.draft.roster {
        None => STANDARD_ROSTER.to_vec(),
        Some(names) => names
            .iter()
            .map(|name| {
                SlotKind::from_str_slot(name)
                    .ok_or_else(|| ConfigError::invalid("draft.roster", format!("unknown slot `{name}`")))
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    let default_sort = match file.draft.default_sort.as_deref() {
        None | Some("default") => None,
        Some(key) => Some(SortKey::from_str_key(key).ok_or_else(|| {
            ConfigError::invalid("draft.default_sort", format!("unknown sort key `{key}`"))
        })?),
    };

    let config = Config {
        draft: DraftConfig {
            num_teams: file.draft.num_teams,
            total_rounds: file.draft.total_rounds,
            user_pick: file.draft.user_pick,
            roster,
            default_sort,
        },
        bot: file.bot,
        data: file.data,
        datasets: if file.datasets.is_empty() {
            Config::default().datasets
        } else {
            file.datasets
        },
    };

    validate(&config)?;
    Ok(config)
}

/// Seed `config/` with every file in `defaults/` it does not have yet.
/// Returns the paths written; a file already in `config/` is left as is.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    match (defaults_dir.is_dir(), config_dir.is_dir()) {
        (false, true) => return Ok(Vec::new()),
        (false, false) => {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "{} has neither defaults/ nor config/; start hoopdraft from the app directory",
                    base_dir.display()
                ),
            })
        }
        _ => {}
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| seed_error("create", &config_dir, e))?;
    let entries =
        std::fs::read_dir(&defaults_dir).map_err(|e| seed_error("list", &defaults_dir, e))?;

    let mut seeded = Vec::new();
    for entry in entries {
        let source = entry.map_err(|e| seed_error("list", &defaults_dir, e))?.path();
        if !source.is_file() {
            continue;
        }
        let Some(file_name) = source.file_name() else {
            continue;
        };
        let target = config_dir.join(file_name);
        if seed_file(&source, &target)? {
            info!("Seeded {} from defaults", target.display());
            seeded.push(target);
        }
    }
    Ok(seeded)
}

/// Copy `source` to `target` unless `target` exists. `create_new` makes the
/// existence check and the creation one step.
fn seed_file(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(seed_error("create", target, e)),
    };
    let content = std::fs::read(source).map_err(|e| seed_error("read", source, e))?;
    dest.write_all(&content).map_err(|e| seed_error("write", target, e))?;
    Ok(true)
}

fn seed_error(action: &str, path: &Path, err: std::io::Error) -> ConfigError {
    ConfigError::DefaultsCopyError {
        message: format!("failed to {action} {}: {err}", path.display()),
    }
}

/// Load config relative to the current working directory, seeding
/// `config/` from `defaults/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.draft.num_teams == 0 {
        return Err(ConfigError::invalid("draft.num_teams", "must be greater than 0"));
    }
    if config.draft.total_rounds == 0 {
        return Err(ConfigError::invalid("draft.total_rounds", "must be greater than 0"));
    }
    if config.draft.roster.is_empty() {
        return Err(ConfigError::invalid("draft.roster", "must list at least one slot"));
    }
    if config.data.dir.trim().is_empty() {
        return Err(ConfigError::invalid("data.dir", "must not be empty"));
    }
    if config.dataset(&config.data.default_dataset).is_none() {
        return Err(ConfigError::invalid(
            "data.default_dataset",
            format!("`{}` is not listed in [[datasets]]", config.data.default_dataset),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
