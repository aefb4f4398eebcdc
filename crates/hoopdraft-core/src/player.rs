// Canonical player records, stable identifiers, and raw-record normalization.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

use crate::draft::pick::Position;

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A draftable player.
///
/// `player` is the composite identity string, e.g. `"Luka Doncic DAL - PG,SG"`.
/// Every numeric attribute is finite; the normalizer guarantees this for
/// records that come from raw input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(default)]
    pub expert_rank: f64,
    #[serde(default)]
    pub rank: f64,
    #[serde(default)]
    pub adp: f64,
    pub player: String,
    #[serde(default)]
    pub gp: f64,
    #[serde(default)]
    pub fg_pct: f64,
    #[serde(default)]
    pub ft_pct: f64,
    #[serde(default)]
    pub threes: f64,
    #[serde(default)]
    pub pts: f64,
    #[serde(default)]
    pub reb: f64,
    #[serde(default)]
    pub ast: f64,
    #[serde(default)]
    pub stl: f64,
    #[serde(default)]
    pub blk: f64,
    #[serde(default)]
    pub to: f64,
}

impl Player {
    /// A player with the given identity string and every numeric field zeroed.
    pub fn new(identity: impl Into<String>) -> Self {
        Player {
            expert_rank: 0.0,
            rank: 0.0,
            adp: 0.0,
            player: identity.into(),
            gp: 0.0,
            fg_pct: 0.0,
            ft_pct: 0.0,
            threes: 0.0,
            pts: 0.0,
            reb: 0.0,
            ast: 0.0,
            stl: 0.0,
            blk: 0.0,
            to: 0.0,
        }
    }

    /// Builder-style setter for a single numeric attribute.
    pub fn with_stat(mut self, key: StatKey, value: f64) -> Self {
        *self.stat_mut(key) = if value.is_finite() { value } else { 0.0 };
        self
    }

    /// Stable identifier derived from the identity string.
    ///
    /// Falls back to `"{expert_rank}-{rank}-{adp}"` when the identity string
    /// is empty so that anonymous records still get distinct keys.
    pub fn id(&self) -> PlayerId {
        if self.player.is_empty() {
            PlayerId::from_identity(&format!("{}-{}-{}", self.expert_rank, self.rank, self.adp))
        } else {
            PlayerId::from_identity(&self.player)
        }
    }

    /// Name, pro team and listed positions parsed from the identity string.
    pub fn meta(&self) -> PlayerMeta {
        PlayerMeta::parse(&self.player)
    }

    /// Positions this player is eligible at. Unknown tokens are dropped.
    pub fn positions(&self) -> Vec<Position> {
        position_tokens(&self.player)
            .filter_map(Position::from_str_pos)
            .collect()
    }

    /// Read a numeric attribute by key.
    pub fn stat(&self, key: StatKey) -> f64 {
        match key {
            StatKey::ExpertRank => self.expert_rank,
            StatKey::Rank => self.rank,
            StatKey::Adp => self.adp,
            StatKey::Gp => self.gp,
            StatKey::FgPct => self.fg_pct,
            StatKey::FtPct => self.ft_pct,
            StatKey::Threes => self.threes,
            StatKey::Pts => self.pts,
            StatKey::Reb => self.reb,
            StatKey::Ast => self.ast,
            StatKey::Stl => self.stl,
            StatKey::Blk => self.blk,
            StatKey::To => self.to,
        }
    }

    fn stat_mut(&mut self, key: StatKey) -> &mut f64 {
        match key {
            StatKey::ExpertRank => &mut self.expert_rank,
            StatKey::Rank => &mut self.rank,
            StatKey::Adp => &mut self.adp,
            StatKey::Gp => &mut self.gp,
            StatKey::FgPct => &mut self.fg_pct,
            StatKey::FtPct => &mut self.ft_pct,
            StatKey::Threes => &mut self.threes,
            StatKey::Pts => &mut self.pts,
            StatKey::Reb => &mut self.reb,
            StatKey::Ast => &mut self.ast,
            StatKey::Stl => &mut self.stl,
            StatKey::Blk => &mut self.blk,
            StatKey::To => &mut self.to,
        }
    }
}

// ---------------------------------------------------------------------------
// Numeric attribute keys
// ---------------------------------------------------------------------------

/// The numeric attributes carried by every [`Player`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    ExpertRank,
    Rank,
    Adp,
    Gp,
    FgPct,
    FtPct,
    Threes,
    Pts,
    Reb,
    Ast,
    Stl,
    Blk,
    To,
}

impl StatKey {
    pub const ALL: [StatKey; 13] = [
        StatKey::ExpertRank,
        StatKey::Rank,
        StatKey::Adp,
        StatKey::Gp,
        StatKey::FgPct,
        StatKey::FtPct,
        StatKey::Threes,
        StatKey::Pts,
        StatKey::Reb,
        StatKey::Ast,
        StatKey::Stl,
        StatKey::Blk,
        StatKey::To,
    ];

    /// Canonical field name, as used in normalized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKey::ExpertRank => "expert_rank",
            StatKey::Rank => "rank",
            StatKey::Adp => "adp",
            StatKey::Gp => "gp",
            StatKey::FgPct => "fg_pct",
            StatKey::FtPct => "ft_pct",
            StatKey::Threes => "threes",
            StatKey::Pts => "pts",
            StatKey::Reb => "reb",
            StatKey::Ast => "ast",
            StatKey::Stl => "stl",
            StatKey::Blk => "blk",
            StatKey::To => "to",
        }
    }

    /// Whether the attribute is a shooting percentage.
    pub fn is_percentage(&self) -> bool {
        matches!(self, StatKey::FgPct | StatKey::FtPct)
    }

    /// Raw field names accepted for this attribute, in folded form
    /// (see [`fold_key`]).
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            StatKey::ExpertRank => &["expertrank", "ecr", "expert", "rankecr"],
            StatKey::Rank => &["rank", "rk", "overallrank"],
            StatKey::Adp => &["adp", "avgpick", "averagedraftposition"],
            StatKey::Gp => &["gp", "games", "g"],
            StatKey::FgPct => &["fgpct", "fg", "fieldgoalpct"],
            StatKey::FtPct => &["ftpct", "ft", "freethrowpct"],
            StatKey::Threes => &["threes", "3pm", "3ptm", "fg3m", "tpm"],
            StatKey::Pts => &["pts", "points"],
            StatKey::Reb => &["reb", "rebounds"],
            StatKey::Ast => &["ast", "assists"],
            StatKey::Stl => &["stl", "steals"],
            StatKey::Blk => &["blk", "blocks"],
            StatKey::To => &["to", "tov", "turnovers"],
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Stable identifier
// ---------------------------------------------------------------------------

/// Normalized identity key used for equality across dataset reloads.
///
/// Diacritics are stripped, the text is lower-cased, and every run of
/// characters outside `[a-z0-9]` becomes a single `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn from_identity(source: &str) -> Self {
        let folded: String = source
            .nfd()
            .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
            .collect::<String>()
            .to_lowercase();

        let mut id = String::with_capacity(folded.len());
        let mut in_gap = false;
        for c in folded.chars() {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                id.push(c);
                in_gap = false;
            } else if !in_gap {
                id.push('-');
                in_gap = true;
            }
        }
        PlayerId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Identity string parsing
// ---------------------------------------------------------------------------

/// The parts of a `"<Name> <ProTeam> - <Pos1,Pos2>"` identity string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerMeta {
    pub name: String,
    pub team: String,
    /// Position tokens as listed, including ones the roster does not know.
    pub positions: Vec<String>,
}

impl PlayerMeta {
    pub fn parse(identity: &str) -> Self {
        let positions: Vec<String> = position_tokens(identity).map(str::to_string).collect();
        let name_and_team = identity.split(" - ").next().unwrap_or("").trim();

        if name_and_team.is_empty() {
            return PlayerMeta {
                name: identity.to_string(),
                team: String::new(),
                positions,
            };
        }

        let mut parts: Vec<&str> = name_and_team.split(' ').collect();
        let team = if parts.len() > 1 {
            parts.pop().unwrap_or("").to_string()
        } else {
            String::new()
        };
        let name = parts.join(" ");

        PlayerMeta {
            name: if name.is_empty() { name_and_team.to_string() } else { name },
            team,
            positions,
        }
    }
}

/// Trimmed, non-empty comma-separated tokens after the first `" - "`.
fn position_tokens(identity: &str) -> impl Iterator<Item = &str> {
    let suffix = identity.split(" - ").nth(1).unwrap_or("");
    suffix.split(',').map(str::trim).filter(|p| !p.is_empty())
}

// ---------------------------------------------------------------------------
// Raw record normalization
// ---------------------------------------------------------------------------

const IDENTITY_ALIASES: &[&str] = &["player", "playername"];
const NAME_ALIASES: &[&str] = &["name", "fullname"];
const TEAM_ALIASES: &[&str] = &["team", "proteam", "tm", "nbateam"];
const POSITION_ALIASES: &[&str] = &["positions", "position", "pos", "eligiblepositions"];

/// Normalize a batch of raw records into canonical players.
///
/// Never fails: non-object entries are skipped with a warning, missing or
/// malformed fields fall back to defaults.
pub fn normalize_records(raw: &[Value]) -> Vec<Player> {
    raw.iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            let player = normalize_record(record, idx + 1);
            if player.is_none() {
                warn!("skipping raw record #{}: not an object", idx + 1);
            }
            player
        })
        .collect()
}

/// Normalize one raw record. `ordinal` is the record's 1-based position in
/// its dataset; it seeds the synthesized name and the default expert rank.
pub fn normalize_record(raw: &Value, ordinal: usize) -> Option<Player> {
    let fields = raw.as_object()?;

    let identity = identity_from_fields(fields).unwrap_or_else(|| format!("Player {ordinal}"));
    let mut player = Player::new(identity);

    for key in StatKey::ALL {
        let mut value = coerce_number(lookup(fields, key.aliases()));
        if key.is_percentage() && value > 1.0 {
            value /= 100.0;
        }
        *player.stat_mut(key) = value;
    }

    if player.expert_rank == 0.0 {
        player.expert_rank = ordinal as f64;
    }

    Some(player)
}

/// First field whose folded name is one of `aliases`.
fn lookup<'a>(fields: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    fields
        .iter()
        .find(|(key, _)| aliases.contains(&fold_key(key).as_str()))
        .map(|(_, value)| value)
}

/// The identity string, taken whole or assembled from separate
/// name/team/position fields.
fn identity_from_fields(fields: &Map<String, Value>) -> Option<String> {
    if let Some(identity) = lookup(fields, IDENTITY_ALIASES).and_then(value_as_text) {
        return Some(identity);
    }

    let name = lookup(fields, NAME_ALIASES).and_then(value_as_text)?;
    let team = lookup(fields, TEAM_ALIASES).and_then(value_as_text);
    let positions = lookup(fields, POSITION_ALIASES).and_then(|v| match v {
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().filter_map(value_as_text).collect();
            (!joined.is_empty()).then(|| joined.join(","))
        }
        other => value_as_text(other).map(|s| {
            s.split(|c: char| c == '/' || c == ',' || c == ' ')
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(",")
        }),
    });

    let mut identity = name;
    if let Some(team) = team {
        identity = format!("{identity} {team}");
    }
    if let Some(positions) = positions {
        identity = format!("{identity} - {positions}");
    }
    Some(identity)
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce a raw value to a finite number. Missing or unparseable values are 0.
fn coerce_number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != '%' && *c != ',').collect();
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Fold a raw field name for alias matching: lower-case ASCII alphanumerics
/// only, with `%` spelled `pct` (so `"FG%"`, `"fg_pct"` and `"FG Pct"` agree).
fn fold_key(key: &str) -> String {
    let mut folded = String::with_capacity(key.len());
    for c in key.chars() {
        if c == '%' {
            folded.push_str("pct");
        } else if c.is_ascii_alphanumeric() {
            folded.push(c.to_ascii_lowercase());
        }
    }
    folded
}
