// Positions, roster slot kinds, pick order, and individual pick records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::player::{Player, PlayerId};

/// Basketball positions a player can be listed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    PointGuard,
    ShootingGuard,
    SmallForward,
    PowerForward,
    Center,
}

impl Position {
    /// Parse a listed position token ("PG", "SG", "SF", "PF", "C").
    ///
    /// Combo designations such as "G" or "F" are slot kinds, not listed
    /// positions, and return `None`.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PG" => Some(Position::PointGuard),
            "SG" => Some(Position::ShootingGuard),
            "SF" => Some(Position::SmallForward),
            "PF" => Some(Position::PowerForward),
            "C" => Some(Position::Center),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::PointGuard => "PG",
            Position::ShootingGuard => "SG",
            Position::SmallForward => "SF",
            Position::PowerForward => "PF",
            Position::Center => "C",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_str())
    }
}

/// The designation of a roster slot, i.e. which players it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    PointGuard,
    ShootingGuard,
    /// PG or SG.
    Guard,
    SmallForward,
    PowerForward,
    /// SF or PF.
    Forward,
    Center,
    /// Anyone.
    Utility,
    /// Anyone.
    Bench,
}

/// The standard 13-slot lineup.
pub const STANDARD_ROSTER: [SlotKind; 13] = [
    SlotKind::PointGuard,
    SlotKind::ShootingGuard,
    SlotKind::Guard,
    SlotKind::SmallForward,
    SlotKind::PowerForward,
    SlotKind::Forward,
    SlotKind::Center,
    SlotKind::Center,
    SlotKind::Utility,
    SlotKind::Utility,
    SlotKind::Bench,
    SlotKind::Bench,
    SlotKind::Bench,
];

impl SlotKind {
    /// Parse a slot designation. Accepts "Util"/"UTIL" and "BN"/"BE".
    pub fn from_str_slot(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PG" => Some(SlotKind::PointGuard),
            "SG" => Some(SlotKind::ShootingGuard),
            "G" => Some(SlotKind::Guard),
            "SF" => Some(SlotKind::SmallForward),
            "PF" => Some(SlotKind::PowerForward),
            "F" => Some(SlotKind::Forward),
            "C" => Some(SlotKind::Center),
            "UTIL" => Some(SlotKind::Utility),
            "BN" | "BE" => Some(SlotKind::Bench),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            SlotKind::PointGuard => "PG",
            SlotKind::ShootingGuard => "SG",
            SlotKind::Guard => "G",
            SlotKind::SmallForward => "SF",
            SlotKind::PowerForward => "PF",
            SlotKind::Forward => "F",
            SlotKind::Center => "C",
            SlotKind::Utility => "Util",
            SlotKind::Bench => "BN",
        }
    }

    /// Whether a player listed at `positions` may occupy this slot.
    pub fn accepts(&self, positions: &[Position]) -> bool {
        let has = |p: Position| positions.contains(&p);
        match self {
            SlotKind::Utility | SlotKind::Bench => true,
            SlotKind::Guard => has(Position::PointGuard) || has(Position::ShootingGuard),
            SlotKind::Forward => has(Position::SmallForward) || has(Position::PowerForward),
            SlotKind::PointGuard => has(Position::PointGuard),
            SlotKind::ShootingGuard => has(Position::ShootingGuard),
            SlotKind::SmallForward => has(Position::SmallForward),
            SlotKind::PowerForward => has(Position::PowerForward),
            SlotKind::Center => has(Position::Center),
        }
    }

    /// Whether this slot accepts any player regardless of position.
    pub fn is_meta_slot(&self) -> bool {
        matches!(self, SlotKind::Utility | SlotKind::Bench)
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Snake pick order
// ---------------------------------------------------------------------------

/// Traversal direction of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

/// Whose turn it is: `(team_index, round, direction)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickOrder {
    pub team_index: usize,
    /// 1-based round number.
    pub round: u32,
    pub direction: Direction,
}

impl PickOrder {
    /// Team 0, round 1, going forward.
    pub fn start() -> Self {
        PickOrder {
            team_index: 0,
            round: 1,
            direction: Direction::Forward,
        }
    }

    /// The turn after this one in a snake draft of `num_teams` teams.
    ///
    /// At either end of the order the direction flips and the round advances
    /// while the team index stays put, so the turnaround team picks twice in
    /// a row.
    pub fn next(self, num_teams: usize) -> Self {
        let last = num_teams.saturating_sub(1);
        match self.direction {
            Direction::Forward if self.team_index >= last => PickOrder {
                team_index: last,
                round: self.round + 1,
                direction: Direction::Backward,
            },
            Direction::Backward if self.team_index == 0 => PickOrder {
                team_index: 0,
                round: self.round + 1,
                direction: Direction::Forward,
            },
            Direction::Forward => PickOrder {
                team_index: self.team_index + 1,
                ..self
            },
            Direction::Backward => PickOrder {
                team_index: self.team_index - 1,
                ..self
            },
        }
    }

    /// 1-based position of this turn within its round.
    pub fn pick_in_round(&self, num_teams: usize) -> usize {
        match self.direction {
            Direction::Forward => self.team_index + 1,
            Direction::Backward => num_teams - self.team_index,
        }
    }
}

/// A single draft pick record. Immutable once appended to the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    /// The player as drafted, with the attributes of the dataset active at
    /// the time of the pick.
    pub player: Player,
    pub player_id: PlayerId,
    /// Index of the team that made the pick.
    pub team_index: usize,
    pub round: u32,
    /// 1-based position within the round.
    pub pick_in_round: usize,
    /// 1-based overall pick number.
    pub overall_pick: usize,
}
