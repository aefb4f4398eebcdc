pub mod bot;
pub mod pick;
pub mod roster;
pub mod sort;
pub mod state;

pub use bot::{bot_weights, choose_weighted, BOT_CANDIDATE_COUNT};
pub use pick::{Direction, DraftPick, PickOrder, Position, SlotKind, STANDARD_ROSTER};
pub use roster::{can_fit_player_in_team, resolve, Resolution, Roster, RosterSlot};
pub use sort::{DatasetChange, SortKey};
pub use state::{DraftState, League, PickError, TeamState, DEFAULT_TEAM_COUNT, DEFAULT_TOTAL_ROUNDS};
