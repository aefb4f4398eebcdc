// Draft state: pick order, rosters, available pool, and pick history.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::pick::{Direction, DraftPick, PickOrder, SlotKind, STANDARD_ROSTER};
use super::roster::{self, Roster};
use crate::player::{Player, PlayerId};

/// Number of teams in a default league.
pub const DEFAULT_TEAM_COUNT: usize = 16;

/// Number of rounds in a default draft.
pub const DEFAULT_TOTAL_ROUNDS: u32 = 13;

/// Why an assignment was rejected. The state it was attempted on is left
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickError {
    #[error("the draft is complete (round {round} of {total_rounds})")]
    DraftComplete { round: u32, total_rounds: u32 },

    #[error("player `{player}` is not in the available pool")]
    NotAvailable { player: String },

    #[error("no open roster slot for `{player}` on team {team_index}")]
    NoOpenSlot { player: String, team_index: usize },
}

/// League shape: how many teams, and what each roster looks like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub num_teams: usize,
    pub roster: Vec<SlotKind>,
}

impl League {
    pub fn new(num_teams: usize, roster: Vec<SlotKind>) -> Self {
        League { num_teams, roster }
    }
}

impl Default for League {
    fn default() -> Self {
        League {
            num_teams: DEFAULT_TEAM_COUNT,
            roster: STANDARD_ROSTER.to_vec(),
        }
    }
}

/// The state of a single team during the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamState {
    pub team_index: usize,
    /// Display name of the team.
    pub team_name: String,
    pub roster: Roster,
}

/// The complete state of a draft session.
///
/// Every operation takes `&self` and returns a new state; a value is never
/// modified after it has been handed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftState {
    pub(crate) teams: Vec<TeamState>,
    /// Players not yet drafted, in display order.
    pub(crate) available: Vec<Player>,
    pub(crate) order: PickOrder,
    pub(crate) total_rounds: u32,
    pub(crate) user_team_index: usize,
    pub(crate) picks_made: usize,
    pub(crate) history: Vec<DraftPick>,
    pub(crate) dataset_name: String,
    pub(crate) league: League,
}

impl DraftState {
    /// Start a draft in a default 16-team league with the standard roster.
    pub fn new(
        players: Vec<Player>,
        total_rounds: u32,
        user_team_index: usize,
        dataset_name: impl Into<String>,
    ) -> Self {
        DraftState::with_league(
            League::default(),
            players,
            total_rounds,
            user_team_index,
            dataset_name,
        )
    }

    /// Start a draft in the given league.
    ///
    /// The pool is deduplicated by stable identifier (first occurrence wins)
    /// and ordered by ascending expert rank. An out-of-range user team index
    /// is clamped to the last team.
    pub fn with_league(
        league: League,
        players: Vec<Player>,
        total_rounds: u32,
        user_team_index: usize,
        dataset_name: impl Into<String>,
    ) -> Self {
        let league = League {
            num_teams: league.num_teams.max(1),
            ..league
        };

        let user_team_index = if user_team_index < league.num_teams {
            user_team_index
        } else {
            warn!(
                "user team index {} out of range for {} teams; clamping",
                user_team_index, league.num_teams
            );
            league.num_teams - 1
        };

        let teams = (0..league.num_teams)
            .map(|idx| TeamState {
                team_index: idx,
                team_name: format!("Team {}", idx + 1),
                roster: Roster::new(&league.roster),
            })
            .collect();

        let mut seen: HashSet<PlayerId> = HashSet::new();
        let mut available: Vec<Player> = Vec::with_capacity(players.len());
        for player in players {
            if seen.insert(player.id()) {
                available.push(player);
            } else {
                warn!("dropping duplicate player '{}' from the pool", player.player);
            }
        }
        available.sort_by(|a, b| a.expert_rank.total_cmp(&b.expert_rank));

        DraftState {
            teams,
            available,
            order: PickOrder::start(),
            total_rounds,
            user_team_index,
            picks_made: 0,
            history: Vec::new(),
            dataset_name: dataset_name.into(),
            league,
        }
    }

    // --- Accessors ---

    pub fn teams(&self) -> &[TeamState] {
        &self.teams
    }

    pub fn team(&self, team_index: usize) -> Option<&TeamState> {
        self.teams.get(team_index)
    }

    /// Reference to the human-controlled team.
    pub fn user_team(&self) -> &TeamState {
        &self.teams[self.user_team_index]
    }

    /// The team currently on the clock.
    pub fn current_team(&self) -> &TeamState {
        &self.teams[self.order.team_index]
    }

    pub fn available(&self) -> &[Player] {
        &self.available
    }

    pub fn order(&self) -> PickOrder {
        self.order
    }

    pub fn current_team_index(&self) -> usize {
        self.order.team_index
    }

    pub fn round(&self) -> u32 {
        self.order.round
    }

    pub fn direction(&self) -> Direction {
        self.order.direction
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn user_team_index(&self) -> usize {
        self.user_team_index
    }

    pub fn picks_made(&self) -> usize {
        self.picks_made
    }

    pub fn history(&self) -> &[DraftPick] {
        &self.history
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn league(&self) -> &League {
        &self.league
    }

    pub fn num_teams(&self) -> usize {
        self.league.num_teams
    }

    /// Terminal condition: every round has been played.
    pub fn is_complete(&self) -> bool {
        self.order.round > self.total_rounds
    }

    pub fn is_user_turn(&self) -> bool {
        !self.is_complete() && self.order.team_index == self.user_team_index
    }

    /// Whether `player` can join the roster of the team on the clock.
    pub fn can_current_team_fit(&self, player: &Player) -> bool {
        roster::can_fit_player_in_team(&self.current_team().roster, player)
    }

    pub fn is_available(&self, id: &PlayerId) -> bool {
        self.available.iter().any(|p| &p.id() == id)
    }

    // --- Transitions ---

    /// Draft `player` onto the team currently on the clock.
    ///
    /// The team's roster is re-resolved with the newcomer, the player leaves
    /// the pool (matched by stable identifier), a pick record is appended,
    /// and the pick order advances.
    pub fn assign_player(&self, player: &Player) -> Result<DraftState, PickError> {
        if self.is_complete() {
            return Err(PickError::DraftComplete {
                round: self.order.round,
                total_rounds: self.total_rounds,
            });
        }

        let player_id = player.id();
        if !self.is_available(&player_id) {
            return Err(PickError::NotAvailable {
                player: player.player.clone(),
            });
        }

        let team_index = self.order.team_index;
        let mut candidates: Vec<&Player> = self.teams[team_index].roster.players().collect();
        candidates.push(player);

        let resolution = roster::resolve(&self.league.roster, &candidates);
        if !resolution.placements.last().is_some_and(Option::is_some) {
            return Err(PickError::NoOpenSlot {
                player: player.player.clone(),
                team_index,
            });
        }

        let pick = DraftPick {
            player: player.clone(),
            player_id: player_id.clone(),
            team_index,
            round: self.order.round,
            pick_in_round: self.order.pick_in_round(self.league.num_teams),
            overall_pick: self.picks_made + 1,
        };
        debug!(
            "pick {} (round {}, #{}): team {} takes '{}'",
            pick.overall_pick, pick.round, pick.pick_in_round, team_index, player.player
        );

        let mut next = self.clone();
        next.teams[team_index].roster = resolution.roster;
        next.available.retain(|p| p.id() != player_id);
        next.history.push(pick);
        next.picks_made += 1;
        next.order = self.order.next(self.league.num_teams);
        Ok(next)
    }

    /// Pass the current turn without drafting anyone.
    pub fn skip_turn(&self) -> DraftState {
        let mut next = self.clone();
        next.order = self.order.next(self.league.num_teams);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> Vec<Player> {
        (1..=n)
            .map(|i| {
                Player::new(format!("Player{i} X - PG,SG,SF,PF,C"))
                    .with_stat(crate::player::StatKey::ExpertRank, i as f64)
            })
            .collect()
    }

    #[test]
    fn draft_state_creation() {
        let state = DraftState::new(pool(20), 13, 3, "proj_25_26");
        assert_eq!(state.teams().len(), DEFAULT_TEAM_COUNT);
        assert_eq!(state.available().len(), 20);
        assert_eq!(state.order(), PickOrder::start());
        assert_eq!(state.picks_made(), 0);
        assert!(state.history().is_empty());
        assert_eq!(state.user_team_index(), 3);
        assert_eq!(state.user_team().team_name, "Team 4");
        assert_eq!(state.dataset_name(), "proj_25_26");
        assert!(!state.is_complete());
    }

    #[test]
    fn creation_sorts_by_expert_rank() {
        let mut players = pool(5);
        players.reverse();
        let state = DraftState::new(players, 1, 0, "d");
        let ranks: Vec<f64> = state.available().iter().map(|p| p.expert_rank).collect();
        assert_eq!(ranks, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn creation_deduplicates_by_stable_id() {
        let players = vec![
            Player::new("Luka Dončić DAL - PG").with_stat(crate::player::StatKey::Pts, 30.0),
            Player::new("Luka Doncic DAL - PG").with_stat(crate::player::StatKey::Pts, 1.0),
        ];
        let state = DraftState::new(players, 1, 0, "d");
        assert_eq!(state.available().len(), 1);
        assert_eq!(state.available()[0].pts, 30.0);
    }

    #[test]
    fn creation_clamps_user_team() {
        let state = DraftState::with_league(League::new(4, STANDARD_ROSTER.to_vec()), pool(4), 1, 9, "d");
        assert_eq!(state.user_team_index(), 3);
    }

    #[test]
    fn assign_places_player_and_advances() {
        let players = vec![Player::new("A B - PG").with_stat(crate::player::StatKey::ExpertRank, 1.0)];
        let state = DraftState::new(players.clone(), 1, 0, "d");
        let next = state.assign_player(&players[0]).unwrap();

        assert_eq!(next.picks_made(), 1);
        assert_eq!(next.history().len(), 1);
        assert!(next.available().is_empty());
        assert_eq!(next.current_team_index(), 1);
        assert_eq!(next.teams()[0].roster.slots[0].player.as_ref(), Some(&players[0]));

        // The original value is untouched.
        assert_eq!(state.picks_made(), 0);
        assert_eq!(state.available().len(), 1);
    }

    #[test]
    fn assign_records_pick_metadata() {
        let players = pool(3);
        let state = DraftState::with_league(League::new(2, STANDARD_ROSTER.to_vec()), players.clone(), 2, 0, "d");
        let state = state.assign_player(&players[0]).unwrap();
        let state = state.assign_player(&players[1]).unwrap();
        let state = state.assign_player(&players[2]).unwrap();

        let picks = state.history();
        assert_eq!(picks[0].team_index, 0);
        assert_eq!(picks[0].round, 1);
        assert_eq!(picks[0].pick_in_round, 1);
        assert_eq!(picks[1].team_index, 1);
        assert_eq!(picks[1].pick_in_round, 2);
        // Turnaround: team 1 picks first in round 2.
        assert_eq!(picks[2].team_index, 1);
        assert_eq!(picks[2].round, 2);
        assert_eq!(picks[2].pick_in_round, 1);
        assert_eq!(picks[2].overall_pick, 3);
        assert_eq!(picks[2].player_id, players[2].id());
    }

    #[test]
    fn assign_rejects_unavailable_player() {
        let players = pool(2);
        let state = DraftState::new(players.clone(), 2, 0, "d");
        let state = state.assign_player(&players[0]).unwrap();
        let err = state.assign_player(&players[0]).unwrap_err();
        assert!(matches!(err, PickError::NotAvailable { .. }));
        let stranger = Player::new("Not In Pool - C");
        assert!(matches!(
            state.assign_player(&stranger),
            Err(PickError::NotAvailable { .. })
        ));
    }

    #[test]
    fn assign_matches_pool_by_stable_id() {
        let state = DraftState::new(vec![Player::new("Nikola Jokić DEN - C")], 1, 0, "d");
        let reloaded = Player::new("Nikola Jokic DEN - C").with_stat(crate::player::StatKey::Pts, 29.0);
        let next = state.assign_player(&reloaded).unwrap();
        assert!(next.available().is_empty());
    }

    #[test]
    fn assign_rejects_when_no_slot_fits() {
        let league = League::new(1, vec![SlotKind::Center]);
        let players = vec![Player::new("C1 X - C"), Player::new("P1 X - PG")];
        let state = DraftState::with_league(league, players.clone(), 5, 0, "d");

        assert!(!state.can_current_team_fit(&players[1]));
        let err = state.assign_player(&players[1]).unwrap_err();
        assert_eq!(
            err,
            PickError::NoOpenSlot {
                player: "P1 X - PG".to_string(),
                team_index: 0
            }
        );
    }

    #[test]
    fn assign_rejects_after_completion() {
        let players = pool(3);
        let state = DraftState::with_league(League::new(1, STANDARD_ROSTER.to_vec()), players.clone(), 1, 0, "d");
        let state = state.assign_player(&players[0]).unwrap();
        assert!(state.is_complete());
        assert!(!state.is_user_turn());
        assert!(matches!(
            state.assign_player(&players[1]),
            Err(PickError::DraftComplete { round: 2, total_rounds: 1 })
        ));
    }

    #[test]
    fn skip_turn_only_moves_the_clock() {
        let state = DraftState::new(pool(3), 13, 0, "d");
        let next = state.skip_turn();
        assert_eq!(next.current_team_index(), 1);
        assert_eq!(next.picks_made(), 0);
        assert_eq!(next.available(), state.available());
    }

    #[test]
    fn user_turn_tracks_clock() {
        let players = pool(3);
        let state = DraftState::new(players.clone(), 13, 1, "d");
        assert!(!state.is_user_turn());
        let state = state.assign_player(&players[0]).unwrap();
        assert!(state.is_user_turn());
    }
}
