// Pool ordering and dataset swaps that stay consistent with pick history.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::pick::DraftPick;
use super::state::DraftState;
use crate::player::{Player, StatKey};

/// Keys the available pool can be ordered by. Ascending in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    ExpertRank,
    Rank,
    Adp,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        self.stat().as_str()
    }

    pub fn from_str_key(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "expert_rank" => Some(SortKey::ExpertRank),
            "rank" => Some(SortKey::Rank),
            "adp" => Some(SortKey::Adp),
            _ => None,
        }
    }

    pub fn stat(&self) -> StatKey {
        match self {
            SortKey::ExpertRank => StatKey::ExpertRank,
            SortKey::Rank => StatKey::Rank,
            SortKey::Adp => StatKey::Adp,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of re-deriving a draft on a different dataset.
#[derive(Debug, Clone)]
pub struct DatasetChange {
    pub state: DraftState,
    /// Historical picks whose player is missing from the new dataset. They
    /// stay in the history but occupy no roster slot.
    pub skipped: Vec<DraftPick>,
}

impl DraftState {
    /// Reorder the available pool by `key` (expert rank when `None`).
    ///
    /// The sort is stable, so equal keys keep their relative order and
    /// applying the same key twice changes nothing.
    pub fn apply_sort(&self, key: Option<SortKey>) -> DraftState {
        let stat = key.unwrap_or(SortKey::ExpertRank).stat();
        let mut next = self.clone();
        next.available
            .sort_by(|a, b| a.stat(stat).total_cmp(&b.stat(stat)));
        next
    }

    /// Rebuild this draft on top of a different player pool.
    ///
    /// A fresh draft with the same league, round count and human team is
    /// created from `pool` and every historical pick is replayed in order,
    /// matched by stable identifier so the new dataset's attributes flow in.
    /// Picks whose player is missing from `pool` are kept in the history and
    /// reported in [`DatasetChange::skipped`].
    pub fn change_dataset(
        &self,
        pool: Vec<Player>,
        dataset_name: impl Into<String>,
        sort: Option<SortKey>,
    ) -> DatasetChange {
        let dataset_name = dataset_name.into();
        let num_teams = self.league.num_teams;
        let mut state = DraftState::with_league(
            self.league.clone(),
            pool,
            self.total_rounds,
            self.user_team_index,
            dataset_name.clone(),
        )
        .apply_sort(sort);
        let mut skipped = Vec::new();

        for pick in &self.history {
            // Reproduce turns that passed without a pick.
            while (state.order.round, state.order.team_index) != (pick.round, pick.team_index)
                && state.order.round <= pick.round
            {
                state.order = state.order.next(num_teams);
            }

            let replacement = state
                .available
                .iter()
                .find(|p| p.id() == pick.player_id)
                .cloned();

            let replayed = match replacement {
                Some(player) => match state.assign_player(&player) {
                    Ok(next) => Some(next.apply_sort(sort)),
                    Err(e) => {
                        warn!("replay of pick {} failed: {}", pick.overall_pick, e);
                        None
                    }
                },
                None => {
                    warn!(
                        "'{}' (pick {}) is not in dataset '{}'; keeping the pick without a roster slot",
                        pick.player.player, pick.overall_pick, dataset_name
                    );
                    None
                }
            };

            state = match replayed {
                Some(next) => next,
                None => {
                    skipped.push(pick.clone());
                    let mut next = state;
                    next.history.push(pick.clone());
                    next.picks_made += 1;
                    next.order = next.order.next(num_teams);
                    next
                }
            };
        }

        // Trailing passed turns are not in the history.
        state.order = self.order;

        info!(
            "re-derived draft on '{}': {} picks replayed, {} skipped",
            dataset_name,
            self.history.len() - skipped.len(),
            skipped.len()
        );
        debug!("pool after swap: {} players", state.available.len());

        DatasetChange { state, skipped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::pick::STANDARD_ROSTER;
    use crate::draft::state::League;

    fn player(identity: &str, expert_rank: f64, rank: f64, adp: f64) -> Player {
        Player::new(identity)
            .with_stat(StatKey::ExpertRank, expert_rank)
            .with_stat(StatKey::Rank, rank)
            .with_stat(StatKey::Adp, adp)
    }

    fn sample_pool() -> Vec<Player> {
        vec![
            player("A X - PG", 1.0, 3.0, 2.0),
            player("B X - SG", 2.0, 1.0, 3.0),
            player("C X - C", 3.0, 2.0, 1.0),
            player("D X - SF", 4.0, 4.0, 4.0),
        ]
    }

    fn names(state: &DraftState) -> Vec<&str> {
        state.available().iter().map(|p| p.player.as_str()).collect()
    }

    #[test]
    fn sort_key_parsing() {
        assert_eq!(SortKey::from_str_key("adp"), Some(SortKey::Adp));
        assert_eq!(SortKey::from_str_key(" Rank "), Some(SortKey::Rank));
        assert_eq!(SortKey::from_str_key("expert_rank"), Some(SortKey::ExpertRank));
        assert_eq!(SortKey::from_str_key("pts"), None);
        assert_eq!(SortKey::Adp.to_string(), "adp");
    }

    #[test]
    fn apply_sort_orders_by_key() {
        let state = DraftState::new(sample_pool(), 13, 0, "d");
        assert_eq!(names(&state.apply_sort(Some(SortKey::Rank))), vec!["B X - SG", "C X - C", "A X - PG", "D X - SF"]);
        assert_eq!(names(&state.apply_sort(Some(SortKey::Adp))), vec!["C X - C", "A X - PG", "B X - SG", "D X - SF"]);
        assert_eq!(names(&state.apply_sort(None)), vec!["A X - PG", "B X - SG", "C X - C", "D X - SF"]);
    }

    #[test]
    fn apply_sort_is_stable_and_idempotent() {
        let pool = vec![
            player("A X - PG", 1.0, 5.0, 0.0),
            player("B X - PG", 2.0, 5.0, 0.0),
            player("C X - PG", 3.0, 1.0, 0.0),
        ];
        let state = DraftState::new(pool, 13, 0, "d");
        let once = state.apply_sort(Some(SortKey::Rank));
        assert_eq!(names(&once), vec!["C X - PG", "A X - PG", "B X - PG"]);
        assert_eq!(once.apply_sort(Some(SortKey::Rank)), once);
    }

    #[test]
    fn apply_sort_leaves_everything_else_alone() {
        let pool = sample_pool();
        let state = DraftState::new(pool.clone(), 13, 0, "d")
            .assign_player(&pool[0])
            .unwrap();
        let sorted = state.apply_sort(Some(SortKey::Adp));
        assert_eq!(sorted.history(), state.history());
        assert_eq!(sorted.teams(), state.teams());
        assert_eq!(sorted.order(), state.order());
    }

    fn drafted(pool: &[Player], picks: usize) -> DraftState {
        let league = League::new(2, STANDARD_ROSTER.to_vec());
        let mut state = DraftState::with_league(league, pool.to_vec(), 3, 0, "old");
        for _ in 0..picks {
            let top = state.available()[0].clone();
            state = state.assign_player(&top).unwrap();
        }
        state
    }

    #[test]
    fn change_dataset_replays_every_pick() {
        let pool = sample_pool();
        let state = drafted(&pool, 3);

        let new_pool: Vec<Player> = pool
            .iter()
            .map(|p| p.clone().with_stat(StatKey::Pts, 20.0))
            .collect();
        let change = state.change_dataset(new_pool, "new", None);

        assert!(change.skipped.is_empty());
        let next = &change.state;
        assert_eq!(next.dataset_name(), "new");
        assert_eq!(next.picks_made(), 3);
        assert_eq!(next.order(), state.order());
        assert_eq!(next.available().len(), 1);
        for (old, new) in state.teams().iter().zip(next.teams()) {
            let old_ids: Vec<_> = old.roster.players().map(Player::id).collect();
            let new_ids: Vec<_> = new.roster.players().map(Player::id).collect();
            assert_eq!(old_ids, new_ids);
        }
        // Rostered players carry the new dataset's attributes.
        assert!(next.teams()[0].roster.players().all(|p| p.pts == 20.0));
    }

    #[test]
    fn change_dataset_reports_missing_player() {
        let pool = sample_pool();
        let state = drafted(&pool, 3);
        let missing = state.history()[1].clone();

        let new_pool: Vec<Player> = pool
            .into_iter()
            .filter(|p| p.id() != missing.player_id)
            .collect();
        let change = state.change_dataset(new_pool, "new", None);

        assert_eq!(change.skipped.len(), 1);
        assert_eq!(change.skipped[0].player_id, missing.player_id);

        let next = &change.state;
        assert_eq!(next.picks_made(), 3);
        assert_eq!(next.history().len(), 3);
        let placed: usize = next.teams().iter().map(|t| t.roster.filled_count()).sum();
        assert_eq!(placed, 2);
        assert_eq!(next.order(), state.order());
    }

    #[test]
    fn change_dataset_reproduces_passed_turns() {
        let pool = sample_pool();
        let league = League::new(2, STANDARD_ROSTER.to_vec());
        let state = DraftState::with_league(league, pool.clone(), 3, 0, "old")
            .skip_turn()
            .assign_player(&pool[0])
            .unwrap();
        assert_eq!(state.history()[0].team_index, 1);

        let change = state.change_dataset(pool, "new", None);
        assert!(change.skipped.is_empty());
        assert_eq!(change.state.history()[0].team_index, 1);
        assert_eq!(change.state.teams()[1].roster.filled_count(), 1);
        assert_eq!(change.state.teams()[0].roster.filled_count(), 0);
    }

    #[test]
    fn change_dataset_applies_requested_sort() {
        let pool = sample_pool();
        let state = drafted(&pool, 1);
        let change = state.change_dataset(pool, "new", Some(SortKey::Adp));
        assert_eq!(names(&change.state), vec!["C X - C", "B X - SG", "D X - SF"]);
    }
}
