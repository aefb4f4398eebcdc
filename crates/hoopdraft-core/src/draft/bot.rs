// Automated pick policy for teams not controlled by the human.

use rand::Rng;
use tracing::{debug, warn};

use super::state::DraftState;
use crate::player::Player;

/// How many of the top available players a bot considers.
pub const BOT_CANDIDATE_COUNT: usize = 5;

/// Selection weights by round tier: `(last round of the tier, weights)`.
/// Rounds past the last tier use the last tier's weights.
const BOT_TIERS: [(u32, [f64; BOT_CANDIDATE_COUNT]); 3] = [
    (3, [0.55, 0.20, 0.12, 0.08, 0.05]),
    (7, [0.40, 0.25, 0.16, 0.11, 0.08]),
    (13, [0.30, 0.23, 0.20, 0.15, 0.12]),
];

/// Weights for `count` candidates in `round`.
///
/// The tier's weights are truncated to `count`, or padded by repeating the
/// last weight.
pub fn bot_weights(round: u32, count: usize) -> Vec<f64> {
    let tier = BOT_TIERS
        .iter()
        .find(|(max_round, _)| round <= *max_round)
        .unwrap_or(&BOT_TIERS[BOT_TIERS.len() - 1]);
    let weights = &tier.1;
    let last = weights[weights.len() - 1];

    (0..count)
        .map(|idx| weights.get(idx).copied().unwrap_or(last))
        .collect()
}

/// Draw an index with probability proportional to its weight.
///
/// Returns `None` for an empty or all-zero weight list.
pub fn choose_weighted<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if weights.is_empty() || total.is_nan() || total <= 0.0 {
        return None;
    }

    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (idx, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if roll <= cumulative {
            return Some(idx);
        }
    }
    // Floating-point rounding can leave the roll just above the final sum.
    Some(weights.len() - 1)
}

impl DraftState {
    /// Let the team on the clock pick automatically.
    ///
    /// Draws among the top available players that fit the team's roster,
    /// favouring the best-ranked more heavily in early rounds. When none of
    /// those fit, the first fitting player of the whole pool is taken. When
    /// nothing fits at all the turn passes without a pick.
    pub fn bot_pick<R: Rng + ?Sized>(&self, rng: &mut R) -> DraftState {
        if self.is_complete() {
            warn!("bot_pick called on a completed draft");
            return self.clone();
        }

        let team_index = self.current_team_index();
        let candidates: Vec<&Player> = self
            .available()
            .iter()
            .take(BOT_CANDIDATE_COUNT)
            .filter(|p| self.can_current_team_fit(p))
            .collect();

        let choice = if candidates.is_empty() {
            self.available().iter().find(|p| self.can_current_team_fit(p))
        } else {
            let weights = bot_weights(self.round(), candidates.len());
            choose_weighted(&weights, rng).map(|idx| candidates[idx])
        };

        let Some(player) = choice else {
            debug!("team {} has no fitting player; passing", team_index);
            return self.skip_turn();
        };

        match self.assign_player(player) {
            Ok(next) => next,
            Err(e) => {
                warn!("bot pick for team {} rejected: {}", team_index, e);
                self.skip_turn()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::pick::{SlotKind, STANDARD_ROSTER};
    use crate::draft::state::League;
    use crate::player::StatKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ranked(identity: &str, rank: f64) -> Player {
        Player::new(identity).with_stat(StatKey::ExpertRank, rank)
    }

    fn flex_pool(n: usize) -> Vec<Player> {
        (1..=n)
            .map(|i| ranked(&format!("Player{i} X - PG,SG,SF,PF,C"), i as f64))
            .collect()
    }

    #[test]
    fn weights_follow_round_tiers() {
        assert_eq!(bot_weights(1, 5), vec![0.55, 0.20, 0.12, 0.08, 0.05]);
        assert_eq!(bot_weights(3, 5)[0], 0.55);
        assert_eq!(bot_weights(4, 5)[0], 0.40);
        assert_eq!(bot_weights(7, 5)[0], 0.40);
        assert_eq!(bot_weights(8, 5)[0], 0.30);
        assert_eq!(bot_weights(40, 5), vec![0.30, 0.23, 0.20, 0.15, 0.12]);
    }

    #[test]
    fn weights_truncate_and_pad() {
        assert_eq!(bot_weights(1, 2), vec![0.55, 0.20]);
        assert_eq!(bot_weights(1, 7), vec![0.55, 0.20, 0.12, 0.08, 0.05, 0.05, 0.05]);
        assert!(bot_weights(1, 0).is_empty());
    }

    #[test]
    fn choose_weighted_rejects_degenerate_weights() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(choose_weighted(&[], &mut rng), None);
        assert_eq!(choose_weighted(&[0.0, 0.0], &mut rng), None);
    }

    #[test]
    fn choose_weighted_single_candidate() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(choose_weighted(&[0.3], &mut rng), Some(0));
        }
    }

    #[test]
    fn choose_weighted_never_picks_zero_weight_tail() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let idx = choose_weighted(&[0.5, 0.5, 0.0], &mut rng).unwrap();
            assert!(idx < 2);
        }
    }

    #[test]
    fn first_round_top_candidate_frequency() {
        let mut rng = StdRng::seed_from_u64(2025);
        let weights = bot_weights(1, 5);
        let draws = 5000;
        let hits = (0..draws)
            .filter(|_| choose_weighted(&weights, &mut rng) == Some(0))
            .count();
        let freq = hits as f64 / draws as f64;
        assert!((freq - 0.55).abs() < 0.03, "top candidate frequency was {freq}");
    }

    /// Share of `draws` bot picks from `state` that take the best-ranked player.
    fn top_pick_share(state: &DraftState, draws: usize, seed: u64) -> f64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let hits = (0..draws)
            .filter(|_| {
                let next = state.bot_pick(&mut rng);
                next.history()[0].player.expert_rank == 1.0
            })
            .count();
        hits as f64 / draws as f64
    }

    #[test]
    fn bot_pick_top_player_share_by_round() {
        let league = League::new(2, STANDARD_ROSTER.to_vec());
        let mut state = DraftState::with_league(league, flex_pool(40), 13, 0, "d");

        // (round, expected share of the top-ranked player)
        for (round, expected) in [(1, 0.55), (4, 0.40), (8, 0.30)] {
            while state.round() < round {
                state = state.skip_turn();
            }
            assert_eq!(state.round(), round);
            assert!(state.history().is_empty());

            let share = top_pick_share(&state, 4000, 42 + u64::from(round));
            assert!(
                (share - expected).abs() < 0.03,
                "round {round}: top player share was {share}, expected {expected}"
            );
        }
    }

    #[test]
    fn bot_pick_takes_one_of_top_five() {
        let state = DraftState::new(flex_pool(20), 13, 5, "d");
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..30 {
            let next = state.bot_pick(&mut rng);
            assert_eq!(next.picks_made(), 1);
            assert!(next.history()[0].player.expert_rank <= 5.0);
            assert_eq!(next.current_team_index(), 1);
        }
    }

    #[test]
    fn bot_pick_is_reproducible_with_seed() {
        let state = DraftState::new(flex_pool(40), 13, 0, "d");
        let run = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut s = state.clone();
            for _ in 0..10 {
                s = s.bot_pick(&mut rng);
            }
            s.history().iter().map(|p| p.player_id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn bot_pick_falls_back_beyond_top_five() {
        // Only centers fit; the lone center is ranked sixth.
        let league = League::new(2, vec![SlotKind::Center]);
        let mut players: Vec<Player> = (1..=5).map(|i| ranked(&format!("G{i} X - PG"), i as f64)).collect();
        players.push(ranked("Big X - C", 6.0));
        let state = DraftState::with_league(league, players, 1, 1, "d");

        let next = state.bot_pick(&mut StdRng::seed_from_u64(0));
        assert_eq!(next.history()[0].player.player, "Big X - C");
    }

    #[test]
    fn bot_pick_passes_when_nothing_fits() {
        let league = League::new(2, vec![SlotKind::Center]);
        let players = vec![ranked("G1 X - PG", 1.0), ranked("G2 X - SG", 2.0)];
        let state = DraftState::with_league(league, players, 1, 1, "d");

        let next = state.bot_pick(&mut StdRng::seed_from_u64(0));
        assert_eq!(next.picks_made(), 0);
        assert_eq!(next.available().len(), 2);
        assert_eq!(next.current_team_index(), 1);
    }

    #[test]
    fn bot_pick_passes_on_empty_pool() {
        let state = DraftState::new(Vec::new(), 13, 3, "d");
        let next = state.bot_pick(&mut StdRng::seed_from_u64(0));
        assert_eq!(next.picks_made(), 0);
        assert_eq!(next.current_team_index(), 1);
    }

    #[test]
    fn bot_pick_on_complete_draft_is_unchanged() {
        let league = League::new(1, STANDARD_ROSTER.to_vec());
        let state = DraftState::with_league(league, flex_pool(3), 1, 0, "d");
        let mut rng = StdRng::seed_from_u64(0);
        let done = state.bot_pick(&mut rng);
        assert!(done.is_complete());
        assert_eq!(done.bot_pick(&mut rng), done);
    }
}
