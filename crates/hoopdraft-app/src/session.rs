// Draft session store: owns the current draft, the active sort and the bot
// RNG, and publishes every new state to subscribers.

use std::sync::Arc;

use hoopdraft_core::draft::{can_fit_player_in_team, DraftPick, DraftState, League, PickError, SortKey};
use hoopdraft_core::player::Player;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Latest published draft snapshot; `None` before the first draft starts.
pub type Snapshot = Option<Arc<DraftState>>;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("no draft in progress")]
    NoDraft,

    #[error("not your turn: team {current_team} is on the clock")]
    NotUserTurn { current_team: usize },

    #[error(transparent)]
    Pick(#[from] PickError),
}

pub struct DraftSession {
    state: Option<DraftState>,
    sort: Option<SortKey>,
    rng: StdRng,
    tx: watch::Sender<Snapshot>,
}

impl DraftSession {
    /// A session with no draft. `seed` fixes the bot RNG; entropy otherwise.
    pub fn new(seed: Option<u64>, sort: Option<SortKey>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (tx, _) = watch::channel(None);
        DraftSession {
            state: None,
            sort,
            rng,
            tx,
        }
    }

    /// Receive every state this session publishes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> Option<&DraftState> {
        self.state.as_ref()
    }

    pub fn sort(&self) -> Option<SortKey> {
        self.sort
    }

    fn current(&self) -> Result<&DraftState, SessionError> {
        self.state.as_ref().ok_or(SessionError::NoDraft)
    }

    fn publish(&mut self, state: DraftState) -> &DraftState {
        self.tx.send_replace(Some(Arc::new(state.clone())));
        self.state.insert(state)
    }

    // --- Draft lifecycle ---

    /// Start a new draft, discarding any current one, then let the bots pick
    /// up to the human's first turn.
    ///
    /// `user_pick` is the human's 1-based draft position, clamped to
    /// `1..=num_teams`.
    pub fn start_draft(
        &mut self,
        league: League,
        players: Vec<Player>,
        total_rounds: u32,
        user_pick: usize,
        dataset_name: &str,
    ) -> &DraftState {
        let num_teams = league.num_teams.max(1);
        let clamped = user_pick.clamp(1, num_teams);
        if clamped != user_pick {
            warn!("draft position {} out of range 1..={}; using {}", user_pick, num_teams, clamped);
        }

        let state = DraftState::with_league(league, players, total_rounds, clamped - 1, dataset_name)
            .apply_sort(self.sort);
        info!(
            "Draft started: {} teams, {} rounds, picking at #{}, dataset '{}' ({} players)",
            state.num_teams(),
            total_rounds,
            clamped,
            dataset_name,
            state.available().len()
        );
        self.advance_bots(state)
    }

    /// Draft `player` for the human team, then run the bots to the human's
    /// next turn.
    pub fn user_pick(&mut self, player: &Player) -> Result<&DraftState, SessionError> {
        let state = self.current()?;
        if !state.is_complete() && !state.is_user_turn() {
            return Err(turn_error(state));
        }

        let next = state.assign_player(player)?.apply_sort(self.sort);
        info!("User drafted '{}' (pick {})", player.player, next.picks_made());
        Ok(self.advance_bots(next))
    }

    /// Draft the best available fitting player for the human. Passes the
    /// turn if nothing fits.
    pub fn auto_pick_for_user(&mut self) -> Result<&DraftState, SessionError> {
        let state = self.current()?;
        if !state.is_user_turn() {
            return Err(turn_error(state));
        }

        match self.best_available_for_user().cloned() {
            Some(player) => self.user_pick(&player),
            None => {
                warn!("no available player fits the user roster; passing");
                let next = state.skip_turn();
                Ok(self.advance_bots(next))
            }
        }
    }

    /// Let bots pick until the human is on the clock or the draft ends.
    pub fn run_bots_until_user(&mut self) -> Result<&DraftState, SessionError> {
        let state = self.current()?.clone();
        Ok(self.advance_bots(state))
    }

    /// Bounded bot loop over `state`, publishing the result. Stops at the
    /// human's turn, at completion, or when a bot call fails to move the
    /// clock.
    fn advance_bots(&mut self, mut state: DraftState) -> &DraftState {
        let max_turns = state.num_teams() * (state.total_rounds() as usize + 1);
        let picks_before = state.picks_made();

        let mut turns = 0;
        while !state.is_complete() && !state.is_user_turn() && turns < max_turns {
            let next = state.bot_pick(&mut self.rng);
            if next.order() == state.order() {
                warn!("bot made no progress at {:?}; stopping", state.order());
                break;
            }
            state = next;
            turns += 1;
        }

        debug!(
            "bots took {} turns, {} picks",
            turns,
            state.picks_made() - picks_before
        );
        if state.is_complete() {
            info!("Draft complete after {} picks", state.picks_made());
        }
        let state = state.apply_sort(self.sort);
        self.publish(state)
    }

    // --- View changes ---

    /// Change the pool ordering; `None` restores the default (expert rank).
    pub fn set_sort(&mut self, sort: Option<SortKey>) {
        self.sort = sort;
        if let Some(state) = &self.state {
            let next = state.apply_sort(sort);
            self.publish(next);
        }
        info!("Sort set to {}", sort.map_or("default", |k| k.as_str()));
    }

    /// Re-derive the current draft on a new dataset. Returns the historical
    /// picks whose players are missing from it.
    pub fn change_dataset(
        &mut self,
        players: Vec<Player>,
        dataset_name: &str,
    ) -> Result<Vec<DraftPick>, SessionError> {
        let change = self.current()?.change_dataset(players, dataset_name, self.sort);
        if !change.skipped.is_empty() {
            warn!(
                "{} picks not found in dataset '{}'",
                change.skipped.len(),
                dataset_name
            );
        }
        self.publish(change.state);
        Ok(change.skipped)
    }

    /// The first player in display order that fits the human roster.
    pub fn best_available_for_user(&self) -> Option<&Player> {
        let state = self.state.as_ref()?;
        let roster = &state.user_team().roster;
        state
            .available()
            .iter()
            .find(|p| can_fit_player_in_team(roster, p))
    }
}

/// Why the human cannot pick in `state`.
fn turn_error(state: &DraftState) -> SessionError {
    if state.is_complete() {
        PickError::DraftComplete {
            round: state.round(),
            total_rounds: state.total_rounds(),
        }
        .into()
    } else {
        SessionError::NotUserTurn {
            current_team: state.current_team_index(),
        }
    }
}
