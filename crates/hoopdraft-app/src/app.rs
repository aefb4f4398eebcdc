// Application state and orchestration logic.
//
// Owns the config and the draft session, turns prompt commands into session
// calls, and renders their outcome as lines of text for the terminal.

use std::path::PathBuf;

use hoopdraft_core::player::Player;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::command::{Command, CommandError, DEFAULT_LIST_LEN, HELP};
use crate::config::Config;
use crate::dataset::{self, DatasetError};
use crate::display;
use crate::session::DraftSession;

/// Draft parameters after CLI overrides have been applied to the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOptions {
    pub dataset: String,
    pub total_rounds: u32,
    /// 1-based draft position.
    pub user_pick: usize,
}

impl DraftOptions {
    pub fn from_config(config: &Config) -> Self {
        DraftOptions {
            dataset: config.data.default_dataset.clone(),
            total_rounds: config.draft.total_rounds,
            user_pick: config.draft.user_pick,
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub config: Config,
    pub session: DraftSession,
    data_dir: PathBuf,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let session = DraftSession::new(config.bot.seed, config.draft.default_sort);
        let data_dir = PathBuf::from(&config.data.dir);
        AppState {
            config,
            session,
            data_dir,
        }
    }

    /// Override where dataset files are read from.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Load the dataset and start a draft. Returns the opening screen.
    pub fn start(&mut self, options: &DraftOptions) -> Result<Vec<String>, DatasetError> {
        let players = self.load_configured(&options.dataset)?;
        self.session.start_draft(
            self.config.draft.league(),
            players,
            options.total_rounds,
            options.user_pick,
            &options.dataset,
        );
        Ok(self.status_lines(DEFAULT_LIST_LEN))
    }

    /// Load a dataset listed in the config; other names are refused.
    fn load_configured(&self, name: &str) -> Result<Vec<Player>, DatasetError> {
        if self.config.dataset(name).is_none() {
            return Err(DatasetError::NotConfigured {
                name: name.to_string(),
            });
        }
        dataset::load_dataset(&self.data_dir, name)
    }

    fn dataset_label<'a>(&'a self, name: &'a str) -> &'a str {
        self.config.dataset(name).map_or(name, |d| d.label.as_str())
    }

    /// Execute one prompt command and return what to print.
    pub fn handle_command(&mut self, cmd: Command) -> Vec<String> {
        match cmd {
            Command::Pick(number) => self.pick_listed(number),
            Command::List(n) => self.status_lines(n),
            Command::Auto => match self.session.auto_pick_for_user().map(|_| ()) {
                Ok(()) => self.after_pick(),
                Err(e) => vec![e.to_string()],
            },
            Command::Sort(key) => {
                self.session.set_sort(key);
                self.status_lines(DEFAULT_LIST_LEN)
            }
            Command::Dataset(name) => self.switch_dataset(&name),
            Command::Datasets => {
                let current = self.session.state().map(|s| s.dataset_name().to_string());
                self.config
                    .datasets
                    .iter()
                    .map(|d| {
                        let marker = if current.as_deref() == Some(d.value.as_str()) { "*" } else { " " };
                        format!("{marker} {:<14} {}", d.value, d.label)
                    })
                    .collect()
            }
            Command::Team(team) => self.roster_lines(team),
            Command::Log(n) => self.log_lines(n),
            Command::Help => HELP.iter().map(|s| s.to_string()).collect(),
            Command::Quit => Vec::new(),
        }
    }

    fn pick_listed(&mut self, number: usize) -> Vec<String> {
        let Some(player) = self
            .session
            .state()
            .and_then(|s| s.available().get(number.checked_sub(1)?))
            .cloned()
        else {
            return vec![format!("no player #{number} in the list")];
        };

        match self.session.user_pick(&player).map(|_| ()) {
            Ok(()) => {
                let mut lines = vec![format!("You drafted {}", player.player)];
                lines.extend(self.after_pick());
                lines
            }
            Err(e) => vec![format!("cannot draft {}: {e}", player.player)],
        }
    }

    /// Bot picks since the human's last pick, then the status screen.
    fn after_pick(&self) -> Vec<String> {
        let Some(state) = self.session.state() else {
            return Vec::new();
        };
        let mut lines: Vec<String> = state
            .history()
            .iter()
            .rev()
            .take_while(|p| p.team_index != state.user_team_index())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|p| display::format_pick(p, &state.teams()[p.team_index].team_name))
            .collect();
        lines.extend(self.status_lines(DEFAULT_LIST_LEN));
        lines
    }

    fn switch_dataset(&mut self, name: &str) -> Vec<String> {
        let players = match self.load_configured(name) {
            Ok(players) => players,
            Err(e) => {
                warn!("dataset switch to '{}' failed: {}", name, e);
                return vec![e.to_string()];
            }
        };
        match self.session.change_dataset(players, name) {
            Ok(skipped) => {
                info!("Switched to dataset '{}'", name);
                let mut lines = vec![format!("Switched to {}", self.dataset_label(name))];
                for pick in &skipped {
                    lines.push(format!(
                        "  pick {} ({}) is not in this dataset; its roster slot stays empty",
                        pick.overall_pick, pick.player.player
                    ));
                }
                lines.extend(self.status_lines(DEFAULT_LIST_LEN));
                lines
            }
            Err(e) => vec![e.to_string()],
        }
    }

    /// Draft position header plus the top `n` available players.
    pub fn status_lines(&self, n: usize) -> Vec<String> {
        let Some(state) = self.session.state() else {
            return vec!["no draft in progress".to_string()];
        };
        let sort = self.session.sort().map_or("default", |k| k.as_str());
        let mut lines = vec![format!(
            "{} | sort: {} | {} available",
            self.dataset_label(state.dataset_name()),
            sort,
            state.available().len()
        )];

        if state.is_complete() {
            lines.push("Draft complete.".to_string());
            return lines;
        }

        lines.push(format!(
            "Round {}/{}, pick {}: {}",
            state.round(),
            state.total_rounds(),
            state.order().pick_in_round(state.num_teams()),
            if state.is_user_turn() {
                "you are on the clock".to_string()
            } else {
                format!("{} is on the clock", state.current_team().team_name)
            }
        ));
        lines.push(display::table_header());
        for (idx, player) in state.available().iter().take(n).enumerate() {
            let mut row = display::format_player_row(idx + 1, player);
            if !state.can_current_team_fit(player) {
                row.push_str("  (no slot)");
            }
            lines.push(row);
        }
        lines
    }

    fn roster_lines(&self, team: Option<usize>) -> Vec<String> {
        let Some(state) = self.session.state() else {
            return vec!["no draft in progress".to_string()];
        };
        let team = match team {
            None => state.user_team(),
            Some(n) => match n.checked_sub(1).and_then(|idx| state.team(idx)) {
                Some(t) => t,
                None => return vec![format!("no team {n} (1..={})", state.num_teams())],
            },
        };
        let mut lines = vec![format!(
            "{} ({}/{} filled)",
            team.team_name,
            team.roster.filled_count(),
            team.roster.total_count()
        )];
        lines.extend(display::format_roster(&team.roster));
        lines
    }

    fn log_lines(&self, n: usize) -> Vec<String> {
        let Some(state) = self.session.state() else {
            return vec!["no draft in progress".to_string()];
        };
        let history = state.history();
        history[history.len().saturating_sub(n)..]
            .iter()
            .map(|p| display::format_pick(p, &state.teams()[p.team_index].team_name))
            .collect()
    }

    /// End-of-draft report: the human roster and pick tally.
    pub fn summary(&self) -> Vec<String> {
        let Some(state) = self.session.state() else {
            return Vec::new();
        };
        let mut lines = vec![format!(
            "{} picks made over {} rounds on {}",
            state.picks_made(),
            state.total_rounds(),
            self.dataset_label(state.dataset_name())
        )];
        lines.extend(self.roster_lines(None));
        lines
    }

    pub fn is_complete(&self) -> bool {
        self.session.state().is_some_and(|s| s.is_complete())
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the command loop over prompt lines until `quit`, the end of the
/// draft, Ctrl-C, or the input channel closing. Output goes through `out_tx`.
pub async fn run(
    mut state: AppState,
    mut line_rx: mpsc::Receiver<String>,
    out_tx: mpsc::Sender<Vec<String>>,
) -> anyhow::Result<AppState> {
    info!("Command loop started");

    loop {
        tokio::select! {
            line = line_rx.recv() => {
                let Some(line) = line else {
                    info!("Input closed");
                    break;
                };
                let lines = match line.parse::<Command>() {
                    Ok(Command::Quit) => {
                        info!("Quit command received");
                        break;
                    }
                    Ok(cmd) => state.handle_command(cmd),
                    Err(CommandError::Empty) => Vec::new(),
                    Err(e) => vec![e.to_string()],
                };
                if out_tx.send(lines).await.is_err() {
                    warn!("Output channel closed");
                    break;
                }
                if state.is_complete() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    info!("Command loop exiting");
    Ok(state)
}

/// Let the best-available rule pick for the human until the draft ends.
/// Returns the human's picks.
pub fn run_unattended(state: &mut AppState) -> Vec<String> {
    while !state.is_complete() {
        if let Err(e) = state.session.auto_pick_for_user() {
            warn!("unattended draft stopped: {}", e);
            return vec![e.to_string()];
        }
    }
    let Some(draft) = state.session.state() else {
        return Vec::new();
    };
    draft
        .history()
        .iter()
        .filter(|p| p.team_index == draft.user_team_index())
        .map(|p| display::format_pick(p, "You"))
        .collect()
}
