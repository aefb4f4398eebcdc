// hoopdraft entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file; the terminal is the prompt)
// 2. Load config, apply CLI overrides
// 3. Load the dataset and start the draft (bots run to the first user turn)
// 4. Either draft unattended (--auto) or run the prompt loop
// 5. Print the final roster

use std::path::{Path, PathBuf};

use clap::Parser;
use hoopdraft_app::app::{self, AppState, DraftOptions};
use hoopdraft_app::config;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hoopdraft")]
#[command(about = "Snake-draft simulator for fantasy basketball")]
struct Args {
    /// Dataset to draft from (defaults to data.default_dataset)
    #[arg(long)]
    dataset: Option<String>,

    /// Your 1-based draft position
    #[arg(long)]
    pick: Option<usize>,

    /// Number of rounds (at least 1)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    rounds: Option<u32>,

    /// Seed for the bot RNG
    #[arg(long)]
    seed: Option<u64>,

    /// Draft the best available player for you every turn and exit
    #[arg(long)]
    auto: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1. Tracing
    let log_path = init_tracing(&std::env::current_dir()?.join("logs"))?;
    info!("hoopdraft starting up, logging to {}", log_path.display());

    // 2. Config + overrides
    let mut config = config::load_config().context("failed to load configuration")?;
    if args.seed.is_some() {
        config.bot.seed = args.seed;
    }
    let mut options = DraftOptions::from_config(&config);
    if let Some(dataset) = args.dataset {
        options.dataset = dataset;
    }
    if let Some(pick) = args.pick {
        options.user_pick = pick;
    }
    if let Some(rounds) = args.rounds {
        options.total_rounds = rounds;
    }
    info!(
        "Config loaded: {} teams, {} rounds, pick #{}, dataset '{}'",
        config.draft.num_teams, options.total_rounds, options.user_pick, options.dataset
    );

    // 3. Start the draft
    let mut state = AppState::new(config);
    let opening = state
        .start(&options)
        .with_context(|| format!("failed to load dataset '{}'", options.dataset))?;

    // Log every published snapshot.
    let mut snapshots = state.session.subscribe();
    let watcher = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            if let Some(draft) = snapshots.borrow_and_update().as_ref() {
                info!(
                    "state: round {} team {} picks {} available {}",
                    draft.round(),
                    draft.current_team_index(),
                    draft.picks_made(),
                    draft.available().len()
                );
            }
        }
    });

    // 4. Draft
    let state = if args.auto {
        let mut state = state;
        print_lines(&app::run_unattended(&mut state));
        state
    } else {
        print_lines(&opening);
        run_prompt(state).await?
    };

    // 5. Summary
    print_lines(&[String::new()]);
    print_lines(&state.summary());

    drop(state);
    watcher.abort();
    info!("hoopdraft shut down cleanly");
    Ok(())
}

/// Wire stdin and stdout to the command loop.
async fn run_prompt(state: AppState) -> anyhow::Result<AppState> {
    let (line_tx, line_rx) = mpsc::channel::<String>(64);
    let (out_tx, mut out_rx) = mpsc::channel::<Vec<String>>(256);

    // Printer: every batch of output is followed by a fresh prompt.
    let printer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        let _ = stdout.write_all(b"> ").await;
        let _ = stdout.flush().await;
        while let Some(lines) = out_rx.recv().await {
            let mut text = lines.join("\n");
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str("> ");
            if stdout.write_all(text.as_bytes()).await.is_err() {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    // Stdin reads block and cannot be cancelled, so they live on a detached
    // thread that never holds up shutdown.
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else {
                error!("stdin read failed");
                break;
            };
            if line_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    let state = app::run(state, line_rx, out_tx).await?;
    let _ = printer.await;
    Ok(state)
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "hoopdraft=info,warn";

/// Send tracing output to `<log_dir>/hoopdraft.log`, truncated per run. The
/// terminal belongs to the prompt, so nothing is logged there.
fn init_tracing(log_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("hoopdraft.log");
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("failed to create {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(log_path)
}
