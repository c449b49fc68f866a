/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info, warn};

use departure_board::clock::SystemClock;
use departure_board::config::{BoardConfig, Mode};
use departure_board::display::{startup_banner, TerminalRenderer};
use departure_board::live::LiveBoardClient;
use departure_board::runner::BoardRunner;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Railway departure board: invented timetable or live National Rail data.
///
/// Example:
///   departure-board --config demos/board.yaml --seed 42
#[derive(Debug, Parser)]
#[command(
    name = "departure-board",
    about = "Rolling three-row railway departure board",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML board configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Override the mode from the configuration file.
    #[arg(short = 'm', long = "mode", value_enum)]
    mode: Option<Mode>,

    /// Live-mode API key (overrides the configuration file).
    #[arg(long = "api-key", env = "DEPARTURE_BOARD_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Seed for the fantasy timetable; the same seed and start time give the
    /// same trains.
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Stop after this many ticks instead of running until interrupted.
    #[arg(short = 't', long = "ticks")]
    ticks: Option<u64>,

    /// Do not clear the terminal between frames.
    #[arg(long = "no-clear", default_value_t = false)]
    no_clear: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    info!("Departure board starting up...");

    // ── Parse CLI arguments ───────────────────────────────────────────────────
    let cli = Cli::parse();

    info!(
        config = ?cli.config,
        mode   = ?cli.mode,
        seed   = ?cli.seed,
        ticks  = ?cli.ticks,
        "Command line"
    );

    // ── Load configuration ────────────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => match BoardConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load board configuration: {:#}", e);
                process::exit(1);
            }
        },
        None => {
            warn!("No configuration file provided, using the default fantasy board");
            BoardConfig::default()
        }
    };
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(key) = cli.api_key {
        config.live.api_key = key;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        eprintln!("Error : {e}");
        if config.mode == Mode::Live {
            eprintln!(
                "Please check at https://www.nationalrail.co.uk/100296.aspx for further information on this service."
            );
        }
        process::exit(1);
    }

    // ── Build the board ───────────────────────────────────────────────────────
    let renderer = TerminalRenderer::new(io::stdout(), !cli.no_clear);
    let rng = match cli.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut runner = match config.mode {
        Mode::Fantasy => BoardRunner::fantasy(&config, SystemClock, rng, renderer),
        Mode::Live => match LiveBoardClient::new(config.live.clone()) {
            Ok(client) => BoardRunner::live(&config, client, SystemClock, renderer),
            Err(e) => {
                error!("Failed to create the live data client: {}", e);
                process::exit(1);
            }
        },
    };

    // ── Run ───────────────────────────────────────────────────────────────────
    let banner = startup_banner(&config);
    let pause = Duration::from_secs(config.polling.startup_pause_secs);

    let result = match runner.startup(&banner, pause).await {
        Ok(()) => runner.run(cli.ticks).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("Departure board stopped: {}", e);
        process::exit(1);
    }
}
