//! stratux-feed: Drive stratux-core from a hub or a recorded capture.
//!
//! Supports:
//! - Replaying a capture file (one `channel;frame` per line) through the coordinator
//! - Reading the four live websocket streams of a hub
//!
//! Events print to stdout as text or JSON lines. Logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, error, info, warn};

use stratux_core::config::{self, Config};
use stratux_core::{StreamContext, StreamCoordinator};

mod capture;
mod live;
mod logging;
mod output;

#[derive(Parser)]
#[command(
    name = "stratux-feed",
    version,
    about = "Stratux hub stream ingestion and correlation"
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded capture file through the coordinator
    Replay {
        /// Capture file, or `-` for stdin
        file: PathBuf,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,

        /// Config file (default: ~/.stratux-feed/config.yaml)
        #[arg(long, env = "STRATUX_FEED_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Connect to a hub and follow its live streams
    Live {
        /// Hub host, overriding the config file
        #[arg(long)]
        host: Option<String>,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,

        /// Config file (default: ~/.stratux-feed/config.yaml)
        #[arg(long, env = "STRATUX_FEED_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Replay { file, json, config } => match resolve_config(config.as_deref()) {
            Some(cfg) => cmd_replay(&file, json, &cfg),
            None => ExitCode::FAILURE,
        },
        Commands::Live { host, json, config } => match resolve_config(config.as_deref()) {
            Some(mut cfg) => {
                if let Some(host) = host {
                    cfg.hub.host = host;
                }
                cmd_live(json, &cfg)
            }
            None => ExitCode::FAILURE,
        },
    }
}

/// An explicit config path must load; the default location falls back to
/// built-in defaults.
fn resolve_config(path: Option<&Path>) -> Option<Config> {
    match path {
        Some(path) => match config::load_config_from(path) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                error!("{e}");
                None
            }
        },
        None => Some(config::load_config()),
    }
}

fn cmd_replay(file: &Path, json: bool, cfg: &Config) -> ExitCode {
    let reader = match capture::open(file) {
        Ok(r) => r,
        Err(e) => {
            error!(file = %file.display(), error = %e, "cannot open capture");
            return ExitCode::FAILURE;
        }
    };

    info!(file = %file.display(), filter = ?cfg.traffic.filter, "replaying capture");

    let mut coordinator = StreamCoordinator::new(StreamContext::from_config(cfg));
    let frames = capture::frames(reader, |line_no, e| {
        warn!(line = line_no, error = %e, "skipping capture line");
    });
    for captured in frames {
        let events = coordinator.process(captured.channel, &captured.frame);
        if events.is_empty() {
            debug!(line = captured.line_no, channel = %captured.channel, "frame produced no events");
        }
        for event in &events {
            output::print_event(event, json);
        }
    }

    finish(&coordinator, json, cfg);
    ExitCode::SUCCESS
}

fn cmd_live(json: bool, cfg: &Config) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "cannot start async runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(host = %cfg.hub.host, "following hub streams");

    let mut coordinator = StreamCoordinator::new(StreamContext::from_config(cfg));
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    runtime.block_on(live::run(
        &cfg.hub,
        &mut coordinator,
        |event| output::print_event(event, json),
        interrupted,
    ));

    finish(&coordinator, json, cfg);
    ExitCode::SUCCESS
}

/// Closing summary. Skipped in JSON mode so stdout stays line-delimited JSON.
fn finish(coordinator: &StreamCoordinator, json: bool, cfg: &Config) {
    let stats = coordinator.stats();
    info!(
        frames = stats.frames,
        contacts = coordinator.context().tracker.len(),
        "done"
    );
    if json {
        return;
    }
    output::print_traffic_table(&coordinator.context().tracker, cfg.traffic.filter);
    output::print_stats(&stats);
}
