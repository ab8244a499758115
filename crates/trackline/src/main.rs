// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trackline - a command-line client for issue tracker servers.

mod commands;
mod host;
mod setup;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;

use trackline_config::TracklineConfig;

/// Trackline - a command-line client for issue tracker servers.
#[derive(Parser, Debug)]
#[command(name = "trackline", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show an issue.
    Issue {
        /// Readable id such as `T-42`, or the database id.
        id: String,
    },
    /// Count issues matching a search query.
    Count {
        #[arg(long)]
        query: Option<String>,
    },
    /// Show the activity stream of an issue.
    Activity {
        id: String,
        #[arg(long)]
        newest_first: bool,
    },
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => trackline_config::load_and_validate_path(path),
        None => trackline_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            trackline_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log.level);
    debug!(backend = %config.server.backend_url, "config loaded");

    let Some(command) = cli.command else {
        println!("trackline: use --help for available commands");
        return ExitCode::SUCCESS;
    };

    if run(command, &config).await {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run(command: Commands, config: &TracklineConfig) -> bool {
    if let Commands::Config = command {
        return report(commands::show_config(config));
    }

    let ctx = match setup::action_context(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {e}");
            return false;
        }
    };
    match command {
        Commands::Issue { id } => report(commands::show_issue(&ctx, &id).await),
        Commands::Count { query } => commands::count_issues(ctx, query.as_deref()).await,
        Commands::Activity { id, newest_first } => {
            commands::show_activity(ctx, config, &id, newest_first).await
        }
        Commands::Config => true,
    }
}

fn report(result: Result<(), trackline_core::TracklineError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            eprintln!("error: {}", e.user_message());
            false
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("trackline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = trackline_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn activity_accepts_newest_first() {
        let cli = Cli::try_parse_from(["trackline", "activity", "T-1", "--newest-first"]).unwrap();
        match cli.command {
            Some(Commands::Activity { id, newest_first }) => {
                assert_eq!(id, "T-1");
                assert!(newest_first);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn count_query_is_optional() {
        let cli = Cli::try_parse_from(["trackline", "count"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Count { query: None })));

        let cli = Cli::try_parse_from(["trackline", "--config", "t.toml", "count", "--query", "#Unresolved"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("t.toml")));
        assert!(matches!(cli.command, Some(Commands::Count { query: Some(ref q) }) if q == "#Unresolved"));
    }
}
