use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use replay_cli::commands::{days, summary, top, years};
use replay_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    match &cli.command {
        Some(Commands::Summary { export, json }) => {
            summary::run(export, *json)?;
        }
        Some(Commands::Top {
            export,
            kind,
            by,
            limit,
            json,
        }) => {
            let limit = limit.unwrap_or(config.default_limit);
            top::run(export, *kind, *by, limit, *json)?;
        }
        Some(Commands::Days {
            export,
            best,
            limit,
            json,
        }) => {
            days::run(export, *best, *limit, config.breakdown_limit, *json)?;
        }
        Some(Commands::Years { export, json }) => {
            years::run(export, *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
