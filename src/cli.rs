//! Command-line entry points: serve the API, replay a feed, migrate.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    configuration::{get_configuration, set_configuration, Config},
    error::Error,
    migration,
};

/// eBTC CDP metrics indexer
#[derive(Parser)]
#[command(name = "cdp-etl")]
#[command(about = "CDP lending aggregate indexer", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the read API (default if no command specified)
    Serve {
        /// Replay this JSON-lines event feed before serving
        #[arg(long)]
        events: Option<PathBuf>,
    },

    /// Replay a JSON-lines event feed and exit
    Ingest {
        file: PathBuf,
    },

    /// Run database migrations for the postgres store
    Migrate,
}

pub fn init_config() -> Result<Config, Error> {
    set_configuration()?;
    get_configuration()
}

pub async fn run_migrate() -> Result<(), Error> {
    let config = init_config()?;
    migration::run_migrations(config.database_url()?).await?;
    tracing::info!("Migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_parses() {
        let cli = Cli::try_parse_from(["cdp-etl"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_ingest_requires_file() {
        assert!(Cli::try_parse_from(["cdp-etl", "ingest"]).is_err());

        let cli = Cli::try_parse_from(["cdp-etl", "ingest", "feed.jsonl"]).unwrap();
        match cli.command {
            Some(Commands::Ingest { file }) => {
                assert_eq!(file, PathBuf::from("feed.jsonl"))
            },
            _ => panic!("expected ingest"),
        }
    }

    #[test]
    fn test_serve_with_events() {
        let cli =
            Cli::try_parse_from(["cdp-etl", "serve", "--events", "feed.jsonl"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Serve { events: Some(_) })
        ));
    }
}
