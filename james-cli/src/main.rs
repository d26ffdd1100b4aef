//! James CLI
//!
//! Command-line interface for creating and inspecting James CI pipelines.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "james")]
#[command(about = "James CI pipeline CLI", long_about = None)]
struct Cli {
    /// Directory holding all pipelines of the project
    #[arg(long, env = "JAMES_PROJECT_DIR")]
    project_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "james_cli=info,james_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::new(cli.project_dir);
    config.validate()?;
    tracing::debug!("Using project directory {}", config.project_dir.display());

    handle_command(cli.command, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::PipelineCommands;

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "james",
            "--project-dir",
            "/var/ci/proj",
            "pipeline",
            "create",
            "--config",
            ".james-ci.yml",
            "--revision",
            "abc123",
            "--contact",
            "dev@x.org",
        ])
        .unwrap();

        assert_eq!(cli.project_dir, PathBuf::from("/var/ci/proj"));
        match cli.command {
            Commands::Pipeline {
                command: PipelineCommands::Create { revision, .. },
            } => assert_eq!(revision, "abc123"),
            _ => panic!("expected pipeline create"),
        }
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::try_parse_from([
            "james",
            "--project-dir",
            "/var/ci/proj",
            "pipeline",
            "show",
            "7",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Pipeline {
                command: PipelineCommands::Show { id, json },
            } => {
                assert_eq!(id, 7);
                assert!(json);
            }
            _ => panic!("expected pipeline show"),
        }
    }

    #[test]
    fn test_rejects_non_numeric_id() {
        let result = Cli::try_parse_from([
            "james",
            "--project-dir",
            "/var/ci/proj",
            "pipeline",
            "show",
            "latest",
        ]);
        assert!(result.is_err());
    }
}
