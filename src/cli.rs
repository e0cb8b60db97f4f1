use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, HarvestConfig};

/// CLI entry point. Every option defaults to the fixed batch-job settings,
/// so `vacancy_feed run` with no flags is the normal invocation.
#[derive(Parser, Debug)]
#[command(name = "vacancy_feed")]
#[command(about = "Harvest job vacancies and export them as an XML feed")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Harvest all shards, fetch descriptions and write the feed.
    Run {
        #[arg(
            short,
            long,
            default_value = Config::OUTPUT_PATH,
            help = "Output XML file (parent directories are created)"
        )]
        output: PathBuf,

        #[arg(
            short,
            long,
            default_value_t = Config::WORKERS,
            help = "Concurrent detail-page requests"
        )]
        workers: usize,

        #[arg(
            long,
            default_value_t = Config::BATCH_SIZE,
            help = "Detail pages dispatched per batch"
        )]
        batch_size: usize,

        #[arg(
            long,
            default_value_t = Config::ATTEMPTS,
            help = "Attempts per search query and per detail page"
        )]
        attempts: u32,

        #[arg(
            short,
            long,
            default_value_t = Config::TIMEOUT_SECS,
            help = "Request timeout in seconds"
        )]
        timeout: u64,

        #[arg(long, default_value = Config::LOG_DIR, help = "Directory for log files")]
        log_dir: PathBuf,

        #[arg(long, help = "Verify TLS certificates")]
        verify_tls: bool,
    },
}

impl Cli {
    /// Parse CLI arguments; clap prints help and exits with code 2 on usage errors.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Commands {
    /// Runtime configuration for a `run` invocation
    pub fn harvest_config(&self) -> HarvestConfig {
        match self {
            Commands::Run {
                output,
                workers,
                batch_size,
                attempts,
                timeout,
                verify_tls,
                ..
            } => HarvestConfig {
                workers: *workers,
                batch_size: *batch_size,
                attempts: *attempts,
                timeout_secs: *timeout,
                verify_tls: *verify_tls,
                output_path: output.clone(),
                ..HarvestConfig::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_defaults() {
        let cli = Cli::try_parse_from(["vacancy_feed", "run"]).unwrap();
        let config = cli.command.harvest_config();

        assert_eq!(config.workers, 30);
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.attempts, 3);
        assert_eq!(config.timeout_secs, 60);
        assert!(!config.verify_tls);
        assert_eq!(config.output_path, PathBuf::from("parsed_xml/vacancies.xml"));

        let Commands::Run { log_dir, .. } = cli.command;
        assert_eq!(log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_run_command_with_options() {
        let cli = Cli::try_parse_from([
            "vacancy_feed",
            "run",
            "--output",
            "/tmp/feed.xml",
            "--workers",
            "8",
            "--batch-size",
            "20",
            "--attempts",
            "5",
            "--timeout",
            "10",
            "--verify-tls",
        ])
        .unwrap();
        let config = cli.command.harvest_config();

        assert_eq!(config.output_path, PathBuf::from("/tmp/feed.xml"));
        assert_eq!(config.workers, 8);
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.attempts, 5);
        assert_eq!(config.timeout_secs, 10);
        assert!(config.verify_tls);
    }

    #[test]
    fn test_invalid_command() {
        let cli = Cli::try_parse_from(["vacancy_feed", "invalid-command"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_invalid_worker_count() {
        let cli = Cli::try_parse_from(["vacancy_feed", "run", "--workers", "many"]);
        assert_eq!(cli.unwrap_err().kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_help_does_not_panic() {
        let cli = Cli::try_parse_from(["vacancy_feed", "--help"]);
        assert_eq!(cli.unwrap_err().kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
