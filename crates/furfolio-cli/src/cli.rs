//! CLI definition using clap

use clap::{Parser, Subcommand};
use furfolio_types::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "furfolio")]
#[command(version)]
#[command(about = "Grooming business analytics over CSV exports")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding owners.csv, appointments.csv, charges.csv, behavior_logs.csv
    #[arg(long, short = 'd', global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Evaluate as of this date (YYYY-MM-DD). Defaults to the local date.
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Per-service counts, durations and revenue
    Services,

    /// Compare bookings in the recent window against the one before it
    Trends {
        /// Window length in days. Uses config value if not specified.
        #[arg(long, short = 'w')]
        window: Option<u32>,
    },

    /// Smooth daily bookings and project them forward
    Forecast {
        /// Smoothing factor in [0, 1]
        #[arg(long, short = 'a')]
        alpha: Option<f64>,

        /// Days to project
        #[arg(long)]
        horizon: Option<u32>,

        /// Days of history to smooth
        #[arg(long)]
        history: Option<u32>,
    },

    /// Tag customers new, active, returning, at risk or inactive
    Retention,

    /// Score customers for churn risk
    Churn {
        /// Only show the riskiest N customers
        #[arg(long, short = 'n')]
        top: Option<usize>,
    },

    /// Classify behavior notes per dog
    Behavior {
        /// Only this dog
        #[arg(long)]
        dog: Option<String>,
    },

    /// Loyalty tier and rewards per customer
    Loyalty,

    /// Run every analysis, optionally exporting to Excel
    Report {
        /// Output .xlsx path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set the CSV data directory
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set the behavior keyword rules TOML file
        #[arg(long)]
        set_keyword_rules: Option<PathBuf>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "furfolio", "churn", "--top", "5", "--today", "2026-03-31", "-f", "json",
        ])
        .unwrap();
        assert_eq!(cli.today.as_deref(), Some("2026-03-31"));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Churn { top: Some(5) }));
    }
}
