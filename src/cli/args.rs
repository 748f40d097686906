//! CLI argument definitions using clap
//!
//! Commands:
//! - delegation-analyzer check [--input <case.json>] [--config <path>]
//! - delegation-analyzer explain [--input <case.json>] [--config <path>]
//!
//! Without `--input` the case is read from stdin.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Delegation analysis for formula expressions over remote data sources
#[derive(Parser, Debug)]
#[command(name = "delegation-analyzer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate an analysis case and print the verdict as JSON
    Check {
        /// Path to the analysis case (stdin if omitted)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate an analysis case and print a human-readable report
    Explain {
        /// Path to the analysis case (stdin if omitted)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
