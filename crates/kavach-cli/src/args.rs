//! Command-line argument parsing for Kavach.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kavach - validate identity documents with OCR and AI analysis
#[derive(Parser, Debug)]
#[command(name = "kavach")]
#[command(version)]
#[command(about = "Validate identity documents with OCR and AI analysis", long_about = None)]
pub struct Args {
    /// Configuration file path (defaults to ./kavach.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -v (debug), -vv (trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a batch of one to five documents and store the report
    Validate {
        /// Document images, in upload order
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a single document without touching the stored report
    Check {
        /// Document image
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show the stored report
    Report {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove the stored report
    Clear,

    /// Display current configuration
    Config,
}

impl Args {
    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
