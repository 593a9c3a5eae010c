use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::NavigationBounds;

/// stepform - Multi-step form wizard for the terminal
#[derive(Parser)]
#[command(name = "stepform")]
#[command(about = "Fill in multi-step forms with validation, counters and repeatable entries")]
#[command(version)]
pub struct Cli {
    /// Settings file (JSON); built-in defaults when omitted
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Write log output to this file instead of stderr.
    ///
    /// The interactive form owns the terminal, so without a log file only
    /// warnings and errors are logged while it runs.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in a form interactively (default)
    Run {
        /// Form definition file; the built-in application form when omitted
        #[arg(short, long)]
        form: Option<PathBuf>,

        /// Where accepted submissions are written
        #[arg(short, long, default_value = "submission.json")]
        output: PathBuf,

        /// Keep step navigation within the first and last section
        #[arg(long, conflicts_with = "unbounded")]
        clamp: bool,

        /// Let step navigation move past either end of the form
        #[arg(long)]
        unbounded: bool,
    },
    /// Replay a submission of saved responses without a terminal
    Check {
        /// Form definition file; the built-in application form when omitted
        #[arg(short, long)]
        form: Option<PathBuf>,

        /// JSON object of field name to value
        #[arg(short, long)]
        responses: Option<PathBuf>,
    },
    /// Write the built-in form definition as JSON
    Template {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    /// Navigation override requested on the command line, if any
    pub fn navigation_override(&self) -> Option<NavigationBounds> {
        match self {
            Self::Run { clamp: true, .. } => Some(NavigationBounds::Clamped),
            Self::Run {
                unbounded: true, ..
            } => Some(NavigationBounds::Unbounded),
            _ => None,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
