//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pagewalk CLI
#[derive(Parser, Debug)]
#[command(name = "pagewalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pagination configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Progress state file (JSON)
    #[arg(short, long, global = true, default_value = "pagewalk-state.json")]
    pub state: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect pagination on a page and print a summary
    Detect {
        /// Page to inspect
        #[arg(long)]
        url: String,

        /// Run the browser with a visible window
        #[arg(long)]
        headed: bool,
    },

    /// Walk pages, counting items per page and checkpointing progress
    Run {
        /// Page to start from
        #[arg(long)]
        url: String,

        /// CSS selector counted as one item (overrides the config)
        #[arg(long)]
        item_selector: Option<String>,

        /// Stop after this many pages (overrides the config)
        #[arg(long)]
        max_pages: Option<u32>,

        /// Resume from the progress state file when it exists
        #[arg(long)]
        resume: bool,

        /// Run the browser with a visible window
        #[arg(long)]
        headed: bool,
    },

    /// Show persisted progress state
    State {
        /// Reset the state file to a fresh default
        #[arg(long)]
        reset: bool,
    },

    /// Validate a configuration file and echo the effective config
    Validate,
}
