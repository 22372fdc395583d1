//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::OutputFormat;

/// Conditional-branching workflow trees: persistent tree edits with linear undo/redo
#[derive(Parser, Debug)]
#[command(name = "rsflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file (TOML), layered over the global config
    #[arg(short, long, global = true, env = "RSFLOW_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply an edit script to a fresh tree and print the result
    Run {
        /// Script file, or '-' for stdin
        script: PathBuf,

        /// Start from an exported JSON tree instead of the root-only tree
        #[arg(long)]
        from: Option<PathBuf>,

        /// Output format (default from config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print the initial root-only tree
    New {
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Validate an exported JSON tree and print it
    Render {
        /// JSON file, or '-' for stdin
        input: PathBuf,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
}
