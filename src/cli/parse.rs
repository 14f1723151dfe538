//! CLI parse: clap types for MemoLive. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// MemoLive CLI - turn a note into a story with a background-music keyword
#[derive(Parser)]
#[command(name = "memolive")]
#[command(about = "Turn a note into a generated story with a background-music keyword")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (for config/config.toml)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a story from a note, falling back through the candidate models
    Generate {
        /// Note text (omit to read --file or stdin)
        note: Option<String>,
        /// Read the note from a file
        #[arg(long, conflicts_with = "note")]
        file: Option<PathBuf>,
        /// API key for this run (otherwise env var, then the stored key)
        #[arg(long)]
        key: Option<String>,
        /// Candidate model, repeatable; replaces the configured chain in the given order
        #[arg(long = "model")]
        models: Vec<String>,
        /// Enable web search grounding on every candidate
        #[arg(long)]
        web_search: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Split generated text into music keyword and story body
    Parse {
        /// Read the text from a file (default: stdin)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
    /// List the configured candidate models in fallback order
    Models {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Store an API key (prompts when no value is given)
    Set {
        /// API key value
        value: Option<String>,
    },
    /// Show the stored API key, masked
    Show,
    /// Remove the stored API key
    Clear,
}
