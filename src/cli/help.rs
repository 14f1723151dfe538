//! CLI command-name contract for logging.

use crate::cli::parse::{Commands, KeyCommands};

/// Command name string for log records (e.g. "generate", "key.set").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Generate { .. } => "generate".to_string(),
        Commands::Parse { .. } => "parse".to_string(),
        Commands::Key { command } => format!("key.{}", key_command_name(command)),
        Commands::Models { .. } => "models".to_string(),
    }
}

pub fn key_command_name(command: &KeyCommands) -> &'static str {
    match command {
        KeyCommands::Set { .. } => "set",
        KeyCommands::Show => "show",
        KeyCommands::Clear => "clear",
    }
}
