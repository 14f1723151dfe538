//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, KeyCommands, OutputFormat};
pub use presentation::{
    format_attempt_failures, format_models_json, format_models_text, format_parsed_json,
    format_parsed_text, format_story_json, format_story_text,
};
pub use route::{CliObserver, RunContext};
