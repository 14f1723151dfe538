//! Integration tests for MemoLive story generation

mod cli_commands;
mod config_layering;
mod gemini_client;
mod test_utils;
