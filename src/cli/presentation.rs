//! Presentation: text/json formatting for story, parse, models, and failure output.

use crate::error::ApiError;
use crate::generation::AttemptFailure;
use crate::parser::ParsedStory;
use crate::provider::ServiceConfig;
use crate::view::ViewState;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::Output(e.to_string()))
}

pub fn format_story_text(view: &ViewState, used_model: &str) -> String {
    let mut output = String::new();
    match view.playable_keyword() {
        Some(keyword) => {
            output.push_str(&format!("♪ BGM: {}\n\n", keyword.magenta().bold()));
        }
        None => output.push_str(&format!("{}\n\n", "♪ (no music)".dimmed())),
    }
    output.push_str(&view.generated_text);
    output.push_str(&format!("\n\n{}", format!("model: {}", used_model).dimmed()));
    output
}

pub fn format_story_json(view: &ViewState, used_model: &str) -> Result<String, ApiError> {
    to_pretty_json(&json!({
        "model": used_model,
        "music_keyword": view.music_keyword,
        "playable_keyword": view.playable_keyword(),
        "body": view.generated_text,
        "status": view.status,
    }))
}

pub fn format_parsed_text(story: &ParsedStory) -> String {
    let keyword = match &story.music_keyword {
        Some(k) if k.is_empty() => "(empty)".to_string(),
        Some(k) => k.clone(),
        None => "(none)".to_string(),
    };
    format!("Music keyword: {}\n\n{}", keyword, story.body)
}

pub fn format_parsed_json(story: &ParsedStory) -> Result<String, ApiError> {
    to_pretty_json(&json!({
        "music_keyword": story.music_keyword,
        "body": story.body,
    }))
}

pub fn format_models_text(candidates: &[ServiceConfig]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Model", "API", "Web search", "Safety settings"]);
    for (index, candidate) in candidates.iter().enumerate() {
        let safety = if candidate.safety.is_empty() {
            "-".to_string()
        } else {
            candidate
                .safety
                .iter()
                .map(|s| format!("{}={}", s.category, s.threshold))
                .collect::<Vec<_>>()
                .join("\n")
        };
        table.add_row(vec![
            (index + 1).to_string(),
            candidate.model.clone(),
            candidate.api_version.to_string(),
            if candidate.web_search { "yes" } else { "no" }.to_string(),
            safety,
        ]);
    }
    format!("{}\nTotal: {} candidate(s)", table, candidates.len())
}

pub fn format_models_json(candidates: &[ServiceConfig]) -> Result<String, ApiError> {
    to_pretty_json(&json!({
        "candidates": candidates,
        "total": candidates.len(),
    }))
}

/// Per-attempt failure table for stderr.
pub fn format_attempt_failures(attempted: &[AttemptFailure]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Model", "Error"]);
    for (index, failure) in attempted.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            failure.config.model.clone(),
            failure.detail.to_string(),
        ]);
    }
    table.to_string()
}
