//! Presentation state for a generation session.
//!
//! Every flag the front end renders from lives in one [`ViewState`] value that
//! is updated through explicit transitions.

use crate::error::ApiError;
use crate::generation::GenerationOutcome;
use crate::parser::parse;
use crate::provider::ServiceConfig;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub loading: bool,
    /// Story body once a generation succeeded; empty while editing the note.
    pub generated_text: String,
    pub music_keyword: Option<String>,
    /// One-line progress message ("Trying model ...").
    pub status: String,
    /// Message for the user after every model failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub settings_visible: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_generation(&mut self) {
        self.loading = true;
        self.generated_text.clear();
        self.music_keyword = None;
        self.error = None;
        self.status = "Connecting...".to_string();
    }

    pub fn attempt_started(&mut self, config: &ServiceConfig) {
        self.status = format!("Trying model: {}...", config.model);
    }

    pub fn finish(&mut self, outcome: &GenerationOutcome) {
        self.loading = false;
        match outcome {
            GenerationOutcome::Success {
                raw_text,
                used_config,
            } => {
                let story = parse(raw_text);
                self.generated_text = story.body;
                self.music_keyword = story.music_keyword;
                self.status = format!("Connected using model: {}", used_config.model);
            }
            GenerationOutcome::Failure { attempted } => {
                self.status = "All models failed".to_string();
                self.error = Some(ApiError::AllAttemptsExhausted(attempted.len()).to_string());
            }
        }
    }

    /// Back to the note editor. The keyword stays so music keeps playing
    /// until the next generation starts.
    pub fn clear(&mut self) {
        self.generated_text.clear();
        self.status.clear();
        self.error = None;
    }

    pub fn toggle_settings(&mut self) {
        self.settings_visible = !self.settings_visible;
    }

    pub fn has_story(&self) -> bool {
        !self.generated_text.is_empty()
    }

    /// Keyword worth starting music for: blank keywords count as no music.
    pub fn playable_keyword(&self) -> Option<&str> {
        self.music_keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
