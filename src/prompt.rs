//! Story prompt: role framing plus the `[MUSIC: <keyword>]` formatting contract.

use serde::{Deserialize, Serialize};

/// Keyword the model is told to emit when the note is about a film or TV drama.
pub const SOUNDTRACK_KEYWORD: &str = "OST";

/// Prompt settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Language of the generated story
    #[serde(default = "default_language")]
    pub language: String,

    /// Minimum story length, in characters
    #[serde(default = "default_min_length")]
    pub min_length: u32,
}

fn default_language() -> String {
    "Traditional Chinese".to_string()
}

fn default_min_length() -> u32 {
    1500
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            min_length: default_min_length(),
        }
    }
}

impl PromptConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.language.trim().is_empty() {
            return Err("Prompt language cannot be empty".to_string());
        }
        if self.min_length == 0 {
            return Err("Prompt min_length must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Renders the instruction sent with every attempt.
#[derive(Debug, Clone)]
pub struct StoryPrompt {
    config: PromptConfig,
}

impl StoryPrompt {
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, note: &str) -> String {
        format!(
            "Role: professional fan-fiction novelist.\n\
             Tasks:\n\
             1. Analyze the user's note:\n{note}\n\
             2. If the note mentions a specific singer or group, use that name as the music keyword; \
             if it is about a film or TV drama, use '{ost}'.\n\
             3. [IMPORTANT] Response format: the first line MUST be [MUSIC: keyword]; \
             the story starts on the second line.\n\
             4. Continue the story in {language}, at least {min_length} characters, \
             imitating the user's writing style.\n",
            note = note.trim(),
            ost = SOUNDTRACK_KEYWORD,
            language = self.config.language,
            min_length = self.config.min_length,
        )
    }
}

impl Default for StoryPrompt {
    fn default() -> Self {
        Self::new(PromptConfig::default())
    }
}
