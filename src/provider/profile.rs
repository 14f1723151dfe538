//! Service configuration: one candidate model in the fallback chain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generative Language API version segment used in the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApiVersion {
    #[default]
    #[serde(rename = "v1")]
    V1,
    #[serde(rename = "v1beta")]
    V1Beta,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V1Beta => "v1beta",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content-filter threshold for a single harm category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    /// e.g. `HARM_CATEGORY_HARASSMENT`
    pub category: String,
    /// e.g. `BLOCK_NONE`, `BLOCK_ONLY_HIGH`
    pub threshold: String,
}

impl SafetySetting {
    pub fn new(category: impl Into<String>, threshold: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            threshold: threshold.into(),
        }
    }
}

/// A named backend model plus optional capability flags.
///
/// Candidates are defined statically and never mutated while a generation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Model identifier, e.g. `gemini-1.5-flash`
    pub model: String,

    #[serde(default)]
    pub api_version: ApiVersion,

    /// Request web search grounding (only served on `v1beta`)
    #[serde(default)]
    pub web_search: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety: Vec<SafetySetting>,
}

impl ServiceConfig {
    /// Plain candidate on the stable API with no capability flags.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_version: ApiVersion::V1,
            web_search: false,
            safety: Vec::new(),
        }
    }

    /// Enable search grounding. Grounding is a beta feature, so the
    /// candidate moves to `v1beta`.
    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self.api_version = ApiVersion::V1Beta;
        self
    }

    pub fn with_safety(mut self, safety: Vec<SafetySetting>) -> Self {
        self.safety = safety;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model identifier cannot be empty".to_string());
        }
        if self.model.contains('/') || self.model.chars().any(char::is_whitespace) {
            return Err(format!(
                "Model identifier '{}' must not contain '/' or whitespace",
                self.model
            ));
        }
        if self.web_search && self.api_version != ApiVersion::V1Beta {
            return Err(format!(
                "Model '{}': web_search requires api_version = \"v1beta\"",
                self.model
            ));
        }
        for setting in &self.safety {
            if setting.category.trim().is_empty() || setting.threshold.trim().is_empty() {
                return Err(format!(
                    "Model '{}': safety settings need both category and threshold",
                    self.model
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.model, self.api_version)?;
        if self.web_search {
            write!(f, " +search")?;
        }
        Ok(())
    }
}

/// Built-in fallback chain, most preferred first.
pub fn default_candidates() -> Vec<ServiceConfig> {
    [
        "gemini-1.5-flash",
        "gemini-1.5-flash-001",
        "gemini-pro",
        "gemini-1.0-pro",
    ]
    .into_iter()
    .map(ServiceConfig::new)
    .collect()
}
