//! Configuration System
//!
//! Layered configuration: built-in defaults, the global config file, the
//! workspace config files, then `MEMOLIVE__*` environment variables. The
//! candidate model chain, prompt settings, credential lookup, and logging are
//! all configured here.

use crate::logging::LoggingConfig;
use crate::prompt::PromptConfig;
use crate::provider::{default_candidates, HttpTimeouts, ServiceConfig, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoConfig {
    #[serde(default)]
    pub service: ServiceSettings,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub credential: CredentialConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generation service settings and the ordered candidate chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Candidates in preference order; tried first to last.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<ServiceConfig>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional cap on a single attempt, on top of the HTTP timeouts
    #[serde(default)]
    pub attempt_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            candidates: default_candidates(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            attempt_timeout_secs: None,
        }
    }
}

impl ServiceSettings {
    pub fn http_timeouts(&self) -> HttpTimeouts {
        HttpTimeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            request: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!(
                "base_url must start with http:// or https:// (got '{}')",
                self.base_url
            ));
        }
        if self.candidates.is_empty() {
            return Err("At least one candidate model is required".to_string());
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err("HTTP timeouts must be greater than zero".to_string());
        }
        if self.attempt_timeout_secs == Some(0) {
            return Err("attempt_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Where the API key comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Environment variable consulted before the credential store
    #[serde(default = "default_env_var")]
    pub env_var: String,

    /// Credential file (defaults to the XDG data directory)
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

fn default_env_var() -> String {
    crate::credential::DEFAULT_CREDENTIAL_ENV.to_string()
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            env_var: default_env_var(),
            store_path: None,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Service(String),
    Candidate(usize, String),
    Prompt(String),
    Credential(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Service(msg) => write!(f, "Service: {}", msg),
            ValidationError::Candidate(index, msg) => {
                write!(f, "Candidate #{}: {}", index + 1, msg)
            }
            ValidationError::Prompt(msg) => write!(f, "Prompt: {}", msg),
            ValidationError::Credential(msg) => write!(f, "Credential: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl MemoConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.service.validate() {
            errors.push(ValidationError::Service(e));
        }

        for (index, candidate) in self.service.candidates.iter().enumerate() {
            if let Err(e) = candidate.validate() {
                errors.push(ValidationError::Candidate(index, e));
            }
        }

        if let Err(e) = self.prompt.validate() {
            errors.push(ValidationError::Prompt(e));
        }

        if self.credential.env_var.trim().is_empty() {
            errors.push(ValidationError::Credential(
                "env_var cannot be empty".to_string(),
            ));
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
