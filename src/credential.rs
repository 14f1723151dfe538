//! Credential persistence.
//!
//! The API key is kept under a single fixed key (`gemini_key`) in a small TOML
//! file in the user's data directory. It leaves the machine only as the
//! authentication parameter of a generation request.

use crate::error::ApiError;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Fixed storage key for the API key.
pub const CREDENTIAL_KEY: &str = "gemini_key";

/// Environment variable consulted before the store.
pub const DEFAULT_CREDENTIAL_ENV: &str = "GEMINI_API_KEY";

/// Key-value persistence for the API key.
pub trait CredentialStore: Send + Sync {
    /// Stored key, or `None` when nothing (or only blanks) is stored.
    fn load(&self) -> Result<Option<String>, ApiError>;

    fn save(&self, credential: &str) -> Result<(), ApiError>;

    fn clear(&self) -> Result<(), ApiError>;

    /// Where the key lives, for user-facing messages.
    fn location(&self) -> Option<PathBuf> {
        None
    }
}

/// On-disk layout of the credential file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default, rename = "gemini_key", skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

/// Default credential file: `$XDG_DATA_HOME/memolive/credentials.toml`.
pub fn default_credential_path() -> Result<PathBuf, ApiError> {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        if !data_home.is_empty() {
            return Ok(PathBuf::from(data_home)
                .join("memolive")
                .join("credentials.toml"));
        }
    }
    directories::BaseDirs::new()
        .map(|dirs| dirs.data_dir().join("memolive").join("credentials.toml"))
        .ok_or_else(|| {
            ApiError::CredentialStore("Could not determine the user data directory".to_string())
        })
}

/// TOML file store.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at `path`, or at the default location when `None`.
    pub fn at(path: Option<PathBuf>) -> Result<Self, ApiError> {
        match path {
            Some(path) => Ok(Self::new(path)),
            None => Ok(Self::new(default_credential_path()?)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredCredentials, ApiError> {
        if !self.path.exists() {
            return Ok(StoredCredentials::default());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ApiError::CredentialStore(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            ApiError::CredentialStore(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write(&self, stored: &StoredCredentials) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::CredentialStore(format!(
                    "Failed to create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let content = toml::to_string_pretty(stored)
            .map_err(|e| ApiError::CredentialStore(format!("Failed to serialize: {}", e)))?;
        std::fs::write(&self.path, content).map_err(|e| {
            ApiError::CredentialStore(format!(
                "Failed to write {}: {}",
                self.path.display(),
                e
            ))
        })?;
        restrict_permissions(&self.path)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), ApiError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(|e| {
        ApiError::CredentialStore(format!(
            "Failed to set permissions on {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), ApiError> {
    Ok(())
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>, ApiError> {
        Ok(self.read()?.key.and_then(non_blank))
    }

    fn save(&self, credential: &str) -> Result<(), ApiError> {
        let credential = non_blank(credential.to_string()).ok_or(ApiError::MissingCredential)?;
        let mut stored = self.read()?;
        stored.key = Some(credential);
        stored.updated_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        self.write(&stored)?;
        debug!(path = %self.path.display(), "Saved credential");
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut stored = self.read()?;
        stored.key = None;
        stored.updated_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        self.write(&stored)
    }

    fn location(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

/// In-process store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    value: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>, ApiError> {
        let value = self
            .value
            .lock()
            .map_err(|_| ApiError::CredentialStore("credential lock poisoned".to_string()))?;
        Ok(value.clone())
    }

    fn save(&self, credential: &str) -> Result<(), ApiError> {
        let credential = non_blank(credential.to_string()).ok_or(ApiError::MissingCredential)?;
        let mut value = self
            .value
            .lock()
            .map_err(|_| ApiError::CredentialStore("credential lock poisoned".to_string()))?;
        *value = Some(credential);
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        let mut value = self
            .value
            .lock()
            .map_err(|_| ApiError::CredentialStore("credential lock poisoned".to_string()))?;
        *value = None;
        Ok(())
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Pick the credential: explicit value, then environment variable, then store.
/// Blank values count as absent at every level.
pub fn resolve_credential(
    explicit: Option<&str>,
    env_var: &str,
    store: &dyn CredentialStore,
) -> Result<String, ApiError> {
    if let Some(value) = explicit.and_then(|v| non_blank(v.to_string())) {
        return Ok(value);
    }
    if let Some(value) = std::env::var(env_var).ok().and_then(non_blank) {
        debug!(env_var, "Using credential from environment");
        return Ok(value);
    }
    store.load()?.ok_or(ApiError::MissingCredential)
}

/// Masked form for display: first and last four characters.
pub fn mask(credential: &str) -> String {
    let chars: Vec<char> = credential.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
}
