//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Create a Config builder with scalar defaults applied.
///
/// The candidate chain has no scalar default; an absent `service.candidates`
/// falls back to the built-in chain during deserialization, and a list given
/// by a higher layer replaces lower layers wholesale.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("service.base_url", crate::provider::DEFAULT_BASE_URL)?
        .set_default("service.connect_timeout_secs", 10)?
        .set_default("service.request_timeout_secs", 120)?
        .set_default("prompt.language", "Traditional Chinese")?
        .set_default("prompt.min_length", 1500)?
        .set_default("credential.env_var", crate::credential::DEFAULT_CREDENTIAL_ENV)
}

/// Environment overrides: `MEMOLIVE__SERVICE__BASE_URL` sets `service.base_url`.
pub fn environment_source() -> Environment {
    Environment::with_prefix("MEMOLIVE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
