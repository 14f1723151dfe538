//! Per-project MemoLive settings kept next to the notes being turned into stories.
//!
//! A project can pin its own candidate chain, prompt language or timeouts in
//! `config/config.toml`. `MEMOLIVE_ENV` (default `development`) selects an
//! extra `config/<env>.toml` layered on top, e.g. a `staging.toml` that points
//! `service.base_url` at a test endpoint.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENVIRONMENT_VAR: &str = "MEMOLIVE_ENV";
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Active environment name; blank counts as unset.
pub fn environment_name() -> String {
    std::env::var(ENVIRONMENT_VAR)
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

/// Project files in ascending precedence: shared settings, then the environment overlay.
pub fn project_config_paths(workspace_root: &Path, environment: &str) -> [PathBuf; 2] {
    let config_dir = workspace_root.join("config");
    [
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", environment)),
    ]
}

/// Layer whichever project files exist onto `builder`.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let environment = environment_name();
    for path in project_config_paths(workspace_root, &environment) {
        if path.exists() {
            builder = builder.add_source(File::from(path).required(false));
        } else {
            debug!(
                config_path = %path.display(),
                environment = %environment,
                "No project configuration file"
            );
        }
    }
    Ok(builder)
}
