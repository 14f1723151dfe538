//! Config loading facade: one entry point over defaults, files, and environment.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::MemoConfig;
use crate::error::ApiError;
use config::File;
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global file, `config/config.toml`,
    /// `config/{MEMOLIVE_ENV}.toml`, `MEMOLIVE__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<MemoConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = builder.add_source(merge_policy::environment_source());

        let config: MemoConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            candidates = config.service.candidates.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load a single config file over the defaults, ignoring other files.
    pub fn load_from_file(path: &Path) -> Result<MemoConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config: MemoConfig = merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .add_source(merge_policy::environment_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Load and validate, folding every validation error into one message.
    pub fn load_validated(
        workspace_root: &Path,
        config_path: Option<&Path>,
    ) -> Result<MemoConfig, ApiError> {
        let config = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load(workspace_root)?,
        };
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
