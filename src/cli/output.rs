//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::MissingCredential => format!(
            "{}\nThe key can also come from the environment variable named by `credential.env_var` (default GEMINI_API_KEY).",
            e
        ),
        _ => e.to_string(),
    }
}
