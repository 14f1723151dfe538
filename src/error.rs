//! Error types for MemoLive story generation.

use thiserror::Error;

/// Errors raised by generation, configuration, and credential handling.
///
/// Per-attempt provider failures are carried inside
/// [`GenerationOutcome::Failure`](crate::generation::GenerationOutcome) rather
/// than returned as `Err`; only precondition and infrastructure problems
/// propagate through `Result`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("No API key configured. Run `memolive key set` or pass --key.")]
    MissingCredential,

    #[error("No candidate models configured")]
    NoCandidates,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Provider returned no text: {0}")]
    EmptyResponse(String),

    #[error("Attempt timed out after {0} seconds")]
    AttemptTimeout(u64),

    #[error(
        "All {0} model(s) failed. Please verify your API key, or try again later \
         (a newly created key can take a few minutes to become active)."
    )]
    AllAttemptsExhausted(usize),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Credential store error: {0}")]
    CredentialStore(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Failed to render output: {0}")]
    Output(String),
}

impl ApiError {
    /// Whether this error came back from a single provider attempt.
    pub fn is_attempt_failure(&self) -> bool {
        matches!(
            self,
            ApiError::ProviderError(_)
                | ApiError::ProviderRequestFailed(_)
                | ApiError::ProviderAuthFailed(_)
                | ApiError::ProviderRateLimit(_)
                | ApiError::ProviderModelNotFound(_)
                | ApiError::EmptyResponse(_)
                | ApiError::AttemptTimeout(_)
        )
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Io(err.to_string())
    }
}
