//! Story Request Orchestrator
//!
//! Walks an ordered list of candidate [`ServiceConfig`]s and returns the first
//! generated text any of them produces. Candidates are tried strictly one after
//! another, each attempt fully awaited before the next starts. There is no
//! backoff, no fan-out, and no memory between calls: every invocation starts
//! again from the first candidate.

use crate::error::ApiError;
use crate::parser::{parse, ParsedStory};
use crate::prompt::StoryPrompt;
use crate::provider::{GenerationClient, ServiceConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Input for one user-initiated generation. Immutable once built.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    note: String,
    credential: String,
    candidates: Vec<ServiceConfig>,
}

impl GenerationRequest {
    /// Validates the preconditions: a non-blank credential and at least one candidate.
    pub fn new(
        note: impl Into<String>,
        credential: impl Into<String>,
        candidates: Vec<ServiceConfig>,
    ) -> Result<Self, ApiError> {
        let credential = credential.into();
        if credential.trim().is_empty() {
            return Err(ApiError::MissingCredential);
        }
        if candidates.is_empty() {
            return Err(ApiError::NoCandidates);
        }
        Ok(Self {
            note: note.into(),
            credential: credential.trim().to_string(),
            candidates,
        })
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn candidates(&self) -> &[ServiceConfig] {
        &self.candidates
    }

    pub(crate) fn credential(&self) -> &str {
        &self.credential
    }
}

/// One failed attempt: the candidate and why it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub config: ServiceConfig,
    pub detail: ApiError,
}

/// Result of a whole orchestration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success {
        raw_text: String,
        used_config: ServiceConfig,
    },
    /// Every candidate failed; one entry per candidate, in attempt order.
    Failure { attempted: Vec<AttemptFailure> },
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success { .. })
    }

    /// Parsed story for a successful outcome.
    pub fn story(&self) -> Option<ParsedStory> {
        match self {
            GenerationOutcome::Success { raw_text, .. } => Some(parse(raw_text)),
            GenerationOutcome::Failure { .. } => None,
        }
    }

    /// Convert to a `Result`, mapping exhaustion to [`ApiError::AllAttemptsExhausted`].
    pub fn into_result(self) -> Result<(String, ServiceConfig), ApiError> {
        match self {
            GenerationOutcome::Success {
                raw_text,
                used_config,
            } => Ok((raw_text, used_config)),
            GenerationOutcome::Failure { attempted } => {
                Err(ApiError::AllAttemptsExhausted(attempted.len()))
            }
        }
    }
}

/// Position of the orchestrator in the candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Pending,
    Trying(usize),
    Succeeded(usize),
    Exhausted,
}

impl AttemptState {
    /// State after the current attempt finished with `succeeded`.
    pub fn advance(self, succeeded: bool, candidate_count: usize) -> AttemptState {
        match self {
            AttemptState::Pending if candidate_count == 0 => AttemptState::Exhausted,
            AttemptState::Pending => AttemptState::Trying(0),
            AttemptState::Trying(index) if succeeded => AttemptState::Succeeded(index),
            AttemptState::Trying(index) if index + 1 < candidate_count => {
                AttemptState::Trying(index + 1)
            }
            AttemptState::Trying(_) => AttemptState::Exhausted,
            terminal => terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Succeeded(_) | AttemptState::Exhausted)
    }
}

/// Progress hooks for front ends.
pub trait AttemptObserver: Send + Sync {
    fn attempt_started(&self, _index: usize, _config: &ServiceConfig) {}

    fn attempt_failed(&self, _index: usize, _config: &ServiceConfig, _detail: &ApiError) {}
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl AttemptObserver for NoopObserver {}

/// Sequential model-fallback orchestrator.
pub struct StoryOrchestrator {
    client: Arc<dyn GenerationClient>,
    prompt: StoryPrompt,
    attempt_timeout: Option<Duration>,
}

impl StoryOrchestrator {
    pub fn new(client: Arc<dyn GenerationClient>, prompt: StoryPrompt) -> Self {
        Self {
            client,
            prompt,
            attempt_timeout: None,
        }
    }

    /// Cap each attempt; a timed-out attempt counts as an ordinary failure.
    pub fn with_attempt_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub async fn attempt_generation(&self, request: &GenerationRequest) -> GenerationOutcome {
        self.attempt_generation_observed(request, &NoopObserver).await
    }

    #[instrument(skip_all, fields(candidates = request.candidates().len()))]
    pub async fn attempt_generation_observed(
        &self,
        request: &GenerationRequest,
        observer: &dyn AttemptObserver,
    ) -> GenerationOutcome {
        let candidates = request.candidates();
        let prompt = self.prompt.render(request.note());
        let mut attempted: Vec<AttemptFailure> = Vec::with_capacity(candidates.len());
        let mut state = AttemptState::Pending.advance(false, candidates.len());

        while let AttemptState::Trying(index) = state {
            let config = &candidates[index];
            observer.attempt_started(index, config);
            info!(attempt = index + 1, model = %config.model, "Trying model");

            match self.attempt_once(config, request.credential(), &prompt).await {
                Ok(raw_text) => {
                    state = state.advance(true, candidates.len());
                    debug_assert_eq!(state, AttemptState::Succeeded(index));
                    info!(attempt = index + 1, model = %config.model, "Model responded");
                    return GenerationOutcome::Success {
                        raw_text,
                        used_config: config.clone(),
                    };
                }
                Err(detail) => {
                    warn!(
                        attempt = index + 1,
                        model = %config.model,
                        error = %detail,
                        "Model attempt failed"
                    );
                    debug_assert!(detail.is_attempt_failure(), "unexpected error kind: {:?}", detail);
                    observer.attempt_failed(index, config, &detail);
                    attempted.push(AttemptFailure {
                        config: config.clone(),
                        detail,
                    });
                    state = state.advance(false, candidates.len());
                }
            }
        }

        debug_assert!(state.is_terminal());
        warn!(attempts = attempted.len(), "All models failed");
        GenerationOutcome::Failure { attempted }
    }

    async fn attempt_once(
        &self,
        config: &ServiceConfig,
        credential: &str,
        prompt: &str,
    ) -> Result<String, ApiError> {
        let call = self.client.generate(config, credential, prompt);
        match self.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ApiError::AttemptTimeout(limit.as_secs()))?,
            None => call.await,
        }
    }
}
