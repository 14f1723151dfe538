//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::{Commands, KeyCommands, OutputFormat};
use crate::cli::presentation::{
    format_attempt_failures, format_models_json, format_models_text, format_parsed_json,
    format_parsed_text, format_story_json, format_story_text,
};
use crate::config::{ConfigLoader, MemoConfig};
use crate::credential::{mask, resolve_credential, CredentialStore, FileCredentialStore};
use crate::error::ApiError;
use crate::generation::{AttemptObserver, GenerationOutcome, GenerationRequest, StoryOrchestrator};
use crate::parser::parse;
use crate::prompt::StoryPrompt;
use crate::provider::{GeminiClient, ServiceConfig};
use crate::view::ViewState;
use owo_colors::OwoColorize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Runtime context for CLI execution: loaded config and the credential store.
pub struct RunContext {
    config: MemoConfig,
    credentials: Arc<dyn CredentialStore>,
}

/// Progress observer that keeps the view state current and echoes status to stderr.
pub struct CliObserver {
    view: Mutex<ViewState>,
    echo: bool,
}

impl CliObserver {
    pub fn new(echo: bool) -> Self {
        let mut view = ViewState::new();
        view.begin_generation();
        Self {
            view: Mutex::new(view),
            echo,
        }
    }

    /// Final view after applying the outcome.
    pub fn finish(self, outcome: &GenerationOutcome) -> ViewState {
        let mut view = self
            .view
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        view.finish(outcome);
        view
    }
}

impl AttemptObserver for CliObserver {
    fn attempt_started(&self, _index: usize, config: &ServiceConfig) {
        let mut view = self
            .view
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        view.attempt_started(config);
        if self.echo {
            eprintln!("{}", view.status.dimmed());
        }
    }

    fn attempt_failed(&self, _index: usize, config: &ServiceConfig, detail: &ApiError) {
        if self.echo {
            eprintln!("{}", format!("  {} failed: {}", config.model, detail).dimmed());
        }
    }
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load_validated(&workspace_root, config_path.as_deref())?;
        let store = FileCredentialStore::at(config.credential.store_path.clone())?;
        Ok(Self::with_parts(config, Arc::new(store)))
    }

    pub fn with_parts(config: MemoConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            config,
            credentials,
        }
    }

    pub fn config(&self) -> &MemoConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Generate {
                note,
                file,
                key,
                models,
                web_search,
                format,
            } => {
                let note = read_note(note.as_deref(), file.as_deref())?;
                let request = self.build_request(&note, key.as_deref(), models, *web_search)?;
                let runtime = tokio::runtime::Runtime::new()
                    .map_err(|e| ApiError::Io(format!("Failed to start async runtime: {}", e)))?;
                let observer = CliObserver::new(*format == OutputFormat::Text);
                let outcome = runtime.block_on(self.generate(&request, &observer))?;
                let view = observer.finish(&outcome);

                match outcome {
                    GenerationOutcome::Success { used_config, .. } => {
                        info!(model = %used_config.model, "Story generated");
                        match format {
                            OutputFormat::Json => format_story_json(&view, &used_config.model),
                            OutputFormat::Text => Ok(format_story_text(&view, &used_config.model)),
                        }
                    }
                    GenerationOutcome::Failure { attempted } => {
                        eprintln!("{}", format_attempt_failures(&attempted));
                        Err(ApiError::AllAttemptsExhausted(attempted.len()))
                    }
                }
            }
            Commands::Parse { file, format } => {
                let raw = read_input(file.as_deref())?;
                let story = parse(&raw);
                match format {
                    OutputFormat::Json => format_parsed_json(&story),
                    OutputFormat::Text => Ok(format_parsed_text(&story)),
                }
            }
            Commands::Key { command } => self.handle_key_command(command),
            Commands::Models { format } => {
                let candidates = &self.config.service.candidates;
                match format {
                    OutputFormat::Json => format_models_json(candidates),
                    OutputFormat::Text => Ok(format_models_text(candidates)),
                }
            }
        }
    }

    /// Build the immutable request for one generation.
    pub fn build_request(
        &self,
        note: &str,
        explicit_key: Option<&str>,
        models: &[String],
        web_search: bool,
    ) -> Result<GenerationRequest, ApiError> {
        let credential = resolve_credential(
            explicit_key,
            &self.config.credential.env_var,
            self.credentials.as_ref(),
        )?;
        let candidates = self.candidate_chain(models, web_search)?;
        GenerationRequest::new(note, credential, candidates)
    }

    /// Configured chain, or the `--model` overrides in the order given.
    pub fn candidate_chain(
        &self,
        models: &[String],
        web_search: bool,
    ) -> Result<Vec<ServiceConfig>, ApiError> {
        let base: Vec<ServiceConfig> = if models.is_empty() {
            self.config.service.candidates.clone()
        } else {
            models.iter().map(|m| ServiceConfig::new(m.as_str())).collect()
        };
        let chain: Vec<ServiceConfig> = if web_search {
            base.into_iter().map(ServiceConfig::with_web_search).collect()
        } else {
            base
        };
        for candidate in &chain {
            candidate.validate().map_err(ApiError::InvalidInput)?;
        }
        Ok(chain)
    }

    /// Run the orchestrator against the configured service.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        observer: &dyn AttemptObserver,
    ) -> Result<GenerationOutcome, ApiError> {
        let service = &self.config.service;
        let client = GeminiClient::new(Some(service.base_url.clone()), service.http_timeouts())?;
        let orchestrator =
            StoryOrchestrator::new(Arc::new(client), StoryPrompt::new(self.config.prompt.clone()))
                .with_attempt_timeout(service.attempt_timeout());
        Ok(orchestrator
            .attempt_generation_observed(request, observer)
            .await)
    }

    fn handle_key_command(&self, command: &KeyCommands) -> Result<String, ApiError> {
        let location = self
            .credentials
            .location()
            .map(|p| format!(" ({})", p.display()))
            .unwrap_or_default();
        match command {
            KeyCommands::Set { value } => {
                let value = match value {
                    Some(value) => value.clone(),
                    None => dialoguer::Password::new()
                        .with_prompt("Gemini API key")
                        .interact()
                        .map_err(|e| ApiError::Io(format!("Failed to read API key: {}", e)))?,
                };
                self.credentials.save(&value)?;
                Ok(format!("API key saved{}", location))
            }
            KeyCommands::Show => match self.credentials.load()? {
                Some(key) => Ok(format!("{}{}", mask(&key), location)),
                None => Ok("No API key stored.".to_string()),
            },
            KeyCommands::Clear => {
                self.credentials.clear()?;
                Ok(format!("API key removed{}", location))
            }
        }
    }
}

fn read_input(file: Option<&Path>) -> Result<String, ApiError> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| ApiError::Io(format!("Failed to read {}: {}", path.display(), e))),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| ApiError::Io(format!("Failed to read stdin: {}", e)))?;
            Ok(buffer)
        }
    }
}

fn read_note(note: Option<&str>, file: Option<&Path>) -> Result<String, ApiError> {
    let note = match note {
        Some(note) => note.to_string(),
        None => read_input(file)?,
    };
    if note.trim().is_empty() {
        warn!("Refusing to generate from an empty note");
        return Err(ApiError::InvalidInput("note is empty".to_string()));
    }
    Ok(note)
}
