//! Integration tests for CLI commands routed through RunContext

use super::test_utils::{gemini_error_response, gemini_text_response, with_isolated_env};
use clap::Parser;
use memolive::cli::{Cli, Commands, KeyCommands, OutputFormat, RunContext};
use memolive::config::MemoConfig;
use memolive::credential::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
use memolive::error::ApiError;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `execute` builds its own runtime, so the mock server lives on a separate one.
fn start_server(
    setup: impl FnOnce(&MockServer) -> Vec<Mock>,
) -> (tokio::runtime::Runtime, MockServer) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        for mock in setup(&server) {
            mock.mount(&server).await;
        }
        server
    });
    (runtime, server)
}

fn context_for(server: &MockServer) -> RunContext {
    let mut config = MemoConfig::default();
    config.service.base_url = server.uri();
    RunContext::with_parts(config, Arc::new(MemoryCredentialStore::new()))
}

fn generate(note: &str, key: Option<&str>, models: &[&str], format: OutputFormat) -> Commands {
    Commands::Generate {
        note: Some(note.to_string()),
        file: None,
        key: key.map(str::to_string),
        models: models.iter().map(|m| m.to_string()).collect(),
        web_search: false,
        format,
    }
}

#[test]
fn test_generate_json_output() {
    let (_runtime, server) = start_server(|_| {
        vec![Mock::given(method("POST"))
            .and(path("/v1/models/gemini-pro:generateContent"))
            .and(query_param("key", "cli-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_response(
                "[MUSIC: BTS]\n\nThe concert lights flickered.",
            )))
            .expect(1)]
    });

    let ctx = context_for(&server);
    let output = ctx
        .execute(&generate("concert night", Some("cli-key"), &["gemini-pro"], OutputFormat::Json))
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["model"], "gemini-pro");
    assert_eq!(value["music_keyword"], "BTS");
    assert_eq!(value["playable_keyword"], "BTS");
    assert_eq!(value["body"], "The concert lights flickered.");
    assert_eq!(value["status"], "Connected using model: gemini-pro");
}

#[test]
fn test_generate_uses_stored_key() {
    let (_runtime, server) = start_server(|_| {
        vec![Mock::given(method("POST"))
            .and(query_param("key", "stored-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_response("Story")))
            .expect(1)]
    });

    let temp = TempDir::new().unwrap();
    with_isolated_env(&temp, &[], || {
        let store = MemoryCredentialStore::new();
        store.save("stored-key").unwrap();
        let mut config = MemoConfig::default();
        config.service.base_url = server.uri();
        let ctx = RunContext::with_parts(config, Arc::new(store));

        let output = ctx
            .execute(&generate("note", None, &["gemini-pro"], OutputFormat::Text))
            .unwrap();
        assert!(output.contains("Story"));
        assert!(output.contains("gemini-pro"));
    });
}

#[test]
fn test_generate_reports_exhaustion() {
    let (_runtime, server) = start_server(|_| {
        vec![Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(gemini_error_response(
                404,
                "NOT_FOUND",
                "no such model",
            )))
            .expect(2)]
    });

    let ctx = context_for(&server);
    let result = ctx.execute(&generate("note", Some("k"), &["a-model", "b-model"], OutputFormat::Json));
    assert_eq!(result, Err(ApiError::AllAttemptsExhausted(2)));
}

#[test]
fn test_generate_without_key_fails_before_any_request() {
    let (_runtime, server) = start_server(|_| {
        vec![Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_response("x")))
            .expect(0)]
    });

    let temp = TempDir::new().unwrap();
    with_isolated_env(&temp, &[], || {
        let ctx = context_for(&server);
        let result = ctx.execute(&generate("note", None, &[], OutputFormat::Text));
        assert_eq!(result, Err(ApiError::MissingCredential));
    });
}

#[test]
fn test_generate_rejects_empty_note() {
    let ctx = RunContext::with_parts(MemoConfig::default(), Arc::new(MemoryCredentialStore::new()));
    let result = ctx.execute(&generate("  \n ", Some("k"), &[], OutputFormat::Text));
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[test]
fn test_key_set_persists_to_file_store() {
    let temp = TempDir::new().unwrap();
    let store_path = temp.path().join("keys").join("credentials.toml");
    let store = Arc::new(FileCredentialStore::new(store_path.clone()));
    let ctx = RunContext::with_parts(MemoConfig::default(), store.clone());

    let output = ctx
        .execute(&Commands::Key {
            command: KeyCommands::Set {
                value: Some("AIzaSyPersisted0001".to_string()),
            },
        })
        .unwrap();
    assert!(output.contains(&store_path.display().to_string()));

    let reopened = FileCredentialStore::new(store_path);
    assert_eq!(
        reopened.load().unwrap().as_deref(),
        Some("AIzaSyPersisted0001")
    );
}

#[test]
fn test_run_context_from_workspace_config() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("workspace");
    std::fs::create_dir_all(workspace.join("config")).unwrap();
    std::fs::write(
        workspace.join("config").join("config.toml"),
        r#"
[[service.candidates]]
model = "gemini-2.0-flash"

[[service.candidates]]
model = "gemini-pro"
"#,
    )
    .unwrap();

    with_isolated_env(&temp, &[], || {
        let ctx = RunContext::new(workspace.clone(), None).unwrap();
        let output = ctx
            .execute(&Commands::Models {
                format: OutputFormat::Json,
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["candidates"][0]["model"], "gemini-2.0-flash");
        assert_eq!(value["candidates"][1]["model"], "gemini-pro");
    });
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("bad.toml");
    std::fs::write(&config_path, "[service]\ncandidates = []\n").unwrap();

    with_isolated_env(&temp, &[], || {
        let result = RunContext::new(temp.path().to_path_buf(), Some(config_path.clone()));
        match result {
            Err(ApiError::ConfigError(msg)) => {
                assert!(msg.contains("Configuration validation failed"))
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("empty candidate list should be rejected"),
        }
    });
}

#[test]
fn test_cli_parses_generate_arguments() {
    let cli = Cli::try_parse_from([
        "memolive",
        "generate",
        "my note",
        "--model",
        "gemini-pro",
        "--model",
        "gemini-1.0-pro",
        "--web-search",
        "--format",
        "json",
    ])
    .unwrap();

    match cli.command {
        Commands::Generate {
            note,
            models,
            web_search,
            format,
            ..
        } => {
            assert_eq!(note.as_deref(), Some("my note"));
            assert_eq!(models, vec!["gemini-pro", "gemini-1.0-pro"]);
            assert!(web_search);
            assert_eq!(format, OutputFormat::Json);
        }
        _ => panic!("expected generate"),
    }
}
