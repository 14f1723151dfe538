//! Integration tests for configuration layering: defaults, global file,
//! workspace files, and environment overrides.

use super::test_utils::with_isolated_env;
use memolive::config::{global_config_path, ConfigLoader, MemoConfig};
use memolive::provider::ApiVersion;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[test]
fn test_defaults_without_any_files() {
    let temp = TempDir::new().unwrap();
    with_isolated_env(&temp, &[], || {
        let config = ConfigLoader::load(&temp.path().join("empty-workspace")).unwrap();
        assert_eq!(config, MemoConfig::default());
        assert_eq!(config.service.candidates.len(), 4);
        assert_eq!(config.service.candidates[0].model, "gemini-1.5-flash");
    });
}

#[test]
fn test_global_config_path_follows_xdg() {
    let temp = TempDir::new().unwrap();
    with_isolated_env(&temp, &[], || {
        let path = global_config_path().unwrap();
        assert_eq!(path, temp.path().join("memolive").join("config.toml"));
    });
}

#[test]
fn test_workspace_overrides_global() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("ws");

    write(
        &temp.path().join("memolive").join("config.toml"),
        r#"
[prompt]
language = "Japanese"
min_length = 800

[service]
request_timeout_secs = 60
"#,
    );
    write(
        &workspace.join("config").join("config.toml"),
        r#"
[prompt]
min_length = 2000
"#,
    );

    with_isolated_env(&temp, &[], || {
        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.prompt.language, "Japanese");
        assert_eq!(config.prompt.min_length, 2000);
        assert_eq!(config.service.request_timeout_secs, 60);
    });
}

#[test]
fn test_environment_specific_file() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("ws");

    write(
        &workspace.join("config").join("config.toml"),
        "[service]\nattempt_timeout_secs = 30\n",
    );
    write(
        &workspace.join("config").join("staging.toml"),
        r#"
[[service.candidates]]
model = "gemini-2.0-flash"
api_version = "v1beta"
web_search = true
"#,
    );

    with_isolated_env(&temp, &[("MEMOLIVE_ENV", "staging")], || {
        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.service.attempt_timeout_secs, Some(30));
        assert_eq!(config.service.candidates.len(), 1);
        assert_eq!(config.service.candidates[0].api_version, ApiVersion::V1Beta);
        assert!(config.service.candidates[0].web_search);
    });
}

#[test]
fn test_environment_variables_win() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("ws");
    write(
        &workspace.join("config").join("config.toml"),
        "[service]\nbase_url = \"http://from-file.invalid\"\n",
    );

    with_isolated_env(
        &temp,
        &[
            ("MEMOLIVE__SERVICE__BASE_URL", "http://127.0.0.1:9999"),
            ("MEMOLIVE__CREDENTIAL__ENV_VAR", "MY_GEMINI_KEY"),
        ],
        || {
            let config = ConfigLoader::load(&workspace).unwrap();
            assert_eq!(config.service.base_url, "http://127.0.0.1:9999");
            assert_eq!(config.credential.env_var, "MY_GEMINI_KEY");
        },
    );
}

#[test]
fn test_validation_lists_every_problem() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("memolive.toml");
    write(
        &config_path,
        r#"
[prompt]
min_length = 0

[[service.candidates]]
model = "has space"

[[service.candidates]]
model = "gemini-pro"
web_search = true
"#,
    );

    with_isolated_env(&temp, &[], || {
        let err = ConfigLoader::load_validated(temp.path(), Some(&config_path)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Candidate #1"), "{}", msg);
        assert!(msg.contains("Candidate #2"), "{}", msg);
        assert!(msg.contains("Prompt"), "{}", msg);
    });
}
