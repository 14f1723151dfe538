//! Shared test utilities for integration tests
//!
//! Centralized setup/teardown for XDG directories and process environment,
//! plus canned Gemini responses.

use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const TRACKED_VARS: &[&str] = &[
    "HOME",
    "XDG_CONFIG_HOME",
    "XDG_DATA_HOME",
    "MEMOLIVE_ENV",
    "GEMINI_API_KEY",
];

/// Environment variable state to restore after test
struct EnvState {
    saved: Vec<(String, Option<String>)>,
}

impl EnvState {
    fn capture(extra: &[&str]) -> Self {
        let saved = TRACKED_VARS
            .iter()
            .chain(extra.iter())
            .map(|name| (name.to_string(), std::env::var(name).ok()))
            .collect();
        Self { saved }
    }

    fn restore(self) {
        for (name, value) in self.saved {
            match value {
                Some(orig) => std::env::set_var(&name, orig),
                None => std::env::remove_var(&name),
            }
        }
    }
}

/// Run `f` with isolated XDG directories and extra environment variables set.
///
/// XDG_CONFIG_HOME is the temp dir itself, so the global config file lives at
/// `<test_dir>/memolive/config.toml`; XDG_DATA_HOME is `<test_dir>/data`.
/// GEMINI_API_KEY and MEMOLIVE_ENV are cleared unless given in `vars`.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let extra: Vec<&str> = vars.iter().map(|(name, _)| *name).collect();
    let env_state = EnvState::capture(&extra);

    let test_config_home = test_dir.path().to_path_buf();
    let test_data_home = test_dir.path().join("data");
    let test_home = test_dir.path().join("home");

    std::fs::create_dir_all(&test_data_home).unwrap();
    std::fs::create_dir_all(&test_home).unwrap();

    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_config_home.to_str().unwrap());
    std::env::set_var("XDG_DATA_HOME", test_data_home.to_str().unwrap());
    std::env::remove_var("GEMINI_API_KEY");
    std::env::remove_var("MEMOLIVE_ENV");
    for (name, value) in vars {
        std::env::set_var(name, value);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    env_state.restore();

    match result {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// A successful `generateContent` body returning `text`.
pub fn gemini_text_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

/// A Gemini error envelope.
pub fn gemini_error_response(code: u16, status: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "error": { "code": code, "message": message, "status": status }
    })
}
