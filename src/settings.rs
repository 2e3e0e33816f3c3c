use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{PurseError, Result};

pub const DEFAULT_USERNAME: &str = "user";
const DEFAULT_PASSWORD: &str = "password";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_username")]
    pub username: String,
    /// Hex SHA-256 of the login password.
    #[serde(default = "default_password_sha256")]
    pub password_sha256: String,
    #[serde(default)]
    pub advisor: AdvisorSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorSettings {
    /// Base URL of an OpenAI-compatible server. Unset means offline.
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_password_sha256() -> String {
    password_digest(DEFAULT_PASSWORD)
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: default_username(),
            password_sha256: default_password_sha256(),
            advisor: AdvisorSettings::default(),
        }
    }
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            host: None,
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Settings {
    /// Apply `PURSE_ADVISOR_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var("PURSE_ADVISOR_HOST") {
            self.advisor.host = Some(host);
        }
        if let Ok(model) = std::env::var("PURSE_ADVISOR_MODEL") {
            self.advisor.model = model;
        }
        if let Ok(key) = std::env::var("PURSE_ADVISOR_API_KEY") {
            self.advisor.api_key = Some(key);
        }
        self
    }
}

pub fn password_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PURSE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("purse")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Settings file plus environment overrides.
pub fn load_settings() -> Settings {
    load_stored_settings().with_env_overrides()
}

/// Settings file only, for writing back without leaking environment values.
pub fn load_stored_settings() -> Settings {
    load_settings_from(&settings_path())
}

fn load_settings_from(path: &std::path::Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings file");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(config_dir())?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PurseError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.username, "user");
        assert_eq!(s.password_sha256, password_digest("password"));
        assert!(s.advisor.host.is_none());
        assert_eq!(s.advisor.model, "gpt-4o-mini");
        assert_eq!(s.advisor.timeout_secs, 60);
    }

    #[test]
    fn test_password_digest_is_hex_sha256() {
        assert_eq!(
            password_digest("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"username": "alice", "advisor": {"host": "http://localhost:8080"}}"#,
        )
        .unwrap();
        let s = load_settings_from(&path);
        assert_eq!(s.username, "alice");
        assert_eq!(s.password_sha256, password_digest("password"));
        assert_eq!(s.advisor.host.as_deref(), Some("http://localhost:8080"));
        assert_eq!(s.advisor.model, "gpt-4o-mini");
    }

    #[test]
    fn test_load_returns_defaults_when_missing_or_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_settings_from(&dir.path().join("nope.json"));
        assert_eq!(missing.username, "user");

        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let malformed = load_settings_from(&path);
        assert_eq!(malformed.username, "user");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            username: "bob".to_string(),
            password_sha256: password_digest("hunter2"),
            advisor: AdvisorSettings {
                host: Some("http://10.0.0.2:8000".to_string()),
                ..AdvisorSettings::default()
            },
        };
        std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
        let loaded = load_settings_from(&path);
        assert_eq!(loaded.username, "bob");
        assert_eq!(loaded.password_sha256, password_digest("hunter2"));
        assert_eq!(loaded.advisor.host.as_deref(), Some("http://10.0.0.2:8000"));
    }
}
