use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::catalog::TopicCatalog;
use crate::error::ConfigError;
use crate::generator::gemini::{DEFAULT_API_ENDPOINT, DEFAULT_MODEL};
use crate::session::exam::DEFAULT_EXAM_LENGTH;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MAX_EXAM_LENGTH: usize = 50;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default = "default_exam_length")]
    pub exam_length: usize,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_api_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}
fn default_exam_length() -> usize {
    DEFAULT_EXAM_LENGTH
}
fn default_language() -> String {
    "English".to_string()
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_endpoint: default_api_endpoint(),
            topic: String::new(),
            exam_length: default_exam_length(),
            language: default_language(),
            theme: default_theme(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dlquiz")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn secrets_path() -> PathBuf {
        Self::config_dir().join("secrets.toml")
    }

    /// Reset an unknown topic to the first catalog topic and clamp the exam length.
    /// Call after deserialization; config files can outlive catalog edits.
    pub fn normalize(&mut self, catalog: &TopicCatalog) {
        if !catalog.contains(&self.topic) {
            self.topic = catalog.first().to_string();
        }
        self.exam_length = self.exam_length.clamp(1, MAX_EXAM_LENGTH);
        if self.model.trim().is_empty() {
            self.model = default_model();
        }
    }
}

/// A credential that never prints itself.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: &str) -> Self {
        Self(key.trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last four characters, for display.
    pub fn masked(&self) -> String {
        let count = self.0.chars().count();
        if count <= 4 {
            return "*".repeat(count);
        }
        let tail: String = self.0.chars().skip(count - 4).collect();
        format!("{}{tail}", "*".repeat(8))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(..)")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    SecretsFile,
    Environment,
    Session,
    Missing,
}

impl CredentialSource {
    pub fn label(self) -> &'static str {
        match self {
            CredentialSource::SecretsFile => "secrets.toml",
            CredentialSource::Environment => "environment",
            CredentialSource::Session => "entered this session",
            CredentialSource::Missing => "not set",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Credential {
    pub key: ApiKey,
    pub source: CredentialSource,
}

impl Credential {
    pub fn missing() -> Self {
        Self {
            key: ApiKey::new(""),
            source: CredentialSource::Missing,
        }
    }

    pub fn entered(key: &str) -> Self {
        let key = ApiKey::new(key);
        if key.is_empty() {
            return Self::missing();
        }
        Self {
            key,
            source: CredentialSource::Session,
        }
    }

    pub fn is_available(&self) -> bool {
        !self.key.is_empty()
    }

    /// Secrets file first, then the environment, else missing.
    pub fn resolve() -> Self {
        Self::resolve_from(&Config::secrets_path(), std::env::var(API_KEY_ENV).ok())
    }

    pub fn resolve_from(secrets: &Path, env_value: Option<String>) -> Self {
        match read_secrets_key(secrets) {
            Ok(Some(key)) => {
                return Self {
                    key,
                    source: CredentialSource::SecretsFile,
                };
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(%err, "ignoring unreadable secrets file"),
        }

        match env_value.map(|v| ApiKey::new(&v)) {
            Some(key) if !key.is_empty() => Self {
                key,
                source: CredentialSource::Environment,
            },
            _ => Self::missing(),
        }
    }

    pub fn require(&self) -> Result<&ApiKey, ConfigError> {
        if self.is_available() {
            Ok(&self.key)
        } else {
            Err(ConfigError::MissingApiKey {
                secrets: Config::secrets_path(),
            })
        }
    }
}

#[derive(Deserialize)]
struct SecretsFile {
    #[serde(default)]
    general: SecretsGeneral,
}

#[derive(Default, Deserialize)]
struct SecretsGeneral {
    #[serde(rename = "GEMINI_API_KEY")]
    gemini_api_key: Option<String>,
}

fn read_secrets_key(path: &Path) -> Result<Option<ApiKey>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let secrets: SecretsFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(secrets
        .general
        .gemini_api_key
        .map(|k| ApiKey::new(&k))
        .filter(|k| !k.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.model, "models/gemini-2.5-flash");
        assert_eq!(config.exam_length, 10);
        assert_eq!(config.language, "English");
        assert!(config.topic.is_empty());
    }

    #[test]
    fn test_config_serde_partial_fields() {
        let toml_str = r#"
model = "models/gemini-2.5-pro"
exam_length = 20
theme = "study-desk"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model, "models/gemini-2.5-pro");
        assert_eq!(config.exam_length, 20);
        assert_eq!(config.theme, "study-desk");
        assert_eq!(config.api_endpoint, DEFAULT_API_ENDPOINT);
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.exam_length = 15;
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.exam_length, 15);
        assert_eq!(loaded.model, config.model);
    }

    #[test]
    fn test_invalid_config_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "exam_length = \"ten\"\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(&err, ConfigError::Parse { path: p, .. } if p == &path));
    }

    #[test]
    fn test_missing_config_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.exam_length, 10);
    }

    #[test]
    fn test_normalize_resets_unknown_topic_and_clamps() {
        let catalog = TopicCatalog::bundled().unwrap();
        let mut config = Config::default();
        config.topic = "Astrology".to_string();
        config.exam_length = 0;
        config.normalize(&catalog);
        assert_eq!(config.topic, catalog.first());
        assert_eq!(config.exam_length, 1);

        config.topic = "Deep Learning Methods".to_string();
        config.exam_length = 500;
        config.normalize(&catalog);
        assert_eq!(config.topic, "Deep Learning Methods");
        assert_eq!(config.exam_length, MAX_EXAM_LENGTH);
    }

    #[test]
    fn test_secrets_file_wins_over_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        fs::write(&path, "[general]\nGEMINI_API_KEY = \"from-file\"\n").unwrap();
        let cred = Credential::resolve_from(&path, Some("from-env".to_string()));
        assert_eq!(cred.source, CredentialSource::SecretsFile);
        assert_eq!(cred.key.expose(), "from-file");
    }

    #[test]
    fn test_environment_used_when_no_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let cred = Credential::resolve_from(&dir.path().join("none.toml"), Some("from-env".into()));
        assert_eq!(cred.source, CredentialSource::Environment);
        assert_eq!(cred.key.expose(), "from-env");
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        fs::write(&path, "[general]\nGEMINI_API_KEY = \"  \"\n").unwrap();
        let cred = Credential::resolve_from(&path, Some(String::new()));
        assert_eq!(cred.source, CredentialSource::Missing);
        assert!(cred.require().is_err());
    }

    #[test]
    fn test_malformed_secrets_falls_through_to_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        fs::write(&path, "not = [valid").unwrap();
        let cred = Credential::resolve_from(&path, Some("env-key".into()));
        assert_eq!(cred.source, CredentialSource::Environment);
    }

    #[test]
    fn test_api_key_never_debug_prints() {
        let key = ApiKey::new("AIzaSecretValue1234");
        assert_eq!(format!("{key:?}"), "ApiKey(..)");
        assert_eq!(key.masked(), "********1234");
    }
}
