use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::ai::GenerationParams;
use crate::error::{AppError, Result};

pub const CONFIG_PATH_VAR: &str = "FACTCAST_CONFIG";
pub const BACKEND_VAR: &str = "FACTCAST_BACKEND";
pub const TELEGRAM_TOKEN_VAR: &str = "TOKEN";
pub const RECIPIENT_VAR: &str = "USER_ID";
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
pub const INFERENCE_TOKEN_VAR: &str = "HF_API_TOKEN";
pub const DIALOGUE_KEY_VAR: &str = "DIALOGUE_API_KEY";

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-3.5-turbo";
const INFERENCE_API_URL: &str = "https://api-inference.huggingface.co/models";
const INFERENCE_MODEL: &str = "HuggingFaceH4/zephyr-7b-beta";
const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Language of the prompt, the review message and the consumed marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ru,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    OpenAi,
    Dialogue,
    Inference,
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "dialogue" => Ok(Self::Dialogue),
            "inference" => Ok(Self::Inference),
            other => Err(AppError::Config(format!("unknown backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub params: GenerationParams,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            model: None,
            endpoint: None,
            timeout_secs: 30,
            params: GenerationParams::default(),
        }
    }
}

impl BackendConfig {
    pub fn model(&self) -> &str {
        match (&self.model, self.kind) {
            (Some(model), _) => model.as_str(),
            (None, BackendKind::Inference) => INFERENCE_MODEL,
            (None, _) => OPENAI_MODEL,
        }
    }

    /// Resolved endpoint URL; the dialogue service has no public default.
    pub fn endpoint(&self) -> Result<String> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.clone());
        }
        match self.kind {
            BackendKind::OpenAi => Ok(OPENAI_API_URL.to_string()),
            BackendKind::Inference => Ok(format!("{}/{}", INFERENCE_API_URL, self.model())),
            BackendKind::Dialogue => Err(AppError::Config(
                "backend.endpoint is required for the dialogue backend".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub topics_path: PathBuf,
    pub timezone: String,
    pub timezone_label: String,
    pub language: Language,
    pub telegram_api_url: String,
    pub backend: BackendConfig,

    #[serde(skip)]
    pub telegram_token: String,
    #[serde(skip)]
    pub recipient_id: String,
    #[serde(skip)]
    pub backend_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topics_path: PathBuf::from("topic.csv"),
            timezone: "Europe/Moscow".to_string(),
            timezone_label: "МСК".to_string(),
            language: Language::default(),
            telegram_api_url: TELEGRAM_API_URL.to_string(),
            backend: BackendConfig::default(),
            telegram_token: String::new(),
            recipient_id: String::new(),
            backend_key: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Build the configuration from the TOML file (if any) and an environment lookup.
    pub fn load_with<F>(env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let mut config = match lookup(CONFIG_PATH_VAR).map(PathBuf::from) {
            Some(path) if !path.exists() => {
                return Err(AppError::Config(format!(
                    "{} points to a missing file: {}",
                    CONFIG_PATH_VAR,
                    path.display()
                )));
            }
            Some(path) => Self::read_file(&path)?,
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::read_file(&path)?
                } else {
                    tracing::debug!("No config file at {:?}, using defaults", path);
                    Config::default()
                }
            }
        };

        if let Some(kind) = lookup(BACKEND_VAR) {
            config.backend.kind = kind.parse()?;
        }

        config.telegram_token = lookup(TELEGRAM_TOKEN_VAR)
            .ok_or_else(|| AppError::Config(format!("{} is not set", TELEGRAM_TOKEN_VAR)))?;
        config.recipient_id = lookup(RECIPIENT_VAR)
            .ok_or_else(|| AppError::Config(format!("{} is not set", RECIPIENT_VAR)))?;

        config.backend_key = match config.backend.kind {
            BackendKind::OpenAi => Some(lookup(OPENAI_KEY_VAR).ok_or_else(|| {
                AppError::Config(format!("{} is not set", OPENAI_KEY_VAR))
            })?),
            BackendKind::Inference => Some(lookup(INFERENCE_TOKEN_VAR).ok_or_else(|| {
                AppError::Config(format!("{} is not set", INFERENCE_TOKEN_VAR))
            })?),
            BackendKind::Dialogue => lookup(DIALOGUE_KEY_VAR),
        };

        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("factcast")
            .join("config.toml")
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Config(format!("unknown timezone: {}", self.timezone)))
    }

    fn validate(&self) -> Result<()> {
        self.tz()?;

        let endpoint = self.backend.endpoint()?;
        url::Url::parse(&endpoint)
            .map_err(|e| AppError::Config(format!("invalid backend endpoint {}: {}", endpoint, e)))?;
        url::Url::parse(&self.telegram_api_url).map_err(|e| {
            AppError::Config(format!("invalid Telegram API URL {}: {}", self.telegram_api_url, e))
        })?;

        if self.backend.timeout_secs == 0 {
            return Err(AppError::Config("backend.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let mut map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        // Never pick up a real config file from the machine running the tests.
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.toml");
        std::fs::write(&empty, "").unwrap();
        map.entry(CONFIG_PATH_VAR.to_string())
            .or_insert_with(|| empty.to_string_lossy().to_string());
        move |key: &str| {
            let _keep = &dir;
            map.get(key).cloned()
        }
    }

    #[test]
    fn defaults_match_original_deployment() {
        let config = Config::load_with(env_from(&[
            ("TOKEN", "bot-token"),
            ("USER_ID", "42"),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap();

        assert_eq!(config.topics_path, PathBuf::from("topic.csv"));
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Moscow);
        assert_eq!(config.language, Language::Ru);
        assert_eq!(config.backend.kind, BackendKind::OpenAi);
        assert_eq!(config.backend.model(), "gpt-3.5-turbo");
        assert_eq!(config.backend_key.as_deref(), Some("sk-test"));
        assert_eq!(config.backend.params.max_new_tokens, 120);
    }

    #[test]
    fn missing_bot_token_is_an_error() {
        let err = Config::load_with(env_from(&[("USER_ID", "42"), ("OPENAI_API_KEY", "k")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("TOKEN")));
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let err = Config::load_with(env_from(&[
            ("TOKEN", "t"),
            ("USER_ID", "  "),
            ("OPENAI_API_KEY", "k"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("USER_ID")));
    }

    #[test]
    fn backend_override_requires_its_own_credential() {
        let err = Config::load_with(env_from(&[
            ("TOKEN", "t"),
            ("USER_ID", "1"),
            ("OPENAI_API_KEY", "k"),
            ("FACTCAST_BACKEND", "inference"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("HF_API_TOKEN")));

        let config = Config::load_with(env_from(&[
            ("TOKEN", "t"),
            ("USER_ID", "1"),
            ("HF_API_TOKEN", "hf"),
            ("FACTCAST_BACKEND", "inference"),
        ]))
        .unwrap();
        assert_eq!(config.backend.kind, BackendKind::Inference);
        assert_eq!(
            config.backend.endpoint().unwrap(),
            "https://api-inference.huggingface.co/models/HuggingFaceH4/zephyr-7b-beta"
        );
    }

    #[test]
    fn dialogue_backend_needs_an_endpoint() {
        let err = Config::load_with(env_from(&[
            ("TOKEN", "t"),
            ("USER_ID", "1"),
            ("FACTCAST_BACKEND", "dialogue"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("endpoint")));
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
topics_path = "/srv/facts/topics.csv"
timezone = "Europe/Berlin"
timezone_label = "CET"
language = "en"

[backend]
kind = "dialogue"
endpoint = "http://127.0.0.1:8000/generate"
timeout_secs = 45

[backend.params]
temperature = 0.8
"#,
        )
        .unwrap();
        let path = path.to_string_lossy().to_string();

        let config = Config::load_with(env_from(&[
            ("FACTCAST_CONFIG", path.as_str()),
            ("TOKEN", "t"),
            ("USER_ID", "1"),
        ]))
        .unwrap();

        assert_eq!(config.topics_path, PathBuf::from("/srv/facts/topics.csv"));
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Berlin);
        assert_eq!(config.language, Language::En);
        assert_eq!(config.backend.kind, BackendKind::Dialogue);
        assert_eq!(config.backend.timeout_secs, 45);
        assert_eq!(config.backend.params.temperature, 0.8);
        assert_eq!(config.backend.params.top_p, 0.9);
        assert!(config.backend_key.is_none());
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timezone = \"Mars/Olympus\"\n").unwrap();
        let path = path.to_string_lossy().to_string();

        let err = Config::load_with(env_from(&[
            ("FACTCAST_CONFIG", path.as_str()),
            ("TOKEN", "t"),
            ("USER_ID", "1"),
            ("OPENAI_API_KEY", "k"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("Mars/Olympus")));
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let err = Config::load_with(env_from(&[
            ("FACTCAST_CONFIG", "/nonexistent/factcast/config.toml"),
            ("TOKEN", "t"),
            ("USER_ID", "1"),
            ("OPENAI_API_KEY", "k"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("/nonexistent/factcast")));
    }

    #[test]
    fn unknown_backend_name_is_rejected() {
        assert!("palm".parse::<BackendKind>().is_err());
        assert_eq!(" OpenAI ".parse::<BackendKind>().unwrap(), BackendKind::OpenAi);
    }
}
