// src/config.rs
//! Client configuration from `config.yaml` and the environment
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const DEFAULT_API_URL: &str = "http://127.0.0.1:4000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub session_path: Option<PathBuf>,
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub generation_poll: PollConfig,
    #[serde(default)]
    pub checkout_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: ClientConfig,
    production: ClientConfig,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_path() -> PathBuf {
    PathBuf::from("/tmp/cvenom-client.log")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            session_path: None,
            log_path: default_log_path(),
            log_level: default_log_level(),
            generation_poll: PollConfig::default(),
            checkout_base_url: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration for the current environment.
    /// `config.yaml` is optional; environment variables override it.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading client configuration for environment: {}", environment);

        let config_path = PathBuf::from("config.yaml");
        let base = if config_path.exists() {
            Self::load_from_file(&config_path, &environment)?
        } else {
            Self::default()
        };

        Ok(base.apply_env_overrides(|key| std::env::var(key).ok()))
    }

    pub fn for_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    fn get_environment() -> String {
        std::env::var("CVENOM_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_from_file(path: &Path, environment: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse_yaml(&content, environment)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn parse_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(content)?;

        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    fn apply_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CVENOM_API_URL") {
            self.api_base_url = url;
        }
        if let Some(path) = lookup("CVENOM_SESSION_PATH") {
            self.session_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("CVENOM_LOG_PATH") {
            self.log_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup("CVENOM_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.timeout_seconds = secs;
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Where the CLI keeps its session: the configured path, else `~/.cvenom/session.json`
    pub fn session_file(&self) -> PathBuf {
        self.session_file_with(std::env::var_os("HOME").map(PathBuf::from))
    }

    fn session_file_with(&self, home: Option<PathBuf>) -> PathBuf {
        match (&self.session_path, home) {
            (Some(path), _) => path.clone(),
            (None, Some(home)) => home.join(".cvenom").join("session.json"),
            (None, None) => PathBuf::from(".cvenom-session.json"),
        }
    }
}
