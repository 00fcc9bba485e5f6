use serde::{Deserialize, Serialize};

/// Model used when neither the caller nor the configuration names one.
pub const FALLBACK_MODEL: &str = "meta-llama/Meta-Llama-3.1-8B-Instruct";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_models")]
    pub models: Vec<String>,
}

impl InferenceConfig {
    /// The configured default model if set and non-blank, otherwise [`FALLBACK_MODEL`].
    pub fn resolved_default_model(&self) -> &str {
        self.default_model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(FALLBACK_MODEL)
    }

    /// The credential, treating a blank value as absent.
    pub fn token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            default_model: None,
            timeout_secs: default_timeout_secs(),
            models: default_models(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_models() -> Vec<String> {
    vec![
        FALLBACK_MODEL.to_string(),
        "mistralai/Mistral-7B-Instruct-v0.3".to_string(),
        "google/flan-t5-large".to_string(),
    ]
}
