use inference_playground::{
    config::{Config, InferenceConfig, LogsConfig, ServerConfig},
    inference::{InferenceBackend, InferenceProxy},
    server::{self, handlers::AppState},
};
use axum::Router;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;

pub const TEST_TOKEN: &str = "hf_test_token";

/// Create a test configuration pointing at `base_url`
pub fn create_test_config(base_url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
            cors_origins: vec![],
        },
        inference: InferenceConfig {
            base_url: base_url.to_string(),
            api_token: Some(TEST_TOKEN.to_string()),
            default_model: None,
            timeout_secs: 5,
            models: vec!["gpt2".to_string(), "google/flan-t5-large".to_string()],
        },
    }
}

/// Router backed by the real HTTP client
pub fn create_test_app(config: &Config) -> Router {
    server::router(server::build_state(config).expect("failed to build app state"))
}

/// Router backed by an arbitrary backend
pub fn create_test_app_with_backend(
    backend: Arc<dyn InferenceBackend>,
    settings: InferenceConfig,
) -> Router {
    server::router(AppState {
        proxy: Arc::new(InferenceProxy::new(backend, settings)),
    })
}

/// Base URL of a local port that nothing listens on
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let addr = listener.local_addr().expect("no local addr");
    drop(listener);
    format!("http://{addr}")
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Create a test config YAML file
pub async fn create_test_config_file(dir: &TempDir, content: &str) -> String {
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, content)
        .await
        .expect("failed to write config");
    config_path.to_string_lossy().to_string()
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 9090
  logs:
    level: "debug"
  cors_origins:
    - "http://localhost:3000"
inference:
  base_url: "http://localhost:8000"
  api_token: "hf_from_file"
  default_model: "google/flan-t5-large"
  timeout_secs: 30
  models:
    - "google/flan-t5-large"
    - "gpt2"
"#;
