use inference_playground::{
    Error,
    config::{self, FALLBACK_MODEL},
};
use pretty_assertions::assert_eq;

mod common;

use common::test_utils::*;

fn no_env(_: &str) -> Option<String> {
    None
}

#[tokio::test]
async fn test_load_from_yaml_file() {
    let dir = create_temp_dir();
    let path = create_test_config_file(&dir, SAMPLE_CONFIG_YAML).await;

    let config = config::load_from(&path, no_env).await.unwrap();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.logs.level, "debug");
    assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
    assert_eq!(config.inference.base_url, "http://localhost:8000");
    assert_eq!(config.inference.token(), Some("hf_from_file"));
    assert_eq!(
        config.inference.resolved_default_model(),
        "google/flan-t5-large"
    );
    assert_eq!(config.inference.timeout_secs, 30);
    assert_eq!(config.inference.models, vec!["google/flan-t5-large", "gpt2"]);
}

#[tokio::test]
async fn test_missing_file_uses_defaults() {
    let dir = create_temp_dir();
    let path = dir.path().join("does-not-exist.yaml");

    let config = config::load_from(&path, no_env).await.unwrap();

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.inference.token(), None);
    assert_eq!(config.inference.resolved_default_model(), FALLBACK_MODEL);
}

#[tokio::test]
async fn test_partial_file_fills_defaults() {
    let dir = create_temp_dir();
    let path = create_test_config_file(&dir, "inference:\n  default_model: gpt2\n").await;

    let config = config::load_from(&path, no_env).await.unwrap();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.inference.timeout_secs, 120);
    assert_eq!(config.inference.resolved_default_model(), "gpt2");
}

#[tokio::test]
async fn test_environment_overrides_file() {
    let dir = create_temp_dir();
    let path = create_test_config_file(&dir, SAMPLE_CONFIG_YAML).await;

    let config = config::load_from(&path, |key| match key {
        "HUGGINGFACE_API_TOKEN" => Some("hf_from_env".to_string()),
        "HUGGINGFACE_MODEL_DEFAULT" => Some("gpt2".to_string()),
        _ => None,
    })
    .await
    .unwrap();

    assert_eq!(config.inference.token(), Some("hf_from_env"));
    assert_eq!(config.inference.resolved_default_model(), "gpt2");
    assert_eq!(config.inference.base_url, "http://localhost:8000");
}

#[tokio::test]
async fn test_malformed_file_is_an_error() {
    let dir = create_temp_dir();
    let path = create_test_config_file(&dir, "server: [not, a, map").await;

    let result = config::load_from(&path, no_env).await;

    assert!(matches!(result, Err(Error::Yaml(_))));
}
