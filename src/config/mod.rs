mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, path::Path};
use tracing::{debug, info};

/// Loads `CONFIG_PATH` (default `config.yaml`) and layers the process environment on top.
pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_from(&config_path, |key| env::var(key).ok()).await
}

/// Reads the YAML file at `path` if it exists, then applies overrides from `lookup`.
///
/// A missing file yields the defaults; the service can run from environment variables alone.
pub async fn load_from<F>(path: impl AsRef<Path>, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let path = path.as_ref();
    let mut config = match tokio::fs::read_to_string(path).await {
        Ok(config_str) => {
            debug!("Loading configuration from: {}", path.display());
            serde_yaml::from_str::<Config>(&config_str)?
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(
                "No configuration file at {}, using defaults",
                path.display()
            );
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };

    apply_env_overrides(&mut config, lookup)?;
    Ok(config)
}

/// Applies environment overrides. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(token) = get("HUGGINGFACE_API_TOKEN") {
        config.inference.api_token = Some(token);
    }
    if let Some(model) = get("HUGGINGFACE_MODEL_DEFAULT") {
        config.inference.default_model = Some(model);
    }
    if let Some(base_url) = get("HUGGINGFACE_API_BASE") {
        config.inference.base_url = base_url;
    }
    if let Some(host) = get("HOST") {
        config.server.host = host;
    }
    if let Some(port) = get("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("PORT must be a port number, got '{port}'")))?;
    }

    Ok(())
}
