use super::{
    client::InferenceBackend,
    extract::extract_output,
    types::{
        InferenceRequest, InferenceSuccess, MAX_PROMPT_CHARS, ProxyError, UpstreamCall,
        UpstreamPayload, UpstreamReply,
    },
};
use crate::config::InferenceConfig;
use axum::http::StatusCode;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tracing::{error, info, warn};

/// Characters allowed in a model id; the id becomes part of the upstream URL path.
static MODEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._/:+-]+$").expect("model pattern is a valid regex")
});

pub fn is_valid_model(model: &str) -> bool {
    MODEL_PATTERN.is_match(model)
}

/// Turns one browser request into one upstream call and back.
pub struct InferenceProxy {
    backend: Arc<dyn InferenceBackend>,
    settings: InferenceConfig,
}

impl InferenceProxy {
    pub fn new(backend: Arc<dyn InferenceBackend>, settings: InferenceConfig) -> Self {
        Self { backend, settings }
    }

    pub fn settings(&self) -> &InferenceConfig {
        &self.settings
    }

    pub async fn handle(&self, body: &[u8]) -> Result<InferenceSuccess, ProxyError> {
        let request = parse_request(body)?;

        let prompt = validate_prompt(request.prompt.as_deref())?;

        let token = self.settings.token().ok_or_else(|| {
            error!("Rejecting inference request: no API token configured");
            ProxyError::MissingToken
        })?;

        let model = self.resolve_model(request.model.as_deref())?;

        info!(
            model = %model,
            prompt_len = prompt_len(prompt),
            "Forwarding inference request"
        );

        let reply = self
            .backend
            .infer(UpstreamCall {
                model: model.clone(),
                prompt: prompt.to_string(),
                token: token.to_string(),
            })
            .await
            .map_err(|e| {
                if e.is_transport() {
                    warn!(model = %model, "Inference endpoint unreachable: {}", e);
                } else {
                    error!(model = %model, "Inference backend failed before reaching the endpoint: {}", e);
                }
                ProxyError::UpstreamUnreachable
            })?;

        interpret_reply(reply, model)
    }

    /// Caller override, then configured default, then the built-in fallback.
    fn resolve_model(&self, requested: Option<&str>) -> Result<String, ProxyError> {
        let model = requested
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| self.settings.resolved_default_model());

        if !is_valid_model(model) {
            return Err(ProxyError::InvalidModel);
        }
        Ok(model.to_string())
    }
}

/// Any well-formed JSON is accepted. Only an object carries fields; every other
/// value is a request without prompt or model (serde would otherwise read an
/// array positionally).
fn parse_request(body: &[u8]) -> Result<InferenceRequest, ProxyError> {
    let value = serde_json::from_slice::<Value>(body).map_err(|_| ProxyError::InvalidJson)?;
    match value {
        Value::Object(_) => serde_json::from_value(value).map_err(|_| ProxyError::InvalidJson),
        _ => Ok(InferenceRequest {
            prompt: None,
            model: None,
        }),
    }
}

/// Length as the browser counts it: UTF-16 code units.
fn prompt_len(prompt: &str) -> usize {
    prompt.encode_utf16().count()
}

fn validate_prompt(prompt: Option<&str>) -> Result<&str, ProxyError> {
    let prompt = prompt.map(str::trim).unwrap_or_default();
    if prompt.is_empty() {
        return Err(ProxyError::PromptRequired);
    }
    if prompt_len(prompt) > MAX_PROMPT_CHARS {
        return Err(ProxyError::PromptTooLong);
    }
    Ok(prompt)
}

fn interpret_reply(reply: UpstreamReply, model: String) -> Result<InferenceSuccess, ProxyError> {
    let latency_ms = u64::try_from(reply.latency.as_millis()).unwrap_or(u64::MAX);

    if !reply.status.is_success() {
        let message = upstream_error_message(&reply.payload, reply.status);
        warn!(
            model = %model,
            status = reply.status.as_u16(),
            "Inference endpoint rejected request: {}",
            message
        );
        return Err(ProxyError::Upstream {
            status: reply.status,
            message,
        });
    }

    let output = extract_output(&reply.payload);
    if output.is_empty() {
        warn!(model = %model, "Inference endpoint returned no usable output");
        return Err(ProxyError::EmptyOutput);
    }

    info!(model = %model, latency_ms, "Inference completed");

    Ok(InferenceSuccess {
        output: output.to_string(),
        model,
        latency_ms,
    })
}

fn upstream_error_message(payload: &UpstreamPayload, status: StatusCode) -> String {
    let message = match payload {
        UpstreamPayload::Json(value) => value.get("error").and_then(Value::as_str),
        UpstreamPayload::Text(_) => None,
    };

    message.map(str::to_string).unwrap_or_else(|| {
        format!(
            "Hugging Face request failed with status {}.",
            status.as_u16()
        )
    })
}
