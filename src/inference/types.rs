use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Longest accepted prompt, in UTF-16 code units after trimming (what a browser's
/// `maxlength` counts).
pub const MAX_PROMPT_CHARS: usize = 6000;

/// Body of `POST /api/infer`.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceSuccess {
    pub output: String,
    pub model: String,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidJson,
    PromptRequired,
    PromptTooLong,
    MissingToken,
    InvalidModel,
    UpstreamUnreachable,
    RateLimited,
    ModelLoading,
    UpstreamError,
    InferenceRejected,
    EmptyOutput,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidJson => "INVALID_JSON",
            Self::PromptRequired => "PROMPT_REQUIRED",
            Self::PromptTooLong => "PROMPT_TOO_LONG",
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidModel => "INVALID_MODEL",
            Self::UpstreamUnreachable => "UPSTREAM_UNREACHABLE",
            Self::RateLimited => "RATE_LIMITED",
            Self::ModelLoading => "MODEL_LOADING",
            Self::UpstreamError => "UPSTREAM_ERROR",
            Self::InferenceRejected => "INFERENCE_REJECTED",
            Self::EmptyOutput => "EMPTY_OUTPUT",
        }
    }

    /// Category for a non-2xx status returned by the provider.
    pub fn for_upstream_status(status: StatusCode) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            StatusCode::SERVICE_UNAVAILABLE => Self::ModelLoading,
            s if s.is_server_error() => Self::UpstreamError,
            _ => Self::InferenceRejected,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way a single inference request can fail, as seen by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    #[error("Invalid JSON request body.")]
    InvalidJson,

    #[error("Prompt is required.")]
    PromptRequired,

    #[error("Prompt is too long. Keep it under 6000 characters.")]
    PromptTooLong,

    #[error("Server is missing HUGGINGFACE_API_TOKEN.")]
    MissingToken,

    #[error("Model identifier is invalid.")]
    InvalidModel,

    #[error("Failed to reach Hugging Face Inference API.")]
    UpstreamUnreachable,

    /// Non-2xx reply from the provider; the status is passed through to the caller.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Inference response did not include model output.")]
    EmptyOutput,
}

impl ProxyError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidJson => ErrorCode::InvalidJson,
            Self::PromptRequired => ErrorCode::PromptRequired,
            Self::PromptTooLong => ErrorCode::PromptTooLong,
            Self::MissingToken => ErrorCode::MissingToken,
            Self::InvalidModel => ErrorCode::InvalidModel,
            Self::UpstreamUnreachable => ErrorCode::UpstreamUnreachable,
            Self::Upstream { status, .. } => ErrorCode::for_upstream_status(*status),
            Self::EmptyOutput => ErrorCode::EmptyOutput,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson
            | Self::PromptRequired
            | Self::PromptTooLong
            | Self::InvalidModel => StatusCode::BAD_REQUEST,
            Self::MissingToken => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamUnreachable | Self::EmptyOutput => StatusCode::BAD_GATEWAY,
            Self::Upstream { status, .. } => *status,
        }
    }

    pub fn to_response_body(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_response_body())).into_response()
    }
}

/// What the proxy hands to the upstream backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamCall {
    pub model: String,
    pub prompt: String,
    pub token: String,
}

/// Body returned by the provider, decoded according to its content type.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamPayload {
    Json(serde_json::Value),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub payload: UpstreamPayload,
    pub latency: Duration,
}
