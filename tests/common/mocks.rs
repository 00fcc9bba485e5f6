use async_trait::async_trait;
use axum::http::StatusCode;
use inference_playground::{
    Error, Result,
    inference::{InferenceBackend, UpstreamCall, UpstreamPayload, UpstreamReply},
};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

/// Mock upstream backend for testing
#[derive(Debug, Clone)]
pub struct MockBackend {
    pub reply: Option<UpstreamReply>,
    pub calls: Arc<Mutex<Vec<UpstreamCall>>>,
}

impl MockBackend {
    pub fn replying(status: StatusCode, payload: UpstreamPayload) -> Self {
        Self {
            reply: Some(UpstreamReply {
                status,
                payload,
                latency: Duration::from_millis(12),
            }),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_json(status: StatusCode, value: serde_json::Value) -> Self {
        Self::replying(status, UpstreamPayload::Json(value))
    }

    /// A backend whose every call fails at the transport level
    pub fn unreachable() -> Self {
        Self {
            reply: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_calls(&self) -> Vec<UpstreamCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn infer(&self, call: UpstreamCall) -> Result<UpstreamReply> {
        self.calls.lock().unwrap().push(call);
        self.reply
            .clone()
            .ok_or_else(|| Error::upstream("connection refused"))
    }
}
