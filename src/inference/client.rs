use super::types::{UpstreamCall, UpstreamPayload, UpstreamReply};
use crate::{Error, Result, config::InferenceConfig};
use async_trait::async_trait;
use reqwest::{
    Client,
    header::{CACHE_CONTROL, CONTENT_TYPE},
};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Performs exactly one request against the provider.
    ///
    /// `Err` means the exchange itself failed (DNS, connect, timeout, broken body).
    /// Any HTTP status the provider answers with, success or not, is an `Ok` reply.
    async fn infer(&self, call: UpstreamCall) -> Result<UpstreamReply>;
}

#[derive(Debug, Serialize)]
struct InferencePayload<'a> {
    inputs: &'a str,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

pub struct HuggingFaceClient {
    client: Client,
    base_url: String,
}

impl HuggingFaceClient {
    pub fn new(config: &InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }
}

#[async_trait]
impl InferenceBackend for HuggingFaceClient {
    async fn infer(&self, call: UpstreamCall) -> Result<UpstreamReply> {
        let url = self.model_url(&call.model);
        debug!("Calling inference endpoint: {}", url);

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .bearer_auth(&call.token)
            .header(CACHE_CONTROL, "no-store")
            .json(&InferencePayload {
                inputs: &call.prompt,
                options: InferenceOptions {
                    wait_for_model: true,
                },
            })
            .send()
            .await?;
        let latency = start.elapsed();

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));

        let body = response
            .text()
            .await
            .map_err(|e| Error::upstream(format!("failed to read response body: {e}")))?;
        let payload = decode_payload(body, is_json);

        debug!(
            "Inference endpoint answered {} in {}ms",
            status,
            latency.as_millis()
        );

        Ok(UpstreamReply {
            status,
            payload,
            latency,
        })
    }
}

/// JSON bodies that fail to parse are kept as raw text.
fn decode_payload(body: String, is_json: bool) -> UpstreamPayload {
    if is_json {
        match serde_json::from_str(&body) {
            Ok(value) => return UpstreamPayload::Json(value),
            Err(e) => debug!("Upstream declared JSON but body did not parse: {}", e),
        }
    }
    UpstreamPayload::Text(body)
}
