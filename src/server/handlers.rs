use super::types::{HealthResponse, ModelsResponse};
use crate::inference::{InferenceProxy, InferenceSuccess, ProxyError};
use axum::{
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
    response::{Html, Json},
};
use std::sync::Arc;
use tracing::{Instrument, info_span, warn};
use uuid::Uuid;

const INDEX_HTML: &str = include_str!("static/index.html");

#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<InferenceProxy>,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Models offered by the playground form, with the resolved default first.
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let settings = state.proxy.settings();
    let default = settings.resolved_default_model().to_string();

    let mut models = vec![default.clone()];
    models.extend(
        settings
            .models
            .iter()
            .filter(|model| **model != default)
            .cloned(),
    );

    Json(ModelsResponse { default, models })
}

/// `POST /api/infer`. The raw body is handed to the proxy so that every
/// unparseable body is reported as `INVALID_JSON`.
pub async fn infer(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<InferenceSuccess>, ProxyError> {
    let body = body.map_err(body_rejection)?;
    let span = info_span!("infer", request_id = %Uuid::new_v4());
    state.proxy.handle(&body).instrument(span).await.map(Json)
}

/// A body over the route's limit cannot hold an acceptable prompt.
fn body_rejection(rejection: BytesRejection) -> ProxyError {
    warn!("Rejecting inference request body: {}", rejection.body_text());
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ProxyError::PromptTooLong
    } else {
        ProxyError::InvalidJson
    }
}
