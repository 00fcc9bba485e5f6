pub mod handlers;
pub mod types;

use crate::{
    Error, Result,
    config::{Config, ServerConfig},
    inference::{HuggingFaceClient, InferenceProxy},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Cap on `/api/infer` bodies; far above any JSON-encoded 6000-unit prompt.
pub const MAX_INFER_BODY_BYTES: usize = 256 * 1024;

/// Builds the shared state: one pooled upstream client behind the proxy.
pub fn build_state(config: &Config) -> Result<AppState> {
    let backend = HuggingFaceClient::new(&config.inference)?;
    let proxy = InferenceProxy::new(Arc::new(backend), config.inference.clone());
    Ok(AppState {
        proxy: Arc::new(proxy),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/models", get(handlers::list_models))
        .route(
            "/api/infer",
            post(handlers::infer).layer(DefaultBodyLimit::max(MAX_INFER_BODY_BYTES)),
        )
        .with_state(state)
}

fn cors_layer(server: &ServerConfig) -> Result<Option<CorsLayer>> {
    if server.cors_origins.is_empty() {
        return Ok(None);
    }

    let origins = server
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| Error::config(format!("Invalid CORS origin: {origin}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE]),
    ))
}

pub fn app(config: &Config) -> Result<Router> {
    let mut app = router(build_state(config)?);
    if let Some(cors) = cors_layer(&config.server)? {
        app = app.layer(cors);
    }
    Ok(app.layer(TraceLayer::new_for_http()))
}

pub async fn run(config: Config) -> Result<()> {
    if config.inference.token().is_none() {
        warn!("HUGGINGFACE_API_TOKEN is not set; inference requests will fail with MISSING_TOKEN");
    }

    let app = app(&config)?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!(
        "Starting server on {} (default model: {})",
        addr,
        config.inference.resolved_default_model()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
