use std::{sync::Arc, time::Instant};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod webhook;

use webhook::DocSink;

#[derive(Clone)]
pub struct AppState {
    pub doc_sink: Arc<dyn DocSink>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(doc_sink: Arc<dyn DocSink>) -> Self {
        Self {
            doc_sink,
            started_at: Instant::now(),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(http::handlers::health))
        .route("/.well-known/mcp", get(http::handlers::discovery))
        .route(
            "/mcp",
            post(http::handlers::mcp_endpoint).options(http::handlers::preflight),
        )
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
