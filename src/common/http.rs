//! HTTP plumbing shared by the three services

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    middleware,
    response::IntoResponse,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::common::metrics::{track_requests, RequestStats};
use crate::common::tracing_middleware::request_tracing_middleware;
use crate::common::{Error, Result};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// JSON body extractor whose rejections become [`Error::Validation`] (400).
///
/// The body is parsed whatever the `Content-Type` header says.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| Error::Validation(rejection.body_text()))?;
        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| Error::Validation(format!("invalid JSON body: {}", e)))
    }
}

/// Parse a decimal `u32` path segment.
pub fn parse_id(what: &str, raw: &str) -> Result<u32> {
    raw.parse::<u32>()
        .map_err(|e| Error::Validation(format!("invalid {} {:?}: {}", what, raw, e)))
}

/// `{"message": ...}` body used by deletions and the welcome route.
pub fn message(text: &str) -> impl IntoResponse {
    Json(json!({ "message": text }))
}

/// Wrap a service router with request counting, tracing, body limit and CORS.
pub fn with_service_layers(router: Router, stats: Arc<RequestStats>) -> Router {
    router
        .layer(middleware::from_fn_with_state(stats, track_requests))
        .layer(middleware::from_fn(request_tracing_middleware))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
}

/// Bind and serve until Ctrl-C / SIGTERM.
pub async fn serve(router: Router, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
