//! HTTP boundary: routing, input sanitization, rate limiting, CORS/security
//! headers, and status mapping. No resolution logic lives here: the core is
//! invoked as a black box and its error kinds are mapped to wire codes:
//! CAPTCHA → 429, validation → 400, everything else → 500.

pub mod rate_limit;
pub mod sanitize;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::core::types::{ErrorResponse, ResolveRequest, ResolveResponse};
use crate::core::AppState;
use crate::resolver::{self, ResolveError};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/resolve", post(resolve_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "linkpeel",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, message: &str) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

async fn resolve_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, HandlerError> {
    if !state.rate_limiter.try_acquire(peer.ip()) {
        return Err(reject(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please wait and try again.",
        ));
    }

    let url = sanitize::sanitize_url(&request.url).map_err(|e| {
        warn!("rejected url from {}: {}", peer.ip(), e);
        reject(StatusCode::BAD_REQUEST, "Invalid URL provided.")
    })?;

    info!("resolve request from {}: {}", peer.ip(), url);

    let resolution = resolver::resolve_gate_url(state.engine.as_ref(), &state.denylist, &url)
        .await
        .map_err(|e| match e {
            ResolveError::CaptchaDetected => reject(
                StatusCode::TOO_MANY_REQUESTS,
                "Captcha detected. Cannot resolve link.",
            ),
            other => {
                error!("resolution error: {}", other);
                reject(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        })?;

    Ok(Json(ResolveResponse {
        original_url: url,
        final_url: resolution.final_url,
        metadata: resolution.metadata,
        warnings: resolution.warnings,
        resolved_at: Utc::now().to_rfc3339(),
    }))
}
