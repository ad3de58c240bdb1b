//! Domain-focused API endpoint modules.
//!
//! Each sub-module owns a single responsibility area.
//! Shared error types live here in mod.rs.

mod analysis;
pub mod doc;
mod headlines;
mod health;
mod specs;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::upstream::UpstreamError;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Map an upstream failure to our response.
///
/// A non-2xx upstream answer is relayed with its own status and body. Any
/// other failure (unreachable, undecodable, unconfigured) is a 502.
pub(crate) fn upstream_failure(what: &str, err: UpstreamError) -> Response {
    match err {
        UpstreamError::Status {
            status,
            content_type,
            body,
        } => {
            tracing::warn!("{} upstream returned HTTP {}", what, status);
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let content_type = content_type.unwrap_or_else(|| "text/plain; charset=utf-8".into());
            (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        other => {
            tracing::warn!("{} upstream failed: {}", what, other);
            error_response(StatusCode::BAD_GATEWAY, format!("{what}: {other}"))
        }
    }
}

// ── Re-exports ───────────────────────────────────────────────────
// Flat `api::foo` paths used by router.rs route registration.

pub use analysis::analysis_engine;
pub use headlines::check_headlines;
pub use health::{config, health};
pub use specs::{current_spec, refresh_spec};
