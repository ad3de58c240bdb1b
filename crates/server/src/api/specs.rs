//! Policy spec endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use axum::Json;

use adlens_creative::PolicySpec;

use super::upstream_failure;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/specs",
    tag = "Specs",
    responses(
        (status = 200, description = "Policy spec currently in force", body = PolicySpec),
        (status = 502, description = "Spec source unavailable", body = super::ErrorResponse)
    )
)]
pub async fn current_spec(State(state): State<Arc<AppState>>) -> Result<Json<PolicySpec>, Response> {
    let spec = state
        .spec_cache
        .get(state.spec_source.as_ref())
        .await
        .map_err(|e| upstream_failure("policy spec", e))?;
    Ok(Json(PolicySpec::clone(&spec)))
}

#[utoipa::path(
    post,
    path = "/api/specs/refresh",
    tag = "Specs",
    responses(
        (status = 200, description = "Freshly fetched policy spec", body = PolicySpec),
        (status = 502, description = "Spec source unavailable", body = super::ErrorResponse)
    )
)]
pub async fn refresh_spec(State(state): State<Arc<AppState>>) -> Result<Json<PolicySpec>, Response> {
    state.spec_cache.invalidate().await;
    current_spec(State(state)).await
}
