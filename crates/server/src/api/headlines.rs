//! Ad-hoc headline checks against the policy spec in force.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};

use adlens_creative::{HeadlineFeatures, SpecSnapshot};

use super::{error_response, upstream_failure};
use crate::state::AppState;

const MAX_HEADLINES: usize = 100;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CheckRequest {
    pub headlines: Vec<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineCheck {
    pub headline: String,
    pub features: HeadlineFeatures,
    pub ok: bool,
    pub issues: Vec<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub spec_snapshot: SpecSnapshot,
    pub results: Vec<HeadlineCheck>,
}

#[utoipa::path(
    post,
    path = "/api/headlines/check",
    tag = "Headlines",
    request_body = CheckRequest,
    responses(
        (status = 200, description = "Features and validation per headline", body = CheckResponse),
        (status = 400, description = "Too many headlines", body = super::ErrorResponse),
        (status = 502, description = "Spec source unavailable", body = super::ErrorResponse)
    )
)]
pub async fn check_headlines(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, Response> {
    if request.headlines.len() > MAX_HEADLINES {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("at most {MAX_HEADLINES} headlines per request"),
        ));
    }

    let spec = state
        .spec_cache
        .get(state.spec_source.as_ref())
        .await
        .map_err(|e| upstream_failure("policy spec", e))?;

    let results = request
        .headlines
        .into_iter()
        .map(|headline| {
            let features = state.engine.extract(&headline);
            let validation = state.engine.validate(&headline, &spec);
            HeadlineCheck {
                headline,
                features,
                ok: validation.ok,
                issues: validation.issues,
            }
        })
        .collect();

    Ok(Json(CheckResponse {
        spec_snapshot: spec.snapshot(),
        results,
    }))
}
