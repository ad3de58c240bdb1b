//! The analysis endpoint: fan out to the three upstreams, then run the engine.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use adlens_creative::{decode_medians, decode_report, AnalysisReport};

use super::{error_response, upstream_failure};
use crate::state::AppState;

const DEFAULT_DATE: &str = "today";

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalysisQuery {
    /// Reporting window passed through to the upstreams (default `today`).
    pub date: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/analysis-engine",
    tag = "Analysis",
    params(AnalysisQuery),
    responses(
        (status = 200, description = "Annotated items, reasons and recommendations", body = AnalysisReport),
        (status = 502, description = "An upstream was unreachable or returned an unusable payload", body = super::ErrorResponse)
    )
)]
pub async fn analysis_engine(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisReport>, Response> {
    let date = query
        .date
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_DATE.to_string());

    let (spec, report, medians) = tokio::join!(
        state.spec_cache.get(state.spec_source.as_ref()),
        state.performance.fetch_report(&date),
        state.performance.fetch_medians(&date),
    );

    // The item report decides the outcome first; nothing runs on failure.
    let report = report.map_err(|e| upstream_failure("item report", e))?;
    let spec = spec.map_err(|e| upstream_failure("policy spec", e))?;
    let medians = medians.map_err(|e| upstream_failure("cohort medians", e))?;

    let decoded = decode_report(&report)
        .map_err(|e| error_response(StatusCode::BAD_GATEWAY, format!("item report: {e}")))?;
    let medians = decode_medians(&medians)
        .map_err(|e| error_response(StatusCode::BAD_GATEWAY, format!("cohort medians: {e}")))?;

    if !decoded.skipped.is_empty() {
        warn!(
            date = %date,
            skipped = decoded.skipped.len(),
            "report rows skipped during decoding"
        );
    }

    let analysis = state.engine.analyze(&spec, decoded, medians);
    info!(
        date = %date,
        items = analysis.items.len(),
        skipped = analysis.skipped.len(),
        headlines = analysis.recommendations.headlines.len(),
        images = analysis.recommendations.images.len(),
        spec_version = %analysis.spec_snapshot.version,
        "analysis served"
    );

    Ok(Json(analysis))
}
