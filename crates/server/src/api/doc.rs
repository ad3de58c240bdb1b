//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI 3.1 spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "adlens API",
        version = "0.1.0",
        description = "Creative headline analysis: features, policy checks, peer-relative scoring and recommendations.",
    ),
    tags(
        (name = "Health", description = "Server readiness and redacted configuration"),
        (name = "Analysis", description = "Peer-relative analysis of a reporting window"),
        (name = "Specs", description = "Ad-policy spec in force"),
        (name = "Headlines", description = "Ad-hoc headline feature extraction and validation"),
    ),
    paths(
        crate::api::health::health,
        crate::api::health::config,
        crate::api::analysis::analysis_engine,
        crate::api::specs::current_spec,
        crate::api::specs::refresh_spec,
        crate::api::headlines::check_headlines,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::health::HealthResponse,
        crate::api::headlines::CheckRequest,
        crate::api::headlines::CheckResponse,
        crate::api::headlines::HeadlineCheck,
        adlens_creative::AnalysisReport,
        adlens_creative::AnnotatedItem,
        adlens_creative::PerformanceItem,
        adlens_creative::HeadlineFeatures,
        adlens_creative::Reason,
        adlens_creative::ReasonText,
        adlens_creative::Recommendations,
        adlens_creative::Recommendation,
        adlens_creative::ImageBrief,
        adlens_creative::SkippedRow,
        adlens_creative::SpecSnapshot,
        adlens_creative::PolicySpec,
        adlens_creative::HeadlineSpec,
        adlens_creative::ImageSpec,
        adlens_creative::CohortMedians,
    ))
)]
pub struct ApiDoc;
