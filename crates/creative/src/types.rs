//! Shared data model for the creative analysis pipeline.
//!
//! Every stage produces new values; inputs are never mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::HeadlineFeatures;

// ── Report inputs ───────────────────────────────────────────────────

/// One advertised creative for a reporting window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceItem {
    pub item_id: String,
    #[serde(default)]
    pub headline: String,
    pub ctr: f64,
    pub cvr: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roas: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpa: Option<f64>,
}

impl PerformanceItem {
    pub fn new(item_id: impl Into<String>, headline: impl Into<String>, ctr: f64, cvr: f64) -> Self {
        Self {
            item_id: item_id.into(),
            headline: headline.into(),
            ctr,
            cvr,
            roas: None,
            cpa: None,
        }
    }

    pub fn with_roas(mut self, roas: f64) -> Self {
        self.roas = Some(roas);
        self
    }

    pub fn with_cpa(mut self, cpa: f64) -> Self {
        self.cpa = Some(cpa);
        self
    }
}

/// Median CTR/CVR across all items in the same reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CohortMedians {
    pub ctr: f64,
    pub cvr: f64,
}

// ── Policy spec ─────────────────────────────────────────────────────

/// Versioned ad-policy snapshot. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicySpec {
    pub version: String,
    pub fetched_at: DateTime<Utc>,
    pub headline: HeadlineSpec,
    pub image: ImageSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineSpec {
    pub max_chars: usize,
    pub warn_at: usize,
    #[serde(default)]
    pub no_all_caps: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    pub aspect: String,
    pub recommended: String,
    #[serde(rename = "maxSizeMB")]
    pub max_size_mb: f64,
    #[serde(default)]
    pub formats: Vec<String>,
}

impl PolicySpec {
    /// Built-in policy used when no specs collaborator is configured.
    pub fn builtin(fetched_at: DateTime<Utc>) -> Self {
        Self {
            version: "builtin-1".to_string(),
            fetched_at,
            headline: HeadlineSpec {
                max_chars: 60,
                warn_at: 45,
                no_all_caps: true,
            },
            image: ImageSpec {
                aspect: "1.91:1".to_string(),
                recommended: "1200x628".to_string(),
                max_size_mb: 5.0,
                formats: vec!["jpg".to_string(), "png".to_string()],
            },
        }
    }

    pub fn snapshot(&self) -> SpecSnapshot {
        SpecSnapshot {
            version: self.version.clone(),
            fetched_at: self.fetched_at,
        }
    }
}

/// Identity of the policy an analysis ran against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpecSnapshot {
    pub version: String,
    pub fetched_at: DateTime<Utc>,
}

// ── Analysis outputs ────────────────────────────────────────────────

/// A performance item with derived features, peer deltas and drivers.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedItem {
    #[serde(flatten)]
    pub item: PerformanceItem,
    pub features: HeadlineFeatures,
    pub delta_ctr: f64,
    pub delta_cvr: f64,
    pub drivers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reason {
    pub item_id: String,
    pub reason: ReasonText,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ReasonText {
    pub short: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct Recommendation {
    pub headline: String,
    pub issues: Vec<String>,
    /// Source item id, present only for headlines templated from a winner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ImageBrief {
    pub prompt: String,
    pub why: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct Recommendations {
    pub headlines: Vec<Recommendation>,
    pub images: Vec<ImageBrief>,
}

/// A report row that could not be decoded and was left out of the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub error: String,
}

/// Full analysis payload returned by the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub items: Vec<AnnotatedItem>,
    pub reasons: Vec<Reason>,
    pub recommendations: Recommendations,
    pub spec_snapshot: SpecSnapshot,
    pub skipped: Vec<SkippedRow>,
}
