//! Creative headline analysis.
//!
//! Four stages over one reporting window:
//! - [`features`]: structural and tone signals per headline
//! - [`validation`]: checks against the ad-policy spec
//! - [`scoring`]: deltas against cohort medians, drivers and reasons
//! - [`recommend`] and [`images`]: validated headline suggestions and image briefs
//!
//! [`analysis::CreativeEngine`] runs them in order. Everything here is
//! synchronous and free of shared mutable state.

pub mod analysis;
pub mod error;
pub mod features;
pub mod images;
pub mod recommend;
pub mod report;
pub mod scoring;
pub mod types;
pub mod validation;
pub mod vocabulary;

pub use analysis::CreativeEngine;
pub use error::{CreativeError, Result};
pub use features::{extract_features, FeatureExtractor, HeadlineFeatures};
pub use images::image_briefs;
pub use recommend::{recommend, recommend_with, RecommendSettings};
pub use report::{decode_medians, decode_report, DecodedReport};
pub use scoring::{score, score_with, ScoredItems, ScoringThresholds};
pub use types::*;
pub use validation::{validate, validate_with, ValidationResult};
pub use vocabulary::{CompiledVocabulary, VocabularyCategory, VocabularyTable};
