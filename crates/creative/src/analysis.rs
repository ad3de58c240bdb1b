//! The analysis pipeline: score, recommend, brief.

use adlens_core::Config;

use crate::error::Result;
use crate::features::{FeatureExtractor, HeadlineFeatures};
use crate::images::image_briefs;
use crate::recommend::{recommend_with, RecommendSettings};
use crate::report::DecodedReport;
use crate::scoring::{score_with, ScoringThresholds};
use crate::types::{AnalysisReport, CohortMedians, PolicySpec, Recommendations};
use crate::validation::{validate_with, ValidationResult};
use crate::vocabulary::VocabularyTable;

/// Runs the four analysis stages with one vocabulary and one set of knobs.
///
/// Holds no per-request state, so a single engine can be shared across
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct CreativeEngine {
    extractor: FeatureExtractor,
    thresholds: ScoringThresholds,
    settings: RecommendSettings,
}

impl CreativeEngine {
    pub fn new(
        extractor: FeatureExtractor,
        thresholds: ScoringThresholds,
        settings: RecommendSettings,
    ) -> Self {
        Self {
            extractor,
            thresholds,
            settings,
        }
    }

    /// Built-in vocabulary with default thresholds and limits.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(
            FeatureExtractor::builtin()?,
            ScoringThresholds::default(),
            RecommendSettings::default(),
        ))
    }

    /// Engine configured from the scoring, recommend and vocabulary sections.
    pub fn from_config(config: &Config) -> Result<Self> {
        let table = match &config.vocabulary.path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading vocabulary table");
                VocabularyTable::load(path)?
            }
            None => VocabularyTable::builtin(),
        };
        Ok(Self::new(
            FeatureExtractor::new(table.compile()?),
            ScoringThresholds::from(&config.scoring),
            RecommendSettings::from(&config.recommend),
        ))
    }

    pub fn thresholds(&self) -> &ScoringThresholds {
        &self.thresholds
    }

    pub fn settings(&self) -> &RecommendSettings {
        &self.settings
    }

    pub fn extract(&self, headline: &str) -> HeadlineFeatures {
        self.extractor.extract(headline)
    }

    pub fn validate(&self, headline: &str, spec: &PolicySpec) -> ValidationResult {
        validate_with(&self.extractor, headline, &spec.headline)
    }

    /// Annotate every decoded item and synthesize recommendations.
    pub fn analyze(
        &self,
        spec: &PolicySpec,
        report: DecodedReport,
        medians: CohortMedians,
    ) -> AnalysisReport {
        let scored = score_with(&self.extractor, &report.items, medians, &self.thresholds);
        let headlines = recommend_with(
            &self.extractor,
            &scored.enriched,
            spec,
            self.settings.limit,
            self.settings.top_n,
        );
        let images = image_briefs(&spec.image, self.settings.image_cap);

        tracing::debug!(
            items = scored.enriched.len(),
            skipped = report.skipped.len(),
            headlines = headlines.len(),
            images = images.len(),
            spec_version = %spec.version,
            "analysis complete"
        );

        AnalysisReport {
            items: scored.enriched,
            reasons: scored.reasons,
            recommendations: Recommendations { headlines, images },
            spec_snapshot: spec.snapshot(),
            skipped: report.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::recommend::HEADLINE_CATALOG;
    use crate::types::{PerformanceItem, SkippedRow};

    #[test]
    fn analyze_wires_every_stage() {
        let engine = CreativeEngine::builtin().unwrap();
        let spec = PolicySpec::builtin(Utc::now());
        let report = DecodedReport {
            items: vec![
                PerformanceItem::new("a1", "Homeowners Switch Today", 3.5, 0.04)
                    .with_roas(1.5)
                    .with_cpa(15.0),
                PerformanceItem::new("a2", "", 1.0, 0.01),
            ],
            skipped: vec![SkippedRow {
                index: 2,
                item_id: Some("bad".into()),
                error: "malformed report row: missing ctr".into(),
            }],
        };

        let out = engine.analyze(&spec, report, CohortMedians { ctr: 2.0, cvr: 0.03 });

        assert_eq!(out.items.len(), 2);
        assert_eq!(out.reasons.len(), 2);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.spec_snapshot, spec.snapshot());
        assert_eq!(out.recommendations.images.len(), 8);
        assert_eq!(
            out.recommendations.headlines.len(),
            HEADLINE_CATALOG.len() + 1
        );
        assert_eq!(
            out.recommendations.headlines.last().and_then(|r| r.from.as_deref()),
            Some("a1")
        );
    }

    #[test]
    fn settings_bound_the_output() {
        let engine = CreativeEngine::new(
            FeatureExtractor::builtin().unwrap(),
            ScoringThresholds::default(),
            RecommendSettings {
                limit: 2,
                top_n: 0,
                image_cap: 1,
            },
        );
        let spec = PolicySpec::builtin(Utc::now());
        let out = engine.analyze(&spec, DecodedReport::default(), CohortMedians::default());
        assert_eq!(out.recommendations.headlines.len(), 2);
        assert_eq!(out.recommendations.images.len(), 1);
        assert!(out.items.is_empty());
    }

    #[test]
    fn serialized_report_uses_camel_case() {
        let engine = CreativeEngine::builtin().unwrap();
        let spec = PolicySpec::builtin(Utc::now());
        let report = DecodedReport {
            items: vec![PerformanceItem::new("a1", "Save Now", 2.5, 0.03)],
            skipped: vec![],
        };
        let out = engine.analyze(&spec, report, CohortMedians { ctr: 2.0, cvr: 0.03 });
        let json = serde_json::to_value(&out).unwrap();

        assert!(json["specSnapshot"]["fetchedAt"].is_string());
        assert_eq!(json["items"][0]["itemId"], "a1");
        assert_eq!(json["items"][0]["deltaCtr"], 0.5);
        assert_eq!(json["items"][0]["features"]["toneBenefit"], true);
        assert_eq!(json["reasons"][0]["reason"]["short"], "CTR +0.50 pts vs peers");
        assert!(json["recommendations"]["headlines"][0].get("from").is_none());
    }
}
