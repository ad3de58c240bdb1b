//! Peer-relative scoring.
//!
//! Annotates each item with its headline features, signed CTR/CVR deltas
//! against the cohort medians, the headline drivers that likely explain its
//! performance, and a short human-readable reason. Nothing is filtered out.

use serde::{Deserialize, Serialize};

use adlens_core::config::ScoringConfig;

use crate::features::{FeatureExtractor, HeadlineFeatures};
use crate::types::{AnnotatedItem, CohortMedians, PerformanceItem, Reason, ReasonText};

/// Summary used when no threshold clause fired for an item.
pub const NO_SIGNAL_SUMMARY: &str = "Rule evaluation";

const CLAUSE_SEPARATOR: &str = " + ";

/// Business targets the reason clauses are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringThresholds {
    /// ROAS at or above this is called out.
    pub roas_target: f64,
    /// CPA at or below this (in £) is called out.
    pub cpa_target: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            roas_target: 1.3,
            cpa_target: 18.0,
        }
    }
}

impl From<&ScoringConfig> for ScoringThresholds {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            roas_target: config.roas_target,
            cpa_target: config.cpa_target,
        }
    }
}

// ── Drivers ─────────────────────────────────────────────────────────

/// Headline traits credited with an item's relative performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    NumberInTitle,
    RetailerMention,
    PriceAnchor,
    TimeReference,
}

impl Driver {
    pub fn label(self) -> &'static str {
        match self {
            Driver::NumberInTitle => "number in title",
            Driver::RetailerMention => "retailer mention",
            Driver::PriceAnchor => "price anchor",
            Driver::TimeReference => "time reference",
        }
    }

    /// Drivers present in `features`, always in declaration order.
    pub fn detect(features: &HeadlineFeatures) -> Vec<Driver> {
        [
            (features.has_numeral, Driver::NumberInTitle),
            (features.has_retailer, Driver::RetailerMention),
            (features.has_currency, Driver::PriceAnchor),
            (features.has_time_word, Driver::TimeReference),
        ]
        .into_iter()
        .filter_map(|(present, driver)| present.then_some(driver))
        .collect()
    }
}

// ── Scoring ─────────────────────────────────────────────────────────

/// Annotated copies of the input items plus one reason per item.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItems {
    pub enriched: Vec<AnnotatedItem>,
    pub reasons: Vec<Reason>,
}

/// Score every item against the cohort medians.
pub fn score_with(
    extractor: &FeatureExtractor,
    items: &[PerformanceItem],
    medians: CohortMedians,
    thresholds: &ScoringThresholds,
) -> ScoredItems {
    let mut enriched = Vec::with_capacity(items.len());
    let mut reasons = Vec::with_capacity(items.len());

    for item in items {
        let features = extractor.extract(&item.headline);
        let delta_ctr = item.ctr - medians.ctr;
        let delta_cvr = item.cvr - medians.cvr;
        let drivers: Vec<String> = Driver::detect(&features)
            .into_iter()
            .map(|d| d.label().to_string())
            .collect();

        let clauses = reason_clauses(item, delta_ctr, delta_cvr, thresholds);
        reasons.push(Reason {
            item_id: item.item_id.clone(),
            reason: build_reason(&clauses, &drivers),
        });

        enriched.push(AnnotatedItem {
            item: item.clone(),
            features,
            delta_ctr,
            delta_cvr,
            drivers,
        });
    }

    ScoredItems { enriched, reasons }
}

/// Score with the built-in vocabulary and default thresholds.
pub fn score(items: &[PerformanceItem], medians: CohortMedians) -> ScoredItems {
    score_with(
        FeatureExtractor::shared(),
        items,
        medians,
        &ScoringThresholds::default(),
    )
}

fn reason_clauses(
    item: &PerformanceItem,
    delta_ctr: f64,
    delta_cvr: f64,
    thresholds: &ScoringThresholds,
) -> Vec<String> {
    let mut clauses = Vec::new();

    if let Some(roas) = item.roas.filter(|r| *r >= thresholds.roas_target) {
        clauses.push(format!(
            "ROAS {:.2} (>= target {})",
            roas, thresholds.roas_target
        ));
    }
    if let Some(cpa) = item.cpa.filter(|c| *c <= thresholds.cpa_target) {
        clauses.push(format!(
            "CPA {:.2} (<= £{} target)",
            cpa, thresholds.cpa_target
        ));
    }
    if delta_ctr > 0.0 {
        clauses.push(format!("CTR +{:.2} pts vs peers", delta_ctr));
    }
    if delta_cvr > 0.0 {
        clauses.push(format!("CVR +{:.2}% vs peers", delta_cvr * 100.0));
    }

    clauses
}

fn build_reason(clauses: &[String], drivers: &[String]) -> ReasonText {
    let short = if clauses.is_empty() {
        NO_SIGNAL_SUMMARY.to_string()
    } else {
        clauses
            .iter()
            .take(2)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(CLAUSE_SEPARATOR)
    };

    let mut detail = if clauses.is_empty() {
        NO_SIGNAL_SUMMARY.to_string()
    } else {
        clauses.join(CLAUSE_SEPARATOR)
    };
    if !drivers.is_empty() {
        detail.push_str("; drivers: ");
        detail.push_str(&drivers.join(", "));
    }

    ReasonText { short, detail }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn medians() -> CohortMedians {
        CohortMedians { ctr: 2.0, cvr: 0.03 }
    }

    #[test]
    fn deltas_are_signed_differences() {
        let items = vec![
            PerformanceItem::new("up", "Plain words", 3.0, 0.03),
            PerformanceItem::new("down", "Plain words", 1.0, 0.03),
        ];
        let scored = score(&items, medians());
        assert_eq!(scored.enriched[0].delta_ctr, 1.0);
        assert_eq!(scored.enriched[1].delta_ctr, -1.0);
    }

    #[test]
    fn all_four_clauses_fire() {
        let item = PerformanceItem::new("a1", "Homeowners switch", 3.5, 0.04)
            .with_roas(1.5)
            .with_cpa(15.0);
        let scored = score(&[item], medians());

        let annotated = &scored.enriched[0];
        assert_eq!(annotated.delta_ctr, 1.5);
        assert!((annotated.delta_cvr - 0.01).abs() < 1e-12);

        let reason = &scored.reasons[0].reason;
        assert_eq!(
            reason.detail,
            "ROAS 1.50 (>= target 1.3) + CPA 15.00 (<= £18 target) + CTR +1.50 pts vs peers + CVR +1.00% vs peers"
        );
        assert_eq!(
            reason.short,
            "ROAS 1.50 (>= target 1.3) + CPA 15.00 (<= £18 target)"
        );
        assert_eq!(scored.reasons[0].item_id, "a1");
    }

    #[test]
    fn no_signal_falls_back_to_rule_evaluation() {
        let item = PerformanceItem::new("flat", "Plain words", 1.0, 0.01)
            .with_roas(0.9)
            .with_cpa(40.0);
        let scored = score(&[item], medians());
        let reason = &scored.reasons[0].reason;
        assert_eq!(reason.short, NO_SIGNAL_SUMMARY);
        assert_eq!(reason.detail, NO_SIGNAL_SUMMARY);
    }

    #[test]
    fn drivers_follow_fixed_order_and_suffix_detail() {
        let item = PerformanceItem::new("d", "Save $40 at Tesco Today in 2 Days", 2.5, 0.02);
        let scored = score(&[item], medians());
        assert_eq!(
            scored.enriched[0].drivers,
            vec!["number in title", "retailer mention", "price anchor", "time reference"]
        );
        assert_eq!(
            scored.reasons[0].reason.detail,
            "CTR +0.50 pts vs peers; drivers: number in title, retailer mention, price anchor, time reference"
        );
    }

    #[test]
    fn thresholds_are_inclusive_and_configurable() {
        let item = PerformanceItem::new("edge", "Plain words", 1.0, 0.01)
            .with_roas(1.3)
            .with_cpa(18.0);
        let scored = score(&[item.clone()], medians());
        assert!(scored.reasons[0].reason.detail.starts_with("ROAS 1.30"));
        assert!(scored.reasons[0].reason.detail.contains("CPA 18.00"));

        let strict = ScoringThresholds {
            roas_target: 2.0,
            cpa_target: 10.0,
        };
        let scored = score_with(FeatureExtractor::shared(), &[item], medians(), &strict);
        assert_eq!(scored.reasons[0].reason.short, NO_SIGNAL_SUMMARY);
    }

    #[test]
    fn every_item_is_kept_in_order() {
        let items: Vec<_> = (0..5)
            .map(|i| PerformanceItem::new(format!("i{i}"), "", i as f64, 0.0))
            .collect();
        let scored = score(&items, medians());
        let ids: Vec<_> = scored.enriched.iter().map(|a| a.item.item_id.as_str()).collect();
        assert_eq!(ids, vec!["i0", "i1", "i2", "i3", "i4"]);
        assert_eq!(scored.reasons.len(), 5);
        assert_eq!(items[0].headline, "");
    }
}
