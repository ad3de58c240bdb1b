//! Headline recommendations.
//!
//! Candidates come from one lazy, finite sequence: the fixed headline catalog
//! followed by headlines templated from the leading report items. Validation,
//! de-duplication and the `limit` cutoff are applied once, to that sequence.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use adlens_core::config::RecommendConfig;

use crate::features::{FeatureExtractor, DIGIT};
use crate::types::{AnnotatedItem, PolicySpec, Recommendation};
use crate::validation::validate_with;

/// Fixed catalog of proven headline templates, tried before anything else.
pub const HEADLINE_CATALOG: &[&str] = &[
    "Over 55? Cut Your Energy Bills in 3 Steps",
    "Homeowners Are Switching to Cheaper Cover",
    "How Retirees Are Lowering Car Insurance Costs",
    "The Hidden Discount Most Drivers Never Claim",
    "What Happens When You Compare Home Cover Now",
    "Boiler Cover From £9 a Month: Compare Today",
    "Why Smart Shoppers Check This Before Renewal",
    "Protect Your Savings With One Simple Change",
];

/// Suffix added to digit-free winner headlines.
pub const STEPS_SUFFIX: &str = " in 3 Steps";

static ALPHA_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{L}(?:[\p{L}'’ ]*\p{L})?").expect("static alphabetic-run pattern")
});

/// Knobs for [`recommend_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendSettings {
    /// Maximum number of headlines returned.
    pub limit: usize,
    /// How many leading items are mined for templated headlines.
    pub top_n: usize,
    /// Maximum number of image briefs.
    pub image_cap: usize,
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            limit: 20,
            top_n: 10,
            image_cap: 12,
        }
    }
}

impl From<&RecommendConfig> for RecommendSettings {
    fn from(config: &RecommendConfig) -> Self {
        Self {
            limit: config.limit,
            top_n: config.top_n,
            image_cap: config.image_cap,
        }
    }
}

/// A headline waiting to be validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub headline: String,
    pub from: Option<String>,
}

/// Catalog headlines, then headlines templated from the first `top_n` items.
pub fn candidates(enriched: &[AnnotatedItem], top_n: usize) -> impl Iterator<Item = Candidate> + '_ {
    let catalog = HEADLINE_CATALOG.iter().map(|headline| Candidate {
        headline: headline.to_string(),
        from: None,
    });

    let templated = enriched.iter().take(top_n).filter_map(|annotated| {
        let headline = annotated.item.headline.trim();
        if headline.is_empty() {
            return None;
        }
        Some(Candidate {
            headline: template_from_winner(headline),
            from: Some(annotated.item.item_id.clone()),
        })
    });

    catalog.chain(templated)
}

/// Append [`STEPS_SUFFIX`] after the first alphabetic run of a digit-free
/// headline. Headlines that already carry a digit come back unchanged.
pub fn template_from_winner(headline: &str) -> String {
    if DIGIT.is_match(headline) {
        return headline.to_string();
    }
    match ALPHA_RUN.find(headline) {
        Some(run) => format!(
            "{}{}{}",
            &headline[..run.end()],
            STEPS_SUFFIX,
            &headline[run.end()..]
        ),
        None => headline.to_string(),
    }
}

/// Validated, de-duplicated recommendations in insertion order.
pub fn recommend_with(
    extractor: &FeatureExtractor,
    enriched: &[AnnotatedItem],
    spec: &PolicySpec,
    limit: usize,
    top_n: usize,
) -> Vec<Recommendation> {
    let mut seen = HashSet::new();

    candidates(enriched, top_n)
        .filter_map(|candidate| {
            let result = validate_with(extractor, &candidate.headline, &spec.headline);
            result.ok.then_some(Recommendation {
                headline: candidate.headline,
                issues: result.issues,
                from: candidate.from,
            })
        })
        .filter(|rec| seen.insert(rec.headline.trim().to_lowercase()))
        .take(limit)
        .collect()
}

/// Recommend with the built-in vocabulary, mining the default `top_n` (10)
/// items. Callers without a preference pass a `limit` of 20.
pub fn recommend(enriched: &[AnnotatedItem], spec: &PolicySpec, limit: usize) -> Vec<Recommendation> {
    recommend_with(
        FeatureExtractor::shared(),
        enriched,
        spec,
        limit,
        RecommendSettings::default().top_n,
    )
}
