//! Headline checks against a policy spec.
//!
//! Each rule is evaluated independently; a headline can collect several
//! issues, and `ok` is simply "no issues".

use serde::Serialize;

use crate::features::FeatureExtractor;
use crate::types::{HeadlineSpec, PolicySpec};

/// Outcome of checking one headline against one policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ValidationResult {
    pub ok: bool,
    pub issues: Vec<String>,
}

impl ValidationResult {
    fn from_issues(issues: Vec<String>) -> Self {
        Self {
            ok: issues.is_empty(),
            issues,
        }
    }
}

pub const ALL_CAPS_ISSUE: &str = "Avoid ALL CAPS headlines";

/// Validate `headline` against the headline section of a policy spec.
pub fn validate_with(
    extractor: &FeatureExtractor,
    headline: &str,
    spec: &HeadlineSpec,
) -> ValidationResult {
    let features = extractor.extract(headline);
    let mut issues = Vec::new();

    if features.length > spec.max_chars {
        issues.push(format!(
            "Headline is {} characters; the limit is {}",
            features.length, spec.max_chars
        ));
    }
    if features.length > spec.warn_at {
        issues.push(format!(
            "Headline is {} characters; aim for {} or fewer",
            features.length, spec.warn_at
        ));
    }
    if features.is_all_caps && spec.no_all_caps {
        issues.push(ALL_CAPS_ISSUE.to_string());
    }

    ValidationResult::from_issues(issues)
}

/// Validate against a full policy spec with the built-in vocabulary.
pub fn validate(headline: &str, spec: &PolicySpec) -> ValidationResult {
    validate_with(FeatureExtractor::shared(), headline, &spec.headline)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn spec() -> PolicySpec {
        PolicySpec::builtin(Utc::now())
    }

    fn with_headline(headline: HeadlineSpec) -> PolicySpec {
        PolicySpec { headline, ..spec() }
    }

    #[test]
    fn all_caps_headline_fails() {
        let result = validate("SAVE $300 ON INSURANCE TODAY", &spec());
        assert!(!result.ok);
        assert_eq!(result.issues, vec![ALL_CAPS_ISSUE.to_string()]);
    }

    #[test]
    fn mixed_case_headline_passes() {
        let result = validate("Over 55? Cut Bills in 3 Steps", &spec());
        assert!(result.ok);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn length_issues_stack() {
        let headline = "a".repeat(65);
        let result = validate(&headline, &spec());
        assert!(!result.ok);
        assert_eq!(result.issues.len(), 2);
        assert!(result.issues[0].contains("65"));
        assert!(result.issues[0].contains("60"));
        assert!(result.issues[1].contains("65"));
    }

    #[test]
    fn warn_threshold_alone() {
        let headline = "b".repeat(50);
        let result = validate(&headline, &spec());
        assert_eq!(result.issues.len(), 1);
        assert!(result.issues[0].contains("50"));
    }

    #[test]
    fn lengths_at_the_limits_pass() {
        assert!(validate(&"c".repeat(45), &spec()).ok);
        let loose = with_headline(HeadlineSpec { warn_at: 60, ..spec().headline });
        assert!(validate(&"c".repeat(60), &loose).ok);
    }

    #[test]
    fn no_letters_never_trips_all_caps() {
        for headline in ["", "123", "   ", "$100!"] {
            let result = validate(headline, &spec());
            assert!(!result.issues.iter().any(|i| i == ALL_CAPS_ISSUE), "{headline:?}");
        }
    }

    #[test]
    fn all_caps_allowed_when_policy_permits() {
        let permissive = with_headline(HeadlineSpec { no_all_caps: false, ..spec().headline });
        assert!(validate("BIG SUMMER SALE", &permissive).ok);
    }

    #[test]
    fn ok_implies_within_bounds() {
        let long_lower = "x".repeat(46);
        let long_upper = "Y".repeat(70);
        let headlines = [
            "Homeowners Are Switching",
            "WHY NOW",
            long_lower.as_str(),
            long_upper.as_str(),
            "",
        ];
        for h in headlines {
            let f = crate::features::extract_features(h);
            let within = f.length <= 60 && f.length <= 45 && !f.is_all_caps;
            if within {
                assert!(validate(h, &spec()).ok, "{h:?}");
            } else {
                assert!(!validate(h, &spec()).ok, "{h:?}");
            }
        }
    }
}
