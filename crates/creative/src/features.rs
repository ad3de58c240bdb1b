//! Headline feature extraction.
//!
//! Turns a raw headline into a fixed set of structural and tone signals.
//! Extraction is total: every input, including the empty string, yields a
//! well-formed [`HeadlineFeatures`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::vocabulary::{CompiledVocabulary, VocabularyCategory, VocabularyTable};

pub(crate) static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").expect("static digit pattern"));
static LATIN_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Latin}").expect("static latin pattern"));

static DEFAULT_EXTRACTOR: LazyLock<FeatureExtractor> = LazyLock::new(|| {
    FeatureExtractor::builtin().expect("built-in vocabulary compiles")
});

const CURRENCY_SYMBOLS: [char; 3] = ['$', '€', '£'];

/// Structural and tone signals derived from one headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineFeatures {
    /// Character count of the trimmed headline.
    pub length: usize,
    pub has_numeral: bool,
    pub has_currency: bool,
    pub is_question: bool,
    pub is_all_caps: bool,
    pub has_time_word: bool,
    pub has_retailer: bool,
    pub tone_curiosity: bool,
    pub tone_benefit: bool,
}

/// Feature extractor bound to a compiled vocabulary table.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    vocabulary: CompiledVocabulary,
}

impl FeatureExtractor {
    pub fn new(vocabulary: CompiledVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Extractor over the built-in vocabulary.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(VocabularyTable::builtin().compile()?))
    }

    /// Shared extractor over the built-in vocabulary.
    pub fn shared() -> &'static FeatureExtractor {
        &DEFAULT_EXTRACTOR
    }

    pub fn extract(&self, headline: &str) -> HeadlineFeatures {
        let text = headline.trim();
        if text.is_empty() {
            return HeadlineFeatures::default();
        }

        HeadlineFeatures {
            length: text.chars().count(),
            has_numeral: DIGIT.is_match(text),
            has_currency: text.contains(CURRENCY_SYMBOLS),
            is_question: is_question(text),
            is_all_caps: is_all_caps(text),
            has_time_word: self.vocabulary.matches(VocabularyCategory::Time, text),
            has_retailer: self.vocabulary.matches(VocabularyCategory::Retailer, text),
            tone_curiosity: self.vocabulary.matches(VocabularyCategory::Curiosity, text),
            tone_benefit: self.vocabulary.matches(VocabularyCategory::Benefit, text),
        }
    }
}

/// Ends with `?`, or contains a question clause closed by `?` and whitespace
/// ("Over 55? Cut Bills"). A `?` glued to the next word (query strings) does
/// not count.
fn is_question(text: &str) -> bool {
    text.ends_with('?')
        || text
            .char_indices()
            .filter(|(_, c)| *c == '?')
            .any(|(i, _)| text[i + 1..].starts_with(char::is_whitespace))
}

/// A string with no Latin letters is never "all caps".
fn is_all_caps(text: &str) -> bool {
    LATIN_LETTER.is_match(text) && text.to_uppercase() == text
}

/// Extract features with the built-in vocabulary.
pub fn extract_features(headline: &str) -> HeadlineFeatures {
    FeatureExtractor::shared().extract(headline)
}
