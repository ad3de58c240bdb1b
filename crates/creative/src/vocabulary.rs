//! Vocabulary table: the keyword lists behind the headline tone, time and
//! retailer signals.
//!
//! The table is data: a built-in default ships in [`BUILTIN_VOCABULARY`], and
//! an alternate table (another locale, another vertical) can be loaded from a
//! YAML document. Compiling a table produces one case-insensitive,
//! word-bounded regex per category.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CreativeError, Result};

// ── Categories ──────────────────────────────────────────────────────

/// Keyword categories consulted by the feature extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyCategory {
    /// Urgency and duration words ("today", "3 days").
    Time,
    /// Retail brand names.
    Retailer,
    /// Curiosity-gap phrasing.
    Curiosity,
    /// Savings and benefit phrasing.
    Benefit,
}

impl VocabularyCategory {
    pub const ALL: [VocabularyCategory; 4] = [
        VocabularyCategory::Time,
        VocabularyCategory::Retailer,
        VocabularyCategory::Curiosity,
        VocabularyCategory::Benefit,
    ];
}

impl fmt::Display for VocabularyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VocabularyCategory::Time => write!(f, "time"),
            VocabularyCategory::Retailer => write!(f, "retailer"),
            VocabularyCategory::Curiosity => write!(f, "curiosity"),
            VocabularyCategory::Benefit => write!(f, "benefit"),
        }
    }
}

// ── Built-in table ──────────────────────────────────────────────────

/// Built-in vocabulary: category → (keyword phrases, raw regex patterns).
pub const BUILTIN_VOCABULARY: &[(VocabularyCategory, &[&str], &[&str])] = &[
    (
        VocabularyCategory::Time,
        &["today", "now", "minutes", "hours", "days", "weeks", "step", "steps"],
        &[r"\d+\s*(?:mins?|minutes?|hrs?|hours?|days?|weeks?|months?|years?)"],
    ),
    (
        VocabularyCategory::Retailer,
        &[
            "amazon",
            "walmart",
            "costco",
            "tesco",
            "aldi",
            "lidl",
            "sainsbury's",
            "asda",
            "argos",
            "home depot",
            "best buy",
            "kroger",
            "ikea",
        ],
        &[],
    ),
    (
        VocabularyCategory::Curiosity,
        &[
            "you won't believe",
            "secret",
            "secrets",
            "what happens",
            "surprising",
            "hidden",
        ],
        &[],
    ),
    (
        VocabularyCategory::Benefit,
        &[
            "save", "saves", "saving", "savings",
            "discount", "discounts", "discounted",
            "deal", "deals",
            "lower", "lowers", "lowering", "lowered",
            "cut", "cuts", "cutting",
            "protect", "protects", "protecting", "protection",
            "improve", "improves", "improving",
            "boost", "boosts", "boosting",
            "reduce", "reduces", "reducing", "reduced",
        ],
        &[],
    ),
];

// ── YAML-level types ────────────────────────────────────────────────

/// Top-level vocabulary document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VocabularyDocument {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: VocabularyMetadata,
    pub spec: VocabularyTable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VocabularyMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub locale: Option<String>,
}

/// Category → terms. Categories missing from the table never match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct VocabularyTable {
    pub categories: BTreeMap<VocabularyCategory, VocabularyTerms>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct VocabularyTerms {
    /// Literal phrases; spaces match any run of whitespace and an apostrophe
    /// matches both straight and curly forms.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Raw regex fragments, OR-ed with the keywords.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl VocabularyTable {
    /// The table described by [`BUILTIN_VOCABULARY`].
    pub fn builtin() -> Self {
        let categories = BUILTIN_VOCABULARY
            .iter()
            .map(|(category, keywords, patterns)| {
                (
                    *category,
                    VocabularyTerms {
                        keywords: keywords.iter().map(|k| k.to_string()).collect(),
                        patterns: patterns.iter().map(|p| p.to_string()).collect(),
                    },
                )
            })
            .collect();
        Self { categories }
    }

    /// Parse a vocabulary YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let doc: VocabularyDocument = serde_yaml::from_str(yaml)?;
        if doc.kind != "Vocabulary" {
            return Err(CreativeError::Yaml(<serde_yaml::Error as serde::de::Error>::custom(
                format!("expected kind Vocabulary, found {}", doc.kind),
            )));
        }
        Ok(doc.spec)
    }

    /// Read and parse a vocabulary YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Compile every category into a single matcher.
    pub fn compile(&self) -> Result<CompiledVocabulary> {
        let mut matchers = BTreeMap::new();
        for category in VocabularyCategory::ALL {
            let Some(terms) = self.categories.get(&category) else {
                continue;
            };
            if let Some(regex) = compile_terms(category, terms)? {
                matchers.insert(category, regex);
            }
        }
        Ok(CompiledVocabulary { matchers })
    }
}

fn keyword_pattern(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .map(|word| regex::escape(word).replace('\'', "['’]"))
        .collect::<Vec<_>>()
        .join(r"\s+")
}

fn compile_terms(category: VocabularyCategory, terms: &VocabularyTerms) -> Result<Option<Regex>> {
    let alternatives: Vec<String> = terms
        .keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .map(|k| keyword_pattern(k))
        .chain(terms.patterns.iter().map(|p| format!("(?:{p})")))
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
    Regex::new(&pattern)
        .map(Some)
        .map_err(|source| CreativeError::Pattern { category, source })
}

// ── Compiled (hot-path) types ───────────────────────────────────────

/// Pre-compiled vocabulary, one regex per category.
#[derive(Debug, Clone)]
pub struct CompiledVocabulary {
    matchers: BTreeMap<VocabularyCategory, Regex>,
}

impl CompiledVocabulary {
    /// Compile the built-in table. The built-in patterns are covered by tests,
    /// so this only fails if they are edited into something invalid.
    pub fn builtin() -> Result<Self> {
        VocabularyTable::builtin().compile()
    }

    pub fn matches(&self, category: VocabularyCategory, text: &str) -> bool {
        self.matchers
            .get(&category)
            .is_some_and(|re| re.is_match(text))
    }

    /// Number of categories with at least one term.
    pub fn category_count(&self) -> usize {
        self.matchers.len()
    }
}
