//! Error types for vocabulary loading and report decoding.

use crate::vocabulary::VocabularyCategory;

#[derive(Debug, thiserror::Error)]
pub enum CreativeError {
    /// A vocabulary keyword or pattern did not compile.
    #[error("invalid {category} vocabulary pattern: {source}")]
    Pattern {
        category: VocabularyCategory,
        #[source]
        source: regex::Error,
    },

    /// Filesystem I/O error while reading a vocabulary file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A single report row could not be turned into a `PerformanceItem`.
    #[error("malformed report row: {0}")]
    MalformedRow(String),

    /// The report envelope itself is unusable (no `items` array).
    #[error("malformed report: {0}")]
    MalformedReport(String),
}

/// Result alias for creative operations.
pub type Result<T> = std::result::Result<T, CreativeError>;
