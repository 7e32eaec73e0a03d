use thiserror::Error;

/// Malformed field path in merge configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path '{path}' has an empty segment at position {position}")]
    EmptySegment { path: String, position: usize },

    #[error("path '{path}': segment '{segment}' has no field name before its index")]
    MissingKey { path: String, segment: String },

    #[error("path '{path}': segment '{segment}' has an invalid index")]
    InvalidIndex { path: String, segment: String },

    #[error("path '{path}': segment '{segment}' has an unclosed '['")]
    UnclosedBracket { path: String, segment: String },

    #[error("path '{path}': segment '{segment}' has characters after its index (one index per segment)")]
    TrailingCharacters { path: String, segment: String },

    #[error("path '{path}': wildcard segments are not supported")]
    Wildcard { path: String },
}
