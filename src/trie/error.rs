use thiserror::Error;

use crate::pattern::error::ParseError;

/// Insertion failure for the trie matcher.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrieError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Optional groups expand multiplicatively, so nesting is capped at
    /// insertion instead of discovered at match time.
    #[error("optional nesting depth {depth} in '{pattern}' exceeds the maximum of {max}")]
    OptionalDepthExceeded {
        pattern: String,
        depth: usize,
        max: usize,
    },
}

/// Rejected matcher configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrieOptionsError {
    #[error("max_traversal_states must be at least 1")]
    ZeroTraversalStates,
    #[error("max_optional_depth must be at least 1")]
    ZeroOptionalDepth,
}
