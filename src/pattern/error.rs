use std::fmt;

use thiserror::Error;

/// Which pattern part a parse error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartName {
    Protocol,
    Hostname,
    Pathname,
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PartName::Protocol => "protocol",
            PartName::Hostname => "hostname",
            PartName::Pathname => "pathname",
        };
        f.write_str(name)
    }
}

/// Malformed pattern syntax, raised at construction time, never at match
/// time. Positions are byte offsets into the full source string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing variable name in {part} at position {position}")]
    MissingVariableName {
        part: PartName,
        pattern: String,
        position: usize,
    },
    #[error("unmatched ')' in {part} at position {position}")]
    UnmatchedCloseParen {
        part: PartName,
        pattern: String,
        position: usize,
    },
    #[error("unmatched '(' in {part} at position {position}")]
    UnmatchedOpenParen {
        part: PartName,
        pattern: String,
        position: usize,
    },
    #[error("dangling escape in {part} at position {position}")]
    DanglingEscape {
        part: PartName,
        pattern: String,
        position: usize,
    },
}

/// A required (non-optional) parameter was absent when building an href.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("missing required parameter '{name}'")]
pub struct MissingParamError {
    pub name: String,
}
