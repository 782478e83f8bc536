pub mod compile;
pub mod error;
pub mod href;
pub mod join;
pub mod parser;
pub mod search;
pub mod split;
pub mod token;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::url::{RequestUrl, UrlError};

pub use self::compile::CompiledPattern;
pub use self::error::{MissingParamError, ParseError, PartName};
pub use self::parser::{ParsedPattern, parse};
pub use self::search::{SearchConstraint, SearchConstraints};
pub use self::token::Token;

/// Extracted parameters keyed by variable/wildcard name.
pub type Params = HashMap<String, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternOptions {
    /// Match pathname text case-insensitively. Captured values keep the
    /// URL's original case either way.
    pub ignore_case: bool,
}

/// A successful match: the URL it was evaluated against plus the captured
/// params.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    pub url: RequestUrl,
    pub params: Params,
}

/// An immutable, parsed URL pattern.
///
/// Owns the token tree; the regex automaton is compiled once on first match
/// and memoized.
#[derive(Debug)]
pub struct RoutePattern {
    source: String,
    parsed: ParsedPattern,
    ignore_case: bool,
    compiled: OnceLock<CompiledPattern>,
}

impl RoutePattern {
    pub fn new(source: impl Into<String>) -> Result<Self, ParseError> {
        Self::with_options(source, PatternOptions::default())
    }

    pub fn with_options(
        source: impl Into<String>,
        options: PatternOptions,
    ) -> Result<Self, ParseError> {
        let source = source.into();
        let parsed = parse(&source)?;
        Ok(Self {
            source,
            parsed,
            ignore_case: options.ignore_case,
            compiled: OnceLock::new(),
        })
    }

    fn from_parsed(parsed: ParsedPattern, ignore_case: bool) -> Self {
        Self {
            source: join::stringify(&parsed),
            parsed,
            ignore_case,
            compiled: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn parsed(&self) -> &ParsedPattern {
        &self.parsed
    }

    fn compiled(&self) -> &CompiledPattern {
        self.compiled
            .get_or_init(|| CompiledPattern::new(&self.parsed, self.ignore_case))
    }

    /// Builds a concrete URL from this pattern. Optional groups with missing
    /// params drop out; a missing param outside any group is an error.
    pub fn href(&self, params: &Params) -> Result<String, MissingParamError> {
        href::build_href(&self.parsed, params, None)
    }

    /// As [`href`](Self::href), but with an explicit query string replacing
    /// the pattern's own search substring.
    pub fn href_with_search(
        &self,
        params: &Params,
        search_params: &[(&str, &str)],
    ) -> Result<String, MissingParamError> {
        href::build_href(&self.parsed, params, Some(search_params))
    }

    /// Merges `other` onto this pattern: origin replaced wholesale when
    /// `other` declares one, pathnames concatenated, search constraints
    /// unioned.
    pub fn join(&self, other: &RoutePattern) -> RoutePattern {
        Self::from_parsed(join::join(&self.parsed, &other.parsed), self.ignore_case)
    }

    /// Parses `source` and joins it onto this pattern.
    pub fn join_source(&self, source: &str) -> Result<RoutePattern, ParseError> {
        let other = parse(source)?;
        Ok(Self::from_parsed(
            join::join(&self.parsed, &other),
            self.ignore_case,
        ))
    }

    pub fn match_url(&self, url: &RequestUrl) -> Option<PatternMatch> {
        let params = self.compiled().match_url(url)?;
        if let Some(constraints) = &self.parsed.search_constraints {
            let query = search::parse_url_search(url.search());
            if !search::constraints_satisfied(&query, constraints) {
                return None;
            }
        }
        Some(PatternMatch {
            url: url.clone(),
            params,
        })
    }

    /// Parses `url` and matches against it.
    pub fn match_str(&self, url: &str) -> Result<Option<PatternMatch>, UrlError> {
        Ok(self.match_url(&RequestUrl::parse(url)?))
    }

    pub fn test(&self, url: &RequestUrl) -> bool {
        self.match_url(url).is_some()
    }
}

impl Clone for RoutePattern {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            parsed: self.parsed.clone(),
            ignore_case: self.ignore_case,
            compiled: OnceLock::new(),
        }
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.ignore_case == other.ignore_case
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for RoutePattern {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::new(source)
    }
}
