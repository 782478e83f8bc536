use hashbrown::HashMap as FastHashMap;

use crate::pattern::error::ParseError;
use crate::pattern::{Params, RoutePattern};
use crate::url::RequestUrl;

/// One matched route: the pattern that matched, its payload, and the
/// captured params.
#[derive(Debug)]
pub struct RouteMatch<'a, T> {
    pub pattern: &'a RoutePattern,
    pub payload: &'a T,
    pub params: Params,
}

#[derive(Debug)]
struct MatchEntry<T> {
    pattern: RoutePattern,
    payload: T,
}

/// Baseline matcher: tries patterns one by one in registration order, first
/// match wins. No ranking is applied; ordering is entirely the caller's.
/// Correctness reference for the trie matcher, and the better choice for
/// small pattern sets.
#[derive(Debug)]
pub struct LinearMatcher<T> {
    entries: Vec<MatchEntry<T>>,
    by_source: FastHashMap<String, usize>,
}

impl<T> Default for LinearMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LinearMatcher<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_source: FastHashMap::new(),
        }
    }

    /// Adds a pattern. Re-adding the same source replaces its payload
    /// instead of duplicating the entry.
    #[tracing::instrument(level = "trace", skip(self, payload), fields(pattern = %pattern))]
    pub fn add(&mut self, pattern: RoutePattern, payload: T) {
        if let Some(&index) = self.by_source.get(pattern.source()) {
            self.entries[index].payload = payload;
            return;
        }

        self.by_source
            .insert(pattern.source().to_string(), self.entries.len());
        self.entries.push(MatchEntry { pattern, payload });
    }

    pub fn add_source(&mut self, source: &str, payload: T) -> Result<(), ParseError> {
        self.add(RoutePattern::new(source)?, payload);
        Ok(())
    }

    /// First match in registration order, or `None`.
    pub fn match_url(&self, url: &RequestUrl) -> Option<RouteMatch<'_, T>> {
        self.entries.iter().find_map(|entry| {
            entry.pattern.match_url(url).map(|matched| RouteMatch {
                pattern: &entry.pattern,
                payload: &entry.payload,
                params: matched.params,
            })
        })
    }

    /// All matches in registration order, evaluated lazily.
    pub fn match_all<'a>(
        &'a self,
        url: &'a RequestUrl,
    ) -> impl Iterator<Item = RouteMatch<'a, T>> + 'a {
        self.entries.iter().filter_map(move |entry| {
            entry
                .pattern
                .match_url(url)
                .map(|matched| RouteMatch {
                    pattern: &entry.pattern,
                    payload: &entry.payload,
                    params: matched.params,
                })
        })
    }

    pub fn test(&self, url: &RequestUrl) -> bool {
        self.match_url(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
