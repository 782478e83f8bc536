pub mod error;
mod insert;
mod node;
mod shape;
pub(crate) mod specificity;
mod traversal;

use hashbrown::HashMap as FastHashMap;
use serde::{Deserialize, Serialize};

use crate::pattern::RoutePattern;
use crate::url::RequestUrl;

pub use self::error::{TrieError, TrieOptionsError};

use self::node::{EntryId, HostId, HostNode, NodeId, OriginRoot, PatternEntry, TrieNode};

/// Tuning knobs for the trie matcher. Both caps guard against pathological
/// pattern sets rather than ordinary inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrieOptions {
    /// Upper bound on traversal states expanded per match. When hit, the
    /// search stops and reports whatever it has found so far.
    pub max_traversal_states: usize,
    /// Deepest allowed nesting of optional groups, enforced at insertion.
    pub max_optional_depth: usize,
}

impl Default for TrieOptions {
    fn default() -> Self {
        Self {
            max_traversal_states: 10_000,
            max_optional_depth: 5,
        }
    }
}

impl TrieOptions {
    pub fn validate(&self) -> Result<(), TrieOptionsError> {
        if self.max_traversal_states == 0 {
            return Err(TrieOptionsError::ZeroTraversalStates);
        }
        if self.max_optional_depth == 0 {
            return Err(TrieOptionsError::ZeroOptionalDepth);
        }
        Ok(())
    }
}

/// Multi-pattern matcher indexing patterns in shared-prefix tries, searched
/// best-first under a state budget.
///
/// Origin-bound patterns dispatch through a protocol table into a hostname
/// trie keyed by reversed labels; pathname-only patterns share one root.
#[derive(Debug)]
pub struct TrieMatcher<T> {
    pub(crate) nodes: Vec<TrieNode>,
    pub(crate) hosts: Vec<HostNode>,
    pub(crate) entries: Vec<PatternEntry<T>>,
    pub(crate) origin: OriginRoot,
    pub(crate) pathname_root: NodeId,
    pub(crate) by_source: FastHashMap<String, EntryId>,
    pub(crate) options: TrieOptions,
}

impl<T> TrieMatcher<T> {
    pub fn new() -> Self {
        let mut matcher = Self {
            nodes: Vec::new(),
            hosts: Vec::new(),
            entries: Vec::new(),
            origin: OriginRoot::default(),
            pathname_root: NodeId(0),
            by_source: FastHashMap::new(),
            options: TrieOptions::default(),
        };
        matcher.pathname_root = matcher.new_node();
        matcher
    }

    pub fn with_options(options: TrieOptions) -> Result<Self, TrieOptionsError> {
        options.validate()?;
        let mut matcher = Self::new();
        matcher.options = options;
        Ok(matcher)
    }

    pub fn options(&self) -> &TrieOptions {
        &self.options
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses the source and adds it.
    pub fn add_source(&mut self, source: &str, payload: T) -> Result<(), TrieError> {
        let pattern = RoutePattern::new(source).map_err(TrieError::Parse)?;
        self.add(pattern, payload)
    }

    pub fn test(&self, url: &RequestUrl) -> bool {
        self.match_url(url).is_some()
    }

    pub(crate) fn new_node(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TrieNode::new());
        id
    }

    pub(crate) fn new_host(&mut self) -> HostId {
        let id = HostId(self.hosts.len() as u32);
        self.hosts.push(HostNode::new());
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id.0 as usize]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TrieNode {
        &mut self.nodes[id.0 as usize]
    }

    pub(crate) fn host(&self, id: HostId) -> &HostNode {
        &self.hosts[id.0 as usize]
    }

    pub(crate) fn host_mut(&mut self, id: HostId) -> &mut HostNode {
        &mut self.hosts[id.0 as usize]
    }

    pub(crate) fn entry(&self, id: EntryId) -> &PatternEntry<T> {
        &self.entries[id.0 as usize]
    }
}

impl<T> Default for TrieMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}
