use bitflags::bitflags;
use hashbrown::HashMap as FastHashMap;
use smallvec::SmallVec;

use crate::pattern::RoutePattern;
use crate::pattern::token::Token;

/// Arena index of a pathname trie node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) u32);

/// Arena index of a hostname trie node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HostId(pub(crate) u32);

/// Arena index of a registered pattern entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EntryId(pub(crate) u32);

/// Depth sentinel for nodes with no terminal below them. Large enough to
/// dominate, small enough that `+ 1` never wraps.
pub(crate) const DEPTH_INF: u32 = u32::MAX / 2;

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub(crate) struct NodeFlags: u8 {
        /// The node carries case-folded static children.
        const HAS_IGNORE_CASE = 0b0000_0001;
    }
}

/// A registered pattern plus its payload and precomputed rank.
#[derive(Debug)]
pub(crate) struct PatternEntry<T> {
    pub pattern: RoutePattern,
    pub payload: T,
    pub specificity: i64,
}

/// A multi-token segment edge (`foo-:id`): matched by a per-segment
/// mini-matcher instead of a single map lookup.
#[derive(Debug)]
pub(crate) struct ShapeChild {
    pub key: String,
    pub tokens: Vec<Token>,
    pub ignore_case: bool,
    /// A trailing wildcard may swallow following segments, but only when the
    /// shape closes its pathname.
    pub spans_tail: bool,
    pub node: NodeId,
}

/// A wildcard edge: consumes one or more whole segments, then continues.
#[derive(Debug)]
pub(crate) struct WildcardEdge {
    pub name: Option<String>,
    pub continuation: NodeId,
    /// A wildcard opening its pathname has no separator before it, so it may
    /// also match the empty remainder.
    pub allow_empty: bool,
}

/// One shared-prefix node of a pathname trie.
///
/// `optional_edges` are epsilon transitions: both the skip branch of an
/// inter-segment optional and the rejoin after its taken branch.
#[derive(Debug)]
pub(crate) struct TrieNode {
    pub static_children: FastHashMap<String, NodeId>,
    /// Case-folded keys, populated only by ignore-case patterns.
    pub static_children_ci: FastHashMap<String, NodeId>,
    pub shape_children: Vec<ShapeChild>,
    pub variable_children: SmallVec<[(String, NodeId); 1]>,
    pub wildcard_edges: SmallVec<[WildcardEdge; 1]>,
    pub optional_edges: SmallVec<[NodeId; 1]>,
    /// Terminal entries, kept sorted by specificity descending.
    pub entries: SmallVec<[EntryId; 1]>,
    pub min_depth: u32,
    pub max_depth: u32,
    pub flags: NodeFlags,
}

impl TrieNode {
    pub fn new() -> Self {
        Self {
            static_children: FastHashMap::new(),
            static_children_ci: FastHashMap::new(),
            shape_children: Vec::new(),
            variable_children: SmallVec::new(),
            wildcard_edges: SmallVec::new(),
            optional_edges: SmallVec::new(),
            entries: SmallVec::new(),
            min_depth: DEPTH_INF,
            max_depth: 0,
            flags: NodeFlags::empty(),
        }
    }
}

/// A hostname shape label, matched case-insensitively.
#[derive(Debug)]
pub(crate) struct HostShapeChild {
    pub key: String,
    pub tokens: Vec<Token>,
    pub node: HostId,
}

/// One node of a hostname trie. Labels are indexed in reversed order, so
/// `api.example.com` descends `com`, `example`, `api`.
#[derive(Debug)]
pub(crate) struct HostNode {
    pub static_children: FastHashMap<String, HostId>,
    pub shape_children: Vec<HostShapeChild>,
    pub variable_children: SmallVec<[(String, HostId); 1]>,
    pub wildcard_children: SmallVec<[(Option<String>, HostId); 1]>,
    /// Pathname tries for patterns pinning an explicit port.
    pub port_tries: FastHashMap<String, NodeId>,
    /// Pathname trie for patterns with no port constraint.
    pub default_trie: Option<NodeId>,
}

impl HostNode {
    pub fn new() -> Self {
        Self {
            static_children: FastHashMap::new(),
            shape_children: Vec::new(),
            variable_children: SmallVec::new(),
            wildcard_children: SmallVec::new(),
            port_tries: FastHashMap::new(),
            default_trie: None,
        }
    }
}

/// Protocol dispatch: exact scheme, captured scheme variable, or any.
#[derive(Debug, Default)]
pub(crate) struct OriginRoot {
    pub exact: FastHashMap<String, HostId>,
    pub variables: SmallVec<[(String, HostId); 1]>,
    pub any: Option<HostId>,
}
