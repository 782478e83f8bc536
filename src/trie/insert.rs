use smallvec::{SmallVec, smallvec};

use crate::pattern::RoutePattern;
use crate::pattern::parser::ParsedPattern;
use crate::pattern::token::{
    Token, contains_separator, expand_optionals, flatten_tokens, max_optional_depth,
    push_coalesced,
};

use super::TrieMatcher;
use super::error::TrieError;
use super::node::{DEPTH_INF, EntryId, HostId, HostShapeChild, NodeFlags, NodeId, PatternEntry, ShapeChild, WildcardEdge};
use super::shape::shape_key;
use super::specificity::pattern_specificity;

pub(crate) type NodeSet = SmallVec<[NodeId; 2]>;

impl<T> TrieMatcher<T> {
    /// Registers a pattern. Re-adding an identical source replaces its
    /// payload; optional nesting beyond the configured cap is rejected
    /// before any node is created.
    #[tracing::instrument(level = "trace", skip(self, payload), fields(pattern = %pattern))]
    pub fn add(&mut self, pattern: RoutePattern, payload: T) -> Result<(), TrieError> {
        let depth = pattern_optional_depth(pattern.parsed());
        if depth > self.options.max_optional_depth {
            return Err(TrieError::OptionalDepthExceeded {
                pattern: pattern.source().to_string(),
                depth,
                max: self.options.max_optional_depth,
            });
        }

        if let Some(&existing) = self.by_source.get(pattern.source()) {
            self.entries[existing.0 as usize].payload = payload;
            return Ok(());
        }

        let parsed = pattern.parsed().clone();
        let ignore_case = pattern.ignore_case();
        let specificity = pattern_specificity(&parsed);
        let entry_id = EntryId(self.entries.len() as u32);
        self.by_source.insert(pattern.source().to_string(), entry_id);
        self.entries.push(PatternEntry {
            pattern,
            payload,
            specificity,
        });

        let mut roots: NodeSet = SmallVec::new();
        if let Some(hostname) = &parsed.hostname {
            for host_root in self.protocol_host_roots(parsed.protocol.as_deref()) {
                for variant in expand_optionals(hostname) {
                    let terminal = self.insert_host_labels(host_root, &variant);
                    let trie_root = self.host_pathname_root(terminal, parsed.port.as_deref());
                    if !roots.contains(&trie_root) {
                        roots.push(trie_root);
                    }
                }
            }
        } else {
            roots.push(self.pathname_root);
        }

        let pathname = parsed.pathname.unwrap_or_default();
        for root in roots {
            let terminals = self.insert_path(&smallvec![root], &pathname, ignore_case, true, true);
            for terminal in terminals {
                self.record_entry(terminal, entry_id);
            }
        }

        self.recompute_depths();
        Ok(())
    }

    /// Resolves the host-trie root for each concrete protocol variant: an
    /// exact scheme key, a captured scheme variable, or the any-scheme
    /// branch.
    fn protocol_host_roots(&mut self, protocol: Option<&[Token]>) -> SmallVec<[HostId; 1]> {
        let mut roots: SmallVec<[HostId; 1]> = SmallVec::new();
        let Some(tokens) = protocol else {
            roots.push(self.any_host_root());
            return roots;
        };
        for variant in expand_optionals(tokens) {
            let variable = variant.iter().find_map(|token| match token {
                Token::Variable(name) => Some(name.clone()),
                _ => None,
            });
            let root = if variant
                .iter()
                .any(|token| matches!(token, Token::Wildcard(_)))
            {
                self.any_host_root()
            } else if let Some(name) = variable {
                self.variable_host_root(name)
            } else {
                self.exact_host_root(flatten_tokens(&variant).to_lowercase())
            };
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
    }

    fn any_host_root(&mut self) -> HostId {
        if let Some(root) = self.origin.any {
            return root;
        }
        let root = self.new_host();
        self.origin.any = Some(root);
        root
    }

    fn variable_host_root(&mut self, name: String) -> HostId {
        if let Some(&(_, root)) = self
            .origin
            .variables
            .iter()
            .find(|(existing, _)| *existing == name)
        {
            return root;
        }
        let root = self.new_host();
        self.origin.variables.push((name, root));
        root
    }

    fn exact_host_root(&mut self, key: String) -> HostId {
        if let Some(&root) = self.origin.exact.get(&key) {
            return root;
        }
        let root = self.new_host();
        self.origin.exact.insert(key, root);
        root
    }

    /// Descends the hostname trie in reversed label order, creating nodes as
    /// needed, and returns the terminal host node.
    fn insert_host_labels(&mut self, root: HostId, tokens: &[Token]) -> HostId {
        let mut current = root;
        if tokens.is_empty() {
            return current;
        }
        let labels: Vec<&[Token]> = tokens.split(|token| token.is_separator()).collect();
        for label in labels.iter().rev() {
            current = self.host_label_child(current, label);
        }
        current
    }

    fn host_label_child(&mut self, host: HostId, label: &[Token]) -> HostId {
        match label {
            [Token::Text(value)] => {
                let key = value.to_lowercase();
                if let Some(&child) = self.host(host).static_children.get(&key) {
                    return child;
                }
                let child = self.new_host();
                self.host_mut(host).static_children.insert(key, child);
                child
            }
            [] => {
                let key = String::new();
                if let Some(&child) = self.host(host).static_children.get(&key) {
                    return child;
                }
                let child = self.new_host();
                self.host_mut(host).static_children.insert(key, child);
                child
            }
            [Token::Variable(name)] => {
                if let Some(&(_, child)) = self
                    .host(host)
                    .variable_children
                    .iter()
                    .find(|(existing, _)| existing == name)
                {
                    return child;
                }
                let child = self.new_host();
                self.host_mut(host)
                    .variable_children
                    .push((name.clone(), child));
                child
            }
            [Token::Wildcard(name)] => {
                if let Some(&(_, child)) = self
                    .host(host)
                    .wildcard_children
                    .iter()
                    .find(|(existing, _)| existing == name)
                {
                    return child;
                }
                let child = self.new_host();
                self.host_mut(host)
                    .wildcard_children
                    .push((name.clone(), child));
                child
            }
            _ => {
                let key = shape_key(label, true);
                if let Some(shape) = self
                    .host(host)
                    .shape_children
                    .iter()
                    .find(|shape| shape.key == key)
                {
                    return shape.node;
                }
                let child = self.new_host();
                self.host_mut(host).shape_children.push(HostShapeChild {
                    key,
                    tokens: label.to_vec(),
                    node: child,
                });
                child
            }
        }
    }

    fn host_pathname_root(&mut self, terminal: HostId, port: Option<&str>) -> NodeId {
        match port {
            Some(port) => {
                if let Some(&root) = self.host(terminal).port_tries.get(port) {
                    return root;
                }
                let root = self.new_node();
                self.host_mut(terminal)
                    .port_tries
                    .insert(port.to_string(), root);
                root
            }
            None => {
                if let Some(root) = self.host(terminal).default_trie {
                    return root;
                }
                let root = self.new_node();
                self.host_mut(terminal).default_trie = Some(root);
                root
            }
        }
    }

    /// Inserts a pathname token sequence below every node in `starts`.
    ///
    /// Optionals spanning a separator at a clean segment boundary become a
    /// skip edge plus a taken branch, both rejoining at one continuation
    /// node; any other separator-spanning optional is expanded into its two
    /// concrete forms. Returns the terminal nodes.
    fn insert_path(
        &mut self,
        starts: &NodeSet,
        tokens: &[Token],
        ignore_case: bool,
        at_start: bool,
        at_end: bool,
    ) -> NodeSet {
        let Some(index) = tokens.iter().position(
            |token| matches!(token, Token::Optional(inner) if contains_separator(inner)),
        ) else {
            return self.insert_flat(starts, tokens, ignore_case, at_start, at_end);
        };
        let prefix = &tokens[..index];
        let Token::Optional(inner) = &tokens[index] else {
            unreachable!("position matched an optional")
        };
        let rest = &tokens[index + 1..];

        let boundary_before = matches!(inner.first(), Some(Token::Separator))
            && !matches!(inner.last(), Some(Token::Separator));
        let boundary_after = match rest.first() {
            None | Some(Token::Separator) => true,
            Some(Token::Optional(next)) => matches!(next.first(), Some(Token::Separator)),
            _ => false,
        };

        if boundary_before && boundary_after {
            let starts = self.insert_path(starts, prefix, ignore_case, at_start, false);
            let take_close = at_end && rest.is_empty();
            let take_ends = self.insert_path(&starts, &inner[1..], ignore_case, false, take_close);
            let continuation = self.new_node();
            for &node in starts.iter().chain(take_ends.iter()) {
                let edges = &mut self.node_mut(node).optional_edges;
                if !edges.contains(&continuation) {
                    edges.push(continuation);
                }
            }
            let rest = strip_leading_separator(rest);
            self.insert_path(&smallvec![continuation], rest, ignore_case, false, at_end)
        } else {
            let mut skip: Vec<Token> = Vec::with_capacity(prefix.len() + rest.len());
            let mut take: Vec<Token> = Vec::with_capacity(tokens.len());
            for token in prefix.iter().chain(rest.iter()) {
                push_coalesced(&mut skip, token.clone());
            }
            for token in prefix.iter().chain(inner.iter()).chain(rest.iter()) {
                push_coalesced(&mut take, token.clone());
            }
            let mut terminals = self.insert_path(starts, &skip, ignore_case, at_start, at_end);
            for node in self.insert_path(starts, &take, ignore_case, at_start, at_end) {
                if !terminals.contains(&node) {
                    terminals.push(node);
                }
            }
            terminals
        }
    }

    /// Inserts tokens with no separator-spanning optionals: one edge per
    /// segment, with per-segment optionals expanded into concrete variants.
    fn insert_flat(
        &mut self,
        starts: &NodeSet,
        tokens: &[Token],
        ignore_case: bool,
        at_start: bool,
        at_end: bool,
    ) -> NodeSet {
        if tokens.is_empty() {
            return starts.clone();
        }
        let mut current = starts.clone();
        let segments: Vec<&[Token]> = tokens.split(|token| token.is_separator()).collect();
        for (index, segment) in segments.iter().enumerate() {
            let open = at_start && index == 0;
            let closes = at_end && index + 1 == segments.len();
            let variants = expand_optionals(segment);
            let mut next: NodeSet = SmallVec::new();
            for &node in &current {
                for variant in &variants {
                    let child = self.segment_child(node, variant, ignore_case, open, closes);
                    if !next.contains(&child) {
                        next.push(child);
                    }
                }
            }
            current = next;
        }
        current
    }

    fn segment_child(
        &mut self,
        node: NodeId,
        variant: &[Token],
        ignore_case: bool,
        open: bool,
        closes: bool,
    ) -> NodeId {
        match variant {
            [] => self.static_child(node, String::new(), false),
            [Token::Text(value)] => {
                if ignore_case {
                    self.static_child(node, value.to_lowercase(), true)
                } else {
                    self.static_child(node, value.clone(), false)
                }
            }
            [Token::Variable(name)] => {
                if let Some(&(_, child)) = self
                    .node(node)
                    .variable_children
                    .iter()
                    .find(|(existing, _)| existing == name)
                {
                    return child;
                }
                let child = self.new_node();
                self.node_mut(node)
                    .variable_children
                    .push((name.clone(), child));
                child
            }
            [Token::Wildcard(name)] => {
                if let Some(edge) = self
                    .node_mut(node)
                    .wildcard_edges
                    .iter_mut()
                    .find(|edge| edge.name == *name)
                {
                    edge.allow_empty |= open;
                    return edge.continuation;
                }
                let continuation = self.new_node();
                self.node_mut(node).wildcard_edges.push(WildcardEdge {
                    name: name.clone(),
                    continuation,
                    allow_empty: open,
                });
                continuation
            }
            _ => {
                let key = shape_key(variant, ignore_case);
                let spans_tail = closes && matches!(variant.last(), Some(Token::Wildcard(_)));
                if let Some(shape) = self
                    .node(node)
                    .shape_children
                    .iter()
                    .find(|shape| shape.key == key && shape.spans_tail == spans_tail)
                {
                    return shape.node;
                }
                let child = self.new_node();
                self.node_mut(node).shape_children.push(ShapeChild {
                    key,
                    tokens: variant.to_vec(),
                    ignore_case,
                    spans_tail,
                    node: child,
                });
                child
            }
        }
    }

    fn static_child(&mut self, node: NodeId, key: String, case_folded: bool) -> NodeId {
        if case_folded {
            if let Some(&child) = self.node(node).static_children_ci.get(&key) {
                return child;
            }
            let child = self.new_node();
            let parent = self.node_mut(node);
            parent.static_children_ci.insert(key, child);
            parent.flags |= NodeFlags::HAS_IGNORE_CASE;
            child
        } else {
            if let Some(&child) = self.node(node).static_children.get(&key) {
                return child;
            }
            let child = self.new_node();
            self.node_mut(node).static_children.insert(key, child);
            child
        }
    }

    fn record_entry(&mut self, node: NodeId, entry_id: EntryId) {
        if self.node(node).entries.contains(&entry_id) {
            return;
        }
        let specificity = self.entry(entry_id).specificity;
        let index = self
            .node(node)
            .entries
            .iter()
            .position(|&existing| self.entry(existing).specificity < specificity)
            .unwrap_or(self.node(node).entries.len());
        self.node_mut(node).entries.insert(index, entry_id);
    }

    /// Recomputes min/max depth-to-terminal for every node. Edges always
    /// point from lower to higher arena index, so one descending pass
    /// settles the whole arena.
    fn recompute_depths(&mut self) {
        for index in (0..self.nodes.len()).rev() {
            let mut contributions: SmallVec<[(u32, u32, bool, u32); 8]> = SmallVec::new();
            {
                let node = &self.nodes[index];
                for &child in node
                    .static_children
                    .values()
                    .chain(node.static_children_ci.values())
                {
                    contributions.push((child.0, 1, false, 1));
                }
                for shape in &node.shape_children {
                    contributions.push((shape.node.0, 1, shape.spans_tail, 1));
                }
                for &(_, child) in &node.variable_children {
                    contributions.push((child.0, 1, false, 1));
                }
                for edge in &node.wildcard_edges {
                    let min_add = if edge.allow_empty { 0 } else { 1 };
                    contributions.push((edge.continuation.0, min_add, true, 0));
                }
                for &continuation in &node.optional_edges {
                    contributions.push((continuation.0, 0, false, 0));
                }
            }

            let mut min = if self.nodes[index].entries.is_empty() {
                DEPTH_INF
            } else {
                0
            };
            let mut max = 0;
            for (child, min_add, unbounded, max_add) in contributions {
                let child = &self.nodes[child as usize];
                if child.min_depth >= DEPTH_INF {
                    continue;
                }
                min = min.min(child.min_depth + min_add);
                max = if unbounded {
                    DEPTH_INF
                } else {
                    max.max(child.max_depth.saturating_add(max_add).min(DEPTH_INF))
                };
            }
            self.nodes[index].min_depth = min;
            self.nodes[index].max_depth = max;
        }
    }
}

fn pattern_optional_depth(parsed: &ParsedPattern) -> usize {
    [&parsed.protocol, &parsed.hostname, &parsed.pathname]
        .into_iter()
        .flatten()
        .map(|tokens| max_optional_depth(tokens))
        .max()
        .unwrap_or(0)
}

fn strip_leading_separator(tokens: &[Token]) -> &[Token] {
    match tokens.first() {
        Some(Token::Separator) => &tokens[1..],
        _ => tokens,
    }
}
