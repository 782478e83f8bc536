use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::HashSet as FastHashSet;
use smallvec::SmallVec;

use crate::matcher::RouteMatch;
use crate::pattern::Params;
use crate::pattern::search::{constraints_satisfied, parse_url_search};
use crate::url::RequestUrl;

use super::TrieMatcher;
use super::node::{EntryId, HostId, NodeFlags, NodeId};
use super::shape::match_shape;
use super::specificity::{
    HEURISTIC_WEIGHT, OPTIONAL_PENALTY, ORIGIN_TRIE_BASE, STATIC_WEIGHT, VARIABLE_WEIGHT,
    WILDCARD_WEIGHT,
};

type Captures = SmallVec<[(String, String); 4]>;

/// A pending traversal state. Ordered by heuristic priority; ties pop in
/// push order.
struct PendingState {
    priority: i64,
    seq: u64,
    node: NodeId,
    segment: usize,
    specificity: i64,
    captures: Captures,
}

impl PartialEq for PendingState {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for PendingState {}

impl PartialOrd for PendingState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingState {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> TrieMatcher<T> {
    /// Highest-specificity match, or `None`.
    pub fn match_url(&self, url: &RequestUrl) -> Option<RouteMatch<'_, T>> {
        self.match_all(url).into_iter().next()
    }

    /// Every matching pattern, ranked by specificity descending. The search
    /// is bounded by `max_traversal_states`; an exhausted budget yields the
    /// matches found up to that point.
    #[tracing::instrument(level = "trace", skip(self), fields(url = %url))]
    pub fn match_all(&self, url: &RequestUrl) -> Vec<RouteMatch<'_, T>> {
        let query = parse_url_search(url.search());
        let rest = url.pathname_rest();
        let segments: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };
        let total = segments.len();

        let mut heap: BinaryHeap<PendingState> = BinaryHeap::new();
        let mut seq: u64 = 0;

        for (root, captures) in self.start_states(url) {
            let base = if root == self.pathname_root {
                0
            } else {
                ORIGIN_TRIE_BASE
            };
            self.push_state(&mut heap, &mut seq, root, 0, base, captures, total);
        }

        let mut visited: FastHashSet<(NodeId, usize)> = FastHashSet::new();
        let mut seen_entries: FastHashSet<EntryId> = FastHashSet::new();
        let mut found: Vec<(EntryId, Params)> = Vec::new();
        let mut budget = self.options.max_traversal_states;

        while let Some(state) = heap.pop() {
            if !visited.insert((state.node, state.segment)) {
                continue;
            }
            if budget == 0 {
                tracing::trace!(
                    states = self.options.max_traversal_states,
                    "traversal state budget exhausted"
                );
                break;
            }
            budget -= 1;

            let node = self.node(state.node);
            let remaining = total - state.segment;

            if remaining == 0 && !node.entries.is_empty() {
                for &entry_id in &node.entries {
                    if !seen_entries.insert(entry_id) {
                        continue;
                    }
                    let entry = self.entry(entry_id);
                    if let Some(constraints) = &entry.pattern.parsed().search_constraints
                        && !constraints_satisfied(&query, constraints)
                    {
                        continue;
                    }
                    let mut params = Params::new();
                    for (name, value) in &state.captures {
                        params.insert(name.clone(), value.clone());
                    }
                    found.push((entry_id, params));
                }
            }

            for &continuation in &node.optional_edges {
                self.push_state(
                    &mut heap,
                    &mut seq,
                    continuation,
                    state.segment,
                    state.specificity - OPTIONAL_PENALTY,
                    state.captures.clone(),
                    total,
                );
            }

            if remaining > 0 {
                let segment_text = segments[state.segment];

                if let Some(&child) = node.static_children.get(segment_text) {
                    self.push_state(
                        &mut heap,
                        &mut seq,
                        child,
                        state.segment + 1,
                        state.specificity + STATIC_WEIGHT,
                        state.captures.clone(),
                        total,
                    );
                }
                if node.flags.contains(NodeFlags::HAS_IGNORE_CASE)
                    && let Some(&child) = node.static_children_ci.get(&segment_text.to_lowercase())
                {
                    self.push_state(
                        &mut heap,
                        &mut seq,
                        child,
                        state.segment + 1,
                        state.specificity + STATIC_WEIGHT,
                        state.captures.clone(),
                        total,
                    );
                }

                for shape in &node.shape_children {
                    if let Some(shape_captures) =
                        match_shape(&shape.tokens, segment_text, shape.ignore_case)
                    {
                        let mut captures = state.captures.clone();
                        captures.extend(shape_captures);
                        self.push_state(
                            &mut heap,
                            &mut seq,
                            shape.node,
                            state.segment + 1,
                            state.specificity + STATIC_WEIGHT,
                            captures,
                            total,
                        );
                    }
                    // A pathname-closing shape with a trailing wildcard may
                    // also swallow whole following segments.
                    if shape.spans_tail {
                        for extra in 1..remaining {
                            let span =
                                segments[state.segment..=state.segment + extra].join("/");
                            if let Some(shape_captures) =
                                match_shape(&shape.tokens, &span, shape.ignore_case)
                            {
                                let mut captures = state.captures.clone();
                                captures.extend(shape_captures);
                                self.push_state(
                                    &mut heap,
                                    &mut seq,
                                    shape.node,
                                    state.segment + extra + 1,
                                    state.specificity + STATIC_WEIGHT,
                                    captures,
                                    total,
                                );
                            }
                        }
                    }
                }

                if !segment_text.is_empty() {
                    for (name, child) in &node.variable_children {
                        let mut captures = state.captures.clone();
                        captures.push((name.clone(), segment_text.to_string()));
                        self.push_state(
                            &mut heap,
                            &mut seq,
                            *child,
                            state.segment + 1,
                            state.specificity + VARIABLE_WEIGHT,
                            captures,
                            total,
                        );
                    }
                }
            }

            for edge in &node.wildcard_edges {
                let continuation = self.node(edge.continuation);
                if edge.allow_empty && remaining == 0 {
                    let mut captures = state.captures.clone();
                    if let Some(name) = &edge.name {
                        captures.push((name.clone(), String::new()));
                    }
                    self.push_state(
                        &mut heap,
                        &mut seq,
                        edge.continuation,
                        state.segment,
                        state.specificity + WILDCARD_WEIGHT,
                        captures,
                        total,
                    );
                }
                let low = 1.max(remaining as i64 - continuation.max_depth as i64);
                let high = (remaining as i64 - continuation.min_depth as i64).min(remaining as i64);
                for k in low..=high {
                    let k = k as usize;
                    let span = segments[state.segment..state.segment + k].join("/");
                    let mut captures = state.captures.clone();
                    if let Some(name) = &edge.name {
                        captures.push((name.clone(), span));
                    }
                    self.push_state(
                        &mut heap,
                        &mut seq,
                        edge.continuation,
                        state.segment + k,
                        state.specificity + WILDCARD_WEIGHT,
                        captures,
                        total,
                    );
                }
            }
        }

        found.sort_by(|a, b| self.entry(b.0).specificity.cmp(&self.entry(a.0).specificity));
        found
            .into_iter()
            .map(|(entry_id, params)| {
                let entry = self.entry(entry_id);
                RouteMatch {
                    pattern: &entry.pattern,
                    payload: &entry.payload,
                    params,
                }
            })
            .collect()
    }

    /// Resolves the pathname trie roots applicable to a URL: the shared
    /// pathname-only root plus, for each protocol branch the URL satisfies,
    /// every hostname-trie terminal reached by its reversed labels.
    fn start_states(&self, url: &RequestUrl) -> Vec<(NodeId, Captures)> {
        let mut starts: Vec<(NodeId, Captures)> = Vec::new();

        if !self.hosts.is_empty() {
            let labels: Vec<&str> = url.hostname().split('.').collect();
            let mut host_roots: SmallVec<[(HostId, Captures); 2]> = SmallVec::new();
            if let Some(&root) = self.origin.exact.get(url.protocol()) {
                host_roots.push((root, Captures::new()));
            }
            for (name, root) in &self.origin.variables {
                let mut captures = Captures::new();
                captures.push((name.clone(), url.protocol().to_string()));
                host_roots.push((*root, captures));
            }
            if let Some(root) = self.origin.any {
                host_roots.push((root, Captures::new()));
            }
            for (root, captures) in host_roots {
                self.match_host(root, &labels, &captures, url, &mut starts);
            }
        }

        starts.push((self.pathname_root, Captures::new()));
        starts
    }

    /// Recursive descent over hostname labels, consumed from the rightmost
    /// end. Collects the pathname trie roots of every terminal host node
    /// reached.
    fn match_host(
        &self,
        host: HostId,
        labels: &[&str],
        captures: &Captures,
        url: &RequestUrl,
        out: &mut Vec<(NodeId, Captures)>,
    ) {
        let node = self.host(host);

        if labels.is_empty() {
            if let Some(root) = node.default_trie {
                out.push((root, captures.clone()));
            }
            if let Some(port) = url.port()
                && let Some(&root) = node.port_tries.get(port)
            {
                out.push((root, captures.clone()));
            }
            return;
        }

        let (rest, last) = labels.split_at(labels.len() - 1);
        let label = last[0];

        if let Some(&child) = node.static_children.get(label) {
            self.match_host(child, rest, captures, url, out);
        }
        for shape in &node.shape_children {
            if let Some(shape_captures) = match_shape(&shape.tokens, label, true) {
                let mut captures = captures.clone();
                captures.extend(shape_captures);
                self.match_host(shape.node, rest, &captures, url, out);
            }
        }
        if !label.is_empty() {
            for (name, child) in &node.variable_children {
                let mut captures = captures.clone();
                captures.push((name.clone(), label.to_string()));
                self.match_host(*child, rest, &captures, url, out);
            }
        }
        for (name, child) in &node.wildcard_children {
            for k in 1..=labels.len() {
                let (rest, consumed) = labels.split_at(labels.len() - k);
                let mut captures = captures.clone();
                if let Some(name) = name {
                    captures.push((name.clone(), consumed.join(".")));
                }
                self.match_host(*child, rest, &captures, url, out);
            }
        }
    }

    /// Queues a state unless the target subtree cannot terminate within the
    /// remaining segments.
    #[allow(clippy::too_many_arguments)]
    fn push_state(
        &self,
        heap: &mut BinaryHeap<PendingState>,
        seq: &mut u64,
        node: NodeId,
        segment: usize,
        specificity: i64,
        captures: Captures,
        total: usize,
    ) {
        let target = self.node(node);
        let remaining = (total - segment) as u32;
        if remaining < target.min_depth || remaining > target.max_depth {
            return;
        }
        let lookahead = (target.min_depth as i64).min(remaining as i64);
        *seq += 1;
        heap.push(PendingState {
            priority: specificity + HEURISTIC_WEIGHT * lookahead,
            seq: *seq,
            node,
            segment,
            specificity,
            captures,
        });
    }
}
