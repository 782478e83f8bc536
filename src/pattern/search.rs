use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap as FastHashMap;
use hashbrown::HashSet as FastHashSet;

/// Requirement on a single query-string key, independent of path matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchConstraint {
    /// The key must appear with `=` (e.g. `?mode=`).
    pub require_assignment: bool,
    /// The key may appear bare, without `=` (e.g. `?debug`).
    pub allow_bare: bool,
    /// When non-empty, every listed value must be present for the key.
    pub required_values: Option<BTreeSet<String>>,
}

/// Per-key constraints, ordered so stringification is deterministic.
pub type SearchConstraints = BTreeMap<String, SearchConstraint>;

/// Parses a pattern's search substring (`key`, `key=value`, `&`-joined) into
/// per-key constraints. Repeated keys accumulate into `required_values`.
pub fn parse_search_constraints(search: &str) -> SearchConstraints {
    let search = search.strip_prefix('?').unwrap_or(search);
    let mut constraints = SearchConstraints::new();

    for part in search.split('&') {
        if part.is_empty() {
            continue;
        }
        match part.find('=') {
            None => {
                let name = decode_search_component(part);
                constraints.entry(name).or_insert_with(|| SearchConstraint {
                    require_assignment: false,
                    allow_bare: true,
                    required_values: None,
                });
            }
            Some(eq) => {
                let name = decode_search_component(&part[..eq]);
                let value_part = &part[eq + 1..];
                let constraint = constraints.entry(name).or_default();
                constraint.require_assignment = true;
                constraint.allow_bare = false;
                if !value_part.is_empty() {
                    let value = decode_search_component(value_part);
                    constraint
                        .required_values
                        .get_or_insert_with(BTreeSet::new)
                        .insert(value);
                }
            }
        }
    }

    constraints
}

/// A concrete URL query string decomposed for constraint evaluation.
#[derive(Debug, Default)]
pub struct ParsedQuery {
    pub bare_names: FastHashSet<String>,
    pub assigned_names: FastHashSet<String>,
    pub values_by_key: FastHashMap<String, FastHashSet<String>>,
}

pub fn parse_url_search(search: &str) -> ParsedQuery {
    let search = search.strip_prefix('?').unwrap_or(search);
    let mut parsed = ParsedQuery::default();
    if search.is_empty() {
        return parsed;
    }

    for part in search.split('&') {
        if part.is_empty() {
            continue;
        }
        match part.find('=') {
            None => {
                parsed.bare_names.insert(decode_search_component(part));
            }
            Some(eq) => {
                let name = decode_search_component(&part[..eq]);
                let value = decode_search_component(&part[eq + 1..]);
                parsed.assigned_names.insert(name.clone());
                parsed.values_by_key.entry(name).or_default().insert(value);
            }
        }
    }

    parsed
}

/// Evaluates every constraint against a parsed query: a key with required
/// values is satisfied when any one of them is present; otherwise an
/// assignment requirement needs the key assigned; otherwise bare or assigned
/// presence suffices.
pub fn constraints_satisfied(query: &ParsedQuery, constraints: &SearchConstraints) -> bool {
    for (key, constraint) in constraints {
        if let Some(required) = &constraint.required_values
            && !required.is_empty()
        {
            let Some(values) = query.values_by_key.get(key) else {
                return false;
            };
            if !required.iter().any(|value| values.contains(value)) {
                return false;
            }
            continue;
        }
        if constraint.require_assignment && !constraint.allow_bare {
            if !query.assigned_names.contains(key) {
                return false;
            }
            continue;
        }
        if !query.assigned_names.contains(key) && !query.bare_names.contains(key) {
            return false;
        }
    }
    true
}

/// Deterministic re-serialization of constraints, used by join and
/// round-tripping.
pub(crate) fn stringify_search_constraints(constraints: &SearchConstraints) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (key, constraint) in constraints {
        let key = encode_form_component(key);
        if constraint.allow_bare {
            parts.push(key);
        } else if let Some(values) = constraint
            .required_values
            .as_ref()
            .filter(|values| !values.is_empty())
        {
            for value in values {
                parts.push(format!("{key}={}", encode_form_component(value)));
            }
        } else if constraint.require_assignment {
            parts.push(format!("{key}="));
        }
    }
    parts.join("&")
}

/// Percent-decodes a query component with `+`-as-space semantics. A
/// malformed escape or invalid UTF-8 leaves the component untouched.
pub(crate) fn decode_search_component(text: &str) -> String {
    try_decode(text).unwrap_or_else(|| text.to_string())
}

fn try_decode(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hi = hex_value(*bytes.get(i + 1)?)?;
                let lo = hex_value(*bytes.get(i + 2)?)?;
                out.push(hi << 4 | lo);
                i += 3;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Form-style percent-encoding: space becomes `+`, unreserved bytes pass
/// through, everything else is `%XX`.
pub(crate) fn encode_form_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for &byte in text.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => {
                out.push(byte as char);
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Serializes explicit search params supplied to `href`.
pub(crate) fn serialize_form_pairs(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                encode_form_component(key),
                encode_form_component(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
