use crate::pattern::parser::ParsedPattern;
use crate::pattern::search::{SearchConstraints, stringify_search_constraints};
use crate::pattern::token::{Token, stringify_tokens};

/// Re-serializes a parsed pattern to a source string that parses back to the
/// same token tree. Escaped metacharacters in text stay escaped.
pub fn stringify(parsed: &ParsedPattern) -> String {
    let mut source = String::new();

    if let Some(hostname) = &parsed.hostname {
        if let Some(protocol) = &parsed.protocol {
            source.push_str(&stringify_tokens(protocol, None));
        }
        source.push_str("://");
        source.push_str(&stringify_tokens(hostname, Some('.')));
        if let Some(port) = &parsed.port {
            source.push(':');
            source.push_str(port);
        }
    }

    match &parsed.pathname {
        Some(pathname) => {
            source.push('/');
            source.push_str(&stringify_tokens(pathname, Some('/')));
        }
        None if parsed.hostname.is_none() => source.push('/'),
        None => {}
    }

    if let Some(constraints) = &parsed.search_constraints {
        let search = stringify_search_constraints(constraints);
        if !search.is_empty() {
            source.push('?');
            source.push_str(&search);
        }
    }

    source
}

/// Merges `other` onto `base`. The origin is atomic: when `other` declares a
/// hostname its whole protocol/hostname/port replaces the base's. Pathnames
/// concatenate with exactly one separator; search constraints union per key.
pub fn join(base: &ParsedPattern, other: &ParsedPattern) -> ParsedPattern {
    let (protocol, hostname, port) = if other.hostname.is_some() {
        (
            other.protocol.clone(),
            other.hostname.clone(),
            other.port.clone(),
        )
    } else {
        (
            base.protocol.clone(),
            base.hostname.clone(),
            base.port.clone(),
        )
    };

    let search_constraints = join_search_constraints(
        base.search_constraints.as_ref(),
        other.search_constraints.as_ref(),
    );
    let search = search_constraints
        .as_ref()
        .map(stringify_search_constraints)
        .filter(|search| !search.is_empty());

    ParsedPattern {
        protocol,
        hostname,
        port,
        pathname: join_pathnames(base.pathname.as_deref(), other.pathname.as_deref()),
        search,
        search_constraints,
    }
}

fn join_pathnames(base: Option<&[Token]>, other: Option<&[Token]>) -> Option<Vec<Token>> {
    match (base, other) {
        (None, None) => None,
        (Some(tokens), None) | (None, Some(tokens)) => Some(tokens.to_vec()),
        (Some(base), Some(other)) => {
            let mut joined: Vec<Token> = base.to_vec();
            while joined.last().is_some_and(Token::is_separator) {
                joined.pop();
            }
            joined.push(Token::Separator);
            let mut rest = other;
            while rest.first().is_some_and(Token::is_separator) {
                rest = &rest[1..];
            }
            joined.extend(rest.iter().cloned());
            Some(joined)
        }
    }
}

fn join_search_constraints(
    base: Option<&SearchConstraints>,
    other: Option<&SearchConstraints>,
) -> Option<SearchConstraints> {
    match (base, other) {
        (None, None) => None,
        (Some(constraints), None) | (None, Some(constraints)) => Some(constraints.clone()),
        (Some(base), Some(other)) => {
            let mut merged = base.clone();
            for (key, constraint) in other {
                let entry = merged.entry(key.clone()).or_default();
                entry.require_assignment |= constraint.require_assignment;
                entry.allow_bare |= constraint.allow_bare;
                if let Some(values) = &constraint.required_values {
                    entry
                        .required_values
                        .get_or_insert_with(Default::default)
                        .extend(values.iter().cloned());
                }
            }
            Some(merged)
        }
    }
}
