/// One structural unit of a parsed pattern part.
///
/// A part (protocol, hostname or pathname) is a flat token sequence; optional
/// groups nest their own sequence, so the type is a pure tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of literal characters. Consecutive literals are coalesced.
    Text(String),
    /// `:name` — captures exactly one segment component.
    Variable(String),
    /// `*name` or bare `*` — captures zero or more trailing components.
    Wildcard(Option<String>),
    /// The part-specific separator (`.` for hostname, `/` for pathname).
    Separator,
    /// `( ... )` — an independently optional sub-sequence, nestable.
    Optional(Vec<Token>),
}

impl Token {
    pub fn is_separator(&self) -> bool {
        matches!(self, Token::Separator)
    }
}

/// Deepest `Optional` nesting level in a token sequence. Zero when no
/// optional group is present.
pub(crate) fn max_optional_depth(tokens: &[Token]) -> usize {
    let mut max_depth = 0;
    for token in tokens {
        if let Token::Optional(inner) = token {
            max_depth = max_depth.max(1 + max_optional_depth(inner));
        }
    }
    max_depth
}

/// Re-serializes a token sequence. Text metacharacters are escaped so a
/// stringified pattern re-parses to the same token tree.
pub(crate) fn stringify_tokens(tokens: &[Token], sep: Option<char>) -> String {
    let mut out = String::new();
    write_tokens(&mut out, tokens, sep);
    out
}

fn write_tokens(out: &mut String, tokens: &[Token], sep: Option<char>) {
    for token in tokens {
        match token {
            Token::Text(value) => {
                for ch in value.chars() {
                    if matches!(ch, '\\' | ':' | '*' | '(' | ')') || Some(ch) == sep {
                        out.push('\\');
                    }
                    out.push(ch);
                }
            }
            Token::Variable(name) => {
                out.push(':');
                out.push_str(name);
            }
            Token::Wildcard(name) => {
                out.push('*');
                if let Some(name) = name {
                    out.push_str(name);
                }
            }
            Token::Separator => {
                if let Some(sep) = sep {
                    out.push(sep);
                }
            }
            Token::Optional(inner) => {
                out.push('(');
                write_tokens(out, inner, sep);
                out.push(')');
            }
        }
    }
}

/// Expands optional groups into the finite set of concrete token sequences
/// they can produce. The result contains no `Optional` token; adjacent text
/// runs are re-coalesced. Exponential in nesting, so callers gate on
/// [`max_optional_depth`] first.
pub(crate) fn expand_optionals(tokens: &[Token]) -> Vec<Vec<Token>> {
    let mut variants: Vec<Vec<Token>> = vec![Vec::new()];
    for token in tokens {
        match token {
            Token::Optional(inner) => {
                let inner_variants = expand_optionals(inner);
                let mut expanded = Vec::with_capacity(variants.len() * (inner_variants.len() + 1));
                for variant in &variants {
                    expanded.push(variant.clone());
                    for inner_variant in &inner_variants {
                        let mut taken = variant.clone();
                        for inner_token in inner_variant {
                            push_coalesced(&mut taken, inner_token.clone());
                        }
                        expanded.push(taken);
                    }
                }
                variants = expanded;
            }
            token => {
                for variant in &mut variants {
                    push_coalesced(variant, token.clone());
                }
            }
        }
    }
    variants.dedup();
    variants
}

/// Appends a token, merging consecutive text runs.
pub(crate) fn push_coalesced(tokens: &mut Vec<Token>, token: Token) {
    if let (Some(Token::Text(last)), Token::Text(next)) = (tokens.last_mut(), &token) {
        last.push_str(next);
        return;
    }
    tokens.push(token);
}

/// Whether any `Optional` in the sequence spans a separator, at any nesting
/// level. Such a group is a real branch point rather than a per-segment
/// variation.
pub(crate) fn contains_separator(tokens: &[Token]) -> bool {
    tokens.iter().any(|token| match token {
        Token::Separator => true,
        Token::Optional(inner) => contains_separator(inner),
        _ => false,
    })
}

/// Concatenates the raw text of a token sequence without escaping. Used for
/// dispatch keys where the result is compared against plain URL components,
/// never re-parsed.
pub(crate) fn flatten_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Text(value) => out.push_str(value),
            Token::Variable(name) => {
                out.push(':');
                out.push_str(name);
            }
            Token::Wildcard(name) => {
                out.push('*');
                if let Some(name) = name {
                    out.push_str(name);
                }
            }
            Token::Separator => {}
            Token::Optional(inner) => {
                out.push('(');
                out.push_str(&flatten_tokens(inner));
                out.push(')');
            }
        }
    }
    out
}
