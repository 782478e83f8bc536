use crate::pattern::parser::ParsedPattern;
use crate::pattern::token::Token;

/// Weight of an exact origin constraint.
pub(crate) const ORIGIN_WEIGHT: i64 = 10_000;
/// Weight of having any search constraint.
pub(crate) const SEARCH_WEIGHT: i64 = 1_000;
/// Per-edge weights, shared between whole-pattern scoring and traversal.
pub(crate) const STATIC_WEIGHT: i64 = 100;
pub(crate) const VARIABLE_WEIGHT: i64 = 10;
pub(crate) const WILDCARD_WEIGHT: i64 = 1;
pub(crate) const OPTIONAL_PENALTY: i64 = 1;
/// Base specificity for pathname tries nested under an origin, so any
/// origin-bound pattern outranks every pathname-only one.
pub(crate) const ORIGIN_TRIE_BASE: i64 = 1_000;
/// Multiplier on the remaining-depth heuristic when ordering pending
/// traversal states.
pub(crate) const HEURISTIC_WEIGHT: i64 = 50;

/// Whole-pattern specificity: literal text outranks variables, variables
/// outrank wildcards, optional groups lose a point for the ambiguity they
/// introduce.
pub(crate) fn pattern_specificity(parsed: &ParsedPattern) -> i64 {
    let mut specificity = 0;
    if parsed.constrains_origin() {
        specificity += ORIGIN_WEIGHT;
    }
    if parsed
        .search_constraints
        .as_ref()
        .is_some_and(|constraints| !constraints.is_empty())
    {
        specificity += SEARCH_WEIGHT;
    }
    if let Some(pathname) = &parsed.pathname {
        specificity += tokens_weight(pathname);
    }
    specificity
}

fn tokens_weight(tokens: &[Token]) -> i64 {
    let mut weight = 0;
    for token in tokens {
        weight += match token {
            Token::Text(_) => STATIC_WEIGHT,
            Token::Variable(_) => VARIABLE_WEIGHT,
            Token::Wildcard(_) => WILDCARD_WEIGHT,
            Token::Separator => 0,
            Token::Optional(_) => -OPTIONAL_PENALTY,
        };
    }
    weight
}
