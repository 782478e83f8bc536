use smallvec::SmallVec;

use crate::pattern::token::{Token, stringify_tokens};

/// Captures produced by a shape mini-match.
pub(crate) type ShapeCaptures = SmallVec<[(String, String); 2]>;

/// Structural signature of a multi-token segment. Two insertions share a
/// shape node only when their tokens and case mode agree exactly.
pub(crate) fn shape_key(tokens: &[Token], ignore_case: bool) -> String {
    let mut key = stringify_tokens(tokens, None);
    if ignore_case {
        key.push('\u{1}');
    }
    key
}

/// Matches one URL segment against a shape's token sequence. Tokens here are
/// always text, variables and wildcards; optionals and separators were
/// resolved at insertion. Variables are non-greedy and at least one
/// character, wildcards greedy.
pub(crate) fn match_shape(
    tokens: &[Token],
    segment: &str,
    ignore_case: bool,
) -> Option<ShapeCaptures> {
    let mut captures = ShapeCaptures::new();
    if step(tokens, segment, ignore_case, &mut captures) {
        Some(captures)
    } else {
        None
    }
}

fn step(tokens: &[Token], rest: &str, ignore_case: bool, captures: &mut ShapeCaptures) -> bool {
    let Some((token, tail)) = tokens.split_first() else {
        return rest.is_empty();
    };

    match token {
        Token::Text(value) => {
            let Some(candidate) = rest.get(..value.len()) else {
                return false;
            };
            let hit = if ignore_case {
                candidate.eq_ignore_ascii_case(value)
            } else {
                candidate == value
            };
            hit && step(tail, &rest[value.len()..], ignore_case, captures)
        }
        Token::Variable(name) => {
            if rest.is_empty() {
                return false;
            }
            for (end, _) in rest
                .char_indices()
                .skip(1)
                .chain(std::iter::once((rest.len(), '\u{0}')))
            {
                // Variables never cross a segment boundary, even when the
                // matched text spans one (trailing-wildcard extension).
                if rest[..end].contains('/') {
                    break;
                }
                let checkpoint = captures.len();
                if step(tail, &rest[end..], ignore_case, captures) {
                    captures.insert(checkpoint, (name.clone(), rest[..end].to_string()));
                    return true;
                }
                captures.truncate(checkpoint);
            }
            false
        }
        Token::Wildcard(name) => {
            let mut boundaries: SmallVec<[usize; 8]> =
                rest.char_indices().map(|(index, _)| index).collect();
            boundaries.push(rest.len());
            for &end in boundaries.iter().rev() {
                let checkpoint = captures.len();
                if step(tail, &rest[end..], ignore_case, captures) {
                    if let Some(name) = name {
                        captures.insert(checkpoint, (name.clone(), rest[..end].to_string()));
                    }
                    return true;
                }
                captures.truncate(checkpoint);
            }
            false
        }
        Token::Separator | Token::Optional(_) => false,
    }
}
