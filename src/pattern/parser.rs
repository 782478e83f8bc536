use std::ops::Range;

use crate::pattern::error::{ParseError, PartName};
use crate::pattern::search::{SearchConstraints, parse_search_constraints};
use crate::pattern::split::split;
use crate::pattern::token::Token;

/// A fully-parsed pattern source: the three token parts plus the literal
/// port and search substrings.
///
/// Invariant: `hostname` is present exactly when the pattern constrains the
/// network origin; `protocol` and `port` only carry meaning alongside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPattern {
    pub protocol: Option<Vec<Token>>,
    pub hostname: Option<Vec<Token>>,
    pub port: Option<String>,
    pub pathname: Option<Vec<Token>>,
    pub search: Option<String>,
    pub search_constraints: Option<SearchConstraints>,
}

impl ParsedPattern {
    /// Whether any origin part (protocol, hostname, port) is constrained.
    pub fn constrains_origin(&self) -> bool {
        self.protocol.is_some() || self.hostname.is_some() || self.port.is_some()
    }
}

#[tracing::instrument(level = "trace", fields(source = %source))]
pub fn parse(source: &str) -> Result<ParsedPattern, ParseError> {
    let spans = split(source);
    let mut parsed = ParsedPattern::default();

    if let Some(range) = spans.protocol {
        parsed.protocol = Some(parse_part(PartName::Protocol, None, source, range)?);
    }
    if let Some(range) = spans.hostname {
        parsed.hostname = Some(parse_part(PartName::Hostname, Some('.'), source, range)?);
    }
    if let Some(range) = spans.port {
        parsed.port = Some(source[range].to_string());
    }
    if let Some(range) = spans.pathname {
        parsed.pathname = Some(parse_part(PartName::Pathname, Some('/'), source, range)?);
    }
    if let Some(range) = spans.search {
        let search = source[range].to_string();
        parsed.search_constraints = Some(parse_search_constraints(&search));
        parsed.search = Some(search);
    }

    Ok(parsed)
}

/// Tokenizes one part of a pattern source. A single left-to-right scan with
/// an explicit stack of open optional-group frames; text runs coalesce into
/// one `Text` token.
pub fn parse_part(
    part: PartName,
    sep: Option<char>,
    source: &str,
    range: Range<usize>,
) -> Result<Vec<Token>, ParseError> {
    let mut cursor = PartCursor::new(source, range);
    let mut frames: Vec<Vec<Token>> = vec![Vec::new()];
    let mut open_positions: Vec<usize> = Vec::new();

    while let Some(ch) = cursor.peek() {
        if Some(ch) == sep {
            cursor.bump();
            current(&mut frames).push(Token::Separator);
            continue;
        }
        match ch {
            ':' => {
                cursor.bump();
                let position = cursor.byte_pos();
                let Some(name) = cursor.scan_identifier() else {
                    return Err(ParseError::MissingVariableName {
                        part,
                        pattern: source.to_string(),
                        position,
                    });
                };
                current(&mut frames).push(Token::Variable(name));
            }
            '*' => {
                cursor.bump();
                current(&mut frames).push(Token::Wildcard(cursor.scan_identifier()));
            }
            '(' => {
                open_positions.push(cursor.byte_pos());
                cursor.bump();
                frames.push(Vec::new());
            }
            ')' => {
                if frames.len() == 1 {
                    return Err(ParseError::UnmatchedCloseParen {
                        part,
                        pattern: source.to_string(),
                        position: cursor.byte_pos(),
                    });
                }
                cursor.bump();
                open_positions.pop();
                let inner = frames.pop().unwrap_or_default();
                current(&mut frames).push(Token::Optional(inner));
            }
            '\\' => {
                let position = cursor.byte_pos();
                cursor.bump();
                let Some(escaped) = cursor.bump() else {
                    return Err(ParseError::DanglingEscape {
                        part,
                        pattern: source.to_string(),
                        position,
                    });
                };
                append_text(current(&mut frames), escaped);
            }
            _ => {
                cursor.bump();
                append_text(current(&mut frames), ch);
            }
        }
    }

    if let Some(&position) = open_positions.first() {
        return Err(ParseError::UnmatchedOpenParen {
            part,
            pattern: source.to_string(),
            position,
        });
    }

    debug_assert_eq!(frames.len(), 1);
    Ok(frames.pop().unwrap_or_default())
}

fn current(frames: &mut Vec<Vec<Token>>) -> &mut Vec<Token> {
    frames.last_mut().expect("frame stack is never empty")
}

fn append_text(tokens: &mut Vec<Token>, ch: char) {
    if let Some(Token::Text(value)) = tokens.last_mut() {
        value.push(ch);
    } else {
        tokens.push(Token::Text(ch.to_string()));
    }
}

/// Char cursor over one part's byte range, reporting absolute byte
/// positions for errors.
struct PartCursor<'a> {
    text: &'a str,
    chars: Vec<(usize, char)>,
    index: usize,
    offset: usize,
}

impl<'a> PartCursor<'a> {
    fn new(source: &'a str, range: Range<usize>) -> Self {
        let offset = range.start;
        let text = &source[range];
        Self {
            text,
            chars: text.char_indices().collect(),
            index: 0,
            offset,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).map(|&(_, ch)| ch)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.index += 1;
        }
        ch
    }

    fn byte_pos(&self) -> usize {
        self.offset
            + self
                .chars
                .get(self.index)
                .map(|&(pos, _)| pos)
                .unwrap_or(self.text.len())
    }

    /// Consumes `[A-Za-z_$][A-Za-z_$0-9]*` at the cursor, if present.
    fn scan_identifier(&mut self) -> Option<String> {
        let first = self.peek()?;
        if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
            return None;
        }
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
                name.push(ch);
                self.index += 1;
            } else {
                break;
            }
        }
        Some(name)
    }
}
