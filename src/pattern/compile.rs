use regex::Regex;

use crate::pattern::Params;
use crate::pattern::parser::ParsedPattern;
use crate::pattern::token::Token;
use crate::url::RequestUrl;

/// How literal text is compared during matching. Hostnames and protocols are
/// always folded to lower case to mirror URL normalization; pathnames fold
/// only when the pattern opts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Exact,
    Lower,
    Insensitive,
}

/// Joins protocol, hostname and pathname into one match subject. NUL never
/// occurs in a normalized URL, so it is a safe part boundary.
const PART_BOUNDARY: char = '\u{0}';

/// A pattern's parts compiled into a single anchored regular expression plus
/// the capture names in group order.
///
/// Variables compile to non-greedy "one or more, no separator" groups,
/// wildcards to greedy rest-consuming groups (non-capturing when anonymous),
/// optionals to `(?: ... )?`. Captured values keep the URL's original case
/// even under case-insensitive matching.
#[derive(Debug)]
pub struct CompiledPattern {
    regex: Regex,
    capture_names: Vec<String>,
    has_origin: bool,
    port: Option<String>,
}

impl CompiledPattern {
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn new(parsed: &ParsedPattern, ignore_case: bool) -> Self {
        let mut source = String::from("^");
        let mut capture_names = Vec::new();
        let has_origin = parsed.hostname.is_some();

        if let Some(hostname) = &parsed.hostname {
            match &parsed.protocol {
                Some(protocol) => write_part_regex(
                    &mut source,
                    protocol,
                    None,
                    r"\x00",
                    CaseMode::Lower,
                    true,
                    true,
                    false,
                    &mut capture_names,
                ),
                None => source.push_str(r"[^\x00]*"),
            }
            source.push_str(r"\x00");
            write_part_regex(
                &mut source,
                hostname,
                Some('.'),
                r"\.\x00",
                CaseMode::Lower,
                true,
                true,
                false,
                &mut capture_names,
            );
            source.push_str(r"\x00");
        }

        if let Some(pathname) = &parsed.pathname {
            let case = if ignore_case {
                CaseMode::Insensitive
            } else {
                CaseMode::Exact
            };
            write_part_regex(
                &mut source,
                pathname,
                Some('/'),
                r"/\x00",
                case,
                true,
                true,
                true,
                &mut capture_names,
            );
        }
        source.push('$');

        // Built from escaped literals and fixed group syntax only.
        let regex = Regex::new(&source).expect("generated pattern regex is valid");

        Self {
            regex,
            capture_names,
            has_origin,
            port: parsed.port.clone(),
        }
    }

    pub fn param_names(&self) -> &[String] {
        &self.capture_names
    }

    /// Matches the compiled parts against a normalized URL, returning the
    /// captured params. Search constraints are the caller's concern.
    pub fn match_url(&self, url: &RequestUrl) -> Option<Params> {
        if self.has_origin
            && let Some(port) = &self.port
            && url.port() != Some(port.as_str())
        {
            return None;
        }

        let subject = if self.has_origin {
            format!(
                "{}{PART_BOUNDARY}{}{PART_BOUNDARY}{}",
                url.protocol(),
                url.hostname(),
                url.pathname_rest()
            )
        } else {
            url.pathname_rest().to_string()
        };

        let captures = self.regex.captures(&subject)?;
        let mut params = Params::new();
        for (index, name) in self.capture_names.iter().enumerate() {
            if let Some(capture) = captures.get(index + 1) {
                params.insert(name.clone(), capture.as_str().to_string());
            }
        }
        Some(params)
    }
}

/// `tail_spans` is set for the pathname only: a wildcard closing the pathname
/// consumes the remaining segments, but hostname wildcards never cross a dot
/// unless they stand as a whole label. `open`/`close` carry the boundary
/// context surrounding an optional group into its recursion.
#[allow(clippy::too_many_arguments)]
fn write_part_regex(
    out: &mut String,
    tokens: &[Token],
    sep: Option<char>,
    stop_class: &str,
    case: CaseMode,
    open: bool,
    close: bool,
    tail_spans: bool,
    capture_names: &mut Vec<String>,
) {
    for (index, token) in tokens.iter().enumerate() {
        // A wildcard standing as a whole segment may consume separators; one
        // embedded mid-segment may not, unless it closes a tail-spanning part.
        let at_end = index + 1 == tokens.len();
        let before = if index == 0 {
            open
        } else {
            tokens[index - 1].is_separator()
        };
        let after = if at_end {
            close
        } else {
            tokens[index + 1].is_separator()
        };
        let spans_segments = (before && after) || (tail_spans && at_end);
        match token {
            Token::Text(value) => match case {
                CaseMode::Exact => out.push_str(&regex::escape(value)),
                CaseMode::Lower => out.push_str(&regex::escape(&value.to_lowercase())),
                CaseMode::Insensitive => {
                    out.push_str("(?i:");
                    out.push_str(&regex::escape(value));
                    out.push(')');
                }
            },
            Token::Separator => {
                if let Some(sep) = sep {
                    out.push_str(&regex::escape(sep.encode_utf8(&mut [0; 4])));
                }
            }
            Token::Variable(name) => {
                capture_names.push(name.clone());
                out.push_str("([^");
                out.push_str(stop_class);
                out.push_str("]+?)");
            }
            Token::Wildcard(name) => {
                match name {
                    Some(name) => {
                        capture_names.push(name.clone());
                        out.push('(');
                    }
                    None => out.push_str("(?:"),
                }
                if spans_segments {
                    out.push_str(r"[^\x00]*");
                } else {
                    out.push_str("[^");
                    out.push_str(stop_class);
                    out.push_str("]*");
                }
                out.push(')');
            }
            Token::Optional(inner) => {
                out.push_str("(?:");
                write_part_regex(
                    out,
                    inner,
                    sep,
                    stop_class,
                    case,
                    before,
                    after,
                    tail_spans && at_end,
                    capture_names,
                );
                out.push_str(")?");
            }
        }
    }
}
