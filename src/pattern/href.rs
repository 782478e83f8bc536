use crate::pattern::Params;
use crate::pattern::error::MissingParamError;
use crate::pattern::parser::ParsedPattern;
use crate::pattern::search::serialize_form_pairs;
use crate::pattern::token::Token;

/// Key used to resolve an anonymous `*` wildcard from the param map.
const ANONYMOUS_WILDCARD_KEY: &str = "*";

/// Resolves a parsed pattern into a concrete URL string.
///
/// A missing parameter inside an optional group silently drops the whole
/// group; outside any group it is an error. Explicit `search_params`
/// override the pattern's own search substring.
pub fn build_href(
    parsed: &ParsedPattern,
    params: &Params,
    search_params: Option<&[(&str, &str)]>,
) -> Result<String, MissingParamError> {
    let mut href = String::new();

    if let Some(hostname) = &parsed.hostname {
        match &parsed.protocol {
            Some(protocol) => href.push_str(&render_tokens(protocol, None, params)?),
            None => href.push_str("https"),
        }
        href.push_str("://");
        href.push_str(&render_tokens(hostname, Some('.'), params)?);
        if let Some(port) = &parsed.port {
            href.push(':');
            href.push_str(port);
        }
    }

    href.push('/');
    if let Some(pathname) = &parsed.pathname {
        href.push_str(&render_tokens(pathname, Some('/'), params)?);
    }

    let search = match search_params {
        Some(pairs) => serialize_form_pairs(pairs),
        None => parsed.search.clone().unwrap_or_default(),
    };
    if !search.is_empty() {
        href.push('?');
        href.push_str(&search);
    }

    Ok(href)
}

fn render_tokens(
    tokens: &[Token],
    sep: Option<char>,
    params: &Params,
) -> Result<String, MissingParamError> {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Text(value) => out.push_str(value),
            Token::Separator => {
                if let Some(sep) = sep {
                    out.push(sep);
                }
            }
            Token::Variable(name) => out.push_str(resolve_param(params, name)?),
            Token::Wildcard(name) => {
                let key = name.as_deref().unwrap_or(ANONYMOUS_WILDCARD_KEY);
                out.push_str(resolve_param(params, key)?);
            }
            Token::Optional(inner) => {
                // A missing param only aborts the group it appears in.
                if let Ok(rendered) = render_tokens(inner, sep, params) {
                    out.push_str(&rendered);
                }
            }
        }
    }
    Ok(out)
}

fn resolve_param<'a>(params: &'a Params, name: &str) -> Result<&'a str, MissingParamError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| MissingParamError {
            name: name.to_string(),
        })
}
