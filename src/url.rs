use std::fmt;
use std::str::FromStr;

use memchr::{memchr, memrchr};
use thiserror::Error;

/// Failure to decompose an input string as an absolute URL. Matching itself
/// never produces these; only URL construction does.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("url '{url}' has no scheme")]
    MissingScheme { url: String },
    #[error("url '{url}' has an empty host")]
    EmptyHost { url: String },
}

/// An absolute URL decomposed and normalized for matching: scheme and host
/// folded to lower case, the scheme's default port dropped, fragment
/// discarded, pathname defaulted to `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrl {
    protocol: String,
    hostname: String,
    port: Option<String>,
    pathname: String,
    search: String,
}

impl RequestUrl {
    #[tracing::instrument(level = "trace")]
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        let bytes = input.as_bytes();
        let end = memchr(b'#', bytes).unwrap_or(bytes.len());
        let trimmed = &input[..end];

        let Some(scheme_end) = trimmed.find("://") else {
            return Err(UrlError::MissingScheme {
                url: input.to_string(),
            });
        };
        let protocol = trimmed[..scheme_end].to_ascii_lowercase();
        let rest = &trimmed[scheme_end + 3..];

        let authority_end = rest
            .bytes()
            .position(|byte| byte == b'/' || byte == b'?')
            .unwrap_or(rest.len());
        let mut authority = &rest[..authority_end];
        if let Some(at) = memrchr(b'@', authority.as_bytes()) {
            authority = &authority[at + 1..];
        }

        let (host, port) = match memrchr(b':', authority.as_bytes()) {
            Some(colon) if authority.as_bytes()[colon + 1..].iter().all(u8::is_ascii_digit) => {
                let port = &authority[colon + 1..];
                (&authority[..colon], (!port.is_empty()).then(|| port))
            }
            _ => (authority, None),
        };
        if host.is_empty() {
            return Err(UrlError::EmptyHost {
                url: input.to_string(),
            });
        }
        let hostname = host.to_ascii_lowercase();
        let port = port
            .filter(|port| default_port(&protocol) != Some(*port))
            .map(str::to_string);

        let tail = &rest[authority_end..];
        let (pathname, search) = match tail.find('?') {
            Some(query) => (&tail[..query], &tail[query + 1..]),
            None => (tail, ""),
        };
        let pathname = if pathname.is_empty() {
            "/".to_string()
        } else {
            pathname.to_string()
        };

        Ok(Self {
            protocol,
            hostname,
            port,
            pathname,
            search: search.to_string(),
        })
    }

    /// Scheme without the trailing `:`, lower-cased.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Explicit port, absent when unspecified or equal to the scheme
    /// default.
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Always starts with `/`.
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// The pathname without its leading `/`, as pattern tokens see it.
    pub fn pathname_rest(&self) -> &str {
        &self.pathname[1..]
    }

    /// Query string without the leading `?`, possibly empty.
    pub fn search(&self) -> &str {
        &self.search
    }
}

fn default_port(protocol: &str) -> Option<&'static str> {
    match protocol {
        "http" | "ws" => Some("80"),
        "https" | "wss" => Some("443"),
        "ftp" => Some("21"),
        _ => None,
    }
}

impl FromStr for RequestUrl {
    type Err = UrlError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl fmt::Display for RequestUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.hostname)?;
        if let Some(port) = &self.port {
            write!(f, ":{port}")?;
        }
        f.write_str(&self.pathname)?;
        if !self.search.is_empty() {
            write!(f, "?{}", self.search)?;
        }
        Ok(())
    }
}
