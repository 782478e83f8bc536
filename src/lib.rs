pub mod matcher;
pub mod pattern;
pub mod trie;
pub mod url;

pub use matcher::{LinearMatcher, RouteMatch};
pub use pattern::{
    MissingParamError, ParseError, Params, PatternMatch, PatternOptions, RoutePattern,
};
pub use trie::{TrieError, TrieMatcher, TrieOptions, TrieOptionsError};
pub use url::{RequestUrl, UrlError};
