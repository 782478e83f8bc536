use std::collections::BTreeSet;

use trellis_router::{LinearMatcher, RequestUrl, TrieError, TrieMatcher, TrieOptions};

fn url(input: &str) -> RequestUrl {
    RequestUrl::parse(input).expect("url should parse")
}

#[test]
fn matches_static_and_variable_paths() {
    let mut matcher = TrieMatcher::new();
    matcher.add_source("/users/me", "literal").expect("add");
    matcher.add_source("/users/:id", "variable").expect("add");

    let hit = matcher
        .match_url(&url("https://example.com/users/me"))
        .expect("url should match");
    assert_eq!(*hit.payload, "literal");

    let hit = matcher
        .match_url(&url("https://example.com/users/7"))
        .expect("url should match");
    assert_eq!(*hit.payload, "variable");
    assert_eq!(hit.params.get("id").map(String::as_str), Some("7"));
}

#[test]
fn match_all_ranks_by_specificity() {
    let mut matcher = TrieMatcher::new();
    matcher.add_source("/users/:id", "variable").expect("add");
    matcher.add_source("/users/me", "literal").expect("add");
    matcher.add_source("/users(/:id)", "optional").expect("add");

    let results: Vec<&str> = matcher
        .match_all(&url("https://example.com/users/me"))
        .into_iter()
        .map(|hit| *hit.payload)
        .collect();
    assert_eq!(results, vec!["literal", "variable", "optional"]);
}

#[test]
fn optional_branch_skips_and_takes() {
    let mut matcher = TrieMatcher::new();
    matcher.add_source("/docs(/:section)(/:page)", "docs").expect("add");

    assert!(matcher.test(&url("https://example.com/docs")));
    let hit = matcher
        .match_url(&url("https://example.com/docs/api/intro"))
        .expect("url should match");
    assert_eq!(hit.params.get("section").map(String::as_str), Some("api"));
    assert_eq!(hit.params.get("page").map(String::as_str), Some("intro"));
    assert!(!matcher.test(&url("https://example.com/docs/a/b/c")));
}

#[test]
fn wildcard_captures_remaining_segments() {
    let mut matcher = TrieMatcher::new();
    matcher.add_source("/files/*rest", "files").expect("add");

    let hit = matcher
        .match_url(&url("https://example.com/files/a/b/c"))
        .expect("url should match");
    assert_eq!(hit.params.get("rest").map(String::as_str), Some("a/b/c"));
    assert!(!matcher.test(&url("https://example.com/files")));
}

#[test]
fn leading_wildcard_accepts_the_bare_root() {
    let mut matcher = TrieMatcher::new();
    matcher.add_source("/*rest", "catchall").expect("add");

    let hit = matcher
        .match_url(&url("https://example.com/"))
        .expect("url should match");
    assert_eq!(hit.params.get("rest").map(String::as_str), Some(""));

    let hit = matcher
        .match_url(&url("https://example.com/a/b"))
        .expect("url should match");
    assert_eq!(hit.params.get("rest").map(String::as_str), Some("a/b"));
}

#[test]
fn shape_segment_mixes_text_and_variable() {
    let mut matcher = TrieMatcher::new();
    matcher.add_source("/orders/invoice-:id", "invoice").expect("add");

    let hit = matcher
        .match_url(&url("https://example.com/orders/invoice-2024"))
        .expect("url should match");
    assert_eq!(hit.params.get("id").map(String::as_str), Some("2024"));
    assert!(!matcher.test(&url("https://example.com/orders/invoice-")));
}

#[test]
fn shape_wildcard_spans_only_when_it_closes_the_pathname() {
    let mut matcher = TrieMatcher::new();
    matcher.add_source("/a*/c", "mid").expect("add");
    matcher.add_source("/logs/app-*rest", "tail").expect("add");

    assert!(matcher.test(&url("https://example.com/ax/c")));
    assert!(!matcher.test(&url("https://example.com/ax/y/c")));

    let hit = matcher
        .match_url(&url("https://example.com/logs/app-7/errors/today"))
        .expect("url should match");
    assert_eq!(*hit.payload, "tail");
    assert_eq!(
        hit.params.get("rest").map(String::as_str),
        Some("7/errors/today")
    );
}

#[test]
fn origin_patterns_dispatch_on_protocol_host_and_port() {
    let mut matcher = TrieMatcher::new();
    matcher
        .add_source("http://example.com:8080/health", "pinned")
        .expect("add");
    matcher
        .add_source("://api.example.com/status", "api")
        .expect("add");
    matcher
        .add_source(":scheme://example.com/app", "scheme")
        .expect("add");

    assert!(matcher.test(&url("http://example.com:8080/health")));
    assert!(!matcher.test(&url("https://example.com:8080/health")));
    assert!(!matcher.test(&url("http://example.com/health")));

    assert!(matcher.test(&url("wss://api.example.com/status")));

    let hit = matcher
        .match_url(&url("https://example.com/app"))
        .expect("url should match");
    assert_eq!(hit.params.get("scheme").map(String::as_str), Some("https"));
}

#[test]
fn rejects_optionals_nested_beyond_the_cap() {
    let mut matcher: TrieMatcher<&str> = TrieMatcher::new();
    let source = "/a((((((b))))))";
    let err = matcher.add_source(source, "deep").expect_err("depth overflow");
    match err {
        TrieError::OptionalDepthExceeded { depth, max, .. } => {
            assert_eq!(depth, 6);
            assert_eq!(max, 5);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matcher.is_empty());
}

#[test]
fn re_adding_a_source_does_not_duplicate_candidates() {
    let mut matcher = TrieMatcher::new();
    matcher.add_source("/users/:id", "first").expect("add");
    matcher.add_source("/users/:id", "second").expect("add");

    assert_eq!(matcher.len(), 1);
    let results = matcher.match_all(&url("https://example.com/users/7"));
    assert_eq!(results.len(), 1);
    assert_eq!(*results[0].payload, "second");
}

#[test]
fn tiny_state_budget_degrades_to_partial_results() {
    let options = TrieOptions {
        max_traversal_states: 5,
        ..TrieOptions::default()
    };
    let mut matcher = TrieMatcher::with_options(options).expect("options should validate");
    matcher.add_source("/*a", "w1").expect("add");
    matcher.add_source("/:x/*b", "w2").expect("add");
    matcher.add_source("/:x/:y/:z", "vars").expect("add");
    matcher.add_source("/p/q/r", "static").expect("add");

    // Must terminate within the budget; whatever it found is acceptable.
    let results = matcher.match_all(&url("https://example.com/p/q/r"));
    assert!(results.len() <= matcher.len());
}

#[test]
fn zero_budget_options_are_rejected() {
    let options = TrieOptions {
        max_traversal_states: 0,
        ..TrieOptions::default()
    };
    match TrieMatcher::<()>::with_options(options) {
        Err(trellis_router::TrieOptionsError::ZeroTraversalStates) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn agrees_with_linear_matcher_on_match_sets() {
    let sources = [
        ("/users/me", "users-me"),
        ("/users/:id", "users-id"),
        ("/users(/:id)", "users-opt"),
        ("/files/*rest", "files"),
        ("/search?debug", "search"),
        ("/a/:b/c", "abc"),
        ("://api.example.com/status", "api-status"),
        (":scheme://example.com/app", "app"),
        ("http://example.com:8080/health", "health"),
        ("/*all", "catchall"),
        ("/a*/c", "shape-mid"),
        ("/logs/app-*rest", "shape-tail"),
    ];
    let urls = [
        "https://example.com/",
        "https://example.com/users/me",
        "https://example.com/users/42",
        "https://example.com/users",
        "https://example.com/files/a/b",
        "https://example.com/files",
        "https://example.com/search?debug",
        "https://example.com/search",
        "https://other.org/a/x/c",
        "https://api.example.com/status",
        "https://example.com/app",
        "http://example.com:8080/health",
        "https://example.com:8080/health",
        "https://example.com/ax/c",
        "https://example.com/ax/y/c",
        "https://example.com/logs/app-1/2",
    ];

    let mut linear = LinearMatcher::new();
    let mut trie = TrieMatcher::new();
    for (source, payload) in sources {
        linear.add_source(source, payload).expect("linear add");
        trie.add_source(source, payload).expect("trie add");
    }

    for input in urls {
        let target = url(input);
        let linear_set: BTreeSet<&str> = linear.match_all(&target).map(|hit| *hit.payload).collect();
        let trie_set: BTreeSet<&str> = trie
            .match_all(&target)
            .into_iter()
            .map(|hit| *hit.payload)
            .collect();
        assert_eq!(linear_set, trie_set, "mismatch for {input}");
    }
}
