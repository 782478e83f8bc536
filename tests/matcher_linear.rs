use trellis_router::{LinearMatcher, RequestUrl};

fn url(input: &str) -> RequestUrl {
    RequestUrl::parse(input).expect("url should parse")
}

#[test]
fn first_registered_match_wins() {
    let mut matcher = LinearMatcher::new();
    matcher
        .add_source("/users/:id", "variable")
        .expect("pattern should parse");
    matcher
        .add_source("/users/me", "literal")
        .expect("pattern should parse");

    let results: Vec<&str> = matcher
        .match_all(&url("https://example.com/users/me"))
        .map(|hit| *hit.payload)
        .collect();
    assert_eq!(results, vec!["variable", "literal"]);

    let best = matcher
        .match_url(&url("https://example.com/users/me"))
        .expect("url should match");
    assert_eq!(*best.payload, "variable");
}

#[test]
fn ordering_is_caller_controlled() {
    let mut matcher = LinearMatcher::new();
    matcher.add_source("/users/me", "literal").expect("pattern");
    matcher
        .add_source("/users/:id", "variable")
        .expect("pattern");

    let best = matcher
        .match_url(&url("https://example.com/users/me"))
        .expect("url should match");
    assert_eq!(*best.payload, "literal");

    let best = matcher
        .match_url(&url("https://example.com/users/7"))
        .expect("url should match");
    assert_eq!(*best.payload, "variable");
    assert_eq!(best.params.get("id").map(String::as_str), Some("7"));
}

#[test]
fn re_adding_a_source_replaces_the_payload() {
    let mut matcher = LinearMatcher::new();
    matcher.add_source("/users/:id", "first").expect("pattern");
    matcher.add_source("/users/:id", "second").expect("pattern");

    assert_eq!(matcher.len(), 1);
    let results: Vec<&str> = matcher
        .match_all(&url("https://example.com/users/7"))
        .map(|hit| *hit.payload)
        .collect();
    assert_eq!(results, vec!["second"]);
}

#[test]
fn match_all_is_lazy_and_skips_non_matches() {
    let mut matcher = LinearMatcher::new();
    matcher.add_source("/a/b", "lit").expect("pattern");
    matcher.add_source("/c", "miss").expect("pattern");
    matcher.add_source("/a/:x", "var").expect("pattern");

    let target = url("https://example.com/a/b");
    let mut iter = matcher.match_all(&target);
    let first = iter.next().expect("first match");
    assert_eq!(*first.payload, "lit");
    let second = iter.next().expect("second match");
    assert_eq!(*second.payload, "var");
    assert_eq!(second.params.get("x").map(String::as_str), Some("b"));
    assert!(iter.next().is_none());
}

#[test]
fn no_match_returns_none() {
    let mut matcher = LinearMatcher::new();
    matcher.add_source("/only", "payload").expect("pattern");
    assert!(matcher.match_url(&url("https://example.com/other")).is_none());
    assert!(!matcher.test(&url("https://example.com/other")));
}
