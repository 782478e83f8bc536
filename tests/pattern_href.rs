use trellis_router::{Params, RoutePattern};

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn renders_variables_from_params() {
    let pattern = RoutePattern::new("/users/:id/posts/:post").expect("pattern should parse");
    let href = pattern
        .href(&params(&[("id", "7"), ("post", "42")]))
        .expect("href should build");
    assert_eq!(href, "/users/7/posts/42");
}

#[test]
fn omits_optional_group_when_param_is_missing() {
    let pattern = RoutePattern::new("/users(/:id)").expect("pattern should parse");
    assert_eq!(pattern.href(&params(&[])).expect("href"), "/users");
    assert_eq!(
        pattern.href(&params(&[("id", "7")])).expect("href"),
        "/users/7"
    );
}

#[test]
fn missing_required_param_is_an_error() {
    let pattern = RoutePattern::new("/users/:id").expect("pattern should parse");
    let err = pattern
        .href(&params(&[]))
        .expect_err("missing param should fail");
    assert_eq!(err.name, "id");
}

#[test]
fn fills_default_protocol_for_origin_patterns() {
    let pattern = RoutePattern::new("://example.com/docs").expect("pattern should parse");
    assert_eq!(
        pattern.href(&params(&[])).expect("href"),
        "https://example.com/docs"
    );
}

#[test]
fn keeps_explicit_protocol_and_port() {
    let pattern = RoutePattern::new("http://example.com:8080/docs").expect("pattern should parse");
    assert_eq!(
        pattern.href(&params(&[])).expect("href"),
        "http://example.com:8080/docs"
    );
}

#[test]
fn named_wildcard_resolves_from_params() {
    let pattern = RoutePattern::new("/files/*rest").expect("pattern should parse");
    assert_eq!(
        pattern.href(&params(&[("rest", "a/b/c")])).expect("href"),
        "/files/a/b/c"
    );
}

#[test]
fn explicit_search_params_override_pattern_search() {
    let pattern = RoutePattern::new("/search?debug").expect("pattern should parse");
    assert_eq!(pattern.href(&params(&[])).expect("href"), "/search?debug");
    let href = pattern
        .href_with_search(&params(&[]), &[("q", "rust lang")])
        .expect("href");
    assert_eq!(href, "/search?q=rust+lang");
}
