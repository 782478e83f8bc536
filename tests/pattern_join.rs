use trellis_router::RoutePattern;

#[test]
fn concatenates_pathnames_with_one_separator() {
    let base = RoutePattern::new("https://example.com/api").expect("base should parse");
    let joined = base.join_source("/users/:id").expect("join should parse");
    assert_eq!(joined.to_string(), "https://example.com/api/users/:id");
}

#[test]
fn trailing_and_leading_separators_collapse() {
    let base = RoutePattern::new("/api/").expect("base should parse");
    let joined = base.join_source("/users").expect("join should parse");
    assert_eq!(joined.to_string(), "/api/users");
}

#[test]
fn other_origin_replaces_base_origin_wholesale() {
    let base = RoutePattern::new("https://a.com:9000/x").expect("base should parse");
    let other = RoutePattern::new("http://b.org/y").expect("other should parse");
    let joined = base.join(&other);
    assert_eq!(joined.to_string(), "http://b.org/x/y");
}

#[test]
fn base_origin_survives_when_other_has_none() {
    let base = RoutePattern::new("https://a.com/x").expect("base should parse");
    let joined = base.join_source("/y").expect("join should parse");
    assert_eq!(joined.to_string(), "https://a.com/x/y");
}

#[test]
fn search_constraints_union_per_key() {
    let base = RoutePattern::new("/s?debug").expect("base should parse");
    let joined = base.join_source("?mode=fast").expect("join should parse");
    assert_eq!(joined.to_string(), "/s?debug&mode=fast");

    let url = "https://example.com/s?debug&mode=fast";
    assert!(joined.match_str(url).expect("url should parse").is_some());
    let missing_mode = "https://example.com/s?debug";
    assert!(
        joined
            .match_str(missing_mode)
            .expect("url should parse")
            .is_none()
    );
}

#[test]
fn bare_and_assigned_merge_with_or_semantics() {
    let base = RoutePattern::new("/s?flag").expect("base should parse");
    let joined = base.join_source("?flag=").expect("join should parse");
    // Either bare presence or an assignment now satisfies the key.
    assert!(
        joined
            .match_str("https://example.com/s?flag")
            .expect("url should parse")
            .is_some()
    );
    assert!(
        joined
            .match_str("https://example.com/s?flag=1")
            .expect("url should parse")
            .is_some()
    );
    assert!(
        joined
            .match_str("https://example.com/s")
            .expect("url should parse")
            .is_none()
    );
}

#[test]
fn joined_pattern_round_trips_through_its_source() {
    let base = RoutePattern::new("https://example.com/api").expect("base should parse");
    let joined = base.join_source("/users(/:id)").expect("join should parse");
    let reparsed = RoutePattern::new(joined.source()).expect("round trip should parse");
    let url = "https://example.com/api/users/7";
    let hit = reparsed
        .match_str(url)
        .expect("url should parse")
        .expect("url should match");
    assert_eq!(hit.params.get("id").map(String::as_str), Some("7"));
}

#[test]
fn stringify_keeps_literal_metacharacters_escaped() {
    let base = RoutePattern::new("/a\\*b\\(c\\)").expect("base should parse");
    let joined = base.join_source("/:x").expect("join should parse");
    assert_eq!(joined.to_string(), "/a\\*b\\(c\\)/:x");

    let reparsed = RoutePattern::new(joined.source()).expect("round trip should parse");
    assert_eq!(reparsed.parsed(), joined.parsed());
    let hit = reparsed
        .match_str("https://example.com/a*b(c)/7")
        .expect("url should parse")
        .expect("url should match");
    assert_eq!(hit.params.get("x").map(String::as_str), Some("7"));
}

#[test]
fn repeated_values_survive_a_join_round_trip() {
    let base = RoutePattern::new("/s?tag=a").expect("base should parse");
    let joined = base.join_source("?tag=b").expect("join should parse");
    assert_eq!(joined.to_string(), "/s?tag=a&tag=b");

    let reparsed = RoutePattern::new(joined.source()).expect("round trip should parse");
    assert!(
        reparsed
            .match_str("https://example.com/s?tag=b")
            .expect("url should parse")
            .is_some()
    );
    assert!(
        reparsed
            .match_str("https://example.com/s?tag=c")
            .expect("url should parse")
            .is_none()
    );
}
