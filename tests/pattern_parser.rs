use trellis_router::pattern::{ParseError, Token, parse};

#[test]
fn parses_literal_and_variable_pathname() {
    let parsed = parse("/users/:id").expect("pattern should parse");
    let pathname = parsed.pathname.expect("pathname should be present");
    assert_eq!(
        pathname,
        vec![
            Token::Text("users".to_string()),
            Token::Separator,
            Token::Variable("id".to_string()),
        ]
    );
    assert!(parsed.protocol.is_none());
    assert!(parsed.hostname.is_none());
    assert!(parsed.search.is_none());
}

#[test]
fn parses_full_origin_pattern() {
    let parsed = parse("http://api.example.com:8080/status?verbose").expect("pattern should parse");
    assert_eq!(
        parsed.protocol.expect("protocol"),
        vec![Token::Text("http".to_string())]
    );
    assert_eq!(
        parsed.hostname.expect("hostname"),
        vec![
            Token::Text("api".to_string()),
            Token::Separator,
            Token::Text("example".to_string()),
            Token::Separator,
            Token::Text("com".to_string()),
        ]
    );
    assert_eq!(parsed.port.as_deref(), Some("8080"));
    assert_eq!(
        parsed.pathname.expect("pathname"),
        vec![Token::Text("status".to_string())]
    );
    assert_eq!(parsed.search.as_deref(), Some("verbose"));
    let constraints = parsed.search_constraints.expect("constraints");
    let verbose = constraints.get("verbose").expect("verbose constraint");
    assert!(verbose.allow_bare);
    assert!(!verbose.require_assignment);
}

#[test]
fn parses_nested_optionals_and_wildcards() {
    let parsed = parse("/docs(/:section(/:page))/*rest").expect("pattern should parse");
    let pathname = parsed.pathname.expect("pathname");
    assert_eq!(pathname.len(), 4);
    match &pathname[1] {
        Token::Optional(inner) => match &inner[2] {
            Token::Optional(nested) => {
                assert_eq!(nested[1], Token::Variable("page".to_string()));
            }
            other => panic!("expected nested optional, got {other:?}"),
        },
        other => panic!("expected optional, got {other:?}"),
    }
    assert_eq!(pathname[3], Token::Wildcard(Some("rest".to_string())));
}

#[test]
fn escape_produces_literal_text() {
    let parsed = parse("/a\\:b\\*c").expect("pattern should parse");
    assert_eq!(
        parsed.pathname.expect("pathname"),
        vec![Token::Text("a:b*c".to_string())]
    );
}

#[test]
fn anonymous_wildcard_has_no_name() {
    let parsed = parse("/files/*").expect("pattern should parse");
    let pathname = parsed.pathname.expect("pathname");
    assert_eq!(pathname[2], Token::Wildcard(None));
}

#[test]
fn rejects_missing_variable_name() {
    let err = parse("/users/:").expect_err("bare colon should be rejected");
    match err {
        ParseError::MissingVariableName { position, .. } => assert_eq!(position, 8),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_unmatched_close_paren() {
    let err = parse("/a)b").expect_err("stray close paren should be rejected");
    match err {
        ParseError::UnmatchedCloseParen { position, .. } => assert_eq!(position, 2),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_unmatched_open_paren() {
    let err = parse("/(a").expect_err("unclosed paren should be rejected");
    match err {
        ParseError::UnmatchedOpenParen { position, .. } => assert_eq!(position, 1),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_dangling_escape() {
    let err = parse("/a\\").expect_err("trailing backslash should be rejected");
    match err {
        ParseError::DanglingEscape { position, .. } => assert_eq!(position, 2),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn repeated_search_keys_accumulate_values() {
    let parsed = parse("/s?tag=a&tag=b&flag").expect("pattern should parse");
    let constraints = parsed.search_constraints.expect("constraints");
    let tag = constraints.get("tag").expect("tag constraint");
    assert!(tag.require_assignment);
    let values = tag.required_values.as_ref().expect("values");
    assert!(values.contains("a") && values.contains("b"));
    assert!(constraints.get("flag").expect("flag").allow_bare);
}
