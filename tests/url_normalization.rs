use trellis_router::{RequestUrl, UrlError};

#[test]
fn lowercases_scheme_and_host() {
    let url = RequestUrl::parse("HTTPS://Example.COM/Path").expect("url should parse");
    assert_eq!(url.protocol(), "https");
    assert_eq!(url.hostname(), "example.com");
    assert_eq!(url.pathname(), "/Path");
}

#[test]
fn strips_default_ports_and_keeps_explicit_ones() {
    let url = RequestUrl::parse("https://example.com:443/a").expect("url should parse");
    assert_eq!(url.port(), None);
    let url = RequestUrl::parse("http://example.com:80/a").expect("url should parse");
    assert_eq!(url.port(), None);
    let url = RequestUrl::parse("http://example.com:8080/a").expect("url should parse");
    assert_eq!(url.port(), Some("8080"));
}

#[test]
fn defaults_pathname_and_splits_search() {
    let url = RequestUrl::parse("https://example.com").expect("url should parse");
    assert_eq!(url.pathname(), "/");
    assert_eq!(url.pathname_rest(), "");
    assert_eq!(url.search(), "");

    let url = RequestUrl::parse("https://example.com/a/b?x=1&y").expect("url should parse");
    assert_eq!(url.pathname_rest(), "a/b");
    assert_eq!(url.search(), "x=1&y");
}

#[test]
fn drops_fragment_and_userinfo() {
    let url = RequestUrl::parse("https://user:pw@example.com/a#section").expect("url should parse");
    assert_eq!(url.hostname(), "example.com");
    assert_eq!(url.pathname(), "/a");

    let url = RequestUrl::parse("https://example.com/a?q=1#x").expect("url should parse");
    assert_eq!(url.search(), "q=1");
}

#[test]
fn rejects_relative_input() {
    match RequestUrl::parse("example.com/a") {
        Err(UrlError::MissingScheme { .. }) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn display_round_trips_components() {
    let url = RequestUrl::parse("http://example.com:8080/a/b?x=1").expect("url should parse");
    assert_eq!(url.to_string(), "http://example.com:8080/a/b?x=1");
}
