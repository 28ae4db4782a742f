use quill::http::request::{Header, HttpVersion, Request, RequestBuilder};

#[test]
fn test_request_starts_empty() {
    let req = Request::new();

    assert!(req.method.is_empty());
    assert!(req.uri.is_empty());
    assert_eq!(req.version, HttpVersion { major: 0, minor: 0 });
    assert!(req.headers.is_empty());
}

#[test]
fn test_builder_defaults_to_http_10() {
    let req = RequestBuilder::new()
        .method("GET")
        .uri("/")
        .build()
        .unwrap();

    assert_eq!(req.version, HttpVersion::HTTP_10);
    assert_eq!(req.version.to_string(), "HTTP/1.0");
}

#[test]
fn test_builder_requires_method_and_uri() {
    assert_eq!(RequestBuilder::new().uri("/").build(), Err("method missing"));
    assert_eq!(RequestBuilder::new().method("GET").build(), Err("uri missing"));
}

#[test]
fn test_builder_keeps_header_order_and_duplicates() {
    let req = RequestBuilder::new()
        .method("GET")
        .uri("/")
        .version(1, 0)
        .header("Accept", "text/html")
        .header("Cookie", "a=1")
        .header("Cookie", "b=2")
        .build()
        .unwrap();

    assert_eq!(
        req.headers,
        vec![
            Header::new("Accept", "text/html"),
            Header::new("Cookie", "a=1"),
            Header::new("Cookie", "b=2"),
        ]
    );
}

#[test]
fn test_header_lookup_is_case_insensitive() {
    let req = RequestBuilder::new()
        .method("GET")
        .uri("/")
        .header("Content-Type", "text/plain")
        .build()
        .unwrap();

    assert_eq!(req.header("content-type"), Some("text/plain"));
    assert_eq!(req.header("CONTENT-TYPE"), Some("text/plain"));
    assert_eq!(req.header("Host"), None);
}

#[test]
fn test_header_value_outlives_lookup_name() {
    let req = RequestBuilder::new()
        .method("GET")
        .uri("/")
        .header("Host", "example.com")
        .build()
        .unwrap();

    let host = {
        let name = String::from("host");
        req.header(&name)
    };

    assert_eq!(host, Some("example.com"));
}

#[test]
fn test_header_returns_first_match() {
    let req = RequestBuilder::new()
        .method("GET")
        .uri("/")
        .header("X-Tag", "first")
        .header("x-tag", "second")
        .build()
        .unwrap();

    assert_eq!(req.header("X-Tag"), Some("first"));
    assert_eq!(req.headers_named("X-TAG").count(), 2);
}

#[test]
fn test_clear_resets_every_field() {
    let mut req = RequestBuilder::new()
        .method("POST")
        .uri("/submit")
        .version(1, 1)
        .header("Host", "example.com")
        .build()
        .unwrap();

    req.clear();

    assert_eq!(req, Request::new());
}
