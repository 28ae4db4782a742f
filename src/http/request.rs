use std::fmt;

/// A single `Name: Value` pair, stored verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The `HTTP/<major>.<minor>` token of a request line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpVersion {
    pub major: u32,
    pub minor: u32,
}

impl HttpVersion {
    pub const HTTP_10: HttpVersion = HttpVersion { major: 1, minor: 0 };
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

/// Represents a request as filled in by the parser.
///
/// Every field starts empty and grows as bytes are consumed. Once the parser
/// reports `Complete` or `Invalid` nothing touches it again until it is
/// cleared for reuse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// The request method exactly as sent (e.g. "GET")
    pub method: String,
    /// The raw request target, not percent-decoded
    pub uri: String,
    pub version: HttpVersion,
    /// Headers in arrival order; duplicates are kept
    pub headers: Vec<Header>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves the first header value with the given name.
    ///
    /// Names are compared ASCII case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Iterates over every value sent under `name`, in arrival order.
    pub fn headers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Returns the request to its empty state, keeping allocations.
    pub fn clear(&mut self) {
        self.method.clear();
        self.uri.clear();
        self.version = HttpVersion::default();
        self.headers.clear();
    }
}

/// Builder for constructing Request objects without going through the parser.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<String>,
    uri: Option<String>,
    version: Option<HttpVersion>,
    headers: Vec<Header>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn version(mut self, major: u32, minor: u32) -> Self {
        self.version = Some(HttpVersion { major, minor });
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            uri: self.uri.ok_or("uri missing")?,
            version: self.version.unwrap_or(HttpVersion::HTTP_10),
            headers: self.headers,
        })
    }
}
