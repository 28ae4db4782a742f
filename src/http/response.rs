use bytes::Bytes;

use crate::http::request::Header;

/// HTTP status codes the server can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 Ok
    Ok,
    /// 201 Created
    Created,
    /// 202 Accepted
    Accepted,
    /// 204 No Content
    NoContent,
    /// 300 Multiple Choices
    MultipleChoices,
    /// 301 Moved Permanently
    MovedPermanently,
    /// 302 Moved Temporarily
    MovedTemporarily,
    /// 304 Not Modified
    NotModified,
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
    /// 502 Bad Gateway
    BadGateway,
    /// 503 Service Unavailable
    ServiceUnavailable,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use quill::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::Accepted => 202,
            StatusCode::NoContent => 204,
            StatusCode::MultipleChoices => 300,
            StatusCode::MovedPermanently => 301,
            StatusCode::MovedTemporarily => 302,
            StatusCode::NotModified => 304,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
            StatusCode::BadGateway => 502,
            StatusCode::ServiceUnavailable => 503,
        }
    }

    /// Returns the reason phrase written after the code in the status line.
    ///
    /// # Example
    ///
    /// ```
    /// # use quill::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "Ok");
    /// assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "Ok",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NoContent => "No Content",
            StatusCode::MultipleChoices => "Multiple Choices",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::MovedTemporarily => "Moved Temporarily",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::BadGateway => "Bad Gateway",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// The full `HTTP/1.0 <code> <reason>\r\n` line.
    pub fn status_line(&self) -> String {
        format!("HTTP/1.0 {} {}\r\n", self.as_u16(), self.reason_phrase())
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// Responses that leave [`ResponseBuilder::build`] always carry
/// `Content-Length` and `Content-Type`.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Headers in the order they are written
    pub headers: Vec<Header>,
    /// Response body as bytes
    pub body: Bytes,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use quill::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "application/json")
///     .body("{}")
///     .build();
/// assert_eq!(response.header("Content-Length"), Some("2"));
/// ```
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<Header>,
    body: Bytes,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Appends a header. Existing headers with the same name are kept.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the final Response.
    ///
    /// Adds `Content-Length` from the body size and a `text/plain`
    /// `Content-Type` when the caller did not set them.
    pub fn build(mut self) -> Response {
        if !has_header(&self.headers, "Content-Length") {
            self.headers
                .push(Header::new("Content-Length", self.body.len().to_string()));
        }
        if !has_header(&self.headers, "Content-Type") {
            self.headers.push(Header::new("Content-Type", "text/plain"));
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

fn has_header(headers: &[Header], name: &str) -> bool {
    headers.iter().any(|h| h.name.eq_ignore_ascii_case(name))
}

impl Response {
    /// Creates a 200 Ok response with the given body and content type.
    pub fn ok(body: impl Into<Bytes>, content_type: &str) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .body(body)
            .header("Content-Type", content_type)
            .build()
    }

    /// The canned page used when no handler-specific body exists.
    ///
    /// The body is a tiny HTML document naming the status, e.g.
    /// `<h1>400 Bad Request</h1>`.
    pub fn from_status(status: StatusCode) -> Self {
        let reason = status.reason_phrase();
        let body = format!(
            "<html><head><title>{reason}</title></head><body><h1>{} {reason}</h1></body></html>",
            status.as_u16()
        );

        ResponseBuilder::new(status)
            .header("Content-Length", body.len().to_string())
            .header("Content-Type", "text/html")
            .body(body)
            .build()
    }

    pub fn bad_request() -> Self {
        Self::from_status(StatusCode::BadRequest)
    }

    pub fn internal_error() -> Self {
        Self::from_status(StatusCode::InternalServerError)
    }

    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}
