//! Request handlers.
//!
//! A connection hands every completely parsed request to a [`Handler`] and
//! writes back whatever it returns. Handlers never fail: problems are
//! expressed as error responses.

pub mod decode;
pub mod static_files;

pub use static_files::StaticFileHandler;

use crate::http::request::Request;
use crate::http::response::Response;

/// Turns a parsed request into a response.
///
/// Called synchronously on the connection's task, so an implementation that
/// blocks stalls that connection. The request is only borrowed for the call.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, request: &Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Response + Send + Sync + 'static,
{
    fn handle(&self, request: &Request) -> Response {
        self(request)
    }
}
