//! Serves files from a document root.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::handler::Handler;
use crate::handler::decode::decode_url;
use crate::http::mime;
use crate::http::request::Request;
use crate::http::response::Response;

/// Maps request paths onto files below `root`.
#[derive(Debug, Clone)]
pub struct StaticFileHandler {
    root: PathBuf,
}

impl StaticFileHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Handler for StaticFileHandler {
    fn handle(&self, request: &Request) -> Response {
        let Some(mut path) = request_path(&request.uri) else {
            debug!(uri = %request.uri, "Rejected request path");
            return Response::bad_request();
        };

        if path.ends_with('/') {
            path.push_str("index.html");
        }

        let full_path = self.root.join(path.trim_start_matches('/'));
        match fs::metadata(&full_path) {
            Ok(meta) if meta.is_file() => {}
            _ => {
                debug!(path = %full_path.display(), "No such file");
                return Response::bad_request();
            }
        }

        serve_file(&full_path)
    }
}

/// Reads a file that is known to exist into a 200 response.
///
/// A read failure at this point is a server fault and becomes a 500.
pub fn serve_file(full_path: &Path) -> Response {
    match fs::read(full_path) {
        Ok(contents) => {
            let extension = full_path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
            Response::ok(contents, mime::from_extension(extension))
        }
        Err(e) => {
            warn!(path = %full_path.display(), error = %e, "Failed to read file");
            Response::internal_error()
        }
    }
}

/// Decodes and validates the path part of a request URI.
///
/// The query string is dropped. The result is absolute and never contains
/// `..`; anything else is `None`.
pub fn request_path(uri: &str) -> Option<String> {
    let raw = uri.split_once('?').map_or(uri, |(path, _)| path);
    let decoded = decode_url(raw)?;

    if decoded.is_empty() || !decoded.starts_with('/') || decoded.contains("..") {
        return None;
    }

    Some(decoded)
}
