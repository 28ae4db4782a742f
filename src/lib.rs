//! Quill - a minimal HTTP/1.0 static file server
//!
//! Core library: the incremental request parser, the per-connection
//! lifecycle, and the accept loop that ties them to a handler.

pub mod config;
pub mod handler;
pub mod http;
pub mod server;
