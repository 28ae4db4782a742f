//! HTTP/1.0 protocol implementation.
//!
//! Every connection carries exactly one request and one response; the
//! stream is shut down as soon as the response is written.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection lifecycle state machine
//! - **`parser`**: Incremental, byte-at-a-time request parser
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │    Idle     │
//!        └──────┬──────┘
//!               │ start()
//!               ▼
//!        ┌─────────────┐
//!        │   Reading   │ ◄─┐ Indeterminate: read again
//!        └──────┬──────┴───┘
//!               │ Complete            Invalid ──────────┐
//!               ▼                                        │
//!        ┌──────────────────┐                            │
//!        │   Dispatching    │ ← Handler builds response  │
//!        └──────┬───────────┘                            │
//!               │                                        │
//!               ▼                                        │
//!        ┌──────────────────┐                            │
//!        │    Writing       │ ◄── canned 400 ────────────┘
//!        └──────┬───────────┘
//!               │ Response sent, stream shut down
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │ ← also reached on EOF or any I/O error
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use quill::handler::StaticFileHandler;
//! use quill::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let handler = Arc::new(StaticFileHandler::new("./public"));
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         Connection::new(socket, handler.clone()).start();
//!     }
//! }
//! ```

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
