use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

use crate::handler::Handler;
use crate::http::parser::{ParseResult, RequestParser};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// Size of the read buffer. It is reused for every read; only the parser
/// state and the request survive between reads.
pub const BUFFER_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Reading,
    Dispatching,
    Writing,
    Closed,
}

/// One accepted stream and everything needed to answer its single request.
///
/// A connection is driven by exactly one task, so its steps never overlap:
/// there is at most one read or one write in flight, and read, parse,
/// handle, write and close happen strictly in that order.
pub struct Connection<S> {
    stream: S,
    buffer: [u8; BUFFER_SIZE],
    request: Request,
    parser: RequestParser,
    response: Option<Response>,
    handler: Arc<dyn Handler>,
    state: ConnectionState,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, handler: Arc<dyn Handler>) -> Self {
        Self {
            stream,
            buffer: [0; BUFFER_SIZE],
            request: Request::new(),
            parser: RequestParser::new(),
            response: None,
            handler,
            state: ConnectionState::Idle,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn into_stream(self) -> S {
        self.stream
    }

    /// Spawns the connection onto the current runtime and returns at once.
    ///
    /// The task owns the connection until it reaches `Closed`; the stream is
    /// dropped with it. Transport errors are logged, never propagated.
    pub fn start(mut self) -> JoinHandle<()>
    where
        S: Send + 'static,
    {
        self.state = ConnectionState::Reading;

        let task = async move {
            if let Err(e) = self.run().await {
                warn!(error = %e, "Connection dropped");
            }
        };
        tokio::spawn(task.in_current_span())
    }

    /// Drives the connection until it is closed.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let step = match self.state {
                ConnectionState::Idle => {
                    self.state = ConnectionState::Reading;
                    Ok(())
                }
                ConnectionState::Reading => self.read_request().await,
                ConnectionState::Dispatching => {
                    self.dispatch();
                    Ok(())
                }
                ConnectionState::Writing => self.write_response().await,
                ConnectionState::Closed => return Ok(()),
            };

            if let Err(e) = step {
                self.state = ConnectionState::Closed;
                return Err(e);
            }
        }
    }

    async fn read_request(&mut self) -> anyhow::Result<()> {
        let n = self
            .stream
            .read(&mut self.buffer)
            .await
            .context("failed reading request")?;

        if n == 0 {
            debug!("Peer closed before sending a complete request");
            self.state = ConnectionState::Closed;
            return Ok(());
        }

        match self.parser.parse(&mut self.request, &self.buffer[..n]) {
            ParseResult::Complete => {
                self.state = ConnectionState::Dispatching;
            }
            ParseResult::Invalid => {
                warn!(method = %self.request.method, uri = %self.request.uri, "Malformed request");
                self.response = Some(Response::bad_request());
                self.parser.reset();
                self.state = ConnectionState::Writing;
            }
            ParseResult::Indeterminate => {
                debug!(bytes = n, "Partial request, reading more");
            }
        }

        Ok(())
    }

    fn dispatch(&mut self) {
        let response = self.handler.handle(&self.request);

        info!(
            method = %self.request.method,
            uri = %self.request.uri,
            version = %self.request.version,
            status = response.status.as_u16(),
            "Request handled"
        );

        self.response = Some(response);
        self.parser.reset();
        self.state = ConnectionState::Writing;
    }

    async fn write_response(&mut self) -> anyhow::Result<()> {
        let Some(response) = self.response.take() else {
            self.state = ConnectionState::Closed;
            return Ok(());
        };

        let mut writer = ResponseWriter::new(&response);
        writer.write_to_stream(&mut self.stream).await?;

        // The read half goes away when the stream is dropped with the connection.
        if let Err(e) = self.stream.shutdown().await {
            debug!(error = %e, "Shutdown after response failed");
        }

        self.state = ConnectionState::Closed;
        Ok(())
    }
}
