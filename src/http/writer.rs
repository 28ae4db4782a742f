use std::collections::VecDeque;
use std::io::IoSlice;

use anyhow::Context;
use bytes::{Buf, Bytes};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

const HEADER_SEPARATOR: &[u8] = b": ";
const CRLF: &[u8] = b"\r\n";

/// Splits a response into the byte ranges that go on the wire, in order:
/// status line, each header as `name`, `": "`, `value`, CRLF, the blank
/// line, then the body.
///
/// Header and body ranges share storage with the response where they can.
pub fn to_buffers(resp: &Response) -> Vec<Bytes> {
    let mut buffers = Vec::with_capacity(3 + resp.headers.len() * 4);

    buffers.push(Bytes::from(resp.status.status_line()));
    for header in &resp.headers {
        buffers.push(Bytes::copy_from_slice(header.name.as_bytes()));
        buffers.push(Bytes::from_static(HEADER_SEPARATOR));
        buffers.push(Bytes::copy_from_slice(header.value.as_bytes()));
        buffers.push(Bytes::from_static(CRLF));
    }
    buffers.push(Bytes::from_static(CRLF));
    buffers.push(resp.body.clone());

    buffers
}

/// Flattens [`to_buffers`] into one contiguous vector.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    to_buffers(resp).concat()
}

/// Upper bound on ranges handed to one gather write; well below any
/// platform `IOV_MAX`.
const MAX_WRITE_SLICES: usize = 64;

#[derive(Debug)]
pub struct ResponseWriter {
    buffers: VecDeque<Bytes>,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        let buffers = to_buffers(response)
            .into_iter()
            .filter(|buf| !buf.is_empty())
            .collect();

        Self { buffers }
    }

    /// Writes every range in order with gather writes, then flushes.
    ///
    /// Ranges are consumed as they go out, so a failed call leaves only the
    /// unsent tail behind.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while !self.buffers.is_empty() {
            let slices: Vec<IoSlice<'_>> = self
                .buffers
                .iter()
                .take(MAX_WRITE_SLICES)
                .map(|buf| IoSlice::new(buf.chunk()))
                .collect();

            let n = stream
                .write_vectored(&slices)
                .await
                .context("failed writing response")?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.consume(n);
        }

        stream.flush().await.context("failed flushing response")?;
        Ok(())
    }

    /// Drops `n` written bytes from the front of the queue.
    fn consume(&mut self, mut n: usize) {
        while n > 0 {
            let Some(front) = self.buffers.front_mut() else {
                return;
            };

            if n < front.len() {
                front.advance(n);
                return;
            }

            n -= front.len();
            self.buffers.pop_front();
        }
    }
}
