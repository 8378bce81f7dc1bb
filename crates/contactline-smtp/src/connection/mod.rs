//! Relay connection: line-oriented reads, raw writes and a single close.

mod stream;

pub use stream::{Connector, PlainConnector, TlsConnector};

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};

use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::session::Stage;
use crate::types::Reply;

/// Upper bound on lines in one reply, blank lines included; a relay
/// streaming endless lines is treated as broken.
const MAX_REPLY_LINES: usize = 128;

/// Upper bound on one reply line in bytes, terminator included.
const MAX_LINE_BYTES: usize = 4096;

/// An open connection to the relay.
///
/// [`Connection::close`] takes `self`, so a connection is shut down at most
/// once; dropping it without closing still releases the socket.
#[derive(Debug)]
pub struct Connection<S> {
    stream: BufReader<S>,
    timeout: Option<Duration>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a freshly opened stream.
    pub fn new(stream: S, timeout: Option<Duration>) -> Self {
        Self {
            stream: BufReader::new(stream),
            timeout,
        }
    }

    /// Writes raw bytes and flushes them.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the write fails or times out.
    pub async fn send(&mut self, stage: Stage, data: &[u8]) -> Result<()> {
        let timeout = self.timeout;
        let writer = self.stream.get_mut();
        bounded(timeout, stage, async {
            writer.write_all(data).await?;
            writer.flush().await
        })
        .await
    }

    /// Reads one complete (possibly multi-line) reply.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the stream fails, ends, or times out, and
    /// a protocol error if the relay sends something that is not a reply.
    pub async fn read_reply(&mut self, stage: Stage) -> Result<Reply> {
        let timeout = self.timeout;
        let reader = &mut self.stream;
        let lines = bounded(timeout, stage, async {
            let mut lines = Vec::new();
            for _ in 0..MAX_REPLY_LINES {
                let line = read_line(reader).await?;
                if line.is_empty() {
                    continue;
                }

                let is_last = is_last_reply_line(&line);
                lines.push(line);
                if is_last {
                    return Ok(lines);
                }
            }
            Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "reply exceeds line limit",
            ))
        })
        .await?;

        let reply = parse_reply(&lines).map_err(|e| Error::Protocol {
            stage,
            detail: e.to_string(),
        })?;
        tracing::debug!(%stage, %reply, "SMTP <");
        Ok(reply)
    }

    /// Shuts the stream down, within the timeout if one is set. Errors are
    /// logged and otherwise ignored: by the time a session closes, its outcome
    /// is already decided. The stream is dropped either way.
    pub async fn close(mut self) {
        let timeout = self.timeout;
        match bounded(timeout, Stage::Quit, self.stream.get_mut().shutdown()).await {
            Ok(()) => tracing::debug!("SMTP connection closed"),
            Err(e) => tracing::debug!(error = %e, "SMTP connection shutdown failed"),
        }
    }
}

/// Reads one line of at most [`MAX_LINE_BYTES`], without its line ending.
async fn read_line<R>(reader: &mut R) -> io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let limit = MAX_LINE_BYTES as u64;
    let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;

    if n == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed by relay",
        ));
    }
    if n == MAX_LINE_BYTES && !buf.ends_with(b"\n") {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "reply line exceeds length limit",
        ));
    }

    Ok(String::from_utf8_lossy(&buf).trim_end().to_string())
}

/// Runs an I/O future under the optional timeout, attributing failures to `stage`.
async fn bounded<T, F>(timeout: Option<Duration>, stage: Stage, fut: F) -> Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Error::Timeout(stage))?,
        None => fut.await,
    };
    outcome.map_err(|e| Error::transport(stage, e))
}
