//! Timeout transport: wraps a `tokio::net::TcpStream`, splitting it
//! into a reader half owned by the caller and a writer half owned by a
//! dedicated task so every write can be raced against a wall-clock
//! deadline without blocking the reader loop.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use rtmp_future_ext::FutureExt;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("write timed out")]
    WriteTimeout,
    #[error("connect timed out")]
    ConnectTimeout,
    #[error("transport is closed")]
    Closed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

struct WriteJob {
    bytes: Bytes,
    reply: oneshot::Sender<Result<(), TransportError>>,
}

/// The read half, owned directly by the reader task; reads are naturally
/// blocking (`.await`ed without an enclosing timeout, per 4.E), except
/// during the handshake which applies its own deadline.
pub struct TransportReader {
    inner: ReadHalf<TcpStream>,
}

impl TransportReader {
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        Ok(self.inner.read(buf).await?)
    }
}

/// The write half: a handle to the dedicated writer task's job queue.
#[derive(Clone)]
pub struct TransportWriter {
    jobs: mpsc::Sender<WriteJob>,
}

impl TransportWriter {
    /// Hands `bytes` to the writer task and awaits completion, racing the
    /// whole round trip against `write_timeout` (zero means a 60s safety
    /// cap).
    pub async fn write(&self, bytes: Bytes, write_timeout: Duration) -> Result<(), TransportError> {
        let deadline = if write_timeout.is_zero() { Duration::from_secs(60) } else { write_timeout };

        let (reply_tx, reply_rx) = oneshot::channel();
        self.jobs
            .send(WriteJob { bytes, reply: reply_tx })
            .await
            .map_err(|_| TransportError::Closed)?;

        match reply_rx.with_timeout(deadline).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(TransportError::Closed),
            Err(_) => Err(TransportError::WriteTimeout),
        }
    }
}

/// Owns the writer task's lifetime; dropping it (via [`Transport::close`])
/// stops the task and fails any in-flight write with `Closed`.
pub struct Transport {
    pub reader: TransportReader,
    pub writer: TransportWriter,
    writer_task: tokio::task::JoinHandle<()>,
}

impl Transport {
    pub async fn connect(addr: SocketAddr, connect_timeout: Duration) -> Result<Self, TransportError> {
        let stream = tokio::net::TcpStream::connect(addr)
            .with_timeout(connect_timeout)
            .await
            .map_err(|_| TransportError::ConnectTimeout)??;
        stream.set_nodelay(true).ok();

        Ok(Self::from_stream(stream))
    }

    /// Wraps an already-connected (and, typically, already-handshaken)
    /// stream. Exposed so callers that need to run the RTMP handshake
    /// directly against the raw socket before any framing begins can hand
    /// the stream back afterwards.
    pub fn from_stream(stream: TcpStream) -> Self {
        let (read_half, mut write_half): (ReadHalf<TcpStream>, WriteHalf<TcpStream>) = tokio::io::split(stream);
        let (jobs_tx, mut jobs_rx) = mpsc::channel::<WriteJob>(32);

        let writer_task = tokio::spawn(async move {
            while let Some(job) = jobs_rx.recv().await {
                let result = write_half.write_all(&job.bytes).await.map_err(TransportError::from);
                let _ = job.reply.send(result);
            }
        });

        Self {
            reader: TransportReader { inner: read_half },
            writer: TransportWriter { jobs: jobs_tx },
            writer_task,
        }
    }

    /// Cancels the writer task; any write job already enqueued but not yet
    /// replied to observes `Closed`.
    pub fn close(self) {
        self.writer_task.abort();
    }

    /// Splits the transport into its reader half (to be owned by the reader
    /// task), the writer handle, and the writer task's join handle (kept so
    /// the controller can abort it on teardown instead of leaking it).
    pub fn into_parts(self) -> (TransportReader, TransportWriter, tokio::task::JoinHandle<()>) {
        (self.reader, self.writer, self.writer_task)
    }
}
