//! A framed connection to one datapath.
//!
//! Wraps a duplex byte stream with a split reader/writer pair, read/write
//! deadlines, a buffered writer, and a single-shot hijack transition. Every
//! observation of the hijack bit goes through the same `RwLock`; once
//! hijacked, `receive`/`send`/`flush` all fail with [`Error::Hijacked`] and
//! the raw stream belongs to whoever called `hijack`.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter, ReadHalf, WriteHalf};
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::codec::{ReadFrom, WriteTo};
use crate::error::{Error, Result};
use crate::header::{Header, HEADER_LEN};
use crate::request::Request;

/// Any duplex byte stream a [`Connection`] can be built over: a plain
/// `TcpStream`, a TLS stream, or (in tests) an in-memory duplex pipe.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Cheaply-cloneable handle to a connection, threaded through requests so
/// a handler can send unsolicited messages back on the same socket.
pub type ConnHandle = Arc<Connection>;

type BoxedTransport = Box<dyn Transport>;

struct Halves {
    reader: ReadHalf<BoxedTransport>,
    writer: BufWriter<WriteHalf<BoxedTransport>>,
}

pub struct Connection {
    remote_addr: SocketAddr,
    halves: Mutex<Option<Halves>>,
    hijacked: RwLock<bool>,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl Connection {
    pub(crate) fn new(
        stream: BoxedTransport,
        remote_addr: SocketAddr,
        read_timeout: Option<Duration>,
        write_timeout: Option<Duration>,
    ) -> ConnHandle {
        let (reader, writer) = tokio::io::split(stream);
        Arc::new(Connection {
            remote_addr,
            halves: Mutex::new(Some(Halves {
                reader,
                writer: BufWriter::new(writer),
            })),
            hijacked: RwLock::new(false),
            read_timeout,
            write_timeout,
        })
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub async fn is_hijacked(&self) -> bool {
        *self.hijacked.read().await
    }

    pub fn set_deadlines(&mut self, read_timeout: Option<Duration>, write_timeout: Option<Duration>) {
        self.read_timeout = read_timeout;
        self.write_timeout = write_timeout;
    }

    /// Decode one request off the stream, applying the read deadline.
    pub async fn receive(self: &ConnHandle) -> Result<Request> {
        if *self.hijacked.read().await {
            return Err(Error::Hijacked);
        }
        let body = {
            let mut guard = self.halves.lock().await;
            let halves = guard.as_mut().ok_or(Error::Hijacked)?;

            let fut = async {
                let mut header_buf = [0u8; HEADER_LEN];
                halves.reader.read_exact(&mut header_buf).await?;
                let header = Header::read_from(&mut Cursor::new(&header_buf[..]))?;
                let body_len = (header.length as usize).saturating_sub(HEADER_LEN);
                let mut body = vec![0u8; body_len];
                if body_len > 0 {
                    halves.reader.read_exact(&mut body).await?;
                }
                Ok::<_, Error>((header, body))
            };

            match self.read_timeout {
                Some(d) => timeout(d, fut).await.map_err(|_| Error::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "read deadline exceeded",
                )))??,
                None => fut.await?,
            }
        };
        let (header, body) = body;
        trace!(transaction = header.transaction, kind = ?header.kind, len = body.len(), "received message");
        Ok(Request::received(header, body, self.remote_addr, self.clone_handle()))
    }

    /// Encode `request` onto the write buffer. Does not flush.
    pub async fn send(&self, request: &Request) -> Result<()> {
        let bytes = request.encode()?;
        self.write_raw(&bytes).await
    }

    /// Write an already-framed buffer atomically: used both by `send` and
    /// by the response writer, which serializes header + body into one
    /// local buffer before handing it here so concurrent handlers never
    /// interleave within a single frame.
    pub async fn write_raw(&self, bytes: &[u8]) -> Result<()> {
        if *self.hijacked.read().await {
            return Err(Error::Hijacked);
        }
        let mut guard = self.halves.lock().await;
        let halves = guard.as_mut().ok_or(Error::Hijacked)?;
        let fut = halves.writer.write_all(bytes);
        match self.write_timeout {
            Some(d) => timeout(d, fut).await.map_err(|_| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "write deadline exceeded",
                ))
            })??,
            None => fut.await?,
        };
        Ok(())
    }

    /// Push the write buffer to the underlying stream.
    pub async fn flush(&self) -> Result<()> {
        if *self.hijacked.read().await {
            return Err(Error::Hijacked);
        }
        let mut guard = self.halves.lock().await;
        let halves = guard.as_mut().ok_or(Error::Hijacked)?;
        halves.writer.flush().await?;
        Ok(())
    }

    /// Atomically mark the connection hijacked and hand back the raw
    /// stream. Every further `receive`/`send`/`flush`/`hijack` call fails
    /// with [`Error::Hijacked`].
    pub async fn hijack(&self) -> Result<impl AsyncRead + AsyncWrite + Unpin + Send> {
        let mut hijacked = self.hijacked.write().await;
        if *hijacked {
            return Err(Error::Hijacked);
        }
        let mut guard = self.halves.lock().await;
        let mut halves = guard.take().ok_or(Error::Hijacked)?;
        halves.writer.flush().await.ok();
        *hijacked = true;
        debug!(addr = %self.remote_addr, "connection hijacked");
        let writer = halves.writer.into_inner();
        Ok(tokio::io::join(halves.reader, writer))
    }

    pub async fn close(&self) -> Result<()> {
        let mut guard = self.halves.lock().await;
        if let Some(halves) = guard.as_mut() {
            if let Err(e) = halves.writer.shutdown().await {
                warn!(addr = %self.remote_addr, error = %e, "error shutting down connection");
            }
        }
        *guard = None;
        Ok(())
    }

    fn clone_handle(self: &Arc<Self>) -> ConnHandle {
        Arc::clone(self)
    }
}
