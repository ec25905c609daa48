//! A received (or about-to-be-sent) OpenFlow message paired with its
//! header.
//!
//! The body is an owned byte buffer rather than a streaming reader: a
//! cookie matcher and the handler it guards both need to look at the same
//! request body without racing each other over a shared cursor, and the
//! dispatcher may try several matchers before a handler ever sees the
//! request. Owning the bytes once, up front, makes every one of those
//! reads independent and non-destructive.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::codec::WriteTo;
use crate::conn::ConnHandle;
use crate::error::{Error, Result};
use crate::header::{Header, Type, HEADER_LEN, VERSION};

static NEXT_TRANSACTION: AtomicU32 = AtomicU32::new(0);

/// Allocate the next transaction id. Wraps on overflow, matching the
/// wire's 32-bit, opaque transaction field.
pub fn next_transaction() -> u32 {
    NEXT_TRANSACTION.fetch_add(1, Ordering::Relaxed)
}

/// A message, decoded or about to be encoded, together with the
/// connection it arrived on (if any).
#[derive(Clone)]
pub struct Request {
    pub header: Header,
    body: Vec<u8>,
    pub remote_addr: Option<SocketAddr>,
    pub(crate) conn: Option<ConnHandle>,
}

impl Request {
    /// Build an outgoing request: version 0x04, a fresh transaction id,
    /// and an as-yet-unmeasured header length (filled in at encode time).
    pub fn new(kind: Type, body: Vec<u8>) -> Self {
        Request {
            header: Header::new(kind, next_transaction()),
            body,
            remote_addr: None,
            conn: None,
        }
    }

    pub(crate) fn received(header: Header, body: Vec<u8>, remote_addr: SocketAddr, conn: ConnHandle) -> Self {
        Request {
            header,
            body,
            remote_addr: Some(remote_addr),
            conn: Some(conn),
        }
    }

    /// The decoded body. Bounded to exactly `content_length()` bytes;
    /// handlers cannot read past it because there is nothing past it.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// A fresh, independent cursor over the body, for decoders that want
    /// `io::Read`.
    pub fn body_reader(&self) -> Cursor<&[u8]> {
        Cursor::new(&self.body)
    }

    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// The connection this request arrived on, if any. `None` for
    /// requests built with [`Request::new`] that haven't been sent yet.
    pub fn connection(&self) -> Option<&ConnHandle> {
        self.conn.as_ref()
    }

    /// Encode this request's header and body into one contiguous buffer.
    /// Fails with [`Error::BodyTooLong`] if the body pushes the total past
    /// `u16::MAX`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let total_len = HEADER_LEN + self.body.len();
        if total_len > u16::MAX as usize {
            return Err(Error::BodyTooLong(self.body.len()));
        }
        let mut header = self.header;
        header.length = total_len as u16;
        if header.version == 0 {
            header.version = VERSION;
        }
        let mut out = Vec::with_capacity(total_len);
        header.write_to(&mut out)?;
        out.extend_from_slice(&self.body);
        Ok(out)
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("header", &self.header)
            .field("content_length", &self.body.len())
            .field("remote_addr", &self.remote_addr)
            .finish()
    }
}
