//! The per-request reply channel a [`crate::mux::Handler`] writes through.
//!
//! A [`Response`] is bound to the request that produced it: it carries a
//! template header (the originating request's version and transaction) so
//! every `write` call only needs to supply the reply's type and body. Each
//! `write` call serializes header-plus-body into one local buffer and
//! hands it to the connection in a single call, so concurrent handlers on
//! the same connection never interleave within a frame.

use async_trait::async_trait;

use crate::codec::WriteTo;
use crate::conn::ConnHandle;
use crate::error::{Error, Result};
use crate::header::{Header, Type, HEADER_LEN};
use crate::request::Request;

/// Anything a handler can write a framed reply to. Implemented by
/// [`Response`] for real connections and by
/// [`crate::recorder::Recorder`] for tests.
#[async_trait]
pub trait ResponseWriter: Send + Sync {
    /// Serialize `body`, stamp `header.length`, and write header-plus-body
    /// as one frame. `header.version` is filled in from the originating
    /// request if left at 0.
    async fn write(&mut self, header: Header, body: &[u8]) -> Result<()>;
}

/// The live [`ResponseWriter`] bound to one incoming request.
pub struct Response {
    conn: ConnHandle,
    template: Header,
}

impl Response {
    pub(crate) fn new(conn: ConnHandle, request: &Request) -> Self {
        Response {
            conn,
            template: request.header,
        }
    }

    /// A reply header pre-filled with this response's version and
    /// transaction; callers only need to override `kind`.
    pub fn header(&self, kind: Type) -> Header {
        self.template.reply(kind)
    }

    pub fn connection(&self) -> &ConnHandle {
        &self.conn
    }
}

#[async_trait]
impl ResponseWriter for Response {
    async fn write(&mut self, mut header: Header, body: &[u8]) -> Result<()> {
        if header.version == 0 {
            header.version = self.template.version;
        }
        let total_len = HEADER_LEN + body.len();
        if total_len > u16::MAX as usize {
            return Err(Error::BodyTooLong(body.len()));
        }
        header.length = total_len as u16;

        let mut frame = Vec::with_capacity(total_len);
        header.write_to(&mut frame)?;
        frame.extend_from_slice(body);
        self.conn.write_raw(&frame).await
    }
}
