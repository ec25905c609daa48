//! Crate-wide error type.
//!
//! Mirrors the taxonomy in the design's error-handling section: decode
//! failures, outgoing messages that don't fit the 16-bit length field,
//! operations on a hijacked connection, and unknown header versions are all
//! distinct variants so callers can match on them instead of parsing strings.

use thiserror::Error;

/// The crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed wire input: a bad length, an inconsistent TLV, or a
    /// truncated body.
    #[error("malformed OpenFlow message: {0}")]
    Decode(String),

    /// An outgoing message's body would push the encoded length past
    /// `u16::MAX`.
    #[error("encoded message body too long: {0} bytes")]
    BodyTooLong(usize),

    /// The connection has been hijacked; no further framed I/O is allowed
    /// on it.
    #[error("connection has been hijacked")]
    Hijacked,

    /// The header declared a version this runtime does not speak. The
    /// request is still delivered to the handler, which decides what (if
    /// anything) to do about it.
    #[error("unsupported OpenFlow version: 0x{0:02x}")]
    UnknownVersion(u8),

    /// Transport-level failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn decode(msg: impl Into<String>) -> Self {
        Error::Decode(msg.into())
    }

    /// True for errors that `scan`/`read_slice` should treat as "clean end
    /// of the enclosing list" rather than propagate, i.e. exactly the
    /// underlying I/O reached EOF with nothing read.
    pub(crate) fn is_clean_eof(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}
