//! Big-endian primitive read/write helpers shared by every message type.
//!
//! Every OpenFlow structure implements [`WriteTo`]/[`ReadFrom`] in terms of
//! `byteorder`'s `ReadBytesExt`/`WriteBytesExt`, the same crate the wire
//! layer has always used here, just driven through `io::Read`/`io::Write`
//! instead of indexing into an already-complete buffer: a connection reads
//! one message at a time off a socket, so the natural owner of "a place to
//! read bytes from" is a reader, not a slice.
//!
//! `scan` is the one non-trivial primitive: it implements the
//! type-length-value dispatch used by actions, instructions, meter bands,
//! queue properties, table-feature properties and hello elements. All five
//! families share the same 4-byte `{type: u16, length: u16}` envelope, with
//! `length` counting the envelope itself.

use std::io::{Cursor, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, BE};

use crate::error::{Error, Result};

/// A type that can serialize itself onto a writer.
pub trait WriteTo {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()>;
}

/// A type that can deserialize itself from a reader.
pub trait ReadFrom: Sized {
    fn read_from<R: Read>(r: &mut R) -> Result<Self>;
}

/// Number of zero bytes needed to round `n` up to a multiple of 8.
pub fn pad_len(n: usize) -> usize {
    (8 - n % 8) % 8
}

/// `pad_len(n)` zero bytes.
pub fn make_pad(n: usize) -> Vec<u8> {
    vec![0u8; pad_len(n)]
}

/// Write the padding needed to align a structure of `written_len` bytes to
/// a 64-bit boundary.
pub fn write_pad<W: Write>(w: &mut W, written_len: usize) -> Result<()> {
    let pad = make_pad(written_len);
    if !pad.is_empty() {
        w.write_all(&pad)?;
    }
    Ok(())
}

/// Skip the padding that follows a structure of `written_len` bytes.
pub fn skip_pad<R: Read>(r: &mut R, written_len: usize) -> Result<()> {
    let n = pad_len(written_len);
    if n > 0 {
        let mut buf = [0u8; 8];
        r.read_exact(&mut buf[..n])?;
    }
    Ok(())
}

/// Encode a homogeneous list by writing each element in order. The caller
/// is responsible for emitting whatever length prefix the enclosing
/// structure needs; this only writes the elements themselves.
pub fn write_slice<W: Write, T: WriteTo>(w: &mut W, items: &[T]) -> Result<()> {
    for item in items {
        item.write_to(w)?;
    }
    Ok(())
}

/// Decode a homogeneous list by reading elements until the reader is
/// exhausted. Reaching end-of-stream cleanly (no bytes at all consumed for
/// the failed element) ends the list rather than failing it; any other
/// error propagates.
pub fn read_slice<R: Read, T: ReadFrom>(r: &mut R) -> Result<Vec<T>> {
    let mut out = Vec::new();
    loop {
        match T::read_from(r) {
            Ok(item) => out.push(item),
            Err(e) if e.is_clean_eof() => break,
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// A type whose wire form starts with a 2-byte type tag and a 2-byte
/// length (counting the tag and length fields themselves), used by the
/// polymorphic element families: actions, instructions, meter bands, queue
/// properties, table-feature properties and hello elements.
pub trait Tagged: Sized {
    /// Decode one element given its type tag and a cursor bounded to
    /// exactly `length` bytes, positioned at the start of the element
    /// (i.e. the tag and length have *not* been consumed yet — the
    /// variant's own decoder re-reads them, matching the rest of this
    /// crate's `ReadFrom` contract).
    fn decode_tagged(tag: u16, body: &mut Cursor<&[u8]>) -> Result<Self>;
}

/// Scan a type-length-value list out of `buf`, dispatching each element to
/// `T::decode_tagged` by its 2-byte type tag. Reaching the end of `buf`
/// cleanly ends the scan.
pub fn scan<T: Tagged>(buf: &[u8]) -> Result<Vec<T>> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while pos < buf.len() {
        if buf.len() - pos < 4 {
            return Err(Error::decode("truncated TLV header"));
        }
        let tag = u16::from_be_bytes([buf[pos], buf[pos + 1]]);
        let len = u16::from_be_bytes([buf[pos + 2], buf[pos + 3]]) as usize;
        if len < 4 || pos + len > buf.len() {
            return Err(Error::decode("TLV element length out of bounds"));
        }
        let mut elem = Cursor::new(&buf[pos..pos + len]);
        out.push(T::decode_tagged(tag, &mut elem)?);
        pos += len;
    }
    Ok(out)
}

pub(crate) type Endian = BE;

pub(crate) fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    Ok(r.read_u8()?)
}
pub(crate) fn read_u16<R: Read>(r: &mut R) -> Result<u16> {
    Ok(r.read_u16::<Endian>()?)
}
pub(crate) fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    Ok(r.read_u32::<Endian>()?)
}
pub(crate) fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    Ok(r.read_u64::<Endian>()?)
}
pub(crate) fn write_u8<W: Write>(w: &mut W, v: u8) -> Result<()> {
    w.write_u8(v)?;
    Ok(())
}
pub(crate) fn write_u16<W: Write>(w: &mut W, v: u16) -> Result<()> {
    w.write_u16::<Endian>(v)?;
    Ok(())
}
pub(crate) fn write_u32<W: Write>(w: &mut W, v: u32) -> Result<()> {
    w.write_u32::<Endian>(v)?;
    Ok(())
}
pub(crate) fn write_u64<W: Write>(w: &mut W, v: u64) -> Result<()> {
    w.write_u64::<Endian>(v)?;
    Ok(())
}

/// Write `s` into a fixed-width, NUL-padded ASCII field of `width` bytes,
/// the convention this protocol uses for inline names and description
/// strings. Truncates to `width - 1` bytes so the field always has at
/// least one padding byte to terminate on.
pub fn write_fixed_str<W: Write>(w: &mut W, s: &str, width: usize) -> Result<()> {
    let mut buf = vec![0u8; width];
    let bytes = s.as_bytes();
    let len = bytes.len().min(width.saturating_sub(1));
    buf[..len].copy_from_slice(&bytes[..len]);
    w.write_all(&buf)?;
    Ok(())
}

/// Read a fixed-width, NUL-padded ASCII field of `width` bytes back into
/// a `String`, stopping at the first NUL byte (or the field's end, if
/// none is present).
pub fn read_fixed_str<R: Read>(r: &mut R, width: usize) -> Result<String> {
    let mut buf = vec![0u8; width];
    r.read_exact(&mut buf)?;
    let nul = buf.iter().position(|&b| b == 0).unwrap_or(width);
    Ok(String::from_utf8_lossy(&buf[..nul]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_len_rounds_to_eight() {
        assert_eq!(pad_len(0), 0);
        assert_eq!(pad_len(1), 7);
        assert_eq!(pad_len(8), 0);
        assert_eq!(pad_len(9), 7);
        assert_eq!(pad_len(16), 0);
    }

    #[test]
    fn make_pad_is_zeroed() {
        assert_eq!(make_pad(3), vec![0u8; 5]);
        assert!(make_pad(8).is_empty());
    }

    #[test]
    fn fixed_str_round_trips_and_pads() {
        let mut buf = Vec::new();
        write_fixed_str(&mut buf, "eth0", 16).unwrap();
        assert_eq!(buf.len(), 16);
        assert_eq!(&buf[..4], b"eth0");
        assert!(buf[4..].iter().all(|&b| b == 0));
        let decoded = read_fixed_str(&mut Cursor::new(&buf[..]), 16).unwrap();
        assert_eq!(decoded, "eth0");
    }

    #[test]
    fn fixed_str_truncates_to_width_minus_one() {
        let mut buf = Vec::new();
        write_fixed_str(&mut buf, &"x".repeat(20), 16).unwrap();
        assert_eq!(buf.len(), 16);
        assert_eq!(buf[15], 0);
    }
}
