//! `Hello` and its elements: the version-negotiation handshake every
//! connection starts with.

use std::io::{Cursor, Read, Write};

use crate::codec::{pad_len, read_u16, read_u32, scan, write_pad, write_u16, write_u32, ReadFrom, Tagged, WriteTo};
use crate::error::{Error, Result};

const T_VERSION_BITMAP: u16 = 1;

/// One element of a `Hello` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelloElement {
    /// The set of OpenFlow versions the sender supports, as a bitmap: bit
    /// `N` of word `i` set means version `32*i + N` is supported.
    VersionBitmap(Vec<u32>),
    Unknown { kind: u16, body: Vec<u8> },
}

impl HelloElement {
    /// Build a version bitmap advertising exactly one version.
    pub fn version(v: u8) -> Self {
        let mut bitmap = vec![0u32; (v as usize / 32) + 1];
        bitmap[v as usize / 32] |= 1 << (v as usize % 32);
        HelloElement::VersionBitmap(bitmap)
    }

    fn type_tag(&self) -> u16 {
        match self {
            HelloElement::VersionBitmap(_) => T_VERSION_BITMAP,
            HelloElement::Unknown { kind, .. } => *kind,
        }
    }
}

impl WriteTo for HelloElement {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        match self {
            HelloElement::VersionBitmap(words) => {
                let len = 4 + words.len() * 4;
                write_u16(w, self.type_tag())?;
                write_u16(w, len as u16)?;
                for word in words {
                    write_u32(w, *word)?;
                }
                write_pad(w, len)?;
            }
            HelloElement::Unknown { body, .. } => {
                let len = 4 + body.len();
                write_u16(w, self.type_tag())?;
                write_u16(w, len as u16)?;
                w.write_all(body)?;
                write_pad(w, len)?;
            }
        }
        Ok(())
    }
}

impl Tagged for HelloElement {
    fn decode_tagged(tag: u16, cur: &mut Cursor<&[u8]>) -> Result<Self> {
        let _ = read_u16(cur)?;
        let len = read_u16(cur)? as usize;
        let body_len = len - 4;
        let elem = match tag {
            T_VERSION_BITMAP => {
                if body_len % 4 != 0 {
                    return Err(Error::decode("version bitmap length not a multiple of 4"));
                }
                let mut words = Vec::with_capacity(body_len / 4);
                for _ in 0..body_len / 4 {
                    words.push(read_u32(cur)?);
                }
                HelloElement::VersionBitmap(words)
            }
            other => {
                let mut body = vec![0u8; body_len];
                cur.read_exact(&mut body)?;
                HelloElement::Unknown { kind: other, body }
            }
        };
        let pad = pad_len(len);
        if pad > 0 {
            let mut padbuf = [0u8; 8];
            cur.read_exact(&mut padbuf[..pad])?;
        }
        Ok(elem)
    }
}

/// The handshake message exchanged before any other message is valid on a
/// connection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hello {
    pub elements: Vec<HelloElement>,
}

impl Hello {
    pub fn new() -> Self {
        Hello { elements: Vec::new() }
    }

    /// A `Hello` advertising exactly OpenFlow 1.3, the way this crate
    /// always speaks.
    pub fn ofp13() -> Self {
        Hello {
            elements: vec![HelloElement::version(crate::header::VERSION)],
        }
    }
}

impl WriteTo for Hello {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        for element in &self.elements {
            element.write_to(w)?;
        }
        Ok(())
    }
}

impl ReadFrom for Hello {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let mut rest = Vec::new();
        r.read_to_end(&mut rest)?;
        let elements = scan(&rest)?;
        Ok(Hello { elements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hello_round_trips_to_zero_bytes() {
        let hello = Hello::new();
        let mut buf = Vec::new();
        hello.write_to(&mut buf).unwrap();
        assert!(buf.is_empty());
        let decoded = Hello::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, hello);
    }

    #[test]
    fn version_bitmap_round_trips() {
        let hello = Hello::ofp13();
        let mut buf = Vec::new();
        hello.write_to(&mut buf).unwrap();
        let decoded = Hello::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, hello);
        match &decoded.elements[0] {
            HelloElement::VersionBitmap(words) => assert_eq!(words[0] & (1 << 4), 1 << 4),
            _ => panic!("expected version bitmap"),
        }
    }
}
