//! The `ofp_match` structure: a type tag followed by a packed list of
//! [`Xm`] fields, padded to a 64-bit boundary.

use std::io::{Read, Write};

use super::Xm;
use crate::codec::{pad_len, read_u16, write_pad, write_u16, ReadFrom, WriteTo};
use crate::error::{Error, Result};

enum_with_unknown! {
    /// `ofp_match_type`. Only `OxmMatch` (the standard TLV encoding) is in
    /// active use; `Standard`, the fixed-length OpenFlow 1.0 match, is
    /// listed for completeness and never produced by this crate.
    pub enum MatchType(u16) {
        Standard = 0,
        OxmMatch = 1,
    }
}

/// A flow match: a list of OXM fields, each either an exact value or a
/// masked one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    pub fields: Vec<Xm>,
}

impl Match {
    pub fn new() -> Self {
        Match { fields: Vec::new() }
    }

    pub fn push(&mut self, field: Xm) -> &mut Self {
        self.fields.push(field);
        self
    }

    /// Length of the `ofp_match` header plus fields, unpadded. This is the
    /// value that goes in the `length` field on the wire.
    fn unpadded_len(&self) -> usize {
        4 + self.fields.iter().map(Xm::wire_len).sum::<usize>()
    }
}

impl WriteTo for Match {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let len = self.unpadded_len();
        if len > u16::MAX as usize {
            return Err(Error::decode("match too long"));
        }
        write_u16(w, MatchType::OxmMatch.into())?;
        write_u16(w, len as u16)?;
        for field in &self.fields {
            field.write_to(w)?;
        }
        write_pad(w, len)?;
        Ok(())
    }
}

impl ReadFrom for Match {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let kind = MatchType::from(read_u16(r)?);
        if kind != MatchType::OxmMatch {
            return Err(Error::decode("only OXM-encoded matches are supported"));
        }
        let len = read_u16(r)? as usize;
        if len < 4 {
            return Err(Error::decode("match length shorter than its own header"));
        }
        let body_len = len - 4;
        let mut body = vec![0u8; body_len];
        r.read_exact(&mut body)?;
        let mut cursor = std::io::Cursor::new(&body[..]);
        let mut fields = Vec::new();
        while (cursor.position() as usize) < body.len() {
            fields.push(Xm::read_from(&mut cursor)?);
        }
        let mut pad = [0u8; 8];
        let n = pad_len(len);
        if n > 0 {
            r.read_exact(&mut pad[..n])?;
        }
        Ok(Match { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oxm::OxmField;
    use std::io::Cursor;

    #[test]
    fn empty_match_round_trips_as_four_byte_header_padded_to_eight() {
        let m = Match::new();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 8);
        assert_eq!(&buf[0..2], &[0x00, 0x01]);
        assert_eq!(&buf[2..4], &[0x00, 0x04]);

        let decoded = Match::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, m);
    }

    #[test]
    fn match_with_in_port_round_trips() {
        let mut m = Match::new();
        m.push(Xm::new(OxmField::InPort, vec![0, 0, 0, 3]));
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();

        let decoded = Match::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, m);
        assert_eq!(buf.len() % 8, 0);
    }
}
