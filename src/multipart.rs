//! `MultipartRequest`/`MultipartReply`: the generic envelope statistics
//! and bulk-config queries are carried in.
//!
//! The envelope is fully decoded here; the payload itself is left opaque
//! (`Vec<u8>`), since its shape depends on [`MultipartType`] and this
//! crate leaves interpreting it to the caller, the way [`crate::oxm`] and
//! [`crate::flow`] types are meant to be layered on top of it by hand
//! (`FlowStats::read_from`, `GroupStats::read_from`,
//! `MeterStats::read_from`, `PortStats::read_from`, ...).

use std::io::{Read, Write};

use crate::codec::{read_u16, write_u16, ReadFrom, WriteTo};
use crate::error::Result;

enum_with_unknown! {
    pub enum MultipartType(u16) {
        Desc = 0,
        FlowStats = 1,
        Aggregate = 2,
        TableStats = 3,
        PortStats = 4,
        Queue = 5,
        GroupStats = 6,
        GroupDesc = 7,
        GroupFeatures = 8,
        MeterStats = 9,
        MeterConfig = 10,
        MeterFeatures = 11,
        TableFeatures = 12,
        PortDesc = 13,
        Experimenter = 0xffff,
    }
}

bitflags::bitflags! {
    pub struct MultipartFlags: u16 {
        /// More replies for this request will follow.
        const MORE = 1 << 0;
    }
}

/// `MultipartRequest`/`MultipartReply`'s shared envelope: a type tag, a
/// flags word, and an opaque body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multipart {
    pub kind: MultipartType,
    pub flags: MultipartFlags,
    pub body: Vec<u8>,
}

impl Multipart {
    pub fn new(kind: MultipartType, body: Vec<u8>) -> Self {
        Multipart {
            kind,
            flags: MultipartFlags::empty(),
            body,
        }
    }

    pub fn more(&self) -> bool {
        self.flags.contains(MultipartFlags::MORE)
    }
}

impl WriteTo for Multipart {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u16(w, self.kind.into())?;
        write_u16(w, self.flags.bits())?;
        w.write_all(&[0u8; 4])?;
        w.write_all(&self.body)?;
        Ok(())
    }
}

impl ReadFrom for Multipart {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let kind = MultipartType::from(read_u16(r)?);
        let flags = MultipartFlags::from_bits_truncate(read_u16(r)?);
        let mut pad = [0u8; 4];
        r.read_exact(&mut pad)?;
        let mut body = Vec::new();
        r.read_to_end(&mut body)?;
        Ok(Multipart { kind, flags, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn desc_request_round_trips_with_empty_body() {
        let req = Multipart::new(MultipartType::Desc, Vec::new());
        let mut buf = Vec::new();
        req.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 8);
        let decoded = Multipart::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn more_flag_round_trips() {
        let mut reply = Multipart::new(MultipartType::FlowStats, vec![1, 2, 3]);
        reply.flags |= MultipartFlags::MORE;
        let mut buf = Vec::new();
        reply.write_to(&mut buf).unwrap();
        let decoded = Multipart::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert!(decoded.more());
    }
}
