//! The 8-byte header every OpenFlow message starts with.
//!
//! ```no_rust
//! +--------+--------+--------+--------+
//! |version |  type  |     length      |
//! +--------+--------+--------+--------+
//! |            transaction            |
//! +--------+--------+--------+--------+
//! ```
//!
//! - `version` identifies the OpenFlow wire version this message belongs to.
//! - `length` is the total message length, header included.
//! - `transaction` (xid) pairs a reply to the request that caused it; a
//!   reply always echoes the request's transaction unchanged.

use std::io::{Read, Write};

use crate::codec::{read_u16, read_u32, read_u8, write_u16, write_u32, write_u8, ReadFrom, WriteTo};
use crate::error::Result;

/// This runtime speaks OpenFlow 1.3.
pub const VERSION: u8 = 0x04;

/// Size of the header, in bytes.
pub const HEADER_LEN: usize = 8;

enum_with_unknown! {
    /// OpenFlow wire version, taken from the header's version byte.
    pub enum Version(u8) {
        OpenFlow1Dot0 = 1,
        OpenFlow1Dot1 = 2,
        OpenFlow1Dot2 = 3,
        OpenFlow1Dot3 = 4,
        OpenFlow1Dot4 = 5,
        OpenFlow1Dot5 = 6,
    }
}

enum_with_unknown! {
    /// OpenFlow message type. Numeric values are consecutive from 0 in the
    /// order listed, matching the real OpenFlow 1.3 wire assignments.
    pub enum Type(u8) {
        Hello = 0,
        Error = 1,
        EchoRequest = 2,
        EchoReply = 3,
        Experimenter = 4,
        FeaturesRequest = 5,
        FeaturesReply = 6,
        GetConfigRequest = 7,
        GetConfigReply = 8,
        SetConfig = 9,
        PacketIn = 10,
        FlowRemoved = 11,
        PortStatus = 12,
        PacketOut = 13,
        FlowMod = 14,
        GroupMod = 15,
        PortMod = 16,
        TableMod = 17,
        MultipartRequest = 18,
        MultipartReply = 19,
        BarrierRequest = 20,
        BarrierReply = 21,
        QueueGetConfigRequest = 22,
        QueueGetConfigReply = 23,
        RoleRequest = 24,
        RoleReply = 25,
        GetAsyncRequest = 26,
        GetAsyncReply = 27,
        SetAsync = 28,
        MeterMod = 29,
    }
}

/// The fixed 8-byte preamble of every OpenFlow message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub kind: Type,
    /// Total message length, header included. Recomputed by the response
    /// writer and `Request::encode`; not meaningful to set by hand before
    /// encoding.
    pub length: u16,
    pub transaction: u32,
}

impl Header {
    pub fn new(kind: Type, transaction: u32) -> Self {
        Header {
            version: VERSION,
            kind,
            length: HEADER_LEN as u16,
            transaction,
        }
    }

    /// A shallow clone used to produce a reply header: same version and
    /// transaction, a new type, length left for the encoder to fill in.
    pub fn reply(&self, kind: Type) -> Self {
        Header {
            version: self.version,
            kind,
            length: HEADER_LEN as u16,
            transaction: self.transaction,
        }
    }
}

impl WriteTo for Header {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u8(w, self.version)?;
        write_u8(w, self.kind.into())?;
        write_u16(w, self.length)?;
        write_u32(w, self.transaction)?;
        Ok(())
    }
}

impl ReadFrom for Header {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let version = read_u8(r)?;
        let kind = Type::from(read_u8(r)?);
        let length = read_u16(r)?;
        let transaction = read_u32(r)?;
        Ok(Header {
            version,
            kind,
            length,
            transaction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn hello_header_round_trips() {
        let bytes = [0x04, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00];
        let header = Header::read_from(&mut Cursor::new(&bytes[..])).unwrap();
        assert_eq!(header.version, 0x04);
        assert_eq!(header.kind, Type::Hello);
        assert_eq!(header.length, 8);
        assert_eq!(header.transaction, 0);

        let mut out = Vec::new();
        header.write_to(&mut out).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn echo_request_header_round_trips() {
        let bytes = [0x04, 0x02, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x2A];
        let header = Header::read_from(&mut Cursor::new(&bytes[..])).unwrap();
        assert_eq!(header.kind, Type::EchoRequest);
        assert_eq!(header.transaction, 42);
        assert_eq!(header.length, 12);
    }

    #[test]
    fn unknown_type_is_preserved_not_rejected() {
        let t = Type::from(200u8);
        assert_eq!(t, Type::Unknown(200));
        assert_eq!(u8::from(t), 200);
    }
}
