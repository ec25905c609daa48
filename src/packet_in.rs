//! `PacketIn`: a packet the datapath couldn't handle in hardware and sent
//! up to the controller.

use std::io::{Read, Write};

use crate::codec::{read_u16, read_u32, read_u64, read_u8, write_u16, write_u32, write_u64, write_u8, ReadFrom, WriteTo};
use crate::cookie::CookieJar;
use crate::error::Result;
use crate::oxm::Match;
use crate::port::NO_BUFFER;

enum_with_unknown! {
    pub enum PacketInReason(u8) {
        NoMatch = 0,
        Action = 1,
        InvalidTtl = 2,
    }
}

/// A packet (or its first `total_len` bytes) delivered to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketIn {
    pub buffer_id: u32,
    /// Full length of the frame, even if `frame` itself was truncated.
    pub total_len: u16,
    pub reason: PacketInReason,
    pub table_id: u8,
    pub cookie: u64,
    pub matches: Match,
    pub frame: Vec<u8>,
}

impl PacketIn {
    pub fn is_buffered(&self) -> bool {
        self.buffer_id != NO_BUFFER
    }
}

impl CookieJar for PacketIn {
    fn cookie(&self) -> u64 {
        self.cookie
    }
    fn set_cookie(&mut self, cookie: u64) {
        self.cookie = cookie;
    }
}

impl WriteTo for PacketIn {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u32(w, self.buffer_id)?;
        write_u16(w, self.total_len)?;
        write_u8(w, self.reason.into())?;
        write_u8(w, self.table_id)?;
        write_u64(w, self.cookie)?;
        self.matches.write_to(w)?;
        w.write_all(&[0u8; 2])?; // pad
        w.write_all(&self.frame)?;
        Ok(())
    }
}

impl ReadFrom for PacketIn {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let buffer_id = read_u32(r)?;
        let total_len = read_u16(r)?;
        let reason = PacketInReason::from(read_u8(r)?);
        let table_id = read_u8(r)?;
        let cookie = read_u64(r)?;
        let matches = Match::read_from(r)?;
        let mut pad = [0u8; 2];
        r.read_exact(&mut pad)?;
        let mut frame = Vec::new();
        r.read_to_end(&mut frame)?;
        Ok(PacketIn {
            buffer_id,
            total_len,
            reason,
            table_id,
            cookie,
            matches,
            frame,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oxm::{OxmField, Xm};
    use std::io::Cursor;

    #[test]
    fn packet_in_round_trips_with_in_port_match_and_frame() {
        let mut matches = Match::new();
        matches.push(Xm::new(OxmField::InPort, vec![0, 0, 0, 1]));

        let packet_in = PacketIn {
            buffer_id: NO_BUFFER,
            total_len: 64,
            reason: PacketInReason::NoMatch,
            table_id: 0,
            cookie: 0,
            matches,
            frame: vec![0xaa; 64],
        };

        let mut buf = Vec::new();
        packet_in.write_to(&mut buf).unwrap();
        let decoded = PacketIn::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, packet_in);
        assert!(!decoded.is_buffered());
    }
}
