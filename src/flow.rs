//! Flow table entries: installing them (`FlowMod`), being told one expired
//! or was evicted (`FlowRemoved`), and reading back their counters
//! (`FlowStats`, carried inside a multipart reply).

use std::io::{Read, Write};

use crate::codec::{read_u16, read_u32, read_u64, read_u8, write_slice, write_u16, write_u32, write_u64, write_u8, ReadFrom, WriteTo};
use crate::cookie::CookieJar;
use crate::error::Result;
use crate::instructions::Instruction;
use crate::oxm::Match;

/// No buffered packet is associated with this flow-mod.
pub const NO_BUFFER: u32 = 0xffffffff;
/// Send to all tables in sequence (`FlowMod.table_id` / `FlowMod.out_group`
/// wildcard-style sentinels live in [`crate::port`] and here respectively).
pub const ANY_GROUP: u32 = 0xffffffff;

enum_with_unknown! {
    pub enum FlowModCommand(u8) {
        Add = 0,
        Modify = 1,
        ModifyStrict = 2,
        Delete = 3,
        DeleteStrict = 4,
    }
}

bitflags::bitflags! {
    /// `ofp_flow_mod_flags`.
    pub struct FlowModFlags: u16 {
        const SEND_FLOW_REMOVED = 1 << 0;
        const CHECK_OVERLAP = 1 << 1;
        const RESET_COUNTS = 1 << 2;
        const NO_PKT_COUNTS = 1 << 3;
        const NO_BYT_COUNTS = 1 << 4;
    }
}

/// Install, modify or remove a flow table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMod {
    pub cookie: u64,
    pub cookie_mask: u64,
    pub table_id: u8,
    pub command: FlowModCommand,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub priority: u16,
    pub buffer_id: u32,
    pub out_port: u32,
    pub out_group: u32,
    pub flags: FlowModFlags,
    pub matches: Match,
    pub instructions: Vec<Instruction>,
}

impl CookieJar for FlowMod {
    fn cookie(&self) -> u64 {
        self.cookie
    }
    fn set_cookie(&mut self, cookie: u64) {
        self.cookie = cookie;
    }
}

impl WriteTo for FlowMod {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u64(w, self.cookie)?;
        write_u64(w, self.cookie_mask)?;
        write_u8(w, self.table_id)?;
        write_u8(w, self.command.into())?;
        write_u16(w, self.idle_timeout)?;
        write_u16(w, self.hard_timeout)?;
        write_u16(w, self.priority)?;
        write_u32(w, self.buffer_id)?;
        write_u32(w, self.out_port)?;
        write_u32(w, self.out_group)?;
        write_u16(w, self.flags.bits())?;
        w.write_all(&[0u8; 2])?;
        self.matches.write_to(w)?;
        write_slice(w, &self.instructions)?;
        Ok(())
    }
}

impl ReadFrom for FlowMod {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let cookie = read_u64(r)?;
        let cookie_mask = read_u64(r)?;
        let table_id = read_u8(r)?;
        let command = FlowModCommand::from(read_u8(r)?);
        let idle_timeout = read_u16(r)?;
        let hard_timeout = read_u16(r)?;
        let priority = read_u16(r)?;
        let buffer_id = read_u32(r)?;
        let out_port = read_u32(r)?;
        let out_group = read_u32(r)?;
        let flags = FlowModFlags::from_bits_truncate(read_u16(r)?);
        let mut pad = [0u8; 2];
        r.read_exact(&mut pad)?;
        let matches = Match::read_from(r)?;
        let mut rest = Vec::new();
        r.read_to_end(&mut rest)?;
        let instructions = crate::codec::scan(&rest)?;
        Ok(FlowMod {
            cookie,
            cookie_mask,
            table_id,
            command,
            idle_timeout,
            hard_timeout,
            priority,
            buffer_id,
            out_port,
            out_group,
            flags,
            matches,
            instructions,
        })
    }
}

enum_with_unknown! {
    pub enum RemovedReason(u8) {
        IdleTimeout = 0,
        HardTimeout = 1,
        Delete = 2,
        GroupDelete = 3,
    }
}

/// Notification that a flow entry expired or was evicted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRemoved {
    pub cookie: u64,
    pub priority: u16,
    pub reason: RemovedReason,
    pub table_id: u8,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub packet_count: u64,
    pub byte_count: u64,
    pub matches: Match,
}

impl CookieJar for FlowRemoved {
    fn cookie(&self) -> u64 {
        self.cookie
    }
    fn set_cookie(&mut self, cookie: u64) {
        self.cookie = cookie;
    }
}

impl WriteTo for FlowRemoved {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u64(w, self.cookie)?;
        write_u16(w, self.priority)?;
        write_u8(w, self.reason.into())?;
        write_u8(w, self.table_id)?;
        write_u32(w, self.duration_sec)?;
        write_u32(w, self.duration_nsec)?;
        write_u16(w, self.idle_timeout)?;
        write_u16(w, self.hard_timeout)?;
        write_u64(w, self.packet_count)?;
        write_u64(w, self.byte_count)?;
        self.matches.write_to(w)?;
        Ok(())
    }
}

impl ReadFrom for FlowRemoved {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        Ok(FlowRemoved {
            cookie: read_u64(r)?,
            priority: read_u16(r)?,
            reason: RemovedReason::from(read_u8(r)?),
            table_id: read_u8(r)?,
            duration_sec: read_u32(r)?,
            duration_nsec: read_u32(r)?,
            idle_timeout: read_u16(r)?,
            hard_timeout: read_u16(r)?,
            packet_count: read_u64(r)?,
            byte_count: read_u64(r)?,
            matches: Match::read_from(r)?,
        })
    }
}

/// One entry in a flow-stats multipart reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStats {
    pub table_id: u8,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub priority: u16,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub flags: FlowModFlags,
    pub cookie: u64,
    pub packet_count: u64,
    pub byte_count: u64,
    pub matches: Match,
    pub instructions: Vec<Instruction>,
}

impl CookieJar for FlowStats {
    fn cookie(&self) -> u64 {
        self.cookie
    }
    fn set_cookie(&mut self, cookie: u64) {
        self.cookie = cookie;
    }
}

impl WriteTo for FlowStats {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let mut body = Vec::new();
        write_u8(&mut body, self.table_id)?;
        body.push(0);
        write_u32(&mut body, self.duration_sec)?;
        write_u32(&mut body, self.duration_nsec)?;
        write_u16(&mut body, self.priority)?;
        write_u16(&mut body, self.idle_timeout)?;
        write_u16(&mut body, self.hard_timeout)?;
        write_u16(&mut body, self.flags.bits())?;
        body.extend_from_slice(&[0u8; 4]);
        write_u64(&mut body, self.cookie)?;
        write_u64(&mut body, self.packet_count)?;
        write_u64(&mut body, self.byte_count)?;
        self.matches.write_to(&mut body)?;
        write_slice(&mut body, &self.instructions)?;
        let len = 2 + body.len();
        write_u16(w, len as u16)?;
        w.write_all(&body)?;
        Ok(())
    }
}

impl ReadFrom for FlowStats {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let len = read_u16(r)? as usize;
        let mut body = vec![0u8; len - 2];
        r.read_exact(&mut body)?;
        let mut cur = std::io::Cursor::new(&body[..]);
        let table_id = read_u8(&mut cur)?;
        let mut pad1 = [0u8; 1];
        cur.read_exact(&mut pad1)?;
        let duration_sec = read_u32(&mut cur)?;
        let duration_nsec = read_u32(&mut cur)?;
        let priority = read_u16(&mut cur)?;
        let idle_timeout = read_u16(&mut cur)?;
        let hard_timeout = read_u16(&mut cur)?;
        let flags = FlowModFlags::from_bits_truncate(read_u16(&mut cur)?);
        let mut pad4 = [0u8; 4];
        cur.read_exact(&mut pad4)?;
        let cookie = read_u64(&mut cur)?;
        let packet_count = read_u64(&mut cur)?;
        let byte_count = read_u64(&mut cur)?;
        let matches = Match::read_from(&mut cur)?;
        let mut rest = Vec::new();
        cur.read_to_end(&mut rest)?;
        let instructions = crate::codec::scan(&rest)?;
        Ok(FlowStats {
            table_id,
            duration_sec,
            duration_nsec,
            priority,
            idle_timeout,
            hard_timeout,
            flags,
            cookie,
            packet_count,
            byte_count,
            matches,
            instructions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use crate::oxm::{OxmField, Xm};
    use std::io::Cursor;

    /// The flow-add scenario: an entry sending in-port-3 traffic through
    /// `ClearActions`, asking to be notified when it's removed.
    #[test]
    fn flow_add_round_trips_literal_scenario() {
        let mut matches = Match::new();
        matches.push(Xm::new(OxmField::InPort, vec![0, 0, 0, 3]));

        let flow_mod = FlowMod {
            cookie: 0xDBF7525E57BD7EEF,
            cookie_mask: 0x44D8B8F011090DCB,
            table_id: 254,
            command: FlowModCommand::Add,
            idle_timeout: 45,
            hard_timeout: 90,
            priority: 10,
            buffer_id: NO_BUFFER,
            out_port: crate::port::PortNumber::Flood.into(),
            out_group: ANY_GROUP,
            flags: FlowModFlags::SEND_FLOW_REMOVED | FlowModFlags::CHECK_OVERLAP,
            matches,
            instructions: vec![Instruction::ClearActions],
        };

        let mut buf = Vec::new();
        flow_mod.write_to(&mut buf).unwrap();
        let decoded = FlowMod::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, flow_mod);
        assert_eq!(decoded.cookie, 0xDBF7525E57BD7EEF);
        assert_eq!(decoded.table_id, 254);
    }

    #[test]
    fn flow_removed_round_trips() {
        let removed = FlowRemoved {
            cookie: 42,
            priority: 1,
            reason: RemovedReason::Delete,
            table_id: 0,
            duration_sec: 10,
            duration_nsec: 0,
            idle_timeout: 0,
            hard_timeout: 0,
            packet_count: 5,
            byte_count: 500,
            matches: Match::new(),
        };
        let mut buf = Vec::new();
        removed.write_to(&mut buf).unwrap();
        let decoded = FlowRemoved::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, removed);
    }

    #[test]
    fn flow_stats_round_trips_with_apply_actions() {
        let stats = FlowStats {
            table_id: 0,
            duration_sec: 3,
            duration_nsec: 0,
            priority: 1,
            idle_timeout: 0,
            hard_timeout: 0,
            flags: FlowModFlags::empty(),
            cookie: 7,
            packet_count: 1,
            byte_count: 64,
            matches: Match::new(),
            instructions: vec![Instruction::ApplyActions(vec![Action::PopVlan])],
        };
        let mut buf = Vec::new();
        stats.write_to(&mut buf).unwrap();
        let decoded = FlowStats::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, stats);
    }
}
