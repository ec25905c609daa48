//! Groups: a fan-out target a flow entry can forward into instead of (or
//! in addition to) a single port.

use std::io::{Read, Write};

use crate::actions::Action;
use crate::codec::{read_slice, read_u16, read_u32, read_u64, read_u8, write_slice, write_u16, write_u32, write_u64, write_u8, ReadFrom, WriteTo};
use crate::error::{Error, Result};

enum_with_unknown! {
    pub enum GroupType(u8) {
        All = 0,
        Select = 1,
        Indirect = 2,
        FastFailover = 3,
    }
}

enum_with_unknown! {
    pub enum GroupModCommand(u16) {
        Add = 0,
        Modify = 1,
        Delete = 2,
    }
}

/// No weight specified for this bucket (only meaningful for `Select`
/// groups).
pub const NO_WEIGHT: u16 = 0;
pub const ANY_GROUP: u32 = 0xffffffff;
pub const ANY_PORT: u32 = 0xffffffff;

bitflags::bitflags! {
    pub struct GroupTypeBitmap: u32 {
        const ALL = 1 << 0;
        const SELECT = 1 << 1;
        const INDIRECT = 1 << 2;
        const FAST_FAILOVER = 1 << 3;
    }
}

bitflags::bitflags! {
    pub struct GroupCapabilities: u32 {
        const SELECT_WEIGHT = 1 << 0;
        const SELECT_LIVENESS = 1 << 1;
        const CHAINING = 1 << 4;
        const CHAINING_CHECKS = 1 << 5;
    }
}

bitflags::bitflags! {
    /// Action types a group's buckets support, one bitmap per
    /// `max_groups` slot.
    pub struct ActionTypeBitmap: u32 {
        const OUTPUT = 1 << 0;
        const COPY_TTL_OUT = 1 << 11;
        const COPY_TTL_IN = 1 << 12;
        const SET_MPLS_TTL = 1 << 15;
        const DEC_MPLS_TTL = 1 << 16;
        const PUSH_VLAN = 1 << 17;
        const POP_VLAN = 1 << 18;
        const PUSH_MPLS = 1 << 19;
        const POP_MPLS = 1 << 20;
        const SET_QUEUE = 1 << 21;
        const GROUP = 1 << 22;
        const SET_NW_TTL = 1 << 23;
        const DEC_NW_TTL = 1 << 24;
        const SET_FIELD = 1 << 25;
        const PUSH_PBB = 1 << 26;
        const POP_PBB = 1 << 27;
    }
}

/// One action set a group can forward a packet through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub weight: u16,
    pub watch_port: u32,
    pub watch_group: u32,
    pub actions: Vec<Action>,
}

impl WriteTo for Bucket {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let mut actions_buf = Vec::new();
        for action in &self.actions {
            action.write_to(&mut actions_buf)?;
        }
        let len = 16 + actions_buf.len();
        if len > u16::MAX as usize {
            return Err(Error::decode("bucket too long"));
        }
        write_u16(w, len as u16)?;
        write_u16(w, self.weight)?;
        write_u32(w, self.watch_port)?;
        write_u32(w, self.watch_group)?;
        w.write_all(&[0u8; 4])?;
        w.write_all(&actions_buf)?;
        Ok(())
    }
}

impl ReadFrom for Bucket {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let len = read_u16(r)? as usize;
        let weight = read_u16(r)?;
        let watch_port = read_u32(r)?;
        let watch_group = read_u32(r)?;
        let mut pad = [0u8; 4];
        r.read_exact(&mut pad)?;
        let mut actions_buf = vec![0u8; len - 16];
        r.read_exact(&mut actions_buf)?;
        let actions = crate::codec::scan(&actions_buf)?;
        Ok(Bucket {
            weight,
            watch_port,
            watch_group,
            actions,
        })
    }
}

/// Create, modify or delete a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMod {
    pub command: GroupModCommand,
    pub kind: GroupType,
    pub group_id: u32,
    pub buckets: Vec<Bucket>,
}

impl WriteTo for GroupMod {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u16(w, self.command.into())?;
        write_u8(w, self.kind.into())?;
        w.write_all(&[0u8])?;
        write_u32(w, self.group_id)?;
        write_slice(w, &self.buckets)?;
        Ok(())
    }
}

impl ReadFrom for GroupMod {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let command = GroupModCommand::from(read_u16(r)?);
        let kind = GroupType::from(read_u8(r)?);
        let mut pad = [0u8; 1];
        r.read_exact(&mut pad)?;
        let group_id = read_u32(r)?;
        let buckets = read_slice(r)?;
        Ok(GroupMod {
            command,
            kind,
            group_id,
            buckets,
        })
    }
}

/// One entry in a group-stats multipart reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStats {
    pub group_id: u32,
    pub ref_count: u32,
    pub packet_count: u64,
    pub byte_count: u64,
    pub duration_sec: u32,
    pub duration_nsec: u32,
}

impl WriteTo for GroupStats {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u16(w, 40)?; // length
        w.write_all(&[0u8; 2])?;
        write_u32(w, self.group_id)?;
        write_u32(w, self.ref_count)?;
        w.write_all(&[0u8; 4])?;
        write_u64(w, self.packet_count)?;
        write_u64(w, self.byte_count)?;
        write_u32(w, self.duration_sec)?;
        write_u32(w, self.duration_nsec)?;
        Ok(())
    }
}

impl ReadFrom for GroupStats {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let _len = read_u16(r)?;
        let mut pad = [0u8; 2];
        r.read_exact(&mut pad)?;
        let group_id = read_u32(r)?;
        let ref_count = read_u32(r)?;
        r.read_exact(&mut [0u8; 4])?;
        let packet_count = read_u64(r)?;
        let byte_count = read_u64(r)?;
        let duration_sec = read_u32(r)?;
        let duration_nsec = read_u32(r)?;
        Ok(GroupStats {
            group_id,
            ref_count,
            packet_count,
            byte_count,
            duration_sec,
            duration_nsec,
        })
    }
}

/// Group capabilities, as reported by a `GROUP_FEATURES` multipart reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupFeatures {
    pub types: GroupTypeBitmap,
    pub capabilities: GroupCapabilities,
    pub max_groups: [u32; 4],
    pub actions: [ActionTypeBitmap; 4],
}

impl WriteTo for GroupFeatures {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u32(w, self.types.bits())?;
        write_u32(w, self.capabilities.bits())?;
        for max in &self.max_groups {
            write_u32(w, *max)?;
        }
        for action in &self.actions {
            write_u32(w, action.bits())?;
        }
        Ok(())
    }
}

impl ReadFrom for GroupFeatures {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let types = GroupTypeBitmap::from_bits_truncate(read_u32(r)?);
        let capabilities = GroupCapabilities::from_bits_truncate(read_u32(r)?);
        let mut max_groups = [0u32; 4];
        for slot in &mut max_groups {
            *slot = read_u32(r)?;
        }
        let mut actions = [ActionTypeBitmap::empty(); 4];
        for slot in &mut actions {
            *slot = ActionTypeBitmap::from_bits_truncate(read_u32(r)?);
        }
        Ok(GroupFeatures {
            types,
            capabilities,
            max_groups,
            actions,
        })
    }
}
