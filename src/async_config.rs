//! Asynchronous message filtering: which `PacketIn`/`PortStatus`/
//! `FlowRemoved` notifications a controller wants to receive, split by
//! the role it currently holds (master/equal vs. slave).

use std::io::{Read, Write};

use crate::codec::{read_u32, write_u32, ReadFrom, WriteTo};
use crate::error::Result;

bitflags::bitflags! {
    pub struct PacketInMask: u32 {
        const NO_MATCH = 1 << 0;
        const ACTION = 1 << 1;
        const INVALID_TTL = 1 << 2;
    }
}

bitflags::bitflags! {
    pub struct PortStatusMask: u32 {
        const ADD = 1 << 0;
        const DELETE = 1 << 1;
        const MODIFY = 1 << 2;
    }
}

bitflags::bitflags! {
    pub struct FlowRemovedMask: u32 {
        const IDLE_TIMEOUT = 1 << 0;
        const HARD_TIMEOUT = 1 << 1;
        const DELETE = 1 << 2;
        const GROUP_DELETE = 1 << 3;
    }
}

/// The full set of masks carried by `GetAsyncReply`/`SetAsync`: one pair
/// (master/equal, slave) per notification family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsyncConfig {
    pub packet_in_master: PacketInMask,
    pub packet_in_slave: PacketInMask,
    pub port_status_master: PortStatusMask,
    pub port_status_slave: PortStatusMask,
    pub flow_removed_master: FlowRemovedMask,
    pub flow_removed_slave: FlowRemovedMask,
}

impl WriteTo for AsyncConfig {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u32(w, self.packet_in_master.bits())?;
        write_u32(w, self.packet_in_slave.bits())?;
        write_u32(w, self.port_status_master.bits())?;
        write_u32(w, self.port_status_slave.bits())?;
        write_u32(w, self.flow_removed_master.bits())?;
        write_u32(w, self.flow_removed_slave.bits())?;
        Ok(())
    }
}

impl ReadFrom for AsyncConfig {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        Ok(AsyncConfig {
            packet_in_master: PacketInMask::from_bits_truncate(read_u32(r)?),
            packet_in_slave: PacketInMask::from_bits_truncate(read_u32(r)?),
            port_status_master: PortStatusMask::from_bits_truncate(read_u32(r)?),
            port_status_slave: PortStatusMask::from_bits_truncate(read_u32(r)?),
            flow_removed_master: FlowRemovedMask::from_bits_truncate(read_u32(r)?),
            flow_removed_slave: FlowRemovedMask::from_bits_truncate(read_u32(r)?),
        })
    }
}

/// Identical wire shape to [`AsyncConfig`]; distinguished only by message
/// type (`GetAsyncReply` vs. `SetAsync`).
pub type SetAsync = AsyncConfig;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn async_config_round_trips() {
        let cfg = AsyncConfig {
            packet_in_master: PacketInMask::NO_MATCH | PacketInMask::ACTION,
            packet_in_slave: PacketInMask::empty(),
            port_status_master: PortStatusMask::ADD | PortStatusMask::DELETE | PortStatusMask::MODIFY,
            port_status_slave: PortStatusMask::empty(),
            flow_removed_master: FlowRemovedMask::IDLE_TIMEOUT,
            flow_removed_slave: FlowRemovedMask::empty(),
        };
        let mut buf = Vec::new();
        cfg.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 24);
        let decoded = AsyncConfig::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, cfg);
    }
}
