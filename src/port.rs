//! Port descriptors, port bitmaps, and the `PortStatus` notification.
//!
//! ```no_rust
//! +--------+--------+--------+--------+
//! |            port_no                |
//! +--------+--------+--------+--------+
//! |          hw_addr (6 bytes)        +--------+
//! |                                   | padding |
//! +--------+--------+--------+--------+--------+
//! |                name (16 bytes)             |
//! +--------+--------+--------+--------+--------+
//! |   config  |   state   | curr | advertised  |
//! +--------+--------+--------+--------+--------+
//! |supported| peer  |  curr_speed | max_speed  |
//! +--------+--------+--------+--------+--------+
//! ```

use std::io::{Read, Write};

use bitflags::bitflags;

use crate::codec::{read_fixed_str, read_u32, read_u64, read_u8, write_fixed_str, write_u32, write_u64, write_u8, ReadFrom, WriteTo};
use crate::error::Result;

/// Reserved port numbers; `0xFFFFFFF8..=0xFFFFFFFF` are never real ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortNumber {
    /// The largest number not reserved for a special meaning.
    Max,
    /// Send the packet out the input port.
    InPort,
    /// Submit to the first flow table (packet-out only).
    Table,
    /// Forward using non-OpenFlow pipeline.
    Normal,
    /// Flood using non-OpenFlow pipeline, except the input port.
    Flood,
    /// All standard ports except the input port.
    All,
    /// Send to the controller.
    Controller,
    /// The switch's local OpenFlow "port".
    Local,
    /// Wildcarded / no port specified.
    Any,
    /// A regular, real port number.
    Regular(u32),
}

impl From<u32> for PortNumber {
    fn from(value: u32) -> Self {
        match value {
            0xffff_ff00 => PortNumber::Max,
            0xffff_fff8 => PortNumber::InPort,
            0xffff_fff9 => PortNumber::Table,
            0xffff_fffa => PortNumber::Normal,
            0xffff_fffb => PortNumber::Flood,
            0xffff_fffc => PortNumber::All,
            0xffff_fffd => PortNumber::Controller,
            0xffff_fffe => PortNumber::Local,
            0xffff_ffff => PortNumber::Any,
            other => PortNumber::Regular(other),
        }
    }
}

impl From<PortNumber> for u32 {
    fn from(value: PortNumber) -> Self {
        match value {
            PortNumber::Max => 0xffff_ff00,
            PortNumber::InPort => 0xffff_fff8,
            PortNumber::Table => 0xffff_fff9,
            PortNumber::Normal => 0xffff_fffa,
            PortNumber::Flood => 0xffff_fffb,
            PortNumber::All => 0xffff_fffc,
            PortNumber::Controller => 0xffff_fffd,
            PortNumber::Local => 0xffff_fffe,
            PortNumber::Any => 0xffff_ffff,
            PortNumber::Regular(other) => other,
        }
    }
}

/// No buffer id: the packet was not buffered on the switch.
pub const NO_BUFFER: u32 = 0xffff_ffff;

bitflags! {
    pub struct PortConfig: u32 {
        const PORT_DOWN    = 1 << 0;
        const NO_RECV      = 1 << 2;
        const NO_FWD       = 1 << 5;
        const NO_PACKET_IN = 1 << 6;
    }
}

bitflags! {
    pub struct PortState: u32 {
        const LINK_DOWN = 1 << 0;
        const BLOCKED   = 1 << 1;
        const LIVE      = 1 << 2;
    }
}

bitflags! {
    pub struct PortFeatures: u32 {
        const RATE_10MB_HD  = 1 << 0;
        const RATE_10MB_FD  = 1 << 1;
        const RATE_100MB_HD = 1 << 2;
        const RATE_100MB_FD = 1 << 3;
        const RATE_1GB_HD   = 1 << 4;
        const RATE_1GB_FD   = 1 << 5;
        const RATE_10GB_FD  = 1 << 6;
        const RATE_40GB_FD  = 1 << 7;
        const RATE_100GB_FD = 1 << 8;
        const RATE_1TB_FD   = 1 << 9;
        const OTHER         = 1 << 10;
        const COPPER        = 1 << 11;
        const FIBER         = 1 << 12;
        const AUTONEG       = 1 << 13;
        const PAUSE         = 1 << 14;
        const PAUSE_ASYM    = 1 << 15;
    }
}

const NAME_LEN: usize = 16;

/// Size of an encoded [`Port`], in bytes.
pub const PORT_LEN: usize = 64;

/// A port descriptor, as carried in `FeaturesReply` and `PortStatus`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub port_no: u32,
    pub hw_addr: [u8; 6],
    pub name: String,
    pub config: PortConfig,
    pub state: PortState,
    pub curr: PortFeatures,
    pub advertised: PortFeatures,
    pub supported: PortFeatures,
    pub peer: PortFeatures,
    /// Current port bitrate, in kbps.
    pub curr_speed: u32,
    /// Max port bitrate, in kbps.
    pub max_speed: u32,
}

impl WriteTo for Port {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u32(w, self.port_no)?;
        w.write_all(&self.hw_addr)?;
        w.write_all(&[0u8; 2])?; // padding
        write_fixed_str(w, &self.name, NAME_LEN)?;
        write_u32(w, self.config.bits())?;
        write_u32(w, self.state.bits())?;
        write_u32(w, self.curr.bits())?;
        write_u32(w, self.advertised.bits())?;
        write_u32(w, self.supported.bits())?;
        write_u32(w, self.peer.bits())?;
        write_u32(w, self.curr_speed)?;
        write_u32(w, self.max_speed)?;
        Ok(())
    }
}

impl ReadFrom for Port {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let port_no = read_u32(r)?;
        let mut hw_addr = [0u8; 6];
        r.read_exact(&mut hw_addr)?;
        let mut pad = [0u8; 2];
        r.read_exact(&mut pad)?;
        let name = read_fixed_str(r, NAME_LEN)?;
        let config = PortConfig::from_bits_truncate(read_u32(r)?);
        let state = PortState::from_bits_truncate(read_u32(r)?);
        let curr = PortFeatures::from_bits_truncate(read_u32(r)?);
        let advertised = PortFeatures::from_bits_truncate(read_u32(r)?);
        let supported = PortFeatures::from_bits_truncate(read_u32(r)?);
        let peer = PortFeatures::from_bits_truncate(read_u32(r)?);
        let curr_speed = read_u32(r)?;
        let max_speed = read_u32(r)?;
        Ok(Port {
            port_no,
            hw_addr,
            name,
            config,
            state,
            curr,
            advertised,
            supported,
            peer,
            curr_speed,
            max_speed,
        })
    }
}

enum_with_unknown! {
    /// Reason a `PortStatus` notification was sent.
    pub enum PortReason(u8) {
        Add = 0,
        Delete = 1,
        Modify = 2,
    }
}

/// Notifies the controller that a port's state or configuration changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortStatus {
    pub reason: PortReason,
    pub port: Port,
}

impl WriteTo for PortStatus {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u8(w, self.reason.into())?;
        w.write_all(&[0u8; 7])?;
        self.port.write_to(w)?;
        Ok(())
    }
}

impl ReadFrom for PortStatus {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let reason = PortReason::from(read_u8(r)?);
        let mut pad = [0u8; 7];
        r.read_exact(&mut pad)?;
        let port = Port::read_from(r)?;
        Ok(PortStatus { reason, port })
    }
}

/// Per-port traffic counters, as carried in port-stats multipart replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortStats {
    pub port_no: u32,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_dropped: u64,
    pub tx_dropped: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
}

impl WriteTo for PortStats {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u32(w, self.port_no)?;
        w.write_all(&[0u8; 4])?;
        write_u64(w, self.rx_packets)?;
        write_u64(w, self.tx_packets)?;
        write_u64(w, self.rx_bytes)?;
        write_u64(w, self.tx_bytes)?;
        write_u64(w, self.rx_dropped)?;
        write_u64(w, self.tx_dropped)?;
        write_u64(w, self.rx_errors)?;
        write_u64(w, self.tx_errors)?;
        Ok(())
    }
}

impl ReadFrom for PortStats {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let port_no = read_u32(r)?;
        let mut pad = [0u8; 4];
        r.read_exact(&mut pad)?;
        Ok(PortStats {
            port_no,
            rx_packets: read_u64(r)?,
            tx_packets: read_u64(r)?,
            rx_bytes: read_u64(r)?,
            tx_bytes: read_u64(r)?,
            rx_dropped: read_u64(r)?,
            tx_dropped: read_u64(r)?,
            rx_errors: read_u64(r)?,
            tx_errors: read_u64(r)?,
        })
    }
}

/// A bare `PortMod` request body: apply a config/mask change (and
/// optionally re-advertise features) to one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMod {
    pub port_no: u32,
    pub hw_addr: [u8; 6],
    pub config: PortConfig,
    pub mask: PortConfig,
    pub advertise: PortFeatures,
}

impl WriteTo for PortMod {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u32(w, self.port_no)?;
        w.write_all(&[0u8; 4])?;
        w.write_all(&self.hw_addr)?;
        w.write_all(&[0u8; 2])?;
        write_u32(w, self.config.bits())?;
        write_u32(w, self.mask.bits())?;
        write_u32(w, self.advertise.bits())?;
        w.write_all(&[0u8; 4])?;
        Ok(())
    }
}

impl ReadFrom for PortMod {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let port_no = read_u32(r)?;
        let mut pad4 = [0u8; 4];
        r.read_exact(&mut pad4)?;
        let mut hw_addr = [0u8; 6];
        r.read_exact(&mut hw_addr)?;
        let mut pad2 = [0u8; 2];
        r.read_exact(&mut pad2)?;
        let config = PortConfig::from_bits_truncate(read_u32(r)?);
        let mask = PortConfig::from_bits_truncate(read_u32(r)?);
        let advertise = PortFeatures::from_bits_truncate(read_u32(r)?);
        r.read_exact(&mut pad4)?;
        Ok(PortMod {
            port_no,
            hw_addr,
            config,
            mask,
            advertise,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reserved_port_numbers_round_trip() {
        assert_eq!(PortNumber::from(0xffff_fffbu32), PortNumber::Flood);
        assert_eq!(u32::from(PortNumber::Flood), 0xffff_fffb);
        assert_eq!(PortNumber::from(3u32), PortNumber::Regular(3));
    }

    #[test]
    fn port_name_is_zero_padded_to_sixteen_bytes() {
        let port = Port {
            port_no: 1,
            hw_addr: [0, 1, 2, 3, 4, 5],
            name: "eth0".to_string(),
            config: PortConfig::empty(),
            state: PortState::LIVE,
            curr: PortFeatures::RATE_1GB_FD,
            advertised: PortFeatures::empty(),
            supported: PortFeatures::empty(),
            peer: PortFeatures::empty(),
            curr_speed: 1_000_000,
            max_speed: 1_000_000,
        };
        let mut buf = Vec::new();
        port.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), PORT_LEN);
        let decoded = Port::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, port);
    }
}
