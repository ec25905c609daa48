//! `FeaturesRequest`/`FeaturesReply`: the switch's identity, capability
//! bitmap and initial port list, exchanged right after the `Hello`
//! handshake.

use std::io::{Read, Write};

use crate::codec::{read_u32, read_u64, read_u8, write_u32, write_u64, write_u8, ReadFrom, WriteTo};
use crate::error::Result;
use crate::port::Port;

bitflags::bitflags! {
    pub struct Capabilities: u32 {
        const FLOW_STATS = 1 << 0;
        const TABLE_STATS = 1 << 1;
        const PORT_STATS = 1 << 2;
        const GROUP_STATS = 1 << 3;
        const IP_REASM = 1 << 5;
        const QUEUE_STATS = 1 << 6;
        const PORT_BLOCKED = 1 << 8;
    }
}

/// Marker request: carries no body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeaturesRequest;

impl WriteTo for FeaturesRequest {
    fn write_to<W: Write>(&self, _w: &mut W) -> Result<()> {
        Ok(())
    }
}

impl ReadFrom for FeaturesRequest {
    fn read_from<R: Read>(_r: &mut R) -> Result<Self> {
        Ok(FeaturesRequest)
    }
}

/// The switch's identity and capabilities, in reply to
/// [`FeaturesRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturesReply {
    pub datapath_id: u64,
    pub n_buffers: u32,
    pub n_tables: u8,
    pub auxiliary_id: u8,
    pub capabilities: Capabilities,
    pub ports: Vec<Port>,
}

impl WriteTo for FeaturesReply {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u64(w, self.datapath_id)?;
        write_u32(w, self.n_buffers)?;
        write_u8(w, self.n_tables)?;
        write_u8(w, self.auxiliary_id)?;
        w.write_all(&[0u8; 2])?;
        write_u32(w, self.capabilities.bits())?;
        w.write_all(&[0u8; 4])?; // reserved
        for port in &self.ports {
            port.write_to(w)?;
        }
        Ok(())
    }
}

impl ReadFrom for FeaturesReply {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let datapath_id = read_u64(r)?;
        let n_buffers = read_u32(r)?;
        let n_tables = read_u8(r)?;
        let auxiliary_id = read_u8(r)?;
        let mut pad2 = [0u8; 2];
        r.read_exact(&mut pad2)?;
        let capabilities = Capabilities::from_bits_truncate(read_u32(r)?);
        let mut reserved = [0u8; 4];
        r.read_exact(&mut reserved)?;
        let mut ports = Vec::new();
        loop {
            match Port::read_from(r) {
                Ok(port) => ports.push(port),
                Err(e) if e.is_clean_eof() => break,
                Err(e) => return Err(e),
            }
        }
        Ok(FeaturesReply {
            datapath_id,
            n_buffers,
            n_tables,
            auxiliary_id,
            capabilities,
            ports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{PortConfig, PortFeatures, PortState};
    use std::io::Cursor;

    #[test]
    fn features_reply_round_trips_with_one_port() {
        let reply = FeaturesReply {
            datapath_id: 0x0102030405060708,
            n_buffers: 256,
            n_tables: 254,
            auxiliary_id: 0,
            capabilities: Capabilities::FLOW_STATS | Capabilities::PORT_STATS,
            ports: vec![Port {
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
            }],
        };
        let mut buf = Vec::new();
        reply.write_to(&mut buf).unwrap();
        let decoded = FeaturesReply::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, reply);
    }
}
