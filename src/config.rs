//! Switch configuration: fragment-reassembly policy and the
//! `miss_send_len` that bounds how much of an unmatched packet gets
//! copied into a `PacketIn`.

use std::io::{Read, Write};

use crate::codec::{read_u16, write_u16, ReadFrom, WriteTo};
use crate::error::Result;

enum_with_unknown! {
    pub enum FragmentHandling(u16) {
        Normal = 0,
        Drop = 1,
        Reassemble = 2,
        MaskOnly = 3,
    }
}

/// `miss_send_len` asking the datapath to copy the entire packet.
pub const SEND_FULL_PACKET: u16 = 0xffff;

/// Shared by `GetConfigReply` and `SetConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchConfig {
    pub flags: FragmentHandling,
    pub miss_send_len: u16,
}

impl WriteTo for SwitchConfig {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u16(w, self.flags.into())?;
        write_u16(w, self.miss_send_len)?;
        Ok(())
    }
}

impl ReadFrom for SwitchConfig {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let flags = FragmentHandling::from(read_u16(r)?);
        let miss_send_len = read_u16(r)?;
        Ok(SwitchConfig { flags, miss_send_len })
    }
}

/// Marker request: carries no body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetConfigRequest;

impl WriteTo for GetConfigRequest {
    fn write_to<W: Write>(&self, _w: &mut W) -> Result<()> {
        Ok(())
    }
}

impl ReadFrom for GetConfigRequest {
    fn read_from<R: Read>(_r: &mut R) -> Result<Self> {
        Ok(GetConfigRequest)
    }
}

pub type GetConfigReply = SwitchConfig;
pub type SetConfig = SwitchConfig;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn switch_config_round_trips() {
        let cfg = SwitchConfig {
            flags: FragmentHandling::Normal,
            miss_send_len: SEND_FULL_PACKET,
        };
        let mut buf = Vec::new();
        cfg.write_to(&mut buf).unwrap();
        assert_eq!(buf, vec![0x00, 0x00, 0xff, 0xff]);
        let decoded = SwitchConfig::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, cfg);
    }
}
