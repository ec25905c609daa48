//! `PacketOut`: inject a packet into the datapath pipeline, either a fresh
//! one or one previously buffered there.

use std::io::{Read, Write};

use crate::actions::Action;
use crate::codec::{read_u16, read_u32, write_u16, write_u32, ReadFrom, WriteTo};
use crate::error::{Error, Result};
use crate::port::NO_BUFFER;

/// Send a packet out, running it through `actions` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketOut {
    /// [`NO_BUFFER`] when `frame` carries the packet itself.
    pub buffer_id: u32,
    pub in_port: u32,
    pub actions: Vec<Action>,
    /// Empty when `buffer_id` refers to a packet already buffered on the
    /// switch.
    pub frame: Vec<u8>,
}

impl PacketOut {
    pub fn is_buffered(&self) -> bool {
        self.buffer_id != NO_BUFFER
    }
}

impl WriteTo for PacketOut {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let mut actions_buf = Vec::new();
        for action in &self.actions {
            action.write_to(&mut actions_buf)?;
        }
        if actions_buf.len() > u16::MAX as usize {
            return Err(Error::decode("actions too long"));
        }
        write_u32(w, self.buffer_id)?;
        write_u32(w, self.in_port)?;
        write_u16(w, actions_buf.len() as u16)?;
        w.write_all(&[0u8; 6])?;
        w.write_all(&actions_buf)?;
        w.write_all(&self.frame)?;
        Ok(())
    }
}

impl ReadFrom for PacketOut {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let buffer_id = read_u32(r)?;
        let in_port = read_u32(r)?;
        let actions_len = read_u16(r)? as usize;
        let mut pad = [0u8; 6];
        r.read_exact(&mut pad)?;
        let mut actions_buf = vec![0u8; actions_len];
        r.read_exact(&mut actions_buf)?;
        let actions = crate::codec::scan(&actions_buf)?;
        let mut frame = Vec::new();
        r.read_to_end(&mut frame)?;
        Ok(PacketOut {
            buffer_id,
            in_port,
            actions,
            frame,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortNumber;
    use std::io::Cursor;

    #[test]
    fn packet_out_with_output_action_round_trips() {
        let packet_out = PacketOut {
            buffer_id: NO_BUFFER,
            in_port: PortNumber::Controller.into(),
            actions: vec![Action::Output {
                port: PortNumber::Flood.into(),
                max_len: 0,
            }],
            frame: vec![0x11, 0x22, 0x33],
        };
        let mut buf = Vec::new();
        packet_out.write_to(&mut buf).unwrap();
        let decoded = PacketOut::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, packet_out);
        assert!(!decoded.is_buffered());
    }
}
