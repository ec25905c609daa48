//! Queues: per-port QoS configuration, as reported by
//! `QueueGetConfigReply`.

use std::io::{Cursor, Read, Write};

use crate::codec::{read_u16, read_u32, read_u64, write_u16, write_u32, write_u64, ReadFrom, Tagged, WriteTo};
use crate::error::{Error, Result};

const T_MIN_RATE: u16 = 1;
const T_MAX_RATE: u16 = 2;
const T_EXPERIMENTER: u16 = 0xffff;

/// A rate fraction in the range `[0, 1000]`; `0xffff` means "disabled".
pub const RATE_DISABLED: u16 = 0xffff;

/// One property of a queue's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueProp {
    MinRate(u16),
    MaxRate(u16),
    Experimenter { experimenter: u32, data: u64 },
}

impl QueueProp {
    fn type_tag(&self) -> u16 {
        match self {
            QueueProp::MinRate(_) => T_MIN_RATE,
            QueueProp::MaxRate(_) => T_MAX_RATE,
            QueueProp::Experimenter { .. } => T_EXPERIMENTER,
        }
    }
}

impl WriteTo for QueueProp {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        match *self {
            QueueProp::MinRate(rate) | QueueProp::MaxRate(rate) => {
                write_u16(w, self.type_tag())?;
                write_u16(w, 16)?;
                w.write_all(&[0u8; 4])?;
                write_u16(w, rate)?;
                w.write_all(&[0u8; 6])?;
            }
            QueueProp::Experimenter { experimenter, data } => {
                write_u16(w, self.type_tag())?;
                write_u16(w, 24)?;
                w.write_all(&[0u8; 4])?;
                write_u32(w, experimenter)?;
                w.write_all(&[0u8; 4])?;
                write_u64(w, data)?;
            }
        }
        Ok(())
    }
}

impl Tagged for QueueProp {
    fn decode_tagged(tag: u16, cur: &mut Cursor<&[u8]>) -> Result<Self> {
        let _ = read_u16(cur)?;
        let _len = read_u16(cur)?;
        let mut pad = [0u8; 4];
        cur.read_exact(&mut pad)?;
        Ok(match tag {
            T_MIN_RATE | T_MAX_RATE => {
                let rate = read_u16(cur)?;
                let mut tail = [0u8; 6];
                cur.read_exact(&mut tail)?;
                if tag == T_MIN_RATE {
                    QueueProp::MinRate(rate)
                } else {
                    QueueProp::MaxRate(rate)
                }
            }
            T_EXPERIMENTER => {
                let experimenter = read_u32(cur)?;
                let mut tail = [0u8; 4];
                cur.read_exact(&mut tail)?;
                let data = read_u64(cur)?;
                QueueProp::Experimenter { experimenter, data }
            }
            other => return Err(Error::decode(format!("unknown queue property type {other}"))),
        })
    }
}

/// One queue's full configuration: its id and the properties attached to
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketQueue {
    pub queue_id: u32,
    pub port: u32,
    pub properties: Vec<QueueProp>,
}

impl WriteTo for PacketQueue {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let mut body = Vec::new();
        for prop in &self.properties {
            prop.write_to(&mut body)?;
        }
        let len = 16 + body.len();
        write_u32(w, self.queue_id)?;
        write_u32(w, self.port)?;
        write_u16(w, len as u16)?;
        w.write_all(&[0u8; 6])?;
        w.write_all(&body)?;
        Ok(())
    }
}

impl ReadFrom for PacketQueue {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let queue_id = read_u32(r)?;
        let port = read_u32(r)?;
        let len = read_u16(r)? as usize;
        let mut pad = [0u8; 6];
        r.read_exact(&mut pad)?;
        let mut body = vec![0u8; len - 16];
        r.read_exact(&mut body)?;
        let properties = crate::codec::scan(&body)?;
        Ok(PacketQueue { queue_id, port, properties })
    }
}

/// Request a port's queue configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueGetConfigRequest {
    pub port: u32,
}

impl WriteTo for QueueGetConfigRequest {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u32(w, self.port)?;
        w.write_all(&[0u8; 4])?;
        Ok(())
    }
}

impl ReadFrom for QueueGetConfigRequest {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let port = read_u32(r)?;
        let mut pad = [0u8; 4];
        r.read_exact(&mut pad)?;
        Ok(QueueGetConfigRequest { port })
    }
}

/// A port's queues, as reported in reply to [`QueueGetConfigRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueGetConfigReply {
    pub port: u32,
    pub queues: Vec<PacketQueue>,
}

impl WriteTo for QueueGetConfigReply {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u32(w, self.port)?;
        w.write_all(&[0u8; 4])?;
        for queue in &self.queues {
            queue.write_to(w)?;
        }
        Ok(())
    }
}

impl ReadFrom for QueueGetConfigReply {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let port = read_u32(r)?;
        let mut pad = [0u8; 4];
        r.read_exact(&mut pad)?;
        let mut rest = Vec::new();
        r.read_to_end(&mut rest)?;
        let mut queues = Vec::new();
        let mut cur = Cursor::new(&rest[..]);
        while (cur.position() as usize) < rest.len() {
            queues.push(PacketQueue::read_from(&mut cur)?);
        }
        Ok(QueueGetConfigReply { port, queues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_with_min_and_max_rate_round_trips() {
        let queue = PacketQueue {
            queue_id: 1,
            port: 3,
            properties: vec![QueueProp::MinRate(100), QueueProp::MaxRate(500)],
        };
        let mut buf = Vec::new();
        queue.write_to(&mut buf).unwrap();
        let decoded = PacketQueue::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, queue);
    }

    #[test]
    fn get_config_reply_with_no_queues_round_trips() {
        let reply = QueueGetConfigReply { port: 3, queues: vec![] };
        let mut buf = Vec::new();
        reply.write_to(&mut buf).unwrap();
        let decoded = QueueGetConfigReply::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, reply);
    }
}
