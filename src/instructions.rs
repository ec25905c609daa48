//! `ofp_instruction_header` and its variants: what a flow entry does with
//! matched packets, one pipeline stage at a time.

use std::io::{Cursor, Read, Write};

use crate::actions::Action;
use crate::codec::{read_u16, read_u32, read_u64, read_u8, scan, write_u16, write_u32, write_u64, write_u8, Tagged, WriteTo};
use crate::error::{Error, Result};

const T_GOTO_TABLE: u16 = 1;
const T_WRITE_METADATA: u16 = 2;
const T_WRITE_ACTIONS: u16 = 3;
const T_APPLY_ACTIONS: u16 = 4;
const T_CLEAR_ACTIONS: u16 = 5;
const T_METER: u16 = 6;
const T_EXPERIMENTER: u16 = 0xffff;

/// One pipeline instruction attached to a flow entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    GotoTable(u8),
    WriteMetadata { metadata: u64, mask: u64 },
    WriteActions(Vec<Action>),
    ApplyActions(Vec<Action>),
    ClearActions,
    Meter(u32),
    Experimenter { experimenter: u32, body: Vec<u8> },
}

impl Instruction {
    fn type_tag(&self) -> u16 {
        match self {
            Instruction::GotoTable(_) => T_GOTO_TABLE,
            Instruction::WriteMetadata { .. } => T_WRITE_METADATA,
            Instruction::WriteActions(_) => T_WRITE_ACTIONS,
            Instruction::ApplyActions(_) => T_APPLY_ACTIONS,
            Instruction::ClearActions => T_CLEAR_ACTIONS,
            Instruction::Meter(_) => T_METER,
            Instruction::Experimenter { .. } => T_EXPERIMENTER,
        }
    }
}

impl WriteTo for Instruction {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let mut body = Vec::new();
        match self {
            Instruction::GotoTable(table_id) => {
                write_u8(&mut body, *table_id)?;
                body.extend_from_slice(&[0u8; 3]);
            }
            Instruction::WriteMetadata { metadata, mask } => {
                body.extend_from_slice(&[0u8; 4]);
                write_u64(&mut body, *metadata)?;
                write_u64(&mut body, *mask)?;
            }
            Instruction::WriteActions(actions) | Instruction::ApplyActions(actions) => {
                body.extend_from_slice(&[0u8; 4]);
                for action in actions {
                    action.write_to(&mut body)?;
                }
            }
            Instruction::ClearActions => {
                body.extend_from_slice(&[0u8; 4]);
            }
            Instruction::Meter(meter_id) => {
                write_u32(&mut body, *meter_id)?;
            }
            Instruction::Experimenter { experimenter, body: data } => {
                write_u32(&mut body, *experimenter)?;
                body.extend_from_slice(data);
            }
        }
        let total = 4 + body.len();
        if total > u16::MAX as usize {
            return Err(Error::decode("instruction too long"));
        }
        write_u16(w, self.type_tag())?;
        write_u16(w, total as u16)?;
        w.write_all(&body)?;
        Ok(())
    }
}

impl Tagged for Instruction {
    fn decode_tagged(tag: u16, cur: &mut Cursor<&[u8]>) -> Result<Self> {
        let _ = read_u16(cur)?;
        let len = read_u16(cur)? as usize;
        Ok(match tag {
            T_GOTO_TABLE => {
                let table_id = read_u8(cur)?;
                let mut pad = [0u8; 3];
                cur.read_exact(&mut pad)?;
                Instruction::GotoTable(table_id)
            }
            T_WRITE_METADATA => {
                let mut pad = [0u8; 4];
                cur.read_exact(&mut pad)?;
                let metadata = read_u64(cur)?;
                let mask = read_u64(cur)?;
                Instruction::WriteMetadata { metadata, mask }
            }
            T_WRITE_ACTIONS | T_APPLY_ACTIONS => {
                let mut pad = [0u8; 4];
                cur.read_exact(&mut pad)?;
                let actions_len = len - 8;
                let mut actions_buf = vec![0u8; actions_len];
                cur.read_exact(&mut actions_buf)?;
                let actions: Vec<Action> = scan(&actions_buf)?;
                if tag == T_WRITE_ACTIONS {
                    Instruction::WriteActions(actions)
                } else {
                    Instruction::ApplyActions(actions)
                }
            }
            T_CLEAR_ACTIONS => {
                let mut pad = [0u8; 4];
                cur.read_exact(&mut pad)?;
                Instruction::ClearActions
            }
            T_METER => Instruction::Meter(read_u32(cur)?),
            T_EXPERIMENTER => {
                let experimenter = read_u32(cur)?;
                let body_len = len - 8;
                let mut body = vec![0u8; body_len];
                cur.read_exact(&mut body)?;
                Instruction::Experimenter { experimenter, body }
            }
            other => return Err(Error::decode(format!("unknown instruction type {other}"))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::scan;

    #[test]
    fn clear_actions_round_trips() {
        let inst = Instruction::ClearActions;
        let mut buf = Vec::new();
        inst.write_to(&mut buf).unwrap();
        assert_eq!(buf, vec![0x00, 0x05, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00]);

        let decoded: Vec<Instruction> = scan(&buf).unwrap();
        assert_eq!(decoded, vec![inst]);
    }

    #[test]
    fn apply_actions_wraps_nested_actions() {
        let inst = Instruction::ApplyActions(vec![Action::Output {
            port: 3,
            max_len: 0xffff,
        }]);
        let mut buf = Vec::new();
        inst.write_to(&mut buf).unwrap();
        let decoded: Vec<Instruction> = scan(&buf).unwrap();
        assert_eq!(decoded, vec![inst]);
    }

    #[test]
    fn goto_table_round_trips() {
        let inst = Instruction::GotoTable(5);
        let mut buf = Vec::new();
        inst.write_to(&mut buf).unwrap();
        let decoded: Vec<Instruction> = scan(&buf).unwrap();
        assert_eq!(decoded, vec![inst]);
    }
}
