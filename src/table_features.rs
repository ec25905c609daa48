//! `ofp_table_feature_prop_header` family: what a table supports, reported
//! in a table-features multipart reply.
//!
//! Each property comes in a plain and a `_MISS` flavor (what's legal on a
//! match versus what's legal in the table-miss entry); the low bit of the
//! type tag distinguishes them, which is why every variant here carries an
//! explicit `miss: bool` rather than being two separate enum variants.

use std::io::{Cursor, Read, Write};

use crate::codec::{pad_len, read_u16, read_u32, write_u16, write_u32, ReadFrom, Tagged, WriteTo};
use crate::error::{Error, Result};

const T_INSTRUCTIONS: u16 = 0;
const T_INSTRUCTIONS_MISS: u16 = 1;
const T_NEXT_TABLES: u16 = 2;
const T_NEXT_TABLES_MISS: u16 = 3;
const T_WRITE_ACTIONS: u16 = 4;
const T_WRITE_ACTIONS_MISS: u16 = 5;
const T_APPLY_ACTIONS: u16 = 6;
const T_APPLY_ACTIONS_MISS: u16 = 7;
const T_MATCH: u16 = 8;
const T_WILDCARDS: u16 = 10;
const T_WRITE_SETFIELD: u16 = 12;
const T_WRITE_SETFIELD_MISS: u16 = 13;
const T_APPLY_SETFIELD: u16 = 14;
const T_APPLY_SETFIELD_MISS: u16 = 15;
const T_EXPERIMENTER: u16 = 0xfffe;
const T_EXPERIMENTER_MISS: u16 = 0xffff;

bitflags::bitflags! {
    /// Meter band types a table can apply, encoded as a bitmap (`1 <<
    /// band_type`) rather than as a list of `ofp_meter_band_type` values.
    /// The wire spec describes both shapes for different multipart
    /// properties; this crate always uses the bitmap form, which is what
    /// `OFPTFPT_METER_TYPES`-equivalent deployments in the wild settled on.
    pub struct BandTypes: u32 {
        const DROP = 1 << 1;
        const DSCP_REMARK = 1 << 2;
    }
}

/// One table-feature property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableFeatureProp {
    Instructions { ids: Vec<u16>, miss: bool },
    NextTables { table_ids: Vec<u8>, miss: bool },
    WriteActions { action_ids: Vec<u16>, miss: bool },
    ApplyActions { action_ids: Vec<u16>, miss: bool },
    Match { oxm_ids: Vec<u16> },
    Wildcards { oxm_ids: Vec<u16> },
    WriteSetfield { oxm_ids: Vec<u16>, miss: bool },
    ApplySetfield { oxm_ids: Vec<u16>, miss: bool },
    Experimenter { experimenter: u32, miss: bool, data: Vec<u8> },
}

impl TableFeatureProp {
    fn type_tag(&self) -> u16 {
        match self {
            TableFeatureProp::Instructions { miss, .. } => if *miss { T_INSTRUCTIONS_MISS } else { T_INSTRUCTIONS },
            TableFeatureProp::NextTables { miss, .. } => if *miss { T_NEXT_TABLES_MISS } else { T_NEXT_TABLES },
            TableFeatureProp::WriteActions { miss, .. } => if *miss { T_WRITE_ACTIONS_MISS } else { T_WRITE_ACTIONS },
            TableFeatureProp::ApplyActions { miss, .. } => if *miss { T_APPLY_ACTIONS_MISS } else { T_APPLY_ACTIONS },
            TableFeatureProp::Match { .. } => T_MATCH,
            TableFeatureProp::Wildcards { .. } => T_WILDCARDS,
            TableFeatureProp::WriteSetfield { miss, .. } => if *miss { T_WRITE_SETFIELD_MISS } else { T_WRITE_SETFIELD },
            TableFeatureProp::ApplySetfield { miss, .. } => if *miss { T_APPLY_SETFIELD_MISS } else { T_APPLY_SETFIELD },
            TableFeatureProp::Experimenter { miss, .. } => if *miss { T_EXPERIMENTER_MISS } else { T_EXPERIMENTER },
        }
    }
}

fn write_u16_ids<W: Write>(w: &mut W, tag: u16, ids: &[u16]) -> Result<()> {
    let body_len = ids.len() * 2;
    let total = 4 + body_len;
    write_u16(w, tag)?;
    write_u16(w, total as u16)?;
    for id in ids {
        write_u16(w, *id)?;
    }
    let pad = pad_len(total);
    if pad > 0 {
        w.write_all(&vec![0u8; pad])?;
    }
    Ok(())
}

fn write_u8_ids<W: Write>(w: &mut W, tag: u16, ids: &[u8]) -> Result<()> {
    let total = 4 + ids.len();
    write_u16(w, tag)?;
    write_u16(w, total as u16)?;
    w.write_all(ids)?;
    let pad = pad_len(total);
    if pad > 0 {
        w.write_all(&vec![0u8; pad])?;
    }
    Ok(())
}

impl WriteTo for TableFeatureProp {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let tag = self.type_tag();
        match self {
            TableFeatureProp::Instructions { ids, .. } => write_u16_ids(w, tag, ids)?,
            TableFeatureProp::NextTables { table_ids, .. } => write_u8_ids(w, tag, table_ids)?,
            TableFeatureProp::WriteActions { action_ids, .. }
            | TableFeatureProp::ApplyActions { action_ids, .. } => write_u16_ids(w, tag, action_ids)?,
            TableFeatureProp::Match { oxm_ids }
            | TableFeatureProp::Wildcards { oxm_ids }
            | TableFeatureProp::WriteSetfield { oxm_ids, .. }
            | TableFeatureProp::ApplySetfield { oxm_ids, .. } => write_u16_ids(w, tag, oxm_ids)?,
            TableFeatureProp::Experimenter { experimenter, data, .. } => {
                let total = 8 + data.len();
                write_u16(w, tag)?;
                write_u16(w, total as u16)?;
                write_u32(w, *experimenter)?;
                w.write_all(data)?;
                let pad = pad_len(total);
                if pad > 0 {
                    w.write_all(&vec![0u8; pad])?;
                }
            }
        }
        Ok(())
    }
}

impl Tagged for TableFeatureProp {
    fn decode_tagged(tag: u16, cur: &mut Cursor<&[u8]>) -> Result<Self> {
        let _ = read_u16(cur)?;
        let len = read_u16(cur)? as usize;
        let body_len = len - 4;
        let prop = match tag {
            T_INSTRUCTIONS | T_INSTRUCTIONS_MISS => {
                let ids = read_u16_list(cur, body_len)?;
                TableFeatureProp::Instructions { ids, miss: tag == T_INSTRUCTIONS_MISS }
            }
            T_NEXT_TABLES | T_NEXT_TABLES_MISS => {
                let mut table_ids = vec![0u8; body_len];
                cur.read_exact(&mut table_ids)?;
                TableFeatureProp::NextTables { table_ids, miss: tag == T_NEXT_TABLES_MISS }
            }
            T_WRITE_ACTIONS | T_WRITE_ACTIONS_MISS => {
                let action_ids = read_u16_list(cur, body_len)?;
                TableFeatureProp::WriteActions { action_ids, miss: tag == T_WRITE_ACTIONS_MISS }
            }
            T_APPLY_ACTIONS | T_APPLY_ACTIONS_MISS => {
                let action_ids = read_u16_list(cur, body_len)?;
                TableFeatureProp::ApplyActions { action_ids, miss: tag == T_APPLY_ACTIONS_MISS }
            }
            T_MATCH => TableFeatureProp::Match {
                oxm_ids: read_u16_list(cur, body_len)?,
            },
            T_WILDCARDS => TableFeatureProp::Wildcards {
                oxm_ids: read_u16_list(cur, body_len)?,
            },
            T_WRITE_SETFIELD | T_WRITE_SETFIELD_MISS => TableFeatureProp::WriteSetfield {
                oxm_ids: read_u16_list(cur, body_len)?,
                miss: tag == T_WRITE_SETFIELD_MISS,
            },
            T_APPLY_SETFIELD | T_APPLY_SETFIELD_MISS => TableFeatureProp::ApplySetfield {
                oxm_ids: read_u16_list(cur, body_len)?,
                miss: tag == T_APPLY_SETFIELD_MISS,
            },
            T_EXPERIMENTER | T_EXPERIMENTER_MISS => {
                let experimenter = read_u32(cur)?;
                let mut data = vec![0u8; body_len - 4];
                cur.read_exact(&mut data)?;
                TableFeatureProp::Experimenter {
                    experimenter,
                    miss: tag == T_EXPERIMENTER_MISS,
                    data,
                }
            }
            other => return Err(Error::decode(format!("unknown table feature property type {other}"))),
        };
        let pad = pad_len(len);
        if pad > 0 {
            let mut padbuf = [0u8; 8];
            cur.read_exact(&mut padbuf[..pad])?;
        }
        Ok(prop)
    }
}

fn read_u16_list<R: Read>(r: &mut R, body_len: usize) -> Result<Vec<u16>> {
    if body_len % 2 != 0 {
        return Err(Error::decode("odd-length id list"));
    }
    let mut ids = Vec::with_capacity(body_len / 2);
    for _ in 0..body_len / 2 {
        ids.push(read_u16(r)?);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::scan;

    #[test]
    fn instructions_property_round_trips_padded() {
        let prop = TableFeatureProp::Instructions {
            ids: vec![1, 4],
            miss: false,
        };
        let mut buf = Vec::new();
        prop.write_to(&mut buf).unwrap();
        assert_eq!(buf.len() % 8, 0);
        let decoded: Vec<TableFeatureProp> = scan(&buf).unwrap();
        assert_eq!(decoded, vec![prop]);
    }

    #[test]
    fn next_tables_miss_variant_round_trips() {
        let prop = TableFeatureProp::NextTables {
            table_ids: vec![1, 2, 3],
            miss: true,
        };
        let mut buf = Vec::new();
        prop.write_to(&mut buf).unwrap();
        let decoded: Vec<TableFeatureProp> = scan(&buf).unwrap();
        assert_eq!(decoded, vec![prop]);
    }

    #[test]
    fn band_types_bitmap_round_trips() {
        let types = BandTypes::DROP | BandTypes::DSCP_REMARK;
        assert_eq!(types.bits(), 0b0000_0110);
    }
}
