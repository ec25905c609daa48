//! `ofp_action_header` and its variants: the operations a flow entry, group
//! bucket or packet-out can apply to a packet.

use std::io::{Cursor, Read, Write};

use crate::codec::{pad_len, read_u16, read_u32, read_u8, write_u16, write_u32, write_u8, ReadFrom, Tagged, WriteTo};
use crate::error::{Error, Result};
use crate::oxm::Xm;

const T_OUTPUT: u16 = 0;
const T_COPY_TTL_OUT: u16 = 11;
const T_COPY_TTL_IN: u16 = 12;
const T_SET_MPLS_TTL: u16 = 15;
const T_DEC_MPLS_TTL: u16 = 16;
const T_PUSH_VLAN: u16 = 17;
const T_POP_VLAN: u16 = 18;
const T_PUSH_MPLS: u16 = 19;
const T_POP_MPLS: u16 = 20;
const T_SET_QUEUE: u16 = 21;
const T_GROUP: u16 = 22;
const T_SET_NW_TTL: u16 = 23;
const T_DEC_NW_TTL: u16 = 24;
const T_SET_FIELD: u16 = 25;
const T_PUSH_PBB: u16 = 26;
const T_POP_PBB: u16 = 27;
const T_EXPERIMENTER: u16 = 0xffff;

/// A port number large enough to forward the whole, un-truncated packet to
/// the controller.
pub const NO_BUFFER_LEN: u16 = 0xffff;

/// One action a flow entry, bucket or packet-out may apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send to `port`, copying up to `max_len` bytes if `port` is the
    /// controller (`0xffff` = send the whole packet).
    Output { port: u32, max_len: u16 },
    CopyTtlOut,
    CopyTtlIn,
    SetMplsTtl(u8),
    DecMplsTtl,
    PushVlan(u16),
    PopVlan,
    PushMpls(u16),
    PopMpls(u16),
    SetQueue(u32),
    Group(u32),
    SetNwTtl(u8),
    DecNwTtl,
    SetField(Xm),
    PushPbb(u16),
    PopPbb,
    Experimenter { experimenter: u32, body: Vec<u8> },
}

impl Action {
    fn type_tag(&self) -> u16 {
        match self {
            Action::Output { .. } => T_OUTPUT,
            Action::CopyTtlOut => T_COPY_TTL_OUT,
            Action::CopyTtlIn => T_COPY_TTL_IN,
            Action::SetMplsTtl(_) => T_SET_MPLS_TTL,
            Action::DecMplsTtl => T_DEC_MPLS_TTL,
            Action::PushVlan(_) => T_PUSH_VLAN,
            Action::PopVlan => T_POP_VLAN,
            Action::PushMpls(_) => T_PUSH_MPLS,
            Action::PopMpls(_) => T_POP_MPLS,
            Action::SetQueue(_) => T_SET_QUEUE,
            Action::Group(_) => T_GROUP,
            Action::SetNwTtl(_) => T_SET_NW_TTL,
            Action::DecNwTtl => T_DEC_NW_TTL,
            Action::SetField(_) => T_SET_FIELD,
            Action::PushPbb(_) => T_PUSH_PBB,
            Action::PopPbb => T_POP_PBB,
            Action::Experimenter { .. } => T_EXPERIMENTER,
        }
    }
}

impl WriteTo for Action {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let mut body = Vec::new();
        match self {
            Action::Output { port, max_len } => {
                write_u32(&mut body, *port)?;
                write_u16(&mut body, *max_len)?;
                body.extend_from_slice(&[0u8; 6]);
            }
            Action::CopyTtlOut | Action::CopyTtlIn | Action::DecMplsTtl | Action::PopVlan | Action::DecNwTtl | Action::PopPbb => {
                body.extend_from_slice(&[0u8; 4]);
            }
            Action::SetMplsTtl(ttl) | Action::SetNwTtl(ttl) => {
                write_u8(&mut body, *ttl)?;
                body.extend_from_slice(&[0u8; 3]);
            }
            Action::PushVlan(ethertype) | Action::PushMpls(ethertype) | Action::PushPbb(ethertype) => {
                write_u16(&mut body, *ethertype)?;
                body.extend_from_slice(&[0u8; 2]);
            }
            Action::PopMpls(ethertype) => {
                write_u16(&mut body, *ethertype)?;
                body.extend_from_slice(&[0u8; 2]);
            }
            Action::SetQueue(queue_id) | Action::Group(queue_id) => {
                write_u32(&mut body, *queue_id)?;
            }
            Action::SetField(xm) => {
                let mut xm_buf = Vec::new();
                xm.write_to(&mut xm_buf)?;
                let pad = pad_len(4 + xm_buf.len());
                body.extend_from_slice(&xm_buf);
                body.extend(std::iter::repeat(0u8).take(pad));
            }
            Action::Experimenter { experimenter, body: data } => {
                write_u32(&mut body, *experimenter)?;
                body.extend_from_slice(data);
            }
        }
        let total = 4 + body.len();
        if total > u16::MAX as usize {
            return Err(Error::decode("action too long"));
        }
        write_u16(w, self.type_tag())?;
        write_u16(w, total as u16)?;
        w.write_all(&body)?;
        Ok(())
    }
}

impl Tagged for Action {
    fn decode_tagged(tag: u16, cur: &mut Cursor<&[u8]>) -> Result<Self> {
        // the variant's own decode re-reads tag+length, per the Tagged contract
        let _ = read_u16(cur)?;
        let len = read_u16(cur)? as usize;
        Ok(match tag {
            T_OUTPUT => {
                let port = read_u32(cur)?;
                let max_len = read_u16(cur)?;
                let mut pad = [0u8; 6];
                cur.read_exact(&mut pad)?;
                Action::Output { port, max_len }
            }
            T_COPY_TTL_OUT => {
                skip4(cur)?;
                Action::CopyTtlOut
            }
            T_COPY_TTL_IN => {
                skip4(cur)?;
                Action::CopyTtlIn
            }
            T_SET_MPLS_TTL => {
                let ttl = read_u8(cur)?;
                skip3(cur)?;
                Action::SetMplsTtl(ttl)
            }
            T_DEC_MPLS_TTL => {
                skip4(cur)?;
                Action::DecMplsTtl
            }
            T_PUSH_VLAN => {
                let ethertype = read_u16(cur)?;
                skip2(cur)?;
                Action::PushVlan(ethertype)
            }
            T_POP_VLAN => {
                skip4(cur)?;
                Action::PopVlan
            }
            T_PUSH_MPLS => {
                let ethertype = read_u16(cur)?;
                skip2(cur)?;
                Action::PushMpls(ethertype)
            }
            T_POP_MPLS => {
                let ethertype = read_u16(cur)?;
                skip2(cur)?;
                Action::PopMpls(ethertype)
            }
            T_SET_QUEUE => Action::SetQueue(read_u32(cur)?),
            T_GROUP => Action::Group(read_u32(cur)?),
            T_SET_NW_TTL => {
                let ttl = read_u8(cur)?;
                skip3(cur)?;
                Action::SetNwTtl(ttl)
            }
            T_DEC_NW_TTL => {
                skip4(cur)?;
                Action::DecNwTtl
            }
            T_SET_FIELD => {
                let xm_len = len - 4;
                let mut xm_buf = vec![0u8; xm_len];
                cur.read_exact(&mut xm_buf)?;
                let xm = Xm::read_from(&mut Cursor::new(&xm_buf[..]))?;
                let pad = pad_len(4 + xm_len);
                let mut padbuf = [0u8; 8];
                if pad > 0 {
                    cur.read_exact(&mut padbuf[..pad])?;
                }
                Action::SetField(xm)
            }
            T_PUSH_PBB => {
                let ethertype = read_u16(cur)?;
                skip2(cur)?;
                Action::PushPbb(ethertype)
            }
            T_POP_PBB => {
                skip4(cur)?;
                Action::PopPbb
            }
            T_EXPERIMENTER => {
                let experimenter = read_u32(cur)?;
                let body_len = len - 8;
                let mut body = vec![0u8; body_len];
                cur.read_exact(&mut body)?;
                Action::Experimenter { experimenter, body }
            }
            other => return Err(Error::decode(format!("unknown action type {other}"))),
        })
    }
}

fn skip4<R: Read>(r: &mut R) -> Result<()> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(())
}
fn skip3<R: Read>(r: &mut R) -> Result<()> {
    let mut b = [0u8; 3];
    r.read_exact(&mut b)?;
    Ok(())
}
fn skip2<R: Read>(r: &mut R) -> Result<()> {
    let mut b = [0u8; 2];
    r.read_exact(&mut b)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::scan;

    #[test]
    fn output_action_round_trips() {
        let action = Action::Output {
            port: 3,
            max_len: NO_BUFFER_LEN,
        };
        let mut buf = Vec::new();
        action.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 16);

        let decoded: Vec<Action> = scan(&buf).unwrap();
        assert_eq!(decoded, vec![action]);
    }

    #[test]
    fn set_field_action_round_trips_with_padding() {
        use crate::oxm::OxmField;
        let action = Action::SetField(Xm::new(OxmField::InPort, vec![0, 0, 0, 3]));
        let mut buf = Vec::new();
        action.write_to(&mut buf).unwrap();
        assert_eq!(buf.len() % 8, 0);

        let decoded: Vec<Action> = scan(&buf).unwrap();
        assert_eq!(decoded, vec![action]);
    }

    #[test]
    fn pop_vlan_and_dec_mpls_ttl_scan_back_to_back() {
        let mut buf = Vec::new();
        Action::PopVlan.write_to(&mut buf).unwrap();
        Action::DecMplsTtl.write_to(&mut buf).unwrap();
        let decoded: Vec<Action> = scan(&buf).unwrap();
        assert_eq!(decoded, vec![Action::PopVlan, Action::DecMplsTtl]);
    }
}
