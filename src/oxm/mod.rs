//! OXM (OpenFlow eXtensible Match): the type-length-value encoding used by
//! every flow match.
//!
//! ```no_rust
//! 0                       16             23  24             32
//! +------------------------+-------------+----+-------------+
//! |       oxm_class        |  oxm_field  | HM |  oxm_length |
//! +------------------------+-------------+----+-------------+
//! |                     value and/or mask                   |
//! |                      (variable size)                    |
//! +---------------------------------------------------------+
//! ```
//!
//! `oxm_class` and `oxm_field` together select what the value means;
//! `HM` ("has mask") is the low bit of the field byte, and doubles the
//! payload length when set (value, then an equal-length mask).

mod field;
mod match_;

pub use field::OxmField;
pub use match_::{Match, MatchType};

use std::io::{Read, Write};

use crate::codec::{read_u16, read_u8, write_u16, write_u8, ReadFrom, WriteTo};
use crate::error::{Error, Result};

enum_with_unknown! {
    /// The `oxm_class` field: which namespace `oxm_field` is drawn from.
    pub enum OxmClass(u16) {
        Nxm0 = 0x0000,
        Nxm1 = 0x0001,
        OpenFlowBasic = 0x8000,
        Experimenter = 0xffff,
    }
}

/// One extensible-match field: `{class, field, has_mask, value, mask?}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xm {
    pub class: OxmClass,
    pub field: OxmField,
    pub value: Vec<u8>,
    pub mask: Option<Vec<u8>>,
}

impl Xm {
    pub fn new(field: OxmField, value: Vec<u8>) -> Self {
        Xm {
            class: OxmClass::OpenFlowBasic,
            field,
            value,
            mask: None,
        }
    }

    pub fn with_mask(field: OxmField, value: Vec<u8>, mask: Vec<u8>) -> Self {
        Xm {
            class: OxmClass::OpenFlowBasic,
            field,
            value,
            mask: Some(mask),
        }
    }

    pub fn has_mask(&self) -> bool {
        self.mask.is_some()
    }

    /// Total wire length of this XM, header included.
    pub fn wire_len(&self) -> usize {
        4 + self.value.len() + self.mask.as_ref().map_or(0, |m| m.len())
    }
}

impl WriteTo for Xm {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u16(w, self.class.into())?;
        let field_u8: u8 = self.field.into();
        let type_and_mask = (field_u8 << 1) | (self.has_mask() as u8);
        write_u8(w, type_and_mask)?;
        let payload_len = self.value.len() + self.mask.as_ref().map_or(0, |m| m.len());
        if payload_len > u8::MAX as usize {
            return Err(Error::decode("XM payload too long"));
        }
        write_u8(w, payload_len as u8)?;
        w.write_all(&self.value)?;
        if let Some(mask) = &self.mask {
            w.write_all(mask)?;
        }
        Ok(())
    }
}

impl ReadFrom for Xm {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let class = OxmClass::from(read_u16(r)?);
        let type_and_mask = read_u8(r)?;
        let has_mask = type_and_mask & 0x01 == 1;
        let field = OxmField::from(type_and_mask >> 1);
        let len = read_u8(r)? as usize;
        let mut payload = vec![0u8; len];
        r.read_exact(&mut payload)?;
        let (value, mask) = if has_mask {
            if len % 2 != 0 {
                return Err(Error::decode("masked XM payload must split evenly"));
            }
            let half = len / 2;
            (payload[..half].to_vec(), Some(payload[half..].to_vec()))
        } else {
            (payload, None)
        };
        Ok(Xm {
            class,
            field,
            value,
            mask,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn unmasked_xm_has_low_bit_clear_and_payload_equals_value_len() {
        let xm = Xm::new(OxmField::InPort, vec![0, 0, 0, 3]);
        let mut buf = Vec::new();
        xm.write_to(&mut buf).unwrap();
        assert_eq!(buf[2] & 0x01, 0);
        assert_eq!(buf[3] as usize, xm.value.len());

        let decoded = Xm::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, xm);
    }

    #[test]
    fn masked_xm_has_low_bit_set_and_payload_is_double_value_len() {
        let xm = Xm::with_mask(OxmField::Ipv4Src, vec![10, 0, 0, 0], vec![255, 255, 255, 0]);
        let mut buf = Vec::new();
        xm.write_to(&mut buf).unwrap();
        assert_eq!(buf[2] & 0x01, 1);
        assert_eq!(buf[3] as usize, 2 * xm.value.len());

        let decoded = Xm::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, xm);
    }
}
