//! `ofp_desc`: human-readable switch/vendor identification strings,
//! returned as the body of a `Desc` multipart reply.

use std::io::{Read, Write};

use crate::codec::{read_fixed_str, write_fixed_str, ReadFrom, WriteTo};
use crate::error::Result;

const DESC_STR_LEN: usize = 256;
const SERIAL_NUM_LEN: usize = 32;

/// Switch/vendor description strings. Every field is a fixed-width,
/// NUL-padded ASCII string on the wire, the same convention
/// [`crate::port::Port::name`] uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescStats {
    pub mfr_desc: String,
    pub hw_desc: String,
    pub sw_desc: String,
    pub serial_num: String,
    pub dp_desc: String,
}

impl WriteTo for DescStats {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_fixed_str(w, &self.mfr_desc, DESC_STR_LEN)?;
        write_fixed_str(w, &self.hw_desc, DESC_STR_LEN)?;
        write_fixed_str(w, &self.sw_desc, DESC_STR_LEN)?;
        write_fixed_str(w, &self.serial_num, SERIAL_NUM_LEN)?;
        write_fixed_str(w, &self.dp_desc, DESC_STR_LEN)?;
        Ok(())
    }
}

impl ReadFrom for DescStats {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        Ok(DescStats {
            mfr_desc: read_fixed_str(r, DESC_STR_LEN)?,
            hw_desc: read_fixed_str(r, DESC_STR_LEN)?,
            sw_desc: read_fixed_str(r, DESC_STR_LEN)?,
            serial_num: read_fixed_str(r, SERIAL_NUM_LEN)?,
            dp_desc: read_fixed_str(r, DESC_STR_LEN)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn desc_stats_round_trips_and_pads_to_fixed_width() {
        let desc = DescStats {
            mfr_desc: "Example Corp".to_string(),
            hw_desc: "Switch Model X".to_string(),
            sw_desc: "ofp13 0.1.0".to_string(),
            serial_num: "SN123".to_string(),
            dp_desc: "rack3-tor1".to_string(),
        };
        let mut buf = Vec::new();
        desc.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), DESC_STR_LEN * 3 + SERIAL_NUM_LEN + DESC_STR_LEN);
        let decoded = DescStats::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, desc);
    }
}
