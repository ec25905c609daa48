//! Meters: rate-limit or remark traffic before it reaches a flow's
//! instructions.

use std::io::{Cursor, Read, Write};

use crate::codec::{read_u16, read_u32, read_u64, read_u8, write_u16, write_u32, write_u64, write_u8, ReadFrom, Tagged, WriteTo};
use crate::error::{Error, Result};

const T_DROP: u16 = 1;
const T_DSCP_REMARK: u16 = 2;
const T_EXPERIMENTER: u16 = 0xffff;

/// One band within a meter: the action taken once the meter's rate is
/// exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterBand {
    Drop { rate: u32, burst_size: u32 },
    DscpRemark { rate: u32, burst_size: u32, prec_level: u8 },
    Experimenter { rate: u32, burst_size: u32, experimenter: u32 },
}

impl MeterBand {
    fn type_tag(&self) -> u16 {
        match self {
            MeterBand::Drop { .. } => T_DROP,
            MeterBand::DscpRemark { .. } => T_DSCP_REMARK,
            MeterBand::Experimenter { .. } => T_EXPERIMENTER,
        }
    }
}

impl WriteTo for MeterBand {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        match *self {
            MeterBand::Drop { rate, burst_size } => {
                write_u16(w, self.type_tag())?;
                write_u16(w, 16)?;
                write_u32(w, rate)?;
                write_u32(w, burst_size)?;
                w.write_all(&[0u8; 4])?;
            }
            MeterBand::DscpRemark {
                rate,
                burst_size,
                prec_level,
            } => {
                write_u16(w, self.type_tag())?;
                write_u16(w, 16)?;
                write_u32(w, rate)?;
                write_u32(w, burst_size)?;
                write_u8(w, prec_level)?;
                w.write_all(&[0u8; 3])?;
            }
            MeterBand::Experimenter {
                rate,
                burst_size,
                experimenter,
            } => {
                write_u16(w, self.type_tag())?;
                write_u16(w, 16)?;
                write_u32(w, rate)?;
                write_u32(w, burst_size)?;
                write_u32(w, experimenter)?;
            }
        }
        Ok(())
    }
}

impl Tagged for MeterBand {
    fn decode_tagged(tag: u16, cur: &mut Cursor<&[u8]>) -> Result<Self> {
        let _ = read_u16(cur)?;
        let _len = read_u16(cur)?;
        let rate = read_u32(cur)?;
        let burst_size = read_u32(cur)?;
        Ok(match tag {
            T_DROP => {
                let mut pad = [0u8; 4];
                cur.read_exact(&mut pad)?;
                MeterBand::Drop { rate, burst_size }
            }
            T_DSCP_REMARK => {
                let prec_level = read_u8(cur)?;
                let mut pad = [0u8; 3];
                cur.read_exact(&mut pad)?;
                MeterBand::DscpRemark {
                    rate,
                    burst_size,
                    prec_level,
                }
            }
            T_EXPERIMENTER => {
                let experimenter = read_u32(cur)?;
                MeterBand::Experimenter {
                    rate,
                    burst_size,
                    experimenter,
                }
            }
            other => return Err(Error::decode(format!("unknown meter band type {other}"))),
        })
    }
}

enum_with_unknown! {
    pub enum MeterModCommand(u16) {
        Add = 0,
        Modify = 1,
        Delete = 2,
    }
}

bitflags::bitflags! {
    pub struct MeterFlags: u16 {
        const KBPS  = 1 << 0;
        const PKTPS = 1 << 1;
        const BURST = 1 << 2;
        const STATS = 1 << 3;
    }
}

/// Create, modify or delete a meter. Bands are not length-prefixed of
/// their own accord: the list runs to the end of the enclosing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterMod {
    pub command: MeterModCommand,
    pub flags: MeterFlags,
    pub meter_id: u32,
    pub bands: Vec<MeterBand>,
}

impl WriteTo for MeterMod {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u16(w, self.command.into())?;
        write_u16(w, self.flags.bits())?;
        write_u32(w, self.meter_id)?;
        for band in &self.bands {
            band.write_to(w)?;
        }
        Ok(())
    }
}

impl ReadFrom for MeterMod {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let command = MeterModCommand::from(read_u16(r)?);
        let flags = MeterFlags::from_bits_truncate(read_u16(r)?);
        let meter_id = read_u32(r)?;
        let mut rest = Vec::new();
        r.read_to_end(&mut rest)?;
        let bands = crate::codec::scan(&rest)?;
        Ok(MeterMod {
            command,
            flags,
            meter_id,
            bands,
        })
    }
}

/// Per-band counters trailing one [`MeterStats`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterBandStats {
    pub packet_band_count: u64,
    pub byte_band_count: u64,
}

impl WriteTo for MeterBandStats {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u64(w, self.packet_band_count)?;
        write_u64(w, self.byte_band_count)?;
        Ok(())
    }
}

/// One entry in a meter-stats multipart reply: the meter's aggregate
/// counters plus one [`MeterBandStats`] per band, trailing with no count
/// prefix of their own — their number falls out of this entry's own
/// `len` field, the same way `MeterMod::bands` falls out of the
/// enclosing message's length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterStats {
    pub meter_id: u32,
    pub flow_count: u32,
    pub packet_in_count: u64,
    pub byte_in_count: u64,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub band_stats: Vec<MeterBandStats>,
}

const METER_STATS_HEADER_LEN: usize = 40;

impl WriteTo for MeterStats {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let len = METER_STATS_HEADER_LEN + 16 * self.band_stats.len();
        write_u32(w, self.meter_id)?;
        write_u16(w, len as u16)?;
        w.write_all(&[0u8; 6])?;
        write_u32(w, self.flow_count)?;
        write_u64(w, self.packet_in_count)?;
        write_u64(w, self.byte_in_count)?;
        write_u32(w, self.duration_sec)?;
        write_u32(w, self.duration_nsec)?;
        for band in &self.band_stats {
            band.write_to(w)?;
        }
        Ok(())
    }
}

impl ReadFrom for MeterStats {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let meter_id = read_u32(r)?;
        let len = read_u16(r)? as usize;
        let mut pad = [0u8; 6];
        r.read_exact(&mut pad)?;
        let flow_count = read_u32(r)?;
        let packet_in_count = read_u64(r)?;
        let byte_in_count = read_u64(r)?;
        let duration_sec = read_u32(r)?;
        let duration_nsec = read_u32(r)?;
        if len < METER_STATS_HEADER_LEN {
            return Err(Error::decode("meter stats entry shorter than its own header"));
        }
        let band_bytes = len - METER_STATS_HEADER_LEN;
        if band_bytes % 16 != 0 {
            return Err(Error::decode("meter stats band section not a multiple of 16 bytes"));
        }
        let mut band_stats = Vec::with_capacity(band_bytes / 16);
        for _ in 0..band_bytes / 16 {
            band_stats.push(MeterBandStats {
                packet_band_count: read_u64(r)?,
                byte_band_count: read_u64(r)?,
            });
        }
        Ok(MeterStats {
            meter_id,
            flow_count,
            packet_in_count,
            byte_in_count,
            duration_sec,
            duration_nsec,
            band_stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn drop_band_round_trips() {
        let band = MeterBand::Drop {
            rate: 1000,
            burst_size: 0,
        };
        let mut buf = Vec::new();
        band.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 16);
        let decoded: Vec<MeterBand> = crate::codec::scan(&buf).unwrap();
        assert_eq!(decoded, vec![band]);
    }

    #[test]
    fn meter_mod_with_two_bands_round_trips() {
        let meter_mod = MeterMod {
            command: MeterModCommand::Add,
            flags: MeterFlags::KBPS | MeterFlags::BURST,
            meter_id: 1,
            bands: vec![
                MeterBand::Drop {
                    rate: 1000,
                    burst_size: 10,
                },
                MeterBand::DscpRemark {
                    rate: 2000,
                    burst_size: 20,
                    prec_level: 1,
                },
            ],
        };
        let mut buf = Vec::new();
        meter_mod.write_to(&mut buf).unwrap();
        let decoded = MeterMod::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, meter_mod);
    }

    #[test]
    fn meter_stats_round_trips_with_two_bands() {
        let stats = MeterStats {
            meter_id: 7,
            flow_count: 3,
            packet_in_count: 100,
            byte_in_count: 6400,
            duration_sec: 60,
            duration_nsec: 0,
            band_stats: vec![
                MeterBandStats {
                    packet_band_count: 40,
                    byte_band_count: 2560,
                },
                MeterBandStats {
                    packet_band_count: 60,
                    byte_band_count: 3840,
                },
            ],
        };
        let mut buf = Vec::new();
        stats.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 40 + 32);
        let decoded = MeterStats::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, stats);
    }

    #[test]
    fn meter_stats_with_no_bands_round_trips() {
        let stats = MeterStats {
            meter_id: 1,
            flow_count: 0,
            packet_in_count: 0,
            byte_in_count: 0,
            duration_sec: 0,
            duration_nsec: 0,
            band_stats: Vec::new(),
        };
        let mut buf = Vec::new();
        stats.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 40);
        let decoded = MeterStats::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, stats);
    }
}
