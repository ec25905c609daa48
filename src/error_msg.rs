//! The wire `Error` message (OpenFlow `Type::Error`), reporting that a
//! request failed. Named `ErrorMsg` to stay distinct from this crate's own
//! [`crate::error::Error`].

use std::io::{Read, Write};

use crate::codec::{read_u16, read_u32, write_u16, write_u32, ReadFrom, WriteTo};
use crate::error::Result;

enum_with_unknown! {
    pub enum ErrorType(u16) {
        HelloFailed = 0,
        BadRequest = 1,
        BadAction = 2,
        BadInstruction = 3,
        BadMatch = 4,
        FlowModFailed = 5,
        GroupModFailed = 6,
        PortModFailed = 7,
        TableModFailed = 8,
        QueueOpFailed = 9,
        SwitchConfigFailed = 10,
        RoleRequestFailed = 11,
        MeterModFailed = 12,
        TableFeaturesFailed = 13,
        Experimenter = 0xffff,
    }
}

/// Up to this many bytes of the offending request are echoed back in
/// `data`.
pub const MAX_ECHOED_BYTES: usize = 64;

/// Tells the sender of a request that it failed, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMsg {
    pub kind: ErrorType,
    pub code: u16,
    /// Up to [`MAX_ECHOED_BYTES`] of the request that provoked this error
    /// (header included), for correlation.
    pub data: Vec<u8>,
}

impl ErrorMsg {
    pub fn new(kind: ErrorType, code: u16, offending_request: &[u8]) -> Self {
        let cut = offending_request.len().min(MAX_ECHOED_BYTES);
        ErrorMsg {
            kind,
            code,
            data: offending_request[..cut].to_vec(),
        }
    }
}

impl WriteTo for ErrorMsg {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u16(w, self.kind.into())?;
        write_u16(w, self.code)?;
        w.write_all(&self.data)?;
        Ok(())
    }
}

impl ReadFrom for ErrorMsg {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let kind = ErrorType::from(read_u16(r)?);
        let code = read_u16(r)?;
        let mut data = Vec::new();
        r.read_to_end(&mut data)?;
        Ok(ErrorMsg { kind, code, data })
    }
}

/// An experimenter-defined error, carried under `ErrorType::Experimenter`
/// with a vendor id in place of the plain numeric code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimenterError {
    pub exp_type: u16,
    pub experimenter: u32,
    pub data: Vec<u8>,
}

impl WriteTo for ExperimenterError {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u16(w, ErrorType::Experimenter.into())?;
        write_u16(w, self.exp_type)?;
        write_u32(w, self.experimenter)?;
        w.write_all(&self.data)?;
        Ok(())
    }
}

impl ReadFrom for ExperimenterError {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let kind = ErrorType::from(read_u16(r)?);
        if kind != ErrorType::Experimenter {
            return Err(crate::error::Error::decode("not an experimenter error"));
        }
        let exp_type = read_u16(r)?;
        let experimenter = read_u32(r)?;
        let mut data = Vec::new();
        r.read_to_end(&mut data)?;
        Ok(ExperimenterError {
            exp_type,
            experimenter,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn error_echoes_truncated_offending_request() {
        let request = vec![0u8; 100];
        let err = ErrorMsg::new(ErrorType::BadRequest, 1, &request);
        assert_eq!(err.data.len(), MAX_ECHOED_BYTES);

        let mut buf = Vec::new();
        err.write_to(&mut buf).unwrap();
        let decoded = ErrorMsg::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, err);
    }
}
