//! Controller role negotiation (`RoleRequest`/`RoleReply`): lets several
//! controllers agree on who is master when more than one is connected to
//! the same datapath.
//!
//! `RoleStatus` (the asynchronous notification sent when a role changes
//! without a request, OpenFlow 1.4+) is out of scope for this OpenFlow
//! 1.3 build.

use std::io::{Read, Write};

use crate::codec::{read_u32, read_u64, write_u32, write_u64, ReadFrom, WriteTo};
use crate::error::Result;

enum_with_unknown! {
    pub enum ControllerRole(u32) {
        NoChange = 0,
        Equal = 1,
        Master = 2,
        Slave = 3,
    }
}

/// `generation_id` is ignored (`u64::MAX`) when `role` is `NoChange`, and
/// must otherwise be strictly greater than any previously accepted value;
/// the datapath rejects a stale one with `RoleRequestFailed`/`StaleId`.
pub const NO_GENERATION: u64 = u64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRequest {
    pub role: ControllerRole,
    pub generation_id: u64,
}

impl WriteTo for RoleRequest {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u32(w, self.role.into())?;
        w.write_all(&[0u8; 4])?;
        write_u64(w, self.generation_id)?;
        Ok(())
    }
}

impl ReadFrom for RoleRequest {
    fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let role = ControllerRole::from(read_u32(r)?);
        let mut pad = [0u8; 4];
        r.read_exact(&mut pad)?;
        let generation_id = read_u64(r)?;
        Ok(RoleRequest { role, generation_id })
    }
}

/// Same wire shape as [`RoleRequest`]: the datapath's confirmation of the
/// role it settled on.
pub type RoleReply = RoleRequest;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn role_request_round_trips() {
        let req = RoleRequest {
            role: ControllerRole::Master,
            generation_id: 7,
        };
        let mut buf = Vec::new();
        req.write_to(&mut buf).unwrap();
        let decoded = RoleRequest::read_from(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, req);
    }
}
