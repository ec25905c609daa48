//! [`Body`]: a fully-typed view over a [`Request`], decoded according to
//! its header's message type. Handlers that want structure can call
//! [`Body::decode`]; handlers that only care about specific bytes (or
//! want to stay generic, like the cookie correlator) keep working
//! directly off `Request::body()`.

use crate::config::{GetConfigRequest, SwitchConfig};
use crate::error::{Error, Result};
use crate::error_msg::ErrorMsg;
use crate::features::{FeaturesReply, FeaturesRequest};
use crate::flow::{FlowMod, FlowRemoved};
use crate::group::GroupMod;
use crate::hello::Hello;
use crate::header::Type;
use crate::meter::MeterMod;
use crate::multipart::Multipart;
use crate::packet_in::PacketIn;
use crate::packet_out::PacketOut;
use crate::port::{PortMod, PortStatus};
use crate::queue::{QueueGetConfigReply, QueueGetConfigRequest};
use crate::request::Request;
use crate::role::{RoleReply, RoleRequest};
use crate::async_config::AsyncConfig;
use crate::codec::ReadFrom;

/// A request body decoded according to its declared message type.
///
/// `EchoRequest`/`EchoReply`/`BarrierRequest`/`BarrierReply` carry an
/// opaque payload on the wire (an arbitrary echoed blob, or nothing) and
/// so are represented as their raw bytes rather than a dedicated type.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Hello(Hello),
    Error(ErrorMsg),
    EchoRequest(Vec<u8>),
    EchoReply(Vec<u8>),
    FeaturesRequest(FeaturesRequest),
    FeaturesReply(FeaturesReply),
    GetConfigRequest(GetConfigRequest),
    GetConfigReply(SwitchConfig),
    SetConfig(SwitchConfig),
    PacketIn(PacketIn),
    FlowRemoved(FlowRemoved),
    PortStatus(PortStatus),
    PacketOut(PacketOut),
    FlowMod(FlowMod),
    GroupMod(GroupMod),
    PortMod(PortMod),
    MultipartRequest(Multipart),
    MultipartReply(Multipart),
    BarrierRequest,
    BarrierReply,
    QueueGetConfigRequest(QueueGetConfigRequest),
    QueueGetConfigReply(QueueGetConfigReply),
    RoleRequest(RoleRequest),
    RoleReply(RoleReply),
    GetAsyncRequest,
    GetAsyncReply(AsyncConfig),
    SetAsync(AsyncConfig),
    MeterMod(MeterMod),
}

impl Body {
    /// Decode `req`'s body per its header's declared type.
    pub fn decode(req: &Request) -> Result<Self> {
        let mut r = req.body_reader();
        Ok(match req.header.kind {
            Type::Hello => Body::Hello(Hello::read_from(&mut r)?),
            Type::Error => Body::Error(ErrorMsg::read_from(&mut r)?),
            Type::EchoRequest => Body::EchoRequest(req.body().to_vec()),
            Type::EchoReply => Body::EchoReply(req.body().to_vec()),
            Type::FeaturesRequest => Body::FeaturesRequest(FeaturesRequest::read_from(&mut r)?),
            Type::FeaturesReply => Body::FeaturesReply(FeaturesReply::read_from(&mut r)?),
            Type::GetConfigRequest => Body::GetConfigRequest(GetConfigRequest::read_from(&mut r)?),
            Type::GetConfigReply => Body::GetConfigReply(SwitchConfig::read_from(&mut r)?),
            Type::SetConfig => Body::SetConfig(SwitchConfig::read_from(&mut r)?),
            Type::PacketIn => Body::PacketIn(PacketIn::read_from(&mut r)?),
            Type::FlowRemoved => Body::FlowRemoved(FlowRemoved::read_from(&mut r)?),
            Type::PortStatus => Body::PortStatus(PortStatus::read_from(&mut r)?),
            Type::PacketOut => Body::PacketOut(PacketOut::read_from(&mut r)?),
            Type::FlowMod => Body::FlowMod(FlowMod::read_from(&mut r)?),
            Type::GroupMod => Body::GroupMod(GroupMod::read_from(&mut r)?),
            Type::PortMod => Body::PortMod(PortMod::read_from(&mut r)?),
            Type::MultipartRequest => Body::MultipartRequest(Multipart::read_from(&mut r)?),
            Type::MultipartReply => Body::MultipartReply(Multipart::read_from(&mut r)?),
            Type::BarrierRequest => Body::BarrierRequest,
            Type::BarrierReply => Body::BarrierReply,
            Type::QueueGetConfigRequest => Body::QueueGetConfigRequest(QueueGetConfigRequest::read_from(&mut r)?),
            Type::QueueGetConfigReply => Body::QueueGetConfigReply(QueueGetConfigReply::read_from(&mut r)?),
            Type::RoleRequest => Body::RoleRequest(RoleRequest::read_from(&mut r)?),
            Type::RoleReply => Body::RoleReply(RoleReply::read_from(&mut r)?),
            Type::GetAsyncRequest => Body::GetAsyncRequest,
            Type::GetAsyncReply => Body::GetAsyncReply(AsyncConfig::read_from(&mut r)?),
            Type::SetAsync => Body::SetAsync(AsyncConfig::read_from(&mut r)?),
            Type::MeterMod => Body::MeterMod(MeterMod::read_from(&mut r)?),
            Type::Experimenter => return Err(Error::decode("experimenter messages are not decoded generically")),
            Type::Unknown(kind) => return Err(Error::decode(format!("unknown message type {kind}"))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::WriteTo;

    #[test]
    fn decodes_hello_body() {
        let hello = Hello::ofp13();
        let mut body = Vec::new();
        hello.write_to(&mut body).unwrap();
        let req = Request::new(Type::Hello, body);
        let decoded = Body::decode(&req).unwrap();
        assert_eq!(decoded, Body::Hello(hello));
    }

    #[test]
    fn decodes_barrier_request_as_unit() {
        let req = Request::new(Type::BarrierRequest, Vec::new());
        let decoded = Body::decode(&req).unwrap();
        assert_eq!(decoded, Body::BarrierRequest);
    }

    #[test]
    fn rejects_unknown_message_type() {
        let req = Request::new(Type::Unknown(250), Vec::new());
        assert!(Body::decode(&req).is_err());
    }
}
