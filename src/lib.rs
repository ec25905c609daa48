//! Controller-side OpenFlow 1.3 protocol library: wire codec, connection
//! state machine, and request dispatcher.
//!
//! The shape mirrors an HTTP server library on purpose: [`Listener`]
//! accepts datapath connections, [`Connection`] frames the wire protocol,
//! [`Request`]/[`Response`] carry one exchange, and a [`Mux`] dispatches
//! requests to [`Handler`]s by predicate. [`CookieMatcher`] layers
//! request/response correlation on top of that dispatcher for flows that
//! don't otherwise carry a reply-to-request relationship.

#[macro_use]
mod macros;

pub mod actions;
pub mod async_config;
pub mod codec;
pub mod config;
pub mod conn;
pub mod cookie;
pub mod desc;
pub mod error;
pub mod error_msg;
pub mod features;
pub mod flow;
pub mod group;
pub mod header;
pub mod hello;
pub mod instructions;
pub mod listener;
pub mod message;
pub mod meter;
pub mod multipart;
pub mod mux;
pub mod oxm;
pub mod packet_in;
pub mod packet_out;
pub mod port;
pub mod queue;
pub mod recorder;
pub mod request;
pub mod response;
pub mod role;
pub mod server;
pub mod table_features;

pub use codec::{ReadFrom, Tagged, WriteTo};
pub use conn::{ConnHandle, Connection};
pub use cookie::{CookieJar, CookieMatcher};
pub use error::{Error, Result};
pub use header::{Header, Type, Version};
pub use listener::{dial, Listener};
pub use message::Body;
pub use mux::{handler_fn, Handler, Matcher, Mux, TypeMatcher, TypeMux};
pub use request::Request;
pub use response::{Response, ResponseWriter};
pub use server::{listen_and_serve, ConnState, Runner, Server};
