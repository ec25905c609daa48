//! Cookie correlator: tags outgoing flow entries with an opaque random
//! 64-bit cookie and routes datapath notifications back to the handler
//! that minted it, even though OpenFlow itself has no per-application
//! demultiplexing.

use std::io::Cursor;
use std::sync::Arc;

use rand::random;
use tracing::trace;

use crate::codec::ReadFrom;
use crate::error::Result;
use crate::mux::Matcher;
use crate::request::Request;

/// Anything carrying an opaque 64-bit cookie: flow-mod, flow-removed,
/// flow-stats and similar structures all implement this.
pub trait CookieJar {
    fn cookie(&self) -> u64;
    fn set_cookie(&mut self, cookie: u64);
}

/// A fresh decoder that recovers a cookie from a request body by decoding
/// it as one concrete [`CookieJar`]-carrying message type. Built once per
/// registration via [`cookie_reader_of`]; safe to call concurrently since
/// each call decodes its own, independent value.
pub type CookieDecoder = Arc<dyn Fn(&[u8]) -> Result<u64> + Send + Sync>;

/// Build a decoder specialized to `T`. The replacement for the reference
/// design's reflective factory: monomorphization plays the role runtime
/// type lookup played there.
pub fn cookie_reader_of<T>() -> CookieDecoder
where
    T: CookieJar + ReadFrom + 'static,
{
    Arc::new(|bytes: &[u8]| {
        let mut cursor = Cursor::new(bytes);
        let jar = T::read_from(&mut cursor)?;
        Ok(jar.cookie())
    })
}

fn mint_cookie() -> u64 {
    let hi: u32 = random();
    let lo: u32 = random();
    ((hi as u64) << 32) | lo as u64
}

/// Matches a notification whose decoded cookie equals the one this
/// matcher minted.
pub struct CookieMatcher {
    cookie: u64,
    decode: CookieDecoder,
}

impl CookieMatcher {
    /// Draw a fresh 64-bit cookie, imprint it onto `jar`, and return a
    /// matcher for it. The caller is responsible for sending the
    /// jar-bearing message and registering this matcher (typically via
    /// `Mux::handle_once`).
    pub fn new<T>(jar: &mut T) -> Self
    where
        T: CookieJar + ReadFrom + 'static,
    {
        let cookie = mint_cookie();
        jar.set_cookie(cookie);
        trace!(cookie = format!("{:#018x}", cookie), "minted cookie");
        CookieMatcher {
            cookie,
            decode: cookie_reader_of::<T>(),
        }
    }

    pub fn cookie(&self) -> u64 {
        self.cookie
    }
}

impl Matcher for CookieMatcher {
    fn matches(&self, req: &Request) -> bool {
        match (self.decode)(req.body()) {
            Ok(cookie) => {
                let hit = cookie == self.cookie;
                if hit {
                    trace!(cookie = format!("{:#018x}", cookie), "cookie correlated");
                }
                hit
            }
            Err(_) => false,
        }
    }

    fn dedup_key(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut h = std::collections::hash_map::DefaultHasher::new();
        "cookie".hash(&mut h);
        self.cookie.hash(&mut h);
        h.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowRemoved;
    use crate::header::Type;
    use crate::oxm::Match;

    #[test]
    fn matching_cookie_correlates_and_mismatch_does_not() {
        let mut removed = FlowRemoved {
            cookie: 0,
            priority: 0,
            reason: crate::flow::RemovedReason::IdleTimeout,
            table_id: 0,
            duration_sec: 0,
            duration_nsec: 0,
            idle_timeout: 0,
            hard_timeout: 0,
            packet_count: 0,
            byte_count: 0,
            matches: Match::new(),
        };
        let matcher = CookieMatcher::new(&mut removed);
        let cookie = matcher.cookie();
        assert_eq!(removed.cookie, cookie);

        let mut buf = Vec::new();
        use crate::codec::WriteTo;
        removed.write_to(&mut buf).unwrap();
        let req = Request::new(Type::FlowRemoved, buf);
        assert!(matcher.matches(&req));

        let mut other = removed.clone();
        other.cookie = cookie.wrapping_add(1);
        let mut other_buf = Vec::new();
        other.write_to(&mut other_buf).unwrap();
        let other_req = Request::new(Type::FlowRemoved, other_buf);
        assert!(!matcher.matches(&other_req));
    }
}
