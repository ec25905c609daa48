//! The multiplexer: a predicate-keyed handler map that turns an
//! asynchronous message stream back into request/reply.
//!
//! A [`Matcher`] is any predicate over a [`Request`]. [`Mux::handle`]
//! registers a persistent handler; [`Mux::handle_once`] registers a
//! one-shot handler that auto-removes itself the first time its matcher
//! is satisfied. [`TypeMux`] is the common shortcut that keys entries by
//! message type alone.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::header::Type;
use crate::request::Request;
use crate::response::ResponseWriter;

/// A predicate over a request. `dedup_key` gives two matchers that would
/// always agree a way to be recognized as the same registration, which is
/// what [`Mux::handle`] uses to reject a duplicate registration the way a
/// hash map would reject a duplicate key.
pub trait Matcher: Send + Sync {
    fn matches(&self, req: &Request) -> bool;
    fn dedup_key(&self) -> u64;
}

fn hash_tag(tag: &str, value: impl Hash) -> u64 {
    let mut h = DefaultHasher::new();
    tag.hash(&mut h);
    value.hash(&mut h);
    h.finish()
}

/// Matches requests of exactly one message type.
pub struct TypeMatcher(pub Type);

impl Matcher for TypeMatcher {
    fn matches(&self, req: &Request) -> bool {
        req.header.kind == self.0
    }
    fn dedup_key(&self) -> u64 {
        hash_tag("type", self.0)
    }
}

/// Matches requests carrying exactly one transaction id.
pub struct TransactionMatcher(pub u32);

impl Matcher for TransactionMatcher {
    fn matches(&self, req: &Request) -> bool {
        req.header.transaction == self.0
    }
    fn dedup_key(&self) -> u64 {
        hash_tag("xid", self.0)
    }
}

/// Matches requests carrying exactly one header version.
pub struct VersionMatcher(pub u8);

impl Matcher for VersionMatcher {
    fn matches(&self, req: &Request) -> bool {
        req.header.version == self.0
    }
    fn dedup_key(&self) -> u64 {
        hash_tag("version", self.0)
    }
}

/// Matches when every child matcher matches.
pub struct And(pub Vec<Box<dyn Matcher>>);

impl Matcher for And {
    fn matches(&self, req: &Request) -> bool {
        self.0.iter().all(|m| m.matches(req))
    }
    fn dedup_key(&self) -> u64 {
        let mut h = DefaultHasher::new();
        "and".hash(&mut h);
        for m in &self.0 {
            m.dedup_key().hash(&mut h);
        }
        h.finish()
    }
}

/// A handler: the thing a matched request is dispatched to.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve(&self, rw: &mut dyn ResponseWriter, req: &Request);
}

/// Discards the request without writing a reply. The fallback for
/// requests no registered matcher claims, and for a one-shot entry that
/// lost the removal race.
pub struct DiscardHandler;

#[async_trait]
impl Handler for DiscardHandler {
    async fn serve(&self, _rw: &mut dyn ResponseWriter, _req: &Request) {}
}

/// Wraps an async closure as a [`Handler`], the equivalent of
/// `HandleFunc`.
pub struct HandlerFn<F>(F);

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(&mut dyn ResponseWriter, &Request) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = ()> + Send,
{
    async fn serve(&self, rw: &mut dyn ResponseWriter, req: &Request) {
        (self.0)(rw, req).await
    }
}

pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut dyn ResponseWriter, &Request) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = ()> + Send,
{
    HandlerFn(f)
}

struct Entry {
    key: u64,
    matcher: Box<dyn Matcher>,
    handler: Arc<dyn Handler>,
    once: bool,
}

/// The predicate-keyed dispatcher.
pub struct Mux {
    entries: RwLock<Vec<Entry>>,
}

impl Default for Mux {
    fn default() -> Self {
        Mux::new()
    }
}

impl Mux {
    pub fn new() -> Self {
        Mux {
            entries: RwLock::new(Vec::new()),
        }
    }

    async fn insert(&self, matcher: Box<dyn Matcher>, handler: Arc<dyn Handler>, once: bool) {
        let key = matcher.dedup_key();
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.key == key) {
            panic!("ofp13::Mux: duplicate matcher registration");
        }
        entries.push(Entry {
            key,
            matcher,
            handler,
            once,
        });
    }

    /// Register a persistent handler. Panics if an equivalent matcher
    /// (per `dedup_key`) is already registered.
    pub async fn handle(&self, matcher: impl Matcher + 'static, handler: impl Handler + 'static) {
        self.insert(Box::new(matcher), Arc::new(handler), false).await;
    }

    /// Register a one-shot handler: removed from the map the first time
    /// its matcher is satisfied.
    pub async fn handle_once(&self, matcher: impl Matcher + 'static, handler: impl Handler + 'static) {
        trace!("registering one-shot handler");
        self.insert(Box::new(matcher), Arc::new(handler), true).await;
    }

    /// Select the handler for `req`. One-shot entries are removed
    /// atomically on first match; if two requests match the same one-shot
    /// entry concurrently, the first to win the write lock dispatches to
    /// it and the other is discarded (best-effort, matching the
    /// underlying race in the reference design).
    pub async fn handler_for(&self, req: &Request) -> Arc<dyn Handler> {
        {
            let entries = self.entries.read().await;
            match entries.iter().find(|e| e.matcher.matches(req)) {
                Some(entry) if !entry.once => return entry.handler.clone(),
                Some(_) => {} // matched a one-shot entry: fall through to remove it
                None => return Arc::new(DiscardHandler),
            }
        }
        let mut entries = self.entries.write().await;
        if let Some(pos) = entries.iter().position(|e| e.once && e.matcher.matches(req)) {
            trace!("one-shot handler matched and removed");
            return entries.remove(pos).handler;
        }
        Arc::new(DiscardHandler)
    }

    pub async fn serve(&self, rw: &mut dyn ResponseWriter, req: &Request) {
        self.handler_for(req).await.serve(rw, req).await;
    }
}

/// Ergonomic wrapper over [`Mux`] that keys entries by message type
/// alone.
#[derive(Default)]
pub struct TypeMux {
    mux: Mux,
}

impl TypeMux {
    pub fn new() -> Self {
        TypeMux { mux: Mux::new() }
    }

    pub async fn handle(&self, kind: Type, handler: impl Handler + 'static) {
        self.mux.handle(TypeMatcher(kind), handler).await;
    }

    pub async fn handle_once(&self, kind: Type, handler: impl Handler + 'static) {
        self.mux.handle_once(TypeMatcher(kind), handler).await;
    }

    pub async fn serve(&self, rw: &mut dyn ResponseWriter, req: &Request) {
        self.mux.serve(rw, req).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::Recorder;

    struct Echo;
    #[async_trait]
    impl Handler for Echo {
        async fn serve(&self, rw: &mut dyn ResponseWriter, req: &Request) {
            rw.write(req.header.reply(Type::EchoReply), req.body()).await.unwrap();
        }
    }

    #[tokio::test]
    async fn one_shot_handler_fires_exactly_once() {
        let mux = Mux::new();
        let count = Arc::new(tokio::sync::Mutex::new(0u32));
        struct Counter(Arc<tokio::sync::Mutex<u32>>);
        #[async_trait]
        impl Handler for Counter {
            async fn serve(&self, _rw: &mut dyn ResponseWriter, _req: &Request) {
                *self.0.lock().await += 1;
            }
        }
        mux.handle_once(TypeMatcher(Type::FlowRemoved), Counter(count.clone())).await;

        let mut recorder = Recorder::new();
        let req = Request::new(Type::FlowRemoved, Vec::new());
        mux.serve(&mut recorder, &req).await;
        mux.serve(&mut recorder, &req).await;

        assert_eq!(*count.lock().await, 1);
    }

    #[tokio::test]
    async fn unmatched_request_goes_to_discard() {
        let mux = Mux::new();
        mux.handle(TypeMatcher(Type::Hello), Echo).await;
        let mut recorder = Recorder::new();
        let req = Request::new(Type::EchoRequest, vec![1, 2, 3]);
        mux.serve(&mut recorder, &req).await;
        assert!(recorder.all().await.is_empty());
    }

    #[tokio::test]
    #[should_panic(expected = "duplicate matcher")]
    async fn duplicate_registration_panics() {
        let mux = Mux::new();
        mux.handle(TypeMatcher(Type::Hello), Echo).await;
        mux.handle(TypeMatcher(Type::Hello), Echo).await;
    }
}
