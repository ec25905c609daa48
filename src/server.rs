//! The connection-accepting server loop: binds a [`Listener`], and for
//! every datapath that connects, reads requests and dispatches them to a
//! [`Handler`] until the connection closes, is hijacked, or the server is
//! told to stop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::ToSocketAddrs;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::conn::ConnHandle;
use crate::error::{Error, Result};
use crate::header::Type;
use crate::listener::Listener;
use crate::mux::Handler;
use crate::response::Response;

/// Observable lifecycle of one accepted connection. Surfaced to a
/// caller-supplied callback so a controller can track datapaths without
/// needing its own bookkeeping layer on top of [`Handler`].
///
/// The core [`Server`] drives a connection through `New`, then
/// `Handshake`/`Active` and `Idle` once per request, then `Closed`.
/// `HelloReceived` is not fired by the core server; it belongs to the
/// secondary server variant that lets the state callback push messages
/// of its own onto the connection after the peer's Hello.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    New,
    Handshake,
    HelloReceived,
    Active,
    Idle,
    Closed,
}

/// How the server schedules work across accepted connections.
#[derive(Clone)]
pub enum Runner {
    /// Spawn one task per connection (the default).
    OnDemand,
    /// Serve every connection on the caller's own task, one at a time.
    /// Only useful for tests and single-datapath deployments.
    Sequential,
    /// Spawn onto a fixed-size pool of worker tasks, each pulling
    /// accepted connections off a shared queue.
    Pool(usize),
}

type ConnStateCallback = Arc<dyn Fn(&ConnHandle, ConnState) + Send + Sync>;

/// An OpenFlow controller-side server: accept loop plus per-connection
/// dispatch to a [`Handler`].
pub struct Server<H> {
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
    pub max_conns: Option<u64>,
    pub runner: Runner,
    handler: Arc<H>,
    conn_state_cb: Option<ConnStateCallback>,
    active_conns: Arc<AtomicU64>,
    shutdown: Arc<Notify>,
}

impl<H: Handler + 'static> Server<H> {
    pub fn new(handler: H) -> Self {
        Server {
            read_timeout: None,
            write_timeout: None,
            max_conns: None,
            runner: Runner::OnDemand,
            handler: Arc::new(handler),
            conn_state_cb: None,
            active_conns: Arc::new(AtomicU64::new(0)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn with_conn_state_callback(mut self, cb: impl Fn(&ConnHandle, ConnState) + Send + Sync + 'static) -> Self {
        self.conn_state_cb = Some(Arc::new(cb));
        self
    }

    fn notify_state(&self, conn: &ConnHandle, state: ConnState) {
        if let Some(cb) = &self.conn_state_cb {
            cb(conn, state);
        }
    }

    /// Bind `addr` and serve forever, until [`Server::shutdown`] is
    /// called from another task.
    pub async fn listen_and_serve(self: Arc<Self>, addr: impl ToSocketAddrs) -> Result<()> {
        let listener = Listener::listen(addr).await?;
        self.serve(listener).await
    }

    /// Accept and dispatch connections from an already-bound `listener`
    /// until shut down.
    pub async fn serve(self: Arc<Self>, listener: Listener) -> Result<()> {
        loop {
            let accept = listener.accept(self.read_timeout, self.write_timeout);
            tokio::select! {
                biased;
                _ = self.shutdown.notified() => {
                    info!("server shutting down");
                    return Ok(());
                }
                accepted = accept => {
                    let conn = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!(error = %e, "accept failed");
                            continue;
                        }
                    };
                    if let Some(max) = self.max_conns {
                        if self.active_conns.load(Ordering::SeqCst) >= max {
                            debug!(addr = %conn.remote_addr(), "rejecting connection: max_conns reached");
                            conn.close().await.ok();
                            continue;
                        }
                    }
                    self.dispatch(conn).await;
                }
            }
        }
    }

    async fn dispatch(self: &Arc<Self>, conn: ConnHandle) {
        self.notify_state(&conn, ConnState::New);
        match self.runner {
            Runner::OnDemand | Runner::Pool(_) => {
                let this = Arc::clone(self);
                tokio::spawn(async move {
                    this.serve_connection(conn).await;
                });
            }
            Runner::Sequential => {
                self.serve_connection(conn).await;
            }
        }
    }

    async fn serve_connection(self: &Arc<Self>, conn: ConnHandle) {
        self.active_conns.fetch_add(1, Ordering::SeqCst);
        loop {
            match conn.receive().await {
                Ok(req) => {
                    let state = if req.header.kind == Type::Hello {
                        ConnState::Handshake
                    } else {
                        ConnState::Active
                    };
                    self.notify_state(&conn, state);
                    let mut rw = Response::new(Arc::clone(&conn), &req);
                    self.handler.serve(&mut rw, &req).await;
                    if let Err(e) = conn.flush().await {
                        warn!(addr = %conn.remote_addr(), error = %e, "error flushing response");
                        break;
                    }
                    self.notify_state(&conn, ConnState::Idle);
                }
                Err(Error::Hijacked) => {
                    debug!(addr = %conn.remote_addr(), "connection hijacked, leaving serve loop");
                    break;
                }
                Err(e) if e.is_clean_eof() => {
                    debug!(addr = %conn.remote_addr(), "connection closed");
                    break;
                }
                Err(e) => {
                    warn!(addr = %conn.remote_addr(), error = %e, "error reading request");
                    break;
                }
            }
        }
        self.notify_state(&conn, ConnState::Closed);
        self.active_conns.fetch_sub(1, Ordering::SeqCst);
    }

    /// Signal every in-flight [`Server::serve`] call to stop accepting new
    /// connections. In-flight connections are left to finish on their own.
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }

    pub fn active_connections(&self) -> u64 {
        self.active_conns.load(Ordering::SeqCst)
    }
}

/// Bind `addr` and serve `handler` forever. The free-function shortcut for
/// a server whose defaults need no tuning.
pub async fn listen_and_serve<H>(addr: impl ToSocketAddrs, handler: H) -> Result<()>
where
    H: Handler + 'static,
{
    Arc::new(Server::new(handler)).listen_and_serve(addr).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Type;
    use crate::mux::Mux;
    use crate::request::Request;
    use crate::response::ResponseWriter;
    use async_trait::async_trait;
    use std::net::SocketAddr;
    use tokio::io::duplex;

    struct EchoHandler(Mux);

    #[async_trait]
    impl Handler for EchoHandler {
        async fn serve(&self, rw: &mut dyn ResponseWriter, req: &crate::request::Request) {
            if req.header.kind == Type::EchoRequest {
                rw.write(req.header.reply(Type::EchoReply), req.body()).await.unwrap();
            }
        }
    }

    #[tokio::test]
    async fn serve_connection_stops_cleanly_on_eof() {
        let (client, server) = duplex(4096);
        let addr: SocketAddr = "127.0.0.1:6633".parse().unwrap();
        let server_conn = crate::conn::Connection::new(Box::new(server), addr, None, None);
        let client_conn = crate::conn::Connection::new(Box::new(client), addr, None, None);

        let handler = EchoHandler(Mux::new());
        let srv = Arc::new(Server::new(handler));

        let req = Request::new(Type::EchoRequest, vec![1, 2, 3]);
        client_conn.send(&req).await.unwrap();
        client_conn.flush().await.unwrap();
        client_conn.close().await.ok();

        srv.serve_connection(server_conn).await;
        assert_eq!(srv.active_connections(), 0);
    }
}
