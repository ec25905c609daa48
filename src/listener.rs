//! Accept loop: binds a TCP (optionally TLS) endpoint and yields framed
//! connections.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener as TokioTcpListener, TcpStream, ToSocketAddrs};
use tracing::info;

use crate::conn::{ConnHandle, Connection};
use crate::error::Result;

#[cfg(feature = "tls")]
use std::sync::Arc as StdArc;
#[cfg(feature = "tls")]
use tokio_rustls::{rustls::ServerConfig, TlsAcceptor};

enum Acceptor {
    Plain,
    #[cfg(feature = "tls")]
    Tls(TlsAcceptor),
}

/// Accepts inbound datapath connections. `Listen` binds a plain TCP
/// endpoint; `ListenTls` additionally terminates TLS using a
/// caller-supplied `rustls::ServerConfig` (the secure transport is opaque
/// to this crate, exactly as the design calls for).
pub struct Listener {
    inner: TokioTcpListener,
    acceptor: Acceptor,
}

impl Listener {
    /// Bind a plain TCP listener. `network` is accepted for symmetry with
    /// the dial-side API but only `"tcp"` is meaningful; IPv4 and IPv6
    /// addresses are both supported by binding whatever `addr` resolves
    /// to.
    pub async fn listen(addr: impl ToSocketAddrs) -> Result<Self> {
        let inner = TokioTcpListener::bind(addr).await?;
        info!(addr = %inner.local_addr()?, "listening");
        Ok(Listener {
            inner,
            acceptor: Acceptor::Plain,
        })
    }

    #[cfg(feature = "tls")]
    pub async fn listen_tls(addr: impl ToSocketAddrs, config: ServerConfig) -> Result<Self> {
        let inner = TokioTcpListener::bind(addr).await?;
        info!(addr = %inner.local_addr()?, "listening (tls)");
        Ok(Listener {
            inner,
            acceptor: Acceptor::Tls(TlsAcceptor::from(StdArc::new(config))),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.local_addr()?)
    }

    /// Accept one connection, applying the given read/write deadlines to
    /// every subsequent framed operation on it.
    pub async fn accept(
        &self,
        read_timeout: Option<Duration>,
        write_timeout: Option<Duration>,
    ) -> Result<ConnHandle> {
        let (stream, remote_addr) = self.inner.accept().await?;
        stream.set_nodelay(true).ok();
        let conn = match &self.acceptor {
            Acceptor::Plain => Connection::new(Box::new(stream), remote_addr, read_timeout, write_timeout),
            #[cfg(feature = "tls")]
            Acceptor::Tls(acceptor) => {
                let tls_stream = acceptor.accept(stream).await?;
                Connection::new(Box::new(tls_stream), remote_addr, read_timeout, write_timeout)
            }
        };
        Ok(conn)
    }

    pub async fn close(self) -> Result<()> {
        // Dropping `self.inner` closes the bound socket; kept as an
        // explicit method so callers don't need to know that.
        drop(self);
        Ok(())
    }
}

/// Dial out to a datapath acting as a listener (used by test harnesses
/// that want to simulate a switch connecting to us, or by controllers
/// that connect out to a passive-mode switch).
pub async fn dial(addr: impl ToSocketAddrs) -> Result<ConnHandle> {
    let stream = TcpStream::connect(addr).await?;
    let remote_addr = stream.peer_addr()?;
    stream.set_nodelay(true).ok();
    Ok(Connection::new(Box::new(stream), remote_addr, None, None))
}
