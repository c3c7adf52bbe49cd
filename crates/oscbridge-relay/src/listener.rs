use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};

use tracing::{debug, info};

use crate::error::{RelayError, Result};

/// Default TCP port for the OSC stream.
pub const DEFAULT_PORT: u16 = 8000;

/// Wildcard TCP listener for OSC clients.
///
/// Binds the first workable wildcard address: IPv6 first, so dual-stack
/// hosts serve both families from one socket, with plain IPv4 as the
/// fallback. Accepts unauthenticated, unencrypted connections.
pub struct RelayListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl RelayListener {
    /// Bind and listen on the wildcard address.
    ///
    /// Pass port 0 to let the OS pick one (tests); read it back with
    /// [`local_addr`](Self::local_addr).
    pub fn bind(port: u16) -> Result<Self> {
        let candidates = [
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)),
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
        ];
        let listener =
            TcpListener::bind(&candidates[..]).map_err(|source| RelayError::Bind { port, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| RelayError::Bind { port, source })?;

        info!(%local_addr, "listening for OSC clients");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming client connection (blocking).
    pub fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        let (stream, peer) = self.listener.accept().map_err(RelayError::Accept)?;
        debug!(%peer, "accepted client connection");
        Ok((stream, peer))
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn bind_ephemeral_and_accept() {
        let listener = RelayListener::bind(0).expect("listener should bind");
        let addr = listener.local_addr();
        assert_ne!(addr.port(), 0);

        let handle = std::thread::spawn(move || {
            let mut client = TcpStream::connect(addr).expect("client should connect");
            client.write_all(b"hi").expect("client write should succeed");
        });

        let (_stream, peer) = listener.accept().expect("accept should succeed");
        assert!(peer.ip().is_loopback());

        handle.join().expect("client thread should finish");
    }
}
