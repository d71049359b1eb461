pub mod mock_backend;

use std::net::{Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use tokio::net::TcpSocket;

pub use mock_backend::{API_PATH, Behavior, MockBackend};

/// Loopback port that refuses every connection.
///
/// The socket is bound but never listens, so the port stays taken for as
/// long as this value lives and no `MockBackend` started in parallel can be
/// handed it.
pub struct RefusedEndpoint {
    addr: SocketAddr,
    _socket: TcpSocket,
}

impl RefusedEndpoint {
    pub fn reserve() -> Result<Self> {
        let socket = TcpSocket::new_v4().context("Failed to open socket")?;
        socket
            .bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .context("Failed to reserve a local port")?;
        let addr = socket.local_addr()?;

        Ok(Self {
            addr,
            _socket: socket,
        })
    }

    pub fn url(&self) -> String { format!("http://{}{}", self.addr, API_PATH) }
}
