//! Blocking TCP listener.
//!
//! Connections are accepted and served one at a time: each is run to
//! completion before the next `accept`.

use std::net::{SocketAddr, TcpListener, TcpStream};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, error, info};

use tinyredis_protocol::{FrameReader, FrameWriter};

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::{ConnectionSummary, ReplyPolicy, serve_connection};

/// TCP server for handling client connections.
pub struct TcpServer {
    /// Server configuration.
    config: ServerConfig,
    /// Bound listener.
    listener: TcpListener,
}

impl TcpServer {
    /// Creates the listening socket described by `config`.
    pub fn bind(config: ServerConfig) -> ServerResult<Self> {
        let addr = config.bind_addr;
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;

        // Lets a restarted server rebind while old connections sit in TIME_WAIT.
        socket.set_reuse_address(config.reuse_address)?;
        socket.bind(&addr.into())?;
        socket.listen(config.backlog)?;

        let listener: TcpListener = socket.into();
        info!(addr = %listener.local_addr()?, "Server listening");

        Ok(Self { config, listener })
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts a single connection, blocking until one arrives.
    pub fn accept(&self) -> ServerResult<Connection> {
        let (stream, peer) = self.listener.accept()?;
        debug!(%peer, "Accepted new connection");
        Ok(Connection { stream, peer })
    }

    /// Runs the accept loop forever. Never returns.
    ///
    /// Accept failures are logged and skipped; errors on a connection only
    /// end that connection.
    pub fn run(&self, policy: &ReplyPolicy) -> ! {
        loop {
            self.serve_next(policy);
        }
    }

    /// Serves exactly `connections` connections, then returns their summaries.
    pub fn run_for(&self, policy: &ReplyPolicy, connections: usize) -> Vec<ConnectionSummary> {
        let mut summaries = Vec::with_capacity(connections);
        while summaries.len() < connections {
            if let Some(summary) = self.serve_next(policy) {
                summaries.push(summary);
            }
        }
        summaries
    }

    fn serve_next(&self, policy: &ReplyPolicy) -> Option<ConnectionSummary> {
        match self.accept() {
            Ok(conn) => Some(serve_connection(conn, policy)),
            Err(e) => {
                error!(error = %e, "Failed to accept connection");
                None
            }
        }
    }
}

/// A client connection to the server.
///
/// The stream is closed when the connection is dropped.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    /// Returns the client's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Reads a request payload from the connection.
    ///
    /// Returns `Ok(None)` if the connection was closed cleanly.
    pub fn read_request(&mut self) -> ServerResult<Option<Vec<u8>>> {
        Ok(FrameReader::new(&mut self.stream).read_frame()?)
    }

    /// Writes a reply payload to the connection.
    pub fn write_response(&mut self, payload: &[u8]) -> ServerResult<()> {
        FrameWriter::new(&mut self.stream).write_frame(payload)?;
        Ok(())
    }
}
