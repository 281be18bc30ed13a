//! TCP client for talking to a tinyredis server.

use std::net::{SocketAddr, TcpStream};

use tracing::debug;

use tinyredis_protocol::{FrameReader, FrameWriter};

use crate::config::default_server_address;
use crate::error::{ClientError, ClientResult};

/// Message sent when the user gives none.
pub const DEFAULT_MESSAGE: &str = "Hello, Server!";

/// Client for communicating with a tinyredis server.
pub struct TcpClient {
    addr: String,
}

impl TcpClient {
    /// Creates a new client for `addr` (`host:port`).
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Creates a client for the default local server address.
    pub fn with_defaults() -> Self {
        Self::new(default_server_address())
    }

    /// Returns the server address.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Opens a connection for one or more request/reply exchanges.
    pub fn connect(&self) -> ClientResult<Session> {
        debug!(addr = %self.addr, "connecting to server");

        let stream = TcpStream::connect(&self.addr).map_err(|e| {
            ClientError::Connection(format!("failed to connect to {}: {}", self.addr, e))
        })?;
        let peer = stream.peer_addr()?;

        Ok(Session { stream, peer })
    }

    /// Connects, sends one request, and returns the reply.
    pub fn send(&self, payload: &[u8]) -> ClientResult<Vec<u8>> {
        self.connect()?.request(payload)
    }
}

/// An open connection to the server.
///
/// Requests are strictly sequential: each one waits for its reply.
pub struct Session {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Session {
    /// Returns the server's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Sends a request frame and waits for the reply frame.
    pub fn request(&mut self, payload: &[u8]) -> ClientResult<Vec<u8>> {
        FrameWriter::new(&mut self.stream).write_frame(payload)?;
        debug!(len = payload.len(), "request sent, waiting for reply");

        let reply = FrameReader::new(&mut self.stream)
            .read_frame()?
            .ok_or_else(|| {
                ClientError::Connection(format!(
                    "{} closed the connection without replying",
                    self.peer
                ))
            })?;

        debug!(len = reply.len(), "reply received");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;
    use tinyredis_server::{ReplyPolicy, ServerConfig, TcpServer};

    fn spawn_server(
        policy: ReplyPolicy,
        connections: usize,
    ) -> (SocketAddr, thread::JoinHandle<()>) {
        let server = TcpServer::bind(ServerConfig::new("127.0.0.1:0".parse().unwrap())).unwrap();
        let addr = server.local_addr().unwrap();
        let handle = thread::spawn(move || {
            server.run_for(&policy, connections);
        });
        (addr, handle)
    }

    #[test]
    fn client_creation() {
        let client = TcpClient::new("10.1.2.3:4000");
        assert_eq!(client.addr(), "10.1.2.3:4000");
        assert_eq!(TcpClient::with_defaults().addr(), "127.0.0.1:1234");
    }

    #[test]
    fn send_gets_default_greeting() {
        let (addr, server) = spawn_server(ReplyPolicy::default(), 1);

        let reply = TcpClient::new(addr.to_string())
            .send(DEFAULT_MESSAGE.as_bytes())
            .unwrap();
        server.join().unwrap();

        assert_eq!(reply, b"Hello, Client!");
    }

    #[test]
    fn session_sends_sequential_requests() {
        let (addr, server) = spawn_server(ReplyPolicy::Echo, 1);

        {
            let mut session = TcpClient::new(addr.to_string()).connect().unwrap();
            assert_eq!(session.peer_addr(), addr);
            assert_eq!(session.request(b"one").unwrap(), b"one");
            assert_eq!(session.request(b"").unwrap(), b"");
            assert_eq!(session.request(b"three").unwrap(), b"three");
        }
        server.join().unwrap();
    }

    #[test]
    fn oversized_request_is_rejected_locally() {
        let (addr, server) = spawn_server(ReplyPolicy::Echo, 1);

        {
            let mut session = TcpClient::new(addr.to_string()).connect().unwrap();
            let result = session.request(&[b'x'; 4097]);
            assert!(matches!(result, Err(ClientError::Protocol(_))));

            // Nothing reached the server, so the session is still usable.
            assert_eq!(session.request(b"ok").unwrap(), b"ok");
        }
        server.join().unwrap();
    }

    #[test]
    fn server_hanging_up_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            // Consume the request, then close without replying.
            FrameReader::new(&stream).read_frame().unwrap();
        });

        let result = TcpClient::new(addr.to_string()).send(b"anyone?");
        server.join().unwrap();

        assert!(matches!(result, Err(ClientError::Connection(_))));
    }

    #[test]
    fn refused_connection_reports_address() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let result = TcpClient::new(addr.to_string()).connect();
        match result {
            Err(ClientError::Connection(msg)) => assert!(msg.contains(&addr.to_string())),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connected to a closed port"),
        }
    }
}
