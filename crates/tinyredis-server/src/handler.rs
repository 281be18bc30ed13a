//! Request/response loop for a single connection.
//!
//! Every request frame is answered with exactly one reply frame chosen by the
//! [`ReplyPolicy`]. The loop ends when the peer closes the stream between
//! frames or on the first error; either way the connection is dropped and the
//! listener moves on.

use std::net::SocketAddr;

use tracing::{debug, info, info_span, warn};

use tinyredis_protocol::MAX_MESSAGE_SIZE;

use crate::error::{ServerError, ServerResult};
use crate::socket::Connection;

/// Reply sent by [`ReplyPolicy::default`].
pub const DEFAULT_REPLY: &str = "Hello, Client!";

/// How the server answers a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyPolicy {
    /// Send the request payload straight back.
    Echo,
    /// Always answer with the same payload.
    Fixed(Vec<u8>),
}

impl Default for ReplyPolicy {
    fn default() -> Self {
        Self::Fixed(DEFAULT_REPLY.as_bytes().to_vec())
    }
}

impl ReplyPolicy {
    /// Creates a fixed reply, rejecting text that does not fit in one frame.
    pub fn fixed(text: impl Into<String>) -> ServerResult<Self> {
        let text = text.into();
        if text.len() > MAX_MESSAGE_SIZE as usize {
            return Err(ServerError::config(format!(
                "reply is {} bytes, frames carry at most {}",
                text.len(),
                MAX_MESSAGE_SIZE
            )));
        }
        Ok(Self::Fixed(text.into_bytes()))
    }

    /// Returns the reply payload for `request`.
    pub fn reply<'a>(&'a self, request: &'a [u8]) -> &'a [u8] {
        match self {
            Self::Echo => request,
            Self::Fixed(payload) => payload.as_slice(),
        }
    }
}

/// How a connection ended.
#[derive(Debug)]
pub enum ConnectionOutcome {
    /// Peer closed the stream between frames.
    Closed,
    /// Connection was dropped after an error.
    Failed(ServerError),
}

/// What happened on one served connection.
#[derive(Debug)]
pub struct ConnectionSummary {
    /// Remote address of the client.
    pub peer: SocketAddr,
    /// Number of request/reply exchanges completed.
    pub frames: u64,
    /// How the connection ended.
    pub outcome: ConnectionOutcome,
}

impl ConnectionSummary {
    /// Returns true if the connection ended without an error.
    pub fn is_clean(&self) -> bool {
        matches!(self.outcome, ConnectionOutcome::Closed)
    }
}

/// Serves one connection to completion, then closes it.
pub fn serve_connection(mut conn: Connection, policy: &ReplyPolicy) -> ConnectionSummary {
    let peer = conn.peer_addr();
    let span = info_span!("connection", %peer);
    let _guard = span.enter();

    let mut frames = 0;
    let outcome = loop {
        match conn.read_request() {
            Ok(Some(request)) => {
                info!(
                    len = request.len(),
                    payload = %String::from_utf8_lossy(&request),
                    "Received request"
                );
                if let Err(e) = conn.write_response(policy.reply(&request)) {
                    warn!(error = %e, "Failed to send reply");
                    break ConnectionOutcome::Failed(e);
                }
                frames += 1;
            }
            Ok(None) => {
                debug!("Client disconnected");
                break ConnectionOutcome::Closed;
            }
            Err(e) => {
                warn!(
                    error = %e,
                    violation = e.is_protocol_violation(),
                    "Dropping connection"
                );
                break ConnectionOutcome::Failed(e);
            }
        }
    };

    info!(frames, "Connection finished");
    ConnectionSummary {
        peer,
        frames,
        outcome,
    }
}
