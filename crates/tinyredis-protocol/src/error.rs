//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while framing messages.
///
/// A peer closing the stream between frames is not an error; readers report
/// it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Declared or supplied payload exceeds the maximum frame size.
    #[error("frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: u32, max: u32 },

    /// Stream ended in the middle of a frame.
    #[error("truncated frame: expected {expected} bytes, got {received}")]
    Truncated { expected: usize, received: usize },

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Returns true if the error came from the peer violating the framing rules
    /// rather than from the transport.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::FrameTooLarge { .. } | Self::Truncated { .. })
    }
}
