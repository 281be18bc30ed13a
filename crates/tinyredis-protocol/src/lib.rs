//! Length-prefixed message framing for tinyredis.
//!
//! # Protocol Overview
//!
//! Every message travels over TCP as a frame:
//! - 4 bytes: payload length (u32, little-endian)
//! - N bytes: payload, where N <= [`MAX_MESSAGE_SIZE`]
//!
//! Each request frame is answered by exactly one reply frame. A peer that
//! closes the stream between frames ends the exchange cleanly.
//!
//! # Example
//!
//! ```rust
//! use tinyredis_protocol::{decode_frame, encode_frame};
//!
//! let bytes = encode_frame(b"Hello, Server!").unwrap();
//! assert_eq!(&bytes[..4], &[0x0E, 0x00, 0x00, 0x00]);
//!
//! let payload = decode_frame(&bytes).unwrap().unwrap();
//! assert_eq!(payload, b"Hello, Server!");
//! ```

mod error;
mod framing;

pub use error::{ProtocolError, ProtocolResult};
pub use framing::{FrameReader, FrameWriter, decode_frame, encode_frame};

/// Maximum payload size of a single frame (4 KiB).
pub const MAX_MESSAGE_SIZE: u32 = 4096;

/// Size of the length prefix in bytes.
pub const HEADER_LEN: usize = 4;

/// Port the server listens on and the client dials by default.
pub const DEFAULT_PORT: u16 = 1234;
