//! Length-prefixed message framing over byte streams.
//!
//! Messages are framed with a 4-byte little-endian length prefix followed by
//! the payload:
//!
//! ```text
//! +----------------+------------------+
//! | length (4 LE)  |  payload         |
//! +----------------+------------------+
//! ```

use std::io::{self, Read, Write};

use tracing::{trace, warn};

use crate::error::{ProtocolError, ProtocolResult};
use crate::{HEADER_LEN, MAX_MESSAGE_SIZE};

/// Encodes a payload into a complete frame.
///
/// Returns the length prefix followed by the payload, ready for a single
/// `write_all`.
///
/// # Example
///
/// ```rust
/// use tinyredis_protocol::encode_frame;
///
/// let bytes = encode_frame(b"ping").unwrap();
/// assert_eq!(bytes, [4, 0, 0, 0, b'p', b'i', b'n', b'g']);
/// ```
pub fn encode_frame(payload: &[u8]) -> ProtocolResult<Vec<u8>> {
    let len = checked_len(payload.len())?;

    let mut buffer = Vec::with_capacity(HEADER_LEN + payload.len());
    buffer.extend_from_slice(&len.to_le_bytes());
    buffer.extend_from_slice(payload);
    Ok(buffer)
}

/// Decodes the first frame in `data`.
///
/// Returns `Ok(None)` when fewer than [`HEADER_LEN`] bytes are present, the
/// same end-of-stream answer a [`FrameReader`] gives. An oversized header is
/// rejected before the body is looked at. Bytes after the first frame are
/// ignored; the frame occupies `HEADER_LEN + payload.len()` bytes.
///
/// # Example
///
/// ```rust
/// use tinyredis_protocol::{decode_frame, encode_frame};
///
/// let bytes = encode_frame(b"Hello, Server!").unwrap();
/// assert_eq!(bytes.len(), 18);
/// assert_eq!(decode_frame(&bytes).unwrap(), Some(&b"Hello, Server!"[..]));
/// ```
pub fn decode_frame(data: &[u8]) -> ProtocolResult<Option<&[u8]>> {
    let Some((header, body)) = data.split_first_chunk::<HEADER_LEN>() else {
        return Ok(None);
    };

    let len = declared_len(*header)?;

    if body.len() < len {
        return Err(ProtocolError::Truncated {
            expected: len,
            received: body.len(),
        });
    }

    Ok(Some(&body[..len]))
}

/// Rejects payload sizes that cannot be carried in one frame.
fn checked_len(len: usize) -> ProtocolResult<u32> {
    match u32::try_from(len) {
        Ok(len) if len <= MAX_MESSAGE_SIZE => Ok(len),
        _ => Err(ProtocolError::FrameTooLarge {
            size: u32::try_from(len).unwrap_or(u32::MAX),
            max: MAX_MESSAGE_SIZE,
        }),
    }
}

/// Parses a length prefix and enforces the size limit.
fn declared_len(header: [u8; HEADER_LEN]) -> ProtocolResult<usize> {
    let len = u32::from_le_bytes(header);
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(len as usize)
}

/// Fills `buf` from `reader`, retrying short and interrupted reads.
///
/// Returns the number of bytes read, which is less than `buf.len()` only if
/// the stream reached EOF first.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads framed messages from a byte stream.
///
/// This struct wraps a reader and provides methods to read complete frames.
pub struct FrameReader<R> {
    reader: R,
}

impl<R: Read> FrameReader<R> {
    /// Creates a new FrameReader wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads a single frame and returns its payload.
    ///
    /// Returns `Ok(None)` if the stream closes before a full header arrives.
    /// Returns [`ProtocolError::FrameTooLarge`] without consuming the body
    /// when the header declares more than [`MAX_MESSAGE_SIZE`] bytes, and
    /// [`ProtocolError::Truncated`] if the stream closes cleanly mid-body.
    ///
    /// Any other read failure, including a reset in the middle of the body,
    /// is returned as [`ProtocolError::Io`] with the original error kind, so
    /// it is not reported as a protocol violation.
    pub fn read_frame(&mut self) -> ProtocolResult<Option<Vec<u8>>> {
        let mut header = [0u8; HEADER_LEN];
        let received = read_full(&mut self.reader, &mut header)?;
        if received == 0 {
            return Ok(None);
        }
        if received < HEADER_LEN {
            warn!(received, "stream closed inside frame header, treating as end of stream");
            return Ok(None);
        }

        let len = declared_len(header)?;

        let mut payload = vec![0u8; len];
        let received = read_full(&mut self.reader, &mut payload)?;
        if received < len {
            return Err(ProtocolError::Truncated {
                expected: len,
                received,
            });
        }

        trace!(len, "frame read");
        Ok(Some(payload))
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Returns a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Unwraps this FrameReader, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Writes framed messages to a byte stream.
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: Write> FrameWriter<W> {
    /// Creates a new FrameWriter wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes a single frame and flushes it to the peer.
    ///
    /// Header and payload go out as one buffer; partial writes are retried
    /// until every byte is sent or the writer fails.
    pub fn write_frame(&mut self, payload: &[u8]) -> ProtocolResult<()> {
        let data = encode_frame(payload)?;
        self.writer.write_all(&data)?;
        self.writer.flush()?;
        trace!(len = payload.len(), "frame written");
        Ok(())
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Unwraps this FrameWriter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
