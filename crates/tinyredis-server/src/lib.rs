//! Blocking TCP server for the tinyredis framed protocol.
//!
//! This crate provides:
//! - A TCP listener that serves one connection at a time
//! - The request/reply loop run on each connection
//! - Reply policies (fixed greeting or echo)
//!
//! # Example
//!
//! ```rust,no_run
//! use tinyredis_server::{ReplyPolicy, ServerConfig, TcpServer};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = TcpServer::bind(ServerConfig::default())?;
//!     server.run(&ReplyPolicy::Echo)
//! }
//! ```

mod config;
mod error;
mod handler;
mod socket;

pub use config::{DEFAULT_BACKLOG, ServerConfig, default_bind_addr};
pub use error::{ServerError, ServerResult};
pub use handler::{
    ConnectionOutcome, ConnectionSummary, DEFAULT_REPLY, ReplyPolicy, serve_connection,
};
pub use socket::{Connection, TcpServer};
