//! CLI, TCP client, configuration
//!
//! This crate provides the `tinyredis` command-line interface, which can run
//! the server or act as its client.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod socket;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use socket::{Session, TcpClient};
