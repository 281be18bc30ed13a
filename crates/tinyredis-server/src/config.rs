//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};

use tinyredis_protocol::DEFAULT_PORT;

/// Listen backlog used when none is configured.
pub const DEFAULT_BACKLOG: i32 = 128;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,

    /// Whether to set `SO_REUSEADDR` so a restarted server can rebind at once.
    pub reuse_address: bool,

    /// Maximum number of pending connections queued by the kernel.
    pub backlog: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            reuse_address: true,
            backlog: DEFAULT_BACKLOG,
        }
    }
}

impl ServerConfig {
    /// Creates a new server configuration with the given bind address.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    /// Builder: set address reuse.
    pub fn with_reuse_address(mut self, reuse: bool) -> Self {
        self.reuse_address = reuse;
        self
    }

    /// Builder: set listen backlog.
    pub fn with_backlog(mut self, backlog: i32) -> Self {
        self.backlog = backlog;
        self
    }
}

/// Returns the default bind address, all interfaces on [`DEFAULT_PORT`].
pub fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:1234");
        assert!(config.reuse_address);
        assert_eq!(config.backlog, 128);
    }

    #[test]
    fn custom_config() {
        let addr: SocketAddr = "127.0.0.1:6380".parse().unwrap();
        let config = ServerConfig::new(addr)
            .with_reuse_address(false)
            .with_backlog(16);

        assert_eq!(config.bind_addr, addr);
        assert!(!config.reuse_address);
        assert_eq!(config.backlog, 16);
    }
}
