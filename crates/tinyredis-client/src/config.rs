//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/tinyredis/config.toml` by default. Every section is optional;
//! missing values fall back to the built-in defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;

use tinyredis_core::{TracingConfig, TracingOutputFormat};
use tinyredis_protocol::DEFAULT_PORT;
use tinyredis_server::{DEFAULT_BACKLOG, DEFAULT_REPLY, ReplyPolicy, ServerConfig, ServerError};

/// Configuration for the tinyredis binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Listener settings used by `tinyredis server`.
    pub server: ServerSettings,

    /// Connection settings used by `tinyredis send`.
    pub client: ConnectionSettings,

    /// Log sinks.
    pub logging: LoggingSettings,
}

/// How the server answers requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    /// Always send `reply_text`.
    #[default]
    Fixed,
    /// Echo the request back.
    Echo,
}

/// Server/listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to listen on.
    pub bind: SocketAddr,

    /// Set `SO_REUSEADDR` on the listening socket.
    pub reuse_address: bool,

    /// Listen backlog.
    pub backlog: i32,

    /// Reply mode.
    pub reply: ReplyMode,

    /// Reply payload in `fixed` mode.
    pub reply_text: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: tinyredis_server::default_bind_addr(),
            reuse_address: true,
            backlog: DEFAULT_BACKLOG,
            reply: ReplyMode::Fixed,
            reply_text: DEFAULT_REPLY.to_string(),
        }
    }
}

impl ServerSettings {
    /// Converts to the server crate's configuration.
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig::new(self.bind)
            .with_reuse_address(self.reuse_address)
            .with_backlog(self.backlog)
    }

    /// Builds the reply policy, checking that a fixed reply fits in a frame.
    pub fn reply_policy(&self) -> Result<ReplyPolicy, String> {
        match self.reply {
            ReplyMode::Echo => Ok(ReplyPolicy::Echo),
            ReplyMode::Fixed => {
                ReplyPolicy::fixed(self.reply_text.as_str()).map_err(|e| match e {
                    ServerError::Config { message } => message,
                    other => other.to_string(),
                })
            }
        }
    }
}

/// Connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Server address (host:port).
    pub address: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            address: default_server_address(),
        }
    }
}

/// Console log layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One line per event.
    #[default]
    Compact,
    /// Multi-line, human-readable.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl From<LogFormat> for TracingOutputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Compact => Self::Compact,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Json => Self::Json,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,

    /// Console layout.
    pub format: LogFormat,

    /// Append logs to this file as well as the console.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            file: None,
        }
    }
}

impl LoggingSettings {
    /// Parses the configured level.
    pub fn level(&self) -> Result<Level, String> {
        Level::from_str(&self.level).map_err(|_| format!("invalid log level: {}", self.level))
    }

    /// Applies these settings on top of `base`.
    pub fn apply(&self, base: TracingConfig) -> Result<TracingConfig, String> {
        let mut config = base
            .with_level(self.level()?)
            .with_format(self.format.into());
        if let Some(ref file) = self.file {
            config = config.with_log_file(file);
        }
        Ok(config)
    }

    /// Builds the tracing setup for one invocation.
    ///
    /// `debug` starts from [`TracingConfig::cli_debug`] and pins the filter
    /// to debug, so `RUST_LOG` cannot lower it. `server` turns on span
    /// events for connection spans.
    pub fn tracing_config(&self, debug: bool, server: bool) -> Result<TracingConfig, String> {
        if !debug {
            let base = if server {
                TracingConfig::server()
            } else {
                TracingConfig::default()
            };
            return self.apply(base);
        }

        // The configured level is still validated even though debug wins.
        self.level()?;
        let mut config = TracingConfig::cli_debug()
            .with_format(self.format.into())
            .with_env_filter("tinyredis=debug");
        config.include_span_events = server;
        if let Some(ref file) = self.file {
            config = config.with_log_file(file);
        }
        Ok(config)
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tinyredis")
    }
}

/// Returns the address the client dials by default.
pub fn default_server_address() -> String {
    format!("127.0.0.1:{}", DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_greet_on_port_1234() {
        let config = ClientConfig::default();
        assert_eq!(config.server.bind.to_string(), "0.0.0.0:1234");
        assert_eq!(config.client.address, "127.0.0.1:1234");
        assert_eq!(
            config.server.reply_policy().unwrap(),
            ReplyPolicy::Fixed(b"Hello, Client!".to_vec())
        );
        assert_eq!(config.logging.level().unwrap(), Level::INFO);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.backlog, DEFAULT_BACKLOG);
        assert!(config.server.reuse_address);
    }

    #[test]
    fn parse_full_config() {
        let toml_content = r#"
[server]
bind = "127.0.0.1:6380"
reuse_address = false
backlog = 16
reply = "echo"

[client]
address = "localhost:6380"

[logging]
level = "debug"
file = "log.txt"
"#;
        let config: ClientConfig = toml::from_str(toml_content).unwrap();

        let server = config.server.to_server_config();
        assert_eq!(server.bind_addr.to_string(), "127.0.0.1:6380");
        assert!(!server.reuse_address);
        assert_eq!(server.backlog, 16);
        assert_eq!(config.server.reply_policy().unwrap(), ReplyPolicy::Echo);

        assert_eq!(config.client.address, "localhost:6380");

        let tracing = config.logging.apply(TracingConfig::default()).unwrap();
        assert_eq!(tracing.default_level, Level::DEBUG);
        assert_eq!(tracing.output_format, TracingOutputFormat::Json);
        assert_eq!(tracing.log_file, Some(PathBuf::from("log.txt")));
    }

    #[test]
    fn unknown_log_format_fails_to_parse() {
        let result: Result<ClientConfig, _> = toml::from_str("[logging]\nformat = \"xml\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn tracing_config_follows_settings() {
        let settings = LoggingSettings {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
            file: None,
        };

        let cli = settings.tracing_config(false, false).unwrap();
        assert_eq!(cli.default_level, Level::WARN);
        assert_eq!(cli.output_format, TracingOutputFormat::Pretty);
        assert!(cli.env_filter.is_none());
        assert!(!cli.include_span_events);

        let server = settings.tracing_config(false, true).unwrap();
        assert!(server.include_span_events);
    }

    #[test]
    fn debug_flag_uses_debug_preset_and_pins_filter() {
        let settings = LoggingSettings {
            level: "error".to_string(),
            format: LogFormat::Json,
            file: Some(PathBuf::from("log.txt")),
        };

        let config = settings.tracing_config(true, true).unwrap();
        assert_eq!(config.default_level, Level::DEBUG);
        assert!(config.include_location);
        assert!(config.include_span_events);
        assert_eq!(config.output_format, TracingOutputFormat::Json);
        assert_eq!(config.env_filter.as_deref(), Some("tinyredis=debug"));
        assert_eq!(config.log_file, Some(PathBuf::from("log.txt")));
    }

    #[test]
    fn debug_flag_still_rejects_bad_level() {
        let settings = LoggingSettings {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert!(settings.tracing_config(true, false).is_err());
    }

    #[test]
    fn custom_fixed_reply() {
        let config: ClientConfig =
            toml::from_str("[server]\nreply = \"fixed\"\nreply_text = \"world\"\n").unwrap();
        assert_eq!(
            config.server.reply_policy().unwrap(),
            ReplyPolicy::Fixed(b"world".to_vec())
        );
    }

    #[test]
    fn oversized_reply_text_is_rejected() {
        let settings = ServerSettings {
            reply_text: "x".repeat(5000),
            ..Default::default()
        };
        let err = settings.reply_policy().unwrap_err();
        assert!(err.contains("5000 bytes"));
    }

    #[test]
    fn invalid_level_is_rejected() {
        let settings = LoggingSettings {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.level().unwrap_err(), "invalid log level: loud");
    }

    #[test]
    fn unknown_reply_mode_fails_to_parse() {
        let result: Result<ClientConfig, _> = toml::from_str("[server]\nreply = \"shout\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]\naddress = \"10.0.0.1:1234\"").unwrap();

        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(config.client.address, "10.0.0.1:1234");
    }

    #[test]
    fn load_from_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.starts_with("failed to read config"));
    }

    #[test]
    fn dump_roundtrips_through_toml() {
        let config = ClientConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.bind, config.server.bind);
        assert_eq!(parsed.server.reply, ReplyMode::Fixed);
        assert_eq!(parsed.client.address, config.client.address);
    }

    #[test]
    fn default_path_is_under_tinyredis_dir() {
        let path = ClientConfig::default_path();
        assert!(path.ends_with("tinyredis/config.toml"));
    }
}
