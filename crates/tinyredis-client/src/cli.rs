//! Command-line interface definition.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// tinyredis - framed request/response over TCP
#[derive(Debug, Parser)]
#[command(name = "tinyredis")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "TINYREDIS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Append logs to this file as well as the console
    #[arg(long, env = "TINYREDIS_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the server in the foreground
    Server(ServerArgs),

    /// Send messages to a server and print the replies
    Send(SendArgs),

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options for `tinyredis server`.
#[derive(Debug, Default, Args)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Echo each request back instead of sending the fixed reply
    #[arg(long, conflicts_with = "reply")]
    pub echo: bool,

    /// Fixed reply sent for every request
    #[arg(long)]
    pub reply: Option<String>,

    /// Exit after serving a single connection
    #[arg(long)]
    pub once: bool,
}

/// Options for `tinyredis send`.
#[derive(Debug, Default, Args)]
pub struct SendArgs {
    /// Server address (host:port)
    #[arg(long, short, env = "TINYREDIS_ADDR")]
    pub addr: Option<String>,

    /// Print the exchanges as JSON
    #[arg(long)]
    pub json: bool,

    /// Messages to send, in order, over one connection
    pub messages: Vec<String>,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
