//! Server command: runs the listener in the foreground.
//!
//! Settings come from `[server]` in config.toml, with command-line flags
//! taking precedence.

use tracing::info;

use tinyredis_server::{ReplyPolicy, ServerConfig, ServerError, TcpServer};

use crate::cli::ServerArgs;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Resolves the listener configuration and reply policy.
pub fn resolve(
    args: &ServerArgs,
    config: &ClientConfig,
) -> ClientResult<(ServerConfig, ReplyPolicy)> {
    let mut server_config = config.server.to_server_config();
    if let Some(bind) = args.bind {
        server_config.bind_addr = bind;
    }

    let policy = if args.echo {
        ReplyPolicy::Echo
    } else if let Some(ref text) = args.reply {
        ReplyPolicy::fixed(text.as_str()).map_err(|e| match e {
            ServerError::Config { message } => ClientError::Config(message),
            other => other.into(),
        })?
    } else {
        config.server.reply_policy().map_err(ClientError::Config)?
    };

    Ok((server_config, policy))
}

/// Starts the server.
///
/// Blocks forever unless `--once` is given, in which case it returns after
/// the first connection has been served.
pub fn run(args: &ServerArgs, config: &ClientConfig) -> ClientResult<()> {
    let (server_config, policy) = resolve(args, config)?;

    let server = TcpServer::bind(server_config)?;
    info!(addr = %server.local_addr()?, ?policy, "Hello, tinyredis server!");

    if args.once {
        for summary in server.run_for(&policy, 1) {
            info!(
                peer = %summary.peer,
                frames = summary.frames,
                clean = summary.is_clean(),
                "Served connection"
            );
        }
        info!("Server stopped");
        Ok(())
    } else {
        server.run(&policy)
    }
}
