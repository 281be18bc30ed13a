//! Configuration commands.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.server.reply_policy().map_err(ClientError::Config)?;
    config.logging.level().map_err(ClientError::Config)?;

    if config.server.backlog <= 0 {
        return Err(ClientError::Config(format!(
            "server backlog must be positive, got {}",
            config.server.backlog
        )));
    }

    if config.client.address.is_empty() {
        return Err(ClientError::Config("client address must not be empty".into()));
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    let config_path = ClientConfig::default_path();
    println!("config: {}", config_path.display());
    Ok(())
}
