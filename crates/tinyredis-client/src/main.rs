//! tinyredis CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use tinyredis_client::cli::{Cli, Command, ConfigAction, SendArgs};
use tinyredis_client::commands;
use tinyredis_client::config::ClientConfig;
use tinyredis_client::error::{ClientError, ClientResult};
use tinyredis_core::init_tracing;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)
    } else {
        Ok(ClientConfig::load().unwrap_or_default())
    }
}

fn init_logging(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let server = matches!(cli.command, Some(Command::Server(_)));

    let mut tracing_config = config
        .logging
        .tracing_config(cli.debug, server)
        .map_err(ClientError::Config)?;
    if let Some(ref path) = cli.log_file {
        tracing_config = tracing_config.with_log_file(path);
    }

    init_tracing(tracing_config).map_err(|e| ClientError::Config(e.to_string()))
}

fn run(cli: Cli, config: &ClientConfig) -> ClientResult<()> {
    match cli.command {
        Some(Command::Server(args)) => commands::server::run(&args, config),
        Some(Command::Send(args)) => commands::send::run(&args, config),
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(config),
            ConfigAction::Validate => commands::config::validate(config),
            ConfigAction::Path => commands::config::path(),
        },
        // Bare invocation sends one greeting.
        None => commands::send::run(&SendArgs::default(), config),
    }
}
