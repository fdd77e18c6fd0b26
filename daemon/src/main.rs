//! KYC gateway daemon: entry point for running the service.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use kyc_node::{init_logging, Backend, KycNode, LogFormat, ServiceConfig};

#[derive(Parser)]
#[command(name = "kyc-daemon", about = "KYC intermediary between the verification protocol and mobile clients")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "KYC_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the LMDB environment.
    #[arg(long, env = "KYC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Storage backend: "lmdb" or "memory".
    #[arg(long, env = "KYC_BACKEND")]
    backend: Option<Backend>,

    /// HTTP port.
    #[arg(long, env = "SERVER_PORT")]
    rpc_port: Option<u16>,

    /// Log format: "human" or "json".
    #[arg(long, env = "KYC_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "KYC_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the gateway until SIGINT/SIGTERM.
    Run,
    /// Print the effective configuration as TOML and exit.
    Config,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(ServiceConfig, Command)> {
        let base = match &self.config {
            Some(path) => ServiceConfig::from_toml_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ServiceConfig::default(),
        };
        let config = ServiceConfig {
            data_dir: self.data_dir.unwrap_or(base.data_dir),
            backend: self.backend.unwrap_or(base.backend),
            rpc_port: self.rpc_port.unwrap_or(base.rpc_port),
            log_format: self
                .log_format
                .map(|f| f.to_string())
                .unwrap_or(base.log_format),
            log_level: self.log_level.unwrap_or(base.log_level),
            ..base
        };
        config.validate()?;
        Ok((config, self.command))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, command) = Cli::parse().into_config()?;

    match command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Run => {
            init_logging(config.log_format()?, &config.log_level)
                .map_err(anyhow::Error::msg)
                .context("installing log subscriber")?;
            tracing::info!(
                "Starting KYC gateway (backend: {}, HTTP: {}, data: {})",
                config.backend,
                config.rpc_port,
                config.data_dir.display(),
            );

            let node = KycNode::new(config).context("initialising node")?;
            node.start().await?;

            tracing::info!("KYC daemon exited cleanly");
        }
    }

    Ok(())
}
