// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::error;

use overc_agent::reporter::{AlertReport, Overclient};
use overc_agent::{config, run_monitor, ServiceReport};
use overc_core::CheckState;

#[derive(Debug, Parser)]
#[command(name = "overcli", about = "OverC monitoring agent")]
struct Cli {
    /// OverC server URL: "http://<host>:<port>/"
    #[arg(short = 's', long = "server", env = "OVERC_SERVER")]
    server_url: Option<String>,

    /// Server identification: "<name>:<key>"
    #[arg(short = 'i', long = "server-id", env = "OVERC_SERVER_ID")]
    server_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ping the collector
    Ping,

    /// Report a single service status
    ServiceStatus {
        /// Promised reporting period, seconds
        period: i64,
        /// Service name
        name: String,
        /// Service state (OK, WARN, FAIL, UNK)
        state: String,
        /// Additional information
        #[arg(default_value = "")]
        info: String,
    },

    /// Report a single alert
    Alert {
        /// Service to report the alert for
        #[arg(long)]
        service: Option<String>,
        message: String,
    },

    /// Continuous monitoring driven by a config file
    Monitor {
        /// Monitoring configuration file (TOML)
        config: PathBuf,
    },
}

fn client(server_url: Option<&str>, server_id: Option<&str>) -> anyhow::Result<Overclient> {
    let url = server_url.context("--server is required")?;
    let id = server_id.context("--server-id is required")?;
    let (name, key) = id
        .split_once(':')
        .context("--server-id must be \"<name>:<key>\"")?;
    Ok(Overclient::new(url, name, key)?)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli { server_url, server_id, command } = cli;
    let make_client = || client(server_url.as_deref(), server_id.as_deref());

    match command {
        Command::Ping => make_client()?.ping().await?,
        Command::ServiceStatus { period, name, state, info } => {
            let state: CheckState = state
                .parse()
                .context("state must be one of OK, WARN, FAIL, UNK")?;
            make_client()?
                .set_service_status(period, &[ServiceReport { name, state, info }])
                .await?;
        }
        Command::Alert { service, message } => {
            make_client()?.set_alerts(&[AlertReport { message, service }]).await?;
        }
        Command::Monitor { config: path } => {
            let config = config::load(&path)?;
            run_monitor(config).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(cli).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}
