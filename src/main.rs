// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use clap::{Parser, Subcommand};
use skyshift::{
    config::FailoverConfig,
    constants::{DEFAULT_BIND_ADDR, ENV_BIND_ADDR},
    controller::Controller,
    route53::Route53ControlPlane,
    server,
    trigger::handle_invocation,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Multi-cloud DNS failover controller
#[derive(Debug, Parser)]
#[command(name = "skyshift", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one evaluation cycle and print the trigger result as JSON
    RunOnce {
        /// Opaque JSON event passed to the trigger
        #[arg(long, default_value = "{}")]
        event: String,
        /// Opaque JSON invocation context passed to the trigger
        #[arg(long, default_value = "{}")]
        context: String,
    },
    /// Serve the HTTP trigger until interrupted
    Serve {
        /// Listen address
        #[arg(long, env = ENV_BIND_ADDR, default_value = DEFAULT_BIND_ADDR)]
        bind: SocketAddr,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("skyshift-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    // Initialize logging with custom format
    // Format: timestamp file:line LEVEL message
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Respects RUST_LOG_FORMAT environment variable for output format (json or text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting skyshift failover controller");

    // Configuration errors are fatal before the first cycle
    let config = FailoverConfig::from_env()
        .inspect_err(|e| error!(error = %e, "Invalid configuration"))?;
    debug!(
        zone_id = %config.dns.zone_id,
        domain = %config.dns.domain,
        unknown_policy = %config.unknown_policy,
        "Configuration loaded"
    );

    debug!("Initializing Route 53 client");
    let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let plane = Arc::new(Route53ControlPlane::from_sdk_config(&sdk_config));
    let controller = Arc::new(Controller::new(&config, plane.clone(), plane));

    match cli.command {
        Command::RunOnce { event, context } => {
            let event: serde_json::Value =
                serde_json::from_str(&event).context("--event must be valid JSON")?;
            let context: serde_json::Value =
                serde_json::from_str(&context).context("--context must be valid JSON")?;
            let response = handle_invocation(&controller, &event, &context).await;
            println!("{}", serde_json::to_string(&response)?);

            if !response.is_success() {
                anyhow::bail!("Invocation failed with status {}", response.status_code);
            }
            Ok(())
        }
        Command::Serve { bind } => {
            server::serve(bind, controller).await?;
            info!("Trigger server stopped");
            Ok(())
        }
    }
}
