//! # craftform
//!
//! Command-line host for the craftform reconciler.
//!
//! ## Flow
//!
//! 1. Parse flags and subcommand
//! 2. Layer configuration: defaults, environment, `--config` file, flags
//! 3. Build one client and a reconciler for the chosen kind
//! 4. Run the action; Ctrl-C cancels it, including any in-flight request
//! 5. Print the result as JSON on stdout
//!
//! Logs go to stderr so stdout stays machine readable.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

mod cli;
mod commands;

use anyhow::{Context as _, Result};
use clap::Parser;
use craftform_client::{CancelHandle, Client, Context};
use craftform_core::{Cube, Cylinder, Entity};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.client_config()?;
    let policy = cli.poll_policy();
    let client = Client::new(config).context("failed to configure the API client")?;

    let (ctx, handle) = Context::with_cancel();
    tokio::spawn(cancel_on_ctrl_c(handle));

    let output = match cli.command {
        Commands::Cube { action } => {
            let reconciler = commands::reconciler::<Cube>(client, policy)?;
            commands::run(&reconciler, &ctx, action.into()).await?
        }
        Commands::Cylinder { action } => {
            let reconciler = commands::reconciler::<Cylinder>(client, policy)?;
            commands::run(&reconciler, &ctx, action.into()).await?
        }
        Commands::Entity { action } => {
            let reconciler = commands::reconciler::<Entity>(client, policy)?;
            commands::run(&reconciler, &ctx, action.into()).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Cancel the running operation on Ctrl+C.
async fn cancel_on_ctrl_c(handle: CancelHandle) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received Ctrl+C, cancelling");
            handle.cancel();
        }
        Err(err) => error!("Failed to listen for Ctrl+C: {}", err),
    }
}
