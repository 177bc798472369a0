use clap::Parser;
use std::path::PathBuf;
use tokio::{
    select,
    signal::unix::{SignalKind, signal},
};

pub mod analytics;
pub mod auth;
pub mod config;
pub mod dialogs;
pub mod feed;
pub mod fetch;
pub mod http;
pub mod keep;
pub mod metrics;
pub mod modal;
pub mod presets;
pub mod screens;
pub mod view;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Interval in seconds between alert refreshes (0 fetches once and never polls)
    #[arg(short, long, default_value = "30")]
    pub interval: u64,
}

/// Handle signals
pub fn signal_handler() -> anyhow::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        select! {
            _ = sigterm.recv() => {
                tracing::info!("SIGTERM received, exiting");
                std::process::exit(0);
            }
            _ = sigint.recv() => {
                tracing::info!("SIGINT received, exiting");
                std::process::exit(0);
            }
        }
    });

    Ok(())
}
