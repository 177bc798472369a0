use clap::Parser;
use keep_dashboard::{
    Args,
    analytics::{self, AnalyticsProvider},
    config,
    feed::AlertFeed,
    http::{self, AppState},
    keep::KeepClient,
    metrics, signal_handler,
};
use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Register metrics
    metrics::register_metrics();

    // Parse config
    let args = Args::parse();
    let config = config::Config::from_file(&args.config)?
        .with_refresh_interval(Duration::from_secs(args.interval));

    metrics::process::record_auth_mode(&config.auth.auth_type);

    // Handle signals
    signal_handler()?;

    // Analytics are set up once for the whole process
    let tracker = analytics::init(config.analytics.as_ref());
    let analytics_enabled = config
        .analytics
        .as_ref()
        .is_some_and(|analytics| analytics.key.is_some());
    let analytics = AnalyticsProvider::new(tracker, analytics_enabled);

    let client = KeepClient::new(config.keep.clone(), config.ui_url(), config.session())?;

    // Create and start the alert feed
    let feed = Arc::new(AlertFeed::new(client.clone(), config.refresh_interval));
    let alerts = feed.subscribe();

    tokio::spawn({
        let feed = feed.clone();

        async move {
            if let Err(e) = feed.start().await {
                tracing::error!("Alert feed stopped: {}", e);
            }
        }
    });

    // Start the HTTP server
    http::create_server(AppState::new(config, client, alerts, analytics)).await
}
