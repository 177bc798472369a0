use crate::{
    fetch::Resource,
    keep::{KeepClient, alert::AlertDto},
    metrics::ui::record_feed_refresh,
};
use std::time::Duration;
use tokio::sync::watch;

const RETRY_DELAY: Duration = Duration::from_secs(120);

/// Latest alerts published by the feed
#[derive(Debug, Clone, Default)]
pub struct AlertSnapshot {
    /// `None` until the first successful fetch
    pub alerts: Option<Vec<AlertDto>>,
    pub is_async_loading: bool,
    pub error: Option<String>,
}

/// Polls the backend for alerts and publishes snapshots to subscribers
pub struct AlertFeed {
    client: KeepClient,
    interval: Duration,
    alerts: Resource<Vec<AlertDto>>,
    sender: watch::Sender<AlertSnapshot>,
}

impl AlertFeed {
    /// Create a new feed. A zero interval fetches once and never polls.
    pub fn new(client: KeepClient, interval: Duration) -> Self {
        let (sender, _) = watch::channel(AlertSnapshot::default());

        Self {
            client,
            interval,
            alerts: Resource::new("alerts"),
            sender,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AlertSnapshot> {
        self.sender.subscribe()
    }

    /// Start the polling loop
    pub async fn start(&self) -> anyhow::Result<()> {
        tracing::info!("Starting alert feed");

        loop {
            if let Err(e) = self.refresh().await {
                tracing::error!("Alert refresh failed: {}", e);

                if self.interval.is_zero() {
                    return Ok(());
                }
                tokio::time::sleep(RETRY_DELAY.min(self.interval)).await;
                continue;
            }

            if self.interval.is_zero() {
                return Ok(());
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Fetch alerts once and publish the result
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> anyhow::Result<()> {
        self.sender
            .send_modify(|snapshot| snapshot.is_async_loading = true);

        if !self.alerts.load(self.client.get_alerts()).await {
            // A newer refresh owns the snapshot
            return Ok(());
        }

        let snapshot = self.alerts.snapshot();
        self.sender.send_modify(|published| {
            published.alerts = snapshot.data.clone();
            published.is_async_loading = false;
            published.error = snapshot.error.clone();
        });

        if let Some(e) = snapshot.error {
            return Err(anyhow::anyhow!(e));
        }

        let count = snapshot.data.as_ref().map(Vec::len).unwrap_or(0);
        tracing::info!("Fetched {} alerts", count);
        record_feed_refresh(count);

        Ok(())
    }
}
