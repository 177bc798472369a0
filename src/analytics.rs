//! Page-view and identify tracking.
//!
//! The process-wide tracker is initialised once at startup with [`init`] and
//! read with [`tracker`]. Until then (or when no analytics key is configured)
//! a no-op tracker is used. Code that emits events takes the tracker as an
//! `Arc<dyn Tracker>` so tests can substitute their own.

use crate::{
    auth::Session,
    config::Analytics as AnalyticsConfig,
    metrics::{Status, external::record_analytics_event},
};
use once_cell::sync::OnceCell;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::mpsc;

pub const PAGEVIEW: &str = "$pageview";
pub const IDENTIFY: &str = "$identify";
pub const ANONYMOUS_ID: &str = "anonymous";

pub trait Tracker: Send + Sync {
    fn identify(&self, distinct_id: &str);

    fn capture(&self, distinct_id: &str, event: &str, properties: Value);
}

/// Drops every event
#[derive(Debug, Default)]
pub struct NoopTracker;

impl Tracker for NoopTracker {
    fn identify(&self, _distinct_id: &str) {}

    fn capture(&self, _distinct_id: &str, _event: &str, _properties: Value) {}
}

#[derive(Debug)]
struct Event {
    name: String,
    distinct_id: String,
    properties: Value,
}

/// Sends events to a PostHog-compatible `/capture/` endpoint from a background task
pub struct PostHogTracker {
    sender: mpsc::UnboundedSender<Event>,
}

impl PostHogTracker {
    /// Start the delivery task. Must be called from within a Tokio runtime.
    pub fn start(api_key: String, host: String) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Event>();
        let client = reqwest::Client::new();
        let url = format!("{}/capture/", host.trim_end_matches('/'));

        tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                let body = json!({
                    "api_key": api_key,
                    "event": event.name,
                    "distinct_id": event.distinct_id,
                    "properties": event.properties,
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                });

                let status = match client.post(&url).json(&body).send().await {
                    Ok(response) if response.status().is_success() => Status::Success,
                    Ok(response) => {
                        tracing::warn!("Analytics event rejected: HTTP {}", response.status());
                        Status::Failure
                    }
                    Err(e) => {
                        tracing::warn!("Failed to send analytics event: {}", e);
                        Status::Failure
                    }
                };

                record_analytics_event(&event.name, status);
            }
        });

        Self { sender }
    }

    fn send(&self, event: Event) {
        if self.sender.send(event).is_err() {
            tracing::warn!("Analytics delivery task has stopped");
        }
    }
}

impl Tracker for PostHogTracker {
    fn identify(&self, distinct_id: &str) {
        self.send(Event {
            name: IDENTIFY.to_string(),
            distinct_id: distinct_id.to_string(),
            properties: json!({}),
        });
    }

    fn capture(&self, distinct_id: &str, event: &str, properties: Value) {
        self.send(Event {
            name: event.to_string(),
            distinct_id: distinct_id.to_string(),
            properties,
        });
    }
}

static TRACKER: OnceCell<Arc<dyn Tracker>> = OnceCell::new();

/// Initialise the process-wide tracker. Later calls return the tracker from the first call.
pub fn init(config: Option<&AnalyticsConfig>) -> Arc<dyn Tracker> {
    TRACKER
        .get_or_init(|| match config {
            Some(AnalyticsConfig {
                key: Some(key),
                host,
            }) => {
                tracing::info!("Sending analytics to {}", host);
                Arc::new(PostHogTracker::start(key.clone(), host.clone())) as Arc<dyn Tracker>
            }
            _ => {
                tracing::info!("Analytics disabled");
                Arc::new(NoopTracker) as Arc<dyn Tracker>
            }
        })
        .clone()
}

/// The process-wide tracker, or a no-op tracker before [`init`]
pub fn tracker() -> Arc<dyn Tracker> {
    match TRACKER.get() {
        Some(tracker) => tracker.clone(),
        None => Arc::new(NoopTracker),
    }
}

/// Emits navigation events for the dashboard
#[derive(Clone)]
pub struct AnalyticsProvider {
    tracker: Arc<dyn Tracker>,
    enabled: bool,
}

impl AnalyticsProvider {
    pub fn new(tracker: Arc<dyn Tracker>, enabled: bool) -> Self {
        Self { tracker, enabled }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopTracker), false)
    }

    /// Identify the session user and record a page view
    pub fn on_navigation(
        &self,
        origin: &str,
        pathname: &str,
        query: Option<&str>,
        session: &Session,
    ) {
        if !self.enabled || pathname.is_empty() {
            return;
        }

        let mut url = format!("{}{}", origin.trim_end_matches('/'), pathname);
        if let Some(query) = query.filter(|query| !query.is_empty()) {
            url = format!("{}?{}", url, query);
        }

        let distinct_id = match session.identity() {
            Some(email) => {
                tracing::debug!("Identifying user in analytics");
                self.tracker.identify(email);
                email
            }
            None => ANONYMOUS_ID,
        };

        tracing::debug!("Sending pageview event for {}", url);
        self.tracker
            .capture(distinct_id, PAGEVIEW, json!({ "$current_url": url }));
    }
}
