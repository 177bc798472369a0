use crate::metrics::Timer;
use metrics::{counter, describe_counter, describe_histogram};

/// Register the metrics for the application
pub(super) fn register_metrics() {
    // Count of failed backend requests. Should be labeled with the target.
    describe_counter!(
        "external_request_failures_total",
        "Total number of failed backend requests"
    );

    // Latency of backend requests in seconds, labeled by the target.
    describe_histogram!(
        "external_request_duration_seconds",
        "Duration of backend requests in seconds"
    );

    // Number of analytics events handed to the analytics service, labeled by event kind and status.
    describe_counter!(
        "analytics_events_total",
        "Total number of analytics events sent"
    );
}

/// Record a backend request failure for a given target
pub fn record_external_request_failure(target: Target) {
    counter!("external_request_failures_total", "target" => target.to_string()).increment(1);
}

/// Create a timer for a backend request to a given target
pub fn external_request_timer(target: Target) -> Timer {
    Timer::new("external_request_duration_seconds").with_label("target", target.to_string())
}

/// Record an analytics event delivery
pub fn record_analytics_event(event: &str, status: crate::metrics::Status) {
    counter!("analytics_events_total", "event" => event.to_string(), "status" => status.to_string())
        .increment(1);
}

#[derive(Debug, Clone, Copy)]
pub enum Target {
    Alerts,
    Presets,
    Providers,
    Workflows,
    Enrichment,
    ApiKey,
    Users,
    RuntimeConfig,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Alerts => write!(f, "alerts"),
            Target::Presets => write!(f, "presets"),
            Target::Providers => write!(f, "providers"),
            Target::Workflows => write!(f, "workflows"),
            Target::Enrichment => write!(f, "enrichment"),
            Target::ApiKey => write!(f, "apikey"),
            Target::Users => write!(f, "users"),
            Target::RuntimeConfig => write!(f, "runtime_config"),
        }
    }
}
