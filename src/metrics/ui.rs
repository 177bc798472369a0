use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Register the metrics for the application
pub(super) fn register_metrics() {
    // Modal transitions. Should be labeled with the dialog kind and action (open, close, confirm).
    describe_counter!(
        "modal_transitions_total",
        "Total number of dialog open/close/confirm transitions"
    );

    // Preset lookups that matched nothing and rendered an empty screen.
    describe_counter!(
        "preset_misses_total",
        "Total number of preset lookups that matched no preset"
    );

    // Responses dropped because a newer request had already been issued. Labeled by resource.
    describe_counter!(
        "stale_responses_total",
        "Total number of fetch responses discarded as stale"
    );

    // Number of alerts in the last snapshot published by the feed.
    describe_gauge!("feed_alerts", "Number of alerts in the latest feed snapshot");

    // Timestamp of the last successful feed refresh
    describe_gauge!(
        "last_successful_refresh_timestamp",
        "Timestamp of the last successful alert feed refresh"
    );
}

/// Record a dialog transition
pub fn record_modal_transition(kind: &str, action: &str) {
    counter!("modal_transitions_total", "kind" => kind.to_string(), "action" => action.to_string())
        .increment(1);
}

/// Record a preset lookup miss
pub fn record_preset_miss() {
    counter!("preset_misses_total").increment(1);
}

/// Record a discarded stale response
pub fn record_stale_response(resource: &str) {
    counter!("stale_responses_total", "resource" => resource.to_string()).increment(1);
}

/// Record a successful feed refresh and its alert count
pub fn record_feed_refresh(alerts: usize) {
    gauge!("feed_alerts").set(alerts as f64);
    gauge!("last_successful_refresh_timestamp").set(chrono::Utc::now().timestamp() as f64);
}
