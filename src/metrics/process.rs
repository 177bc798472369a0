use crate::auth::AuthType;
use metrics::{describe_gauge, gauge};

/// Register the metrics for the application
pub(super) fn register_metrics() {
    describe_gauge!(
        "process_start_time_seconds",
        "Start time of the process in seconds since the Unix epoch"
    );

    // Always 1. Labeled with the package name and version.
    describe_gauge!(
        "dashboard_build_info",
        "Build information of the dashboard, labeled by package and version"
    );

    // Always 1 for the configured mode. Labeled with the auth type.
    describe_gauge!(
        "dashboard_auth_mode",
        "Authentication mode the dashboard was started with"
    );

    gauge!("process_start_time_seconds").set(chrono::Utc::now().timestamp() as f64);
    gauge!(
        "dashboard_build_info",
        "package" => env!("CARGO_PKG_NAME"),
        "version" => env!("CARGO_PKG_VERSION")
    )
    .set(1.0);
}

/// Record the authentication mode from the loaded configuration
pub fn record_auth_mode(auth_type: &AuthType) {
    gauge!("dashboard_auth_mode", "type" => auth_type.to_string()).set(1.0);
}
