//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_bootstrap_total` (counter): bootstraps by init profile
//! - `bridge_command_total` (counter): finished commands by name and outcome
//! - `bridge_daemon_up` (gauge): 1 while the daemon body is running
//! - `bridge_metrics_scrapes_total` (counter): requests served by `/metrics`
//!
//! A single Prometheus recorder is installed for the whole process the first
//! time a handle is requested.

use std::sync::OnceLock;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

/// Handle to the process-wide recorder, installing it on first use.
pub fn prometheus_handle() -> PrometheusHandle {
    PROMETHEUS
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::warn!("Metrics recorder already installed");
            }
            handle
        })
        .clone()
}

/// Render the current metrics in the text exposition format.
pub fn render() -> String {
    let handle = prometheus_handle();
    handle.run_upkeep();
    handle.render()
}

pub fn record_bootstrap(profile: &'static str) {
    counter!("bridge_bootstrap_total", "profile" => profile).increment(1);
}

pub fn record_command(command: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("bridge_command_total", "command" => command, "outcome" => outcome).increment(1);
}

pub fn set_daemon_up(up: bool) {
    gauge!("bridge_daemon_up").set(if up { 1.0 } else { 0.0 });
}

pub fn record_scrape() {
    counter!("bridge_metrics_scrapes_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_recorded_series() {
        let _ = prometheus_handle();
        record_command("show-config", true);
        set_daemon_up(true);

        let body = render();
        assert!(body.contains("bridge_command_total"));
        assert!(body.contains("bridge_daemon_up"));
    }
}
