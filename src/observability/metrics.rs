//! Batch metrics.
//!
//! # Metrics
//! - `payout_lines_total` (counter): input lines by outcome
//! - `payout_submission_attempts_total` (counter): attempts by classification rule
//! - `payout_submissions_total` (counter): transactions by terminal outcome
//! - `payout_backoff_seconds_total` (counter): time spent waiting to retry
//!
//! A batch run is short-lived, so the exposition is written to a file at the
//! end of the run for a textfile collector to pick up.

use std::path::Path;
use std::time::Duration;

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Render the current exposition into `path`.
pub fn write_exposition(handle: &PrometheusHandle, path: &Path) -> std::io::Result<()> {
    std::fs::write(path, handle.render())
}

pub fn record_line(outcome: &'static str) {
    counter!("payout_lines_total", "outcome" => outcome).increment(1);
}

pub fn record_attempt(classification: &str) {
    counter!("payout_submission_attempts_total", "classification" => classification.to_string())
        .increment(1);
}

pub fn record_submission(outcome: &'static str) {
    counter!("payout_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_backoff(wait: Duration) {
    counter!("payout_backoff_seconds_total").increment(wait.as_secs());
}
