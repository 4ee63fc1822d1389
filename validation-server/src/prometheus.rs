use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use feature_flags::flag_matching::{FlagMatch, UsageTracker};

pub fn setup_metrics_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install prometheus recorder")
}

/// Usage telemetry for the ops dashboard. Fire-and-forget per the evaluator
/// contract.
pub struct MetricsUsageTracker;

impl UsageTracker for MetricsUsageTracker {
    fn track(&self, key: &str, result: &FlagMatch) {
        counter!(
            "flag_usage_total",
            "flag" => key.to_string(),
            "enabled" => if result.enabled { "true" } else { "false" }
        )
        .increment(1);
    }
}
