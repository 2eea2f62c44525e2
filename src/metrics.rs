use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and describe all metrics
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!("costcalc_requests_total", "Total number of API requests");
    describe_counter!(
        "costcalc_pricing_loads_total",
        "Pricing documents loaded, by source"
    );
    describe_counter!(
        "costcalc_pricing_saves_total",
        "Pricing save attempts, by outcome"
    );
    describe_counter!("costcalc_quotes_total", "Quotes calculated, by service type");
    describe_counter!("costcalc_logins_total", "Admin login attempts, by result");
    describe_histogram!(
        "costcalc_store_duration_seconds",
        "Remote store call duration in seconds"
    );
    describe_gauge!("costcalc_info", "Calculator version information");

    gauge!("costcalc_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a request
pub fn record_request(endpoint: &str, method: &str) {
    counter!(
        "costcalc_requests_total",
        "endpoint" => endpoint.to_string(),
        "method" => method.to_string(),
    )
    .increment(1);
}

/// Record a pricing load
pub fn record_pricing_load(source: &str) {
    counter!("costcalc_pricing_loads_total", "source" => source.to_string()).increment(1);
}

/// Record a pricing save outcome
pub fn record_pricing_save(outcome: &str) {
    counter!("costcalc_pricing_saves_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record a calculated quote
pub fn record_quote(service_type: &str) {
    counter!("costcalc_quotes_total", "service_type" => service_type.to_string()).increment(1);
}

/// Record a login attempt
pub fn record_login(result: &str) {
    counter!("costcalc_logins_total", "result" => result.to_string()).increment(1);
}

/// Record the duration of a remote store call
pub fn record_store_duration(source: &str, operation: &str, duration: Duration) {
    histogram!(
        "costcalc_store_duration_seconds",
        "source" => source.to_string(),
        "operation" => operation.to_string(),
    )
    .record(duration.as_secs_f64());
}
