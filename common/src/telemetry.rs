// Telemetry module for structured logging and metrics

use anyhow::Result;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize structured logging
///
/// `RUST_LOG` takes precedence over the configured level. With `json` set,
/// every event is emitted as one JSON object carrying the current span.
pub fn init_logging(log_level: &str, json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let layer = if json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(env_filter)
            .boxed()
    } else {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_filter(env_filter)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::info!(log_level, json, "Structured logging initialized");
    Ok(())
}

/// Install the Prometheus recorder and describe the service metrics
///
/// The returned handle renders the scrape body for `GET /metrics`.
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    describe_counter!(
        "climate_requests_total",
        "Total number of API requests by route and status"
    );
    describe_histogram!(
        "climate_query_duration_seconds",
        "Duration of dataset queries in seconds"
    );

    tracing::info!("Prometheus metrics recorder installed");
    Ok(handle)
}

/// Count one handled request
#[inline]
pub fn record_request(route: &str, status: u16) {
    counter!(
        "climate_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record how long one dataset query took
#[inline]
pub fn record_query_duration(query: &'static str, duration_seconds: f64) {
    histogram!("climate_query_duration_seconds", "query" => query).record(duration_seconds);
}

#[cfg(test)]
mod tests {
    use super::*;

    // The recorder is process-global, so this is the only test in the crate that installs it
    #[test]
    fn test_recorded_metrics_appear_in_scrape() {
        let handle = init_metrics().unwrap();

        record_request("/api/v1.0/tobs", 200);
        record_query_duration("latest_date", 0.002);

        let rendered = handle.render();
        assert!(rendered.contains("climate_requests_total"), "{rendered}");
        assert!(rendered.contains(r#"route="/api/v1.0/tobs""#), "{rendered}");
        assert!(rendered.contains(r#"status="200""#), "{rendered}");
        assert!(rendered.contains("climate_query_duration_seconds"), "{rendered}");
        assert!(rendered.contains(r#"query="latest_date""#), "{rendered}");
    }
}
