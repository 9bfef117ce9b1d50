pub mod metrics;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tracing::info;

/// Errors raised while installing the observability sidecar's scrape endpoint.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("failed to bind Prometheus exporter: {0}")]
    Build(#[from] BuildError),
}

/// Installs the global [`metrics`] recorder and binds an HTTP scrape endpoint on `listen_addr`.
///
/// Returns a [`PrometheusHandle`] that can be used to render the registry on demand, though the
/// exporter already serves `/metrics` on a background task.
pub fn install_sidecar(listen_addr: SocketAddr) -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        .with_http_listener(listen_addr)
        .install_recorder()?;

    info!(%listen_addr, "observability sidecar listening for Prometheus scrapes");

    describe();

    Ok(handle)
}

/// Registers descriptions for every metric the pipeline emits, so the `/metrics` output carries
/// `# HELP` lines even before the first observation.
fn describe() {
    use self::metrics::*;

    metrics::describe_histogram!(
        METRIC_REQUEST_PROCESSING_SECONDS.name(),
        METRIC_REQUEST_PROCESSING_SECONDS.description()
    );
    metrics::describe_counter!(
        METRIC_REQUEST_COUNT.name(),
        METRIC_REQUEST_COUNT.description()
    );
    metrics::describe_counter!(
        METRIC_HEARTBEAT_RESPONSES.name(),
        METRIC_HEARTBEAT_RESPONSES.description()
    );
    metrics::describe_counter!(
        METRIC_BARS_EMITTED_TOTAL.name(),
        METRIC_BARS_EMITTED_TOTAL.description()
    );
}
