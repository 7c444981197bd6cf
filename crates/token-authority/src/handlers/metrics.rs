use axum::extract::State;
use metrics_exporter_prometheus::PrometheusHandle;

/// Prometheus scrape endpoint.
///
/// GET /metrics
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
