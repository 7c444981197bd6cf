/// Liveness probe handler.
///
/// GET /health
///
/// Returns OK while the process is serving. Does not touch key files.
pub async fn health_check() -> &'static str {
    "OK"
}
