use crate::errors::TaError;
use crate::models::Jwks;
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handle JWK request for one context
///
/// GET /auth/jwk/:context
///
/// Only routed in certificate mode. Unknown contexts answer 401 so that
/// unauthenticated callers cannot probe which contexts exist.
#[instrument(name = "ta.jwk.get", skip_all, fields(status))]
pub async fn handle_get_jwk(
    State(state): State<Arc<AppState>>,
    Path(context): Path<String>,
) -> Result<Json<Jwks>, TaError> {
    let result = state.jwk_publisher.publish(&context);

    let status = if result.is_ok() { "success" } else { "error" };
    tracing::Span::current().record("status", status);

    Ok(Json(result?))
}
