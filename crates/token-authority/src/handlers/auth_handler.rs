use crate::errors::TaError;
use crate::models::{GenerateTokenRequest, IssuedToken, VerifiedToken};
use crate::routes::AppState;
use crate::services::token_service;
use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handle token generation
///
/// POST /auth/generate
///
/// Body is `{context}` in certificate mode or `{token, secret}` in
/// shared-secret mode.
#[instrument(name = "ta.token.generate", skip_all, fields(mode = %state.signing_mode(), status))]
pub async fn handle_generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateTokenRequest>, JsonRejection>,
) -> Result<Json<IssuedToken>, TaError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(target: "ta.token.generate", error = %e, "Rejected request body");
        TaError::InvalidRequest("Request body must be a JSON object".to_string())
    })?;

    let result = token_service::generate_token(
        state.key_resolver.as_ref(),
        &state.authenticator,
        &state.token_issuer,
        &request,
    );

    let status = if result.is_ok() { "success" } else { "error" };
    tracing::Span::current().record("status", status);

    Ok(Json(result?))
}

/// Return the token attached by the verification middleware.
///
/// GET /auth/verify
///
/// The token is the presented one, or its replacement if it was inside the
/// renew window.
#[instrument(name = "ta.token.verify", skip_all)]
pub async fn handle_verify(Extension(verified): Extension<VerifiedToken>) -> Json<VerifiedToken> {
    Json(verified)
}
