//! Token verification middleware for protected routes.
//!
//! Reads the bearer token and the expected context from the request headers,
//! verifies (and when due, refreshes) the token, and makes the result visible
//! both to the handler and to the caller.

use crate::errors::TaError;
use crate::models::VerifiedToken;
use crate::routes::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::instrument;

/// Header naming the context the token must belong to.
pub const CONTEXT_HEADER: &str = "context";

/// Response header carrying the token the caller should use from now on.
pub const TOKEN_HEADER: &str = "x-token";

/// Response header carrying the expiry of [`TOKEN_HEADER`].
pub const TOKEN_VALID_UNTIL_HEADER: &str = "x-token-valid-until";

const MISSING_AUTHORIZATION: &str = "Missing authorization";

fn required_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, TaError> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            tracing::debug!(target: "ta.middleware.auth", header = name, "Missing request header");
            TaError::invalid_credentials(MISSING_AUTHORIZATION)
        })
}

/// Verification middleware.
///
/// # Response
///
/// - 401 when `Authorization` or `Context` is missing, or the token fails
///   verification for that context
/// - Otherwise runs the handler with [`VerifiedToken`] in extensions and adds
///   `X-Token` / `X-Token-Valid-Until` to its response
#[instrument(skip_all, name = "ta.middleware.auth", fields(refreshed))]
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, TaError> {
    let verified = {
        let headers = req.headers();
        let authorization = required_header(headers, header::AUTHORIZATION.as_str())?;
        let context = required_header(headers, CONTEXT_HEADER)?;
        state.verifier.verify(authorization, context)?
    };

    tracing::Span::current().record("refreshed", verified.refreshed);

    let token = header_value(&verified.token)?;
    let valid_until = header_value(&verified.valid_until)?;

    req.extensions_mut().insert::<VerifiedToken>(verified);

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(HeaderName::from_static(TOKEN_HEADER), token);
    headers.insert(HeaderName::from_static(TOKEN_VALID_UNTIL_HEADER), valid_until);

    Ok(response)
}

fn header_value(value: &str) -> Result<HeaderValue, TaError> {
    HeaderValue::from_str(value).map_err(|e| {
        tracing::error!(target: "ta.middleware.auth", error = %e, "Value not representable as header");
        TaError::Internal
    })
}
