//! Token generation flow behind `POST /auth/generate`.
//!
//! Certificate mode issues directly for the requested context. Shared-secret
//! mode first authenticates the caller's registered credential; the client's
//! name becomes the token audience.

use crate::errors::{TaError, INVALID_CREDENTIALS};
use crate::models::{GenerateTokenRequest, IssuedToken, SigningMode, API_SUBJECT};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_token_issuance;
use crate::services::client_authenticator::ClientCredentialAuthenticator;
use crate::services::key_resolver::{KeyPurpose, KeyResolver};
use crate::services::token_issuer::TokenIssuer;
use common::secret::ExposeSecret;
use std::time::Instant;
use tracing::instrument;

/// Issue a token for a generate request, dispatching on the resolver's mode.
///
/// # Errors
///
/// - `InvalidRequest` - a field required by the active mode is missing or empty
/// - `InvalidCredentials` - unknown context, or client credentials do not match
/// - `KeyMaterialUnavailable` / `Crypto` - the signing key could not be used
#[instrument(skip_all, name = "ta.services.generate_token", fields(mode = %resolver.mode()))]
pub fn generate_token(
    resolver: &dyn KeyResolver,
    authenticator: &ClientCredentialAuthenticator,
    issuer: &TokenIssuer,
    request: &GenerateTokenRequest,
) -> Result<IssuedToken, TaError> {
    let start = Instant::now();
    let mode = resolver.mode();

    let result = match mode {
        SigningMode::Certificate => generate_for_context(resolver, issuer, request),
        SigningMode::SharedSecret => generate_for_client(resolver, authenticator, issuer, request),
    };

    let status = if result.is_ok() { "success" } else { "error" };
    record_token_issuance(mode.as_str(), status, start.elapsed());

    result
}

fn generate_for_context(
    resolver: &dyn KeyResolver,
    issuer: &TokenIssuer,
    request: &GenerateTokenRequest,
) -> Result<IssuedToken, TaError> {
    let context = required(request.context.as_deref(), "context")?;

    let key = resolver
        .resolve(context, KeyPurpose::Sign)
        .map_err(|e| match e {
            TaError::UnknownContext => {
                tracing::debug!(target: "ta.services.generate_token", "Unknown context");
                TaError::invalid_credentials(INVALID_CREDENTIALS)
            }
            other => other,
        })?;

    let issued = issuer.issue(context, API_SUBJECT, &key)?;
    tracing::info!(target: "ta.services.generate_token", "Token issued for context");
    Ok(issued)
}

fn generate_for_client(
    resolver: &dyn KeyResolver,
    authenticator: &ClientCredentialAuthenticator,
    issuer: &TokenIssuer,
    request: &GenerateTokenRequest,
) -> Result<IssuedToken, TaError> {
    let token_name = required(request.token.as_deref(), "token")?;
    // Secrets compare byte for byte, so surrounding whitespace is significant
    let secret = request
        .secret
        .as_ref()
        .map(|s| s.expose_secret())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| missing_field("secret"))?;

    let client = authenticator
        .authenticate(token_name, secret)
        .ok_or_else(|| TaError::invalid_credentials(INVALID_CREDENTIALS))?;

    let key = resolver.resolve(&client.name, KeyPurpose::Sign)?;
    let issued = issuer.issue(&client.name, API_SUBJECT, &key)?;

    tracing::info!(
        target: "ta.services.generate_token",
        client = %hash_for_correlation(token_name),
        "Token issued for registered client"
    );
    Ok(issued)
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, TaError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| missing_field(field))
}

fn missing_field(field: &str) -> TaError {
    TaError::InvalidRequest(format!("The {field} field is required."))
}
