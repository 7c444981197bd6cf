//! JWT utilities shared across Token Authority components.
//!
//! This module provides the policy-free pieces of token handling:
//! - Size limits for DoS prevention
//! - Clock skew bounds for `iat` validation
//! - `Bearer` prefix stripping
//! - `exp` / `iat` timing checks against an explicit clock
//! - Unpadded base64url encoding of JWK components
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Error messages are generic; details are logged at debug level only

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// Tokens larger than this are rejected before any base64 decoding or
/// signature work. An RS256 token with the claims issued here is ~600 bytes.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Maximum allowed JWT clock skew tolerance (10 minutes).
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

/// Authorization scheme prefix stripped from inbound tokens.
pub const BEARER_PREFIX: &str = "Bearer ";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during JWT validation.
///
/// Every variant renders the same message so that callers cannot tell
/// malformed, expired, and premature tokens apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("Invalid token or expired token")]
    TokenTooLarge,

    /// Token format is invalid (not a valid JWT structure).
    #[error("Invalid token or expired token")]
    MalformedToken,

    /// Token `exp` claim is not in the future.
    #[error("Invalid token or expired token")]
    Expired,

    /// Token `iat` claim is too far in the future.
    #[error("Invalid token or expired token")]
    IatTooFarInFuture,
}

// =============================================================================
// Functions
// =============================================================================

/// Strip a leading `"Bearer "` from an Authorization header value.
///
/// Values without the prefix are returned unchanged.
#[must_use]
pub fn strip_bearer(value: &str) -> &str {
    value.strip_prefix(BEARER_PREFIX).unwrap_or(value)
}

/// Reject tokens over [`MAX_JWT_SIZE_BYTES`] and tokens that are not three
/// dot-separated segments.
///
/// # Errors
///
/// - `TokenTooLarge` - Token exceeds size limit
/// - `MalformedToken` - Token is not `header.payload.signature`
pub fn check_token_shape(token: &str) -> Result<(), JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    if token.split('.').count() != 3 {
        tracing::debug!(target: "common.jwt", "Token rejected: invalid JWT format");
        return Err(JwtValidationError::MalformedToken);
    }

    Ok(())
}

/// Deterministic `iat` validation against an explicit `now` timestamp.
///
/// # Errors
///
/// Returns `JwtValidationError::IatTooFarInFuture` if `iat > now + clock_skew`.
pub fn validate_iat_at(
    iat: i64,
    clock_skew: Duration,
    now: i64,
) -> Result<(), JwtValidationError> {
    // Safe cast: clock_skew is bounded to MAX_CLOCK_SKEW (600 seconds)
    #[allow(clippy::cast_possible_wrap)]
    let clock_skew_secs = clock_skew.as_secs() as i64;
    let max_iat = now + clock_skew_secs;

    if iat > max_iat {
        tracing::debug!(
            target: "common.jwt",
            iat = iat,
            now = now,
            max_allowed = max_iat,
            clock_skew_secs = clock_skew_secs,
            "Token rejected: iat too far in the future"
        );
        return Err(JwtValidationError::IatTooFarInFuture);
    }

    Ok(())
}

/// Validate the `exp` claim against an explicit `now` timestamp.
///
/// A token is expired once `now` reaches `exp`.
///
/// # Errors
///
/// Returns `JwtValidationError::Expired` if `exp <= now`.
pub fn validate_exp_at(exp: i64, now: i64) -> Result<(), JwtValidationError> {
    if exp <= now {
        tracing::debug!(
            target: "common.jwt",
            exp = exp,
            now = now,
            "Token rejected: expired"
        );
        return Err(JwtValidationError::Expired);
    }

    Ok(())
}

/// Encode raw bytes as unpadded base64url (RFC 7515 §2), as used for JWK
/// `n` and `e` members.
#[must_use]
pub fn encode_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode an unpadded base64url string.
///
/// # Errors
///
/// Returns `base64::DecodeError` if the input is not valid unpadded base64url.
pub fn decode_base64url(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(value)
}

// =============================================================================
// Tests
// =============================================================================
