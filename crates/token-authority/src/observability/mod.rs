//! Observability for the token authority.
//!
//! # Privacy by Default
//!
//! All instrumentation uses `#[instrument(skip_all)]` and explicit safe fields.
//! Fields are categorized as:
//! - **SAFE**: Can be logged in plaintext (signing mode, purpose, outcome)
//! - **HASHED**: SHA-256 prefix for correlation (client token names)
//! - **NEVER**: Must never appear in logs (tokens, secrets, key material)

pub mod metrics;

use crate::errors::TaError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// One-way and truncated; for correlating log entries only, not for secrets.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    hex::encode(result.get(..4).unwrap_or_default())
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credential and claim failures (bad token, wrong subject or context)
    Authentication,
    /// Request shape problems
    Request,
    /// Key material or signing failures
    Cryptographic,
    /// Everything else
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Request => "request",
            ErrorCategory::Cryptographic => "cryptographic",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&TaError> for ErrorCategory {
    fn from(err: &TaError) -> Self {
        match err {
            TaError::InvalidCredentials(_) | TaError::UnknownContext => {
                ErrorCategory::Authentication
            }
            TaError::InvalidRequest(_) | TaError::UnsupportedOperation(_) => ErrorCategory::Request,
            TaError::InvalidJwk(_) | TaError::KeyMaterialUnavailable(_) | TaError::Crypto(_) => {
                ErrorCategory::Cryptographic
            }
            TaError::Internal => ErrorCategory::Internal,
        }
    }
}
