//! JWK publication of a context's RSA public key.

use crate::crypto::{rsa_public_components, KeyMaterial};
use crate::errors::{TaError, INVALID_CREDENTIALS};
use crate::models::{JsonWebKey, Jwks};
use crate::observability::metrics::record_jwks_request;
use crate::services::key_resolver::{KeyPurpose, KeyResolver};
use common::jwt::encode_base64url;
use std::sync::Arc;
use tracing::instrument;

/// Reason given when a configured context's public key cannot be served.
pub const JWK_UNAVAILABLE: &str = "Failed to get jwk details";

pub struct JwkPublisher {
    resolver: Arc<dyn KeyResolver>,
}

impl JwkPublisher {
    pub fn new(resolver: Arc<dyn KeyResolver>) -> Self {
        Self { resolver }
    }

    /// Build the single-entry JWK set for `context`.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` (401) - context unknown or without a public key path
    /// - `InvalidJwk` (404) - public key file empty, unreadable or not an RSA key
    #[instrument(skip_all, name = "ta.services.publish_jwk")]
    pub fn publish(&self, context: &str) -> Result<Jwks, TaError> {
        let result = self.build(context);
        record_jwks_request(if result.is_ok() { "success" } else { "error" });
        result
    }

    fn build(&self, context: &str) -> Result<Jwks, TaError> {
        let key = self
            .resolver
            .resolve(context, KeyPurpose::Public)
            .map_err(|e| match e {
                TaError::UnknownContext | TaError::UnsupportedOperation(_) => {
                    TaError::invalid_credentials(INVALID_CREDENTIALS)
                }
                other => {
                    tracing::warn!(
                        target: "ta.services.publish_jwk",
                        error = %other,
                        "Public key unavailable for configured context"
                    );
                    TaError::InvalidJwk(JWK_UNAVAILABLE.to_string())
                }
            })?;

        let pem = match &key {
            KeyMaterial::RsaPublicPem(pem) => pem.as_str(),
            _ => return Err(TaError::invalid_credentials(INVALID_CREDENTIALS)),
        };

        let (n, e) = rsa_public_components(pem).map_err(|e| {
            tracing::warn!(
                target: "ta.services.publish_jwk",
                error = %e,
                "Public key file is not a usable RSA key"
            );
            TaError::InvalidJwk(JWK_UNAVAILABLE.to_string())
        })?;

        Ok(Jwks {
            keys: vec![JsonWebKey {
                kty: "RSA".to_string(),
                n: encode_base64url(&n),
                e: encode_base64url(&e),
            }],
        })
    }
}
