//! Inbound token verification with silent refresh.
//!
//! A request moves through signature, timing and claim checks in that order.
//! Any failure rejects it with `InvalidCredentials`; the reason string is the
//! only thing that differs.

use crate::crypto::{check_token_timing, verify_jwt_signature, KeyMaterial};
use crate::errors::{TaError, INVALID_TOKEN};
use crate::models::{VerifiedToken, API_SUBJECT};
use crate::observability::metrics::{record_token_refresh, record_token_validation};
use crate::observability::ErrorCategory;
use crate::services::key_resolver::{KeyPurpose, KeyResolver};
use crate::services::token_issuer::TokenIssuer;
use common::jwt::strip_bearer;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Reason given when the expected context has no verification key.
pub const INVALID_JWK_CONTEXT: &str = "Invalid jwk Context";
pub const INVALID_SUBJECT: &str = "Invalid subject";
pub const INVALID_CONTEXT: &str = "Invalid context";

pub struct TokenVerifier {
    resolver: Arc<dyn KeyResolver>,
    issuer: TokenIssuer,
    clock_skew: Duration,
}

impl TokenVerifier {
    pub fn new(resolver: Arc<dyn KeyResolver>, issuer: TokenIssuer, clock_skew: Duration) -> Self {
        Self {
            resolver,
            issuer,
            clock_skew,
        }
    }

    /// Verify `raw_token` for `expected_context` at the current time.
    pub fn verify(&self, raw_token: &str, expected_context: &str) -> Result<VerifiedToken, TaError> {
        self.verify_at(raw_token, expected_context, chrono::Utc::now().timestamp())
    }

    /// Verify `raw_token` for `expected_context` against an explicit clock.
    ///
    /// Returns the presented token unchanged while it is outside its renew
    /// window; once inside, returns a newly issued token for the same
    /// `(aud, sub)` and the presented one should be discarded.
    #[instrument(skip_all, name = "ta.services.verify")]
    pub fn verify_at(
        &self,
        raw_token: &str,
        expected_context: &str,
        now: i64,
    ) -> Result<VerifiedToken, TaError> {
        let result = self.verify_inner(raw_token, expected_context, now);

        match &result {
            Ok(verified) => {
                record_token_validation("success", None);
                if verified.refreshed {
                    record_token_refresh();
                }
            }
            Err(e) => record_token_validation("error", Some(ErrorCategory::from(e).as_str())),
        }

        result
    }

    fn verify_inner(
        &self,
        raw_token: &str,
        expected_context: &str,
        now: i64,
    ) -> Result<VerifiedToken, TaError> {
        let token = strip_bearer(raw_token.trim());

        let key = self.verification_key(expected_context)?;

        let claims = verify_jwt_signature(token, &key)?;

        check_token_timing(&claims, now, self.clock_skew).inspect_err(|_| {
            tracing::debug!(
                target: "ta.services.verify",
                exp = claims.exp,
                iat = claims.iat,
                now,
                "Token outside its validity period"
            );
        })?;

        if claims.sub != API_SUBJECT {
            tracing::debug!(target: "ta.services.verify", "Token rejected: unexpected subject");
            return Err(TaError::invalid_credentials(INVALID_SUBJECT));
        }

        if claims.aud != expected_context {
            tracing::debug!(target: "ta.services.verify", "Token rejected: audience mismatch");
            return Err(TaError::invalid_credentials(INVALID_CONTEXT));
        }

        if self.issuer.policy().needs_refresh(claims.exp, now) {
            let issued = self.issuer.issue_at(&claims.aud, &claims.sub, &key, now)?;
            tracing::debug!(target: "ta.services.verify", "Token inside renew window, reissued");
            return Ok(VerifiedToken {
                token: issued.token,
                valid_until: issued.valid_until,
                refreshed: true,
            });
        }

        Ok(VerifiedToken {
            token: token.to_string(),
            valid_until: self.issuer.format_valid_until(claims.exp)?,
            refreshed: false,
        })
    }

    fn verification_key(&self, context: &str) -> Result<KeyMaterial, TaError> {
        self.resolver
            .resolve(context, KeyPurpose::Verify)
            .map_err(|e| match e {
                TaError::UnknownContext => TaError::invalid_credentials(INVALID_JWK_CONTEXT),
                other => {
                    tracing::warn!(
                        target: "ta.services.verify",
                        error = %other,
                        "Verification key could not be resolved"
                    );
                    TaError::invalid_credentials(INVALID_TOKEN)
                }
            })
    }
}
