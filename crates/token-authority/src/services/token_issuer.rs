//! Token issuance.
//!
//! Stateless: holds only the expiry policy and the display timezone, so one
//! issuer is shared by every request.

use crate::crypto::{sign_jwt, Claims, KeyMaterial};
use crate::errors::TaError;
use crate::models::{AppTimezone, IssuedToken};
use chrono::DateTime;
use tracing::instrument;

/// Format of `valid_until` in responses.
pub const VALID_UNTIL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Expiry and renew windows, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub expire_seconds: i64,
    pub renew_window_seconds: i64,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            expire_seconds: crate::config::DEFAULT_TOKEN_EXPIRE_SECONDS,
            renew_window_seconds: crate::config::DEFAULT_TOKEN_RENEW_SECONDS,
        }
    }
}

impl TokenPolicy {
    /// Whether a token expiring at `exp` has entered its renew window.
    ///
    /// True when the remaining life is at most `renew_window_seconds`.
    pub fn needs_refresh(&self, exp: i64, now: i64) -> bool {
        exp - now <= self.renew_window_seconds
    }
}

#[derive(Debug, Clone)]
pub struct TokenIssuer {
    policy: TokenPolicy,
    timezone: AppTimezone,
}

impl TokenIssuer {
    pub fn new(policy: TokenPolicy, timezone: AppTimezone) -> Self {
        Self { policy, timezone }
    }

    pub fn policy(&self) -> TokenPolicy {
        self.policy
    }

    /// Issue a token for `(context, subject)` at the current time.
    pub fn issue(
        &self,
        context: &str,
        subject: &str,
        key: &KeyMaterial,
    ) -> Result<IssuedToken, TaError> {
        self.issue_at(context, subject, key, chrono::Utc::now().timestamp())
    }

    /// Issue a token with `iat = now` and `exp = now + expire_seconds`.
    #[instrument(skip_all, name = "ta.services.issue")]
    pub fn issue_at(
        &self,
        context: &str,
        subject: &str,
        key: &KeyMaterial,
        now: i64,
    ) -> Result<IssuedToken, TaError> {
        let exp = now.checked_add(self.policy.expire_seconds).ok_or_else(|| {
            tracing::error!(target: "ta.services.issue", now, "Token expiry out of range");
            TaError::Internal
        })?;
        let claims = Claims {
            aud: context.to_string(),
            sub: subject.to_string(),
            iat: now,
            exp,
        };

        let token = sign_jwt(&claims, key)?;

        Ok(IssuedToken {
            token,
            valid_until: self.format_valid_until(exp)?,
        })
    }

    /// Render a UNIX timestamp as `YYYY-MM-DD HH:MM:SS` in the configured timezone.
    pub fn format_valid_until(&self, timestamp: i64) -> Result<String, TaError> {
        let utc = DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
            tracing::error!(target: "ta.services.issue", timestamp, "Timestamp out of range");
            TaError::Internal
        })?;

        Ok(self.timezone.format(utc, VALID_UNTIL_FORMAT))
    }
}
