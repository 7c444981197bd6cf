use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use common::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Subject claim carried by every token this service verifies or refreshes.
pub const API_SUBJECT: &str = "api";

/// Process-wide signing mode. Fixed at startup; never mixed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningMode {
    /// One application-wide HMAC secret signs tokens for every context.
    SharedSecret,
    /// Each context signs with its own RSA keypair.
    Certificate,
}

impl SigningMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SigningMode::SharedSecret => "shared_secret",
            SigningMode::Certificate => "certificate",
        }
    }
}

impl fmt::Display for SigningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zone used to render `valid_until`.
///
/// Named zones follow their daylight saving rules; fixed offsets never shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTimezone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl Default for AppTimezone {
    fn default() -> Self {
        AppTimezone::Named(Tz::UTC)
    }
}

impl AppTimezone {
    /// Format a UTC instant as local wall-clock time in this zone.
    pub fn format(&self, instant: DateTime<Utc>, pattern: &str) -> String {
        match self {
            AppTimezone::Named(tz) => instant.with_timezone(tz).format(pattern).to_string(),
            AppTimezone::Fixed(offset) => instant.with_timezone(offset).format(pattern).to_string(),
        }
    }
}

/// Per-context key file locations, relative to the secrets root.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContextKeyConfig {
    #[serde(default)]
    pub private_file_path: Option<String>,
    #[serde(default)]
    pub public_file_path: Option<String>,
    /// Legacy name for the private key path.
    #[serde(default)]
    pub pem_file_name: Option<String>,
}

impl ContextKeyConfig {
    /// Path of the private key, falling back to the legacy `pemFileName`.
    pub fn private_key_path(&self) -> Option<&str> {
        non_empty(self.private_file_path.as_deref()).or_else(|| non_empty(self.pem_file_name.as_deref()))
    }

    pub fn public_key_path(&self) -> Option<&str> {
        non_empty(self.public_file_path.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Pre-shared credential used in shared-secret mode.
///
/// `name` becomes the audience of tokens issued to this client.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredClient {
    pub name: String,
    pub secret: SecretString,
}

/// Contents of the token configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenFileConfig {
    #[serde(default)]
    pub contexts: HashMap<String, ContextKeyConfig>,
    #[serde(default)]
    pub clients: HashMap<String, RegisteredClient>,
}

/// Body of `POST /auth/generate`.
///
/// Certificate mode reads `context`; shared-secret mode reads `token` and `secret`.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateTokenRequest {
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub secret: Option<SecretString>,
}

/// A signed token and its human-readable expiry.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub valid_until: String,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("valid_until", &self.valid_until)
            .finish()
    }
}

/// Result of a successful verification, attached to the request extensions.
///
/// `token` is either the presented token or a freshly issued replacement.
#[derive(Clone, Serialize)]
pub struct VerifiedToken {
    pub token: String,
    pub valid_until: String,
    #[serde(skip)]
    pub refreshed: bool,
}

impl fmt::Debug for VerifiedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifiedToken")
            .field("token", &"[REDACTED]")
            .field("valid_until", &self.valid_until)
            .field("refreshed", &self.refreshed)
            .finish()
    }
}

/// RFC 7517 JWK set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Jwks {
    pub keys: Vec<JsonWebKey>,
}

/// RSA public key in JWK form. `n` and `e` are unpadded base64url.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonWebKey {
    pub kty: String,
    pub n: String,
    pub e: String,
}
