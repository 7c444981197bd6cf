//! Builder patterns for test data construction
//!
//! `TestTokenBuilder` signs tokens the service itself would never issue:
//! expired, wrong subject, missing claims, foreign keys.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Builder for arbitrary signed test tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_context("app-test")
///     .with_subject("someone-else")
///     .expires_in(60)
///     .sign_rs256(TEST_RSA_PRIVATE_KEY_A)?;
/// ```
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
}

impl TestTokenBuilder {
    /// Defaults: `aud = "app-test"`, `sub = "api"`, issued now, expiring in 900s.
    pub fn new() -> Self {
        let now = Utc::now();
        let mut claims = Map::new();
        claims.insert("aud".to_string(), json!("app-test"));
        claims.insert("sub".to_string(), json!("api"));
        claims.insert("iat".to_string(), json!(now.timestamp()));
        claims.insert(
            "exp".to_string(),
            json!((now + Duration::seconds(900)).timestamp()),
        );
        Self { claims }
    }

    /// Set the audience (context)
    pub fn for_context(self, context: &str) -> Self {
        self.with_claim("aud", json!(context))
    }

    /// Set the subject
    pub fn with_subject(self, subject: &str) -> Self {
        self.with_claim("sub", json!(subject))
    }

    /// Set expiration in seconds from now. Negative values produce expired tokens.
    pub fn expires_in(self, seconds: i64) -> Self {
        let exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self.with_claim("exp", json!(exp))
    }

    /// Set issued-at timestamp
    pub fn issued_at(self, timestamp: i64) -> Self {
        self.with_claim("iat", json!(timestamp))
    }

    /// Set or replace any claim
    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Drop a claim entirely
    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    /// The claims as a JSON value
    pub fn build(&self) -> Value {
        Value::Object(self.claims.clone())
    }

    /// Sign with HS256
    pub fn sign_hs256(&self, secret: &str) -> Result<String, anyhow::Error> {
        let key = EncodingKey::from_secret(secret.as_bytes());
        Ok(encode(&Header::new(Algorithm::HS256), &self.build(), &key)?)
    }

    /// Sign with RS256 using a PKCS#1 or PKCS#8 PEM private key
    pub fn sign_rs256(&self, private_pem: &str) -> Result<String, anyhow::Error> {
        let key = EncodingKey::from_rsa_pem(private_pem.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &self.build(), &key)?)
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
