//! Custom test assertions for expressive tests
//!
//! Decodes tokens without verifying them; signature checks belong to the
//! service under test.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    alg: String,
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    aud: String,
    sub: String,
    iat: i64,
    exp: i64,
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {index}"));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {index}: {e}"))
}

fn claims(token: &str) -> JwtClaims {
    serde_json::from_slice(&segment(token, 1)).expect("Failed to parse JWT claims")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// body["token"]
///     .as_str()
///     .unwrap()
///     .assert_valid_jwt("RS256")
///     .assert_for_context("app-test")
///     .assert_for_subject("api")
///     .assert_expires_in(900);
/// ```
pub trait TokenAssertions {
    /// Assert three segments, a JSON header with `alg`, and the four claims
    fn assert_valid_jwt(&self, alg: &str) -> &Self;

    /// Assert the audience
    fn assert_for_context(&self, context: &str) -> &Self;

    /// Assert the subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert `exp` is about `seconds` from now (5 second tolerance)
    fn assert_expires_in(&self, seconds: i64) -> &Self;
}

impl TokenAssertions for str {
    fn assert_valid_jwt(&self, alg: &str) -> &Self {
        let parts = self.split('.').count();
        assert_eq!(
            parts, 3,
            "JWT must have 3 parts (header.payload.signature), got {parts}"
        );

        let header: JwtHeader =
            serde_json::from_slice(&segment(self, 0)).expect("Failed to parse JWT header JSON");
        assert_eq!(header.alg, alg, "Unexpected JWT algorithm");

        let claims = claims(self);
        assert!(
            claims.exp > claims.iat,
            "exp ({}) must be after iat ({})",
            claims.exp,
            claims.iat
        );

        self
    }

    fn assert_for_context(&self, context: &str) -> &Self {
        let aud = claims(self).aud;
        assert_eq!(aud, context, "Token issued for the wrong context");
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let sub = claims(self).sub;
        assert_eq!(sub, subject, "Token issued for the wrong subject");
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let expires_in = claims(self).exp - chrono::Utc::now().timestamp();
        assert!(
            (expires_in - seconds).abs() <= 5,
            "Token expires in {expires_in}s, expected about {seconds}s"
        );
        self
    }
}
