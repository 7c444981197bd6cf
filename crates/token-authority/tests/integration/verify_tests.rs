//! Integration tests for `GET /auth/verify`
//!
//! Drives the verification middleware through a real server: header
//! handling, every rejection reason, and silent refresh.

use reqwest::StatusCode;
use serde_json::Value;
use ta_test_utils::{
    certificate_config, shared_secret_config, TestSecretsDir, TestTokenAuthority,
    TestTokenBuilder, TokenAssertions, TEST_APP_SECRET, TEST_RSA_PRIVATE_KEY_A,
    TEST_RSA_PRIVATE_KEY_B, TEST_RSA_PUBLIC_KEY_A,
};

const CLIENTS: &[(&str, &str, &str)] = &[("hash_test", "test-front", "secret")];

async fn verify(
    server: &TestTokenAuthority,
    authorization: Option<&str>,
    context: Option<&str>,
) -> Result<reqwest::Response, anyhow::Error> {
    let mut request = reqwest::Client::new().get(format!("{}/auth/verify", server.url()));
    if let Some(value) = authorization {
        request = request.header("Authorization", value);
    }
    if let Some(value) = context {
        request = request.header("Context", value);
    }
    Ok(request.send().await?)
}

async fn rejection_message(response: reqwest::Response) -> Result<String, anyhow::Error> {
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    Ok(body["error"]["message"].as_str().unwrap_or_default().to_string())
}

// ============================================================================
// Shared-secret mode
// ============================================================================

#[tokio::test]
async fn test_verify_fresh_token_is_returned_unchanged() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestTokenAuthority::spawn(shared_secret_config(CLIENTS)?).await?;
    let token = TestTokenBuilder::new()
        .for_context("test-front")
        .expires_in(600)
        .sign_hs256(TEST_APP_SECRET)?;

    // Act
    let response = verify(&server, Some(&format!("Bearer {token}")), Some("test-front")).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-token").and_then(|v| v.to_str().ok()),
        Some(token.as_str())
    );
    assert!(response.headers().contains_key("x-token-valid-until"));

    let body: Value = response.json().await?;
    assert_eq!(body["token"], token);
    assert!(body.get("refreshed").is_none());

    Ok(())
}

#[tokio::test]
async fn test_verify_token_in_renew_window_is_refreshed() -> Result<(), anyhow::Error> {
    let server = TestTokenAuthority::spawn(shared_secret_config(CLIENTS)?).await?;
    let token = TestTokenBuilder::new()
        .for_context("test-front")
        .expires_in(60)
        .sign_hs256(TEST_APP_SECRET)?;

    let response = verify(&server, Some(&format!("Bearer {token}")), Some("test-front")).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let header_token = response
        .headers()
        .get("x-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("x-token header");

    let body: Value = response.json().await?;
    let refreshed = body["token"].as_str().expect("token field");

    assert_ne!(refreshed, token);
    assert_eq!(refreshed, header_token);
    refreshed
        .assert_valid_jwt("HS256")
        .assert_for_context("test-front")
        .assert_for_subject("api")
        .assert_expires_in(900);

    Ok(())
}

#[tokio::test]
async fn test_verify_issued_token_round_trip() -> Result<(), anyhow::Error> {
    let server = TestTokenAuthority::spawn(shared_secret_config(CLIENTS)?).await?;

    let issued: Value = reqwest::Client::new()
        .post(format!("{}/auth/generate", server.url()))
        .json(&serde_json::json!({"token": "hash_test", "secret": "secret"}))
        .send()
        .await?
        .json()
        .await?;
    let token = issued["token"].as_str().expect("token field");

    let response = verify(&server, Some(&format!("Bearer {token}")), Some("test-front")).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["token"], token);
    assert_eq!(body["valid_until"], issued["valid_until"]);

    Ok(())
}

#[tokio::test]
async fn test_verify_missing_headers() -> Result<(), anyhow::Error> {
    let server = TestTokenAuthority::spawn(shared_secret_config(CLIENTS)?).await?;
    let token = TestTokenBuilder::new()
        .for_context("test-front")
        .sign_hs256(TEST_APP_SECRET)?;
    let bearer = format!("Bearer {token}");

    for (authorization, context) in [
        (None, Some("test-front")),
        (Some(bearer.as_str()), None),
        (Some(bearer.as_str()), Some("")),
    ] {
        let response = verify(&server, authorization, context).await?;
        assert_eq!(rejection_message(response).await?, "Missing authorization");
    }

    Ok(())
}

#[tokio::test]
async fn test_verify_rejection_reasons() -> Result<(), anyhow::Error> {
    let server = TestTokenAuthority::spawn(shared_secret_config(CLIENTS)?).await?;

    let cases = [
        (
            TestTokenBuilder::new()
                .for_context("test-front")
                .expires_in(-10)
                .sign_hs256(TEST_APP_SECRET)?,
            "Invalid token or expired token",
        ),
        (
            TestTokenBuilder::new()
                .for_context("test-front")
                .sign_hs256("some-other-secret")?,
            "Invalid token or expired token",
        ),
        (
            TestTokenBuilder::new()
                .for_context("test-front")
                .with_subject("user")
                .sign_hs256(TEST_APP_SECRET)?,
            "Invalid subject",
        ),
        (
            TestTokenBuilder::new()
                .for_context("other-front")
                .sign_hs256(TEST_APP_SECRET)?,
            "Invalid context",
        ),
        (
            TestTokenBuilder::new()
                .for_context("test-front")
                .without_claim("exp")
                .sign_hs256(TEST_APP_SECRET)?,
            "Invalid token or expired token",
        ),
        ("not-a-jwt".to_string(), "Invalid token or expired token"),
    ];

    for (token, expected) in cases {
        let response = verify(&server, Some(&format!("Bearer {token}")), Some("test-front")).await?;
        assert_eq!(rejection_message(response).await?, expected, "token {token}");
    }

    Ok(())
}

#[tokio::test]
async fn test_verify_rejects_future_iat() -> Result<(), anyhow::Error> {
    let server = TestTokenAuthority::spawn(shared_secret_config(CLIENTS)?).await?;
    let token = TestTokenBuilder::new()
        .for_context("test-front")
        .issued_at(chrono::Utc::now().timestamp() + 120)
        .sign_hs256(TEST_APP_SECRET)?;

    let response = verify(&server, Some(&format!("Bearer {token}")), Some("test-front")).await?;

    assert_eq!(
        rejection_message(response).await?,
        "Invalid token or expired token"
    );
    Ok(())
}

// ============================================================================
// Certificate mode
// ============================================================================

async fn certificate_server() -> Result<(TestSecretsDir, TestTokenAuthority), anyhow::Error> {
    let secrets = TestSecretsDir::new()?
        .with_file("app-test.pem", TEST_RSA_PRIVATE_KEY_A)?
        .with_file("app-test.pub", TEST_RSA_PUBLIC_KEY_A)?;
    let config = certificate_config(
        secrets.path(),
        &[("app-test", Some("app-test.pem"), Some("app-test.pub"))],
    )?;
    let server = TestTokenAuthority::spawn(config).await?;
    Ok((secrets, server))
}

#[tokio::test]
async fn test_certificate_verify_and_refresh() -> Result<(), anyhow::Error> {
    let (_secrets, server) = certificate_server().await?;

    let fresh = TestTokenBuilder::new()
        .expires_in(600)
        .sign_rs256(TEST_RSA_PRIVATE_KEY_A)?;
    let response = verify(&server, Some(&format!("Bearer {fresh}")), Some("app-test")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["token"], fresh);

    let expiring = TestTokenBuilder::new()
        .expires_in(30)
        .sign_rs256(TEST_RSA_PRIVATE_KEY_A)?;
    let response = verify(&server, Some(&format!("Bearer {expiring}")), Some("app-test")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    let refreshed = body["token"].as_str().expect("token field");
    assert_ne!(refreshed, expiring);
    refreshed
        .assert_valid_jwt("RS256")
        .assert_for_context("app-test")
        .assert_expires_in(900);

    Ok(())
}

#[tokio::test]
async fn test_certificate_verify_foreign_key_and_unknown_context() -> Result<(), anyhow::Error> {
    let (_secrets, server) = certificate_server().await?;

    let foreign = TestTokenBuilder::new().sign_rs256(TEST_RSA_PRIVATE_KEY_B)?;
    let response = verify(&server, Some(&format!("Bearer {foreign}")), Some("app-test")).await?;
    assert_eq!(
        rejection_message(response).await?,
        "Invalid token or expired token"
    );

    let token = TestTokenBuilder::new()
        .for_context("ghost")
        .sign_rs256(TEST_RSA_PRIVATE_KEY_A)?;
    let response = verify(&server, Some(&format!("Bearer {token}")), Some("ghost")).await?;
    assert_eq!(rejection_message(response).await?, "Invalid jwk Context");

    Ok(())
}

#[tokio::test]
async fn test_certificate_verify_rejects_hs256_token() -> Result<(), anyhow::Error> {
    let (_secrets, server) = certificate_server().await?;

    // Algorithm confusion: an HMAC token keyed with the public PEM must not pass
    let forged = TestTokenBuilder::new().sign_hs256(TEST_RSA_PUBLIC_KEY_A)?;
    let response = verify(&server, Some(&format!("Bearer {forged}")), Some("app-test")).await?;

    assert_eq!(
        rejection_message(response).await?,
        "Invalid token or expired token"
    );
    Ok(())
}
