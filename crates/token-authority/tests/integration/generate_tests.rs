//! Integration tests for `POST /auth/generate`
//!
//! Covers both signing modes end to end: request body, authentication,
//! signature and response envelope.

use reqwest::StatusCode;
use serde_json::{json, Value};
use ta_test_utils::{
    certificate_config, shared_secret_config, TestSecretsDir, TestTokenAuthority,
    TokenAssertions, TEST_RSA_PRIVATE_KEY_A, TEST_RSA_PUBLIC_KEY_A,
};

const CLIENTS: &[(&str, &str, &str)] = &[("hash_test", "test-front", "secret")];

async fn generate(server: &TestTokenAuthority, body: Value) -> Result<reqwest::Response, anyhow::Error> {
    Ok(reqwest::Client::new()
        .post(format!("{}/auth/generate", server.url()))
        .json(&body)
        .send()
        .await?)
}

fn error_of(body: &Value) -> (&str, &str) {
    (
        body["error"]["code"].as_str().unwrap_or_default(),
        body["error"]["message"].as_str().unwrap_or_default(),
    )
}

async fn certificate_server() -> Result<(TestSecretsDir, TestTokenAuthority), anyhow::Error> {
    let secrets = TestSecretsDir::new()?
        .with_file("app-test.pem", TEST_RSA_PRIVATE_KEY_A)?
        .with_file("app-test.pub", TEST_RSA_PUBLIC_KEY_A)?;
    let config = certificate_config(
        secrets.path(),
        &[
            ("app-test", Some("app-test.pem"), Some("app-test.pub")),
            ("no-key-file", Some("missing.pem"), None),
        ],
    )?;
    let server = TestTokenAuthority::spawn(config).await?;
    Ok((secrets, server))
}

// ============================================================================
// Shared-secret mode
// ============================================================================

#[tokio::test]
async fn test_shared_secret_generate_success() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestTokenAuthority::spawn(shared_secret_config(CLIENTS)?).await?;

    // Act
    let response = generate(&server, json!({"token": "hash_test", "secret": "secret"})).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;

    body["token"]
        .as_str()
        .expect("token field")
        .assert_valid_jwt("HS256")
        .assert_for_context("test-front")
        .assert_for_subject("api")
        .assert_expires_in(900);

    let valid_until = body["valid_until"].as_str().expect("valid_until field");
    assert_eq!(valid_until.len(), "YYYY-MM-DD HH:MM:SS".len());

    Ok(())
}

#[tokio::test]
async fn test_shared_secret_generate_wrong_secret() -> Result<(), anyhow::Error> {
    let server = TestTokenAuthority::spawn(shared_secret_config(CLIENTS)?).await?;

    for body in [
        json!({"token": "hash_test", "secret": "wrong"}),
        json!({"token": "hash_unknown", "secret": "secret"}),
        json!({"token": "hash_test", "secret": "   "}),
    ] {
        let response = generate(&server, body).await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: Value = response.json().await?;
        assert_eq!(error_of(&body), ("INVALID_CREDENTIALS", "Invalid credentials"));
    }

    Ok(())
}

#[tokio::test]
async fn test_shared_secret_generate_missing_fields() -> Result<(), anyhow::Error> {
    let server = TestTokenAuthority::spawn(shared_secret_config(CLIENTS)?).await?;

    let response = generate(&server, json!({"token": "hash_test"})).await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json().await?;
    assert_eq!(
        error_of(&body),
        ("INVALID_REQUEST", "The secret field is required.")
    );

    Ok(())
}

#[tokio::test]
async fn test_generate_rejects_non_json_body() -> Result<(), anyhow::Error> {
    let server = TestTokenAuthority::spawn(shared_secret_config(CLIENTS)?).await?;

    let response = reqwest::Client::new()
        .post(format!("{}/auth/generate", server.url()))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await?;
    assert_eq!(error_of(&body).0, "INVALID_REQUEST");

    Ok(())
}

// ============================================================================
// Certificate mode
// ============================================================================

#[tokio::test]
async fn test_certificate_generate_success() -> Result<(), anyhow::Error> {
    let (_secrets, server) = certificate_server().await?;

    let response = generate(&server, json!({"context": "app-test"})).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    body["token"]
        .as_str()
        .expect("token field")
        .assert_valid_jwt("RS256")
        .assert_for_context("app-test")
        .assert_for_subject("api");

    Ok(())
}

#[tokio::test]
async fn test_certificate_generate_unknown_context() -> Result<(), anyhow::Error> {
    let (_secrets, server) = certificate_server().await?;

    let response = generate(&server, json!({"context": "ghost"})).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(error_of(&body), ("INVALID_CREDENTIALS", "Invalid credentials"));

    Ok(())
}

#[tokio::test]
async fn test_certificate_generate_missing_key_file_hides_detail() -> Result<(), anyhow::Error> {
    let (_secrets, server) = certificate_server().await?;

    let response = generate(&server, json!({"context": "no-key-file"})).await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = response.text().await?;
    assert!(!text.contains("missing.pem"), "File path leaked: {text}");

    Ok(())
}

#[tokio::test]
async fn test_certificate_generate_reads_rotated_key() -> Result<(), anyhow::Error> {
    let (secrets, server) = certificate_server().await?;

    // Key files are read on every request, so replacing one takes effect immediately
    secrets.write("app-test.pem", "")?;

    let response = generate(&server, json!({"context": "app-test"})).await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    secrets.write("app-test.pem", TEST_RSA_PRIVATE_KEY_A)?;
    let response = generate(&server, json!({"context": "app-test"})).await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
