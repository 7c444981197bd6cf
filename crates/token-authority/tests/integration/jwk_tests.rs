//! Integration tests for `GET /auth/jwk/:context`

use reqwest::StatusCode;
use serde_json::Value;
use ta_test_utils::{
    certificate_config, shared_secret_config, TestSecretsDir, TestTokenAuthority,
    TEST_RSA_EXPONENT_B64URL, TEST_RSA_MODULUS_A_B64URL, TEST_RSA_PRIVATE_KEY_A,
    TEST_RSA_PUBLIC_KEY_A,
};

async fn certificate_server() -> Result<(TestSecretsDir, TestTokenAuthority), anyhow::Error> {
    let secrets = TestSecretsDir::new()?
        .with_file("app-test.pem", TEST_RSA_PRIVATE_KEY_A)?
        .with_file("keys/app-test.pub", TEST_RSA_PUBLIC_KEY_A)?
        .with_file("empty.pub", "")?;
    let config = certificate_config(
        secrets.path(),
        &[
            ("app-test", Some("app-test.pem"), Some("keys/app-test.pub")),
            ("empty", Some("app-test.pem"), Some("empty.pub")),
            ("private-only", Some("app-test.pem"), None),
        ],
    )?;
    let server = TestTokenAuthority::spawn(config).await?;
    Ok((secrets, server))
}

async fn get_jwk(server: &TestTokenAuthority, context: &str) -> Result<reqwest::Response, anyhow::Error> {
    Ok(reqwest::get(format!("{}/auth/jwk/{context}", server.url())).await?)
}

#[tokio::test]
async fn test_jwk_returns_single_rsa_key() -> Result<(), anyhow::Error> {
    // Arrange
    let (_secrets, server) = certificate_server().await?;

    // Act
    let response = get_jwk(&server, "app-test").await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(
        body,
        serde_json::json!({
            "keys": [{
                "kty": "RSA",
                "n": TEST_RSA_MODULUS_A_B64URL,
                "e": TEST_RSA_EXPONENT_B64URL,
            }]
        })
    );

    Ok(())
}

#[tokio::test]
async fn test_jwk_unknown_or_unpublished_context_is_unauthorized() -> Result<(), anyhow::Error> {
    let (_secrets, server) = certificate_server().await?;

    for context in ["ghost", "private-only"] {
        let response = get_jwk(&server, context).await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{context}");

        let body: Value = response.json().await?;
        assert_eq!(body["error"]["message"], "Invalid credentials");
    }

    Ok(())
}

#[tokio::test]
async fn test_jwk_empty_public_key_is_not_found() -> Result<(), anyhow::Error> {
    let (_secrets, server) = certificate_server().await?;

    let response = get_jwk(&server, "empty").await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_JWK");
    assert_eq!(body["error"]["message"], "Failed to get jwk details");

    Ok(())
}

#[tokio::test]
async fn test_jwk_route_absent_in_shared_secret_mode() -> Result<(), anyhow::Error> {
    let server = TestTokenAuthority::spawn(shared_secret_config(&[])?).await?;

    let response = get_jwk(&server, "app-test").await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
