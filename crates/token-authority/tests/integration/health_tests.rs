//! Integration tests for operational endpoints

use reqwest::StatusCode;
use ta_test_utils::{shared_secret_config, TestTokenAuthority};

#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestTokenAuthority::spawn(shared_secret_config(&[])?).await?;

    // Act
    let response = reqwest::get(format!("{}/health", server.url())).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");

    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_serves_text() -> Result<(), anyhow::Error> {
    let server = TestTokenAuthority::spawn(shared_secret_config(&[])?).await?;

    let response = reqwest::get(format!("{}/metrics", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_not_found() -> Result<(), anyhow::Error> {
    let server = TestTokenAuthority::spawn(shared_secret_config(&[])?).await?;

    let response = reqwest::get(format!("{}/auth/unknown", server.url())).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
