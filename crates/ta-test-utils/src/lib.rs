//! # Token Authority Test Utilities
//!
//! Shared test utilities for the token authority.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (fixed RSA keypairs, temporary secrets folder)
//! - Test data builders (`TestTokenBuilder` for arbitrary signed tokens)
//! - Server test harness (`TestTokenAuthority` for E2E tests)
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ta_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestTokenAuthority::spawn(shared_secret_config(&[
//!         ("hash_test", "test-front", "secret"),
//!     ])?)
//!     .await?;
//!
//!     let expired = TestTokenBuilder::new()
//!         .for_context("test-front")
//!         .expires_in(-60)
//!         .sign_hs256(TEST_APP_SECRET)?;
//!
//!     expired.assert_valid_jwt("HS256").assert_for_context("test-front");
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
pub use token_builders::*;
