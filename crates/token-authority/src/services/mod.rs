//! Token lifecycle services.
//!
//! - `key_resolver` - context to key material, the only place aware of the signing mode
//! - `client_authenticator` - shared-secret client credential check
//! - `token_issuer` - claim construction and signing
//! - `token_verifier` - signature, timing and claim checks with silent refresh
//! - `jwk_publisher` - RSA public key as a JWK set
//! - `token_service` - the generate flow tying the above together

pub mod client_authenticator;
pub mod jwk_publisher;
pub mod key_resolver;
pub mod token_issuer;
pub mod token_service;
pub mod token_verifier;

pub use client_authenticator::ClientCredentialAuthenticator;
pub use jwk_publisher::JwkPublisher;
pub use key_resolver::{ConfiguredKeyResolver, KeyPurpose, KeyResolver};
pub use token_issuer::{TokenIssuer, TokenPolicy};
pub use token_verifier::TokenVerifier;
