//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] wrappers used for every value that must never
//! show up in logs: the application-wide HMAC secret, registered client
//! secrets, and RSA private key PEM content.
//!
//! `SecretString` implements `Debug` with redaction, so any struct deriving
//! `Debug` that holds one stays safe to log. Values are zeroized on drop.
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct RegisteredClient {
//!     name: String,
//!     secret: SecretString,
//! }
//!
//! let client = RegisteredClient {
//!     name: "test-front".to_string(),
//!     secret: SecretString::from("s3cr3t"),
//! };
//!
//! assert!(!format!("{client:?}").contains("s3cr3t"));
//! assert_eq!(client.secret.expose_secret(), "s3cr3t");
//! ```
//!
//! With the `serde` feature of `secrecy`, secrets deserialize straight out of
//! the token configuration file and request bodies.

pub use secrecy::{ExposeSecret, SecretString};
