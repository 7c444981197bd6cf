//! Multi-tenant token authority.
//!
//! Issues, verifies, silently refreshes and publishes verification keys for
//! bearer tokens scoped to a context. Each deployment signs either with one
//! shared application secret or with a per-context RSA keypair.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - JWT signing and verification, RSA key parsing
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `key_store` - Key file access
//! - `middleware` - Token verification for protected routes
//! - `models` - Data models
//! - `routes` - Router and application state
//! - `services` - Token lifecycle logic

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod key_store;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
