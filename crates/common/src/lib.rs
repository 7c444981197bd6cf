//! Common utilities and types shared across Token Authority components.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT utilities (size limits, bearer parsing, claim timing, base64url)
pub mod jwt;
