//! Request middleware.

pub mod auth;

pub use auth::{require_token, CONTEXT_HEADER, TOKEN_HEADER, TOKEN_VALID_UNTIL_HEADER};
