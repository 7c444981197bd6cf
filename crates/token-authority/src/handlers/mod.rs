//! HTTP request handlers.

pub mod auth_handler;
pub mod health;
pub mod jwk_handler;
pub mod metrics;

pub use auth_handler::{handle_generate, handle_verify};
pub use health::health_check;
pub use jwk_handler::handle_get_jwk;
pub use metrics::metrics_handler;
