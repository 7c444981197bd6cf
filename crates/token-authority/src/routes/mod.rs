//! HTTP routes for the token authority.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::key_store::KeyStore;
use crate::middleware::require_token;
use crate::models::SigningMode;
use crate::services::{
    ClientCredentialAuthenticator, ConfiguredKeyResolver, JwkPublisher, KeyResolver, TokenIssuer,
    TokenPolicy, TokenVerifier,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Context to key resolution, shared by every service below.
    pub key_resolver: Arc<dyn KeyResolver>,

    pub token_issuer: TokenIssuer,

    /// Registered shared-secret clients.
    pub authenticator: Arc<ClientCredentialAuthenticator>,

    pub verifier: Arc<TokenVerifier>,

    pub jwk_publisher: Arc<JwkPublisher>,
}

impl AppState {
    /// Wire the services for `config`, reading key files through `key_store`.
    pub fn new(config: Config, key_store: Arc<dyn KeyStore>) -> Self {
        let key_resolver: Arc<dyn KeyResolver> = Arc::new(ConfiguredKeyResolver::new(
            config.signing_mode,
            config.tokens.contexts.clone(),
            config.app_secret.clone(),
            key_store,
        ));

        let token_issuer = TokenIssuer::new(
            TokenPolicy {
                expire_seconds: config.token_expire_seconds,
                renew_window_seconds: config.token_renew_seconds,
            },
            config.timezone,
        );

        let verifier = TokenVerifier::new(
            Arc::clone(&key_resolver),
            token_issuer.clone(),
            Duration::from_secs(config.jwt_clock_skew_seconds.unsigned_abs()),
        );

        Self {
            authenticator: Arc::new(ClientCredentialAuthenticator::new(
                config.tokens.clients.clone(),
            )),
            verifier: Arc::new(verifier),
            jwk_publisher: Arc::new(JwkPublisher::new(Arc::clone(&key_resolver))),
            token_issuer,
            key_resolver,
            config,
        }
    }

    pub fn signing_mode(&self) -> SigningMode {
        self.key_resolver.mode()
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Liveness probe (simple "OK") - public
/// - `/metrics` - Prometheus metrics endpoint - public
/// - `/auth/generate` - Token issuance - public
/// - `/auth/jwk/:context` - Public key as JWK set - public, certificate mode only
/// - `/auth/verify` - Token verification with silent refresh - requires token
/// - TraceLayer for request logging
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let mut public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/generate", post(handlers::handle_generate));

    if state.signing_mode() == SigningMode::Certificate {
        public_routes = public_routes.route("/auth/jwk/:context", get(handlers::handle_get_jwk));
    }

    let public_routes = public_routes.with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/auth/verify", get(handlers::handle_verify))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state);

    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
