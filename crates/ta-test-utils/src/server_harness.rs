//! Test server harness for E2E testing
//!
//! Provides `TestTokenAuthority` for spawning real server instances in tests,
//! plus config builders for both signing modes.

use crate::crypto_fixtures::TEST_APP_SECRET;
use common::secret::SecretString;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use token_authority::config::Config;
use token_authority::key_store::FsKeyStore;
use token_authority::models::{ContextKeyConfig, RegisteredClient};
use token_authority::routes::{self, AppState};
use tokio::task::JoinHandle;

/// Shared-secret configuration with the given `(token name, client name, secret)` registry.
///
/// Signs with [`TEST_APP_SECRET`].
pub fn shared_secret_config(clients: &[(&str, &str, &str)]) -> Result<Config, anyhow::Error> {
    let vars = HashMap::from([
        ("SIGNING_MODE".to_string(), "shared_secret".to_string()),
        ("JWT_APP_SECRET".to_string(), TEST_APP_SECRET.to_string()),
        ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
    ]);

    let mut config = Config::from_vars(&vars)
        .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

    config.tokens.clients = clients
        .iter()
        .map(|(token, name, secret)| {
            (
                (*token).to_string(),
                RegisteredClient {
                    name: (*name).to_string(),
                    secret: SecretString::from(*secret),
                },
            )
        })
        .collect();

    Ok(config)
}

/// Certificate configuration reading keys from `secrets_root`.
///
/// Each entry is `(context, private key path, public key path)`, paths relative
/// to `secrets_root`.
pub fn certificate_config(
    secrets_root: &Path,
    contexts: &[(&str, Option<&str>, Option<&str>)],
) -> Result<Config, anyhow::Error> {
    let vars = HashMap::from([
        ("SIGNING_MODE".to_string(), "certificate".to_string()),
        ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        (
            "SECRETS_FOLDER".to_string(),
            secrets_root.to_string_lossy().into_owned(),
        ),
    ]);

    let mut config = Config::from_vars(&vars)
        .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

    config.tokens.contexts = contexts
        .iter()
        .map(|(context, private, public)| {
            (
                (*context).to_string(),
                ContextKeyConfig {
                    private_file_path: private.map(str::to_string),
                    public_file_path: public.map(str::to_string),
                    pem_file_name: None,
                },
            )
        })
        .collect();

    Ok(config)
}

/// Test harness for spawning the token authority in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health_flow_e2e() -> Result<(), anyhow::Error> {
///     let server = TestTokenAuthority::spawn(shared_secret_config(&[])?).await?;
///
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestTokenAuthority {
    addr: SocketAddr,
    config: Config,
    _handle: JoinHandle<()>,
}

impl TestTokenAuthority {
    /// Spawn a server for `config`.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Read key files from `config.secrets_folder`
    /// - Start the HTTP server in the background
    pub async fn spawn(config: Config) -> Result<Self, anyhow::Error> {
        let key_store = Arc::new(FsKeyStore::new(config.secrets_folder.clone()));
        let state = Arc::new(AppState::new(config.clone(), key_store));

        // Only one global recorder per process; later servers get a detached handle
        let metrics_handle = routes::init_metrics_recorder()
            .unwrap_or_else(|_| PrometheusBuilder::new().build_recorder().handle());

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for TestTokenAuthority {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
