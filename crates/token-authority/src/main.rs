use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use token_authority::config::Config;
use token_authority::key_store::FsKeyStore;
use token_authority::routes::{self, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Token Authority");

    let config = Config::from_env().inspect_err(|e| {
        error!("Failed to load configuration: {}", e);
    })?;

    info!(
        signing_mode = %config.signing_mode,
        contexts = config.tokens.contexts.len(),
        clients = config.tokens.clients.len(),
        token_expire_seconds = config.token_expire_seconds,
        token_renew_seconds = config.token_renew_seconds,
        "Configuration loaded successfully"
    );

    let metrics_handle = routes::init_metrics_recorder().inspect_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
    })?;

    let bind_address = config.bind_address.clone();
    let drain_seconds = config.drain_seconds;
    let key_store = Arc::new(FsKeyStore::new(config.secrets_folder.clone()));
    let state = Arc::new(AppState::new(config, key_store));

    let app = routes::build_routes(state, metrics_handle);

    let addr = bind_address.parse::<SocketAddr>().inspect_err(|e| {
        error!("Invalid bind address: {}", e);
    })?;

    info!("Token Authority listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(drain_seconds))
        .await?;

    info!("Token Authority shutdown complete");

    Ok(())
}

/// `LOG_FORMAT=json` switches to JSON lines; anything else is human readable.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "token_authority=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Listens for shutdown signals (SIGTERM, SIGINT), then waits `drain_secs`.
async fn shutdown_signal(drain_secs: u64) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    if drain_secs > 0 {
        warn!("Draining connections for {} seconds...", drain_secs);
        tokio::time::sleep(Duration::from_secs(drain_secs)).await;
    }
}
