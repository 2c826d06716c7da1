//! BARK payments action dispatcher server.
//!
//! # Usage
//!
//! ```bash
//! # Run with default config (config.toml in current directory)
//! cargo run -p bark-pay-server --release
//!
//! # Run with custom config path
//! CONFIG=/path/to/config.toml cargo run -p bark-pay-server
//!
//! # Configure logging level
//! RUST_LOG=info cargo run -p bark-pay-server
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to TOML configuration file (default: `config.toml`)
//! - `HOST` — Override bind address (default: `0.0.0.0`)
//! - `PORT` — Override port (default: `8787`)
//! - `RUST_LOG` — Log level filter (default: `info`)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use tower_http::cors;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use bark_pay::giftcard::GiftCardVault;
use bark_pay::ledger::LedgerClient;
use bark_pay::ledger::rpc::RpcLedger;
use bark_pay::wallet::{LocalWallet, WalletSigner};
use bark_pay::{PaymentRequestService, TokenRegistry, TransferBuilder};

use bark_pay_server::config::ServerConfig;
use bark_pay_server::handlers::{AppState, dispatcher_router};
use bark_pay_server::blinks::BlinkStore;

#[tokio::main]
async fn main() {
    // .env is optional; ignore a missing file.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Dispatcher failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        rpc = %config.rpc_url,
        "Loaded configuration"
    );

    let merchant = bark_pay::transfer::parse_address(&config.merchant_address)
        .map_err(|e| format!("Invalid merchant_address: {e}"))?;

    let escrow: Arc<dyn WalletSigner> = match &config.escrow_keypair_path {
        Some(path) => {
            let keypair = solana_keypair::read_keypair_file(path)
                .map_err(|e| format!("Failed to read escrow keypair from {path}: {e}"))?;
            Arc::new(LocalWallet::new(keypair))
        }
        None => {
            tracing::warn!(
                "escrow_keypair_path not set — using an ephemeral escrow; \
                 outstanding gift cards will not survive a restart"
            );
            Arc::new(LocalWallet::generate())
        }
    };
    tracing::info!(escrow = %escrow.address(), merchant = %merchant, "Escrow ready");

    let registry = Arc::new(TokenRegistry::with_defaults());
    let ledger: Arc<dyn LedgerClient> = Arc::new(RpcLedger::new(&config.rpc_url));

    let mut payments =
        PaymentRequestService::new(Arc::clone(&registry), Arc::clone(&ledger), merchant);
    if let Some(label) = &config.merchant_label {
        payments = payments.with_label(label.clone());
    }

    let state = Arc::new(AppState {
        transfers: TransferBuilder::new(Arc::clone(&registry), Arc::clone(&ledger)),
        payments,
        giftcards: GiftCardVault::new(registry, ledger, escrow),
        blinks: BlinkStore::new(),
    });

    let app = Router::new()
        .merge(dispatcher_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(cors::Any),
        );

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Dispatcher listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Dispatcher shut down gracefully");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM (Unix) to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down..."),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("failed to listen for Ctrl-C");
        tracing::info!("Received Ctrl-C, shutting down...");
    }
}
