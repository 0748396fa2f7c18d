// NFT Marketplace Ledger - Main Entry Point

use nft_marketplace_ledger::{
    app_state::{AppState, SharedState},
    config::MarketConfig,
    routes::{router, ENDPOINTS},
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    info!("🖼️  NFT Marketplace Ledger starting");

    let config = match MarketConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    config.log_summary();

    let addr = config.bind_addr;
    let state: SharedState = AppState::load_or_new(config).into_shared();

    // Clone state for shutdown handler before moving into router
    let shutdown_state = state.clone();
    let app = router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("❌ Cannot bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("🚀 Listening on http://{}", addr);
    for (method, path, what) in ENDPOINTS {
        info!("   {:<5} {:<20} - {}", method, path, what);
    }

    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("❌ Failed to install CTRL+C handler: {}", e);
            return;
        }
        info!("🛑 Shutdown signal received, saving state...");

        match shutdown_state.lock() {
            Ok(app_state) => {
                if let Err(e) = app_state.save_to_disk() {
                    error!("❌ Failed to save state: {}", e);
                }
            }
            Err(_) => error!("❌ State mutex poisoned, nothing saved"),
        }
    };

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        error!("❌ Server error: {}", e);
    }

    info!("👋 Goodbye!");
}
