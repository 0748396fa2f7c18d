// Routes module - wires every HTTP endpoint to its handler

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::SharedState;
use crate::handlers::*;

/// Build the marketplace router around shared state
pub fn router(state: SharedState) -> Router {
    Router::new()
        // ===== HEALTH CHECK =====
        .route("/", get(health_check))
        .route("/health", get(health_check))

        // ===== MARKET CONFIG =====
        .route("/listing-fee", get(get_listing_fee))
        .route("/stats", get(get_stats))

        // ===== ACCOUNT ENDPOINTS =====
        .route("/accounts", post(open_account))
        .route("/balance/:address", get(get_balance))
        .route("/ledger", get(get_ledger_activity))

        // ===== ITEM ENDPOINTS =====
        .route("/items", get(list_items).post(mint_item))
        .route("/items/:id", get(get_item))
        .route("/items/:id/owner", get(get_owner))
        .route("/items/:id/buy", post(buy_item))
        .route("/events", get(get_events))

        // Apply CORS and state
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Endpoint summary printed at startup
pub const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/listing-fee", "Current listing fee"),
    ("POST", "/accounts", "Open a funded dev account"),
    ("GET", "/balance/:address", "Account balance and item count"),
    ("POST", "/items", "Mint an item (pays listing fee)"),
    ("GET", "/items", "List items (?unsold=true, ?owner=)"),
    ("GET", "/items/:id", "Item details"),
    ("GET", "/items/:id/owner", "Current owner"),
    ("POST", "/items/:id/buy", "Buy an item at its price"),
    ("GET", "/events", "Mint and sale events"),
    ("GET", "/ledger", "Recent balance movements"),
    ("GET", "/stats", "Market and ledger statistics"),
];
