// HTTP request handlers for the marketplace API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use std::sync::MutexGuard;
use tracing::error;

use crate::app_state::{AppState, SharedState};
use crate::ledger::{BalanceLedger, LedgerError};
use crate::marketplace::{Item, MarketError, MarketEvent};
use crate::models::*;
use crate::units::ItemId;

// ===== ERRORS =====

/// Error returned by every handler, rendered as `{ success: false, error }`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn internal(message: &str) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse { success: false, error: self.message };
        (self.status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        let status = match e {
            LedgerError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::AccountExists(_) => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        };
        Self { status, message: e.to_string() }
    }
}

impl From<MarketError> for ApiError {
    fn from(e: MarketError) -> Self {
        let status = match &e {
            MarketError::ItemNotFound(_) => StatusCode::NOT_FOUND,
            MarketError::AlreadySold(_) => StatusCode::CONFLICT,
            MarketError::Ledger(LedgerError::AccountNotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        Self { status, message: e.to_string() }
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn lock(state: &SharedState) -> Result<MutexGuard<'_, AppState>, ApiError> {
    state.lock().map_err(|_| {
        error!("❌ State mutex poisoned");
        ApiError::internal("state unavailable")
    })
}

// ===== HEALTH & CONFIG =====

pub async fn health_check() -> &'static str {
    "NFT Marketplace Ledger - Online ✅"
}

pub async fn get_listing_fee(State(state): State<SharedState>) -> ApiResult<AmountView> {
    let app_state = lock(&state)?;
    Ok(Json(app_state.marketplace.listing_fee().into()))
}

// ===== ACCOUNTS =====

pub async fn open_account(
    State(state): State<SharedState>,
    Json(request): Json<OpenAccountRequest>,
) -> ApiResult<BalanceResponse> {
    let mut app_state = lock(&state)?;
    let balance = app_state.open_account(&request.address)?;

    Ok(Json(BalanceResponse {
        address: request.address,
        balance: balance.into(),
        items: 0,
    }))
}

pub async fn get_balance(
    State(state): State<SharedState>,
    Path(address): Path<String>,
) -> ApiResult<BalanceResponse> {
    let app_state = lock(&state)?;
    let balance = app_state
        .ledger
        .balance(&address)
        .ok_or_else(|| LedgerError::AccountNotFound(address.clone()))?;
    let items = app_state.marketplace.balance_of(&address);

    Ok(Json(BalanceResponse { address, balance: balance.into(), items }))
}

// ===== ITEMS =====

pub async fn mint_item(
    State(state): State<SharedState>,
    Json(request): Json<MintRequest>,
) -> ApiResult<MintResponse> {
    let mut guard = lock(&state)?;
    let app_state = &mut *guard;

    let item_id = app_state.marketplace.mint(
        &mut app_state.ledger,
        &request.caller,
        &request.token_uri,
        request.price,
        request.fee_paid,
    )?;
    let new_balance = app_state.ledger.balance(&request.caller).unwrap_or_default();

    Ok(Json(MintResponse {
        success: true,
        item_id,
        owner: request.caller,
        token_uri: request.token_uri,
        new_balance: new_balance.into(),
    }))
}

pub async fn buy_item(
    State(state): State<SharedState>,
    Path(id): Path<ItemId>,
    Json(request): Json<BuyRequest>,
) -> ApiResult<BuyResponse> {
    let mut guard = lock(&state)?;
    let app_state = &mut *guard;

    let seller = app_state.marketplace.owner_of(id)?.to_string();
    app_state
        .marketplace
        .buy(&mut app_state.ledger, &request.caller, id, request.amount_paid)?;
    let new_balance = app_state.ledger.balance(&request.caller).unwrap_or_default();

    Ok(Json(BuyResponse {
        success: true,
        item_id: id,
        seller,
        owner: request.caller,
        price: request.amount_paid.into(),
        new_balance: new_balance.into(),
    }))
}

pub async fn list_items(
    State(state): State<SharedState>,
    Query(query): Query<ItemsQuery>,
) -> ApiResult<Vec<Item>> {
    let app_state = lock(&state)?;
    let items = app_state
        .marketplace
        .items()
        .filter(|item| !query.unsold || !item.sold)
        .filter(|item| query.owner.as_deref().map_or(true, |owner| item.owner == owner))
        .cloned()
        .collect();
    Ok(Json(items))
}

pub async fn get_item(
    State(state): State<SharedState>,
    Path(id): Path<ItemId>,
) -> ApiResult<Item> {
    let app_state = lock(&state)?;
    let item = app_state
        .marketplace
        .item(id)
        .cloned()
        .ok_or(MarketError::ItemNotFound(id))?;
    Ok(Json(item))
}

pub async fn get_owner(
    State(state): State<SharedState>,
    Path(id): Path<ItemId>,
) -> ApiResult<OwnerResponse> {
    let app_state = lock(&state)?;
    let owner = app_state.marketplace.owner_of(id)?.to_string();
    Ok(Json(OwnerResponse { item_id: id, owner }))
}

// ===== ACTIVITY =====

pub async fn get_events(State(state): State<SharedState>) -> ApiResult<Vec<MarketEvent>> {
    let app_state = lock(&state)?;
    Ok(Json(app_state.marketplace.events().to_vec()))
}

pub async fn get_stats(State(state): State<SharedState>) -> ApiResult<StatsResponse> {
    let app_state = lock(&state)?;
    Ok(Json(StatsResponse {
        market: app_state.marketplace.stats(),
        ledger: app_state.ledger.stats(),
    }))
}

pub async fn get_ledger_activity(State(state): State<SharedState>) -> ApiResult<Value> {
    let app_state = lock(&state)?;
    let recent = app_state.ledger.recent_transactions(100);
    Ok(Json(json!({
        "total": app_state.ledger.transactions().len(),
        "transactions": recent,
    })))
}
