/// HTTP API tests driving the router in-process
///
/// Each test builds a fresh router and sends requests with `oneshot`, so no
/// server or port is needed.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use nft_marketplace_ledger::{routes::router, AppState, MarketConfig, WEI_PER_ETHER};
use serde_json::{json, Value};
use tower::ServiceExt;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn app() -> Router {
    router(AppState::new(MarketConfig::default()).into_shared())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(json) => request.body(Body::from(json.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn open(app: &Router, address: &str) {
    let (status, _) = send(app, "POST", "/accounts", Some(json!({ "address": address }))).await;
    assert_eq!(status, StatusCode::OK);
}

async fn balance(app: &Router, address: &str) -> u128 {
    let (_, body) = send(app, "GET", &format!("/balance/{}", address), None).await;
    body["balance"]["wei"].as_str().unwrap().parse().unwrap()
}

async fn listing_fee(app: &Router) -> String {
    let (_, body) = send(app, "GET", "/listing-fee", None).await;
    body["wei"].as_str().unwrap().to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_listing_fee_endpoint() {
    let app = app();
    let (status, body) = send(&app, "GET", "/listing-fee", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wei"], "25000000000000000");
    assert_eq!(body["ether"], "0.025");
}

#[tokio::test]
async fn test_mint_and_buy_over_http() {
    let app = app();
    open(&app, "owner").await;
    open(&app, "buyer").await;
    let fee = listing_fee(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/items",
        Some(json!({
            "caller": "owner",
            "token_uri": "https://token-uri.com",
            "price": "1 ether",
            "fee_paid": fee,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item_id"], 1);

    let owner_before = balance(&app, "owner").await;
    let buyer_before = balance(&app, "buyer").await;

    let (status, body) = send(
        &app,
        "POST",
        "/items/1/buy",
        Some(json!({ "caller": "buyer", "amount_paid": WEI_PER_ETHER.to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seller"], "owner");
    assert_eq!(body["owner"], "buyer");

    assert_eq!(balance(&app, "owner").await, owner_before + WEI_PER_ETHER);
    assert_eq!(balance(&app, "buyer").await, buyer_before - WEI_PER_ETHER);

    let (_, body) = send(&app, "GET", "/items/1/owner", None).await;
    assert_eq!(body["owner"], "buyer");

    let (_, events) = send(&app, "GET", "/events", None).await;
    assert_eq!(events.as_array().unwrap().len(), 2);
    assert_eq!(events[1]["type"], "sold");
}

#[tokio::test]
async fn test_error_statuses() {
    let app = app();
    open(&app, "owner").await;
    open(&app, "buyer").await;
    let fee = listing_fee(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/items",
        Some(json!({ "caller": "owner", "token_uri": "u", "price": "1 ether", "fee_paid": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    send(
        &app,
        "POST",
        "/items",
        Some(json!({ "caller": "owner", "token_uri": "u", "price": "1 ether", "fee_paid": fee })),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        "/items/1/buy",
        Some(json!({ "caller": "buyer", "amount_paid": "0.5 ether" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/items/7/buy",
        Some(json!({ "caller": "buyer", "amount_paid": "1 ether" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let buy = json!({ "caller": "buyer", "amount_paid": "1 ether" });
    let (status, _) = send(&app, "POST", "/items/1/buy", Some(buy.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "POST", "/items/1/buy", Some(buy)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already sold"));

    let (status, _) = send(&app, "POST", "/accounts", Some(json!({ "address": "owner" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "GET", "/balance/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_item_listing_filters() {
    let app = app();
    open(&app, "owner").await;
    open(&app, "buyer").await;
    let fee = listing_fee(&app).await;

    for uri in ["ipfs://a", "ipfs://b", "ipfs://c"] {
        send(
            &app,
            "POST",
            "/items",
            Some(json!({ "caller": "owner", "token_uri": uri, "price": "1 ether", "fee_paid": fee })),
        )
        .await;
    }
    send(
        &app,
        "POST",
        "/items/2/buy",
        Some(json!({ "caller": "buyer", "amount_paid": "1 ether" })),
    )
    .await;

    let (_, all) = send(&app, "GET", "/items", None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, unsold) = send(&app, "GET", "/items?unsold=true", None).await;
    let ids: Vec<u64> = unsold.as_array().unwrap().iter().map(|i| i["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 3]);

    let (_, owned) = send(&app, "GET", "/items?owner=buyer", None).await;
    assert_eq!(owned[0]["token_uri"], "ipfs://b");

    let (_, item) = send(&app, "GET", "/items/2", None).await;
    assert_eq!(item["sold"], true);
    assert_eq!(item["seller"], "owner");

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["market"]["minted"], 3);
    assert_eq!(stats["market"]["sold"], 1);
    assert_eq!(stats["market"]["fee_revenue"], "75000000000000000");
}
