#![allow(dead_code)]

//! In-process mock backend implementing the brokerage REST contract,
//! shared by the integration tests. State is inspectable so tests can
//! assert what actually reached the wire.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use broker_api::Environment;
use broker_client::Brokerage;
use serde_json::{json, Value};

#[derive(Default)]
pub struct MockState {
    pub logged_in: bool,
    pub user_id: Option<String>,
    /// `use_mock` tag of the last login request.
    pub last_login_use_mock: Option<bool>,
    pub logout_calls: usize,
    pub fail_logout: bool,

    pub orders: Vec<Value>,
    pub next_order_seq: u32,
    pub place_calls: usize,

    pub fail_positions: bool,
    pub legacy_balance_shape: bool,
    pub last_historical_interval: Option<String>,
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client for the given registered environment, pointed at this
    /// backend.
    pub fn client(&self, env_id: &str) -> Brokerage {
        let environment = Environment::resolve(env_id)
            .unwrap()
            .with_base_endpoint(self.base_url());
        Brokerage::with_environment(environment).unwrap()
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/status", get(status))
        .route("/api/v1/auth/upload-cert", post(upload_cert))
        .route("/api/v1/order/place", post(place_order))
        .route("/api/v1/order/cancel", post(cancel_order))
        .route("/api/v1/order/modify", post(modify_order))
        .route("/api/v1/order/query", post(query_orders))
        .route("/api/v1/order/detail/:id", get(order_detail))
        .route("/api/v1/order/today", get(today_orders))
        .route("/api/v1/account/info", get(account_info))
        .route("/api/v1/account/balance", get(balance))
        .route("/api/v1/account/buying-power", get(buying_power))
        .route("/api/v1/account/positions", get(positions))
        .route("/api/v1/account/position", post(single_position))
        .route("/api/v1/account/settlements", get(settlements))
        .route("/api/v1/account/profit-loss", get(profit_loss))
        .route("/api/v1/account/margin", get(margin))
        .route("/api/v1/account/summary", get(summary))
        .route("/api/v1/market/subscribe", post(subscribe))
        .route("/api/v1/market/unsubscribe", post(unsubscribe))
        .route("/api/v1/market/quote", post(quote))
        .route("/api/v1/market/historical", post(historical))
        .route("/api/v1/market/intraday", post(intraday))
        .with_state(state)
}

type ApiResult = (StatusCode, Json<Value>);

fn ok(body: Value) -> ApiResult {
    (StatusCode::OK, Json(body))
}

fn rejected(status: StatusCode, detail: &str) -> ApiResult {
    (status, Json(json!({ "detail": detail })))
}

fn require_login(state: &MockState) -> Result<(), ApiResult> {
    if state.logged_in {
        Ok(())
    } else {
        Err(rejected(
            StatusCode::UNAUTHORIZED,
            "Not logged in. Please login first.",
        ))
    }
}

async fn health() -> ApiResult {
    ok(json!({ "status": "healthy", "version": "1.0.0" }))
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> ApiResult {
    let mut guard = state.lock().unwrap();
    let user_id = body.get("user_id").and_then(Value::as_str).unwrap_or("");
    let password = body.get("password").and_then(Value::as_str).unwrap_or("");
    let cert_path = body.get("cert_path").and_then(Value::as_str).unwrap_or("");
    guard.last_login_use_mock = body.get("use_mock").and_then(Value::as_bool);

    if cert_path.is_empty() {
        return rejected(StatusCode::UNAUTHORIZED, "certificate path missing");
    }
    if password == "wrong" {
        return rejected(StatusCode::UNAUTHORIZED, "invalid user id or password");
    }

    guard.logged_in = true;
    guard.user_id = Some(user_id.to_string());
    ok(json!({
        "success": true,
        "message": "login ok",
        "user_id": user_id,
        "session_id": "default"
    }))
}

async fn logout(State(state): State<Shared>) -> ApiResult {
    let mut guard = state.lock().unwrap();
    guard.logout_calls += 1;
    if guard.fail_logout {
        return rejected(StatusCode::INTERNAL_SERVER_ERROR, "logout failed");
    }
    guard.logged_in = false;
    guard.user_id = None;
    ok(json!({ "success": true, "message": "logged out" }))
}

async fn status(State(state): State<Shared>) -> ApiResult {
    let guard = state.lock().unwrap();
    ok(json!({
        "success": true,
        "is_logged_in": guard.logged_in,
        "user_id": guard.user_id.clone(),
        "session_id": "default"
    }))
}

async fn upload_cert(mut multipart: Multipart) -> ApiResult {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("certificate") {
            continue;
        }
        let file_name = field
            .file_name()
            .unwrap_or("certificate.pfx")
            .to_string();
        let bytes = field.bytes().await.unwrap();
        if bytes.is_empty() {
            return rejected(StatusCode::BAD_REQUEST, "empty certificate file");
        }
        return ok(json!({
            "success": true,
            "cert_path": format!("/srv/certs/{file_name}")
        }));
    }
    rejected(StatusCode::BAD_REQUEST, "certificate field missing")
}

async fn place_order(State(state): State<Shared>, Json(body): Json<Value>) -> ApiResult {
    let mut guard = state.lock().unwrap();
    guard.place_calls += 1;
    if let Err(denied) = require_login(&guard) {
        return denied;
    }

    guard.next_order_seq += 1;
    let order_id = format!("ORD-{:04}", guard.next_order_seq);
    let order = json!({
        "order_id": order_id.clone(),
        "stock_code": body.get("stock_code").cloned().unwrap_or(Value::Null),
        "action": body.get("action").cloned().unwrap_or(Value::Null),
        "price_type": body.get("price_type").cloned().unwrap_or(Value::Null),
        "price": body.get("price").cloned().unwrap_or(Value::Null),
        "quantity": body.get("quantity").cloned().unwrap_or(Value::Null),
        "order_type": body.get("order_type").cloned().unwrap_or(json!("ROD")),
        "order_condition": body.get("order_condition").cloned().unwrap_or(json!("Cash")),
        "status": "pending",
        "filled_quantity": 0,
        "order_time": "09:30:00"
    });
    guard.orders.push(order);

    ok(json!({
        "success": true,
        "message": "order accepted",
        "order_id": order_id,
        "stock_code": body.get("stock_code").cloned().unwrap_or(Value::Null),
        "action": body.get("action").cloned().unwrap_or(Value::Null),
        "price": body.get("price").cloned().unwrap_or(Value::Null),
        "quantity": body.get("quantity").cloned().unwrap_or(Value::Null)
    }))
}

async fn cancel_order(State(state): State<Shared>, Json(body): Json<Value>) -> ApiResult {
    let mut guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    let order_id = body.get("order_id").and_then(Value::as_str).unwrap_or("");
    let Some(order) = guard
        .orders
        .iter_mut()
        .find(|o| o.get("order_id").and_then(Value::as_str) == Some(order_id))
    else {
        return rejected(StatusCode::BAD_REQUEST, "unknown order id");
    };

    let status = order.get("status").and_then(Value::as_str).unwrap_or("");
    if matches!(status, "filled" | "cancelled" | "rejected") {
        return rejected(StatusCode::BAD_REQUEST, "order already finalized");
    }
    order["status"] = json!("cancelled");
    ok(json!({ "success": true, "message": "cancelled", "order_id": order_id }))
}

async fn modify_order(State(state): State<Shared>, Json(body): Json<Value>) -> ApiResult {
    let mut guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    let order_id = body.get("order_id").and_then(Value::as_str).unwrap_or("");
    let Some(order) = guard
        .orders
        .iter_mut()
        .find(|o| o.get("order_id").and_then(Value::as_str) == Some(order_id))
    else {
        return rejected(StatusCode::BAD_REQUEST, "unknown order id");
    };

    if let Some(price) = body.get("price").filter(|p| !p.is_null()) {
        order["price"] = price.clone();
    }
    if let Some(quantity) = body.get("quantity").filter(|q| !q.is_null()) {
        order["quantity"] = quantity.clone();
    }
    ok(json!({ "success": true, "message": "modified", "order_id": order_id }))
}

async fn query_orders(State(state): State<Shared>, Json(body): Json<Value>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    let status = body.get("status").and_then(Value::as_str);
    let stock_code = body.get("stock_code").and_then(Value::as_str);
    let orders: Vec<Value> = guard
        .orders
        .iter()
        .filter(|o| {
            status.map_or(true, |s| {
                o.get("status").and_then(Value::as_str) == Some(s)
            }) && stock_code.map_or(true, |c| {
                o.get("stock_code").and_then(Value::as_str) == Some(c)
            })
        })
        .cloned()
        .collect();
    ok(json!({ "success": true, "count": orders.len(), "orders": orders }))
}

async fn order_detail(State(state): State<Shared>, Path(id): Path<String>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    match guard
        .orders
        .iter()
        .find(|o| o.get("order_id").and_then(Value::as_str) == Some(id.as_str()))
    {
        Some(order) => ok(json!({ "success": true, "order": order })),
        None => rejected(StatusCode::NOT_FOUND, "order not found"),
    }
}

async fn today_orders(State(state): State<Shared>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    ok(json!({
        "success": true,
        "count": guard.orders.len(),
        "orders": guard.orders.clone()
    }))
}

async fn account_info(State(state): State<Shared>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    ok(json!({
        "success": true,
        "data": {
            "account_id": "9801-123456",
            "account_type": "cash",
            "status": "active"
        }
    }))
}

async fn balance(State(state): State<Shared>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    if guard.legacy_balance_shape {
        // Older envelope: metrics flat at the root.
        ok(json!({
            "success": true,
            "balance": 1_500_000.0,
            "buying_power": 3_000_000.0
        }))
    } else {
        ok(json!({
            "success": true,
            "buying_power": 3_000_000.0,
            "data": {
                "total_asset": 1_500_000.0,
                "available_balance": 1_500_000.0,
                "market_value": 1_160_000.0
            }
        }))
    }
}

async fn buying_power(State(state): State<Shared>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    ok(json!({
        "success": true,
        "buying_power": 3_000_000.0,
        "formatted": "NT$ 3,000,000"
    }))
}

fn position_rows() -> Value {
    json!([
        {
            "stock_code": "2330",
            "stock_name": "TSMC",
            "quantity": 2000,
            "average_price": 580.0,
            "current_price": 600.0,
            "market_value": 1_200_000.0,
            "unrealized_pl": 40_000.0,
            "return_rate": 3.45
        },
        {
            "stock_code": "2317",
            "stock_name": "Hon Hai",
            "quantity": 1000,
            "average_price": 102.0,
            "current_price": 100.5,
            "market_value": 100_500.0,
            "unrealized_pl": -1_500.0,
            "return_rate": -1.47
        }
    ])
}

async fn positions(State(state): State<Shared>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    if guard.fail_positions {
        return rejected(StatusCode::INTERNAL_SERVER_ERROR, "positions unavailable");
    }
    let rows = position_rows();
    let count = rows.as_array().map_or(0, Vec::len);
    ok(json!({
        "success": true,
        "positions": rows,
        "total_count": count
    }))
}

async fn single_position(State(state): State<Shared>, Json(body): Json<Value>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    let code = body.get("stock_code").and_then(Value::as_str).unwrap_or("");
    let row = position_rows()
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r.get("stock_code").and_then(Value::as_str) == Some(code))
        .cloned();
    match row {
        Some(row) => ok(json!({ "success": true, "stock_code": code, "position": row })),
        None => ok(json!({ "success": false, "message": format!("no position in {code}") })),
    }
}

async fn settlements(State(state): State<Shared>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    ok(json!({
        "success": true,
        "settlements": [
            { "date": "2024-01-04", "amount": -580_000.0 }
        ]
    }))
}

async fn profit_loss(State(state): State<Shared>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    ok(json!({
        "success": true,
        "profit_loss": { "today_pl": 12_500.0, "total_pl": 38_500.0 }
    }))
}

async fn margin(State(state): State<Shared>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    ok(json!({
        "success": true,
        "margin_info": { "margin_quota": 5_000_000.0, "short_quota": 2_000_000.0 }
    }))
}

async fn summary(State(state): State<Shared>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    ok(json!({
        "success": true,
        "summary": {
            "position_count": 2,
            "total_market_value": 1_300_500.0,
            "user_id": guard.user_id.clone()
        }
    }))
}

async fn subscribe(State(state): State<Shared>, Json(body): Json<Value>) -> ApiResult {
    subscription_ack(state, body)
}

async fn unsubscribe(State(state): State<Shared>, Json(body): Json<Value>) -> ApiResult {
    subscription_ack(state, body)
}

fn subscription_ack(state: Shared, body: Value) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    let results: Vec<Value> = body
        .get("stock_codes")
        .and_then(Value::as_array)
        .map(|codes| {
            codes
                .iter()
                .map(|c| json!({ "stock_code": c, "success": true }))
                .collect()
        })
        .unwrap_or_default();
    ok(json!({ "success": true, "message": "processed", "results": results }))
}

async fn quote(State(state): State<Shared>, Json(body): Json<Value>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    let quotes: Vec<Value> = body
        .get("stock_codes")
        .and_then(Value::as_array)
        .map(|codes| {
            codes
                .iter()
                .map(|c| {
                    json!({
                        "code": c,
                        "name": "",
                        "price": 600.0,
                        "change": 5.0,
                        "change_percent": 0.84,
                        "volume": 21_500_000u64,
                        "bid_price": 599.0,
                        "bid_volume": 1200,
                        "ask_price": 600.0,
                        "ask_volume": 900
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    ok(json!({ "success": true, "count": quotes.len(), "quotes": quotes }))
}

async fn historical(State(state): State<Shared>, Json(body): Json<Value>) -> ApiResult {
    let mut guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    guard.last_historical_interval = body
        .get("interval")
        .and_then(Value::as_str)
        .map(str::to_string);
    ok(json!({
        "success": true,
        "stock_code": body.get("stock_code").cloned().unwrap_or(Value::Null),
        "interval": body.get("interval").cloned().unwrap_or(Value::Null),
        "count": 2,
        "data": [
            { "date": "2024-01-02", "open": 590.0, "high": 601.0, "low": 588.0, "close": 600.0, "volume": 32_000_000u64 },
            { "date": "2024-01-03", "open": 600.0, "high": 606.0, "low": 596.0, "close": 605.0, "volume": 28_400_000u64 }
        ]
    }))
}

async fn intraday(State(state): State<Shared>, Json(body): Json<Value>) -> ApiResult {
    let guard = state.lock().unwrap();
    if let Err(denied) = require_login(&guard) {
        return denied;
    }
    ok(json!({
        "success": true,
        "stock_code": body.get("stock_code").cloned().unwrap_or(Value::Null),
        "data": [
            { "time": "09:00:05", "price": 598.0, "volume": 1500 },
            { "time": "09:00:10", "price": 599.0, "volume": 800 }
        ]
    }))
}
