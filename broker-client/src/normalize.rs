//! Response normalization.
//!
//! The backend's response envelope has changed shape across versions: the
//! same logical metric may arrive flat at the payload root, nested under
//! `data`, or under a named sub-object. Each canonical field is therefore
//! resolved through an explicit ordered list of candidate paths, first
//! present non-null value wins, zero/empty otherwise. Absence is never an
//! error here.
//!
//! The canonical field name itself is always the first candidate, which
//! makes every normalizer idempotent: feeding a normalized view back in
//! reproduces it.

use broker_api::{AccountInfo, BalanceView, PnlView, Position};
use serde_json::Value;

/// Walks one dot-separated path from the payload root. A `null` leaf
/// counts as absent.
fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = raw;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// First present value among the candidate paths, in order.
fn first_present<'a>(raw: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths.iter().find_map(|path| lookup(raw, path))
}

fn number(raw: &Value, paths: &[&str]) -> f64 {
    first_present(raw, paths)
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn integer(raw: &Value, paths: &[&str]) -> i64 {
    first_present(raw, paths)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0)
}

fn text(raw: &Value, paths: &[&str]) -> String {
    first_present(raw, paths)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Canonical balance metrics from any known balance envelope.
pub fn normalize_balance(raw: &Value) -> BalanceView {
    BalanceView {
        available_balance: number(raw, &["available_balance", "data.available_balance", "balance"]),
        buying_power: number(raw, &["buying_power", "data.buying_power"]),
        total_asset_value: number(raw, &["total_asset_value", "balance", "data.total_asset"]),
        market_value: number(raw, &["market_value", "data.market_value", "data.total_market_value"]),
    }
}

/// Canonical profit/loss metrics; tolerates the nested `profit_loss`
/// envelope as well as flat payloads.
pub fn normalize_profit_loss(raw: &Value) -> PnlView {
    PnlView {
        today_pnl: number(raw, &["today_pnl", "profit_loss.today_pl", "today_pl"]),
        total_pnl: number(raw, &["total_pnl", "profit_loss.total_pl", "total_pl"]),
    }
}

/// Canonical account identity fields.
pub fn normalize_account_info(raw: &Value) -> AccountInfo {
    AccountInfo {
        account_id: text(raw, &["account_id", "data.account_id"]),
        account_type: text(raw, &["account_type", "data.account_type"]),
        status: text(raw, &["status", "data.status"]),
    }
}

/// Canonical position rows. A payload without a recognizable array
/// normalizes to no positions.
pub fn normalize_positions(raw: &Value) -> Vec<Position> {
    let Some(rows) = first_present(raw, &["positions", "data"]).and_then(Value::as_array) else {
        return Vec::new();
    };
    rows.iter().map(normalize_position).collect()
}

pub(crate) fn normalize_position(row: &Value) -> Position {
    Position {
        stock_code: text(row, &["stock_code", "code"]),
        stock_name: text(row, &["stock_name", "name"]),
        quantity: integer(row, &["quantity"]),
        average_price: number(row, &["average_price", "cost_price"]),
        current_price: number(row, &["current_price", "last_price"]),
        market_value: number(row, &["market_value"]),
        unrealized_pnl: number(row, &["unrealized_pnl", "unrealized_pl"]),
        return_rate_pct: number(row, &["return_rate_pct", "return_rate"]),
    }
}
