//! Normalized account views.
//!
//! The backend reports balances, positions and profit/loss in more than
//! one envelope shape; the views here are the single canonical schema the
//! rest of the client works with. All of them are client-side projections
//! recomputed on each refresh, never persisted.

use serde::{Deserialize, Serialize};

/// Basic account identity fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_id: String,
    pub account_type: String,
    pub status: String,
}

/// Canonical balance metrics. Absent backend fields resolve to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceView {
    pub available_balance: f64,
    pub buying_power: f64,
    pub total_asset_value: f64,
    pub market_value: f64,
}

/// Canonical profit/loss metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PnlView {
    pub today_pnl: f64,
    pub total_pnl: f64,
}

/// One holding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub stock_code: String,
    pub stock_name: String,
    /// Shares held; negative for short positions.
    pub quantity: i64,
    pub average_price: f64,
    pub current_price: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    pub return_rate_pct: f64,
}

/// Point-in-time account state assembled from independent backend calls.
///
/// The constituent calls are not transactional on the backend side, so
/// the snapshot never claims strict consistency between, say, balance and
/// positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub account_id: String,
    pub account_type: String,
    pub status: String,
    pub available_balance: f64,
    pub buying_power: f64,
    pub total_asset_value: f64,
    pub market_value: f64,
    pub today_pnl: f64,
    pub total_pnl: f64,
    pub positions: Vec<Position>,
}

impl AccountSnapshot {
    /// Assembles the canonical snapshot out of the four constituent views.
    pub fn assemble(
        info: AccountInfo,
        balance: BalanceView,
        pnl: PnlView,
        positions: Vec<Position>,
    ) -> Self {
        Self {
            account_id: info.account_id,
            account_type: info.account_type,
            status: info.status,
            available_balance: balance.available_balance,
            buying_power: balance.buying_power,
            total_asset_value: balance.total_asset_value,
            market_value: balance.market_value,
            today_pnl: pnl.today_pnl,
            total_pnl: pnl.total_pnl,
            positions,
        }
    }
}
