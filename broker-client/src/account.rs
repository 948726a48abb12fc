//! Account state: raw endpoint family plus the normalized snapshot.

use std::sync::Arc;

use broker_api::{AccountInfo, AccountSnapshot, BalanceView, PnlView, Position, Result};
use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::normalize;
use crate::transport::Transport;

#[derive(Serialize)]
struct PositionRequest<'a> {
    stock_code: &'a str,
}

pub struct AccountClient {
    transport: Arc<Transport>,
}

impl AccountClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    async fn fetch(&self, path: &str, fallback: &str) -> Result<Value> {
        let reply = self.transport.get(path).await?;
        if !reply.is_success() {
            return Err(reply.business_error(fallback));
        }
        Ok(reply.body)
    }

    /// Account identity fields, normalized.
    pub async fn info(&self) -> Result<AccountInfo> {
        let body = self
            .fetch("/api/v1/account/info", "account info query failed")
            .await?;
        Ok(normalize::normalize_account_info(&body))
    }

    /// Canonical balance metrics, normalized across envelope versions.
    pub async fn balance(&self) -> Result<BalanceView> {
        let body = self
            .fetch("/api/v1/account/balance", "balance query failed")
            .await?;
        Ok(normalize::normalize_balance(&body))
    }

    /// Funds currently available for new purchases.
    pub async fn buying_power(&self) -> Result<f64> {
        let body = self
            .fetch("/api/v1/account/buying-power", "buying-power query failed")
            .await?;
        Ok(body
            .get("buying_power")
            .and_then(Value::as_f64)
            .unwrap_or(0.0))
    }

    /// All holdings, normalized.
    pub async fn positions(&self) -> Result<Vec<Position>> {
        let body = self
            .fetch("/api/v1/account/positions", "positions query failed")
            .await?;
        Ok(normalize::normalize_positions(&body))
    }

    /// One holding by symbol; `None` when the account holds nothing in it.
    pub async fn position(&self, stock_code: &str) -> Result<Option<Position>> {
        let request = PositionRequest { stock_code };
        let reply = self
            .transport
            .post_json("/api/v1/account/position", &request)
            .await?;
        if !reply.is_success() {
            return Err(reply.business_error("position query failed"));
        }
        let success = reply
            .body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Ok(match reply.body.get("position") {
            Some(row) if success && !row.is_null() => Some(normalize::normalize_position(row)),
            _ => None,
        })
    }

    /// Pending settlement rows, passed through as reported.
    pub async fn settlements(&self) -> Result<Value> {
        self.fetch("/api/v1/account/settlements", "settlements query failed")
            .await
    }

    /// Canonical profit/loss metrics, normalized.
    pub async fn profit_loss(&self) -> Result<PnlView> {
        let body = self
            .fetch("/api/v1/account/profit-loss", "profit-loss query failed")
            .await?;
        Ok(normalize::normalize_profit_loss(&body))
    }

    /// Margin/short quota details, passed through as reported.
    pub async fn margin(&self) -> Result<Value> {
        self.fetch("/api/v1/account/margin", "margin query failed")
            .await
    }

    /// Backend-assembled account summary, passed through as reported.
    pub async fn summary(&self) -> Result<Value> {
        self.fetch("/api/v1/account/summary", "summary query failed")
            .await
    }

    /// Fan-out/fan-in snapshot refresh: info, balance, positions and
    /// profit/loss fetched in parallel and joined. Any single failure
    /// fails the whole refresh, so a caller keeps its previous snapshot
    /// instead of displaying a partially overwritten one. The constituent
    /// calls may reflect slightly different instants; the snapshot never
    /// claims otherwise.
    pub async fn snapshot(&self) -> Result<AccountSnapshot> {
        let (info, balance, positions, pnl) = tokio::try_join!(
            self.info(),
            self.balance(),
            self.positions(),
            self.profit_loss(),
        )?;
        debug!(
            "snapshot assembled: {} positions, total asset {}",
            positions.len(),
            balance.total_asset_value
        );
        Ok(AccountSnapshot::assemble(info, balance, pnl, positions))
    }
}
