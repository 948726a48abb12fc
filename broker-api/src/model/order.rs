//! Order models and the client-side validation rules applied before an
//! order draft is allowed to reach the network.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BrokerError, Result};

/// Minimum tradable quantity increment, in shares.
pub const LOT_SIZE: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Price semantics of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceType {
    /// Execute at the given price or better.
    #[serde(rename = "LMT")]
    Limit,
    /// Execute at the prevailing market price; any supplied price is
    /// advisory only and ignored by the backend.
    #[serde(rename = "MKT")]
    Market,
    /// Market order bounded to the exchange price band.
    #[serde(rename = "MKP")]
    MarketRange,
}

/// Order validity policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Rest in the book until the end of the trading day.
    #[serde(rename = "ROD")]
    DayOnly,
    /// Fill what is immediately available, cancel the remainder.
    #[serde(rename = "IOC")]
    ImmediateOrCancel,
    /// Fill in full or cancel the whole order.
    #[serde(rename = "FOK")]
    FillOrKill,
}

impl Default for TimeInForce {
    fn default() -> Self {
        Self::DayOnly
    }
}

/// Settlement condition of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Settlement {
    Cash,
    #[serde(rename = "MarginTrading")]
    MarginBuy,
    #[serde(rename = "ShortSelling")]
    ShortSell,
}

impl Default for Settlement {
    fn default() -> Self {
        Self::Cash
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted by the backend, resting in the book. Older backend
    /// versions report this state as "submitted".
    #[serde(alias = "submitted")]
    Pending,
    /// Some quantity filled, the rest still working.
    PartiallyFilled,
    Filled,
    Cancelled,
    /// Rejected by the backend or the exchange.
    Rejected,
}

impl OrderStatus {
    /// Terminal orders accept no further status transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Rejected)
    }
}

/// An order as the caller composes it, before the backend has assigned an
/// id. Serializes directly into the place-order request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub stock_code: String,
    pub action: OrderSide,
    pub price_type: PriceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Quantity in shares; must be a positive multiple of [`LOT_SIZE`].
    pub quantity: u32,
    #[serde(rename = "order_type", default)]
    pub time_in_force: TimeInForce,
    #[serde(rename = "order_condition", default)]
    pub settlement: Settlement,
}

impl OrderDraft {
    /// Applies the client-side invariants. Runs before any network call so
    /// a malformed draft fails fast without touching the backend.
    pub fn validate(&self) -> Result<()> {
        let code_ok = (4..=6).contains(&self.stock_code.len())
            && self.stock_code.bytes().all(|b| b.is_ascii_digit());
        if !code_ok {
            return Err(BrokerError::validation(
                "stock_code",
                format!("'{}' is not a 4-6 digit stock code", self.stock_code),
            ));
        }

        if self.quantity == 0 || self.quantity % LOT_SIZE != 0 {
            return Err(BrokerError::validation(
                "quantity",
                format!(
                    "{} is not a positive multiple of the {} share lot",
                    self.quantity, LOT_SIZE
                ),
            ));
        }

        // Market orders carry no price requirement; anything the caller
        // supplies is advisory and forwarded untouched.
        if self.price_type != PriceType::Market && self.price.is_none() {
            return Err(BrokerError::validation(
                "price",
                "price is required unless price_type is MKT",
            ));
        }

        if let Some(price) = self.price {
            if !price.is_finite() || price <= 0.0 {
                return Err(BrokerError::validation(
                    "price",
                    format!("{price} is not a positive price"),
                ));
            }
        }

        Ok(())
    }
}

/// A server-acknowledged order. `order_id` is assigned by the backend;
/// `status` and `filled_quantity` change only through replies to
/// query/cancel calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub stock_code: String,
    pub action: OrderSide,
    pub price_type: PriceType,
    #[serde(default)]
    pub price: Option<f64>,
    pub quantity: u32,
    #[serde(rename = "order_type", default)]
    pub time_in_force: TimeInForce,
    #[serde(rename = "order_condition", default)]
    pub settlement: Settlement,
    pub status: OrderStatus,
    #[serde(default)]
    pub filled_quantity: u32,
    /// Submission time as reported by the backend.
    #[serde(default)]
    pub order_time: Option<String>,
}

/// Acknowledgment of a successful place-order call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order_id: String,
    pub stock_code: String,
    pub action: OrderSide,
    #[serde(default)]
    pub price: Option<f64>,
    pub quantity: u32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(skip, default = "Utc::now")]
    pub accepted_at: DateTime<Utc>,
}

/// Acknowledgment of a cancel or modify call. Success here means the
/// backend accepted the request, not that the order state has already
/// changed; the order list is the authoritative view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Filter for the order-query endpoint. All fields optional; an empty
/// filter returns every order of the day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}
