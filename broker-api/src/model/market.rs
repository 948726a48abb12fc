//! Market data rows as the backend reports them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bar interval for historical queries. Daily unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "D")]
    Daily,
    #[serde(rename = "1")]
    Min1,
    #[serde(rename = "5")]
    Min5,
    #[serde(rename = "15")]
    Min15,
    #[serde(rename = "30")]
    Min30,
    #[serde(rename = "60")]
    Min60,
}

impl Default for Interval {
    fn default() -> Self {
        Self::Daily
    }
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "D",
            Self::Min1 => "1",
            Self::Min5 => "5",
            Self::Min15 => "15",
            Self::Min30 => "30",
            Self::Min60 => "60",
        }
    }
}

/// A point-in-time quote for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub change: f64,
    #[serde(default)]
    pub change_percent: f64,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub bid_price: f64,
    #[serde(default)]
    pub bid_volume: u64,
    #[serde(default)]
    pub ask_price: f64,
    #[serde(default)]
    pub ask_volume: u64,
}

/// One historical bar. Daily unless a finer interval was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

/// One intraday trade tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntradayTick {
    /// Exchange-local time of day, "HH:MM:SS".
    pub time: String,
    pub price: f64,
    #[serde(default)]
    pub volume: u64,
}

/// Per-symbol outcome of a subscribe/unsubscribe registration request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionAck {
    pub stock_code: String,
    pub success: bool,
}
