//! Market data requests: quotes, historical bars, intraday ticks, and
//! quote subscription registration.
//!
//! Stateless by design: every call is plain request/response and each
//! result replaces whatever the caller displayed before. Subscription
//! calls are fire-and-forget registrations; no streaming channel is
//! opened here.

use std::sync::Arc;

use broker_api::{Candle, Interval, IntradayTick, Quote, Result, SubscriptionAck};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::transport::Transport;

#[derive(Serialize)]
struct CodesRequest<'a> {
    stock_codes: &'a [String],
}

#[derive(Serialize)]
struct HistoricalRequest<'a> {
    stock_code: &'a str,
    interval: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
}

#[derive(Serialize)]
struct IntradayRequest<'a> {
    stock_code: &'a str,
}

#[derive(Deserialize)]
struct QuoteReply {
    #[serde(default)]
    quotes: Vec<Quote>,
}

#[derive(Deserialize)]
struct HistoricalReply {
    #[serde(default)]
    data: Vec<Candle>,
}

#[derive(Deserialize)]
struct IntradayReply {
    #[serde(default)]
    data: Vec<IntradayTick>,
}

#[derive(Deserialize)]
struct SubscriptionReply {
    #[serde(default)]
    results: Vec<SubscriptionAck>,
}

pub struct MarketClient {
    transport: Arc<Transport>,
}

impl MarketClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Point-in-time quotes for a list of symbols.
    pub async fn get_quote(&self, stock_codes: &[String]) -> Result<Vec<Quote>> {
        let request = CodesRequest { stock_codes };
        let reply = self
            .transport
            .post_json("/api/v1/market/quote", &request)
            .await?;
        if !reply.is_success() {
            return Err(reply.business_error("quote query failed"));
        }
        let parsed: QuoteReply = reply.parse("quote reply")?;
        Ok(parsed.quotes)
    }

    /// Historical bars; `range` bounds the query by date when given.
    pub async fn get_historical(
        &self,
        stock_code: &str,
        interval: Interval,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Candle>> {
        let request = HistoricalRequest {
            stock_code,
            interval: interval.as_str(),
            start_date: range.map(|(start, _)| start.to_string()),
            end_date: range.map(|(_, end)| end.to_string()),
        };
        let reply = self
            .transport
            .post_json("/api/v1/market/historical", &request)
            .await?;
        if !reply.is_success() {
            return Err(reply.business_error("historical query failed"));
        }
        let parsed: HistoricalReply = reply.parse("historical reply")?;
        Ok(parsed.data)
    }

    /// Today's trade ticks for one symbol.
    pub async fn get_intraday(&self, stock_code: &str) -> Result<Vec<IntradayTick>> {
        let request = IntradayRequest { stock_code };
        let reply = self
            .transport
            .post_json("/api/v1/market/intraday", &request)
            .await?;
        if !reply.is_success() {
            return Err(reply.business_error("intraday query failed"));
        }
        let parsed: IntradayReply = reply.parse("intraday reply")?;
        Ok(parsed.data)
    }

    /// Registers the symbols for quote updates. The acknowledgment lists
    /// which symbols were accepted.
    pub async fn subscribe_quote(&self, stock_codes: &[String]) -> Result<Vec<SubscriptionAck>> {
        self.subscription("/api/v1/market/subscribe", stock_codes)
            .await
    }

    /// Deregisters the symbols from quote updates.
    pub async fn unsubscribe_quote(&self, stock_codes: &[String]) -> Result<Vec<SubscriptionAck>> {
        self.subscription("/api/v1/market/unsubscribe", stock_codes)
            .await
    }

    async fn subscription(&self, path: &str, stock_codes: &[String]) -> Result<Vec<SubscriptionAck>> {
        let request = CodesRequest { stock_codes };
        let reply = self.transport.post_json(path, &request).await?;
        if !reply.is_success() {
            return Err(reply.business_error("subscription request failed"));
        }
        let parsed: SubscriptionReply = reply.parse("subscription reply")?;
        Ok(parsed.results)
    }
}
