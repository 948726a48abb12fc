//! Order lifecycle: place, cancel, modify, query.
//!
//! The manager keeps one locally held view of today's orders, refreshed
//! with whole-list replace semantics: the backend's list supersedes
//! whatever was held before, never merged into it. That keeps the local
//! view free of reconciliation artifacts from partial or out-of-order
//! updates. Refreshes are pull-based only; placing an order does not
//! trigger one.

use std::sync::{Arc, RwLock};

use broker_api::{
    BrokerError, Order, OrderAck, OrderDraft, OrderFilter, PlacedOrder, Result, LOT_SIZE,
};
use log::info;
use serde::{Deserialize, Serialize};

use crate::transport::Transport;

#[derive(Serialize)]
struct CancelRequest<'a> {
    order_id: &'a str,
}

#[derive(Serialize)]
struct ModifyRequest<'a> {
    order_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<u32>,
}

#[derive(Deserialize)]
struct OrderListReply {
    #[allow(dead_code)]
    success: bool,
    #[serde(default)]
    orders: Vec<Order>,
}

#[derive(Deserialize)]
struct OrderDetailReply {
    #[allow(dead_code)]
    success: bool,
    order: Order,
}

pub struct OrderManager {
    transport: Arc<Transport>,
    today: RwLock<Vec<Order>>,
}

impl OrderManager {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self {
            transport,
            today: RwLock::new(Vec::new()),
        }
    }

    /// The locally held today's-orders view, as of the last refresh.
    pub fn today_orders(&self) -> Vec<Order> {
        self.today.read().unwrap().clone()
    }

    /// Validates the draft locally (fail fast, no network on a malformed
    /// draft), then submits it. The backend assigns the order id and the
    /// order enters `Pending`. The today view is not refreshed here;
    /// callers pull [`Self::query_today_orders`] when they want it.
    pub async fn place_order(&self, draft: &OrderDraft) -> Result<PlacedOrder> {
        draft.validate()?;

        let reply = self.transport.post_json("/api/v1/order/place", draft).await?;
        if !reply.is_success() {
            return Err(reply.business_error("order rejected"));
        }

        let placed: PlacedOrder = reply.parse("place-order reply")?;
        info!(
            "order {} accepted: {:?} {} x{}",
            placed.order_id, placed.action, placed.stock_code, placed.quantity
        );
        Ok(placed)
    }

    /// Requests cancellation. The call is issued regardless of the
    /// locally cached status; the backend stays authoritative and may
    /// reject a cancel on an already-filled order; that rejection comes
    /// back as an error, never as forced local success.
    pub async fn cancel_order(&self, order_id: &str) -> Result<OrderAck> {
        let request = CancelRequest { order_id };
        let reply = self
            .transport
            .post_json("/api/v1/order/cancel", &request)
            .await?;
        if !reply.is_success() {
            return Err(reply.business_error("cancel rejected"));
        }
        reply.parse("cancel reply")
    }

    /// Amends price and/or quantity of a working order. At least one of
    /// the two must be supplied; a new quantity must keep the lot-size
    /// invariant.
    pub async fn modify_order(
        &self,
        order_id: &str,
        new_price: Option<f64>,
        new_quantity: Option<u32>,
    ) -> Result<OrderAck> {
        if new_price.is_none() && new_quantity.is_none() {
            return Err(BrokerError::validation(
                "order",
                "modify requires a new price or a new quantity",
            ));
        }
        if let Some(price) = new_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(BrokerError::validation(
                    "price",
                    format!("{price} is not a positive price"),
                ));
            }
        }
        if let Some(quantity) = new_quantity {
            if quantity == 0 || quantity % LOT_SIZE != 0 {
                return Err(BrokerError::validation(
                    "quantity",
                    format!(
                        "{} is not a positive multiple of the {} share lot",
                        quantity, LOT_SIZE
                    ),
                ));
            }
        }

        let request = ModifyRequest {
            order_id,
            price: new_price,
            quantity: new_quantity,
        };
        let reply = self
            .transport
            .post_json("/api/v1/order/modify", &request)
            .await?;
        if !reply.is_success() {
            return Err(reply.business_error("modify rejected"));
        }
        reply.parse("modify reply")
    }

    /// Refreshes today's orders with whole-list replace semantics and
    /// returns the new list.
    pub async fn query_today_orders(&self) -> Result<Vec<Order>> {
        let reply = self.transport.get("/api/v1/order/today").await?;
        if !reply.is_success() {
            return Err(reply.business_error("today-orders query failed"));
        }

        let list: OrderListReply = reply.parse("today-orders reply")?;
        {
            let mut today = self.today.write().unwrap();
            *today = list.orders.clone();
        }
        Ok(list.orders)
    }

    /// Filtered order query. Leaves the local today view untouched.
    pub async fn query_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let reply = self
            .transport
            .post_json("/api/v1/order/query", filter)
            .await?;
        if !reply.is_success() {
            return Err(reply.business_error("order query failed"));
        }
        let list: OrderListReply = reply.parse("order-query reply")?;
        Ok(list.orders)
    }

    /// Single-order lookup by id.
    pub async fn order_detail(&self, order_id: &str) -> Result<Order> {
        let reply = self
            .transport
            .get(&format!("/api/v1/order/detail/{order_id}"))
            .await?;
        if !reply.is_success() {
            return Err(reply.business_error("order not found"));
        }
        let detail: OrderDetailReply = reply.parse("order-detail reply")?;
        Ok(detail.order)
    }
}
