pub mod error;
pub mod model;

pub use error::{BrokerError, Result};
pub use model::account::{AccountInfo, AccountSnapshot, BalanceView, PnlView, Position};
pub use model::environment::Environment;
pub use model::market::{Candle, Interval, IntradayTick, Quote, SubscriptionAck};
pub use model::order::{
    Order, OrderAck, OrderDraft, OrderFilter, OrderSide, OrderStatus, PlacedOrder, PriceType,
    Settlement, TimeInForce, LOT_SIZE,
};
pub use model::session::{Credentials, Session, SessionResult};
