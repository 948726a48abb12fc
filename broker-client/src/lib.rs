//! Client core for the brokerage REST API: session lifecycle, order
//! management, market data requests and normalized account state, all
//! issued through a single HTTP transport adapter.

pub mod account;
pub mod client;
pub mod market;
pub mod normalize;
pub mod orders;
pub mod session;
pub mod transport;

pub use account::AccountClient;
pub use client::Brokerage;
pub use market::MarketClient;
pub use orders::OrderManager;
pub use session::SessionClient;
pub use transport::{Reply, Transport, REQUEST_TIMEOUT};
