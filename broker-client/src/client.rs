//! The top-level client facade.
//!
//! One `Brokerage` is bound to one environment and one transport for its
//! whole lifetime. Changing environments produces a new instance instead
//! of mutating shared state, so nothing ever observes a half-switched
//! client.

use std::sync::Arc;

use broker_api::{Environment, Result};
use log::info;
use serde_json::Value;

use crate::account::AccountClient;
use crate::market::MarketClient;
use crate::orders::OrderManager;
use crate::session::SessionClient;
use crate::transport::Transport;

pub struct Brokerage {
    environment: Environment,
    transport: Arc<Transport>,
    session: SessionClient,
    orders: OrderManager,
    market: MarketClient,
    account: AccountClient,
}

impl Brokerage {
    /// Builds a client for a registered environment id.
    pub fn connect(env_id: &str) -> Result<Self> {
        Self::with_environment(Environment::resolve(env_id)?)
    }

    /// Builds a client from an explicit environment value. Used by
    /// deployments (and tests) whose endpoint differs from the registry
    /// default.
    pub fn with_environment(environment: Environment) -> Result<Self> {
        let transport = Arc::new(Transport::new(environment.base_endpoint.clone())?);
        info!(
            "client configured for {} at {}",
            environment.id, environment.base_endpoint
        );
        Ok(Self {
            session: SessionClient::new(Arc::clone(&transport), environment.clone()),
            orders: OrderManager::new(Arc::clone(&transport)),
            market: MarketClient::new(Arc::clone(&transport)),
            account: AccountClient::new(Arc::clone(&transport)),
            transport,
            environment,
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    pub fn orders(&self) -> &OrderManager {
        &self.orders
    }

    pub fn market(&self) -> &MarketClient {
        &self.market
    }

    pub fn account(&self) -> &AccountClient {
        &self.account
    }

    /// Backend liveness probe; returns the reported status string.
    pub async fn health(&self) -> Result<String> {
        let reply = self.transport.get("/health").await?;
        if !reply.is_success() {
            return Err(reply.backend_error("health probe failed"));
        }
        Ok(reply
            .body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("ok")
            .to_string())
    }

    /// Switches environments. Destructive by policy: credentials and
    /// order semantics are environment-scoped, so an active session is
    /// logged out before the new environment becomes active. Yields a
    /// fresh client with its own transport; this one stays logged out.
    pub async fn switch_environment(&self, env_id: &str) -> Result<Brokerage> {
        let environment = Environment::resolve(env_id)?;
        if self.session.is_logged_in() {
            info!(
                "environment switch {} -> {}: forcing logout",
                self.environment.id, environment.id
            );
            self.session.logout().await;
        }
        Self::with_environment(environment)
    }
}
