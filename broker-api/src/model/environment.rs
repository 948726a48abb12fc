//! Deployment environments.
//!
//! The backend exposes the same REST contract for a simulated and a live
//! execution path; which one applies is decided purely client-side by the
//! environment a session was opened against.

use serde::{Deserialize, Serialize};

use crate::error::{BrokerError, Result};

/// A named deployment target with its own endpoint and credential semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Registry key, e.g. "simulation".
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Base URL all request paths are resolved against.
    pub base_endpoint: String,
    /// When true, login requests are tagged so the backend routes the
    /// session through its mock execution path instead of the live SDK.
    pub uses_simulated_backend: bool,
}

impl Environment {
    /// Looks up an environment in the static registry.
    ///
    /// Pure: no side effects, no I/O.
    pub fn resolve(env_id: &str) -> Result<Self> {
        match env_id {
            "simulation" => Ok(Self {
                id: "simulation".to_string(),
                display_name: "Simulated trading".to_string(),
                base_endpoint: "http://localhost:8000".to_string(),
                uses_simulated_backend: true,
            }),
            "production" => Ok(Self {
                id: "production".to_string(),
                display_name: "Live trading".to_string(),
                base_endpoint: "http://localhost:8000".to_string(),
                uses_simulated_backend: false,
            }),
            other => Err(BrokerError::UnknownEnvironment(other.to_string())),
        }
    }

    /// All registered environment ids.
    pub fn known_ids() -> &'static [&'static str] {
        &["simulation", "production"]
    }

    /// Overrides the base endpoint, keeping the environment semantics.
    pub fn with_base_endpoint(mut self, base_endpoint: impl Into<String>) -> Self {
        self.base_endpoint = base_endpoint.into();
        self
    }
}
