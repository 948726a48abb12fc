//! Session state and credentials.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The credential bundle supplied to login. Transient: the client never
/// persists it beyond the login call itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    pub cert_password: String,
    /// Server-side certificate path, or the locator returned by a
    /// certificate upload.
    pub cert_path: String,
}

impl Credentials {
    pub fn new(
        user_id: impl Into<String>,
        password: impl Into<String>,
        cert_password: impl Into<String>,
        cert_path: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
            person_id: None,
            cert_password: cert_password.into(),
            cert_path: cert_path.into(),
        }
    }

    pub fn with_person_id(mut self, person_id: impl Into<String>) -> Self {
        self.person_id = Some(person_id.into());
        self
    }
}

/// Locally tracked session state. Owned exclusively by the session
/// client; everything else reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub logged_in: bool,
    pub user_id: Option<String>,
    pub environment_id: String,
    /// Last raw status payload, kept for diagnostics.
    pub raw_status: Value,
}

impl Session {
    pub fn logged_out(environment_id: impl Into<String>) -> Self {
        Self {
            logged_in: false,
            user_id: None,
            environment_id: environment_id.into(),
            raw_status: Value::Null,
        }
    }
}

/// Outcome of a login or status probe, as the caller sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub logged_in: bool,
    pub user_id: Option<String>,
    pub environment_id: String,
    #[serde(default)]
    pub message: Option<String>,
}
