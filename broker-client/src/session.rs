//! Session lifecycle: login, logout, status probe, certificate upload.
//!
//! The session client is the only writer of [`Session`] state. Which
//! backend execution path a login lands on (simulated vs. live) is
//! decided by the environment the client was constructed with, never by
//! the caller per request.

use std::sync::{Arc, RwLock};

use broker_api::{BrokerError, Credentials, Environment, Result, Session, SessionResult};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transport::Transport;

#[derive(Serialize)]
struct LoginRequest<'a> {
    #[serde(flatten)]
    credentials: &'a Credentials,
    /// True routes the session through the backend's mock execution path.
    use_mock: bool,
}

/// Shared wire shape of the login reply and the status probe.
#[derive(Deserialize)]
struct AuthReply {
    success: bool,
    #[serde(default)]
    is_logged_in: bool,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct UploadReply {
    success: bool,
    #[serde(default)]
    cert_path: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct SessionClient {
    transport: Arc<Transport>,
    environment: Environment,
    session: RwLock<Session>,
}

impl SessionClient {
    pub fn new(transport: Arc<Transport>, environment: Environment) -> Self {
        let session = RwLock::new(Session::logged_out(environment.id.clone()));
        Self {
            transport,
            environment,
            session,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Snapshot of the locally tracked session.
    pub fn session(&self) -> Session {
        self.session.read().unwrap().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.read().unwrap().logged_in
    }

    /// Authenticates against the active environment.
    ///
    /// The request is tagged with the environment's simulated-backend
    /// flag, so credentials and order semantics stay environment-scoped.
    /// Logging in while already logged in replaces the session: the
    /// backend drops the previous session before authenticating the new
    /// one. Never retries; the caller decides.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionResult> {
        if self.is_logged_in() {
            info!("login while logged in: replacing the current session");
        }

        let request = LoginRequest {
            credentials,
            use_mock: self.environment.uses_simulated_backend,
        };
        let reply = self
            .transport
            .post_json("/api/v1/auth/login", &request)
            .await?;

        if !reply.is_success() {
            self.store_logged_out(reply.body.clone());
            return Err(BrokerError::Auth {
                reason: reply
                    .error_text()
                    .unwrap_or_else(|| format!("login rejected (HTTP {})", reply.status)),
            });
        }

        let auth: AuthReply = reply.parse("login reply")?;
        if !auth.success {
            self.store_logged_out(reply.body.clone());
            return Err(BrokerError::Auth {
                reason: auth
                    .message
                    .unwrap_or_else(|| "login rejected".to_string()),
            });
        }

        let user_id = auth.user_id.or_else(|| Some(credentials.user_id.clone()));
        {
            let mut session = self.session.write().unwrap();
            session.logged_in = true;
            session.user_id = user_id.clone();
            session.environment_id = self.environment.id.clone();
            session.raw_status = reply.body.clone();
        }
        info!(
            "logged in as {} on {}",
            user_id.as_deref().unwrap_or("<unknown>"),
            self.environment.id
        );

        Ok(SessionResult {
            logged_in: true,
            user_id,
            environment_id: self.environment.id.clone(),
            message: auth.message,
        })
    }

    /// Uploads a certificate file and returns the server-side locator to
    /// pass as `cert_path` in a subsequent login. On failure any locator
    /// from a prior attempt must be discarded by the caller.
    pub async fn upload_certificate(&self, bytes: Vec<u8>, file_name: &str) -> Result<String> {
        let reply = self
            .transport
            .post_file("/api/v1/auth/upload-cert", "certificate", bytes, file_name)
            .await?;

        if !reply.is_success() {
            return Err(BrokerError::Upload {
                reason: reply
                    .error_text()
                    .unwrap_or_else(|| format!("upload rejected (HTTP {})", reply.status)),
            });
        }

        let upload: UploadReply = reply.parse("certificate upload reply")?;
        match upload.cert_path {
            Some(path) if upload.success && !path.is_empty() => {
                info!("certificate stored at {}", path);
                Ok(path)
            }
            _ => Err(BrokerError::Upload {
                reason: upload
                    .message
                    .unwrap_or_else(|| "upload reply carried no certificate path".to_string()),
            }),
        }
    }

    /// Ends the session. Idempotent: the local state always transitions
    /// to logged out, even when the backend call fails; a dead backend
    /// must not leave the client believing it is authenticated.
    pub async fn logout(&self) {
        let outcome = self.transport.post("/api/v1/auth/logout").await;
        self.store_logged_out(Value::Null);

        match outcome {
            Ok(reply) if reply.is_success() => info!("logged out of {}", self.environment.id),
            Ok(reply) => warn!(
                "backend logout failed: {}",
                reply
                    .error_text()
                    .unwrap_or_else(|| format!("HTTP {}", reply.status))
            ),
            Err(err) => warn!("backend logout failed: {err}"),
        }
    }

    /// Read-only status probe, used at startup to recover session state.
    /// The backend is authoritative; the local state is synchronized to
    /// whatever it reports.
    pub async fn check_status(&self) -> Result<SessionResult> {
        let reply = self.transport.get("/api/v1/auth/status").await?;
        if !reply.is_success() {
            return Err(BrokerError::Auth {
                reason: reply
                    .error_text()
                    .unwrap_or_else(|| format!("status probe rejected (HTTP {})", reply.status)),
            });
        }

        let status: AuthReply = reply.parse("status reply")?;
        {
            let mut session = self.session.write().unwrap();
            session.logged_in = status.is_logged_in;
            session.user_id = status.user_id.clone();
            session.raw_status = reply.body.clone();
        }

        Ok(SessionResult {
            logged_in: status.is_logged_in,
            user_id: status.user_id,
            environment_id: self.environment.id.clone(),
            message: status.message,
        })
    }

    fn store_logged_out(&self, raw: Value) {
        let mut session = self.session.write().unwrap();
        session.logged_in = false;
        session.user_id = None;
        session.raw_status = raw;
    }
}
