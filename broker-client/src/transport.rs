//! The single point of HTTP concerns.
//!
//! Every other component issues its requests through [`Transport`]: one
//! base endpoint, one fixed timeout, JSON bodies (multipart only for the
//! certificate upload). The transport never retries and never interprets
//! backend-specific error bodies; callers decide what a non-2xx reply
//! means for their operation.

use std::time::Duration;

use broker_api::{BrokerError, Result};
use log::debug;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Fixed request timeout. No call through the transport is left pending
/// beyond this bound.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A decoded HTTP reply: status code plus JSON body (`Null` for an empty
/// body).
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Backend-provided failure text, most specific first: `detail`
    /// (HTTP-level), then `error`, then `message`.
    pub fn error_text(&self) -> Option<String> {
        ["detail", "error", "message"]
            .into_iter()
            .find_map(|key| self.body.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Decodes a reply body into a typed value.
    pub fn parse<T: DeserializeOwned>(&self, context: &'static str) -> Result<T> {
        serde_json::from_value(self.body.clone()).map_err(|err| BrokerError::Decode {
            context,
            cause: err.to_string(),
        })
    }

    /// Turns a non-2xx reply into the structured backend error, falling
    /// back to `fallback` when the body carries no usable text.
    pub fn backend_error(&self, fallback: &str) -> BrokerError {
        BrokerError::Backend {
            code: self.status,
            message: self.error_text().unwrap_or_else(|| fallback.to_string()),
        }
    }

    /// Standard non-2xx mapping for business endpoints: 401 means the
    /// session is gone, everything else is a structured backend error.
    pub fn business_error(&self, fallback: &str) -> BrokerError {
        if self.status == 401 {
            BrokerError::Auth {
                reason: self
                    .error_text()
                    .unwrap_or_else(|| "not logged in".to_string()),
            }
        } else {
            self.backend_error(fallback)
        }
    }
}

/// Immutable HTTP adapter bound to one base endpoint.
///
/// Reconfiguration (an environment switch) constructs a new `Transport`
/// rather than mutating this one, so concurrent in-flight calls always
/// see a consistent endpoint.
#[derive(Debug)]
pub struct Transport {
    base_endpoint: String,
    http: reqwest::Client,
}

impl Transport {
    pub fn new(base_endpoint: impl Into<String>) -> Result<Self> {
        let base_endpoint = base_endpoint.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(from_reqwest)?;
        Ok(Self {
            base_endpoint,
            http,
        })
    }

    pub fn base_endpoint(&self) -> &str {
        &self.base_endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_endpoint, path)
    }

    pub async fn get(&self, path: &str) -> Result<Reply> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(from_reqwest)?;
        Self::read_reply(path, response).await
    }

    /// Body-less POST (logout and friends).
    pub async fn post(&self, path: &str) -> Result<Reply> {
        let response = self
            .http
            .post(self.url(path))
            .send()
            .await
            .map_err(from_reqwest)?;
        Self::read_reply(path, response).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Reply> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(from_reqwest)?;
        Self::read_reply(path, response).await
    }

    /// Multipart POST with a single file part named `field`.
    pub async fn post_file(
        &self,
        path: &str,
        field: &'static str,
        bytes: Vec<u8>,
        file_name: impl Into<String>,
    ) -> Result<Reply> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.into());
        let form = multipart::Form::new().part(field, part);
        let response = self
            .http
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .map_err(from_reqwest)?;
        Self::read_reply(path, response).await
    }

    async fn read_reply(path: &str, response: reqwest::Response) -> Result<Reply> {
        let status = response.status().as_u16();
        let text = response.text().await.map_err(from_reqwest)?;
        debug!("{} -> HTTP {} ({} bytes)", path, status, text.len());

        if text.trim().is_empty() {
            return Ok(Reply {
                status,
                body: Value::Null,
            });
        }

        match serde_json::from_str(&text) {
            Ok(body) => Ok(Reply { status, body }),
            // Non-2xx with an unreadable body stays a transport-level
            // failure; the caller has nothing to interpret.
            Err(err) if !(200..300).contains(&status) => {
                debug!("{}: unreadable error body: {}", path, err);
                Err(BrokerError::Transport {
                    status: Some(status),
                    cause: format!("HTTP {status} with non-JSON body"),
                })
            }
            Err(err) => Err(BrokerError::Decode {
                context: "response body",
                cause: err.to_string(),
            }),
        }
    }
}

fn from_reqwest(err: reqwest::Error) -> BrokerError {
    let cause = if err.is_timeout() {
        format!("request timed out after {}s", REQUEST_TIMEOUT.as_secs())
    } else {
        err.to_string()
    };
    BrokerError::Transport {
        status: err.status().map(|s| s.as_u16()),
        cause,
    }
}
