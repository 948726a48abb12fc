use thiserror::Error;

/// Global error type for brokerage client operations.
///
/// Every failure is scoped to the call that triggered it; no variant is
/// fatal to the process and none implies an automatic retry.
#[derive(Error, Debug)]
pub enum BrokerError {
    /// Rejected locally before any network call was made.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Network failure, timeout, or a non-2xx reply without a readable body.
    #[error("transport error: {cause}")]
    Transport { status: Option<u16>, cause: String },

    /// Login or session rejected by the backend.
    #[error("authentication failed: {reason}")]
    Auth { reason: String },

    /// Certificate upload rejected by the backend.
    #[error("certificate upload failed: {reason}")]
    Upload { reason: String },

    /// The backend returned a structured error body for a business
    /// operation (order rejected, cancel on a filled order, ...).
    #[error("backend error ({code}): {message}")]
    Backend { code: u16, message: String },

    /// Environment id not present in the static registry.
    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    /// A 2xx reply whose body did not match the expected shape.
    #[error("unexpected {context} payload: {cause}")]
    Decode { context: &'static str, cause: String },
}

impl BrokerError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for brokerage operations.
pub type Result<T> = std::result::Result<T, BrokerError>;
