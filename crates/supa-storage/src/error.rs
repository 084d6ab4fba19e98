use std::fmt;

use serde_json::Value;
use supa_core::SupaError;

/// A non-2xx response from the Storage API.
///
/// `body` is the service's error payload exactly as decoded. Storage reports
/// details such as `{"statusCode":"404","error":"Bucket not found","message":"..."}`;
/// a body that is not JSON is kept as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceError {
    pub status: u16,
    pub body: Value,
}

impl ServiceError {
    /// Extract the most informative error message from the body.
    pub fn message(&self) -> String {
        let field = |name: &str| self.body.get(name).and_then(Value::as_str);
        field("message")
            .or_else(|| field("error"))
            .or_else(|| self.body.as_str().filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", self.status))
    }

    /// The `statusCode` the service put in the body. Storage sometimes
    /// answers 400 at the HTTP level while reporting 404/409 here.
    pub fn body_status_code(&self) -> Option<u16> {
        match self.body.get("statusCode")? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            _ => None,
        }
    }

    fn reports(&self, code: u16) -> bool {
        self.status == code || self.body_status_code() == Some(code)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}): {}", self.status, self.message())
    }
}

/// Storage-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// HTTP transport error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage API returned a non-2xx response.
    #[error("Storage API error {0}")]
    Api(ServiceError),

    /// Response body did not match the expected shape.
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid configuration (bad URL or header value).
    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl StorageError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            StorageError::Api(err) => Some(err.status),
            StorageError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The service error, if this is one.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            StorageError::Api(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.service_error().is_some_and(|e| e.reports(404))
    }

    pub fn is_conflict(&self) -> bool {
        self.service_error().is_some_and(|e| e.reports(409))
    }
}

/// Keeps the display text only; the `ServiceError` body stays on `StorageError`.
impl From<StorageError> for SupaError {
    fn from(err: StorageError) -> Self {
        SupaError::Storage(err.to_string())
    }
}
