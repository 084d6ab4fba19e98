/// All errors surfaced through the supa facade.
#[derive(Debug, thiserror::Error)]
pub enum SupaError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Display text of a storage error. Only the message survives the
    /// conversion: match on `StorageError` (e.g. its `service_error()`)
    /// before `?` when the service's error body is needed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SupaError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result alias using SupaError.
pub type SupaResult<T> = Result<T, SupaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            SupaError::config("missing key").to_string(),
            "Configuration error: missing key"
        );
        assert_eq!(
            SupaError::Storage("boom".into()).to_string(),
            "Storage error: boom"
        );
    }
}
