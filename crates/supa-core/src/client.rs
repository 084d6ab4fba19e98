use std::sync::Arc;

use crate::config::SupaConfig;
use crate::error::SupaResult;

/// Entry point for a Supabase project.
///
/// Holds the validated project configuration. Service clients (storage) are
/// created from it through extension traits provided by the service crates.
#[derive(Debug, Clone)]
pub struct Supa {
    config: Arc<SupaConfig>,
}

impl Supa {
    /// Create a new client from a configuration.
    pub fn new(config: SupaConfig) -> SupaResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Create a client from `SUPABASE_URL` / `SUPABASE_KEY`.
    pub fn from_env() -> SupaResult<Self> {
        Self::new(SupaConfig::from_env()?)
    }

    /// Get the full config.
    pub fn config(&self) -> &SupaConfig {
        &self.config
    }

    /// The project URL.
    pub fn supabase_url(&self) -> &str {
        &self.config.supabase_url
    }

    /// The anon or service_role key.
    pub fn api_key(&self) -> &str {
        &self.config.supabase_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates_config() {
        assert!(Supa::new(SupaConfig::new("https://example.supabase.co", "key")).is_ok());
        assert!(Supa::new(SupaConfig::new("::nope::", "key")).is_err());
    }

    #[test]
    fn accessors() {
        let supa = Supa::new(SupaConfig::new("https://example.supabase.co", "key")).unwrap();
        assert_eq!(supa.supabase_url(), "https://example.supabase.co");
        assert_eq!(supa.api_key(), "key");
        assert_eq!(supa.config().storage_url(), "https://example.supabase.co/storage/v1");
    }
}
