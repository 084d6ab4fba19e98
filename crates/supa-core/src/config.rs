use crate::error::{SupaError, SupaResult};

/// Environment variable holding the project URL.
pub const ENV_URL: &str = "SUPABASE_URL";
/// Environment variable holding the anon or service_role key.
pub const ENV_KEY: &str = "SUPABASE_KEY";
/// Optional environment variable holding a user access token.
pub const ENV_ACCESS_TOKEN: &str = "SUPABASE_ACCESS_TOKEN";

/// Configuration for connecting to a Supabase project.
#[derive(Debug, Clone)]
pub struct SupaConfig {
    /// Project URL (e.g. "https://your-project.supabase.co")
    pub supabase_url: String,
    /// Supabase anon or service_role key, sent as the `apikey` header
    pub supabase_key: String,
    /// Bearer token for the `Authorization` header. Defaults to the key.
    pub access_token: Option<String>,
}

impl SupaConfig {
    /// Create a new config from a project URL and key.
    pub fn new(supabase_url: impl Into<String>, supabase_key: impl Into<String>) -> Self {
        Self {
            supabase_url: supabase_url.into(),
            supabase_key: supabase_key.into(),
            access_token: None,
        }
    }

    /// Build a config from `SUPABASE_URL`, `SUPABASE_KEY` and the optional
    /// `SUPABASE_ACCESS_TOKEN`.
    pub fn from_env() -> SupaResult<Self> {
        let url = std::env::var(ENV_URL)
            .map_err(|_| SupaError::config(format!("{} is not set", ENV_URL)))?;
        let key = std::env::var(ENV_KEY)
            .map_err(|_| SupaError::config(format!("{} is not set", ENV_KEY)))?;

        let mut config = Self::new(url, key);
        if let Ok(token) = std::env::var(ENV_ACCESS_TOKEN) {
            config = config.access_token(token);
        }
        tracing::debug!(url = %config.supabase_url, "Loaded Supabase config from environment");
        Ok(config)
    }

    /// Use a user access token instead of the key as the bearer token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// The bearer token sent with every request.
    pub fn bearer_token(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.supabase_key)
    }

    fn base(&self) -> &str {
        self.supabase_url.trim_end_matches('/')
    }

    /// PostgREST endpoint.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base())
    }

    /// GoTrue endpoint.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.base())
    }

    /// Storage endpoint.
    pub fn storage_url(&self) -> String {
        format!("{}/storage/v1", self.base())
    }

    /// Realtime endpoint, on the websocket scheme matching the project URL.
    pub fn realtime_url(&self) -> String {
        let base = self.base();
        let ws = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!("{}/realtime/v1", ws)
    }

    /// Check that the project URL parses and the key is non-empty.
    pub fn validate(&self) -> SupaResult<()> {
        url::Url::parse(&self.supabase_url)
            .map_err(|e| SupaError::config(format!("Invalid supabase_url: {}", e)))?;
        if self.supabase_key.is_empty() {
            return Err(SupaError::config("supabase_key must not be empty"));
        }
        Ok(())
    }
}
