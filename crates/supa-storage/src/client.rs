use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, trace};
use url::Url;

use crate::bucket::Bucket;
use crate::error::{ServiceError, StorageError};
use crate::types::*;

/// HTTP client for the Supabase Storage API.
///
/// Holds one `reqwest::Client` for its whole lifetime, configured with the
/// `apikey` and `Authorization` headers. Every [`Bucket`] it hands out shares
/// that client; cloning a `StorageClient` is cheap and shares the pool.
///
/// # Example
/// ```ignore
/// use supa_storage::{BucketOptions, StorageClient};
///
/// let storage = StorageClient::new("https://your-project.supabase.co/storage/v1", "your-anon-key")?;
/// let bucket = storage.create_bucket("avatars", BucketOptions::new().public(true)).await?;
/// let files = bucket.list(None, Default::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: Url,
}

impl StorageClient {
    /// Create a new storage client using the key as bearer token.
    ///
    /// `storage_url` is the storage service root
    /// (e.g., `https://your-project.supabase.co/storage/v1`).
    pub fn new(storage_url: &str, api_key: &str) -> Result<Self, StorageError> {
        Self::with_access_token(storage_url, api_key, api_key)
    }

    /// Create a storage client that authorizes as a specific user.
    pub fn with_access_token(
        storage_url: &str,
        api_key: &str,
        access_token: &str,
    ) -> Result<Self, StorageError> {
        let base_url = Url::parse(storage_url.trim_end_matches('/'))?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            "apikey",
            HeaderValue::from_str(api_key)
                .map_err(|e| StorageError::InvalidConfig(format!("Invalid API key header: {}", e)))?,
        );
        default_headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", access_token))
                .map_err(|e| StorageError::InvalidConfig(format!("Invalid auth header: {}", e)))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(StorageError::Http)?;

        Ok(Self { http, base_url })
    }

    /// Get the base URL for the storage API.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ─── Bucket Operations ───────────────────────────────────────

    /// List all buckets.
    pub async fn list_buckets(&self) -> Result<Vec<Bucket>, StorageError> {
        debug!("Listing buckets");
        let resp = self.http.get(self.url("/bucket")).send().await?;
        let records: Vec<BucketRecord> = self.handle_response(resp).await?;
        Ok(records
            .into_iter()
            .map(|record| Bucket::from_record(record, self.clone()))
            .collect())
    }

    /// Get a bucket by ID.
    pub async fn get_bucket(&self, id: &str) -> Result<Bucket, StorageError> {
        debug!(bucket = id, "Fetching bucket");
        let resp = self
            .http
            .get(self.url(&format!("/bucket/{}", id)))
            .send()
            .await?;
        let record: BucketRecord = self.handle_response(resp).await?;
        Ok(Bucket::from_record(record, self.clone()))
    }

    /// Create a new bucket.
    ///
    /// The service only acknowledges creation, so the returned handle is
    /// built locally: `owner` is unset and both timestamps are the local time
    /// of the call, not the service's.
    pub async fn create_bucket(
        &self,
        id: &str,
        options: BucketOptions,
    ) -> Result<Bucket, StorageError> {
        let name = options.name.as_deref().unwrap_or(id);
        debug!(bucket = id, bucket_name = name, public = options.public, "Creating bucket");
        let body = BucketBody {
            id,
            name,
            public: options.public,
        };

        let resp = self.http.post(self.url("/bucket")).json(&body).send().await?;
        Self::check(resp).await?;

        Ok(Bucket::created(id, name, options.public, self.clone()))
    }

    /// Update a bucket's name or visibility.
    pub async fn update_bucket(
        &self,
        id: &str,
        options: BucketOptions,
    ) -> Result<Value, StorageError> {
        let name = options.name.as_deref().unwrap_or(id);
        debug!(bucket = id, public = options.public, "Updating bucket");
        let body = BucketBody {
            id,
            name,
            public: options.public,
        };

        let resp = self
            .http
            .put(self.url(&format!("/bucket/{}", id)))
            .json(&body)
            .send()
            .await?;
        self.handle_value_response(resp).await
    }

    /// Empty a bucket (remove all files).
    pub async fn empty_bucket(&self, id: &str) -> Result<Value, StorageError> {
        debug!(bucket = id, "Emptying bucket");
        let resp = self
            .http
            .post(self.url(&format!("/bucket/{}/empty", id)))
            .json(&json!({}))
            .send()
            .await?;
        self.handle_value_response(resp).await
    }

    /// Delete a bucket. The service rejects this unless the bucket is empty.
    pub async fn delete_bucket(&self, id: &str) -> Result<Value, StorageError> {
        debug!(bucket = id, "Deleting bucket");
        let resp = self
            .http
            .delete(self.url(&format!("/bucket/{}", id)))
            .send()
            .await?;
        self.handle_value_response(resp).await
    }

    // ─── Internal Helpers ────────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let current = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}{}", current, path));
        url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Turn any non-2xx response into [`StorageError::Api`].
    pub(crate) async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let bytes = resp.bytes().await?;
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        trace!(status = status.as_u16(), body = %body, "Storage API returned an error");
        Err(StorageError::Api(ServiceError {
            status: status.as_u16(),
            body,
        }))
    }

    pub(crate) async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, StorageError> {
        let bytes = Self::check(resp).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Like `handle_response`, but an empty body decodes to `Value::Null`.
    pub(crate) async fn handle_value_response(
        &self,
        resp: reqwest::Response,
    ) -> Result<Value, StorageError> {
        let bytes = Self::check(resp).await?.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub(crate) async fn handle_bytes_response(
        &self,
        resp: reqwest::Response,
    ) -> Result<Vec<u8>, StorageError> {
        let bytes = Self::check(resp).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORAGE_URL: &str = "https://example.supabase.co/storage/v1";

    #[test]
    fn client_new_ok() {
        let client = StorageClient::new(STORAGE_URL, "test-key");
        assert!(client.is_ok());
    }

    #[test]
    fn client_rejects_bad_url() {
        let err = StorageClient::new("not a url", "test-key").unwrap_err();
        assert!(matches!(err, StorageError::UrlParse(_)));
    }

    #[test]
    fn client_rejects_bad_header_value() {
        let err = StorageClient::new(STORAGE_URL, "bad\nkey").unwrap_err();
        assert!(matches!(err, StorageError::InvalidConfig(_)));
    }

    #[test]
    fn client_base_url_trailing_slash() {
        let client = StorageClient::new("https://example.supabase.co/storage/v1/", "test-key").unwrap();
        assert_eq!(client.base_url().path(), "/storage/v1");
    }

    #[test]
    fn url_building() {
        let client = StorageClient::new(STORAGE_URL, "test-key").unwrap();

        let url = client.url("/bucket");
        assert_eq!(url.path(), "/storage/v1/bucket");
        assert!(url.query().is_none());

        let url = client.url("/object/list/avatars");
        assert_eq!(url.path(), "/storage/v1/object/list/avatars");
    }

    #[test]
    fn url_building_at_host_root() {
        let client = StorageClient::new("http://127.0.0.1:5000", "test-key").unwrap();
        assert_eq!(client.url("/bucket").as_str(), "http://127.0.0.1:5000/bucket");
    }
}
