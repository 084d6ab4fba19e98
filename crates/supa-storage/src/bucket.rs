use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde_json::{json, Value};
use tracing::debug;

use crate::client::StorageClient;
use crate::error::StorageError;
use crate::types::*;

/// A storage bucket and the object operations scoped to it.
///
/// Object paths are addressed by the bucket's `name`; emptying and deleting
/// the bucket itself are addressed by its `id`.
///
/// # Example
/// ```ignore
/// let bucket = storage.get_bucket("avatars").await?;
/// bucket.upload("folder/cat.png", data, UploadOptions::new().mime_type("image/png")).await?;
/// let bytes = bucket.download("folder/cat.png").await?;
/// ```
#[derive(Debug, Clone)]
pub struct Bucket {
    pub id: String,
    pub name: String,
    /// Unset on handles returned by [`StorageClient::create_bucket`].
    pub owner: Option<String>,
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    client: StorageClient,
}

impl Bucket {
    /// Build a handle from bucket metadata returned by the service.
    pub fn from_record(record: BucketRecord, client: StorageClient) -> Self {
        Self {
            id: record.id,
            name: record.name,
            owner: record.owner,
            public: record.public,
            created_at: record.created_at,
            updated_at: record.updated_at,
            client,
        }
    }

    /// Handle for a bucket this client just created. The timestamps are the
    /// local clock, not the service's.
    pub(crate) fn created(id: &str, name: &str, public: bool, client: StorageClient) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            name: name.to_string(),
            owner: None,
            public,
            created_at: now,
            updated_at: now,
            client,
        }
    }

    /// The client this handle sends requests through.
    pub fn client(&self) -> &StorageClient {
        &self.client
    }

    /// Public URL for an object. Only builds the string: nothing checks that
    /// the bucket is public or that the object exists.
    pub fn get_public_url(&self, path: &str) -> String {
        let base = self.client.base_url().as_str().trim_end_matches('/');
        format!("{}/object/public/{}", base, path)
    }

    /// Create a signed URL for time-limited access to a file.
    ///
    /// `expires_in` is passed to the service unchecked; it rejects values it
    /// does not accept.
    pub async fn create_signed_url(
        &self,
        path: &str,
        expires_in: i64,
    ) -> Result<String, StorageError> {
        debug!(bucket = %self.name, path, expires_in, "Creating signed URL");
        let url = self
            .client
            .url(&format!("/object/sign/{}/{}", self.name, path));
        let body = json!({ "expiresIn": expires_in.to_string() });

        let resp = self.client.http().post(url).json(&body).send().await?;
        let result: SignedUrlResponse = self.client.handle_response(resp).await?;
        Ok(result.signed_url)
    }

    /// Delete this bucket. It must be emptied first.
    pub async fn delete(&self) -> Result<Value, StorageError> {
        self.client.delete_bucket(&self.id).await
    }

    /// Remove every object in this bucket.
    pub async fn empty(&self) -> Result<Value, StorageError> {
        self.client.empty_bucket(&self.id).await
    }

    /// Change this bucket's name or visibility on the service.
    ///
    /// The handle keeps its current fields; fetch the bucket again to see
    /// the result.
    pub async fn update(&self, options: BucketOptions) -> Result<Value, StorageError> {
        self.client.update_bucket(&self.id, options).await
    }

    /// Move a file within the bucket. Also renames, when only the file name
    /// of `to_path` differs.
    pub async fn move_file(&self, from_path: &str, to_path: &str) -> Result<Value, StorageError> {
        debug!(bucket = %self.name, from = from_path, to = to_path, "Moving object");
        self.transfer("/object/move", from_path, to_path).await
    }

    /// Copy a file within the bucket.
    pub async fn copy(&self, file_path: &str, target: &str) -> Result<Value, StorageError> {
        debug!(bucket = %self.name, from = file_path, to = target, "Copying object");
        self.transfer("/object/copy", file_path, target).await
    }

    async fn transfer(
        &self,
        endpoint: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<Value, StorageError> {
        let body = TransferBody {
            bucket_id: &self.id,
            source_key,
            destination_key,
        };
        let resp = self
            .client
            .http()
            .post(self.client.url(endpoint))
            .json(&body)
            .send()
            .await?;
        self.client.handle_value_response(resp).await
    }

    /// Remove a single file.
    pub async fn remove(&self, path: &str) -> Result<Value, StorageError> {
        debug!(bucket = %self.name, path, "Removing object");
        let url = self.client.url(&format!("/object/{}/{}", self.name, path));
        let resp = self.client.http().delete(url).send().await?;
        self.client.handle_value_response(resp).await
    }

    /// Remove several files at once.
    ///
    /// Returns the files the service actually removed, which can be fewer
    /// than requested when some paths did not exist.
    pub async fn bulk_remove(&self, paths: &[&str]) -> Result<Vec<File>, StorageError> {
        debug!(bucket = %self.name, count = paths.len(), "Removing objects");
        let url = self.client.url(&format!("/object/{}", self.name));
        let body = json!({ "prefixes": paths });

        let resp = self.client.http().delete(url).json(&body).send().await?;
        self.client.handle_response(resp).await
    }

    /// List files under `path` (the bucket root when `None`).
    pub async fn list(
        &self,
        path: Option<&str>,
        options: SearchOptions,
    ) -> Result<Vec<File>, StorageError> {
        let body = ListRequest::new(path, options);
        debug!(
            bucket = %self.name,
            prefix = %body.prefix,
            limit = body.limit,
            offset = body.offset,
            "Listing objects"
        );
        let url = self.client.url(&format!("/object/list/{}", self.name));

        let resp = self.client.http().post(url).json(&body).send().await?;
        self.client.handle_response(resp).await
    }

    /// Download a file. Returns the raw bytes.
    pub async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        debug!(bucket = %self.name, path, "Downloading object");
        let url = self
            .client
            .url(&format!("/object/authenticated/{}/{}", self.name, path));
        let resp = self.client.http().get(url).send().await?;
        self.client.handle_bytes_response(resp).await
    }

    /// Check whether a file exists.
    ///
    /// `true` on 2xx, `false` when the service answers 400 or 404.
    pub async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        debug!(bucket = %self.name, path, "Checking object");
        let url = self
            .client
            .url(&format!("/object/authenticated/{}/{}", self.name, path));
        let resp = self.client.http().head(url).send().await?;
        match StorageClient::check(resp).await {
            Ok(_) => Ok(true),
            Err(StorageError::Api(err)) if err.status == 400 || err.status == 404 => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Upload a file as multipart form data.
    ///
    /// `content` is anything reqwest can send as a body: bytes, a `String`,
    /// or a stream (`reqwest::Body::wrap_stream`) so large files need not be
    /// buffered. The part's file name is the last segment of `path`. With
    /// `upsert(true)` an existing object is replaced; otherwise the service
    /// rejects the upload if `path` is taken. Returns the service's response
    /// body as-is.
    pub async fn upload(
        &self,
        path: &str,
        content: impl Into<Body>,
        options: UploadOptions,
    ) -> Result<Value, StorageError> {
        let body = content.into();
        // Streams have no known length until sent.
        let size = body.as_bytes().map(|bytes| bytes.len() as u64);
        debug!(
            bucket = %self.name,
            path,
            size = ?size,
            mime_type = %options.mime_type,
            upsert = options.upsert,
            "Uploading object"
        );
        let url = self.client.url(&format!("/object/{}/{}", self.name, path));

        let file_name = path.rsplit('/').next().unwrap_or(path).to_string();
        let part = match size {
            Some(len) => Part::stream_with_length(body, len),
            None => Part::stream(body),
        };
        let part = part.file_name(file_name).mime_str(&options.mime_type)?;
        let cache_control = options.cache_control.to_string();
        let form = Form::new()
            .text("cacheControl", cache_control.clone())
            .part("file", part);

        let resp = self
            .client
            .http()
            .post(url)
            .header("cacheControl", cache_control)
            .header("contentType", options.mime_type.as_str())
            .header("upsert", if options.upsert { "true" } else { "false" })
            .multipart(form)
            .send()
            .await?;
        self.client.handle_value_response(resp).await
    }
}
