//! Supabase Storage HTTP client.
//!
//! This crate provides an HTTP client for the Supabase Storage API.
//! It communicates with Storage REST endpoints at `/storage/v1/...`.
//!
//! # Usage
//!
//! ```ignore
//! use supa::prelude::*;
//!
//! let supa = Supa::new(SupaConfig::new(url, key))?;
//! let storage = supa.storage()?;
//!
//! // Bucket operations
//! let buckets = storage.list_buckets().await?;
//! let photos = storage.create_bucket("photos", BucketOptions::new().public(true)).await?;
//!
//! // File operations
//! photos.upload("cat.png", data, UploadOptions::new().mime_type("image/png")).await?;
//! let bytes = photos.download("cat.png").await?;
//! ```

pub mod bucket;
pub mod client;
pub mod error;
pub mod types;

// Re-exports for convenient access
pub use bucket::Bucket;
pub use client::StorageClient;
pub use error::{ServiceError, StorageError};
pub use types::*;

use supa_core::Supa;

/// Extension trait to create a [`StorageClient`] from a [`Supa`] client.
///
/// # Example
/// ```ignore
/// use supa_storage::SupaStorageExt;
///
/// let supa = Supa::from_env()?;
/// let storage = supa.storage()?;
/// let buckets = storage.list_buckets().await?;
/// ```
pub trait SupaStorageExt {
    /// Create a [`StorageClient`] for the project's `/storage/v1` endpoint,
    /// authorized with the configured key and bearer token.
    fn storage(&self) -> Result<StorageClient, StorageError>;
}

impl SupaStorageExt for Supa {
    fn storage(&self) -> Result<StorageClient, StorageError> {
        let config = self.config();
        StorageClient::with_access_token(
            &config.storage_url(),
            &config.supabase_key,
            config.bearer_token(),
        )
    }
}
