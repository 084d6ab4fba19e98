// Re-export core (always available)
pub use supa_core::*;

// Re-export storage crate (feature-gated)
#[cfg(feature = "storage")]
pub use supa_storage;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use supa::prelude::*;
/// ```
pub mod prelude {
    pub use supa_core::{Supa, SupaConfig, SupaError, SupaResult};

    #[cfg(feature = "storage")]
    pub use supa_storage::{
        Bucket, BucketOptions, File, SearchOptions, ServiceError, SortBy, SortOrder,
        StorageClient, StorageError, SupaStorageExt, UploadOptions,
    };
}
