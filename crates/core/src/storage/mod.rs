//! Remote blob storage for uploaded media.
//!
//! Two backends implement [`BlobStore`]:
//! - [`ImageKitStore`]: hosted image CDN with a multipart upload API
//! - [`ObjectStore`]: Apache OpenDAL over S3-compatible, Azure Blob or local filesystem
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        BlobStore                              │
//! │   upload(staged file, name, folder, tags) -> UploadedObject   │
//! ├──────────────────────────────┬───────────────────────────────┤
//! │ ImageKitStore                │ ObjectStore                   │
//! │ POST multipart (reqwest)     │ op.write("folder/name", data) │
//! └──────────────────────────────┴───────────────────────────────┘
//! ```

mod error;
mod imagekit;
mod object;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use snapfeed_shared::StorageSettings;

pub use error::StorageError;
pub use imagekit::ImageKitStore;
pub use object::{ObjectStore, unique_stored_name};

/// A staged file ready to be pushed to the blob store.
#[derive(Debug, Clone, Copy)]
pub struct BlobUpload<'a> {
    /// Local path of the staged copy.
    pub path: &'a Path,
    /// Filename as declared by the client.
    pub file_name: &'a str,
    /// Declared MIME type.
    pub content_type: &'a str,
    /// Destination folder.
    pub folder: &'a str,
    /// Classification tags.
    pub tags: &'a [String],
}

/// What the blob store reports back after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    /// Remote identifier. May be empty if the provider misbehaves.
    pub remote_id: String,
    /// Public URL of the object.
    pub url: String,
    /// Name assigned by the remote store.
    pub stored_name: String,
}

/// Remote object storage consumed by the upload pipeline.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload a staged file.
    async fn upload(&self, request: BlobUpload<'_>) -> Result<UploadedObject, StorageError>;

    /// Provider name, for logging.
    fn provider_name(&self) -> &'static str;
}

/// Build the configured blob store.
///
/// # Errors
///
/// Returns an error if the provider cannot be initialized.
pub fn from_settings(settings: &StorageSettings) -> Result<Arc<dyn BlobStore>, StorageError> {
    match settings {
        StorageSettings::Imagekit {
            private_key,
            upload_endpoint,
            timeout_secs,
        } => Ok(Arc::new(ImageKitStore::new(
            upload_endpoint,
            private_key,
            Duration::from_secs(*timeout_secs),
        )?)),
        other => Ok(Arc::new(ObjectStore::from_settings(other)?)),
    }
}
