//! Object storage backend using Apache OpenDAL.

use std::path::Path;

use async_trait::async_trait;
use opendal::{Operator, services};
use snapfeed_shared::StorageSettings;
use uuid::Uuid;

use super::{BlobStore, BlobUpload, StorageError, UploadedObject};

/// Blob store over an OpenDAL operator.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    operator: Operator,
    provider: &'static str,
    public_base_url: String,
}

impl ObjectStore {
    /// Create an object store from storage settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized, or if the
    /// settings describe a non-OpenDAL provider.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        match settings {
            StorageSettings::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
                public_base_url,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                let operator = Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish();
                Ok(Self::new(operator, "s3", public_base_url))
            }
            StorageSettings::AzureBlob {
                account,
                access_key,
                container,
                public_base_url,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                let operator = Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish();
                Ok(Self::new(operator, "azure_blob", public_base_url))
            }
            StorageSettings::LocalFs {
                root,
                public_base_url,
            } => Self::local_fs(root, public_base_url),
            StorageSettings::Imagekit { .. } => Err(StorageError::configuration(
                "imagekit is not an object storage provider",
            )),
        }
    }

    /// Create a local filesystem store (development only).
    ///
    /// # Errors
    ///
    /// Returns an error if the root path is not valid UTF-8 or the operator
    /// cannot be built.
    pub fn local_fs(root: &Path, public_base_url: &str) -> Result<Self, StorageError> {
        let builder = services::Fs::default().root(
            root.to_str()
                .ok_or_else(|| StorageError::configuration("invalid path"))?,
        );

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();
        Ok(Self::new(operator, "local", public_base_url))
    }

    fn new(operator: Operator, provider: &'static str, public_base_url: &str) -> Self {
        Self {
            operator,
            provider,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Object key for a stored name inside a folder.
    ///
    /// Format: `{folder}/{stored_name}`, with the folder's surrounding slashes removed.
    #[must_use]
    pub fn object_key(folder: &str, stored_name: &str) -> String {
        let folder = folder.trim_matches('/');
        if folder.is_empty() {
            stored_name.to_string()
        } else {
            format!("{folder}/{stored_name}")
        }
    }

    /// Public URL for an object key.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[async_trait]
impl BlobStore for ObjectStore {
    async fn upload(&self, request: BlobUpload<'_>) -> Result<UploadedObject, StorageError> {
        let stored_name = unique_stored_name(request.file_name);
        let key = Self::object_key(request.folder, &stored_name);
        let data = tokio::fs::read(request.path).await?;

        if self
            .operator
            .info()
            .full_capability()
            .write_with_content_type
        {
            self.operator
                .write_with(&key, data)
                .content_type(request.content_type)
                .await?;
        } else {
            self.operator.write(&key, data).await?;
        }

        Ok(UploadedObject {
            url: self.public_url(&key),
            remote_id: key,
            stored_name,
        })
    }

    fn provider_name(&self) -> &'static str {
        self.provider
    }
}

/// Name under which an upload is stored: sanitized stem, a short random
/// suffix, then the original extension.
#[must_use]
pub fn unique_stored_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(sanitize_filename)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "upload".to_string());
    let suffix = &Uuid::new_v4().simple().to_string()[..8];

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{suffix}.{}", sanitize_filename(ext)),
        None => format!("{stem}_{suffix}"),
    }
}

/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("holiday.jpg"), "holiday.jpg");
        assert_eq!(sanitize_filename("my clip (1).mp4"), "my_clip__1_.mp4");
        assert_eq!(sanitize_filename("日本語"), "___");
    }

    #[test]
    fn test_unique_stored_name_keeps_extension() {
        let name = unique_stored_name("beach day.jpeg");
        assert!(name.starts_with("beach_day_"));
        assert!(name.ends_with(".jpeg"));
        assert_ne!(name, unique_stored_name("beach day.jpeg"));
    }

    #[test]
    fn test_unique_stored_name_without_stem() {
        let name = unique_stored_name("");
        assert!(name.starts_with("upload_"));
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_object_key() {
        assert_eq!(
            ObjectStore::object_key("/backend-upload", "a.png"),
            "backend-upload/a.png"
        );
        assert_eq!(ObjectStore::object_key("/", "a.png"), "a.png");
        assert_eq!(ObjectStore::object_key("", "a.png"), "a.png");
    }

    #[test]
    fn test_imagekit_settings_rejected() {
        let settings = StorageSettings::Imagekit {
            private_key: "k".to_string(),
            upload_endpoint: "https://example.com".to_string(),
            timeout_secs: 1,
        };
        assert!(matches!(
            ObjectStore::from_settings(&settings),
            Err(StorageError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_local_fs_upload_roundtrip() {
        let root = tempfile::tempdir().unwrap();
        let store = ObjectStore::local_fs(root.path(), "http://localhost:8000/media/").unwrap();

        let mut staged = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
        std::io::Write::write_all(&mut staged, b"fake video").unwrap();

        let object = store
            .upload(BlobUpload {
                path: staged.path(),
                file_name: "clip.mp4",
                content_type: "video/mp4",
                folder: "/backend-upload",
                tags: &[],
            })
            .await
            .unwrap();

        assert!(object.remote_id.starts_with("backend-upload/clip_"));
        assert!(object.stored_name.ends_with(".mp4"));
        assert_eq!(
            object.url,
            format!("http://localhost:8000/media/{}", object.remote_id)
        );
        let on_disk = std::fs::read(root.path().join(&object.remote_id)).unwrap();
        assert_eq!(on_disk, b"fake video");
        assert_eq!(store.provider_name(), "local");
    }
}
