//! Hosted image CDN client (ImageKit upload API).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use super::{BlobStore, BlobUpload, StorageError, UploadedObject};

/// Upload API response. Only the fields we persist are decoded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    #[serde(default)]
    file_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Blob store backed by a hosted image CDN.
#[derive(Debug, Clone)]
pub struct ImageKitStore {
    client: reqwest::Client,
    endpoint: String,
    private_key: String,
}

impl ImageKitStore {
    /// Create a client for the given upload endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        private_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::configuration(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            private_key: private_key.into(),
        })
    }

    async fn build_form(request: &BlobUpload<'_>) -> Result<Form, StorageError> {
        let file = tokio::fs::File::open(request.path).await?;
        let length = file.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let part = Part::stream_with_length(body, length)
            .file_name(request.file_name.to_string())
            .mime_str(request.content_type)?;

        Ok(Form::new()
            .part("file", part)
            .text("fileName", request.file_name.to_string())
            .text("folder", request.folder.to_string())
            .text("tags", request.tags.join(","))
            .text("useUniqueFileName", "true"))
    }
}

#[async_trait]
impl BlobStore for ImageKitStore {
    async fn upload(&self, request: BlobUpload<'_>) -> Result<UploadedObject, StorageError> {
        let form = Self::build_form(&request).await?;

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.private_key, Some(""))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::rejected(status.as_u16(), body));
        }

        let payload: UploadResponse = response.json().await?;

        Ok(UploadedObject {
            remote_id: payload.file_id.unwrap_or_default(),
            url: payload.url.unwrap_or_default(),
            stored_name: payload.name.unwrap_or_default(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "imagekit"
    }
}
