//! Post service: upload pipeline, feed and deletion.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::PostError;
use super::staging::StagedUpload;
use super::types::{FileType, NewPost, Post, UploadInput, UploadSettings};
use crate::storage::{BlobStore, BlobUpload};

/// Repository trait for post persistence.
///
/// Every call is its own unit of work: implementations open a transaction,
/// do the work and commit, so a failure never leaves partial state behind.
pub trait PostRepository: Send + Sync {
    /// Insert a post row and return it as stored.
    fn insert(
        &self,
        input: NewPost,
    ) -> impl std::future::Future<Output = Result<Post, PostError>> + Send;

    /// All posts, newest first.
    fn list_newest_first(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Post>, PostError>> + Send;

    /// Find post by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Post>, PostError>> + Send;

    /// Delete post by ID. Returns whether a row was removed.
    fn delete(&self, id: Uuid) -> impl std::future::Future<Output = Result<bool, PostError>> + Send;
}

/// Post service coordinating the blob store and the repository.
pub struct PostService<R: PostRepository> {
    store: Arc<dyn BlobStore>,
    repo: Arc<R>,
    settings: UploadSettings,
}

impl<R: PostRepository> PostService<R> {
    /// Create a new post service.
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>, repo: Arc<R>, settings: UploadSettings) -> Self {
        Self {
            store,
            repo,
            settings,
        }
    }

    /// Push a staged upload to the blob store, then persist the post.
    ///
    /// The staged file is removed before returning, whatever the outcome.
    /// If persistence fails after the remote upload succeeded, the remote
    /// object is left in place and logged as orphaned.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The blob store is unreachable or rejects the upload
    /// - The blob store returns no identifier
    /// - The database insert fails
    pub async fn upload(&self, input: UploadInput) -> Result<Post, PostError> {
        let UploadInput {
            staged,
            content_type,
            caption,
        } = input;

        let result = self.publish(&staged, &content_type, caption).await;

        match staged.close() {
            Ok(path) => debug!(path = %path.display(), "Staging file removed"),
            Err(e) => error!(error = %e, "Failed to remove staging file"),
        }

        result
    }

    async fn publish(
        &self,
        staged: &StagedUpload,
        content_type: &str,
        caption: Option<String>,
    ) -> Result<Post, PostError> {
        let uploaded = self
            .store
            .upload(BlobUpload {
                path: staged.path(),
                file_name: staged.original_filename(),
                content_type,
                folder: &self.settings.folder,
                tags: &self.settings.tags,
            })
            .await
            .map_err(|e| {
                error!(
                    provider = self.store.provider_name(),
                    file_name = staged.original_filename(),
                    error = %e,
                    "Remote upload failed"
                );
                PostError::RemoteUpload(e)
            })?;

        if uploaded.remote_id.trim().is_empty() || uploaded.url.trim().is_empty() {
            error!(
                provider = self.store.provider_name(),
                file_name = staged.original_filename(),
                "Remote store returned no identifier"
            );
            return Err(PostError::UploadIncomplete);
        }

        let file_type = FileType::from_content_type(content_type);
        let new_post = NewPost {
            id: Uuid::new_v4(),
            caption,
            url: uploaded.url,
            file_type,
            file_name: uploaded.stored_name,
            created_at: Utc::now(),
        };

        match self.repo.insert(new_post).await {
            Ok(post) => {
                info!(
                    post_id = %post.id,
                    remote_id = %uploaded.remote_id,
                    file_type = file_type.as_str(),
                    bytes = staged.size(),
                    "Post created"
                );
                Ok(post)
            }
            Err(e) => {
                warn!(
                    remote_id = %uploaded.remote_id,
                    error = %e,
                    "Persisting post failed after remote upload; remote object orphaned"
                );
                Err(e)
            }
        }
    }

    /// All posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails.
    pub async fn feed(&self) -> Result<Vec<Post>, PostError> {
        self.repo.list_newest_first().await
    }

    /// Get post by its textual identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is malformed, no post matches, or
    /// the database operation fails.
    pub async fn get(&self, raw_id: &str) -> Result<Post, PostError> {
        let id = parse_post_id(raw_id)?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(PostError::NotFound(id))
    }

    /// Delete a post by its textual identifier.
    ///
    /// Only the database row is removed; the remote object is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is malformed, no post matches, or
    /// the database operation fails.
    pub async fn delete(&self, raw_id: &str) -> Result<Uuid, PostError> {
        let id = parse_post_id(raw_id)?;

        if !self.repo.delete(id).await? {
            return Err(PostError::NotFound(id));
        }

        info!(post_id = %id, "Post deleted");
        Ok(id)
    }
}

/// Parse a post identifier.
///
/// # Errors
///
/// Returns [`PostError::Validation`] if `raw` is not a UUID.
pub fn parse_post_id(raw: &str) -> Result<Uuid, PostError> {
    Uuid::parse_str(raw.trim()).map_err(|_| PostError::validation(format!("invalid post id: {raw}")))
}
