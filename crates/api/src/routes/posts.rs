//! Post routes: upload, feed, lookup and deletion.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{debug, info};

use crate::{AppState, error::ApiError};
use snapfeed_core::post::{Post, PostService, StagedUpload, UploadInput, UploadSettings};
use snapfeed_db::PostRepository;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const DEFAULT_FILE_NAME: &str = "upload";

/// Creates the post routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .route("/feed", get(feed))
        .route("/post/{post_id}", get(get_post).delete(delete_post))
}

// ============================================================================
// Response Types
// ============================================================================

/// A post as returned to clients.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    /// Post ID.
    pub id: String,
    /// Caption.
    pub caption: Option<String>,
    /// Public media URL.
    pub url: String,
    /// `image` or `video`.
    pub file_type: String,
    /// Name assigned by the blob store.
    pub file_name: String,
    /// Creation time (ISO 8601).
    pub created_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            caption: post.caption,
            url: post.url,
            file_type: post.file_type.as_str().to_string(),
            file_name: post.file_name,
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

/// Response for the feed.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    /// Posts, newest first.
    pub posts: Vec<PostResponse>,
}

/// Response for a deletion.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Always true.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}

fn post_service(state: &AppState) -> PostService<PostRepository> {
    PostService::new(
        state.storage.clone(),
        Arc::new(PostRepository::new((*state.db).clone())),
        UploadSettings {
            folder: state.upload.folder.clone(),
            tags: state.upload.tags.clone(),
        },
    )
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/upload`
/// Stage the `file` part, push it to the blob store and persist the post.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PostResponse>, ApiError> {
    let staging_dir = state.upload.staging_dir();
    let mut file: Option<(StagedUpload, String)> = None;
    let mut caption: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(DEFAULT_FILE_NAME)
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();

                let staged = StagedUpload::stage(&staging_dir, &file_name, field).await?;
                debug!(
                    file_name = %file_name,
                    bytes = staged.size(),
                    "Upload staged"
                );
                file = Some((staged, content_type));
            }
            Some("caption") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                caption = Some(text);
            }
            _ => {}
        }
    }

    let Some((staged, content_type)) = file else {
        return Err(ApiError::bad_request("multipart field `file` is required"));
    };

    let post = post_service(&state)
        .upload(UploadInput {
            staged,
            content_type,
            caption,
        })
        .await?;

    Ok(Json(post.into()))
}

/// GET `/feed`
/// All posts, newest first.
async fn feed(State(state): State<AppState>) -> Result<Json<FeedResponse>, ApiError> {
    let posts = post_service(&state).feed().await?;

    Ok(Json(FeedResponse {
        posts: posts.into_iter().map(PostResponse::from).collect(),
    }))
}

/// GET `/post/{post_id}`
async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = post_service(&state).get(&post_id).await?;
    Ok(Json(post.into()))
}

/// DELETE `/post/{post_id}`
/// Removes the row only; the remote object is left in place.
async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = post_service(&state).delete(&post_id).await?;
    info!(post_id = %id, "Post deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "Post deleted successfully".to_string(),
    }))
}
