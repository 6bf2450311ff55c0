//! Posts: the upload-then-persist pipeline, the feed and deletion.
//!
//! A post row exists only once its media has been accepted by the blob
//! store. Uploads are staged to a request-scoped temp file first, which is
//! removed on every exit path.

mod error;
mod service;
mod staging;
mod types;


pub use error::PostError;
pub use service::{PostRepository, PostService, parse_post_id};
pub use staging::StagedUpload;
pub use types::{FileType, NewPost, Post, UploadInput, UploadSettings};
