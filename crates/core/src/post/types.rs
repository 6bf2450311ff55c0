//! Post types and data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::staging::StagedUpload;

/// Media classification derived from the declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// Still image. Also the fallback for anything that is not a video.
    #[default]
    Image,
    /// Video clip.
    Video,
}

impl FileType {
    /// `video` if the content type starts with `video/`, otherwise `image`.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("video/") {
            Self::Video
        } else {
            Self::Image
        }
    }

    /// Convert to database string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

/// Post domain model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Unique identifier.
    pub id: Uuid,
    /// User-supplied caption.
    pub caption: Option<String>,
    /// Public URL on the blob store.
    pub url: String,
    /// Media classification.
    pub file_type: FileType,
    /// Name assigned by the blob store.
    pub file_name: String,
    /// Creation timestamp; feed sort key.
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a post row.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Post ID.
    pub id: Uuid,
    /// Caption.
    pub caption: Option<String>,
    /// Confirmed remote URL.
    pub url: String,
    /// Media classification.
    pub file_type: FileType,
    /// Name assigned by the blob store.
    pub file_name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<NewPost> for Post {
    fn from(input: NewPost) -> Self {
        Self {
            id: input.id,
            caption: input.caption,
            url: input.url,
            file_type: input.file_type,
            file_name: input.file_name,
            created_at: input.created_at,
        }
    }
}

/// Input for the upload pipeline.
#[derive(Debug)]
pub struct UploadInput {
    /// Request-scoped staged copy of the upload stream.
    pub staged: StagedUpload,
    /// Declared MIME type.
    pub content_type: String,
    /// Optional caption.
    pub caption: Option<String>,
}

/// Fixed blob store destination for uploads.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Destination folder.
    pub folder: String,
    /// Classification tags.
    pub tags: Vec<String>,
}
