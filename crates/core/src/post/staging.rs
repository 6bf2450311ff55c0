//! Request-scoped staging of upload streams.
//!
//! The incoming body is copied into a uniquely named temp file so the blob
//! store can reopen it. The file lives exactly as long as the [`StagedUpload`]
//! guard: dropping the guard on any exit path removes it.

use std::path::{Path, PathBuf};
use std::pin::pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use super::error::PostError;

const STAGING_PREFIX: &str = "snapfeed-";

/// A staged upload. Deletes its temp file when dropped.
#[derive(Debug)]
pub struct StagedUpload {
    path: TempPath,
    original_filename: String,
    size: u64,
}

impl StagedUpload {
    /// Copy `stream` into a new temp file inside `dir`, keeping the extension
    /// of `original_filename`.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Staging`] if the temp file cannot be created or
    /// written, or if the stream yields an error. The partial file is removed.
    pub async fn stage<S, E>(
        dir: &Path,
        original_filename: &str,
        stream: S,
    ) -> Result<Self, PostError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        let dir = dir.to_path_buf();
        let suffix = extension_suffix(original_filename);
        let named = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(STAGING_PREFIX)
                .suffix(&suffix)
                .tempfile_in(dir)
        })
        .await
        .map_err(|e| PostError::staging(e.to_string()))?
        .map_err(|e| PostError::staging(format!("cannot create staging file: {e}")))?;

        let (file, path) = named.into_parts();
        let mut file = tokio::fs::File::from_std(file);
        let mut stream = pin!(stream);
        let mut size = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| PostError::staging(format!("upload stream interrupted: {e}")))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| PostError::staging(e.to_string()))?;
            size += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| PostError::staging(e.to_string()))?;

        Ok(Self {
            path,
            original_filename: original_filename.to_string(),
            size,
        })
    }

    /// Location of the staged copy.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Filename as declared by the client.
    #[must_use]
    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    /// Number of bytes staged.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Remove the staged file now, reporting failures instead of ignoring them.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file could not be deleted.
    pub fn close(self) -> std::io::Result<PathBuf> {
        let path = self.path.to_path_buf();
        self.path.close()?;
        Ok(path)
    }
}

/// `.ext` of the original filename, or an empty string.
pub(crate) fn extension_suffix(original_filename: &str) -> String {
    Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}
