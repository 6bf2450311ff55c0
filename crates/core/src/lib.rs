//! Core business logic for Snapfeed.
//!
//! This crate contains the upload pipeline and the blob store backends,
//! with ZERO web framework or database dependencies.
//!
//! # Modules
//!
//! - `post` - Upload-then-persist pipeline, feed and deletion
//! - `storage` - Remote blob stores (hosted image CDN, OpenDAL object storage)

pub mod post;
pub mod storage;
