//! Reaper Storage Library
//!
//! Blob storage the reaper deletes from. It provides the `Storage` trait plus
//! local filesystem and S3 implementations.
//!
//! # URL to key mapping
//!
//! Upload rows store public URLs, not storage keys. Each backend knows the
//! base URL it serves files under and turns an upload URL back into a key by
//! taking the text after that base, without the leading `/`.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use reaper_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
