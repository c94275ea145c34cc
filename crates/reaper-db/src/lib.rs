//! Reaper Database Layer
//!
//! This crate provides the repositories the reaper reads from and deletes
//! through, plus the trait seams the reaper is written against.
//!
// Module declarations
pub mod cleanup_traits;
pub mod db;

// Re-exports: Repositories
pub use db::{SiteSettingRepository, UploadRepository, UploadRow};

// Re-exports: Cleanup traits
pub use cleanup_traits::{SiteSettingsProvider, StaticSettingsProvider, UploadCleanupRepository};
