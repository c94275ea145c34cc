//! Reaper Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! pure reclamation policy (ignore list, orphan criteria) shared by every
//! reaper component. Nothing here performs I/O beyond reading the environment.

pub mod config;
pub mod error;
pub mod ignore_list;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, LogFormat, SettingsSource};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use ignore_list::{hostname_of, IgnoreList};
pub use models::{OrphanCriteria, ReaperSettings, ReferenceSource, Upload};
pub use storage_types::StorageBackend;
