//! Reaper Infrastructure Library
//!
//! This crate provides the runtime pieces of the reaper:
//! - Telemetry initialization
//! - The orphan upload reaper and its recurring loop

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "cleanup")]
pub mod cleanup;

// Re-export commonly used types
#[cfg(feature = "observability-basic")]
pub use telemetry::init_telemetry;

#[cfg(feature = "cleanup")]
pub use cleanup::{OrphanUploadReaper, OrphanUploadReaperConfig, ReapSummary};
