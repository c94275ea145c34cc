//! Orphan upload reclamation

mod reaper;

pub use reaper::{OrphanUploadReaper, OrphanUploadReaperConfig, ReapSummary};
