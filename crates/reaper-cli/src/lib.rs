//! Wiring for the `upload-reaper` binary: database pool, storage backend,
//! settings provider and the reaper itself.

pub mod setup;

pub use setup::{build_reaper, settings_provider, setup_database};
