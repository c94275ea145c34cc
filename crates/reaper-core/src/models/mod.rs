//! Data models for the reaper
//!
//! Uploads, the tables that may reference them, the settings the reaper reads
//! and the declarative orphan predicate.

mod criteria;
mod reference;
mod settings;
mod upload;

pub use criteria::{OrphanCriteria, MAX_OFFSET_HOURS};
pub use reference::{ReferenceMatch, ReferenceSource};
pub use settings::{ReaperSettings, DEFAULT_GRACE_PERIOD_HOURS, MIN_GRACE_PERIOD_HOURS};
pub use upload::Upload;
