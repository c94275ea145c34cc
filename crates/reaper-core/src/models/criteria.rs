use chrono::{DateTime, Duration, Utc};

use super::settings::{ReaperSettings, MIN_GRACE_PERIOD_HOURS};
use super::upload::Upload;
use crate::ignore_list::IgnoreList;

/// The orphan predicate for one reaper cycle.
///
/// `admits` checks the age, retention and ignore-list conditions on a single
/// upload. The "no reference anywhere" condition needs the rest of the schema
/// and is evaluated by the repository that renders these criteria as SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanCriteria {
    pub now: DateTime<Utc>,
    pub grace_period_hours: i64,
    pub ignored_urls: Vec<String>,
}

impl OrphanCriteria {
    pub fn new(now: DateTime<Utc>, settings: &ReaperSettings, ignore_list: &IgnoreList) -> Self {
        Self {
            now,
            grace_period_hours: settings.effective_grace_period_hours(),
            ignored_urls: ignore_list.urls().to_vec(),
        }
    }

    /// Uploads created at or after this instant are still within the grace period.
    pub fn grace_cutoff(&self) -> DateTime<Utc> {
        hours_before(self.now, self.grace_period_hours.max(MIN_GRACE_PERIOD_HOURS))
    }

    pub fn retention_elapsed(&self, upload: &Upload) -> bool {
        match upload.retain_hours {
            None => true,
            Some(hours) => upload.created_at < hours_before(self.now, i64::from(hours)),
        }
    }

    pub fn is_ignored(&self, url: &str) -> bool {
        self.ignored_urls.iter().any(|ignored| ignored == url)
    }

    pub fn admits(&self, upload: &Upload) -> bool {
        self.retention_elapsed(upload)
            && upload.created_at < self.grace_cutoff()
            && !self.is_ignored(&upload.url)
    }
}

/// Longest look-back (or look-ahead) applied to an hour offset, about 5000 years.
///
/// Offsets are clamped to this so every cutoff stays inside the PostgreSQL
/// `timestamptz` range.
pub const MAX_OFFSET_HOURS: i64 = 5_000 * 365 * 24;

fn hours_before(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    now - Duration::hours(hours.clamp(-MAX_OFFSET_HOURS, MAX_OFFSET_HOURS))
}
