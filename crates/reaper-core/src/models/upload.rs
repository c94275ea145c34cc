//! Upload model: one stored file known to the forum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded file record.
///
/// `sha1` is the hex digest of the file bytes; pending drafts and queued posts
/// reference uploads by embedding it in their text. `retain_hours`, when set,
/// keeps the upload for at least that many hours after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    pub id: i64,
    pub sha1: String,
    pub url: String,
    pub original_filename: String,
    pub filesize: i64,
    pub created_at: DateTime<Utc>,
    pub retain_hours: Option<i32>,
}

