//! Upload repository: orphan scan, pending-content check and deletion.

use chrono::{DateTime, Utc};
use reaper_core::models::{OrphanCriteria, ReferenceSource, Upload, MAX_OFFSET_HOURS};
use reaper_core::AppError;
use sqlx::{PgPool, Postgres};
use std::collections::HashSet;

const UPLOAD_COLUMNS: &str =
    "u.id, u.sha1, u.url, u.original_filename, u.filesize, u.created_at, u.retain_hours";

/// Row type for uploads table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct UploadRow {
    pub id: i64,
    pub sha1: String,
    pub url: String,
    pub original_filename: String,
    pub filesize: i64,
    pub created_at: DateTime<Utc>,
    pub retain_hours: Option<i32>,
}

impl UploadRow {
    pub fn to_upload(self) -> Upload {
        Upload {
            id: self.id,
            sha1: self.sha1,
            url: self.url,
            original_filename: self.original_filename,
            filesize: self.filesize,
            created_at: self.created_at,
            retain_hours: self.retain_hours,
        }
    }
}

/// Candidate query rendered from `ReferenceSource::ALL`.
///
/// Binds: `$1` last seen id, `$2` grace cutoff, `$3` now, `$4` ignored URLs,
/// `$5` page size. Retention hours are clamped to `MAX_OFFSET_HOURS` so a
/// single extreme row cannot push the interval arithmetic out of range.
pub(crate) fn orphan_candidates_sql() -> String {
    let mut sql = format!(
        "SELECT {columns} FROM uploads u\n\
         WHERE u.id > $1\n  \
         AND u.created_at < $2\n  \
         AND (u.retain_hours IS NULL OR u.created_at < $3 - make_interval(hours => \
         LEAST(GREATEST(u.retain_hours, -{max}), {max})))\n  \
         AND NOT (u.url = ANY($4))",
        columns = UPLOAD_COLUMNS,
        max = MAX_OFFSET_HOURS,
    );

    for source in ReferenceSource::ALL {
        sql.push_str(&format!(
            "\n  AND NOT EXISTS (SELECT 1 FROM {table} r WHERE r.{column} = u.{upload_column})",
            table = source.table(),
            column = source.column(),
            upload_column = source.upload_column(),
        ));
    }

    sql.push_str("\nORDER BY u.id\nLIMIT $5");
    sql
}

const PENDING_HASHES_SQL: &str = r#"
    SELECT h.sha1
    FROM unnest($1::text[]) AS h(sha1)
    WHERE EXISTS (SELECT 1 FROM queued_posts q WHERE strpos(q.raw, h.sha1) > 0)
       OR EXISTS (SELECT 1 FROM drafts d WHERE strpos(d.data, h.sha1) > 0)
"#;

/// Repository for uploads table.
#[derive(Clone)]
pub struct UploadRepository {
    pool: PgPool,
}

impl UploadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of orphan candidates with `id > after_id`, in ascending id order.
    #[tracing::instrument(
        skip(self, criteria),
        fields(db.table = "uploads", grace_period_hours = criteria.grace_period_hours)
    )]
    pub async fn find_orphan_candidates(
        &self,
        criteria: &OrphanCriteria,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<Upload>, AppError> {
        let rows: Vec<UploadRow> = sqlx::query_as::<Postgres, UploadRow>(&orphan_candidates_sql())
            .bind(after_id)
            .bind(criteria.grace_cutoff())
            .bind(criteria.now)
            .bind(criteria.ignored_urls.as_slice())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(UploadRow::to_upload).collect())
    }

    /// The subset of `sha1s` that occur inside a queued post or a draft.
    #[tracing::instrument(skip(self, sha1s), fields(db.table = "queued_posts,drafts", count = sha1s.len()))]
    pub async fn pending_content_hashes(
        &self,
        sha1s: &[String],
    ) -> Result<HashSet<String>, AppError> {
        if sha1s.is_empty() {
            return Ok(HashSet::new());
        }

        let found: Vec<String> = sqlx::query_scalar::<Postgres, String>(PENDING_HASHES_SQL)
            .bind(sha1s)
            .fetch_all(&self.pool)
            .await?;

        Ok(found.into_iter().collect())
    }

    /// Delete an upload row. Returns `false` if it was already gone.
    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.record_id = %id))]
    pub async fn delete_upload(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM uploads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch an upload by id.
    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.record_id = %id))]
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Upload>, AppError> {
        let row: Option<UploadRow> = sqlx::query_as::<Postgres, UploadRow>(&format!(
            "SELECT {} FROM uploads u WHERE u.id = $1",
            UPLOAD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UploadRow::to_upload))
    }
}
