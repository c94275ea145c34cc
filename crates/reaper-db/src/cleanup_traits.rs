//! Repository trait abstractions for the reaper
//!
//! These traits define the minimal interface the reaper needs from the
//! database, allowing it to be tested without PostgreSQL.

use async_trait::async_trait;
use reaper_core::models::{OrphanCriteria, ReaperSettings, Upload};
use reaper_core::AppError;
use std::collections::HashSet;

use crate::db::site_setting::SiteSettingRepository;
use crate::db::upload::UploadRepository;

/// Upload operations needed by the reaper
#[async_trait]
pub trait UploadCleanupRepository: Send + Sync {
    /// Uploads matching `criteria` with no referencing row, `id > after_id`,
    /// ascending by id, at most `limit`.
    async fn find_orphan_candidates(
        &self,
        criteria: &OrphanCriteria,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<Upload>, AppError>;

    /// The subset of `sha1s` referenced by pending content.
    async fn pending_content_hashes(&self, sha1s: &[String])
        -> Result<HashSet<String>, AppError>;

    /// Delete one upload row; `false` when no row matched.
    async fn delete_upload(&self, id: i64) -> Result<bool, AppError>;
}

/// Source of the site settings the reaper reads at the start of each cycle
#[async_trait]
pub trait SiteSettingsProvider: Send + Sync {
    async fn load(&self) -> Result<ReaperSettings, AppError>;
}

// Implementations for concrete repository types

#[async_trait]
impl UploadCleanupRepository for UploadRepository {
    async fn find_orphan_candidates(
        &self,
        criteria: &OrphanCriteria,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<Upload>, AppError> {
        UploadRepository::find_orphan_candidates(self, criteria, after_id, limit).await
    }

    async fn pending_content_hashes(
        &self,
        sha1s: &[String],
    ) -> Result<HashSet<String>, AppError> {
        UploadRepository::pending_content_hashes(self, sha1s).await
    }

    async fn delete_upload(&self, id: i64) -> Result<bool, AppError> {
        UploadRepository::delete_upload(self, id).await
    }
}

#[async_trait]
impl SiteSettingsProvider for SiteSettingRepository {
    async fn load(&self) -> Result<ReaperSettings, AppError> {
        self.load_reaper_settings().await
    }
}

/// Fixed settings, typically parsed from the environment at startup.
#[derive(Debug, Clone)]
pub struct StaticSettingsProvider {
    settings: ReaperSettings,
}

impl StaticSettingsProvider {
    pub fn new(settings: ReaperSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SiteSettingsProvider for StaticSettingsProvider {
    async fn load(&self) -> Result<ReaperSettings, AppError> {
        Ok(self.settings.clone())
    }
}
