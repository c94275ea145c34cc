use chrono::Utc;
use reaper_core::models::{OrphanCriteria, ReaperSettings, Upload};
use reaper_core::{AppError, ErrorMetadata, IgnoreList, LogLevel};
use reaper_db::{SiteSettingsProvider, UploadCleanupRepository};
use reaper_storage::Storage;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

#[derive(Debug, Clone)]
pub struct OrphanUploadReaperConfig {
    /// Time between scheduled cycles
    pub interval: Duration,
    /// Candidates fetched per page
    pub batch_size: i64,
}

impl Default for OrphanUploadReaperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            batch_size: 1000,
        }
    }
}

/// Outcome of one reaper cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReapSummary {
    pub enabled: bool,
    pub grace_period_hours: i64,
    pub ignored_urls: Vec<String>,
    pub candidates: u64,
    pub deleted: u64,
    pub already_gone: u64,
    pub skipped_pending: u64,
    pub failed: u64,
}

impl ReapSummary {
    /// Summary of a cycle skipped because `clean_up_uploads` is off.
    pub fn disabled() -> Self {
        Self::default()
    }
}

/// Deletes uploads nothing refers to any more.
///
/// Each cycle reads settings, builds the ignore list, pages through orphan
/// candidates in id order, drops those still named by pending content and
/// deletes the rest, blob first and record second.
pub struct OrphanUploadReaper {
    uploads: Arc<dyn UploadCleanupRepository>,
    settings: Arc<dyn SiteSettingsProvider>,
    storage: Arc<dyn Storage>,
    config: OrphanUploadReaperConfig,
}

impl OrphanUploadReaper {
    pub fn new(
        uploads: Arc<dyn UploadCleanupRepository>,
        settings: Arc<dyn SiteSettingsProvider>,
        storage: Arc<dyn Storage>,
        config: OrphanUploadReaperConfig,
    ) -> Self {
        Self {
            uploads,
            settings,
            storage,
            config,
        }
    }

    /// Start the background reaper task.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticks = reap_interval(self.config.interval);

            loop {
                ticks.tick().await;

                tracing::info!("Starting scheduled orphan upload cleanup");

                if let Err(e) = self.run_once().await {
                    tracing::error!(
                        error = %e,
                        error_code = e.error_code(),
                        recoverable = e.is_recoverable(),
                        "Orphan upload cleanup failed"
                    );
                }
            }
        })
    }

    /// Settings and ignore list as the next cycle would see them.
    pub async fn resolve_settings(&self) -> Result<(ReaperSettings, IgnoreList), AppError> {
        let settings = self.settings.load().await?;
        let ignore_list = self.ignore_list(&settings)?;
        Ok((settings, ignore_list))
    }

    pub fn ignore_list(&self, settings: &ReaperSettings) -> Result<IgnoreList, AppError> {
        IgnoreList::build(
            &settings.branding_urls(),
            &self.storage.base_url(),
            settings.cdn_url(),
        )
    }

    /// Run one full cycle.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "orphan_uploads"))]
    pub async fn run_once(&self) -> Result<ReapSummary, AppError> {
        let settings = self.settings.load().await?;
        if !settings.clean_up_uploads {
            tracing::info!("clean_up_uploads is disabled, skipping orphan upload cleanup");
            return Ok(ReapSummary::disabled());
        }

        let ignore_list = self.ignore_list(&settings)?;
        let criteria = OrphanCriteria::new(Utc::now(), &settings, &ignore_list);

        let mut summary = ReapSummary {
            enabled: true,
            grace_period_hours: criteria.grace_period_hours,
            ignored_urls: criteria.ignored_urls.clone(),
            ..ReapSummary::default()
        };

        let mut after_id = i64::MIN;
        loop {
            let page = self
                .uploads
                .find_orphan_candidates(&criteria, after_id, self.config.batch_size)
                .await?;

            let Some(last) = page.last() else {
                break;
            };
            after_id = last.id;
            let page_len = page.len();
            summary.candidates += page_len as u64;

            let sha1s: Vec<String> = page.iter().map(|u| u.sha1.clone()).collect();
            let pending = self.uploads.pending_content_hashes(&sha1s).await?;

            for upload in &page {
                if pending.contains(&upload.sha1) {
                    tracing::debug!(
                        upload_id = upload.id,
                        sha1 = %upload.sha1,
                        "Upload referenced by pending content, skipping"
                    );
                    summary.skipped_pending += 1;
                    continue;
                }

                match self.reap(upload).await {
                    Ok(true) => summary.deleted += 1,
                    Ok(false) => summary.already_gone += 1,
                    Err(e) => {
                        log_reap_failure(upload, &e);
                        summary.failed += 1;
                    }
                }
            }

            if (page_len as i64) < self.config.batch_size {
                break;
            }
        }

        tracing::info!(
            grace_period_hours = summary.grace_period_hours,
            ignored_urls = summary.ignored_urls.len(),
            candidates = summary.candidates,
            deleted = summary.deleted,
            already_gone = summary.already_gone,
            skipped_pending = summary.skipped_pending,
            failed = summary.failed,
            "Orphan upload cleanup completed"
        );

        Ok(summary)
    }

    /// Delete one upload's blob, then its record. `Ok(false)` when the record
    /// was already gone.
    ///
    /// A failed blob delete leaves the record in place so the next cycle
    /// retries both.
    async fn reap(&self, upload: &Upload) -> Result<bool, AppError> {
        match self.storage.storage_key_for_url(&upload.url) {
            Ok(key) => self.storage.delete(&key).await?,
            Err(e) => {
                tracing::warn!(
                    upload_id = upload.id,
                    url = %upload.url,
                    error = %e,
                    "Upload URL is not in this store, deleting record only"
                );
            }
        }

        let removed = self.uploads.delete_upload(upload.id).await?;
        if removed {
            tracing::info!(
                upload_id = upload.id,
                sha1 = %upload.sha1,
                url = %upload.url,
                filesize = upload.filesize,
                "Deleted orphan upload"
            );
        }

        Ok(removed)
    }
}

fn log_reap_failure(upload: &Upload, error: &AppError) {
    match error.log_level() {
        LogLevel::Error => tracing::error!(
            upload_id = upload.id,
            url = %upload.url,
            error = %error,
            error_code = error.error_code(),
            "Failed to delete orphan upload"
        ),
        LogLevel::Warn => tracing::warn!(
            upload_id = upload.id,
            url = %upload.url,
            error = %error,
            error_code = error.error_code(),
            "Failed to delete orphan upload"
        ),
    }
}

/// Ticks every `period`. A cycle that overruns pushes the next one back
/// instead of firing the missed ticks in a burst.
fn reap_interval(period: Duration) -> Interval {
    let mut ticks = interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticks
}
