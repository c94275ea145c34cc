//! Mock repositories and storage for testing the reaper without PostgreSQL.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reaper_core::models::{OrphanCriteria, ReaperSettings, Upload};
use reaper_core::{AppError, StorageBackend};
use reaper_db::{SiteSettingsProvider, UploadCleanupRepository};
use reaper_storage::{Storage, StorageError, StorageResult};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const LOCAL_BASE_URL: &str = "/uploads/default";

/// In-memory forum: uploads, their references and pending content.
#[derive(Clone, Default)]
pub struct MockUploadRepository {
    uploads: Arc<Mutex<BTreeMap<i64, Upload>>>,
    referenced_ids: Arc<Mutex<HashSet<i64>>>,
    referenced_urls: Arc<Mutex<HashSet<String>>>,
    pending_texts: Arc<Mutex<Vec<String>>>,
    /// Rows removed by "someone else" right before the reaper deletes them
    vanishing_ids: Arc<Mutex<HashSet<i64>>>,
    candidate_queries: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
}

impl MockUploadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an upload created `hours_old` hours ago and return its id.
    pub fn add_upload(&self, id: i64, url: &str, hours_old: i64) -> Upload {
        let upload = Upload {
            id,
            sha1: format!("{:040x}", id),
            url: url.to_string(),
            original_filename: format!("file-{}.png", id),
            filesize: 2048,
            created_at: Utc::now() - Duration::hours(hours_old),
            retain_hours: None,
        };
        self.uploads.lock().unwrap().insert(id, upload.clone());
        upload
    }

    pub fn set_retain_hours(&self, id: i64, hours: i32) {
        if let Some(upload) = self.uploads.lock().unwrap().get_mut(&id) {
            upload.retain_hours = Some(hours);
        }
    }

    /// Reference by id, like a post, avatar, category, emoji or theme field.
    pub fn reference_id(&self, id: i64) {
        self.referenced_ids.lock().unwrap().insert(id);
    }

    /// Reference by URL, like a profile or card background.
    pub fn reference_url(&self, url: &str) {
        self.referenced_urls.lock().unwrap().insert(url.to_string());
    }

    /// Add a queued post or draft body.
    pub fn add_pending_text(&self, text: &str) {
        self.pending_texts.lock().unwrap().push(text.to_string());
    }

    pub fn vanish_before_delete(&self, id: i64) {
        self.vanishing_ids.lock().unwrap().insert(id);
    }

    pub fn contains(&self, id: i64) -> bool {
        self.uploads.lock().unwrap().contains_key(&id)
    }

    pub fn remaining_ids(&self) -> Vec<i64> {
        self.uploads.lock().unwrap().keys().copied().collect()
    }

    pub fn candidate_queries(&self) -> usize {
        self.candidate_queries.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UploadCleanupRepository for MockUploadRepository {
    async fn find_orphan_candidates(
        &self,
        criteria: &OrphanCriteria,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<Upload>, AppError> {
        self.candidate_queries.fetch_add(1, Ordering::SeqCst);
        let referenced_ids = self.referenced_ids.lock().unwrap();
        let referenced_urls = self.referenced_urls.lock().unwrap();

        Ok(self
            .uploads
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.id > after_id)
            .filter(|u| criteria.admits(u))
            .filter(|u| !referenced_ids.contains(&u.id) && !referenced_urls.contains(&u.url))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn pending_content_hashes(
        &self,
        sha1s: &[String],
    ) -> Result<HashSet<String>, AppError> {
        let texts = self.pending_texts.lock().unwrap();
        Ok(sha1s
            .iter()
            .filter(|sha1| texts.iter().any(|text| text.contains(sha1.as_str())))
            .cloned()
            .collect())
    }

    async fn delete_upload(&self, id: i64) -> Result<bool, AppError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut uploads = self.uploads.lock().unwrap();
        if self.vanishing_ids.lock().unwrap().remove(&id) {
            uploads.remove(&id);
            return Ok(false);
        }
        Ok(uploads.remove(&id).is_some())
    }
}

/// Settings provider that can be changed between cycles or made to fail.
#[derive(Clone)]
pub struct MockSettingsProvider {
    settings: Arc<Mutex<ReaperSettings>>,
    fail: Arc<Mutex<bool>>,
}

impl MockSettingsProvider {
    pub fn new(settings: ReaperSettings) -> Self {
        Self {
            settings: Arc::new(Mutex::new(settings)),
            fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set(&self, settings: ReaperSettings) {
        *self.settings.lock().unwrap() = settings;
    }

    pub fn fail_next_loads(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl SiteSettingsProvider for MockSettingsProvider {
    async fn load(&self) -> Result<ReaperSettings, AppError> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::Internal("settings store unavailable".to_string()));
        }
        Ok(self.settings.lock().unwrap().clone())
    }
}

/// Wraps a store and fails deletes of chosen keys.
pub struct FailingDeleteStorage {
    inner: Arc<dyn Storage>,
    failing_keys: HashSet<String>,
}

impl FailingDeleteStorage {
    pub fn new(inner: Arc<dyn Storage>, failing_keys: &[&str]) -> Self {
        Self {
            inner,
            failing_keys: failing_keys.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[async_trait]
impl Storage for FailingDeleteStorage {
    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        if self.failing_keys.contains(storage_key) {
            return Err(StorageError::DeleteFailed(format!(
                "simulated failure for {}",
                storage_key
            )));
        }
        self.inner.delete(storage_key).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }

    fn relative_base_url(&self) -> String {
        self.inner.relative_base_url()
    }

    fn absolute_base_url(&self) -> String {
        self.inner.absolute_base_url()
    }
}

/// Remote bucket stand-in that records deleted keys.
#[derive(Default)]
pub struct RecordingExternalStorage {
    pub deleted: Mutex<Vec<String>>,
}

pub const BUCKET_URL: &str = "//forum-uploads.s3.dualstack.us-east-1.amazonaws.com";

#[async_trait]
impl Storage for RecordingExternalStorage {
    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.deleted.lock().unwrap().push(storage_key.to_string());
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(!self
            .deleted
            .lock()
            .unwrap()
            .iter()
            .any(|k| k == storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }

    fn relative_base_url(&self) -> String {
        BUCKET_URL.to_string()
    }

    fn absolute_base_url(&self) -> String {
        BUCKET_URL.to_string()
    }
}

/// Storage key used for an upload in the local fixtures.
pub fn local_key(id: i64) -> String {
    format!("original/1X/{:040x}.png", id)
}

/// Public URL for an upload in the local fixtures.
pub fn local_url(id: i64) -> String {
    format!("{}/{}", LOCAL_BASE_URL, local_key(id))
}

pub fn settings_with_grace(hours: i64) -> ReaperSettings {
    ReaperSettings {
        clean_orphan_uploads_grace_period_hours: hours,
        ..ReaperSettings::default()
    }
}
