//! Database and reaper setup

use anyhow::{Context, Result};
use reaper_core::{Config, SettingsSource};
use reaper_db::{
    SiteSettingRepository, SiteSettingsProvider, StaticSettingsProvider, UploadRepository,
};
use reaper_infra::{OrphanUploadReaper, OrphanUploadReaperConfig};
use reaper_storage::create_storage;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Setup database connection pool and, when enabled, run migrations
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    if config.db_run_migrations {
        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}

/// Settings come from `site_settings` or are fixed from the environment.
pub fn settings_provider(config: &Config, pool: PgPool) -> Arc<dyn SiteSettingsProvider> {
    match config.settings_source {
        SettingsSource::Database => Arc::new(SiteSettingRepository::new(pool)),
        SettingsSource::Env => Arc::new(StaticSettingsProvider::new(config.env_settings.clone())),
    }
}

pub async fn build_reaper(config: &Config, pool: PgPool) -> Result<Arc<OrphanUploadReaper>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(
        backend = %storage.backend_type(),
        base_url = %storage.base_url(),
        settings_source = ?config.settings_source,
        "Storage initialized"
    );

    let reaper = OrphanUploadReaper::new(
        Arc::new(UploadRepository::new(pool.clone())),
        settings_provider(config, pool),
        storage,
        OrphanUploadReaperConfig {
            interval: Duration::from_secs(config.reaper_interval_secs),
            batch_size: config.reaper_batch_size,
        },
    );

    Ok(Arc::new(reaper))
}
