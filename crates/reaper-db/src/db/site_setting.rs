//! Site setting repository: reads the forum's `site_settings` table.

use reaper_core::models::ReaperSettings;
use reaper_core::AppError;
use sqlx::{PgPool, Postgres};
use std::collections::HashMap;

/// Repository for site_settings table.
#[derive(Clone)]
pub struct SiteSettingRepository {
    pool: PgPool,
}

impl SiteSettingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Raw values for the given setting names. Missing rows and NULL values
    /// are absent from the map.
    #[tracing::instrument(skip(self, names), fields(db.table = "site_settings", count = names.len()))]
    pub async fn get_values(&self, names: &[&str]) -> Result<HashMap<String, String>, AppError> {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();

        let rows: Vec<(String, Option<String>)> = sqlx::query_as::<Postgres, (String, Option<String>)>(
            "SELECT name, value FROM site_settings WHERE name = ANY($1)",
        )
        .bind(names.as_slice())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect())
    }

    /// Resolve the reaper's settings, falling back to defaults for missing rows.
    pub async fn load_reaper_settings(&self) -> Result<ReaperSettings, AppError> {
        let values = self.get_values(&ReaperSettings::NAMES).await?;
        Ok(ReaperSettings::from_lookup(|name| values.get(name).cloned()))
    }

    /// Insert or replace a setting value.
    #[tracing::instrument(skip(self, value), fields(db.table = "site_settings"))]
    pub async fn upsert(&self, name: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO site_settings (name, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(name)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
