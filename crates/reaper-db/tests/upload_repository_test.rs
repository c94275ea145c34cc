//! PostgreSQL integration tests using testcontainers.
//!
//! They require Docker to be running. Set SKIP_POSTGRES_TESTS=1 to skip.

use chrono::{Duration, Utc};
use reaper_core::models::{OrphanCriteria, ReaperSettings, ReferenceSource};
use reaper_core::IgnoreList;
use reaper_db::{SiteSettingRepository, SiteSettingsProvider, UploadRepository};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;

struct TestDb {
    pool: PgPool,
    _container: ContainerAsync<Postgres>,
}

/// Start a migrated PostgreSQL container, or `None` when Docker is unavailable.
async fn postgres_or_skip() -> Option<TestDb> {
    if std::env::var("SKIP_POSTGRES_TESTS").is_ok() {
        return None;
    }

    let container = match Postgres::default().with_tag("15-alpine").start().await {
        Ok(container) => container,
        Err(e) => {
            eprintln!("Skipping PostgreSQL test (Docker unavailable): {e}");
            return None;
        }
    };

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");
    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to PostgreSQL");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(TestDb {
        pool,
        _container: container,
    })
}

async fn insert_upload(pool: &PgPool, sha1: &str, url: &str, hours_old: i64) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO uploads (sha1, url, original_filename, filesize, created_at)
         VALUES ($1, $2, 'file.png', 10, $3) RETURNING id",
    )
    .bind(sha1)
    .bind(url)
    .bind(Utc::now() - Duration::hours(hours_old))
    .fetch_one(pool)
    .await
    .expect("insert upload")
}

fn sha(seed: char) -> String {
    std::iter::repeat(seed).take(40).collect()
}

fn criteria(grace: i64, ignored: &[&str]) -> OrphanCriteria {
    OrphanCriteria {
        now: Utc::now(),
        grace_period_hours: grace,
        ignored_urls: ignored.iter().map(|s| s.to_string()).collect(),
    }
}

async fn candidate_ids(repo: &UploadRepository, criteria: &OrphanCriteria) -> Vec<i64> {
    repo.find_orphan_candidates(criteria, 0, 100)
        .await
        .expect("candidate query")
        .into_iter()
        .map(|u| u.id)
        .collect()
}

/// Insert a row in `source` that points at `upload`, by id or by URL.
async fn insert_reference(pool: &PgPool, source: ReferenceSource, upload_id: i64, url: &str) {
    let (sql, user_id) = match source {
        ReferenceSource::PostUpload => {
            ("INSERT INTO post_uploads (post_id, upload_id) VALUES (1, $1)", None)
        }
        ReferenceSource::UserAvatar => (
            "INSERT INTO users (username, uploaded_avatar_id) VALUES ('sam', $1)",
            None,
        ),
        ReferenceSource::GravatarAvatar => {
            ("INSERT INTO user_avatars (user_id, gravatar_upload_id) VALUES (1, $1)", None)
        }
        ReferenceSource::CustomAvatar => {
            ("INSERT INTO user_avatars (user_id, custom_upload_id) VALUES (2, $1)", None)
        }
        ReferenceSource::ProfileBackground => (
            "INSERT INTO user_profiles (user_id, profile_background) VALUES ($2, $1)",
            Some(1_i64),
        ),
        ReferenceSource::CardBackground => (
            "INSERT INTO user_profiles (user_id, card_background) VALUES ($2, $1)",
            Some(2_i64),
        ),
        ReferenceSource::CategoryLogo => {
            ("INSERT INTO categories (name, uploaded_logo_id) VALUES ('Meta', $1)", None)
        }
        ReferenceSource::CategoryBackground => (
            "INSERT INTO categories (name, uploaded_background_id) VALUES ('General', $1)",
            None,
        ),
        ReferenceSource::CustomEmoji => {
            ("INSERT INTO custom_emojis (name, upload_id) VALUES ('party', $1)", None)
        }
        ReferenceSource::ThemeField => (
            "INSERT INTO theme_fields (theme_id, name, upload_id) VALUES (1, 'bg', $1)",
            None,
        ),
    };

    let query = match user_id {
        Some(user_id) => sqlx::query(sql).bind(url.to_string()).bind(user_id),
        None => sqlx::query(sql).bind(upload_id),
    };
    query
        .execute(pool)
        .await
        .unwrap_or_else(|e| panic!("insert reference {}: {}", source, e));
}

#[tokio::test]
async fn test_candidates_exclude_every_reference_source() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };
    let repo = UploadRepository::new(db.pool.clone());

    let orphan = insert_upload(&db.pool, &sha('0'), "/uploads/default/orphan.png", 5).await;
    let _young = insert_upload(&db.pool, &sha('1'), "/uploads/default/young.png", 0).await;

    let seeds = ['a', 'b', 'c', 'd', 'e', 'f', '2', '3', '4', '5'];
    assert_eq!(seeds.len(), ReferenceSource::ALL.len());
    for (source, seed) in ReferenceSource::ALL.into_iter().zip(seeds) {
        let url = format!("/uploads/default/{}.png", seed);
        let id = insert_upload(&db.pool, &sha(seed), &url, 5).await;
        insert_reference(&db.pool, source, id, &url).await;
    }

    assert_eq!(candidate_ids(&repo, &criteria(1, &[])).await, vec![orphan]);
}

#[tokio::test]
async fn test_candidates_survive_extreme_hour_values() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };
    let repo = UploadRepository::new(db.pool.clone());

    let orphan = insert_upload(&db.pool, &sha('a'), "/uploads/default/a.png", 5).await;
    let kept_forever = insert_upload(&db.pool, &sha('b'), "/uploads/default/b.png", 5).await;
    let negative = insert_upload(&db.pool, &sha('c'), "/uploads/default/c.png", 5).await;
    sqlx::query("UPDATE uploads SET retain_hours = $2 WHERE id = $1")
        .bind(kept_forever)
        .bind(i32::MAX)
        .execute(&db.pool)
        .await
        .unwrap();
    sqlx::query("UPDATE uploads SET retain_hours = $2 WHERE id = $1")
        .bind(negative)
        .bind(i32::MIN)
        .execute(&db.pool)
        .await
        .unwrap();

    assert_eq!(
        candidate_ids(&repo, &criteria(1, &[])).await,
        vec![orphan, negative]
    );
    assert_eq!(
        candidate_ids(&repo, &criteria(i64::MAX, &[])).await,
        Vec::<i64>::new()
    );
}

#[tokio::test]
async fn test_candidates_honor_ignore_list_and_retention() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };
    let repo = UploadRepository::new(db.pool.clone());

    let logo = insert_upload(&db.pool, &sha('a'), "/uploads/default/logo.png", 5).await;
    let retained = insert_upload(&db.pool, &sha('b'), "/uploads/default/kept.png", 5).await;
    sqlx::query("UPDATE uploads SET retain_hours = 24 WHERE id = $1")
        .bind(retained)
        .execute(&db.pool)
        .await
        .unwrap();

    assert_eq!(
        candidate_ids(&repo, &criteria(1, &["/uploads/default/logo.png"])).await,
        Vec::<i64>::new()
    );
    assert_eq!(candidate_ids(&repo, &criteria(1, &[])).await, vec![logo]);
}

#[tokio::test]
async fn test_candidates_page_by_id() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };
    let repo = UploadRepository::new(db.pool.clone());

    let first = insert_upload(&db.pool, &sha('a'), "/uploads/default/1.png", 5).await;
    let second = insert_upload(&db.pool, &sha('b'), "/uploads/default/2.png", 5).await;
    let third = insert_upload(&db.pool, &sha('c'), "/uploads/default/3.png", 5).await;

    let criteria = criteria(1, &[]);
    let page = repo.find_orphan_candidates(&criteria, 0, 2).await.unwrap();
    assert_eq!(page.iter().map(|u| u.id).collect::<Vec<_>>(), vec![first, second]);

    let page = repo
        .find_orphan_candidates(&criteria, second, 2)
        .await
        .unwrap();
    assert_eq!(page.iter().map(|u| u.id).collect::<Vec<_>>(), vec![third]);
}

#[tokio::test]
async fn test_pending_hashes_and_delete() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };
    let repo = UploadRepository::new(db.pool.clone());

    let drafted = sha('a');
    let queued = sha('b');
    let free = sha('c');

    sqlx::query("INSERT INTO drafts (user_id, draft_key, data) VALUES (1, 'new_topic', $1)")
        .bind(format!("{{\"reply\":\"![img|upload://{}.png]\"}}", drafted))
        .execute(&db.pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO queued_posts (raw) VALUES ($1)")
        .bind(format!("look at /uploads/default/original/1X/{}.jpg", queued))
        .execute(&db.pool)
        .await
        .unwrap();

    let pending = repo
        .pending_content_hashes(&[drafted.clone(), queued.clone(), free.clone()])
        .await
        .unwrap();
    assert!(pending.contains(&drafted));
    assert!(pending.contains(&queued));
    assert!(!pending.contains(&free));

    let id = insert_upload(&db.pool, &free, "/uploads/default/free.png", 5).await;
    assert!(repo.delete_upload(id).await.unwrap());
    assert!(!repo.delete_upload(id).await.unwrap());
    assert!(repo.get_by_id(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_site_settings_load_with_defaults() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };
    let settings_repo = SiteSettingRepository::new(db.pool.clone());

    let settings = settings_repo.load().await.unwrap();
    assert_eq!(settings, ReaperSettings::default());

    settings_repo.upsert("clean_up_uploads", "f").await.unwrap();
    settings_repo
        .upsert("clean_orphan_uploads_grace_period_hours", "6")
        .await
        .unwrap();
    settings_repo
        .upsert("logo_url", "/uploads/default/logo.png")
        .await
        .unwrap();

    let settings = settings_repo.load().await.unwrap();
    assert!(!settings.clean_up_uploads);
    assert_eq!(settings.effective_grace_period_hours(), 6);

    let ignore = IgnoreList::build(&settings.branding_urls(), "/uploads/default", None).unwrap();
    assert!(ignore.contains("/uploads/default/logo.png"));
}
