#![allow(dead_code)] // each test binary uses a different slice of this harness

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use versecast::clock::Clock;
use versecast::content::ContentRepo;
use versecast::publish::{PublishReceipt, Publisher};
use versecast::queue::QueueStatus;

/// Fresh in-memory database per test. A single pooled connection keeps the
/// `:memory:` database alive for the pool's lifetime.
pub async fn setup_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory sqlite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations failed");

    pool
}

/// A deterministic moment for tests that pin "now".
#[allow(dead_code)]
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

/// Settable clock shared between the harness and the code under test.
#[derive(Clone)]
pub struct TestClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

#[allow(dead_code)]
impl TestClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = self.now.lock().unwrap();
        *guard += delta;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Minimal content chain: theme -> verse -> prayer -> n videos. Returns the
/// video ids.
#[allow(dead_code)]
pub async fn seed_videos(pool: &SqlitePool, n: usize, now: DateTime<Utc>) -> Vec<i64> {
    let content = ContentRepo::new(pool.clone());

    let theme_id = content
        .insert_theme("losing-loved-one", "Losing a Loved One", "comforting", now)
        .await
        .expect("insert theme");
    let verse_id = content
        .insert_verse("Psalm 34:18", "The Lord is near to the brokenhearted.", theme_id, now)
        .await
        .expect("insert verse");
    let prayer_id = content
        .insert_prayer(verse_id, theme_id, "Lord, draw near to every grieving heart today.", now)
        .await
        .expect("insert prayer");

    let mut video_ids = Vec::with_capacity(n);
    for i in 0..n {
        let id = content
            .insert_video(prayer_id, &format!("/tmp/v{i}.mp4"), 65.0, now)
            .await
            .expect("insert video");
        video_ids.push(id);
    }
    video_ids
}

/// Insert a queue row directly with an arbitrary status and timestamps,
/// bypassing the state machine, for seeding history.
#[allow(dead_code)]
pub async fn insert_queue_row(
    pool: &SqlitePool,
    video_id: i64,
    status: QueueStatus,
    scheduled_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO publish_queue
            (video_id, platform, scheduled_at, status, published_at, created_at, updated_at)
        VALUES (?1, 'tiktok', ?2, ?3, ?4, ?5, ?5)
        RETURNING id
        "#,
    )
    .bind(video_id)
    .bind(scheduled_at)
    .bind(status)
    .bind(published_at)
    .bind(updated_at)
    .fetch_one(pool)
    .await
    .expect("failed to insert queue row")
}

/// Scripted publisher: either hands back a post id or fails with a fixed
/// message. Records every call it receives.
#[derive(Clone)]
pub struct StubPublisher {
    outcome: Arc<Mutex<Result<String, String>>>,
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
}

#[allow(dead_code)]
impl StubPublisher {
    pub fn succeeding(post_id: &str) -> Self {
        Self {
            outcome: Arc::new(Mutex::new(Ok(post_id.to_string()))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Arc::new(Mutex::new(Err(message.to_string()))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Publisher for StubPublisher {
    async fn publish(&self, file_path: &str, caption: &str) -> anyhow::Result<PublishReceipt> {
        self.calls
            .lock()
            .unwrap()
            .push((file_path.to_string(), caption.to_string()));

        match self.outcome.lock().unwrap().clone() {
            Ok(post_id) => Ok(PublishReceipt {
                external_post_id: post_id,
            }),
            Err(message) => Err(anyhow::anyhow!(message)),
        }
    }
}
