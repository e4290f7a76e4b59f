use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::queue::model::{QueueItem, QueueStatus};

/// Longest error text stored on a queue row.
pub const MAX_ERROR_MESSAGE_CHARS: usize = 500;

#[derive(Clone)]
pub struct QueueRepo {
    pool: SqlitePool,
}

impl QueueRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ----------------------------
    // Enqueue
    // ----------------------------

    /// Insert a new pending item. Returns the queue row id.
    pub async fn enqueue(
        &self,
        video_id: i64,
        platform: &str,
        scheduled_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO publish_queue
                (video_id, platform, scheduled_at, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING id
            "#,
        )
        .bind(video_id)
        .bind(platform)
        .bind(scheduled_at)
        .bind(QueueStatus::Pending)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    // ----------------------------
    // Reads
    // ----------------------------

    pub async fn get(&self, queue_id: i64) -> anyhow::Result<Option<QueueItem>> {
        let item = sqlx::query_as::<_, QueueItem>("SELECT * FROM publish_queue WHERE id = ?1")
            .bind(queue_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    pub async fn list(
        &self,
        status: Option<QueueStatus>,
        limit: i64,
    ) -> anyhow::Result<Vec<QueueItem>> {
        let limit = limit.clamp(1, 500);

        let rows = match status {
            Some(st) => {
                sqlx::query_as::<_, QueueItem>(
                    r#"
                    SELECT * FROM publish_queue
                    WHERE status = ?1
                    ORDER BY scheduled_at ASC
                    LIMIT ?2
                    "#,
                )
                .bind(st)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, QueueItem>(
                    r#"
                    SELECT * FROM publish_queue
                    ORDER BY scheduled_at ASC
                    LIMIT ?1
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    /// Items eligible for processing: approved and past their scheduled time,
    /// oldest-due first.
    pub async fn due_items(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<QueueItem>> {
        let rows = sqlx::query_as::<_, QueueItem>(
            r#"
            SELECT * FROM publish_queue
            WHERE status = ?1
              AND scheduled_at <= ?2
            ORDER BY scheduled_at ASC
            "#,
        )
        .bind(QueueStatus::Approved)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Statuses of the most recent `limit` row updates across the whole
    /// queue, newest first. Re-read from the store on every call.
    pub async fn recent_statuses(&self, limit: i64) -> anyhow::Result<Vec<QueueStatus>> {
        let rows: Vec<QueueStatus> = sqlx::query_scalar(
            r#"
            SELECT status FROM publish_queue
            ORDER BY updated_at DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// `published_at` of the most recently published item, if any.
    pub async fn last_published_at(&self) -> anyhow::Result<Option<DateTime<Utc>>> {
        let row: Option<Option<DateTime<Utc>>> = sqlx::query_scalar(
            r#"
            SELECT published_at FROM publish_queue
            WHERE status = ?1
            ORDER BY published_at DESC
            LIMIT 1
            "#,
        )
        .bind(QueueStatus::Published)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.flatten())
    }

    /// Lifetime count of published items.
    pub async fn published_count(&self) -> anyhow::Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM publish_queue WHERE status = ?1")
                .bind(QueueStatus::Published)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    // ----------------------------
    // State transitions
    // ----------------------------
    //
    // Each transition is a single conditional UPDATE keyed on the expected
    // prior status, so a concurrent operator action and a processor run
    // cannot both win the same transition.

    /// pending -> approved. Returns false if the item was not pending (or
    /// does not exist).
    pub async fn approve(&self, queue_id: i64, now: DateTime<Utc>) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE publish_queue
            SET status = ?1, updated_at = ?2
            WHERE id = ?3 AND status = ?4
            "#,
        )
        .bind(QueueStatus::Approved)
        .bind(now)
        .bind(queue_id)
        .bind(QueueStatus::Pending)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }

    /// approved -> uploading.
    pub async fn mark_uploading(&self, queue_id: i64, now: DateTime<Utc>) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE publish_queue
            SET status = ?1, updated_at = ?2
            WHERE id = ?3 AND status = ?4
            "#,
        )
        .bind(QueueStatus::Uploading)
        .bind(now)
        .bind(queue_id)
        .bind(QueueStatus::Approved)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }

    /// uploading -> published. Records the platform post id and clears any
    /// error text from an earlier attempt.
    pub async fn mark_published(
        &self,
        queue_id: i64,
        external_post_id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE publish_queue
            SET status = ?1,
                published_at = ?2,
                external_post_id = ?3,
                error_message = NULL,
                updated_at = ?2
            WHERE id = ?4 AND status = ?5
            "#,
        )
        .bind(QueueStatus::Published)
        .bind(now)
        .bind(external_post_id)
        .bind(queue_id)
        .bind(QueueStatus::Uploading)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }

    /// Any non-terminal state -> failed. Stores a bounded error message and
    /// bumps `retry_count`. `failed` is terminal: re-attempts go through a
    /// fresh `enqueue`, never by resurrecting this row.
    pub async fn mark_failed(
        &self,
        queue_id: i64,
        error_message: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let message = truncate_chars(error_message, MAX_ERROR_MESSAGE_CHARS);

        let res = sqlx::query(
            r#"
            UPDATE publish_queue
            SET status = ?1,
                error_message = ?2,
                retry_count = retry_count + 1,
                updated_at = ?3
            WHERE id = ?4 AND status IN (?5, ?6)
            "#,
        )
        .bind(QueueStatus::Failed)
        .bind(message)
        .bind(now)
        .bind(queue_id)
        .bind(QueueStatus::Approved)
        .bind(QueueStatus::Uploading)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }
}

pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
