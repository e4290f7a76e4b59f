use chrono::{DateTime, Utc};
use serde::Serialize;

/// One scheduled publish attempt. Retained forever as an audit trail; the
/// core never deletes rows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QueueItem {
    pub id: i64,
    pub video_id: i64,
    pub platform: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: QueueStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub external_post_id: Option<String>,
    pub error_message: Option<String>,
    pub retry_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Approved,
    Uploading,
    Published,
    Failed,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Approved => "approved",
            QueueStatus::Uploading => "uploading",
            QueueStatus::Published => "published",
            QueueStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(QueueStatus::Pending),
            "approved" => Some(QueueStatus::Approved),
            "uploading" => Some(QueueStatus::Uploading),
            "published" => Some(QueueStatus::Published),
            "failed" => Some(QueueStatus::Failed),
            _ => None,
        }
    }
}

/// Per-item outcome of one `process_queue` invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub queue_id: Option<i64>,
    pub status: ProcessStatus,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Blocked,
    Empty,
    Skipped,
    DryRun,
    Published,
    Failed,
}

impl ProcessResult {
    pub fn batch(status: ProcessStatus, detail: impl Into<String>) -> Self {
        Self {
            queue_id: None,
            status,
            detail: detail.into(),
        }
    }

    pub fn item(queue_id: i64, status: ProcessStatus, detail: impl Into<String>) -> Self {
        Self {
            queue_id: Some(queue_id),
            status,
            detail: detail.into(),
        }
    }
}
