mod common;

use chrono::Duration;

use common::{seed_videos, setup_db, t0};
use versecast::queue::{QueueRepo, QueueStatus};

#[tokio::test]
async fn enqueue_creates_pending_item() {
    let pool = setup_db().await;
    let vids = seed_videos(&pool, 1, t0()).await;
    let repo = QueueRepo::new(pool);

    let id = repo
        .enqueue(vids[0], "tiktok", t0() + Duration::hours(2), t0())
        .await
        .unwrap();
    assert!(id > 0);

    let item = repo.get(id).await.unwrap().expect("item exists");
    assert_eq!(item.video_id, vids[0]);
    assert_eq!(item.status, QueueStatus::Pending);
    assert_eq!(item.retry_count, 0);
    assert!(item.published_at.is_none());
    assert!(item.external_post_id.is_none());
    assert!(item.error_message.is_none());
}

#[tokio::test]
async fn approve_succeeds_only_from_pending() {
    let pool = setup_db().await;
    let vids = seed_videos(&pool, 1, t0()).await;
    let repo = QueueRepo::new(pool);

    let id = repo.enqueue(vids[0], "tiktok", t0(), t0()).await.unwrap();

    assert!(repo.approve(id, t0()).await.unwrap());
    let item = repo.get(id).await.unwrap().unwrap();
    assert_eq!(item.status, QueueStatus::Approved);

    // Second approve is a no-op returning false, not an error.
    assert!(!repo.approve(id, t0()).await.unwrap());
    let item = repo.get(id).await.unwrap().unwrap();
    assert_eq!(item.status, QueueStatus::Approved);
}

#[tokio::test]
async fn approve_unknown_item_returns_false() {
    let pool = setup_db().await;
    let repo = QueueRepo::new(pool);

    assert!(!repo.approve(999, t0()).await.unwrap());
}

#[tokio::test]
async fn due_items_are_approved_past_schedule_oldest_first() {
    let pool = setup_db().await;
    let vids = seed_videos(&pool, 3, t0()).await;
    let repo = QueueRepo::new(pool);

    let overdue = repo
        .enqueue(vids[0], "tiktok", t0() - Duration::hours(1), t0())
        .await
        .unwrap();
    let older = repo
        .enqueue(vids[1], "tiktok", t0() - Duration::hours(3), t0())
        .await
        .unwrap();
    let future = repo
        .enqueue(vids[2], "tiktok", t0() + Duration::hours(1), t0())
        .await
        .unwrap();

    for id in [overdue, older, future] {
        assert!(repo.approve(id, t0()).await.unwrap());
    }

    let due = repo.due_items(t0()).await.unwrap();
    let ids: Vec<i64> = due.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![older, overdue], "oldest-due first, future excluded");
}

#[tokio::test]
async fn due_items_exclude_pending_rows() {
    let pool = setup_db().await;
    let vids = seed_videos(&pool, 1, t0()).await;
    let repo = QueueRepo::new(pool);

    repo.enqueue(vids[0], "tiktok", t0() - Duration::hours(1), t0())
        .await
        .unwrap();

    assert!(repo.due_items(t0()).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_filters_by_status() {
    let pool = setup_db().await;
    let vids = seed_videos(&pool, 2, t0()).await;
    let repo = QueueRepo::new(pool);

    let a = repo.enqueue(vids[0], "tiktok", t0(), t0()).await.unwrap();
    let b = repo.enqueue(vids[1], "tiktok", t0(), t0()).await.unwrap();
    assert!(repo.approve(b, t0()).await.unwrap());

    let pending = repo.list(Some(QueueStatus::Pending), 50).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, a);

    let approved = repo.list(Some(QueueStatus::Approved), 50).await.unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id, b);

    let all = repo.list(None, 50).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn mark_uploading_requires_approved() {
    let pool = setup_db().await;
    let vids = seed_videos(&pool, 1, t0()).await;
    let repo = QueueRepo::new(pool);

    let id = repo.enqueue(vids[0], "tiktok", t0(), t0()).await.unwrap();
    assert!(!repo.mark_uploading(id, t0()).await.unwrap());

    assert!(repo.approve(id, t0()).await.unwrap());
    assert!(repo.mark_uploading(id, t0()).await.unwrap());
    assert!(!repo.mark_uploading(id, t0()).await.unwrap());
}

#[tokio::test]
async fn publish_and_fail_transitions_update_bookkeeping() {
    let pool = setup_db().await;
    let vids = seed_videos(&pool, 2, t0()).await;
    let repo = QueueRepo::new(pool);

    // Success path sets published_at + post id.
    let ok = repo.enqueue(vids[0], "tiktok", t0(), t0()).await.unwrap();
    repo.approve(ok, t0()).await.unwrap();
    repo.mark_uploading(ok, t0()).await.unwrap();
    assert!(repo
        .mark_published(ok, "post-123", t0() + Duration::minutes(1))
        .await
        .unwrap());

    let item = repo.get(ok).await.unwrap().unwrap();
    assert_eq!(item.status, QueueStatus::Published);
    assert_eq!(item.external_post_id.as_deref(), Some("post-123"));
    assert_eq!(item.published_at, Some(t0() + Duration::minutes(1)));
    assert!(item.error_message.is_none());

    // Failure path bumps retry_count and keeps published_at unset.
    let bad = repo.enqueue(vids[1], "tiktok", t0(), t0()).await.unwrap();
    repo.approve(bad, t0()).await.unwrap();
    repo.mark_uploading(bad, t0()).await.unwrap();
    assert!(repo.mark_failed(bad, "network down", t0()).await.unwrap());

    let item = repo.get(bad).await.unwrap().unwrap();
    assert_eq!(item.status, QueueStatus::Failed);
    assert_eq!(item.retry_count, 1);
    assert_eq!(item.error_message.as_deref(), Some("network down"));
    assert!(item.published_at.is_none());

    // Terminal: failed rows don't transition again.
    assert!(!repo.mark_uploading(bad, t0()).await.unwrap());
    assert!(!repo.mark_failed(bad, "again", t0()).await.unwrap());
}

#[tokio::test]
async fn failure_messages_are_truncated_to_bound() {
    let pool = setup_db().await;
    let vids = seed_videos(&pool, 1, t0()).await;
    let repo = QueueRepo::new(pool);

    let id = repo.enqueue(vids[0], "tiktok", t0(), t0()).await.unwrap();
    repo.approve(id, t0()).await.unwrap();
    repo.mark_uploading(id, t0()).await.unwrap();

    let long = "x".repeat(900);
    repo.mark_failed(id, &long, t0()).await.unwrap();

    let item = repo.get(id).await.unwrap().unwrap();
    assert_eq!(item.error_message.unwrap().chars().count(), 500);
}
