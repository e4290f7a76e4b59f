use chrono::Duration;

use crate::clock::Clock;
use crate::config::SettingsRepo;
use crate::queue::model::QueueStatus;
use crate::queue::repo::QueueRepo;

/// First N posts require a manual approve before any auto-approval layer
/// may be added on top.
pub const HUMAN_APPROVAL_THRESHOLD: i64 = 10;

/// Pause all publishing after this many failures in a row.
pub const MAX_CONSECUTIVE_FAILURES: i64 = 3;

/// Read-only predicate layer deciding whether any publish may proceed right
/// now. Holds no state of its own: every check re-reads the queue store, so
/// operator actions between two invocations are always observed.
pub struct SafetyGate<C: Clock> {
    repo: QueueRepo,
    settings: SettingsRepo,
    clock: C,
}

impl<C: Clock> SafetyGate<C> {
    pub fn new(repo: QueueRepo, settings: SettingsRepo, clock: C) -> Self {
        Self {
            repo,
            settings,
            clock,
        }
    }

    /// True if the failure streak has NOT tripped the circuit breaker.
    ///
    /// The breaker looks at the last `MAX_CONSECUTIVE_FAILURES` row updates
    /// across the whole queue, regardless of platform.
    pub async fn check_consecutive_failures(&self) -> anyhow::Result<bool> {
        let recent = self.repo.recent_statuses(MAX_CONSECUTIVE_FAILURES).await?;
        if (recent.len() as i64) < MAX_CONSECUTIVE_FAILURES {
            return Ok(true);
        }
        Ok(!recent.iter().all(|st| *st == QueueStatus::Failed))
    }

    /// True if enough time has passed since the last published post. The
    /// first-ever publish always passes.
    pub async fn check_min_interval(&self) -> anyhow::Result<bool> {
        let min_hours = self.min_hours_between_posts().await?;

        let last = match self.repo.last_published_at().await? {
            Some(ts) => ts,
            None => return Ok(true),
        };

        let cutoff = last + Duration::seconds((min_hours * 3600.0) as i64);
        Ok(self.clock.now() >= cutoff)
    }

    pub async fn min_hours_between_posts(&self) -> anyhow::Result<f64> {
        self.settings
            .get_f64("publishing.min_hours_between_posts", 4.0)
            .await
    }

    /// Advisory: true while the lifetime published count is below the
    /// manual-approval threshold. Does not block the processor.
    pub async fn needs_human_approval(&self) -> anyhow::Result<bool> {
        let published = self.repo.published_count().await?;
        Ok(published < HUMAN_APPROVAL_THRESHOLD)
    }

    /// Run all safety checks. Returns `(ok, reason)`; a closed gate is a
    /// normal outcome, never an error.
    pub async fn can_publish(&self) -> anyhow::Result<(bool, String)> {
        if !self.check_consecutive_failures().await? {
            tracing::warn!("publishing paused by consecutive-failure breaker");
            return Ok((
                false,
                format!(
                    "Paused: {MAX_CONSECUTIVE_FAILURES} consecutive failures. \
                     Review errors before continuing."
                ),
            ));
        }

        if !self.check_min_interval().await? {
            let min_hours = self.min_hours_between_posts().await?;
            return Ok((
                false,
                format!("Too soon: must wait {min_hours}h between posts."),
            ));
        }

        Ok((true, "OK".to_string()))
    }
}
