use crate::clock::Clock;
use crate::config::SettingsRepo;
use crate::content::VideoResolver;
use crate::publish::{build_caption, Publisher};
use crate::queue::gate::SafetyGate;
use crate::queue::model::{ProcessResult, ProcessStatus};
use crate::queue::repo::{truncate_chars, QueueRepo};

/// Longest failure text echoed in a per-item result.
const MAX_RESULT_DETAIL_CHARS: usize = 200;

/// Pulls due approved items, re-checks the gate, performs the external
/// publish, and records every outcome. One invocation per cron tick; no
/// state is held between invocations.
pub struct QueueProcessor<C: Clock + Clone, R: VideoResolver, P: Publisher> {
    repo: QueueRepo,
    gate: SafetyGate<C>,
    settings: SettingsRepo,
    resolver: R,
    publisher: P,
    clock: C,
}

impl<C: Clock + Clone, R: VideoResolver, P: Publisher> QueueProcessor<C, R, P> {
    pub fn new(
        repo: QueueRepo,
        settings: SettingsRepo,
        resolver: R,
        publisher: P,
        clock: C,
    ) -> Self {
        let gate = SafetyGate::new(repo.clone(), settings.clone(), clock.clone());
        Self {
            repo,
            gate,
            settings,
            resolver,
            publisher,
            clock,
        }
    }

    pub fn gate(&self) -> &SafetyGate<C> {
        &self.gate
    }

    /// Process due items oldest-first. Always returns one outcome per item
    /// considered (or a single blocked/empty marker); infrastructure
    /// failures are the only errors that propagate.
    pub async fn process_queue(&self, dry_run: bool) -> anyhow::Result<Vec<ProcessResult>> {
        // The breaker is evaluated once per batch; the interval check is
        // re-evaluated per item below, because a publish earlier in this
        // same batch moves the cutoff forward.
        let (ok, reason) = self.gate.can_publish().await?;
        if !ok {
            return Ok(vec![ProcessResult::batch(ProcessStatus::Blocked, reason)]);
        }

        let due = self.repo.due_items(self.clock.now()).await?;
        if due.is_empty() {
            return Ok(vec![ProcessResult::batch(
                ProcessStatus::Empty,
                "No due items.",
            )]);
        }

        let mut results = Vec::with_capacity(due.len());

        for item in due {
            if !self.gate.check_min_interval().await? {
                // Stop, don't skip: later items stay approved untouched and
                // will be picked up by the next invocation.
                results.push(ProcessResult::item(
                    item.id,
                    ProcessStatus::Skipped,
                    "Min interval not met.",
                ));
                break;
            }

            let resolved = match self.resolver.resolve(item.video_id).await? {
                Some(r) => r,
                None => {
                    self.repo
                        .mark_failed(item.id, "Video record not found.", self.clock.now())
                        .await?;
                    tracing::warn!(queue_id = item.id, video_id = item.video_id, "video missing");
                    results.push(ProcessResult::item(
                        item.id,
                        ProcessStatus::Failed,
                        "Video not found.",
                    ));
                    continue;
                }
            };

            let caption = build_caption(
                &self.settings,
                &resolved.verse_reference,
                &resolved.theme_name,
            )
            .await?;

            if dry_run {
                results.push(ProcessResult::item(
                    item.id,
                    ProcessStatus::DryRun,
                    format!(
                        "would publish {} ({})",
                        resolved.file_path, resolved.verse_reference
                    ),
                ));
                continue;
            }

            if !self
                .repo
                .mark_uploading(item.id, self.clock.now())
                .await?
            {
                // Someone moved the item off `approved` under us.
                results.push(ProcessResult::item(
                    item.id,
                    ProcessStatus::Skipped,
                    "Item no longer approved.",
                ));
                continue;
            }

            match self
                .publisher
                .publish(&resolved.file_path, &caption)
                .await
            {
                Ok(receipt) => {
                    self.repo
                        .mark_published(item.id, &receipt.external_post_id, self.clock.now())
                        .await?;
                    tracing::info!(
                        queue_id = item.id,
                        post_id = %receipt.external_post_id,
                        "published"
                    );
                    results.push(ProcessResult::item(
                        item.id,
                        ProcessStatus::Published,
                        receipt.external_post_id,
                    ));
                }
                Err(err) => {
                    let message = format!("{err:#}");
                    self.repo
                        .mark_failed(item.id, &message, self.clock.now())
                        .await?;
                    tracing::warn!(queue_id = item.id, error = %message, "publish failed");
                    results.push(ProcessResult::item(
                        item.id,
                        ProcessStatus::Failed,
                        truncate_chars(&message, MAX_RESULT_DETAIL_CHARS),
                    ));
                }
            }
        }

        Ok(results)
    }
}
