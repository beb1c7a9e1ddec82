//! Periodic entry point of the sync controller.

use super::manager::DynodeSyncManager;
use super::progress::sync_progress;
use crate::error::SyncResult;
use crate::network::OutboundRequest;

impl DynodeSyncManager {
    /// Run one scheduler tick.
    ///
    /// Only every `ticks_per_cycle`-th call does any work. Nothing happens until
    /// the first chain tip is known.
    pub async fn tick(&mut self) -> SyncResult<()> {
        let tick = self.session.tick_count;
        self.session.tick_count += 1;
        if tick % self.config.ticks_per_cycle != 0 {
            return Ok(());
        }

        if self.session.known_tip_height.is_none() {
            tracing::trace!("No chain tip yet, skipping dynode sync tick");
            return Ok(());
        }

        // A long gap between ticks means the host was asleep. Start over.
        let wall_now = self.clock.wall_now();
        if let Some(last) = self.session.last_process_at {
            // A wall clock stepped backwards counts as no gap.
            let gap = (wall_now - last).to_std().unwrap_or_default();
            if gap > self.config.stale_threshold {
                tracing::warn!("No actions for {}s, restarting dynode sync", gap.as_secs());
                self.session.last_process_at = Some(wall_now);
                self.reset();
                return self.advance().await;
            }
        }
        self.session.last_process_at = Some(wall_now);

        let now = self.clock.now();

        if self.is_failed() {
            let cooled_down = self.session.last_failure_at.is_none_or(|failed_at| {
                now.saturating_duration_since(failed_at) > self.config.failure_cooldown
            });
            if cooled_down {
                tracing::warn!("Failed to sync dynode data, trying again");
                self.reset();
                self.advance().await?;
            }
            return Ok(());
        }

        if self.is_synced() {
            return self.reconcile_governance_votes().await;
        }

        let progress = sync_progress(
            self.session.current_asset,
            self.session.attempt_count,
            self.config.attempts_per_asset,
        );
        tracing::debug!(
            "Tick {} {} attempt {} progress {:.4}",
            self.session.tick_count,
            self.session.current_asset,
            self.session.attempt_count,
            progress
        );
        self.progress.publish(progress);

        let peers = self.peers.snapshot().await;
        self.canvass_peers(&peers).await
    }

    /// Keep pulling votes for announced objects once sync has finished.
    async fn reconcile_governance_votes(&mut self) -> SyncResult<()> {
        let peers = self.peers.snapshot().await;
        for peer in &peers {
            let plan = self.governance.plan_vote_requests(peer);
            if plan.objects.is_empty() {
                continue;
            }
            tracing::trace!("Requesting {} object votes from peer {}", plan.objects.len(), peer.id);
            self.requests.send_request(
                peer,
                OutboundRequest::GovernanceVotes {
                    objects: plan.objects,
                },
            )?;
        }
        Ok(())
    }
}
