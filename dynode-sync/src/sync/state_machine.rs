//! Legal transitions of the sync session.

use super::asset::SyncAsset;
use super::events::SyncEvent;
use super::manager::DynodeSyncManager;
use crate::error::{SyncError, SyncResult};
use crate::network::RequestTag;

impl DynodeSyncManager {
    /// Start over from `Initial`.
    pub fn reset(&mut self) {
        let now = self.clock.now();
        self.session.reset(now);
        tracing::debug!("Dynode sync reset to {}", self.session.current_asset);
        self.events.emit(SyncEvent::Reset);
    }

    /// Give up on the current asset until the failure cooldown has passed.
    ///
    /// A finished session stays finished.
    pub fn fail(&mut self) {
        let asset = self.session.current_asset;
        if asset == SyncAsset::Finished {
            tracing::warn!("Ignoring failure report, dynode sync already finished");
            return;
        }
        let now = self.clock.now();
        self.session.fail(now);
        tracing::error!("Failed to sync {}", asset);
        self.events.emit(SyncEvent::Failed {
            asset,
        });
    }

    /// Move to the next asset.
    ///
    /// Leaving `Initial` clears every peer's ledger markers. Reaching `Finished`
    /// publishes full progress and marks every connected peer as fully synced.
    /// Fails with [`SyncError::InvalidTransition`] from `Failed`; reset first.
    pub async fn advance(&mut self) -> SyncResult<()> {
        let from = self.session.current_asset;
        let now = self.clock.now();

        let next = match from {
            SyncAsset::Failed => {
                return Err(SyncError::InvalidTransition {
                    from,
                });
            }
            SyncAsset::Finished => {
                tracing::debug!("Dynode sync already finished, nothing to advance");
                return Ok(());
            }
            SyncAsset::Initial => {
                self.clear_peer_ledger_entries().await;
                SyncAsset::NodeDirectory
            }
            asset => {
                let elapsed = self.session.asset_elapsed(now);
                tracing::info!("Completed {} in {}s", asset, elapsed.as_secs());
                self.events.emit(SyncEvent::AssetCompleted {
                    asset,
                    elapsed,
                });
                asset.next().ok_or_else(|| {
                    SyncError::InvalidState(format!("{} has no successor", asset))
                })?
            }
        };

        self.session.enter(next, now);

        if next == SyncAsset::Finished {
            self.progress.publish(1.0);
            for peer in self.peers.snapshot().await {
                self.ledger.add_fulfilled(peer.address, RequestTag::FullSync).await;
            }
            tracing::info!("Dynode sync has finished");
            self.events.emit(SyncEvent::Finished);
        } else {
            tracing::info!("Starting {}", next);
            self.events.emit(SyncEvent::AssetStarted {
                asset: next,
            });
        }
        Ok(())
    }

    /// Push out the asset timeout. Ignored once synced or failed.
    pub fn bump_progress(&mut self, reason: &str) {
        let now = self.clock.now();
        if self.session.bump(now) {
            tracing::trace!("Bumped {} progress: {}", self.session.current_asset, reason);
        }
    }

    /// Forget every request marker for the connected peers.
    pub async fn clear_peer_ledger_entries(&self) {
        let peers = self.peers.snapshot().await;
        for peer in &peers {
            for tag in RequestTag::ALL {
                self.ledger.remove_fulfilled(peer.address, tag).await;
            }
        }
        tracing::debug!("Cleared request markers for {} peers", peers.len());
    }

    /// Jump straight to `Finished` without touching the ledger.
    pub(super) fn finish_deterministic(&mut self) {
        let now = self.clock.now();
        self.session.enter(SyncAsset::Finished, now);
        self.progress.publish(1.0);
        tracing::info!("Dynode sync finished in quick mode");
        self.events.emit(SyncEvent::Finished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::network::PeerRequestLedger;
    use crate::test_utils::{TestHarness, test_peer};
    use std::time::Duration;

    fn harness() -> TestHarness {
        TestHarness::new(SyncConfig::testnet())
    }

    #[tokio::test]
    async fn test_advance_walks_the_full_order() {
        let mut harness = harness();
        let expected = [
            SyncAsset::NodeDirectory,
            SyncAsset::PaymentVotes,
            SyncAsset::Governance,
            SyncAsset::Finished,
        ];
        for asset in expected {
            harness.manager.session.record_attempt();
            harness.manager.advance().await.unwrap();
            assert_eq!(harness.manager.current_asset(), asset);
            assert_eq!(harness.manager.session.attempt_count(), 0);
        }
        assert!(harness.manager.is_synced());
    }

    #[tokio::test]
    async fn test_advance_from_failed_is_rejected() {
        let mut harness = harness();
        harness.manager.advance().await.unwrap();
        harness.manager.fail();

        let err = harness.manager.advance().await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(harness.manager.current_asset(), SyncAsset::Failed);

        harness.manager.reset();
        assert_eq!(harness.manager.current_asset(), SyncAsset::Initial);
        harness.manager.advance().await.unwrap();
        assert_eq!(harness.manager.current_asset(), SyncAsset::NodeDirectory);
    }

    #[tokio::test]
    async fn test_advance_from_finished_is_noop() {
        let mut harness = harness();
        for _ in 0..4 {
            harness.manager.advance().await.unwrap();
        }
        harness.manager.advance().await.unwrap();
        assert_eq!(harness.manager.current_asset(), SyncAsset::Finished);
    }

    #[tokio::test]
    async fn test_leaving_initial_clears_ledger() {
        let mut harness = harness();
        let peer = test_peer(1, 70900);
        harness.peers.insert(peer.clone()).await;
        for tag in RequestTag::ALL {
            harness.ledger.add_fulfilled(peer.address, tag).await;
        }

        harness.manager.advance().await.unwrap();

        for tag in RequestTag::ALL {
            assert!(!harness.ledger.has_fulfilled(peer.address, tag).await, "{} kept", tag);
        }
    }

    #[tokio::test]
    async fn test_finishing_marks_peers_and_publishes_full_progress() {
        let mut harness = harness();
        let peer = test_peer(1, 70900);
        harness.peers.insert(peer.clone()).await;
        for _ in 0..3 {
            harness.manager.advance().await.unwrap();
        }
        assert!(!harness.ledger.has_fulfilled(peer.address, RequestTag::FullSync).await);

        harness.manager.advance().await.unwrap();

        assert!(harness.ledger.has_fulfilled(peer.address, RequestTag::FullSync).await);
        assert_eq!(harness.progress.last(), Some(1.0));
    }

    #[tokio::test]
    async fn test_transitions_are_broadcast() {
        let mut harness = harness();
        harness.manager.advance().await.unwrap();
        harness.clock.advance(Duration::from_secs(7));
        harness.manager.advance().await.unwrap();
        harness.manager.fail();
        harness.manager.reset();

        let events: Vec<_> = std::iter::from_fn(|| harness.events.try_recv()).collect();
        assert_eq!(
            events,
            vec![
                SyncEvent::AssetStarted {
                    asset: SyncAsset::NodeDirectory
                },
                SyncEvent::AssetCompleted {
                    asset: SyncAsset::NodeDirectory,
                    elapsed: Duration::from_secs(7)
                },
                SyncEvent::AssetStarted {
                    asset: SyncAsset::PaymentVotes
                },
                SyncEvent::Failed {
                    asset: SyncAsset::PaymentVotes
                },
                SyncEvent::Reset,
            ]
        );
    }

    #[tokio::test]
    async fn test_bump_progress_is_idempotent_for_state() {
        let mut harness = harness();
        harness.manager.advance().await.unwrap();
        harness.manager.session.record_attempt();

        for _ in 0..5 {
            harness.clock.advance(Duration::from_secs(1));
            harness.manager.bump_progress("test");
        }

        assert_eq!(harness.manager.current_asset(), SyncAsset::NodeDirectory);
        assert_eq!(harness.manager.session.attempt_count(), 1);
        assert_eq!(harness.manager.session.last_progress_at, Some(harness.clock_now()));
    }

    #[tokio::test]
    async fn test_fail_records_failure_time() {
        let mut harness = harness();
        harness.manager.advance().await.unwrap();
        harness.manager.session.record_attempt();
        harness.manager.fail();

        assert!(harness.manager.is_failed());
        assert_eq!(harness.manager.session.attempt_count(), 0);
        assert_eq!(harness.manager.session.last_failure_at(), Some(harness.clock_now()));
    }

    #[tokio::test]
    async fn test_fail_after_finish_is_ignored() {
        let mut harness = harness();
        for _ in 0..4 {
            harness.manager.advance().await.unwrap();
        }
        while harness.events.try_recv().is_some() {}

        harness.manager.fail();

        assert!(harness.manager.is_synced());
        assert!(harness.manager.session.last_failure_at().is_none());
        assert_eq!(harness.events.try_recv(), None);
    }
}
