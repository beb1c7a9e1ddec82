use super::asset::SyncAsset;
use super::manager::DynodeSyncManager;
use crate::error::SyncResult;
use crate::network::InboundMessage;
use crate::types::ChainTip;

impl DynodeSyncManager {
    /// React to a new best block.
    ///
    /// Leaving initial block download moves the session out of `Initial`, once
    /// per session. Every tip while syncing pushes out the asset timeout, since
    /// slow progress may be block processing rather than a stall.
    pub async fn on_new_tip(&mut self, tip: ChainTip) -> SyncResult<()> {
        self.session.known_tip_height = Some(tip.height);
        tracing::debug!(
            "New tip at height {} (initial download: {})",
            tip.height,
            tip.initial_download
        );

        // Wait for the cooldown reset in the tick driver.
        if self.is_failed() {
            return Ok(());
        }

        if !tip.initial_download && self.session.current_asset == SyncAsset::Initial {
            self.advance().await?;
        }

        if !self.is_synced() {
            self.bump_progress("new tip");
        }
        Ok(())
    }

    /// Peers report inventory counts; these are only logged.
    pub fn handle_inbound(&self, message: InboundMessage) {
        if self.is_synced() || self.is_failed() {
            return;
        }
        tracing::info!(
            "Sync status count from {}: item {} count {}",
            message.peer,
            message.status.item_id,
            message.status.count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::network::SyncStatusCount;
    use crate::test_utils::TestHarness;
    use std::time::Duration;

    fn tip(height: u32, initial_download: bool) -> ChainTip {
        ChainTip {
            height,
            initial_download,
        }
    }

    #[tokio::test]
    async fn test_stays_initial_during_initial_download() {
        let mut harness = TestHarness::new(SyncConfig::testnet());
        harness.manager.on_new_tip(tip(5, true)).await.unwrap();

        assert_eq!(harness.manager.current_asset(), SyncAsset::Initial);
        assert_eq!(harness.manager.session.known_tip_height(), Some(5));
    }

    #[tokio::test]
    async fn test_leaves_initial_once() {
        let mut harness = TestHarness::new(SyncConfig::testnet());
        harness.manager.on_new_tip(tip(5, false)).await.unwrap();
        assert_eq!(harness.manager.current_asset(), SyncAsset::NodeDirectory);

        harness.manager.on_new_tip(tip(6, false)).await.unwrap();
        assert_eq!(harness.manager.current_asset(), SyncAsset::NodeDirectory);
    }

    #[tokio::test]
    async fn test_tip_bumps_timeout() {
        let mut harness = TestHarness::new(SyncConfig::testnet());
        harness.manager.on_new_tip(tip(5, false)).await.unwrap();

        harness.clock.advance(Duration::from_secs(25));
        harness.manager.on_new_tip(tip(6, false)).await.unwrap();

        assert_eq!(harness.manager.session.last_progress_at, Some(harness.clock_now()));
    }

    #[tokio::test]
    async fn test_failed_session_only_records_tip() {
        let mut harness = TestHarness::new(SyncConfig::testnet());
        harness.manager.fail();

        harness.manager.on_new_tip(tip(9, false)).await.unwrap();

        assert!(harness.manager.is_failed());
        assert_eq!(harness.manager.session.known_tip_height(), Some(9));
        assert!(harness.manager.session.last_progress_at.is_none());
    }

    #[tokio::test]
    async fn test_status_count_changes_nothing() {
        let mut harness = TestHarness::new(SyncConfig::testnet());
        harness.manager.on_new_tip(tip(5, false)).await.unwrap();
        let before = harness.manager.status();

        harness.manager.handle_inbound(InboundMessage {
            peer: "10.0.0.1:33300".parse().unwrap(),
            status: SyncStatusCount {
                item_id: 2,
                count: 150,
            },
        });

        assert_eq!(harness.manager.status(), before);
    }
}
