//! The dynode sync controller.

use std::sync::Arc;

use super::asset::SyncAsset;
use super::events::SyncEvent;
use super::progress::{ProgressReporter, ProgressSink};
use super::session::SyncSession;
use super::status::SyncStatus;
use crate::clock::Clock;
use crate::config::SyncConfig;
use crate::datasets::{DynodeList, GovernanceStore, PaymentVotes};
use crate::error::{DynodeSyncError, Result};
use crate::event_bus::{EventBus, EventReceiver};
use crate::network::{ConnectedPeers, PeerRequestLedger, RequestSender};

/// External components the controller consults.
pub struct SyncCollaborators {
    pub peers: Arc<dyn ConnectedPeers>,
    pub requests: RequestSender,
    pub ledger: Arc<dyn PeerRequestLedger>,
    pub dynodes: Arc<dyn DynodeList>,
    pub payments: Arc<dyn PaymentVotes>,
    pub governance: Arc<dyn GovernanceStore>,
    pub progress: Arc<dyn ProgressSink>,
    pub clock: Arc<dyn Clock>,
}

/// Drives the dynode bootstrap: dynode list, payment votes, then governance.
///
/// The tick driver ([`tick`](Self::tick)) and the chain tip observer
/// ([`on_new_tip`](Self::on_new_tip)) take `&mut self`, so whoever owns the
/// manager serializes them. [`run`](Self::run) does this on a single task.
pub struct DynodeSyncManager {
    pub(super) config: SyncConfig,
    pub(super) session: SyncSession,
    pub(super) peers: Arc<dyn ConnectedPeers>,
    pub(super) requests: RequestSender,
    pub(super) ledger: Arc<dyn PeerRequestLedger>,
    pub(super) dynodes: Arc<dyn DynodeList>,
    pub(super) payments: Arc<dyn PaymentVotes>,
    pub(super) governance: Arc<dyn GovernanceStore>,
    pub(super) progress: ProgressReporter,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) events: EventBus<SyncEvent>,
}

impl DynodeSyncManager {
    pub fn new(config: SyncConfig, collaborators: SyncCollaborators) -> Result<Self> {
        config.validate().map_err(DynodeSyncError::Config)?;

        let SyncCollaborators {
            peers,
            requests,
            ledger,
            dynodes,
            payments,
            governance,
            progress,
            clock,
        } = collaborators;

        tracing::info!(
            "Dynode sync configured for {} (local dynode: {})",
            config.network,
            config.local_dynode
        );

        let session = SyncSession::new(clock.now());
        Ok(Self {
            config,
            session,
            peers,
            requests,
            ledger,
            dynodes,
            payments,
            governance,
            progress: ProgressReporter::new(progress),
            clock,
            events: EventBus::default(),
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn session(&self) -> &SyncSession {
        &self.session
    }

    pub fn subscribe(&self) -> EventReceiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn current_asset(&self) -> SyncAsset {
        self.session.current_asset
    }

    pub fn asset_name(&self) -> &'static str {
        self.session.current_asset.name()
    }

    pub fn status_text(&self) -> &'static str {
        self.session.current_asset.status_text()
    }

    pub fn is_synced(&self) -> bool {
        self.session.is_synced()
    }

    pub fn is_failed(&self) -> bool {
        self.session.is_failed()
    }

    /// The base chain has left initial block download.
    pub fn is_blockchain_synced(&self) -> bool {
        self.session.current_asset.is_past(SyncAsset::Initial)
    }

    pub fn is_dynode_list_synced(&self) -> bool {
        self.session.current_asset.is_past(SyncAsset::NodeDirectory)
    }

    pub fn is_winners_list_synced(&self) -> bool {
        self.session.current_asset.is_past(SyncAsset::PaymentVotes)
    }

    /// Current state for a status query.
    pub fn status(&self) -> SyncStatus {
        let now = self.clock.now();
        let mut status = SyncStatus::from_asset(self.session.current_asset);
        status.asset_elapsed_secs = self.session.asset_elapsed(now).as_secs();
        status.attempt = self.session.attempt_count;
        status.tip_height = self.session.known_tip_height;
        status.progress = self.progress.last();
        status
    }
}

impl std::fmt::Debug for DynodeSyncManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynodeSyncManager")
            .field("network", &self.config.network)
            .field("session", &self.session)
            .field("progress", &self.progress)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestHarness;
    use std::time::Duration;

    #[test]
    fn test_new_rejects_invalid_config() {
        let harness = TestHarness::new(SyncConfig::testnet());
        let config = SyncConfig::testnet().with_ticks_per_cycle(0);

        let err = DynodeSyncManager::new(config, harness.collaborators()).unwrap_err();
        assert!(matches!(err, DynodeSyncError::Config(ref msg) if msg.contains("ticks_per_cycle")));
    }

    #[test]
    fn test_status_reports_session() {
        let mut harness = TestHarness::new(SyncConfig::testnet());
        harness.manager.session.known_tip_height = Some(321);
        harness.clock.advance(Duration::from_secs(12));

        let status = harness.manager.status();
        assert_eq!(status.asset_id, 0);
        assert_eq!(status.asset_name, "DYNODE_SYNC_INITIAL");
        assert_eq!(status.asset_elapsed_secs, 12);
        assert_eq!(status.tip_height, Some(321));
        assert!(!status.is_blockchain_synced);
        assert_eq!(status.status, "Synchronization pending...");
    }
}
