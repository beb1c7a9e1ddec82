use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedReceiver;

use super::datasets::{
    MockDynodeList, MockGovernanceStore, MockPaymentVotes, RecordingProgressSink,
};
use crate::clock::{Clock, MockClock};
use crate::config::SyncConfig;
use crate::event_bus::EventReceiver;
use crate::network::{MemoryRequestLedger, PeerRequest, RequestSender, SharedPeers};
use crate::sync::{DynodeSyncManager, SyncCollaborators, SyncEvent};

/// A sync manager wired to in-memory collaborators and a manual clock.
pub struct TestHarness {
    pub manager: DynodeSyncManager,
    pub config: SyncConfig,
    pub clock: Arc<MockClock>,
    pub peers: SharedPeers,
    pub ledger: Arc<MemoryRequestLedger>,
    pub dynodes: Arc<MockDynodeList>,
    pub payments: Arc<MockPaymentVotes>,
    pub governance: Arc<MockGovernanceStore>,
    pub progress: Arc<RecordingProgressSink>,
    pub events: EventReceiver<SyncEvent>,
    sender: RequestSender,
    requests: UnboundedReceiver<PeerRequest>,
}

impl TestHarness {
    /// Build a harness. Panics on an invalid config.
    pub fn new(config: SyncConfig) -> Self {
        let clock = Arc::new(MockClock::new());
        let ledger = Arc::new(MemoryRequestLedger::new(config.fulfilled_request_ttl, clock.clone()));
        let (sender, requests) = RequestSender::channel();

        let peers = SharedPeers::new();
        let dynodes = Arc::new(MockDynodeList::new());
        let payments = Arc::new(MockPaymentVotes::new());
        let governance = Arc::new(MockGovernanceStore::new());
        let progress = Arc::new(RecordingProgressSink::new());

        let collaborators = SyncCollaborators {
            peers: Arc::new(peers.clone()),
            requests: sender.clone(),
            ledger: ledger.clone(),
            dynodes: dynodes.clone(),
            payments: payments.clone(),
            governance: governance.clone(),
            progress: progress.clone(),
            clock: clock.clone(),
        };
        let manager =
            DynodeSyncManager::new(config.clone(), collaborators).expect("valid test config");
        let events = manager.subscribe();

        Self {
            manager,
            config,
            clock,
            peers,
            ledger,
            dynodes,
            payments,
            governance,
            progress,
            events,
            sender,
            requests,
        }
    }

    /// Collaborators sharing this harness's mocks, clock and request channel.
    pub fn collaborators(&self) -> SyncCollaborators {
        SyncCollaborators {
            peers: Arc::new(self.peers.clone()),
            requests: self.sender.clone(),
            ledger: self.ledger.clone(),
            dynodes: self.dynodes.clone(),
            payments: self.payments.clone(),
            governance: self.governance.clone(),
            progress: self.progress.clone(),
            clock: self.clock.clone(),
        }
    }

    /// Move the manager out, e.g. into a spawned run loop, leaving a fresh one in its place.
    pub fn take_manager(&mut self) -> DynodeSyncManager {
        let fresh = DynodeSyncManager::new(self.config.clone(), self.collaborators())
            .expect("valid test config");
        std::mem::replace(&mut self.manager, fresh)
    }

    /// Every request queued since the last drain, in order.
    pub fn drain_requests(&mut self) -> Vec<PeerRequest> {
        let mut drained = Vec::new();
        while let Ok(request) = self.requests.try_recv() {
            drained.push(request);
        }
        drained
    }

    pub fn clock_now(&self) -> Instant {
        self.clock.now()
    }
}
