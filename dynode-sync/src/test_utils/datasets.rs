use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use crate::datasets::{DynodeList, GovernanceStore, PaymentVotes, VoteRequestPlan};
use crate::sync::ProgressSink;
use crate::types::{BlockHeight, ObjectHash, PeerSnapshot};

/// Minimum payment protocol version reported by [`MockPaymentVotes`].
pub const MOCK_MIN_PAYMENT_PROTO: u32 = 70208;

/// Dynode list with a settable count.
#[derive(Debug, Default)]
pub struct MockDynodeList {
    count: AtomicUsize,
}

impl MockDynodeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_count(&self, count: usize) {
        self.count.store(count, Ordering::SeqCst);
    }
}

impl DynodeList for MockDynodeList {
    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// Payment vote store driven by test setters.
#[derive(Debug)]
pub struct MockPaymentVotes {
    min_protocol_version: AtomicU32,
    storage_limit: AtomicU32,
    enough_data: AtomicBool,
    missing_blocks: Mutex<Vec<BlockHeight>>,
}

impl MockPaymentVotes {
    pub fn new() -> Self {
        Self {
            min_protocol_version: AtomicU32::new(MOCK_MIN_PAYMENT_PROTO),
            storage_limit: AtomicU32::new(5000),
            enough_data: AtomicBool::new(false),
            missing_blocks: Mutex::new(Vec::new()),
        }
    }

    pub fn set_enough_data(&self, enough: bool) {
        self.enough_data.store(enough, Ordering::SeqCst);
    }

    pub fn set_min_protocol_version(&self, version: u32) {
        self.min_protocol_version.store(version, Ordering::SeqCst);
    }

    pub fn set_missing_blocks(&self, heights: Vec<BlockHeight>) {
        *self.missing_blocks.lock().unwrap() = heights;
    }
}

impl Default for MockPaymentVotes {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentVotes for MockPaymentVotes {
    fn min_protocol_version(&self) -> u32 {
        self.min_protocol_version.load(Ordering::SeqCst)
    }

    fn storage_limit(&self) -> u32 {
        self.storage_limit.load(Ordering::SeqCst)
    }

    fn is_enough_data(&self) -> bool {
        self.enough_data.load(Ordering::SeqCst)
    }

    fn missing_payment_blocks(&self, peer: &PeerSnapshot) -> Vec<BlockHeight> {
        if peer.version < self.min_protocol_version() {
            return Vec::new();
        }
        self.missing_blocks.lock().unwrap().clone()
    }
}

/// Governance store that hands out announced objects in batches.
#[derive(Debug)]
pub struct MockGovernanceStore {
    pending: Mutex<VecDeque<ObjectHash>>,
    batch_size: AtomicUsize,
    votes: AtomicUsize,
}

impl MockGovernanceStore {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            batch_size: AtomicUsize::new(usize::MAX),
            votes: AtomicUsize::new(0),
        }
    }

    /// Queue objects whose votes have not been asked for yet.
    pub fn announce(&self, objects: Vec<ObjectHash>) {
        self.pending.lock().unwrap().extend(objects);
    }

    /// Limit how many objects one plan may carry.
    pub fn set_batch_size(&self, size: usize) {
        self.batch_size.store(size, Ordering::SeqCst);
    }

    pub fn set_vote_count(&self, votes: usize) {
        self.votes.store(votes, Ordering::SeqCst);
    }
}

impl Default for MockGovernanceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GovernanceStore for MockGovernanceStore {
    fn plan_vote_requests(&self, _peer: &PeerSnapshot) -> VoteRequestPlan {
        let mut pending = self.pending.lock().unwrap();
        let take = self.batch_size.load(Ordering::SeqCst).min(pending.len());
        let objects: Vec<_> = pending.drain(..take).collect();
        VoteRequestPlan {
            objects,
            remaining: pending.len(),
        }
    }

    fn vote_count(&self) -> usize {
        self.votes.load(Ordering::SeqCst)
    }
}

/// Progress sink that keeps every published value.
#[derive(Debug, Default)]
pub struct RecordingProgressSink {
    values: Mutex<Vec<f64>>,
}

impl RecordingProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Vec<f64> {
        self.values.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.lock().unwrap().last().copied()
    }
}

impl ProgressSink for RecordingProgressSink {
    fn notify(&self, progress: f64) {
        self.values.lock().unwrap().push(progress);
    }
}
