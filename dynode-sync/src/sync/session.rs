//! Authoritative state of the running bootstrap session.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use super::asset::SyncAsset;
use crate::types::BlockHeight;

/// State owned by the sync controller for the lifetime of the process.
///
/// Mutated only through [`DynodeSyncManager`](super::DynodeSyncManager), which
/// is driven by a single task.
#[derive(Debug, Clone)]
pub struct SyncSession {
    pub(crate) current_asset: SyncAsset,
    /// Peer-directed requests issued for the current asset.
    pub(crate) attempt_count: u32,
    pub(crate) asset_started_at: Instant,
    /// Last moment forward progress looked plausible. Drives the asset timeout.
    pub(crate) last_progress_at: Option<Instant>,
    pub(crate) last_failure_at: Option<Instant>,
    pub(crate) tick_count: u64,
    pub(crate) known_tip_height: Option<BlockHeight>,
    /// Wall time of the last tick that got past the cadence gate. Used by the staleness guard.
    pub(crate) last_process_at: Option<DateTime<Utc>>,
    /// Set when every announced governance object has been asked about.
    pub(crate) governance_idle_since: Option<Instant>,
    pub(crate) last_governance_check_tick: Option<u64>,
    pub(crate) last_vote_count_sample: usize,
}

impl SyncSession {
    pub fn new(now: Instant) -> Self {
        Self {
            current_asset: SyncAsset::Initial,
            attempt_count: 0,
            asset_started_at: now,
            last_progress_at: None,
            last_failure_at: None,
            tick_count: 0,
            known_tip_height: None,
            last_process_at: None,
            governance_idle_since: None,
            last_governance_check_tick: None,
            last_vote_count_sample: 0,
        }
    }

    /// Return to `Initial`. Tick counter, tip and staleness reference survive.
    pub(crate) fn reset(&mut self, now: Instant) {
        self.current_asset = SyncAsset::Initial;
        self.attempt_count = 0;
        self.asset_started_at = now;
        self.last_progress_at = None;
        self.last_failure_at = None;
        self.governance_idle_since = None;
        self.last_governance_check_tick = None;
        self.last_vote_count_sample = 0;
    }

    pub(crate) fn fail(&mut self, now: Instant) {
        self.current_asset = SyncAsset::Failed;
        self.attempt_count = 0;
        self.asset_started_at = now;
        self.last_failure_at = Some(now);
    }

    /// Switch to `asset` and start its clock.
    pub(crate) fn enter(&mut self, asset: SyncAsset, now: Instant) {
        self.current_asset = asset;
        self.attempt_count = 0;
        self.asset_started_at = now;
        self.bump(now);
    }

    /// Push out the asset timeout. Returns false when the session is synced or failed.
    pub(crate) fn bump(&mut self, now: Instant) -> bool {
        if self.is_synced() || self.is_failed() {
            return false;
        }
        self.last_progress_at = Some(now);
        true
    }

    pub(crate) fn record_attempt(&mut self) {
        self.attempt_count += 1;
    }

    /// No progress for longer than `timeout`. A session that never bumped counts as timed out.
    pub(crate) fn asset_timed_out(&self, now: Instant, timeout: Duration) -> bool {
        match self.last_progress_at {
            Some(at) => now.saturating_duration_since(at) > timeout,
            None => true,
        }
    }

    /// Time spent in the current asset.
    pub fn asset_elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.asset_started_at)
    }

    pub fn current_asset(&self) -> SyncAsset {
        self.current_asset
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn known_tip_height(&self) -> Option<BlockHeight> {
        self.known_tip_height
    }

    pub fn last_failure_at(&self) -> Option<Instant> {
        self.last_failure_at
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_synced(&self) -> bool {
        self.current_asset == SyncAsset::Finished
    }

    pub fn is_failed(&self) -> bool {
        self.current_asset == SyncAsset::Failed
    }
}
