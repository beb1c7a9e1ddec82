//! Bootstrap phases and their fixed order.

use std::fmt;

use serde::Serialize;

/// One phase of the dynode bootstrap sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SyncAsset {
    /// Waiting for the base chain to leave initial block download.
    Initial,
    /// Fetching the dynode list.
    NodeDirectory,
    /// Fetching dynode payment votes.
    PaymentVotes,
    /// Fetching governance objects and votes.
    Governance,
    /// Gave up on a load-bearing dataset; waits for the cooldown reset.
    Failed,
    /// All assets fetched.
    Finished,
}

impl SyncAsset {
    /// Successor in the progression, `None` for states without one.
    pub fn next(&self) -> Option<SyncAsset> {
        match self {
            SyncAsset::Initial => Some(SyncAsset::NodeDirectory),
            SyncAsset::NodeDirectory => Some(SyncAsset::PaymentVotes),
            SyncAsset::PaymentVotes => Some(SyncAsset::Governance),
            SyncAsset::Governance => Some(SyncAsset::Finished),
            SyncAsset::Failed | SyncAsset::Finished => None,
        }
    }

    /// Numeric asset id as reported by the status RPC.
    ///
    /// Slot 1 belonged to a standalone spork phase; sporks are now requested from
    /// every peer as part of each asset, so the id is skipped.
    pub fn ordinal(&self) -> i32 {
        match self {
            SyncAsset::Failed => -1,
            SyncAsset::Initial => 0,
            SyncAsset::NodeDirectory => 2,
            SyncAsset::PaymentVotes => 3,
            SyncAsset::Governance => 4,
            SyncAsset::Finished => 999,
        }
    }

    /// Position in the progression. `Failed` sits outside it.
    pub fn position(&self) -> Option<usize> {
        match self {
            SyncAsset::Initial => Some(0),
            SyncAsset::NodeDirectory => Some(1),
            SyncAsset::PaymentVotes => Some(2),
            SyncAsset::Governance => Some(3),
            SyncAsset::Finished => Some(4),
            SyncAsset::Failed => None,
        }
    }

    /// Whether `self` comes strictly after `other` in the progression.
    pub fn is_past(&self, other: SyncAsset) -> bool {
        match (self.position(), other.position()) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SyncAsset::Initial => "DYNODE_SYNC_INITIAL",
            SyncAsset::NodeDirectory => "DYNODE_SYNC_LIST",
            SyncAsset::PaymentVotes => "DYNODE_SYNC_DNW",
            SyncAsset::Governance => "DYNODE_SYNC_GOVERNANCE",
            SyncAsset::Failed => "DYNODE_SYNC_FAILED",
            SyncAsset::Finished => "DYNODE_SYNC_FINISHED",
        }
    }

    /// Human-readable phrase for status displays.
    pub fn status_text(&self) -> &'static str {
        match self {
            SyncAsset::Initial => "Synchronization pending...",
            SyncAsset::NodeDirectory => "Synchronizing Dynodes...",
            SyncAsset::PaymentVotes => "Synchronizing Dynode payments...",
            SyncAsset::Governance => "Synchronizing governance objects...",
            SyncAsset::Failed => "Synchronization failed",
            SyncAsset::Finished => "Synchronization finished",
        }
    }
}

impl fmt::Display for SyncAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
