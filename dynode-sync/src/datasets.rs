//! Dataset managers the sync controller consults but does not own.
//!
//! Storage, validation and deduplication of dynodes, payment votes and
//! governance objects live behind these traits.

use crate::types::{BlockHeight, ObjectHash, PeerSnapshot};

/// The dynode list.
pub trait DynodeList: Send + Sync {
    /// Number of known dynodes.
    fn count(&self) -> usize;
}

/// Dynode payment votes.
pub trait PaymentVotes: Send + Sync {
    /// Lowest protocol version that can serve dynode list and payment data.
    fn min_protocol_version(&self) -> u32;

    /// Number of blocks of payment votes we retain.
    fn storage_limit(&self) -> u32;

    /// Enough blocks and votes are held locally to stop asking more peers.
    fn is_enough_data(&self) -> bool;

    /// Heights of payment blocks with too few votes that `peer` should be asked for.
    /// Empty when the peer is too old to serve them or nothing is missing.
    fn missing_payment_blocks(&self, peer: &PeerSnapshot) -> Vec<BlockHeight>;
}

/// Objects to ask one peer about, and how much is left afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteRequestPlan {
    /// Objects whose votes `peer` should be asked for now.
    pub objects: Vec<ObjectHash>,
    /// Announced objects still not asked about from any peer after this plan.
    pub remaining: usize,
}

/// Governance objects and votes.
pub trait GovernanceStore: Send + Sync {
    /// Pick announced objects to request votes for from `peer` and mark them asked.
    fn plan_vote_requests(&self, peer: &PeerSnapshot) -> VoteRequestPlan;

    /// Total number of votes held.
    fn vote_count(&self) -> usize;
}
