//! Abstract message forms exchanged with the connection layer.
//!
//! Wire encoding belongs to the connection layer; these types only carry what
//! the sync controller decides to ask for.

use std::fmt;
use std::net::SocketAddr;

use crate::types::{BlockHeight, ObjectHash};

/// Selector for a governance sync request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GovernanceSyncRequest {
    /// Single proposal to sync, or `None` for every object.
    pub proposal: Option<ObjectHash>,
    /// Serialized bloom filter of votes we already have. Empty means no filter.
    pub filter: Vec<u8>,
}

impl GovernanceSyncRequest {
    /// Ask for every governance object, unfiltered.
    pub fn all() -> Self {
        Self::default()
    }
}

/// Requests the sync controller hands to the connection layer for one peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundRequest {
    /// Ask for the current spork (feature flag) set.
    GetSporks,
    /// Ask for the peer's dynode list.
    DynodeListSync,
    /// Ask for payment votes. `count` is the retention window in blocks, or the
    /// number of known dynodes in deterministic mode.
    PaymentVoteSync {
        count: u32,
    },
    /// Ask for payment blocks we hold too few votes for.
    PaymentBlocks {
        heights: Vec<BlockHeight>,
    },
    /// Ask for governance objects.
    GovernanceSync(GovernanceSyncRequest),
    /// Ask for votes of objects the peer announced earlier.
    GovernanceVotes {
        objects: Vec<ObjectHash>,
    },
}

impl OutboundRequest {
    /// Short command name for logging.
    pub fn cmd(&self) -> &'static str {
        match self {
            OutboundRequest::GetSporks => "getsporks",
            OutboundRequest::DynodeListSync => "dseg",
            OutboundRequest::PaymentVoteSync {
                ..
            } => "dnget",
            OutboundRequest::PaymentBlocks {
                ..
            } => "getdata",
            OutboundRequest::GovernanceSync(_) => "govsync",
            OutboundRequest::GovernanceVotes {
                ..
            } => "govvotes",
        }
    }
}

impl fmt::Display for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboundRequest::PaymentVoteSync {
                count,
            } => write!(f, "{}({})", self.cmd(), count),
            OutboundRequest::PaymentBlocks {
                heights,
            } => write!(f, "{}({} blocks)", self.cmd(), heights.len()),
            OutboundRequest::GovernanceVotes {
                objects,
            } => write!(f, "{}({} objects)", self.cmd(), objects.len()),
            _ => write!(f, "{}", self.cmd()),
        }
    }
}

/// Inventory count a peer reports while serving a sync request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatusCount {
    pub item_id: i32,
    pub count: i32,
}

/// A sync status message tagged with the peer that sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundMessage {
    pub peer: SocketAddr,
    pub status: SyncStatusCount,
}
