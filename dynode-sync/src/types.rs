//! Common type definitions for the dynode sync controller.

use std::fmt;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Block height on the base chain.
pub type BlockHeight = u32;

/// Network the node participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    /// Throwaway networks converge through the deterministic shortcut instead of
    /// pacing requests across real peers.
    pub fn is_deterministic(&self) -> bool {
        matches!(self, Network::Regtest)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "main"),
            Network::Testnet => write!(f, "test"),
            Network::Regtest => write!(f, "regtest"),
        }
    }
}

/// Connection-layer identifier of a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point-in-time copy of what the connection pool knows about a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSnapshot {
    pub id: PeerId,
    pub address: SocketAddr,
    /// Protocol version from the peer's version message.
    pub version: u32,
    /// The peer is itself a dynode (overlay service participant).
    pub is_dynode: bool,
    /// The peer connected to us.
    pub inbound: bool,
}

impl PeerSnapshot {
    /// Create an outbound, non-dynode peer snapshot.
    pub fn new(id: u64, address: SocketAddr, version: u32) -> Self {
        Self {
            id: PeerId(id),
            address,
            version,
            is_dynode: false,
            inbound: false,
        }
    }

    pub fn with_dynode(mut self, is_dynode: bool) -> Self {
        self.is_dynode = is_dynode;
        self
    }

    pub fn with_inbound(mut self, inbound: bool) -> Self {
        self.inbound = inbound;
        self
    }
}

/// Hash identifying a governance object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectHash(pub [u8; 32]);

impl fmt::Display for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// New best block notification from the base chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainTip {
    pub height: BlockHeight,
    /// The base chain is still in initial block download.
    pub initial_download: bool,
}
