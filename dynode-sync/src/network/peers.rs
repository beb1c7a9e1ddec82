//! Shared view of connected peers.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ConnectedPeers;
use crate::types::PeerSnapshot;

/// Peer table the connection layer keeps current and the sync controller snapshots.
#[derive(Debug, Clone, Default)]
pub struct SharedPeers {
    peers: Arc<RwLock<HashMap<SocketAddr, PeerSnapshot>>>,
}

impl SharedPeers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connected peer, replacing an older entry for the same address.
    pub async fn insert(&self, peer: PeerSnapshot) {
        let mut peers = self.peers.write().await;
        peers.insert(peer.address, peer);
        tracing::debug!("Peer table now holds {} peers", peers.len());
    }

    pub async fn remove(&self, address: &SocketAddr) -> Option<PeerSnapshot> {
        self.peers.write().await.remove(address)
    }

    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}

#[async_trait]
impl ConnectedPeers for SharedPeers {
    async fn snapshot(&self) -> Vec<PeerSnapshot> {
        let peers = self.peers.read().await;
        let mut snapshot: Vec<_> = peers.values().cloned().collect();
        drop(peers);
        // Connection order approximates id order; keep iteration stable between ticks.
        snapshot.sort_by_key(|peer| peer.id);
        snapshot
    }
}
