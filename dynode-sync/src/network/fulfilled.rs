//! Ledger of requests already issued to a peer this session.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::clock::Clock;

/// Class of request tracked per peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestTag {
    SporkSync,
    DynodeListSync,
    PaymentVoteSync,
    GovernanceSync,
    /// The peer has served a complete sync.
    FullSync,
}

impl RequestTag {
    /// Every tag, in the order a sync session clears them.
    pub const ALL: [RequestTag; 5] = [
        RequestTag::SporkSync,
        RequestTag::DynodeListSync,
        RequestTag::PaymentVoteSync,
        RequestTag::GovernanceSync,
        RequestTag::FullSync,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestTag::SporkSync => "spork-sync",
            RequestTag::DynodeListSync => "dynode-list-sync",
            RequestTag::PaymentVoteSync => "dynode-payment-sync",
            RequestTag::GovernanceSync => "governance-sync",
            RequestTag::FullSync => "full-sync",
        }
    }
}

impl fmt::Display for RequestTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records which request classes each peer has already been sent.
#[async_trait]
pub trait PeerRequestLedger: Send + Sync {
    async fn has_fulfilled(&self, peer: SocketAddr, tag: RequestTag) -> bool;

    async fn add_fulfilled(&self, peer: SocketAddr, tag: RequestTag);

    async fn remove_fulfilled(&self, peer: SocketAddr, tag: RequestTag);
}

/// In-memory ledger whose markers expire after a fixed TTL.
pub struct MemoryRequestLedger {
    entries: RwLock<HashMap<SocketAddr, HashMap<RequestTag, Instant>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl MemoryRequestLedger {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Drop expired markers and peers left without any.
    pub async fn prune_expired(&self) {
        let now = self.clock.now();
        retain_live(&mut *self.entries.write().await, now);
    }

    /// Number of peers holding at least one live marker.
    pub async fn peer_count(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .values()
            .filter(|tags| tags.values().any(|expires_at| *expires_at > now))
            .count()
    }
}

#[async_trait]
impl PeerRequestLedger for MemoryRequestLedger {
    async fn has_fulfilled(&self, peer: SocketAddr, tag: RequestTag) -> bool {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(&peer)
            .and_then(|tags| tags.get(&tag))
            .is_some_and(|expires_at| *expires_at > now)
    }

    async fn add_fulfilled(&self, peer: SocketAddr, tag: RequestTag) {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        // Addresses come and go; stale ones are dropped whenever a marker is written.
        retain_live(&mut entries, now);
        entries.entry(peer).or_default().insert(tag, now + self.ttl);
    }

    async fn remove_fulfilled(&self, peer: SocketAddr, tag: RequestTag) {
        let mut entries = self.entries.write().await;
        if let Some(tags) = entries.get_mut(&peer) {
            tags.remove(&tag);
            if tags.is_empty() {
                entries.remove(&peer);
            }
        }
    }
}

fn retain_live(entries: &mut HashMap<SocketAddr, HashMap<RequestTag, Instant>>, now: Instant) {
    entries.retain(|_, tags| {
        tags.retain(|_, expires_at| *expires_at > now);
        !tags.is_empty()
    });
}
