//! Interfaces to the connection layer.
//!
//! The sync controller never talks to sockets. It copies the peer list through
//! [`ConnectedPeers`], records what it asked for in a [`PeerRequestLedger`],
//! and queues requests on a [`RequestSender`] which the connection layer drains.

pub mod fulfilled;
pub mod message;
pub mod peers;

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::error::{NetworkError, NetworkResult};
use crate::types::PeerSnapshot;

pub use fulfilled::{MemoryRequestLedger, PeerRequestLedger, RequestTag};
pub use message::{GovernanceSyncRequest, InboundMessage, OutboundRequest, SyncStatusCount};
pub use peers::SharedPeers;

/// Source of connected-peer snapshots.
#[async_trait]
pub trait ConnectedPeers: Send + Sync {
    /// Copy the current peer list. Implementations hold their lock only for the copy.
    async fn snapshot(&self) -> Vec<PeerSnapshot>;
}

/// Work item for the connection layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerRequest {
    Send {
        peer: SocketAddr,
        request: OutboundRequest,
    },
    /// Drop the connection to free the slot for another peer.
    Disconnect {
        peer: SocketAddr,
    },
}

/// Fire-and-forget handle for queuing peer requests.
#[derive(Debug, Clone)]
pub struct RequestSender {
    sender: UnboundedSender<PeerRequest>,
}

impl RequestSender {
    pub fn new(sender: UnboundedSender<PeerRequest>) -> Self {
        Self {
            sender,
        }
    }

    /// Create a sender together with the receiver the connection layer drains.
    pub fn channel() -> (Self, UnboundedReceiver<PeerRequest>) {
        let (sender, receiver) = unbounded_channel();
        (Self::new(sender), receiver)
    }

    /// Queue a request for a peer.
    pub fn send_request(&self, peer: &PeerSnapshot, request: OutboundRequest) -> NetworkResult<()> {
        tracing::trace!("Queueing {} for peer {}", request, peer.id);
        self.queue(PeerRequest::Send {
            peer: peer.address,
            request,
        })
    }

    /// Ask the connection layer to disconnect a peer.
    pub fn disconnect(&self, peer: &PeerSnapshot) -> NetworkResult<()> {
        self.queue(PeerRequest::Disconnect {
            peer: peer.address,
        })
    }

    fn queue(&self, request: PeerRequest) -> NetworkResult<()> {
        self.sender
            .send(request)
            .map_err(|e| NetworkError::ChannelClosed(format!("peer request dropped: {:?}", e.0)))
    }
}
