//! Test utilities for the dynode sync controller.

mod datasets;
mod harness;

use std::net::SocketAddr;

pub use datasets::{
    MOCK_MIN_PAYMENT_PROTO, MockDynodeList, MockGovernanceStore, MockPaymentVotes,
    RecordingProgressSink,
};
pub use harness::TestHarness;

pub use crate::clock::MockClock;
use crate::types::PeerSnapshot;

/// Loopback address unique to `id`.
pub fn test_socket_address(id: u64) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 33300 + id as u16))
}

/// Outbound, non-dynode peer with the given protocol version.
pub fn test_peer(id: u64, version: u32) -> PeerSnapshot {
    PeerSnapshot::new(id, test_socket_address(id), version)
}
