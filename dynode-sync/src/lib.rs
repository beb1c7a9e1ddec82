//! Dynode bootstrap synchronization controller.
//!
//! Once the base chain has left initial block download, a node on the dynode
//! overlay still needs three network-wide datasets before it is operational:
//!
//! - the dynode list
//! - dynode payment votes
//! - governance objects and their votes
//!
//! This crate decides which peer to ask for what and when, detects stalls and
//! failures, and reports progress. Storage of the datasets, the connection
//! pool and wire encoding stay behind the traits in [`datasets`] and
//! [`network`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use dynode_sync::network::{MemoryRequestLedger, RequestSender, SharedPeers};
//! use dynode_sync::{
//!     DynodeSyncManager, SyncCollaborators, SyncConfig, SyncTaskContext, SystemClock,
//!     WatchProgressSink,
//! };
//! # use dynode_sync::datasets::{DynodeList, GovernanceStore, PaymentVotes};
//! # fn datasets() -> (Arc<dyn DynodeList>, Arc<dyn PaymentVotes>, Arc<dyn GovernanceStore>) { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SyncConfig::mainnet();
//!     let clock = Arc::new(SystemClock);
//!     let (requests, _outbound) = RequestSender::channel();
//!     let (progress, _progress_rx) = WatchProgressSink::new();
//!     let (dynodes, payments, governance) = datasets();
//!
//!     let mut manager = DynodeSyncManager::new(
//!         config.clone(),
//!         SyncCollaborators {
//!             peers: Arc::new(SharedPeers::new()),
//!             requests,
//!             ledger: Arc::new(MemoryRequestLedger::new(config.fulfilled_request_ttl, clock.clone())),
//!             dynodes,
//!             payments,
//!             governance,
//!             progress: Arc::new(progress),
//!             clock,
//!         },
//!     )?;
//!
//!     let (context, handles) = SyncTaskContext::channel();
//!     let task = tokio::spawn(async move { manager.run(context).await });
//!
//!     tokio::time::sleep(Duration::from_secs(60)).await;
//!     handles.shutdown.cancel();
//!     task.await??;
//!     Ok(())
//! }
//! ```

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub mod clock;
pub mod config;
pub mod datasets;
pub mod error;
pub mod event_bus;
pub mod logging;
pub mod network;
pub mod sync;
pub mod types;

// Re-export main types for convenience
pub use clock::{Clock, SystemClock};
pub use config::SyncConfig;
pub use error::{
    DynodeSyncError, LoggingError, LoggingResult, NetworkError, NetworkResult, Result, SyncError,
    SyncResult,
};
pub use event_bus::{EventBus, EventReceiver};
pub use logging::{LogFileConfig, LoggingConfig, LoggingGuard, init_console_logging, init_logging};
pub use sync::{
    DynodeSyncManager, ProgressSink, SyncAsset, SyncCollaborators, SyncCommand, SyncEvent,
    SyncStatus, SyncTaskContext, SyncTaskHandles, WatchProgressSink,
};
pub use tracing::level_filters::LevelFilter;
pub use types::{BlockHeight, ChainTip, Network, ObjectHash, PeerId, PeerSnapshot};

/// Current version of the dynode-sync library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
