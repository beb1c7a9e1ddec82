//! Dynode bootstrap synchronization.
//!
//! After the base chain leaves initial block download, the node fetches three
//! network-wide datasets from its peers in order: the dynode list, dynode
//! payment votes and governance objects. [`DynodeSyncManager`] owns the session
//! state and applies the per-asset request policy on every tick.

mod asset;
mod canvasser;
mod driver;
mod events;
mod manager;
mod progress;
mod session;
mod state_machine;
mod status;
mod task;
mod tip;

pub use asset::SyncAsset;
pub use events::SyncEvent;
pub use manager::{DynodeSyncManager, SyncCollaborators};
pub use progress::{NON_TERMINAL_ASSETS, ProgressReporter, ProgressSink, WatchProgressSink, sync_progress};
pub use session::SyncSession;
pub use status::SyncStatus;
pub use task::{SyncCommand, SyncTaskContext, SyncTaskHandles};
