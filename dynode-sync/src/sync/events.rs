use std::time::Duration;

use super::asset::SyncAsset;

/// Transitions of the sync session, broadcast on the [`EventBus`](crate::EventBus).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A new asset is being fetched.
    AssetStarted {
        asset: SyncAsset,
    },

    /// An asset was left for its successor, complete or not.
    AssetCompleted {
        asset: SyncAsset,
        elapsed: Duration,
    },

    /// A load-bearing asset made no progress before its timeout.
    Failed {
        asset: SyncAsset,
    },

    /// The session went back to `Initial`.
    Reset,

    /// Every asset has been fetched.
    ///
    /// The active-dynode manager listens for this to (re)start the local dynode.
    Finished,
}
