//! Error types for the dynode sync controller.

use thiserror::Error;

use crate::sync::SyncAsset;

/// Main error type for the dynode sync crate.
#[derive(Debug, Error)]
pub enum DynodeSyncError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

/// Logging-related errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory: {0}")]
    DirectoryCreation(#[from] std::io::Error),

    #[error("Subscriber initialization failed: {0}")]
    SubscriberInit(String),

    #[error("Log rotation failed: {0}")]
    RotationFailed(String),
}

/// Errors raised while handing requests to the connection layer.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The connection layer dropped its end of the request channel.
    #[error("Request channel closed: {0}")]
    ChannelClosed(String),
}

/// Synchronization-related errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Advance was requested from a state that has no successor on that path.
    /// This is a sequencing bug in the caller: a failed session must be reset first.
    #[error("Can't switch to next asset from {from}, should use reset first")]
    InvalidTransition {
        from: SyncAsset,
    },

    /// Indicates an invalid state in the sync process
    #[error("Invalid sync state: {0}")]
    InvalidState(String),

    /// Network-related errors (e.g. the request channel went away)
    #[error("Network error: {0}")]
    Network(String),
}

impl SyncError {
    /// Returns a static string representing the error category based on the variant
    pub fn category(&self) -> &'static str {
        match self {
            SyncError::InvalidTransition {
                ..
            }
            | SyncError::InvalidState(_) => "state",
            SyncError::Network(_) => "network",
        }
    }

    /// Whether the run loop must stop instead of logging and carrying on.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::InvalidTransition { .. })
    }
}

impl From<NetworkError> for SyncError {
    fn from(err: NetworkError) -> Self {
        SyncError::Network(err.to_string())
    }
}

/// Type alias for Result with DynodeSyncError.
pub type Result<T> = std::result::Result<T, DynodeSyncError>;

/// Type alias for network operation results.
pub type NetworkResult<T> = std::result::Result<T, NetworkError>;

/// Type alias for sync operation results.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Type alias for logging operation results.
pub type LoggingResult<T> = std::result::Result<T, LoggingError>;
