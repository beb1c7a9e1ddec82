//! Broadcast of sync events to interested components.
//!
//! The active-dynode manager, status displays and tests subscribe here to hear
//! about asset transitions without polling the controller.

use thiserror::Error;
use tokio::sync::broadcast;

const DEFAULT_EVENT_LIMIT: usize = 1024;

/// Event-related errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Bus receiver failed: {0}")]
    ReceiveFailure(String),
}

type Result<T> = std::result::Result<T, Error>;

/// Event bus backed by a tokio broadcast channel.
///
/// Every subscriber sees every event sent after it subscribed.
#[derive(Debug, Clone)]
pub struct EventBus<T: Clone> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone> EventBus<T> {
    /// Capacity bounds how far a slow receiver may fall behind before it lags.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
        }
    }

    pub fn subscribe(&self) -> EventReceiver<T> {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Emit an event. Having no subscribers is not an error.
    pub fn emit(&self, event: T) {
        let _ = self.sender.send(event);
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_LIMIT)
    }
}

#[derive(Debug)]
pub struct EventReceiver<T: Clone> {
    receiver: broadcast::Receiver<T>,
}

impl<T: Clone> EventReceiver<T> {
    pub async fn recv(&mut self) -> Result<T> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Lagged(n) => {
                Error::ReceiveFailure(format!("lagged {} events", n))
            }
            broadcast::error::RecvError::Closed => Error::ReceiveFailure("bus closed".to_string()),
        })
    }

    /// Non-blocking receive; `None` when nothing is pending.
    pub fn try_recv(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}
