//! Completion estimate and the sink it is published to.

use std::sync::Arc;

use tokio::sync::watch;

use super::asset::SyncAsset;

/// Assets before `Finished` that count toward progress.
pub const NON_TERMINAL_ASSETS: u32 = 4;

/// Estimated completion in [0, 1].
///
/// `(attempts + (ordinal - 1) * K) / (K * N)` with attempts clamped to `K`, so
/// the estimate never drops within a single pass through the assets.
pub fn sync_progress(asset: SyncAsset, attempts: u32, attempts_per_asset: u32) -> f64 {
    match asset {
        SyncAsset::Finished => return 1.0,
        SyncAsset::Failed => return 0.0,
        _ => {}
    }
    let k = f64::from(attempts_per_asset.max(1));
    let attempts = f64::from(attempts.min(attempts_per_asset));
    let offset = f64::from(asset.ordinal() - 1) * k;
    ((attempts + offset) / (k * f64::from(NON_TERMINAL_ASSETS))).clamp(0.0, 1.0)
}

/// Receiver of progress notifications, typically a UI or RPC layer.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, progress: f64);
}

/// [`ProgressSink`] backed by a watch channel. Readers see the latest value.
#[derive(Debug)]
pub struct WatchProgressSink {
    sender: watch::Sender<f64>,
}

impl WatchProgressSink {
    pub fn new() -> (Self, watch::Receiver<f64>) {
        let (sender, receiver) = watch::channel(0.0);
        (
            Self {
                sender,
            },
            receiver,
        )
    }
}

impl ProgressSink for WatchProgressSink {
    fn notify(&self, progress: f64) {
        self.sender.send_replace(progress);
    }
}

/// Clamps and forwards progress values, remembering the last one.
#[derive(Clone)]
pub struct ProgressReporter {
    sink: Arc<dyn ProgressSink>,
    last: f64,
}

impl ProgressReporter {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            last: 0.0,
        }
    }

    pub fn publish(&mut self, progress: f64) {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.last = progress;
        self.sink.notify(progress);
    }

    pub fn last(&self) -> f64 {
        self.last
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter").field("last", &self.last).finish()
    }
}
