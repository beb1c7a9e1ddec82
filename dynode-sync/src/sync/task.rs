//! Single-task run loop that owns the sync controller.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::oneshot;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use super::manager::DynodeSyncManager;
use super::status::SyncStatus;
use crate::error::SyncResult;
use crate::network::InboundMessage;
use crate::types::ChainTip;

/// Operator commands, as issued from an RPC surface.
#[derive(Debug)]
pub enum SyncCommand {
    /// Move to the next asset.
    Next {
        response: oneshot::Sender<SyncResult<()>>,
    },
    /// Start over from `Initial`.
    Reset,
    Status {
        response: oneshot::Sender<SyncStatus>,
    },
}

/// Inputs consumed by [`DynodeSyncManager::run`].
#[derive(Debug)]
pub struct SyncTaskContext {
    pub tips: UnboundedReceiver<ChainTip>,
    pub messages: UnboundedReceiver<InboundMessage>,
    pub commands: UnboundedReceiver<SyncCommand>,
    pub shutdown: CancellationToken,
}

/// Sending halves matching a [`SyncTaskContext`].
#[derive(Debug, Clone)]
pub struct SyncTaskHandles {
    pub tips: UnboundedSender<ChainTip>,
    pub messages: UnboundedSender<InboundMessage>,
    pub commands: UnboundedSender<SyncCommand>,
    pub shutdown: CancellationToken,
}

impl SyncTaskContext {
    pub fn channel() -> (Self, SyncTaskHandles) {
        let (tips_tx, tips) = unbounded_channel();
        let (messages_tx, messages) = unbounded_channel();
        let (commands_tx, commands) = unbounded_channel();
        let shutdown = CancellationToken::new();
        (
            Self {
                tips,
                messages,
                commands,
                shutdown: shutdown.clone(),
            },
            SyncTaskHandles {
                tips: tips_tx,
                messages: messages_tx,
                commands: commands_tx,
                shutdown,
            },
        )
    }
}

impl DynodeSyncManager {
    /// Drive the controller until shutdown.
    ///
    /// Ticks, tips, inbound messages and commands are handled one at a time, so
    /// the tick driver and tip observer never overlap. Returns early only on a
    /// fatal error.
    pub async fn run(&mut self, mut context: SyncTaskContext) -> SyncResult<()> {
        let mut ticker = interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Dynode sync task started");

        loop {
            let result = tokio::select! {
                biased;

                _ = context.shutdown.cancelled() => {
                    tracing::info!("Dynode sync task shutting down");
                    break;
                }
                Some(tip) = context.tips.recv() => self.on_new_tip(tip).await,
                Some(command) = context.commands.recv() => {
                    self.handle_command(command).await;
                    Ok(())
                }
                Some(message) = context.messages.recv() => {
                    self.handle_inbound(message);
                    Ok(())
                }
                _ = ticker.tick() => self.tick().await,
            };

            if let Err(e) = result {
                if e.is_fatal() {
                    tracing::error!("Dynode sync stopped: {}", e);
                    return Err(e);
                }
                tracing::warn!("Dynode sync {} error: {}", e.category(), e);
            }
        }
        Ok(())
    }

    async fn handle_command(&mut self, command: SyncCommand) {
        match command {
            SyncCommand::Next {
                response,
            } => {
                // Report misuse to the caller instead of stopping the task.
                let result = self.advance().await;
                if let Err(e) = &result {
                    tracing::warn!("Rejected manual advance: {}", e);
                }
                let _ = response.send(result);
            }
            SyncCommand::Reset => {
                tracing::info!("Manual dynode sync reset");
                self.reset();
            }
            SyncCommand::Status {
                response,
            } => {
                let _ = response.send(self.status());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::error::SyncError;
    use crate::sync::SyncAsset;
    use crate::test_utils::TestHarness;

    #[tokio::test]
    async fn test_commands_are_served_and_shutdown_stops_loop() {
        let mut harness = TestHarness::new(SyncConfig::testnet());
        let (context, handles) = SyncTaskContext::channel();
        let mut manager = harness.take_manager();

        let task = tokio::spawn(async move {
            let result = manager.run(context).await;
            (manager, result)
        });

        let (tx, rx) = oneshot::channel();
        handles.commands.send(SyncCommand::Next { response: tx }).unwrap();
        rx.await.unwrap().unwrap();

        let (tx, rx) = oneshot::channel();
        handles.commands.send(SyncCommand::Status { response: tx }).unwrap();
        assert_eq!(rx.await.unwrap().asset_name, "DYNODE_SYNC_LIST");

        handles.shutdown.cancel();
        let (manager, result) = task.await.unwrap();
        assert!(result.is_ok());
        assert_eq!(manager.current_asset(), SyncAsset::NodeDirectory);
    }

    #[tokio::test]
    async fn test_manual_advance_from_failed_is_reported_not_fatal() {
        let mut harness = TestHarness::new(SyncConfig::testnet());
        harness.manager.fail();
        let (context, handles) = SyncTaskContext::channel();
        let mut manager = harness.take_manager();
        let task = tokio::spawn(async move { manager.run(context).await });

        let (tx, rx) = oneshot::channel();
        handles.commands.send(SyncCommand::Next { response: tx }).unwrap();
        let result = rx.await.unwrap();
        assert!(matches!(result, Err(SyncError::InvalidTransition { from: SyncAsset::Failed })));

        handles.commands.send(SyncCommand::Reset).unwrap();
        let (tx, rx) = oneshot::channel();
        handles.commands.send(SyncCommand::Status { response: tx }).unwrap();
        assert_eq!(rx.await.unwrap().asset_id, 0);

        handles.shutdown.cancel();
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_tips_drive_the_loop() {
        let mut harness = TestHarness::new(SyncConfig::testnet());
        let (context, handles) = SyncTaskContext::channel();
        let mut manager = harness.take_manager();
        let task = tokio::spawn(async move {
            let result = manager.run(context).await;
            (manager, result)
        });

        handles
            .tips
            .send(ChainTip {
                height: 77,
                initial_download: false,
            })
            .unwrap();
        let (tx, rx) = oneshot::channel();
        handles.commands.send(SyncCommand::Status { response: tx }).unwrap();
        let status = rx.await.unwrap();
        assert_eq!(status.tip_height, Some(77));
        assert!(status.is_blockchain_synced);

        handles.shutdown.cancel();
        let (_, result) = task.await.unwrap();
        assert!(result.is_ok());
    }
}
