//! Backend event loop bridging the UI channels and the async services.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::handlers;
use super::services::Services;
use crate::message::ChannelId;
use crate::protocol::{BackendAction, GuiEvent};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the backend event loop on a tokio runtime
///
/// Returns when `BackendAction::Shutdown` arrives or the UI drops its sender.
pub fn run_backend(
    services: Services,
    channel_id: ChannelId,
    action_rx: Receiver<BackendAction>,
    event_tx: Sender<GuiEvent>,
) {
    // Create a Tokio runtime for this thread
    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = event_tx.send(GuiEvent::Error(format!(
                "Failed to create Tokio runtime: {}",
                e
            )));
            return;
        }
    };

    rt.block_on(async move {
        let mut live = services.source.subscribe(&channel_id);
        let mut live_open = true;
        info!(channel = %channel_id, "backend started");

        loop {
            // Check for actions from the UI (non-blocking)
            loop {
                match action_rx.try_recv() {
                    Ok(BackendAction::Shutdown) => {
                        info!("backend shutting down");
                        return;
                    }
                    Ok(action) => handlers::handle_backend_action(action, &services, &event_tx),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        debug!("ui dropped the action channel");
                        return;
                    }
                }
            }

            if !live_open {
                tokio::time::sleep(POLL_INTERVAL).await;
                continue;
            }

            // Forward live updates (with short timeout so we can check for actions)
            match timeout(POLL_INTERVAL, live.recv()).await {
                Ok(Ok(message)) => {
                    let _ = event_tx.send(GuiEvent::MessageUpserted(message));
                }
                Ok(Err(RecvError::Lagged(skipped))) => {
                    warn!(skipped, "live updates lagged; some changes will show on next load");
                }
                Ok(Err(RecvError::Closed)) => {
                    warn!("live update channel closed");
                    live_open = false;
                }
                Err(_) => {
                    // Timeout - this is normal, just loop
                }
            }
        }
    });
}
