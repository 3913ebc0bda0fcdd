//! Dispatch of UI actions onto the service collaborators
//!
//! Every action runs as its own tokio task so a slow upload never holds up a
//! page fetch or a mark-as-read. Results travel back as `GuiEvent`s.

use crossbeam_channel::Sender;
use tracing::{debug, warn};

use super::services::Services;
use crate::protocol::{BackendAction, GuiEvent};

/// Spawn the work for one action. `Shutdown` is handled by the main loop.
pub fn handle_backend_action(action: BackendAction, services: &Services, event_tx: &Sender<GuiEvent>) {
    let event_tx = event_tx.clone();
    match action {
        BackendAction::FetchPage {
            channel_id,
            before,
            limit,
        } => {
            let source = services.source.clone();
            tokio::spawn(async move {
                match source.fetch_page(&channel_id, before.as_deref(), limit).await {
                    Ok(page) => {
                        debug!(channel = %channel_id, count = page.messages.len(), "page loaded");
                        let _ = event_tx.send(GuiEvent::PageLoaded { channel_id, page });
                    }
                    Err(e) => {
                        warn!(channel = %channel_id, error = %e, "page fetch failed");
                        let _ = event_tx.send(GuiEvent::PageFailed {
                            channel_id,
                            error: e.to_string(),
                        });
                    }
                }
            });
        }

        BackendAction::MarkRead {
            message_id,
            channel_id,
        } => {
            let reads = services.reads.clone();
            // Fire-and-forget: a failure leaves the message unread until next load.
            tokio::spawn(async move {
                if let Err(e) = reads.mark_read(&message_id, &channel_id).await {
                    warn!(message = %message_id, error = %e, "mark-as-read failed");
                }
            });
        }

        BackendAction::SearchUsers { prefix } => {
            let directory = services.directory.clone();
            tokio::spawn(async move {
                let users = match directory.search(&prefix).await {
                    Ok(users) => users,
                    Err(e) => {
                        debug!(%prefix, error = %e, "user lookup failed");
                        Vec::new()
                    }
                };
                let _ = event_tx.send(GuiEvent::UserCandidates { prefix, users });
            });
        }

        BackendAction::Upload(files) => {
            let uploads = services.uploads.clone();
            tokio::spawn(async move {
                let event = match uploads.upload(files).await {
                    Ok(uploaded) => GuiEvent::UploadFinished(uploaded),
                    Err(e) => {
                        warn!(error = %e, "upload failed");
                        GuiEvent::UploadFailed(e.to_string())
                    }
                };
                let _ = event_tx.send(event);
            });
        }

        BackendAction::Send(outgoing) => {
            let sender = services.sender.clone();
            tokio::spawn(async move {
                match sender.send(outgoing).await {
                    Ok(message) => {
                        let _ = event_tx.send(GuiEvent::MessageSent(message));
                    }
                    Err(e) => {
                        let _ = event_tx.send(GuiEvent::Error(format!("Failed to send: {}", e)));
                    }
                }
            });
        }

        BackendAction::Shutdown => {}
    }
}
