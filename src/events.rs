//! Backend event processing (history pages, live updates, uploads, lookups).

use tracing::{debug, warn};

use crate::protocol::{BackendAction, GuiEvent};
use crate::state::ClientState;

/// Apply one backend event to the state. Returns follow-up actions for the
/// backend, such as marking newly displayed unread messages as read.
pub fn process_single_event(state: &mut ClientState, event: GuiEvent) -> Vec<BackendAction> {
    match event {
        GuiEvent::PageLoaded { channel_id, page } => {
            if channel_id != state.channel_id {
                debug!(%channel_id, "ignoring page for another channel");
                return Vec::new();
            }
            state.loading_history = false;
            state.buffer.push_older_page(page);
            mark_unread(state)
        }

        GuiEvent::PageFailed { channel_id, error } => {
            if channel_id == state.channel_id {
                state.loading_history = false;
            }
            state.push_status(format!("Failed to load history: {}", error));
            Vec::new()
        }

        GuiEvent::MessageUpserted(message) | GuiEvent::MessageSent(message) => {
            state.buffer.upsert(message);
            mark_unread(state)
        }

        GuiEvent::UserCandidates { prefix, users } => {
            state.store_candidates(prefix, users);
            Vec::new()
        }

        GuiEvent::UploadFinished(files) => {
            let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
            let status = format!("Uploaded {}", names.join(", "));
            state.composer.finish_upload(files);
            state.push_status(status);
            Vec::new()
        }

        GuiEvent::UploadFailed(reason) => {
            state.composer.fail_upload();
            state.push_status(format!("Upload failed: {}", reason));
            Vec::new()
        }

        GuiEvent::Error(msg) => {
            warn!("{}", msg);
            state.push_status(format!("Error: {}", msg));
            Vec::new()
        }
    }
}

fn mark_unread(state: &mut ClientState) -> Vec<BackendAction> {
    state
        .buffer
        .unread_to_mark()
        .into_iter()
        .map(|message_id| BackendAction::MarkRead {
            message_id,
            channel_id: state.channel_id.clone(),
        })
        .collect()
}
