//! Core application state, separated from UI logic.
//!
//! `ClientState` holds everything that represents the conversation session:
//! the loaded history, the composer, cached mention candidates and status
//! toasts. UI components receive it as a parameter rather than owning it.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::debug;

use crate::buffer::ConversationBuffer;
use crate::composer::ComposerState;
use crate::config::Settings;
use crate::message::{ChannelId, UserId};
use crate::protocol::{BackendAction, FilePayload, UserCandidate};
use crate::thread::ThreadAssembler;
use crate::validation::SendRejection;

/// Core application state for the client.
#[derive(Debug)]
pub struct ClientState {
    pub channel_id: ChannelId,
    /// The signed-in user.
    pub user_id: UserId,

    /// Loaded history and its render rows.
    pub buffer: ConversationBuffer,

    pub composer: ComposerState,

    /// Directory results keyed by the prefix they were requested for.
    pub mention_candidates: HashMap<String, Vec<UserCandidate>>,
    /// Prefixes with a lookup in flight.
    pending_searches: HashSet<String>,

    /// Status toast messages with creation time (auto-expire).
    pub status_messages: Vec<(String, Instant)>,

    /// A history page request is in flight.
    pub loading_history: bool,
    pub page_size: usize,
}

impl ClientState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            channel_id: settings.channel_id.clone(),
            user_id: settings.user_id.clone(),
            buffer: ConversationBuffer::new(
                ThreadAssembler::new(settings.reply_policy()),
                settings.grouping_policy(),
            ),
            composer: ComposerState::new(settings.mention_trigger()),
            mention_candidates: HashMap::new(),
            pending_searches: HashSet::new(),
            status_messages: Vec::new(),
            loading_history: false,
            page_size: settings.page_size.max(1),
        }
    }

    /// Request the next older page, or the newest one when nothing is
    /// loaded yet. Returns `None` while a request is in flight or once the
    /// stream is exhausted.
    pub fn request_page(&mut self) -> Option<BackendAction> {
        if self.loading_history || !self.buffer.has_more_history() {
            return None;
        }
        self.loading_history = true;
        Some(BackendAction::FetchPage {
            channel_id: self.channel_id.clone(),
            before: self.buffer.oldest_id().cloned(),
            limit: self.page_size,
        })
    }

    /// Cached candidates for `prefix`, if the directory has answered.
    pub fn candidates_for(&self, prefix: &str) -> Option<&[UserCandidate]> {
        self.mention_candidates.get(prefix).map(Vec::as_slice)
    }

    /// Lookup action for `prefix`, issued once per prefix until answered.
    pub fn request_candidates(&mut self, prefix: &str) -> Option<BackendAction> {
        if self.mention_candidates.contains_key(prefix) || !self.pending_searches.insert(prefix.to_string()) {
            return None;
        }
        Some(BackendAction::SearchUsers {
            prefix: prefix.to_string(),
        })
    }

    pub fn store_candidates(&mut self, prefix: String, users: Vec<UserCandidate>) {
        self.pending_searches.remove(&prefix);
        self.mention_candidates.insert(prefix, users);
    }

    /// Start an upload for the composer. Refused while one is running.
    pub fn start_upload(&mut self, files: Vec<FilePayload>) -> Option<BackendAction> {
        if files.is_empty() {
            return None;
        }
        if self.composer.uploading {
            self.push_status("Wait for the current upload to finish");
            return None;
        }
        debug!(count = files.len(), "starting upload");
        self.composer.begin_upload();
        Some(BackendAction::Upload(files))
    }

    /// Take the composed message for sending. On refusal the composer is
    /// untouched and a toast explains why.
    pub fn send_composed(&mut self) -> Result<BackendAction, SendRejection> {
        match self.composer.take_outgoing(&self.channel_id) {
            Ok(outgoing) => Ok(BackendAction::Send(outgoing)),
            Err(rejection) => {
                self.push_status(rejection.to_string());
                Err(rejection)
            }
        }
    }

    pub fn push_status(&mut self, text: impl Into<String>) {
        self.status_messages.push((text.into(), Instant::now()));
    }

    /// Purge status messages older than the given duration.
    pub fn purge_old_status_messages(&mut self, max_age_secs: u64) {
        self.status_messages
            .retain(|(_, created)| created.elapsed().as_secs() < max_age_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Page;

    fn state() -> ClientState {
        ClientState::new(&Settings {
            page_size: 10,
            ..Settings::default()
        })
    }

    #[test]
    fn test_client_state_new() {
        let state = state();
        assert_eq!(state.channel_id, "general");
        assert!(!state.loading_history);
        assert!(state.buffer.rows().is_empty());
        assert!(state.status_messages.is_empty());
    }

    #[test]
    fn test_request_page_single_flight() {
        let mut state = state();
        match state.request_page() {
            Some(BackendAction::FetchPage { before, limit, .. }) => {
                assert!(before.is_none());
                assert_eq!(limit, 10);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(state.request_page().is_none());

        state.loading_history = false;
        state.buffer.push_older_page(Page {
            messages: Vec::new(),
            end_of_stream: true,
        });
        assert!(state.request_page().is_none());
    }

    #[test]
    fn test_candidate_requests_deduplicated() {
        let mut state = state();
        assert!(state.request_candidates("al").is_some());
        assert!(state.request_candidates("al").is_none());
        state.store_candidates("al".into(), vec![UserCandidate::new("u1", "alice")]);
        assert_eq!(state.candidates_for("al").map(<[_]>::len), Some(1));
        assert!(state.request_candidates("al").is_none());
        assert!(state.candidates_for("bo").is_none());
    }

    #[test]
    fn test_upload_gate() {
        let mut state = state();
        assert!(state.start_upload(Vec::new()).is_none());
        let file = FilePayload {
            name: "a.txt".into(),
            bytes: vec![0],
        };
        assert!(state.start_upload(vec![file.clone()]).is_some());
        assert!(state.composer.uploading);
        assert!(state.start_upload(vec![file]).is_none());
        assert_eq!(state.status_messages.len(), 1);
    }

    #[test]
    fn test_send_refusal_shows_status() {
        let mut state = state();
        assert_eq!(state.send_composed().unwrap_err(), SendRejection::Empty);
        assert_eq!(state.status_messages[0].0, "nothing to send");
    }

    #[test]
    fn test_purge_old_status_messages() {
        let mut state = state();
        state.push_status("fresh");
        state.purge_old_status_messages(4);
        assert_eq!(state.status_messages.len(), 1);
        state.purge_old_status_messages(0);
        assert!(state.status_messages.is_empty());
    }
}
