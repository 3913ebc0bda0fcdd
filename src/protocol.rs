//! Messages exchanged between the UI thread and the service backend.

use serde::{Deserialize, Serialize};

use crate::message::{ChannelId, Message, MessageId, UserId};

/// A user offered by the directory for mention completion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCandidate {
    pub id: UserId,
    pub name: String,
}

impl UserCandidate {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Descriptor returned by the upload service. Opaque to the composer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub url: String,
}

/// A binary payload picked or pasted by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePayload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One page from the message source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub messages: Vec<Message>,
    /// No older history remains.
    pub end_of_stream: bool,
}

/// Payload of the send action.
#[derive(Clone, Debug, PartialEq)]
pub struct OutgoingMessage {
    pub channel_id: ChannelId,
    pub text: String,
    pub attachments: Vec<UploadedFile>,
    pub reply_to: Option<MessageId>,
}

/// Actions sent from the UI to the Backend
#[derive(Debug, Clone)]
pub enum BackendAction {
    /// Fetch the page of history older than `before` (newest page when `None`)
    FetchPage {
        channel_id: ChannelId,
        before: Option<MessageId>,
        limit: usize,
    },
    /// Mark one message read; fire-and-forget
    MarkRead {
        message_id: MessageId,
        channel_id: ChannelId,
    },
    /// Look up mention candidates for a prefix
    SearchUsers { prefix: String },
    /// Upload files for the composer
    Upload(Vec<FilePayload>),
    /// Send a composed message
    Send(OutgoingMessage),
    /// Stop the backend loop
    Shutdown,
}

/// Events sent from the Backend to the UI
#[derive(Debug, Clone)]
pub enum GuiEvent {
    /// A history page arrived
    PageLoaded { channel_id: ChannelId, page: Page },
    /// A history fetch failed; the request may be retried
    PageFailed { channel_id: ChannelId, error: String },
    /// A message arrived or changed (edit, reaction, read state)
    MessageUpserted(Message),
    /// Directory results for a mention prefix; empty on lookup failure
    UserCandidates {
        prefix: String,
        users: Vec<UserCandidate>,
    },
    UploadFinished(Vec<UploadedFile>),
    UploadFailed(String),
    /// The send action accepted the message
    MessageSent(Message),
    /// Non-fatal error for the status bar
    Error(String),
}
