//! Contracts of the external collaborators the client talks to.
//!
//! Each trait is object safe so the backend can hold them as `Arc<dyn _>` and
//! swap the in-memory implementation for a network one.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::ServiceResult;
use crate::message::Message;
use crate::protocol::{FilePayload, OutgoingMessage, Page, UploadedFile, UserCandidate};

/// Paginated history plus a live-update stream.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Page of messages older than `before` (the newest page when `None`),
    /// in arrival order.
    async fn fetch_page(
        &self,
        channel_id: &str,
        before: Option<&str>,
        limit: usize,
    ) -> ServiceResult<Page>;

    /// New or changed messages (edits, reactions, read state).
    fn subscribe(&self, channel_id: &str) -> broadcast::Receiver<Message>;
}

#[async_trait]
pub trait ReadTracker: Send + Sync {
    async fn mark_read(&self, message_id: &str, channel_id: &str) -> ServiceResult<()>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn search(&self, prefix: &str) -> ServiceResult<Vec<UserCandidate>>;
}

#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload(&self, files: Vec<FilePayload>) -> ServiceResult<Vec<UploadedFile>>;
}

#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, outgoing: OutgoingMessage) -> ServiceResult<Message>;
}

/// The full set of collaborators handed to the backend loop.
#[derive(Clone)]
pub struct Services {
    pub source: Arc<dyn MessageSource>,
    pub reads: Arc<dyn ReadTracker>,
    pub directory: Arc<dyn UserDirectory>,
    pub uploads: Arc<dyn FileUploader>,
    pub sender: Arc<dyn MessageSender>,
}
