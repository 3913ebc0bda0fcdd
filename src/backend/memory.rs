//! In-process implementation of every service collaborator.
//!
//! Holds a single conversation in memory. Used by the desktop binary when no
//! server is configured and by the tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tokio::sync::broadcast;
use tracing::debug;

use super::services::{FileUploader, MessageSender, MessageSource, ReadTracker, Services, UserDirectory};
use crate::composer::mention::filter_candidates;
use crate::error::{ServiceError, ServiceResult};
use crate::message::{Message, Reaction, UserId};
use crate::protocol::{FilePayload, OutgoingMessage, Page, UploadedFile, UserCandidate};

const LIVE_CAPACITY: usize = 256;

pub struct InMemoryServices {
    author_id: UserId,
    /// Arrival order
    messages: Mutex<Vec<Message>>,
    users: Vec<UserCandidate>,
    live: broadcast::Sender<Message>,
    next_id: AtomicU64,
    fail_reads: AtomicBool,
    fail_uploads: AtomicBool,
    fail_directory: AtomicBool,
}

impl InMemoryServices {
    pub fn new(author_id: impl Into<UserId>, messages: Vec<Message>, users: Vec<UserCandidate>) -> Self {
        let (live, _) = broadcast::channel(LIVE_CAPACITY);
        Self {
            author_id: author_id.into(),
            messages: Mutex::new(messages),
            users,
            live,
            next_id: AtomicU64::new(1),
            fail_reads: AtomicBool::new(false),
            fail_uploads: AtomicBool::new(false),
            fail_directory: AtomicBool::new(false),
        }
    }

    /// A small demo conversation spanning two days with replies and unread
    /// messages.
    pub fn seeded(author_id: impl Into<UserId>) -> Self {
        let now = Utc::now();
        let ago = |minutes: i64| now - TimeDelta::minutes(minutes);
        let messages = vec![
            Message::new("s1", "alice", ago(26 * 60), "Morning! Standup notes are in the doc."),
            Message::new("s2", "alice", ago(26 * 60 - 2), "Ping me if anything is unclear."),
            Message::new("s3", "bob", ago(25 * 60), "Release branch is cut.").with_reaction(Reaction {
                emoji: "🎉".into(),
                count: 2,
                user_ids: vec!["alice".into(), "carol".into()],
            }),
            Message::new("s4", "carol", ago(24 * 60 + 50), "Nice, I'll start QA.").replying_to("s3"),
            Message::new("s5", "bob", ago(90), "Anyone seen the flaky upload test?"),
            Message::new("s6", "alice", ago(80), "Yes, it's the timeout in CI.")
                .replying_to("s5")
                .unread(),
            Message::new("s7", "carol", ago(30), "Lunch at noon?").unread(),
            Message::new("s8", "bob", ago(85), "Thanks, I'll bump it.")
                .replying_to("s6")
                .unread(),
        ];
        let users = vec![
            UserCandidate::new("alice", "alice"),
            UserCandidate::new("bob", "bob"),
            UserCandidate::new("carol", "carol"),
            UserCandidate::new("dave", "dave"),
        ];
        Self::new(author_id, messages, users)
    }

    pub fn services(self: &Arc<Self>) -> Services {
        Services {
            source: self.clone(),
            reads: self.clone(),
            directory: self.clone(),
            uploads: self.clone(),
            sender: self.clone(),
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_directory(&self, fail: bool) {
        self.fail_directory.store(fail, Ordering::SeqCst);
    }

    /// Simulate a message arriving from another participant.
    pub fn push_live(&self, message: Message) -> ServiceResult<()> {
        self.lock()?.push(message.clone());
        self.broadcast(message);
        Ok(())
    }

    pub fn snapshot(&self) -> ServiceResult<Vec<Message>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> ServiceResult<MutexGuard<'_, Vec<Message>>> {
        self.messages
            .lock()
            .map_err(|_| ServiceError::Unavailable("message store poisoned".into()))
    }

    fn broadcast(&self, message: Message) {
        // No subscribers is fine; the update is simply not observed.
        let _ = self.live.send(message);
    }

    fn allocate_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl MessageSource for InMemoryServices {
    async fn fetch_page(
        &self,
        _channel_id: &str,
        before: Option<&str>,
        limit: usize,
    ) -> ServiceResult<Page> {
        let messages = self.lock()?;
        let end = match before {
            Some(id) => messages
                .iter()
                .position(|m| m.id == id)
                .ok_or_else(|| ServiceError::NotFound(format!("message {id}")))?,
            None => messages.len(),
        };
        let start = end.saturating_sub(limit);
        Ok(Page {
            messages: messages[start..end].to_vec(),
            end_of_stream: start == 0,
        })
    }

    fn subscribe(&self, _channel_id: &str) -> broadcast::Receiver<Message> {
        self.live.subscribe()
    }
}

#[async_trait]
impl ReadTracker for InMemoryServices {
    async fn mark_read(&self, message_id: &str, _channel_id: &str) -> ServiceResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("read tracking offline".into()));
        }
        let updated = {
            let mut messages = self.lock()?;
            let msg = messages
                .iter_mut()
                .find(|m| m.id == message_id)
                .ok_or_else(|| ServiceError::NotFound(format!("message {message_id}")))?;
            msg.read_by_current_user = true;
            msg.clone()
        };
        self.broadcast(updated);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryServices {
    async fn search(&self, prefix: &str) -> ServiceResult<Vec<UserCandidate>> {
        if self.fail_directory.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("directory offline".into()));
        }
        Ok(filter_candidates(&self.users, prefix))
    }
}

#[async_trait]
impl FileUploader for InMemoryServices {
    async fn upload(&self, files: Vec<FilePayload>) -> ServiceResult<Vec<UploadedFile>> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(ServiceError::Rejected("upload refused".into()));
        }
        if files.is_empty() {
            return Err(ServiceError::Rejected("no files".into()));
        }
        Ok(files
            .into_iter()
            .map(|file| {
                let id = self.allocate_id("file");
                debug!(%id, name = %file.name, bytes = file.bytes.len(), "stored upload");
                UploadedFile {
                    url: format!("memory://uploads/{}/{}", id, file.name),
                    id,
                    name: file.name,
                    size: file.bytes.len() as u64,
                }
            })
            .collect())
    }
}

#[async_trait]
impl MessageSender for InMemoryServices {
    async fn send(&self, outgoing: OutgoingMessage) -> ServiceResult<Message> {
        let mut content = outgoing.text;
        for file in &outgoing.attachments {
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str(&format!("[{}]({})", file.name, file.url));
        }
        let mut message = Message::new(self.allocate_id("local"), self.author_id.clone(), Utc::now(), content);
        message.reply_to = outgoing.reply_to;
        self.lock()?.push(message.clone());
        self.broadcast(message.clone());
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryServices {
        let now = Utc::now();
        let messages = (0..5)
            .map(|i| Message::new(format!("m{i}"), "alice", now + TimeDelta::seconds(i), "x"))
            .collect();
        InMemoryServices::new("me", messages, vec![UserCandidate::new("u1", "alice")])
    }

    fn ids(page: &Page) -> Vec<&str> {
        page.messages.iter().map(|m| m.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_paging_newest_first() {
        let store = store();
        let newest = store.fetch_page("general", None, 2).await.unwrap();
        assert_eq!(ids(&newest), vec!["m3", "m4"]);
        assert!(!newest.end_of_stream);

        let older = store.fetch_page("general", Some("m3"), 2).await.unwrap();
        assert_eq!(ids(&older), vec!["m1", "m2"]);

        let oldest = store.fetch_page("general", Some("m1"), 2).await.unwrap();
        assert_eq!(ids(&oldest), vec!["m0"]);
        assert!(oldest.end_of_stream);
    }

    #[tokio::test]
    async fn test_unknown_cursor_is_not_found() {
        let store = store();
        let err = store.fetch_page("general", Some("nope"), 2).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_read_broadcasts_update() {
        let store = InMemoryServices::new(
            "me",
            vec![Message::new("a", "bob", Utc::now(), "hi").unread()],
            Vec::new(),
        );
        let mut live = store.subscribe("general");
        store.mark_read("a", "general").await.unwrap();
        let update = live.recv().await.unwrap();
        assert_eq!(update.id, "a");
        assert!(update.read_by_current_user);

        store.set_fail_reads(true);
        assert!(store.mark_read("a", "general").await.is_err());
    }

    #[tokio::test]
    async fn test_send_appends_attachment_links() {
        let store = store();
        let files = store
            .upload(vec![FilePayload {
                name: "log.txt".into(),
                bytes: vec![1, 2, 3],
            }])
            .await
            .unwrap();
        assert_eq!(files[0].size, 3);

        let sent = store
            .send(OutgoingMessage {
                channel_id: "general".into(),
                text: "see log".into(),
                attachments: files.clone(),
                reply_to: Some("m1".into()),
            })
            .await
            .unwrap();
        assert_eq!(sent.author_id, "me");
        assert_eq!(sent.reply_to.as_deref(), Some("m1"));
        assert_eq!(sent.content, format!("see log\n[log.txt]({})", files[0].url));
        assert_eq!(store.snapshot().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_directory_failure() {
        let store = store();
        assert_eq!(store.search("al").await.unwrap().len(), 1);
        store.set_fail_directory(true);
        assert!(store.search("al").await.is_err());
    }
}
