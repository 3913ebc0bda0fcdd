//! Conversation data model shared by the thread assembler, the composer and the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MessageId = String;
pub type UserId = String;
pub type ChannelId = String;

/// An emoji reaction attached to a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: String,
    pub count: u32,
    pub user_ids: Vec<UserId>,
}

/// A chat message as delivered by the messaging backend.
///
/// The client only reads these fields; a message is treated as immutable for
/// the duration of one assembly pass. Live updates replace it wholesale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author_id: UserId,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    /// Parent message id. `None` means this is a root message.
    #[serde(default)]
    pub reply_to: Option<MessageId>,
    #[serde(default = "default_read")]
    pub read_by_current_user: bool,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

fn default_read() -> bool {
    true
}

impl Message {
    pub fn new(
        id: impl Into<MessageId>,
        author_id: impl Into<UserId>,
        timestamp: DateTime<Utc>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            timestamp,
            content: content.into(),
            reply_to: None,
            read_by_current_user: true,
            reactions: Vec::new(),
        }
    }

    pub fn replying_to(mut self, parent: impl Into<MessageId>) -> Self {
        self.reply_to = Some(parent.into());
        self
    }

    pub fn unread(mut self) -> Self {
        self.read_by_current_user = false;
        self
    }

    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.reactions.push(reaction);
        self
    }

    pub fn is_root(&self) -> bool {
        self.reply_to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_builder_defaults() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let msg = Message::new("m1", "alice", ts, "hi");
        assert!(msg.is_root());
        assert!(msg.read_by_current_user);
        assert!(msg.reactions.is_empty());

        let reply = Message::new("m2", "bob", ts, "yo").replying_to("m1").unread();
        assert_eq!(reply.reply_to.as_deref(), Some("m1"));
        assert!(!reply.read_by_current_user);
    }

    #[test]
    fn test_deserialize_missing_optional_fields() {
        let json = r#"{"id":"m1","author_id":"alice","timestamp":"2024-03-01T09:00:00Z","content":"hi"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert!(msg.is_root());
        assert!(msg.read_by_current_user);
    }
}
