use std::collections::HashSet;

use crate::grouping::{DisplayRow, GroupingPolicy};
use crate::message::{Message, MessageId};
use crate::pagination::merge_pages;
use crate::protocol::Page;
use crate::thread::ThreadAssembler;

/// History and render cache for one conversation.
///
/// Pages are stored oldest first, so the merged collection's natural order is
/// arrival order from the oldest loaded message onward. Live messages are
/// appended to the newest page. A message already loaded is never replaced
/// by an older fetch; only live updates change it.
#[derive(Clone, Debug, Default)]
pub struct ConversationBuffer {
    pages: Vec<Vec<Message>>,
    merged: Vec<Message>,
    rows: Vec<DisplayRow>,
    assembler: ThreadAssembler,
    grouping: GroupingPolicy,
    /// Unread ids already handed to the read tracker this session
    dispatched_reads: HashSet<MessageId>,
    /// Oldest id the source has returned, even if its copy was discarded
    cursor: Option<MessageId>,
    end_of_stream: bool,
}

impl ConversationBuffer {
    pub fn new(assembler: ThreadAssembler, grouping: GroupingPolicy) -> Self {
        Self {
            assembler,
            grouping,
            ..Self::default()
        }
    }

    /// Add a page of older history in front of what is already loaded.
    pub fn push_older_page(&mut self, page: Page) {
        self.end_of_stream = page.end_of_stream;
        if let Some(first) = page.messages.first() {
            self.cursor = Some(first.id.clone());
        }
        let loaded: HashSet<&str> = self.merged.iter().map(|m| m.id.as_str()).collect();
        let fresh: Vec<Message> = page
            .messages
            .into_iter()
            .filter(|m| !loaded.contains(m.id.as_str()))
            .collect();
        if !fresh.is_empty() {
            self.pages.insert(0, fresh);
        }
        self.rebuild();
    }

    /// Apply a live update: replace an existing message in place or append it.
    pub fn upsert(&mut self, message: Message) {
        let existing = self
            .pages
            .iter_mut()
            .flat_map(|page| page.iter_mut())
            .find(|m| m.id == message.id);
        match existing {
            Some(slot) => *slot = message,
            None => match self.pages.last_mut() {
                Some(page) => page.push(message),
                None => self.pages.push(vec![message]),
            },
        }
        self.rebuild();
    }

    /// Re-run merge, assembly and grouping from the stored pages.
    pub fn rebuild(&mut self) {
        self.merged = merge_pages(self.pages.iter().map(Vec::as_slice));
        let items = self.assembler.assemble(&self.merged);
        self.rows = self.grouping.annotate(items);
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn messages(&self) -> &[Message] {
        &self.merged
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.merged.iter().find(|m| m.id == id)
    }

    /// Cursor for fetching the next older page.
    pub fn oldest_id(&self) -> Option<&MessageId> {
        self.cursor.as_ref()
    }

    pub fn has_more_history(&self) -> bool {
        !self.end_of_stream
    }

    pub fn is_loaded(&self) -> bool {
        !self.pages.is_empty() || self.end_of_stream
    }

    pub fn unread_count(&self) -> usize {
        self.merged.iter().filter(|m| !m.read_by_current_user).count()
    }

    /// Unread messages not yet handed to the read tracker. Each id is
    /// returned at most once per buffer lifetime.
    pub fn unread_to_mark(&mut self) -> Vec<MessageId> {
        let mut fresh = Vec::new();
        for msg in &self.merged {
            if !msg.read_by_current_user && self.dispatched_reads.insert(msg.id.clone()) {
                fresh.push(msg.id.clone());
            }
        }
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::{DayBoundary, RenderItem, ReplyPolicy};
    use chrono::{FixedOffset, TimeZone, Utc};

    fn buffer() -> ConversationBuffer {
        let utc = FixedOffset::east_opt(0).unwrap();
        ConversationBuffer::new(
            ThreadAssembler::new(ReplyPolicy::default()).with_day_boundary(DayBoundary::Fixed(utc)),
            GroupingPolicy::default(),
        )
    }

    fn msg(id: &str, author: &str, minute: u32) -> Message {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap();
        Message::new(id, author, ts, format!("text {id}"))
    }

    fn ids(buf: &ConversationBuffer) -> Vec<String> {
        buf.rows()
            .iter()
            .filter_map(|row| row.item.as_message().map(|m| m.id.clone()))
            .collect()
    }

    #[test]
    fn test_older_pages_are_prepended() {
        let mut buf = buffer();
        buf.push_older_page(Page {
            messages: vec![msg("c", "alice", 20), msg("d", "bob", 30)],
            end_of_stream: false,
        });
        assert_eq!(buf.oldest_id().map(String::as_str), Some("c"));
        buf.push_older_page(Page {
            messages: vec![msg("a", "alice", 0), msg("b", "bob", 10), msg("c", "alice", 20)],
            end_of_stream: true,
        });
        assert_eq!(ids(&buf), vec!["a", "b", "c", "d"]);
        assert_eq!(buf.oldest_id().map(String::as_str), Some("a"));
        assert!(!buf.has_more_history());
    }

    #[test]
    fn test_upsert_replaces_in_place_and_appends_new() {
        let mut buf = buffer();
        buf.push_older_page(Page {
            messages: vec![msg("a", "alice", 0).unread()],
            end_of_stream: true,
        });
        assert_eq!(buf.unread_count(), 1);

        buf.upsert(msg("a", "alice", 0));
        assert_eq!(buf.unread_count(), 0);
        assert_eq!(buf.messages().len(), 1);

        buf.upsert(msg("b", "bob", 1).replying_to("a"));
        assert_eq!(ids(&buf), vec!["a", "b"]);
        assert_eq!(buf.rows()[2].item.depth(), Some(1));
    }

    #[test]
    fn test_upsert_into_empty_buffer() {
        let mut buf = buffer();
        buf.upsert(msg("a", "alice", 0));
        assert_eq!(ids(&buf), vec!["a"]);
    }

    #[test]
    fn test_rows_carry_grouping() {
        let mut buf = buffer();
        buf.push_older_page(Page {
            messages: vec![msg("a", "alice", 0), msg("b", "alice", 3), msg("c", "bob", 4)],
            end_of_stream: true,
        });
        let grouped: Vec<bool> = buf.rows().iter().map(|r| r.grouped).collect();
        assert!(matches!(buf.rows()[0].item, RenderItem::DateDivider(_)));
        assert_eq!(grouped, vec![false, false, true, false]);
    }

    #[test]
    fn test_refetch_keeps_live_read_state() {
        let mut buf = buffer();
        buf.push_older_page(Page {
            messages: vec![msg("a", "alice", 0).unread(), msg("b", "bob", 1)],
            end_of_stream: false,
        });
        assert_eq!(buf.unread_to_mark(), vec!["a".to_string()]);
        buf.upsert(msg("a", "alice", 0));
        assert_eq!(buf.unread_count(), 0);

        // An overlapping older page still carries the stale unread copy.
        buf.push_older_page(Page {
            messages: vec![msg("z", "carol", 0), msg("a", "alice", 0).unread()],
            end_of_stream: true,
        });
        assert_eq!(buf.unread_count(), 0);
        assert!(!buf.rows().iter().any(|r| matches!(r.item, RenderItem::UnreadDivider)));
        assert_eq!(ids(&buf), vec!["z", "a", "b"]);
        assert_eq!(buf.oldest_id().map(String::as_str), Some("z"));
    }

    #[test]
    fn test_duplicate_only_page_changes_nothing() {
        let mut buf = buffer();
        buf.push_older_page(Page {
            messages: vec![msg("b", "bob", 1)],
            end_of_stream: false,
        });
        buf.push_older_page(Page {
            messages: vec![msg("a", "alice", 0), msg("b", "bob", 1)],
            end_of_stream: false,
        });
        let mut edited = msg("a", "alice", 0);
        edited.content = "edited".into();
        buf.upsert(edited);
        buf.push_older_page(Page {
            messages: vec![msg("a", "alice", 0)],
            end_of_stream: false,
        });
        assert_eq!(buf.get("a").map(|m| m.content.as_str()), Some("edited"));
        assert_eq!(buf.messages().len(), 2);
        assert_eq!(buf.oldest_id().map(String::as_str), Some("a"));
    }

    #[test]
    fn test_unread_dispatched_once() {
        let mut buf = buffer();
        buf.push_older_page(Page {
            messages: vec![msg("a", "alice", 0).unread(), msg("b", "bob", 1).unread()],
            end_of_stream: true,
        });
        assert_eq!(buf.unread_to_mark(), vec!["a".to_string(), "b".to_string()]);
        assert!(buf.unread_to_mark().is_empty());
        buf.upsert(msg("c", "carol", 2).unread());
        assert_eq!(buf.unread_to_mark(), vec!["c".to_string()]);
    }
}
