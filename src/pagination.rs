//! Merging of fetched message pages into one working set.

use std::collections::HashSet;

use crate::message::Message;

/// Merge pages into a single collection, deduplicated by message id.
///
/// Pages are walked in the order given and messages keep their position within
/// each page. When the same id shows up twice (a re-fetched page overlapping a
/// previous one) the first copy wins. No chronological ordering is applied.
pub fn merge_pages<'a, I>(pages: I) -> Vec<Message>
where
    I: IntoIterator<Item = &'a [Message]>,
{
    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut merged = Vec::new();
    for page in pages {
        for msg in page {
            if seen.insert(msg.id.as_str()) {
                merged.push(msg.clone());
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn msg(id: &str, minute: u32) -> Message {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap();
        Message::new(id, "alice", ts, id)
    }

    #[test]
    fn test_merge_dedupes_overlapping_pages() {
        let page1 = vec![msg("a", 0), msg("b", 1)];
        let page2 = vec![msg("b", 1), msg("c", 2)];
        let merged = merge_pages([page1.as_slice(), page2.as_slice()]);
        let ids: Vec<&str> = merged.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_keeps_arrival_order_not_time_order() {
        let page = vec![msg("late", 30), msg("early", 1)];
        let merged = merge_pages([page.as_slice()]);
        assert_eq!(merged[0].id, "late");
        assert_eq!(merged[1].id, "early");
    }

    #[test]
    fn test_merge_empty() {
        let pages: Vec<Vec<Message>> = Vec::new();
        assert!(merge_pages(pages.iter().map(|p| p.as_slice())).is_empty());
    }
}
