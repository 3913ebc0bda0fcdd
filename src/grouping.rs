//! Visual grouping of consecutive messages from the same author.

use chrono::TimeDelta;

use crate::thread::RenderItem;

/// Same-author messages closer together than this collapse under one header.
pub const DEFAULT_GROUP_WINDOW_SECS: u64 = 7 * 60;

/// A render item annotated with whether its author header is suppressed.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayRow {
    pub item: RenderItem,
    pub grouped: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupingPolicy {
    window: TimeDelta,
}

impl Default for GroupingPolicy {
    fn default() -> Self {
        Self::from_secs(DEFAULT_GROUP_WINDOW_SECS)
    }
}

impl GroupingPolicy {
    pub fn from_secs(secs: u64) -> Self {
        let secs = i64::try_from(secs).unwrap_or(i64::MAX / 1000);
        Self {
            window: TimeDelta::try_seconds(secs).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Pairwise check against the immediately preceding render item.
    ///
    /// Dividers and the start of the list always break a group. The time gap
    /// is compared as an absolute difference because replies are not sorted.
    pub fn is_grouped(&self, previous: Option<&RenderItem>, current: &RenderItem) -> bool {
        let (Some(prev), Some(cur)) = (previous.and_then(RenderItem::as_message), current.as_message())
        else {
            return false;
        };
        prev.author_id == cur.author_id && (cur.timestamp - prev.timestamp).abs() < self.window
    }

    pub fn annotate(&self, items: Vec<RenderItem>) -> Vec<DisplayRow> {
        let mut rows: Vec<DisplayRow> = Vec::with_capacity(items.len());
        for item in items {
            let grouped = self.is_grouped(rows.last().map(|row| &row.item), &item);
            rows.push(DisplayRow { item, grouped });
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn item(id: &str, author: &str, secs: u32) -> RenderItem {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + TimeDelta::seconds(secs.into());
        RenderItem::Message {
            message: Message::new(id, author, ts, id),
            depth: 0,
        }
    }

    #[test]
    fn test_grouping_threshold_is_strict() {
        let policy = GroupingPolicy::default();
        let first = item("a", "alice", 0);
        assert!(policy.is_grouped(Some(&first), &item("b", "alice", 6 * 60 + 59)));
        assert!(!policy.is_grouped(Some(&first), &item("c", "alice", 7 * 60)));
    }

    #[test]
    fn test_different_author_never_groups() {
        let policy = GroupingPolicy::default();
        assert!(!policy.is_grouped(Some(&item("a", "alice", 0)), &item("b", "bob", 5)));
    }

    #[test]
    fn test_dividers_and_list_start_break_groups() {
        let policy = GroupingPolicy::default();
        let date = RenderItem::DateDivider(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(!policy.is_grouped(None, &item("a", "alice", 0)));
        assert!(!policy.is_grouped(Some(&date), &item("a", "alice", 0)));
        assert!(!policy.is_grouped(Some(&RenderItem::UnreadDivider), &item("a", "alice", 0)));
        assert!(!policy.is_grouped(Some(&item("a", "alice", 0)), &date));
    }

    #[test]
    fn test_out_of_order_reply_uses_absolute_gap() {
        let policy = GroupingPolicy::default();
        assert!(policy.is_grouped(Some(&item("a", "alice", 120)), &item("b", "alice", 0)));
    }

    #[test]
    fn test_annotate_pairs_each_row_with_predecessor() {
        let policy = GroupingPolicy::default();
        let rows = policy.annotate(vec![
            RenderItem::DateDivider(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            item("a", "alice", 0),
            item("b", "alice", 60),
            RenderItem::UnreadDivider,
            item("c", "alice", 120),
            item("d", "bob", 130),
            item("e", "bob", 1000),
        ]);
        let grouped: Vec<bool> = rows.iter().map(|r| r.grouped).collect();
        assert_eq!(grouped, vec![false, false, true, false, false, false, false]);
    }

    #[test]
    fn test_custom_window() {
        let policy = GroupingPolicy::from_secs(60);
        assert!(policy.is_grouped(Some(&item("a", "alice", 0)), &item("b", "alice", 59)));
        assert!(!policy.is_grouped(Some(&item("a", "alice", 0)), &item("b", "alice", 60)));
    }
}
