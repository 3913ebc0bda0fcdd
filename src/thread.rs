//! Reply-aware assembly of a message collection into an ordered render list.
//!
//! Roots are ordered chronologically; replies follow their root in arrival
//! order. Date dividers separate calendar days and a single unread divider
//! marks the first unread message.

use std::collections::HashMap;

use chrono::{FixedOffset, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Deepest nesting level rendered for replies. Longer chains are re-parented
/// onto the ancestor sitting at this depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaxReplyDepth(pub u8);

impl Default for MaxReplyDepth {
    fn default() -> Self {
        Self(1)
    }
}

impl MaxReplyDepth {
    fn get(self) -> usize {
        usize::from(self.0.max(1))
    }
}

/// What to do with a reply whose parent chain does not reach a known root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Exclude the orphan (and anything replying to it) from the render list.
    #[default]
    Drop,
    /// Render the topmost resolvable message of the chain as a root.
    Promote,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPolicy {
    #[serde(default)]
    pub max_depth: MaxReplyDepth,
    #[serde(default)]
    pub orphans: OrphanPolicy,
}

/// Which clock decides where one calendar day ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DayBoundary {
    #[default]
    Local,
    Fixed(FixedOffset),
}

/// One element of the list handed to the display layer.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderItem {
    Message { message: Message, depth: u8 },
    DateDivider(NaiveDate),
    UnreadDivider,
}

impl RenderItem {
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            RenderItem::Message { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn depth(&self) -> Option<u8> {
        match self {
            RenderItem::Message { depth, .. } => Some(*depth),
            _ => None,
        }
    }
}

/// Where a message ends up after reply resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placement {
    Root,
    Reply { parent: usize, depth: u8 },
    Dropped,
}

/// Transient index entry: a message plus its direct replies in arrival order.
struct ReplyNode<'a> {
    message: &'a Message,
    replies: Vec<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct ThreadAssembler {
    policy: ReplyPolicy,
    day_boundary: DayBoundary,
}

impl ThreadAssembler {
    pub fn new(policy: ReplyPolicy) -> Self {
        Self {
            policy,
            day_boundary: DayBoundary::Local,
        }
    }

    pub fn with_day_boundary(mut self, day_boundary: DayBoundary) -> Self {
        self.day_boundary = day_boundary;
        self
    }

    /// Build the render list for a merged message collection.
    ///
    /// Pure and idempotent: the same input always yields the same output.
    pub fn assemble(&self, messages: &[Message]) -> Vec<RenderItem> {
        match self.day_boundary {
            DayBoundary::Local => self.assemble_in(messages, &Local),
            DayBoundary::Fixed(offset) => self.assemble_in(messages, &offset),
        }
    }

    fn assemble_in<Tz: TimeZone>(&self, messages: &[Message], tz: &Tz) -> Vec<RenderItem> {
        let mut by_id: HashMap<&str, usize> = HashMap::with_capacity(messages.len());
        for (idx, msg) in messages.iter().enumerate() {
            by_id.entry(msg.id.as_str()).or_insert(idx);
        }

        let placements = self.place_all(messages, &by_id);

        let mut nodes: Vec<ReplyNode<'_>> = messages
            .iter()
            .map(|message| ReplyNode {
                message,
                replies: Vec::new(),
            })
            .collect();
        let mut roots = Vec::new();
        for (idx, placement) in placements.iter().enumerate() {
            match *placement {
                Placement::Root => roots.push(idx),
                Placement::Reply { parent, .. } => nodes[parent].replies.push(idx),
                Placement::Dropped => {}
            }
        }

        // Stable: equal timestamps keep arrival order.
        roots.sort_by_key(|&idx| nodes[idx].message.timestamp);

        let first_unread = messages
            .iter()
            .enumerate()
            .find(|(idx, msg)| {
                !msg.read_by_current_user && placements[*idx] != Placement::Dropped
            })
            .map(|(idx, _)| idx);

        let mut emitter = Emitter {
            nodes: &nodes,
            tz,
            last_date: None,
            first_unread,
            items: Vec::with_capacity(messages.len() + 2),
        };
        for root in roots {
            emitter.emit_tree(root, 0, &placements);
        }
        emitter.items
    }

    /// Resolve where every message hangs.
    ///
    /// Each `reply_to` chain is walked once: the walk stops at the first
    /// ancestor already resolved and the result is handed back down the chain.
    fn place_all(&self, messages: &[Message], by_id: &HashMap<&str, usize>) -> Vec<Placement> {
        let max_depth = self.policy.max_depth.get();
        let mut resolved: Vec<Option<Lineage>> = vec![None; messages.len()];
        let mut on_walk = vec![false; messages.len()];
        let mut walk = Vec::new();

        for start in 0..messages.len() {
            let mut current = start;
            let mut above = loop {
                if let Some(lineage) = &resolved[current] {
                    break lineage.clone();
                }
                walk.push(current);
                on_walk[current] = true;
                let Some(parent_id) = messages[current].reply_to.as_deref() else {
                    walk.pop();
                    break Lineage::top(current);
                };
                match by_id.get(parent_id) {
                    // Cycles never reach a root; there is no sensible top to promote.
                    Some(&parent) if on_walk[parent] => break Lineage::Dropped,
                    Some(&parent) => current = parent,
                    None => {
                        walk.pop();
                        break match self.policy.orphans {
                            OrphanPolicy::Drop => Lineage::Dropped,
                            OrphanPolicy::Promote => Lineage::top(current),
                        };
                    }
                }
            };
            on_walk[current] = false;
            resolved[current] = Some(above.clone());
            while let Some(idx) = walk.pop() {
                on_walk[idx] = false;
                above = above.child(idx, max_depth);
                resolved[idx] = Some(above.clone());
            }
        }

        resolved
            .into_iter()
            .map(|lineage| match lineage {
                Some(Lineage::Placed { levels: 0, .. }) => Placement::Root,
                Some(Lineage::Placed { path, levels }) => {
                    let depth = levels.min(max_depth);
                    Placement::Reply {
                        parent: path[depth - 1],
                        depth: depth as u8,
                    }
                }
                Some(Lineage::Dropped) | None => Placement::Dropped,
            })
            .collect()
    }
}

/// Resolved ancestry of one message.
#[derive(Clone, Debug)]
enum Lineage {
    /// `path` runs from the top of the thread downward and holds at most
    /// `max_depth` entries; `levels` is the distance to the top.
    Placed { path: Vec<usize>, levels: usize },
    Dropped,
}

impl Lineage {
    fn top(idx: usize) -> Self {
        Lineage::Placed {
            path: vec![idx],
            levels: 0,
        }
    }

    fn child(&self, idx: usize, max_depth: usize) -> Self {
        match self {
            Lineage::Placed { path, levels } => {
                let mut path = path.clone();
                if path.len() < max_depth {
                    path.push(idx);
                }
                Lineage::Placed {
                    path,
                    levels: levels + 1,
                }
            }
            Lineage::Dropped => Lineage::Dropped,
        }
    }
}

struct Emitter<'a, 'n, Tz: TimeZone> {
    nodes: &'a [ReplyNode<'n>],
    tz: &'a Tz,
    last_date: Option<NaiveDate>,
    first_unread: Option<usize>,
    items: Vec<RenderItem>,
}

impl<Tz: TimeZone> Emitter<'_, '_, Tz> {
    fn emit_tree(&mut self, idx: usize, depth: u8, placements: &[Placement]) {
        self.emit(idx, depth);
        let nodes = self.nodes;
        for &reply in &nodes[idx].replies {
            let reply_depth = match placements[reply] {
                Placement::Reply { depth, .. } => depth,
                _ => depth + 1,
            };
            self.emit_tree(reply, reply_depth, placements);
        }
    }

    fn emit(&mut self, idx: usize, depth: u8) {
        let message = self.nodes[idx].message;
        let date = message.timestamp.with_timezone(self.tz).date_naive();
        if self.last_date != Some(date) {
            self.items.push(RenderItem::DateDivider(date));
            self.last_date = Some(date);
        }
        if self.first_unread == Some(idx) {
            self.items.push(RenderItem::UnreadDivider);
            self.first_unread = None;
        }
        self.items.push(RenderItem::Message {
            message: message.clone(),
            depth,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
    }

    fn root(id: &str, ts: DateTime<Utc>) -> Message {
        Message::new(id, "alice", ts, id)
    }

    fn reply(id: &str, parent: &str, ts: DateTime<Utc>) -> Message {
        Message::new(id, "bob", ts, id).replying_to(parent)
    }

    fn utc_assembler(policy: ReplyPolicy) -> ThreadAssembler {
        let utc = FixedOffset::east_opt(0).unwrap();
        ThreadAssembler::new(policy).with_day_boundary(DayBoundary::Fixed(utc))
    }

    /// Compact view: message ids, "D" for date dividers, "U" for unread.
    fn shape(items: &[RenderItem]) -> Vec<String> {
        items
            .iter()
            .map(|item| match item {
                RenderItem::Message { message, depth } => {
                    if *depth == 0 {
                        message.id.clone()
                    } else {
                        format!("{}@{}", message.id, depth)
                    }
                }
                RenderItem::DateDivider(_) => "D".to_string(),
                RenderItem::UnreadDivider => "U".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_two_roots_with_replies_scenario() {
        let messages = vec![
            root("A", at(1, 9, 0)),
            root("B", at(1, 10, 0)),
            reply("A1", "A", at(1, 9, 5)).unread(),
            reply("B1", "B", at(1, 10, 5)),
        ];
        let items = utc_assembler(ReplyPolicy::default()).assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "A", "U", "A1@1", "B", "B1@1"]);
    }

    #[test]
    fn test_roots_sorted_by_timestamp_with_stable_ties() {
        let messages = vec![
            root("late", at(1, 12, 0)),
            root("tie1", at(1, 10, 0)),
            root("early", at(1, 8, 0)),
            root("tie2", at(1, 10, 0)),
        ];
        let items = utc_assembler(ReplyPolicy::default()).assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "early", "tie1", "tie2", "late"]);

        let stamps: Vec<_> = items
            .iter()
            .filter(|i| i.depth() == Some(0))
            .filter_map(|i| i.as_message().map(|m| m.timestamp))
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_replies_keep_arrival_order() {
        let messages = vec![
            root("A", at(1, 9, 0)),
            reply("r1", "A", at(1, 9, 30)),
            reply("r2", "A", at(1, 9, 10)),
            reply("r3", "A", at(1, 9, 20)),
        ];
        let items = utc_assembler(ReplyPolicy::default()).assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "A", "r1@1", "r2@1", "r3@1"]);
    }

    #[test]
    fn test_single_unread_divider_before_the_unread_message() {
        let messages = vec![
            root("A", at(1, 9, 0)),
            root("B", at(1, 9, 30)).unread(),
            root("C", at(1, 10, 0)),
        ];
        let items = utc_assembler(ReplyPolicy::default()).assemble(&messages);
        let unread: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, i)| matches!(i, RenderItem::UnreadDivider))
            .map(|(pos, _)| pos)
            .collect();
        assert_eq!(unread.len(), 1);
        assert_eq!(items[unread[0] + 1].as_message().unwrap().id, "B");
    }

    #[test]
    fn test_first_unread_uses_collection_order() {
        // "C" arrives first in the collection but sorts last; it still owns the divider.
        let messages = vec![
            root("C", at(1, 11, 0)).unread(),
            root("A", at(1, 9, 0)).unread(),
        ];
        let items = utc_assembler(ReplyPolicy::default()).assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "A", "U", "C"]);
    }

    #[test]
    fn test_no_unread_divider_when_all_read() {
        let messages = vec![root("A", at(1, 9, 0)), reply("A1", "A", at(1, 9, 1))];
        let items = utc_assembler(ReplyPolicy::default()).assemble(&messages);
        assert!(!items.iter().any(|i| matches!(i, RenderItem::UnreadDivider)));
    }

    #[test]
    fn test_date_dividers_between_days_only() {
        let messages = vec![
            root("A", at(1, 9, 0)),
            root("B", at(1, 23, 59)),
            root("C", at(2, 0, 1)),
            reply("C1", "C", at(2, 8, 0)),
        ];
        let items = utc_assembler(ReplyPolicy::default()).assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "A", "B", "D", "C", "C1@1"]);
    }

    #[test]
    fn test_reply_on_other_day_gets_divider_and_next_root_another() {
        let messages = vec![
            root("A", at(1, 9, 0)),
            reply("A1", "A", at(2, 9, 0)),
            root("B", at(1, 10, 0)),
        ];
        let items = utc_assembler(ReplyPolicy::default()).assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "A", "D", "A1@1", "D", "B"]);
    }

    #[test]
    fn test_day_boundary_follows_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let assembler =
            ThreadAssembler::new(ReplyPolicy::default()).with_day_boundary(DayBoundary::Fixed(plus_two));
        // 21:30 and 22:30 UTC straddle midnight at +02:00.
        let messages = vec![root("A", at(1, 21, 30)), root("B", at(1, 22, 30))];
        let items = assembler.assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "A", "D", "B"]);
        assert_eq!(
            items[2],
            RenderItem::DateDivider(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap())
        );
    }

    #[test]
    fn test_orphans_are_dropped_by_default() {
        let messages = vec![
            root("A", at(1, 9, 0)),
            reply("X1", "missing", at(1, 9, 1)).unread(),
            reply("X2", "X1", at(1, 9, 2)),
        ];
        let items = utc_assembler(ReplyPolicy::default()).assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "A"]);
    }

    #[test]
    fn test_orphans_promoted_when_configured() {
        let policy = ReplyPolicy {
            orphans: OrphanPolicy::Promote,
            ..ReplyPolicy::default()
        };
        let messages = vec![
            root("A", at(1, 9, 0)),
            reply("X1", "missing", at(1, 8, 0)),
            reply("X2", "X1", at(1, 9, 2)),
        ];
        let items = utc_assembler(policy).assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "X1", "X2@1", "A"]);
    }

    #[test]
    fn test_deep_chain_collapses_under_root() {
        let messages = vec![
            root("A", at(1, 9, 0)),
            reply("A1", "A", at(1, 9, 1)),
            reply("A2", "A1", at(1, 9, 2)),
            reply("A3", "A", at(1, 9, 3)),
            reply("A4", "A2", at(1, 9, 4)),
        ];
        let items = utc_assembler(ReplyPolicy::default()).assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "A", "A1@1", "A2@1", "A3@1", "A4@1"]);
    }

    #[test]
    fn test_deeper_nesting_when_allowed() {
        let policy = ReplyPolicy {
            max_depth: MaxReplyDepth(2),
            ..ReplyPolicy::default()
        };
        let messages = vec![
            root("A", at(1, 9, 0)),
            reply("A1", "A", at(1, 9, 1)),
            reply("A2", "A1", at(1, 9, 2)),
            reply("A3", "A2", at(1, 9, 3)),
            reply("B1", "A", at(1, 9, 4)),
        ];
        let items = utc_assembler(policy).assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "A", "A1@1", "A2@2", "A3@2", "B1@1"]);
    }

    #[test]
    fn test_long_reply_chain_resolves_in_one_pass() {
        let start = at(1, 0, 0);
        let mut messages = vec![root("m0", start)];
        for i in 1..20_000 {
            let ts = start + chrono::TimeDelta::seconds(i);
            messages.push(reply(&format!("m{i}"), &format!("m{}", i - 1), ts));
        }
        let began = std::time::Instant::now();
        let items = utc_assembler(ReplyPolicy::default()).assemble(&messages);
        assert!(began.elapsed() < std::time::Duration::from_secs(5));

        let rendered: Vec<&RenderItem> = items.iter().filter(|i| i.as_message().is_some()).collect();
        assert_eq!(rendered.len(), 20_000);
        assert_eq!(rendered[0].depth(), Some(0));
        assert!(rendered[1..].iter().all(|i| i.depth() == Some(1)));
        assert_eq!(rendered[19_999].as_message().unwrap().id, "m19999");
    }

    #[test]
    fn test_long_chain_respects_deeper_limit() {
        let policy = ReplyPolicy {
            max_depth: MaxReplyDepth(3),
            ..ReplyPolicy::default()
        };
        let mut messages = vec![root("m0", at(1, 9, 0))];
        for i in 1..6u32 {
            messages.push(reply(&format!("m{i}"), &format!("m{}", i - 1), at(1, 9, i)));
        }
        let items = utc_assembler(policy).assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "m0", "m1@1", "m2@2", "m3@3", "m4@3", "m5@3"]);
    }

    #[test]
    fn test_reply_cycle_is_dropped() {
        let policy = ReplyPolicy {
            orphans: OrphanPolicy::Promote,
            ..ReplyPolicy::default()
        };
        let messages = vec![
            root("A", at(1, 9, 0)),
            reply("X", "Y", at(1, 9, 1)),
            reply("Y", "X", at(1, 9, 2)),
        ];
        let items = utc_assembler(policy).assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "A"]);
    }

    #[test]
    fn test_unread_orphan_does_not_claim_divider() {
        let messages = vec![
            reply("X", "missing", at(1, 8, 0)).unread(),
            root("A", at(1, 9, 0)),
            root("B", at(1, 9, 5)).unread(),
        ];
        let items = utc_assembler(ReplyPolicy::default()).assemble(&messages);
        assert_eq!(shape(&items), vec!["D", "A", "U", "B"]);
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let messages = vec![
            root("B", at(1, 10, 0)),
            root("A", at(1, 9, 0)).unread(),
            reply("A1", "A", at(1, 9, 5)),
        ];
        let assembler = utc_assembler(ReplyPolicy::default());
        assert_eq!(assembler.assemble(&messages), assembler.assemble(&messages));
    }

    #[test]
    fn test_empty_collection() {
        assert!(utc_assembler(ReplyPolicy::default()).assemble(&[]).is_empty());
    }
}
