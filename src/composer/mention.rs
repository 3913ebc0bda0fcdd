//! `@mention` detection around the caret.

use serde::{Deserialize, Serialize};

use super::caret::{clamp_to_boundary, CaretTextBuffer};
use crate::protocol::UserCandidate;

pub const DEFAULT_MAX_QUERY_LEN: usize = 20;
/// Suggestion popup is drawn this many pixels above the input's top edge.
pub const DEFAULT_POPUP_OFFSET: f32 = 280.0;

/// Screen position of the text input, top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputBounds {
    pub left: f32,
    pub top: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

/// Active mention search, recomputed on every text or caret change.
#[derive(Clone, Debug, PartialEq)]
pub struct MentionQuery {
    pub search_prefix: String,
    pub anchor: Anchor,
    /// Byte offset of the triggering `@`.
    pub trigger_offset: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MentionTrigger {
    pub max_query_len: usize,
    pub popup_offset: f32,
}

impl Default for MentionTrigger {
    fn default() -> Self {
        Self {
            max_query_len: DEFAULT_MAX_QUERY_LEN,
            popup_offset: DEFAULT_POPUP_OFFSET,
        }
    }
}

impl MentionTrigger {
    /// Look backward from the caret for the nearest `@`.
    ///
    /// The query is active while the text between the `@` and the caret has no
    /// whitespace and is at most `max_query_len` chars long.
    pub fn detect(&self, text: &str, caret: usize, bounds: InputBounds) -> Option<MentionQuery> {
        let caret = clamp_to_boundary(text, caret);
        let at = text[..caret].rfind('@')?;
        let tail = &text[at + 1..caret];
        if tail.chars().any(char::is_whitespace) || tail.chars().count() > self.max_query_len {
            return None;
        }
        Some(MentionQuery {
            search_prefix: tail.to_string(),
            anchor: Anchor {
                x: bounds.left,
                y: bounds.top - self.popup_offset,
            },
            trigger_offset: at,
        })
    }

    /// Replace `@prefix` up to the caret with `@name ` and park the caret after
    /// the space.
    pub fn apply_selection(&self, buffer: &mut CaretTextBuffer, query: &MentionQuery, name: &str) {
        let text = buffer.text();
        let caret = buffer.caret().max(query.trigger_offset);
        let start = clamp_to_boundary(text, query.trigger_offset);
        let inserted = format!("@{} ", name);
        let new_caret = start + inserted.len();
        let updated = format!("{}{}{}", &text[..start], inserted, &text[caret..]);
        buffer.set_text(updated, new_caret);
    }
}

/// Case-insensitive prefix filter over directory results, sorted by name.
pub fn filter_candidates(users: &[UserCandidate], prefix: &str) -> Vec<UserCandidate> {
    let prefix = prefix.to_lowercase();
    let mut matches: Vec<UserCandidate> = users
        .iter()
        .filter(|u| u.name.to_lowercase().starts_with(&prefix))
        .cloned()
        .collect();
    matches.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    matches.dedup_by(|a, b| a.id == b.id);
    matches
}
