//! Text buffer with caret and selection bookkeeping.
//!
//! The host text widget resets its own caret whenever its content changes, so a
//! caret computed by a mutation is held as a [`PendingCaret`] and handed back
//! to the widget once its render has committed. A newer mutation replaces any
//! pending caret; there is never more than one in flight.

/// Caret offset waiting for the next render commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingCaret {
    pub generation: u64,
    pub offset: usize,
}

/// Offsets are byte offsets into UTF-8 text and are always clamped onto a
/// char boundary.
#[derive(Clone, Debug, Default)]
pub struct CaretTextBuffer {
    text: String,
    /// Selection as last reported by (or pushed to) the widget, `start <= end`.
    selection: (usize, usize),
    pending: Option<PendingCaret>,
    generation: u64,
}

impl CaretTextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Caret as the next reader should see it, including a not yet applied
    /// deferred update.
    pub fn caret(&self) -> usize {
        match self.pending {
            Some(pending) => pending.offset,
            None => self.selection.1,
        }
    }

    pub fn selection(&self) -> (usize, usize) {
        match self.pending {
            Some(pending) => (pending.offset, pending.offset),
            None => self.selection,
        }
    }

    pub fn pending_caret(&self) -> Option<PendingCaret> {
        self.pending
    }

    /// Replace buffer and caret together.
    pub fn set_text(&mut self, text: impl Into<String>, caret: usize) {
        self.text = text.into();
        let caret = clamp_to_boundary(&self.text, caret);
        self.schedule_caret(caret);
    }

    /// Move the selection without touching the text.
    pub fn select(&mut self, start: usize, end: usize) {
        let a = clamp_to_boundary(&self.text, start);
        let b = clamp_to_boundary(&self.text, end);
        self.selection = (a.min(b), a.max(b));
        self.pending = None;
    }

    /// Absorb the state reported by the widget after a frame.
    ///
    /// A text change means the user edited, which supersedes a pending caret.
    /// With the text unchanged a pending caret stays authoritative because the
    /// widget's own caret is the stale one.
    pub fn sync_from_widget(&mut self, text: &str, start: usize, end: usize) {
        if text != self.text {
            self.text = text.to_string();
            self.select(start, end);
        } else if self.pending.is_none() {
            self.select(start, end);
        }
    }

    /// Insert `before`/`after` around the selection, or around `custom` at the
    /// selection start when content is supplied.
    ///
    /// Wrapping leaves the caret just inside the closing token; inserted
    /// content leaves it after the whole block.
    pub fn insert_around(&mut self, before: &str, after: &str, custom: Option<&str>) {
        let (start, end) = self.selection();
        let caret = match custom {
            Some(content) => {
                let mut text = String::with_capacity(
                    self.text.len() + before.len() + content.len() + after.len(),
                );
                text.push_str(&self.text[..start]);
                text.push_str(before);
                text.push_str(content);
                text.push_str(after);
                text.push_str(&self.text[start..]);
                self.text = text;
                start + before.len() + content.len() + after.len()
            }
            None => {
                let selected_len = end - start;
                let mut text =
                    String::with_capacity(self.text.len() + before.len() + after.len());
                text.push_str(&self.text[..start]);
                text.push_str(before);
                text.push_str(&self.text[start..end]);
                text.push_str(after);
                text.push_str(&self.text[end..]);
                self.text = text;
                start + before.len() + selected_len
            }
        };
        self.schedule_caret(caret);
    }

    /// Apply the pending caret after the host render has committed.
    ///
    /// Returns the offset the widget must adopt, or `None` when nothing was
    /// pending.
    pub fn commit_render(&mut self) -> Option<usize> {
        let pending = self.pending.take()?;
        self.selection = (pending.offset, pending.offset);
        Some(pending.offset)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.schedule_caret(0);
    }

    fn schedule_caret(&mut self, offset: usize) {
        self.generation += 1;
        self.pending = Some(PendingCaret {
            generation: self.generation,
            offset,
        });
    }
}

/// Largest char boundary not past `offset`.
pub(crate) fn clamp_to_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Convert a char index (as reported by most widgets) to a byte offset.
pub fn char_to_byte(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Convert a byte offset back to a char index.
pub fn byte_to_char(text: &str, byte: usize) -> usize {
    text[..clamp_to_boundary(text, byte)].chars().count()
}
