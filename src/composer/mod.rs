//! Message composition session: text, caret, mentions, paste handling,
//! markdown helpers and the attachment/upload gate.
//!
//! One [`ComposerState`] is owned per authoring session and passed explicitly
//! to each collaborator; it is reset after a successful send.

pub mod caret;
pub mod markdown;
pub mod mention;
pub mod paste;

use tracing::debug;

use crate::message::{ChannelId, MessageId};
use crate::protocol::{OutgoingMessage, UploadedFile, UserCandidate};
use crate::validation::{sanitize_message, validate_outgoing, SendRejection};

pub use caret::{CaretTextBuffer, PendingCaret};
pub use markdown::MarkdownFormat;
pub use mention::{Anchor, InputBounds, MentionQuery, MentionTrigger};
pub use paste::{CodeDetector, HeuristicCodeDetector, PasteClassifier, PasteDecision};

/// What a paste turned into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasteOutcome {
    /// The clipboard held files; the caller starts an upload.
    UploadFiles,
    /// Text was inserted as-is at the caret.
    Inserted,
    /// Text was intercepted and inserted inside a code fence.
    WrappedAsCode,
}

#[derive(Debug, Default)]
pub struct ComposerState {
    pub buffer: CaretTextBuffer,
    pub attachments: Vec<UploadedFile>,
    /// Set while an upload is in flight; sending is refused meanwhile.
    pub uploading: bool,
    pub reply_to: Option<MessageId>,
    pub mention: Option<MentionQuery>,
    /// Trigger offset of a mention the user closed; not reopened until the
    /// caret leaves it.
    dismissed_mention: Option<usize>,
    trigger: MentionTrigger,
    classifier: PasteClassifier,
    bounds: InputBounds,
}

impl ComposerState {
    pub fn new(trigger: MentionTrigger) -> Self {
        Self {
            trigger,
            ..Self::default()
        }
    }

    pub fn with_classifier(mut self, classifier: PasteClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    /// Feed the widget's text and selection after a frame, then re-run
    /// mention detection.
    pub fn on_input(&mut self, text: &str, selection: (usize, usize), bounds: InputBounds) {
        self.bounds = bounds;
        self.buffer.sync_from_widget(text, selection.0, selection.1);
        self.refresh_mention();
    }

    pub fn refresh_mention(&mut self) {
        let detected = self
            .trigger
            .detect(self.buffer.text(), self.buffer.caret(), self.bounds);
        match (&detected, self.dismissed_mention) {
            (Some(query), Some(offset)) if query.trigger_offset == offset => {
                self.mention = None;
                return;
            }
            _ => self.dismissed_mention = None,
        }
        self.mention = detected;
    }

    /// Close the suggestion popup for the current `@` without completing it.
    pub fn dismiss_mention(&mut self) {
        if let Some(query) = self.mention.take() {
            self.dismissed_mention = Some(query.trigger_offset);
        }
    }

    /// Complete the active mention with `candidate`. Returns false when no
    /// query was active.
    pub fn select_mention(&mut self, candidate: &UserCandidate) -> bool {
        let Some(query) = self.mention.take() else {
            return false;
        };
        self.trigger
            .apply_selection(&mut self.buffer, &query, &candidate.name);
        debug!(user = %candidate.id, "mention completed");
        true
    }

    pub fn paste(&mut self, text: &str, has_files: bool) -> PasteOutcome {
        let outcome = match self.classifier.classify(text, has_files) {
            PasteDecision::UploadFiles => return PasteOutcome::UploadFiles,
            PasteDecision::WrapAsCode => {
                markdown::insert_code_block(&mut self.buffer, text);
                PasteOutcome::WrappedAsCode
            }
            PasteDecision::PassThrough => {
                self.buffer.insert_around("", "", Some(text));
                PasteOutcome::Inserted
            }
        };
        self.refresh_mention();
        outcome
    }

    pub fn format(&mut self, format: &MarkdownFormat) {
        markdown::apply(&mut self.buffer, format);
        self.refresh_mention();
    }

    pub fn begin_upload(&mut self) {
        self.uploading = true;
    }

    pub fn finish_upload(&mut self, files: Vec<UploadedFile>) {
        self.uploading = false;
        self.attachments.extend(files);
    }

    /// Typed text and earlier attachments are left untouched.
    pub fn fail_upload(&mut self) {
        self.uploading = false;
    }

    pub fn remove_attachment(&mut self, id: &str) {
        self.attachments.retain(|a| a.id != id);
    }

    pub fn reply_to(&mut self, message_id: impl Into<MessageId>) {
        self.reply_to = Some(message_id.into());
    }

    pub fn cancel_reply(&mut self) {
        self.reply_to = None;
    }

    pub fn can_send(&self) -> Result<(), SendRejection> {
        validate_outgoing(self.buffer.text(), &self.attachments, self.uploading)
    }

    /// Build the outgoing message and reset the session. The composer is
    /// left untouched when the send is refused.
    pub fn take_outgoing(&mut self, channel_id: &ChannelId) -> Result<OutgoingMessage, SendRejection> {
        self.can_send()?;
        let outgoing = OutgoingMessage {
            channel_id: channel_id.clone(),
            text: sanitize_message(self.buffer.text()),
            attachments: std::mem::take(&mut self.attachments),
            reply_to: self.reply_to.take(),
        };
        self.buffer.clear();
        self.mention = None;
        self.dismissed_mention = None;
        Ok(outgoing)
    }
}
