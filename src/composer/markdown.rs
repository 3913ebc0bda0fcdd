//! Named markdown insertions on top of [`CaretTextBuffer::insert_around`].

use super::caret::CaretTextBuffer;
use super::paste::FENCE;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkdownFormat {
    Bold,
    Italic,
    InlineCode,
    /// Fence opened with a language tag, closed generically.
    CodeBlock { language: String },
    BulletItem,
    NumberedItem,
    Link { url: String },
}

impl MarkdownFormat {
    /// The `(before, after)` pair handed to the text buffer.
    pub fn delimiters(&self) -> (String, String) {
        match self {
            MarkdownFormat::Bold => ("**".into(), "**".into()),
            MarkdownFormat::Italic => ("*".into(), "*".into()),
            MarkdownFormat::InlineCode => ("`".into(), "`".into()),
            MarkdownFormat::CodeBlock { language } => {
                (format!("\n{FENCE}{language}\n"), format!("\n{FENCE}\n"))
            }
            MarkdownFormat::BulletItem => ("\n- ".into(), String::new()),
            MarkdownFormat::NumberedItem => ("\n1. ".into(), String::new()),
            MarkdownFormat::Link { url } => ("[".into(), format!("]({url})")),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MarkdownFormat::Bold => "Bold",
            MarkdownFormat::Italic => "Italic",
            MarkdownFormat::InlineCode => "Code",
            MarkdownFormat::CodeBlock { .. } => "Code block",
            MarkdownFormat::BulletItem => "Bullet list",
            MarkdownFormat::NumberedItem => "Numbered list",
            MarkdownFormat::Link { .. } => "Link",
        }
    }
}

/// Wrap the current selection.
pub fn apply(buffer: &mut CaretTextBuffer, format: &MarkdownFormat) {
    let (before, after) = format.delimiters();
    buffer.insert_around(&before, &after, None);
}

/// Insert `content` wrapped in the format's delimiters at the selection start.
pub fn insert_with(buffer: &mut CaretTextBuffer, format: &MarkdownFormat, content: &str) {
    let (before, after) = format.delimiters();
    buffer.insert_around(&before, &after, Some(content));
}

/// Insert pasted code inside an untagged fence.
pub fn insert_code_block(buffer: &mut CaretTextBuffer, code: &str) {
    let before = format!("\n{FENCE}\n");
    let after = format!("\n{FENCE}\n");
    buffer.insert_around(&before, &after, Some(code));
}
