//! UI rendering modules for the Murmur client.
//!
//! - `messages`: message list with dividers, grouping and reply indentation
//! - `composer`: text input, markdown toolbar, mention popup, attachments
//! - `toasts`: floating status notifications
//! - `theme`: color schemes and styling utilities

pub mod composer;
pub mod messages;
pub mod theme;
pub mod toasts;

pub use composer::render_composer;
pub use messages::{render_messages, MessageAction};
pub use theme::{apply_app_style, author_color, MurmurTheme};
pub use toasts::render_status_toasts;
