//! Murmur client library.
//!
//! History merging, reply threading, grouping and the composer are plain
//! data modules; `app`, `ui` and `backend` wire them to egui and tokio.

pub mod app;
pub mod backend;
pub mod buffer;
pub mod composer;
pub mod config;
pub mod error;
pub mod events;
pub mod grouping;
pub mod logging;
pub mod message;
pub mod pagination;
pub mod protocol;
pub mod state;
pub mod thread;
pub mod ui;
pub mod validation;
