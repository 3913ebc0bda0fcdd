//! Application module structure for MurmurApp
//!
//! - `core`: MurmurApp struct, backend spawn and settings persistence
//! - `events`: draining backend events into the client state
//! - `update`: main update loop, shortcuts and panel layout

pub mod core;
pub mod events;
pub mod update;

pub use core::MurmurApp;
