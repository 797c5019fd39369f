//! Terminal User Interface module.
//!
//! This module provides the TUI for the TechFlow client, including:
//! - Main event loop (`run`)
//! - Keyboard and mouse input for the feed, reader, bookmarks and trending views
//! - Rendering for every view and the overlays on top of them
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `mouse` - Category strip drag and article clicks
//! - `events` - Background task event processing
//! - `helpers` - Task spawning shared by input and events
//! - `render` - View rendering dispatch
//! - `search_bar`, `categories`, `articles`, `sidebar`, `chat_panel` - Feed view panels
//! - `reader` - Article reader and markdown rendering
//! - `bookmark_list` - Saved articles view
//! - `dashboard` - Full trending view
//! - `error_panel` - Error notice with retry hint
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod articles;
mod bookmark_list;
mod categories;
mod chat_panel;
mod dashboard;
mod error_panel;
mod events;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod mouse;
pub mod reader;
mod render;
mod search_bar;
mod sidebar;
mod status;

// Re-export the public API
pub use loop_runner::{run, Action};
