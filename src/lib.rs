//! Terminal client for the TechFlow news API.
//!
//! The binary in `main.rs` wires these modules together; integration tests
//! drive the API gateway and the state machines directly.

pub mod api;
pub mod app;
pub mod bookmarks;
pub mod cache;
pub mod chat;
pub mod config;
pub mod feed;
pub mod keybindings;
pub mod session;
pub mod storage;
pub mod strip;
pub mod theme;
pub mod trending;
pub mod ui;
pub mod util;
