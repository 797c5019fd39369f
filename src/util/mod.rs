//! Utility functions shared by the API layer and the terminal UI.
//!
//! - **Text**: Unicode-aware width calculation, truncation and
//!   control-character stripping for server-provided strings
//! - **Links**: API base validation, image URL normalization and
//!   browser-open checks
//! - **Time**: lenient timestamp parsing and relative formatting
//!
//! # Examples
//!
//! ```
//! use techflow::util::{display_width, normalize_image_url, truncate_to_width};
//!
//! assert_eq!(display_width("Hello 世界"), 10);
//! assert_eq!(truncate_to_width("Long article title", 10), "Long ar...");
//! assert_eq!(normalize_image_url(Some("  ")), None);
//! ```

mod links;
mod text;
mod time;

pub use links::{
    extract_domain, normalize_image_url, validate_api_base, validate_url_for_open, LinkError,
};
pub use text::{display_width, pad_to_width, strip_control_chars, truncate_to_width};
pub use time::{format_date, format_relative_time, parse_timestamp};

/// Maximum accepted search query length, enforced before a request is built.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
