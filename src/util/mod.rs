//! Utility functions shared by the controllers and the TUI.
//!
//! - **Text**: Unicode-aware width, truncation, and control-character stripping
//! - **Time**: date formatting for cards, lists and the detail page
//! - **Tasks**: panic capture for spawned background work
//! - **URLs**: validation before opening article links in a browser

mod task;
mod text;
mod time;
mod url_validator;

pub use task::catch_task_panic;
pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use time::{format_card_date, format_long_date, format_relative_time, UNKNOWN_DATE};
pub use url_validator::{validate_url_for_open, UrlValidationError};

/// Maximum accepted search query length.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
