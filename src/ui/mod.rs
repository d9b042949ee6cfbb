//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `render` - Page rendering dispatch and header
//! - `dashboard` - Dashboard page: search bar, category chips, cards
//! - `categories` - Categories page: sidebar and cards
//! - `detail` - Single article page
//! - `cards` - Article card list shared by both list pages
//! - `help` - Keybinding overlay
//! - `status` - Status bar widget
//! - `palette` - Category colors and semantic styles

mod cards;
mod categories;
mod dashboard;
mod detail;
mod help;
mod input;
mod loop_runner;
mod palette;
mod render;
mod status;

pub use loop_runner::{run, Action};
