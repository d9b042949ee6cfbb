//! Terminal dashboard for a summarized AI news backend.
//!
//! The backend scrapes, summarizes and stores articles; this crate consumes
//! its HTTP API and presents it as a dashboard, a per-category browser and an
//! article detail page.

pub mod api;
pub mod app;
pub mod config;
pub mod controller;
pub mod keybindings;
pub mod ui;
pub mod util;
