//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! page based on application state.

use crate::app::{App, HealthStatus, View};
use crate::controller::FeedPage;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{categories, dashboard, detail, help, palette, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 10;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Number of frames in the loading spinner animation.
pub(super) const SPINNER_FRAMES: usize = SPINNER.len();

pub(super) fn spinner(app: &App) -> &'static str {
    SPINNER[app.spinner_frame % SPINNER_FRAMES]
}

/// Main render dispatch function.
///
/// Routes to the page renderer for the current view. Handles terminal size
/// validation before rendering.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    match app.view {
        View::Dashboard => dashboard::render(f, app, chunks[1]),
        View::Categories => categories::render(f, app, chunks[1]),
        View::Detail => detail::render(f, app, chunks[1]),
    }
    status::render(f, app, chunks[2]);

    if app.show_help {
        help::render(f, app);
    }
}

/// One-line header: app name, page tabs, backend health and URL.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let (health_text, health_color) = match app.health {
        HealthStatus::Checking => ("○ Checking…", Color::Yellow),
        HealthStatus::Online => ("● Backend Online", Color::Green),
        HealthStatus::Offline => ("● Backend Offline", Color::Red),
    };

    let tab = |label: &'static str, active: bool| {
        if active {
            Span::styled(label, palette::chip("", true))
        } else {
            Span::styled(label, palette::metadata())
        }
    };
    let on_categories = app.list_page() == FeedPage::Categories;

    let line = Line::from(vec![
        Span::styled(" newsdash ", palette::heading()),
        tab(" 1 Dashboard ", !on_categories),
        Span::raw(" "),
        tab(" 2 Categories ", on_categories),
        Span::raw("  "),
        Span::styled(health_text, Style::default().fg(health_color)),
        Span::styled(format!("  {}", app.base_url), palette::metadata()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
