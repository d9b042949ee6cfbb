//! Help overlay listing every keybinding, grouped by context.
//!
//! Reflects user overrides from the `[keybindings]` config table.

use crate::app::App;
use crate::keybindings::{Action, Context};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

use super::palette;

const SECTIONS: [Context; 5] = [
    Context::Global,
    Context::Dashboard,
    Context::Categories,
    Context::Detail,
    Context::Search,
];

pub fn render(f: &mut Frame, app: &App) {
    let area = overlay_area(f.area());
    if area.width < 20 || area.height < 6 {
        return;
    }

    let rows = help_rows(&app.keybindings.all_bindings());
    // Two border rows plus the header and its margin.
    let page = area.height.saturating_sub(4) as usize;
    let last_offset = rows.len().saturating_sub(page);
    let offset = app.help_scroll_offset.min(last_offset);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette::border(true))
        .title(" Keybindings ");
    block = if last_offset > 0 {
        block.title_bottom(Line::styled(
            format!(" {}/{} · j/k scroll · ? close ", offset + 1, last_offset + 1),
            palette::metadata(),
        ))
    } else {
        block.title_bottom(Line::styled(" ? or Esc to close ", palette::metadata()))
    };

    let header = Row::new(["Key", "Action"])
        .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
        .bottom_margin(1);
    let table = Table::new(
        rows.into_iter().skip(offset).take(page),
        [Constraint::Length(16), Constraint::Min(20)],
    )
    .header(header)
    .block(block);

    f.render_widget(Clear, area);
    f.render_widget(table, area);
}

/// One heading row per context, then its bindings, with a blank row between
/// sections.
fn help_rows(bindings: &[(Context, String, Action, &'static str)]) -> Vec<Row<'static>> {
    let mut rows = Vec::new();
    for section in SECTIONS {
        let mut entries = bindings.iter().filter(|(ctx, ..)| *ctx == section).peekable();
        if entries.peek().is_none() {
            continue;
        }
        if !rows.is_empty() {
            rows.push(Row::new([String::new(), String::new()]));
        }
        rows.push(
            Row::new([format!("-- {} --", section.label()), String::new()])
                .style(palette::heading()),
        );
        rows.extend(
            entries.map(|(_, key, _, description)| {
                Row::new([format!("  {}", key), description.to_string()])
            }),
        );
    }
    rows
}

/// 80% of the screen, centered.
fn overlay_area(screen: Rect) -> Rect {
    let width = screen.width * 4 / 5;
    let height = screen.height * 4 / 5;
    Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    )
}
