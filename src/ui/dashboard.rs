//! Dashboard page: search bar, category chips and the latest articles.

use crate::app::App;
use crate::controller::FeedPage;
use crate::keybindings::Action;
use crate::util::display_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{cards, palette};

const ALL_CATEGORIES: &str = "All Categories";

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 5 {
        return;
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    render_search_bar(f, app, chunks[0]);
    render_chips(f, app, chunks[1]);
    let fetch_key = app
        .keybindings
        .key_hint(Action::FetchNews)
        .unwrap_or_else(|| "f".to_string());
    let empty_text = format!(
        "No articles yet. Press '{}' to have the backend fetch the latest news.",
        fetch_key
    );
    cards::render_feed(f, app, FeedPage::Dashboard, chunks[2], true, &empty_text);
}

/// Shows the live input while typing and the applied search otherwise.
fn render_search_bar(f: &mut Frame, app: &App, area: Rect) {
    let editing = app.search_mode;
    let line = if editing {
        Line::from(vec![
            Span::styled("/ ", palette::hint()),
            Span::raw(app.search_input.as_str()),
            Span::styled("_", palette::hint()),
        ])
    } else {
        match app.feed(FeedPage::Dashboard).query().search.as_deref() {
            Some(search) => Line::from(vec![
                Span::styled("Search: ", palette::metadata()),
                Span::raw(search.to_string()),
            ]),
            None => Line::from(Span::styled(
                "Search articles... (press /)",
                palette::metadata(),
            )),
        }
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette::border(editing))
        .title(" Search ");
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_chips(f: &mut Frame, app: &App, area: Rect) {
    let feed = app.feed(FeedPage::Dashboard);
    let categories = &feed.categories().categories;
    let selected = feed.query().category.as_deref();

    let mut chips: Vec<(&str, bool)> = Vec::with_capacity(categories.len() + 1);
    chips.push((ALL_CATEGORIES, selected.is_none()));
    chips.extend(
        categories
            .iter()
            .map(|c| (c.as_str(), selected == Some(c.as_str()))),
    );

    let start = first_visible_chip(&chips, area.width as usize);
    let mut spans = Vec::with_capacity(chips.len() * 2);
    for (label, is_selected) in &chips[start..] {
        let style = if *label == ALL_CATEGORIES {
            palette::chip("", *is_selected)
        } else {
            palette::chip(label, *is_selected)
        };
        spans.push(Span::styled(format!(" {} ", label), style));
        spans.push(Span::raw(" "));
    }
    if let Some(error) = &feed.categories().error {
        spans.push(Span::styled(format!("(categories: {})", error), palette::error()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Index of the first chip to draw so the selected chip stays on screen.
fn first_visible_chip(chips: &[(&str, bool)], width: usize) -> usize {
    let Some(selected) = chips.iter().position(|(_, s)| *s) else {
        return 0;
    };
    let chip_width = |label: &str| display_width(label) + 3;
    let mut start = 0;
    let mut used: usize = chips[..=selected].iter().map(|(l, _)| chip_width(l)).sum();
    while used > width && start < selected {
        used -= chip_width(chips[start].0);
        start += 1;
    }
    start
}
