//! Categories page: category sidebar on the left, articles on the right.

use crate::app::{App, CategoriesFocus};
use crate::controller::FeedPage;
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::palette;
use super::render::spinner;

const EMPTY_TEXT: &str = "Select a category from the list to see its articles.";

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(area);

    render_sidebar(f, app, columns[0]);

    let articles_focused = app.categories_focus == CategoriesFocus::Articles;
    let feed = app.feed(FeedPage::Categories);
    if feed.query().category.is_none() && feed.state().error.is_none() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette::border(articles_focused))
            .title(" Articles ");
        let hint = Paragraph::new(EMPTY_TEXT)
            .style(palette::metadata())
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(hint, columns[1]);
        return;
    }
    super::cards::render_feed(
        f,
        app,
        FeedPage::Categories,
        columns[1],
        articles_focused,
        "No articles in this category yet.",
    );
}

fn render_sidebar(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let feed = app.feed(FeedPage::Categories);
    let state = feed.categories();
    let focused = app.categories_focus == CategoriesFocus::Sidebar;

    let title = if state.loading {
        format!(" Categories {} ", spinner(app))
    } else {
        " Categories ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette::border(focused))
        .title(title);

    if let Some(error) = &state.error {
        let paragraph = Paragraph::new(error.as_str())
            .style(palette::error())
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }
    if state.categories.is_empty() {
        let text = if state.loading { "Loading..." } else { "No categories" };
        f.render_widget(
            Paragraph::new(text).style(palette::metadata()).block(block),
            area,
        );
        return;
    }

    let selected = feed.query().category.as_deref();
    let width = area.width.saturating_sub(5) as usize;
    let items: Vec<ListItem> = state
        .categories
        .iter()
        .map(|name| {
            let marker = if selected == Some(name.as_str()) { "● " } else { "  " };
            let mut style = Style::default().fg(palette::chip_color(name));
            if selected == Some(name.as_str()) {
                style = style.add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(truncate_to_width(name, width).into_owned(), style),
            ]))
        })
        .collect();

    let mut list_state = ListState::default().with_selected(Some(app.category_cursor));
    let list = List::new(items).block(block).highlight_style(if focused {
        palette::selected()
    } else {
        Style::default()
    });
    f.render_stateful_widget(list, area, &mut list_state);
}
