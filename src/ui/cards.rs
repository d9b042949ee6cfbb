//! Article card list shared by the dashboard and categories pages.

use crate::api::Article;
use crate::app::App;
use crate::controller::FeedPage;
use crate::util::{
    display_width, format_card_date, format_relative_time, strip_control_chars, truncate_to_width,
};
use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::palette;
use super::render::spinner;

/// Keywords shown on a card; the detail view shows all of them.
const CARD_KEYWORDS: usize = 3;

/// Render one page's article area: error banner, then loading, empty or
/// card-list content.
pub fn render_feed(
    f: &mut Frame,
    app: &App,
    page: FeedPage,
    area: Rect,
    focused: bool,
    empty_text: &str,
) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let feed = app.feed(page);
    let state = feed.state();

    let area = match &state.error {
        Some(error) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(4), Constraint::Min(0)])
                .split(area);
            render_error_banner(f, app, error, chunks[0]);
            chunks[1]
        }
        None => area,
    };
    if area.height < 3 {
        return;
    }

    let mut title = format!(" Articles ({}) ", state.articles.len());
    if state.loading() || feed.is_refreshing() {
        title = format!(" Articles {} ", spinner(app));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette::border(focused))
        .title(title);

    if state.articles.is_empty() {
        let text = if state.loading() {
            format!("Loading articles {}", spinner(app))
        } else {
            empty_text.to_string()
        };
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(palette::metadata())
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let now = Utc::now();
    let items: Vec<ListItem> = state
        .articles
        .iter()
        .map(|article| ListItem::new(card_lines(article, width, now)))
        .collect();

    let selected = match page {
        FeedPage::Dashboard => app.dashboard_selected,
        FeedPage::Categories => app.categories_selected,
    };
    let mut list_state = ListState::default().with_selected(Some(selected));
    let list = List::new(items)
        .block(block)
        .highlight_style(palette::selected())
        .highlight_symbol("▌ ");
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_error_banner(f: &mut Frame, app: &App, error: &str, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(strip_control_chars(error).into_owned(), palette::error())),
        Line::from(Span::styled(
            format!("Make sure the backend server is running at {}", app.base_url),
            palette::hint(),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette::error())
                .title(" Error "),
        );
    f.render_widget(paragraph, area);
}

/// Collapse backend text to one display line.
fn one_line(s: &str) -> String {
    strip_control_chars(s)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Card layout: badge + source + dates, title, one-line summary, keywords,
/// then a blank spacer line.
pub(super) fn card_lines(
    article: &Article,
    width: usize,
    now: chrono::DateTime<Utc>,
) -> Vec<Line<'static>> {
    let category = article.display_category().to_string();
    let published = article.published();
    let mut meta = format!(" {} · {}", one_line(&article.source), format_card_date(published));
    let age = format_relative_time(published, now);
    if !age.is_empty() {
        meta.push_str(" · ");
        meta.push_str(&age);
    }
    let badge = format!(" {} ", category);
    let meta_width = width.saturating_sub(display_width(&badge));

    let mut lines = vec![
        Line::from(vec![
            Span::styled(badge, palette::badge(&category)),
            Span::styled(
                truncate_to_width(&meta, meta_width).into_owned(),
                palette::metadata(),
            ),
        ]),
        Line::from(Span::styled(
            truncate_to_width(&one_line(&article.title), width).into_owned(),
            palette::title(),
        )),
    ];

    if let Some(summary) = article.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(Line::from(Span::styled(
            truncate_to_width(&one_line(summary), width).into_owned(),
            palette::summary(),
        )));
    }

    let keywords: Vec<String> = article
        .keyword_list()
        .into_iter()
        .take(CARD_KEYWORDS)
        .map(|k| format!("#{}", one_line(k)))
        .collect();
    if !keywords.is_empty() {
        lines.push(Line::from(Span::styled(
            truncate_to_width(&keywords.join(" "), width).into_owned(),
            palette::keyword(),
        )));
    }

    lines.push(Line::from(""));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::sample_article;

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn card_shows_at_most_three_keywords() {
        let mut article = sample_article(1);
        article.keywords = Some("ai, llm, agents, robotics".to_string());
        let lines = card_lines(&article, 80, Utc::now());
        let rendered: Vec<String> = lines.iter().map(text_of).collect();
        assert!(rendered.contains(&"#ai #llm #agents".to_string()));
    }

    #[test]
    fn card_without_summary_or_keywords_is_compact() {
        let mut article = sample_article(1);
        article.summary = None;
        article.keywords = None;
        let lines = card_lines(&article, 80, Utc::now());
        // meta, title, spacer
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn card_lines_fit_width() {
        let mut article = sample_article(1);
        article.title = "A very long headline about frontier models ".repeat(5);
        for line in card_lines(&article, 30, Utc::now()) {
            assert!(display_width(&text_of(&line)) <= 30);
        }
    }

    #[test]
    fn card_defaults_missing_category() {
        let mut article = sample_article(1);
        article.category = None;
        let lines = card_lines(&article, 80, Utc::now());
        assert!(text_of(&lines[0]).starts_with(" AI "));
    }

    #[test]
    fn one_line_strips_newlines_and_escapes() {
        assert_eq!(one_line("Breaking\n\x1b[31mnews\x1b[0m  today"), "Breaking news today");
    }
}
