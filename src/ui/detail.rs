//! Article detail page.
//!
//! Text is wrapped here rather than by the `Paragraph` widget so the line
//! count is known up front for scroll clamping.

use crate::api::Article;
use crate::app::App;
use crate::controller::DetailState;
use crate::util::{display_width, format_long_date, strip_control_chars};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use super::palette;
use super::render::spinner;

pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    app.detail_visible_lines = area.height.saturating_sub(2) as usize;
    let width = area.width.saturating_sub(4) as usize;

    let (title, lines) = match app.detail.state() {
        DetailState::Idle => (" Article ", vec![Line::from("No article selected")]),
        DetailState::Loading { .. } => (
            " Article ",
            vec![Line::from(format!("Loading article {}", spinner(app)))],
        ),
        DetailState::NotFound { id } => (" Article Not Found ", not_found_lines(*id)),
        DetailState::Failed { error, .. } => (" Article ", failed_lines(error)),
        DetailState::Loaded(article) => (" Article ", article_lines(article, width)),
    };

    app.clamp_scroll(lines.len(), app.detail_visible_lines);

    let centered = !matches!(app.detail.state(), DetailState::Loaded(_));
    let mut paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette::border(true))
                .title(title),
        )
        .scroll((app.scroll_offset as u16, 0));
    if centered {
        paragraph = paragraph
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
    }
    f.render_widget(paragraph, area);
}

fn not_found_lines(id: i64) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled("Article Not Found", palette::heading())),
        Line::from(""),
        Line::from(Span::styled(
            format!("No article with id {} exists on the backend.", id),
            palette::metadata(),
        )),
        Line::from(Span::styled("Press b to go back.", palette::hint())),
    ]
}

fn failed_lines(error: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            strip_control_chars(error).into_owned(),
            palette::error(),
        )),
        Line::from(""),
        Line::from(Span::styled("Press r to retry or b to go back.", palette::hint())),
    ]
}

/// Full article body: badge and date, title, source, keywords, summary,
/// then content.
pub(super) fn article_lines(article: &Article, width: usize) -> Vec<Line<'static>> {
    let width = width.max(10);
    let category = article.display_category().to_string();
    let mut lines = vec![Line::from(vec![
        Span::styled(format!(" {} ", category), palette::badge(&category)),
        Span::styled(
            format!("  {}", format_long_date(article.published())),
            palette::metadata(),
        ),
    ])];
    lines.push(Line::from(""));

    for row in wrap_text(&article.title, width) {
        lines.push(Line::from(Span::styled(row, palette::title())));
    }
    lines.push(Line::from(Span::styled(
        format!("Source: {}", strip_control_chars(&article.source)),
        palette::metadata(),
    )));

    let keywords = article.keyword_list();
    if !keywords.is_empty() {
        let tags: Vec<String> = keywords.iter().map(|k| format!("#{}", k)).collect();
        for row in wrap_text(&tags.join(" "), width) {
            lines.push(Line::from(Span::styled(row, palette::keyword())));
        }
    }

    if let Some(summary) = article.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Summary", palette::heading())));
        for row in wrap_text(summary, width) {
            lines.push(Line::from(Span::styled(row, palette::summary())));
        }
    }

    if let Some(content) = article.content.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Content", palette::heading())));
        for paragraph in content.lines() {
            if paragraph.trim().is_empty() {
                lines.push(Line::from(""));
                continue;
            }
            lines.extend(wrap_text(paragraph, width).into_iter().map(Line::from));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Read original: {}", strip_control_chars(&article.url)),
        palette::hint(),
    )));
    lines
}

/// Greedy word wrap by display width. Words wider than `width` are split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let clean = strip_control_chars(text);
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in clean.split_whitespace() {
        let word_width = display_width(word);
        if current_width > 0 && current_width + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
            continue;
        }
        if current_width > 0 {
            rows.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if word_width <= width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }
        for c in word.chars() {
            let w = c.width().unwrap_or(0);
            if current_width + w > width {
                rows.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(c);
            current_width += w;
        }
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::sample_article;

    #[test]
    fn wrap_respects_width() {
        let rows = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(rows[0], "the quick");
        assert!(rows.iter().all(|r| display_width(r) <= 10));
    }

    #[test]
    fn wrap_splits_long_words() {
        let rows = wrap_text("abcdefghijkl", 5);
        assert_eq!(rows, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn wrap_empty_text() {
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn article_lines_show_unknown_date() {
        let mut article = sample_article(3);
        article.published_at = None;
        let lines = article_lines(&article, 60);
        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(first.ends_with("Unknown date"));
    }

    #[test]
    fn article_lines_include_all_keywords() {
        let mut article = sample_article(3);
        article.keywords = Some("a, b, c, d, e".to_string());
        let text: Vec<String> = article_lines(&article, 60)
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text.contains(&"#a #b #c #d #e".to_string()));
    }
}
