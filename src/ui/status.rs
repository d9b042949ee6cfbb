use crate::app::{App, CategoriesFocus, View};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

use super::palette;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(&**msg)
    } else if app.search_mode {
        Cow::Borrowed("Type to search | ESC cancel | ENTER confirm")
    } else {
        match app.view {
            View::Dashboard => Cow::Borrowed(
                "[j/k]move [h/l]category [/]search [Enter]open [r]eload [f]etch [2]categories [?]help [q]uit",
            ),
            View::Categories => match app.categories_focus {
                CategoriesFocus::Sidebar => Cow::Borrowed(
                    "[j/k]move [Enter]select [Tab]articles [Esc]clear [1]dashboard [?]help [q]uit",
                ),
                CategoriesFocus::Articles => Cow::Borrowed(
                    "[j/k]move [Enter]open [Tab]sidebar [Esc]clear [r]eload [1]dashboard [?]help [q]uit",
                ),
            },
            View::Detail => Cow::Borrowed("[b]ack [j/k]scroll [Ctrl+d/u]page [o]pen [r]eload [q]uit"),
        }
    };

    f.render_widget(Paragraph::new(text).style(palette::status_bar()), area);
}
