//! Input handling for the TUI.
//!
//! Keys are resolved through the keybinding registry for the active context
//! and dispatched to `App` operations.

use crate::app::{App, CategoriesFocus, View};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::util::validate_url_for_open;
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

const ERR_NO_ARTICLE: &str = "No article selected";

/// Main input dispatch function.
///
/// Overlays capture input first, then search mode, then the current view.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if app.show_help {
        return handle_help_input(app, code);
    }
    if app.search_mode {
        return handle_search_input(app, code, modifiers);
    }
    match app.view {
        View::Dashboard | View::Categories => handle_list_input(app, code, modifiers),
        View::Detail => handle_detail_input(app, code, modifiers),
    }
}

/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

/// Dashboard and categories pages.
fn handle_list_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    let context = match app.view {
        View::Categories => KbContext::Categories,
        _ => KbContext::Dashboard,
    };
    let sidebar = app.view == View::Categories && app.categories_focus == CategoriesFocus::Sidebar;

    match app.keybindings.action_for_key(code, modifiers, context) {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::CycleFocus) => app.cycle_focus(),
        Some(KbAction::Back) | Some(KbAction::ClearCategory) => app.clear_category(),
        Some(KbAction::Select) if sidebar => app.select_category_at_cursor(),
        Some(KbAction::Select) => {
            if app.enter_detail().is_none() {
                app.set_status(ERR_NO_ARTICLE);
            }
        }
        Some(KbAction::PrevCategory) => app.step_category(false),
        Some(KbAction::NextCategory) => app.step_category(true),
        Some(KbAction::Reload) => app.reload(),
        Some(KbAction::FetchNews) => app.fetch_news(),
        Some(KbAction::EnterSearch) => app.enter_search(),
        Some(KbAction::OpenInBrowser) => {
            let url = app.selected_article().map(|a| a.url.clone());
            open_url(app, url);
        }
        Some(KbAction::ShowDashboard) => app.show_view(View::Dashboard),
        Some(KbAction::ShowCategories) => app.show_view(View::Categories),
        Some(KbAction::ShowHelp) => app.show_help = true,
        _ => {}
    }
    Action::Continue
}

fn handle_detail_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    let page = app.detail_visible_lines.max(1);

    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Detail)
    {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::ExitDetail) | Some(KbAction::Back) => app.exit_detail(),
        Some(KbAction::ScrollDown) => app.scroll_down(1),
        Some(KbAction::ScrollUp) => app.scroll_up(1),
        Some(KbAction::PageDown) => app.scroll_down(page),
        Some(KbAction::PageUp) => app.scroll_up(page),
        Some(KbAction::Reload) => app.reload(),
        Some(KbAction::OpenInBrowser) => {
            let url = app.detail.article().map(|a| a.url.clone());
            open_url(app, url);
        }
        Some(KbAction::ShowDashboard) => app.show_view(View::Dashboard),
        Some(KbAction::ShowCategories) => app.show_view(View::Categories),
        Some(KbAction::ShowHelp) => app.show_help = true,
        _ => {}
    }
    Action::Continue
}

fn handle_search_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Search)
    {
        Some(KbAction::ExitSearch) => app.cancel_search(),
        Some(KbAction::CommitSearch) => app.commit_search(),
        _ => match code {
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                app.push_search_char(c);
            }
            _ => {}
        },
    }
    Action::Continue
}

/// Open an article link in the system browser after scheme validation.
fn open_url(app: &mut App, url: Option<String>) {
    let Some(url) = url else {
        app.set_status(ERR_NO_ARTICLE);
        return;
    };
    match validate_url_for_open(&url) {
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Refusing to open article link");
            app.set_status(e.to_string());
        }
        Ok(valid) => {
            if let Err(e) = open::that(valid.as_str()) {
                app.set_status(format!("Failed to open browser: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{sample_article, NewsApi};
    use crate::config::Config;
    use crate::controller::testing::{channel, Scripted, ScriptedApi};
    use crate::controller::ControllerEvent;
    use crate::keybindings::KeybindingRegistry;
    use std::sync::Arc;
    use tokio::sync::mpsc::Receiver;

    fn test_app(api: &Arc<ScriptedApi>) -> (App, Receiver<ControllerEvent>) {
        let (tx, rx) = channel();
        let api: Arc<dyn NewsApi> = api.clone();
        let app = App::new(
            api,
            "http://localhost:8000".to_string(),
            &Config::default(),
            KeybindingRegistry::new(),
            tx,
        );
        (app, rx)
    }

    fn press(app: &mut App, c: char) -> Action {
        handle_input(app, KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_quit_key() {
        let api = Arc::new(ScriptedApi::default());
        let (mut app, _rx) = test_app(&api);
        assert!(matches!(press(&mut app, 'q'), Action::Quit));
    }

    #[tokio::test]
    async fn test_help_overlay_captures_keys() {
        let api = Arc::new(ScriptedApi::default());
        let (mut app, _rx) = test_app(&api);
        press(&mut app, '?');
        assert!(app.show_help);

        // 'q' closes the overlay instead of quitting
        assert!(matches!(press(&mut app, 'q'), Action::Continue));
        assert!(!app.show_help);
    }

    #[tokio::test]
    async fn test_typing_in_search_mode_does_not_trigger_actions() {
        let api = Arc::new(ScriptedApi::default());
        let (mut app, _rx) = test_app(&api);
        press(&mut app, '/');
        assert!(app.search_mode);

        for c in "quit".chars() {
            assert!(matches!(press(&mut app, c), Action::Continue));
        }
        assert_eq!(app.search_input, "quit");

        handle_input(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        handle_input(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(!app.search_mode);
        assert_eq!(app.dashboard.query().search.as_deref(), Some("qui"));
    }

    #[tokio::test]
    async fn test_page_switch_keys() {
        let api = Arc::new(ScriptedApi::default());
        let (mut app, _rx) = test_app(&api);
        press(&mut app, '2');
        assert_eq!(app.view, View::Categories);
        press(&mut app, '1');
        assert_eq!(app.view, View::Dashboard);
    }

    #[tokio::test]
    async fn test_search_and_fetch_ignored_on_categories_page() {
        let api = Arc::new(ScriptedApi::default());
        let (mut app, _rx) = test_app(&api);
        press(&mut app, '2');

        press(&mut app, '/');
        assert!(!app.search_mode);
        press(&mut app, 'f');
        tokio::task::yield_now().await;
        assert_eq!(api.trigger_count(), 0);
        assert!(!app.categories_page.is_refreshing());
    }

    #[tokio::test]
    async fn test_enter_on_empty_list_sets_status() {
        let api = Arc::new(ScriptedApi::default());
        let (mut app, _rx) = test_app(&api);
        handle_input(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.view, View::Dashboard);
        let status = app.status_message.as_ref().map(|(m, _)| m.to_string());
        assert_eq!(status.as_deref(), Some(ERR_NO_ARTICLE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_keys_scroll_and_exit() {
        let api = Arc::new(ScriptedApi::default());
        api.push_latest(Scripted::ok(vec![sample_article(4)]));
        api.push_article(Scripted::ok(Some(sample_article(4))));
        let (mut app, mut rx) = test_app(&api);

        app.dashboard.refresh();
        let event = rx.recv().await.expect("feed event");
        app.handle_controller_event(event);

        handle_input(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.view, View::Detail);

        app.detail_visible_lines = 10;
        handle_input(&mut app, KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert_eq!(app.scroll_offset, 10);
        press(&mut app, 'k');
        assert_eq!(app.scroll_offset, 9);

        press(&mut app, 'b');
        assert_eq!(app.view, View::Dashboard);
    }

    #[tokio::test]
    async fn test_open_rejects_non_http_links() {
        let api = Arc::new(ScriptedApi::default());
        let (mut app, _rx) = test_app(&api);
        open_url(&mut app, Some("file:///etc/passwd".to_string()));
        let status = app.status_message.as_ref().map(|(m, _)| m.to_string());
        assert!(status.is_some_and(|s| s.contains("Unsupported scheme")));
    }
}
