use crate::api::{Article, NewsApi};
use crate::config::Config;
use crate::controller::{
    ControllerEvent, ControllerSender, DetailController, DetailState, FeedController, FeedEvent,
    FeedPage,
};
use crate::keybindings::KeybindingRegistry;
use crate::util::{catch_task_panic, MAX_SEARCH_QUERY_LENGTH};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Maximum scroll offset for the detail view (ratatui u16 limit).
pub const MAX_SCROLL: usize = u16::MAX as usize;

/// Quiet period after the last keystroke before a search query is applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// How long a status bar message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// View and Focus Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Categories,
    Detail,
}

/// Which pane has focus on the categories page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoriesFocus {
    Sidebar,
    Articles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Checking,
    Online,
    Offline,
}

/// Events from app-level background tasks. Page data arrives separately as
/// [`ControllerEvent`]s.
#[derive(Debug)]
pub enum AppEvent {
    HealthChecked(HealthStatus),
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub api: Arc<dyn NewsApi>,
    /// Resolved API base URL, shown in the header and error hints.
    pub base_url: String,
    pub keybindings: KeybindingRegistry,

    // Page controllers
    pub dashboard: FeedController,
    pub categories_page: FeedController,
    pub detail: DetailController,

    // UI State
    pub view: View,
    /// List view the detail page returns to.
    pub return_view: View,
    pub dashboard_selected: usize,
    pub categories_selected: usize,
    /// Highlighted row in the categories sidebar.
    pub category_cursor: usize,
    pub categories_focus: CategoriesFocus,
    pub scroll_offset: usize,
    /// Detail viewport height, updated on render for page scrolling.
    pub detail_visible_lines: usize,

    // Search
    pub search_mode: bool,
    pub search_input: String,
    /// Search text in effect when search mode was entered, restored on Esc.
    pub search_before: Option<String>,
    pub search_debounce: Option<Instant>,

    // Backend health
    pub health: HealthStatus,
    pub health_handle: Option<tokio::task::JoinHandle<()>>,

    /// Status message with expiry; `Cow` avoids allocating for literals.
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,

    /// Current frame of the loading spinner animation.
    pub spinner_frame: usize,

    pub show_help: bool,
    pub help_scroll_offset: usize,
}

impl App {
    pub fn new(
        api: Arc<dyn NewsApi>,
        base_url: String,
        config: &Config,
        keybindings: KeybindingRegistry,
        controller_tx: ControllerSender,
    ) -> Self {
        let dashboard = FeedController::new(
            Arc::clone(&api),
            FeedPage::Dashboard,
            config.feed_settings(FeedPage::Dashboard),
            controller_tx.clone(),
        );
        let categories_page = FeedController::new(
            Arc::clone(&api),
            FeedPage::Categories,
            config.feed_settings(FeedPage::Categories),
            controller_tx.clone(),
        );
        let detail = DetailController::new(Arc::clone(&api), config.ui_timeout(), controller_tx);

        Self {
            api,
            base_url,
            keybindings,
            dashboard,
            categories_page,
            detail,
            view: View::Dashboard,
            return_view: View::Dashboard,
            dashboard_selected: 0,
            categories_selected: 0,
            category_cursor: 0,
            categories_focus: CategoriesFocus::Sidebar,
            scroll_offset: 0,
            detail_visible_lines: 0,
            search_mode: false,
            search_input: String::new(),
            search_before: None,
            search_debounce: None,
            health: HealthStatus::Checking,
            health_handle: None,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
            show_help: false,
            help_scroll_offset: 0,
        }
    }

    /// Open on the categories page with `category` selected.
    pub fn with_initial_category(mut self, category: String) -> Self {
        self.categories_page.preset_query(Some(category), None);
        self.view = View::Categories;
        self.return_view = View::Categories;
        self.categories_focus = CategoriesFocus::Articles;
        self
    }

    /// Mount both list pages and check backend health.
    pub fn start(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        self.dashboard.start();
        self.categories_page.start();
        self.check_health(event_tx);
    }

    fn check_health(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        if let Some(handle) = self.health_handle.take() {
            handle.abort();
        }
        self.health = HealthStatus::Checking;
        let api = Arc::clone(&self.api);
        let tx = event_tx.clone();
        self.health_handle = Some(tokio::spawn(async move {
            let status = match catch_task_panic(api.health()).await {
                Ok(Ok(reply)) => {
                    tracing::debug!(status = %reply.status, "Backend health check succeeded");
                    HealthStatus::Online
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Backend health check failed");
                    HealthStatus::Offline
                }
                Err(panic) => {
                    tracing::error!(panic = %panic, "Health check task panicked");
                    HealthStatus::Offline
                }
            };
            if let Err(e) = tx.send(AppEvent::HealthChecked(status)).await {
                tracing::debug!(error = %e, "Failed to send health status (receiver dropped)");
            }
        }));
    }

    // ========================================================================
    // Page routing
    // ========================================================================

    /// The list page currently shown, or the one the detail view returns to.
    pub fn list_page(&self) -> FeedPage {
        match self.view {
            View::Dashboard => FeedPage::Dashboard,
            View::Categories => FeedPage::Categories,
            View::Detail => match self.return_view {
                View::Categories => FeedPage::Categories,
                _ => FeedPage::Dashboard,
            },
        }
    }

    pub fn feed(&self, page: FeedPage) -> &FeedController {
        match page {
            FeedPage::Dashboard => &self.dashboard,
            FeedPage::Categories => &self.categories_page,
        }
    }

    pub fn feed_mut(&mut self, page: FeedPage) -> &mut FeedController {
        match page {
            FeedPage::Dashboard => &mut self.dashboard,
            FeedPage::Categories => &mut self.categories_page,
        }
    }

    pub fn active_feed(&self) -> &FeedController {
        self.feed(self.list_page())
    }

    pub fn active_feed_mut(&mut self) -> &mut FeedController {
        self.feed_mut(self.list_page())
    }

    fn selected_index(&self, page: FeedPage) -> usize {
        match page {
            FeedPage::Dashboard => self.dashboard_selected,
            FeedPage::Categories => self.categories_selected,
        }
    }

    fn selected_index_mut(&mut self, page: FeedPage) -> &mut usize {
        match page {
            FeedPage::Dashboard => &mut self.dashboard_selected,
            FeedPage::Categories => &mut self.categories_selected,
        }
    }

    pub fn show_view(&mut self, view: View) {
        if self.view == View::Detail {
            self.exit_detail();
        }
        if self.search_mode {
            self.commit_search();
        }
        self.view = view;
        self.needs_redraw = true;
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Article under the cursor on the active list page.
    pub fn selected_article(&self) -> Option<&Article> {
        let page = self.list_page();
        self.feed(page)
            .state()
            .articles
            .get(self.selected_index(page))
    }

    pub fn clamp_selections(&mut self) {
        for page in [FeedPage::Dashboard, FeedPage::Categories] {
            let len = self.feed(page).state().articles.len();
            let index = self.selected_index_mut(page);
            *index = (*index).min(len.saturating_sub(1));
        }
        let count = self.categories_page.categories().categories.len();
        self.category_cursor = self.category_cursor.min(count.saturating_sub(1));
    }

    fn sidebar_has_focus(&self) -> bool {
        self.view == View::Categories && self.categories_focus == CategoriesFocus::Sidebar
    }

    pub fn nav_up(&mut self) {
        if self.sidebar_has_focus() {
            self.category_cursor = self.category_cursor.saturating_sub(1);
            return;
        }
        let page = self.list_page();
        let index = self.selected_index_mut(page);
        *index = index.saturating_sub(1);
    }

    pub fn nav_down(&mut self) {
        if self.sidebar_has_focus() {
            let count = self.categories_page.categories().categories.len();
            if count > 0 {
                self.category_cursor = self.category_cursor.saturating_add(1).min(count - 1);
            }
            return;
        }
        let page = self.list_page();
        let len = self.feed(page).state().articles.len();
        if len > 0 {
            let index = self.selected_index_mut(page);
            *index = index.saturating_add(1).min(len - 1);
        }
    }

    pub fn cycle_focus(&mut self) {
        if self.view == View::Categories {
            self.categories_focus = match self.categories_focus {
                CategoriesFocus::Sidebar => CategoriesFocus::Articles,
                CategoriesFocus::Articles => CategoriesFocus::Sidebar,
            };
        }
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Re-query `page` with a new category, keeping its search text.
    pub fn select_category(&mut self, page: FeedPage, category: Option<String>) {
        let search = self.feed(page).query().search.clone();
        self.feed_mut(page).set_query(category, search);
        *self.selected_index_mut(page) = 0;
        if page == FeedPage::Categories {
            self.sync_category_cursor();
        }
    }

    /// Point the sidebar cursor at the selected category, if it is listed.
    fn sync_category_cursor(&mut self) {
        let page = &self.categories_page;
        if let Some(pos) = page
            .query()
            .category
            .as_ref()
            .and_then(|c| page.categories().categories.iter().position(|x| x == c))
        {
            self.category_cursor = pos;
        }
    }

    /// Step the category filter forward or back.
    ///
    /// The dashboard cycles through "All" plus every category; the categories
    /// page has no "All" entry and clamps at the ends.
    pub fn step_category(&mut self, forward: bool) {
        let page = self.list_page();
        let categories = Arc::clone(&self.feed(page).categories().categories);
        if categories.is_empty() {
            self.set_status("No categories available");
            return;
        }
        let current = self
            .feed(page)
            .query()
            .category
            .as_ref()
            .and_then(|c| categories.iter().position(|x| x == c));

        let next = match page {
            FeedPage::Dashboard => {
                // Slot 0 is "All Categories".
                let slots = categories.len() + 1;
                let slot = current.map_or(0, |i| i + 1);
                let slot = if forward {
                    (slot + 1) % slots
                } else {
                    (slot + slots - 1) % slots
                };
                slot.checked_sub(1)
            }
            FeedPage::Categories => Some(match (current, forward) {
                (None, _) => 0,
                (Some(i), true) => (i + 1).min(categories.len() - 1),
                (Some(i), false) => i.saturating_sub(1),
            }),
        };
        let category = next.and_then(|i| categories.get(i).cloned());
        self.select_category(page, category);
    }

    /// Apply the category under the sidebar cursor.
    pub fn select_category_at_cursor(&mut self) {
        let category = self
            .categories_page
            .categories()
            .categories
            .get(self.category_cursor)
            .cloned();
        if let Some(category) = category {
            self.select_category(FeedPage::Categories, Some(category));
            self.categories_focus = CategoriesFocus::Articles;
        }
    }

    pub fn clear_category(&mut self) {
        let page = self.list_page();
        if self.feed(page).query().category.is_some() {
            self.select_category(page, None);
            if page == FeedPage::Categories {
                self.categories_focus = CategoriesFocus::Sidebar;
            }
        }
    }

    // ========================================================================
    // Search
    // ========================================================================

    pub fn enter_search(&mut self) {
        let current = self.active_feed().query().search.clone();
        self.search_input = current.clone().unwrap_or_default();
        self.search_before = current;
        self.search_mode = true;
        self.search_debounce = None;
    }

    /// Append a character. Returns `false` when the query is at max length.
    pub fn push_search_char(&mut self, c: char) -> bool {
        if self.search_input.len() + c.len_utf8() > MAX_SEARCH_QUERY_LENGTH {
            self.set_status(format!(
                "Search query at max length ({} chars)",
                MAX_SEARCH_QUERY_LENGTH
            ));
            return false;
        }
        self.search_input.push(c);
        self.search_debounce = Some(Instant::now());
        true
    }

    pub fn pop_search_char(&mut self) {
        if self.search_input.pop().is_some() {
            self.search_debounce = Some(Instant::now());
        }
    }

    /// Apply the typed query if the debounce window has passed.
    pub fn apply_debounced_search(&mut self) -> bool {
        match self.search_debounce {
            Some(last) if self.search_mode && last.elapsed() >= SEARCH_DEBOUNCE => {
                self.search_debounce = None;
                self.apply_search(self.search_input.clone());
                true
            }
            _ => false,
        }
    }

    /// Enter: apply the query now and leave search mode.
    pub fn commit_search(&mut self) {
        self.search_mode = false;
        self.search_before = None;
        let pending = self.search_debounce.take().is_some();
        let typed = Some(self.search_input.trim()).filter(|s| !s.is_empty());
        if pending || typed != self.active_feed().query().search.as_deref() {
            self.apply_search(self.search_input.clone());
        }
    }

    /// Esc: restore the search in effect before search mode was entered.
    pub fn cancel_search(&mut self) {
        self.search_mode = false;
        self.search_debounce = None;
        let before = self.search_before.take();
        self.search_input = before.clone().unwrap_or_default();
        if self.active_feed().query().search != before {
            self.apply_search(self.search_input.clone());
        }
    }

    fn apply_search(&mut self, text: String) {
        let page = self.list_page();
        let category = self.feed(page).query().category.clone();
        tracing::debug!(page = page.label(), query = %text, "Applying search");
        self.feed_mut(page).set_query(category, Some(text));
        *self.selected_index_mut(page) = 0;
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    pub fn reload(&mut self) {
        if self.view == View::Detail {
            if let Some(id) = self.detail_article_id() {
                self.detail.load(id);
            }
            return;
        }
        self.active_feed_mut().refresh();
    }

    /// Ask the backend to fetch news, then reload the active page.
    pub fn fetch_news(&mut self) {
        if self.active_feed_mut().trigger_refresh() {
            self.set_status("Fetching latest news...");
        } else {
            self.set_status("A fetch is already in progress");
        }
    }

    // ========================================================================
    // Detail view
    // ========================================================================

    pub fn enter_detail(&mut self) -> Option<i64> {
        let id = self.selected_article()?.id;
        if self.view != View::Detail {
            self.return_view = self.view;
        }
        self.view = View::Detail;
        self.scroll_offset = 0;
        self.detail.load(id);
        Some(id)
    }

    pub fn exit_detail(&mut self) {
        self.detail.clear();
        self.view = self.return_view;
        self.scroll_offset = 0;
    }

    fn detail_article_id(&self) -> Option<i64> {
        match self.detail.state() {
            DetailState::Idle => None,
            DetailState::Loading { id }
            | DetailState::NotFound { id }
            | DetailState::Failed { id, .. } => Some(*id),
            DetailState::Loaded(article) => Some(article.id),
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(MAX_SCROLL);
    }

    /// Clamp scroll offset so the last line stays on screen.
    pub fn clamp_scroll(&mut self, content_lines: usize, visible_lines: usize) {
        let max_scroll = content_lines.saturating_sub(visible_lines);
        self.scroll_offset = self.scroll_offset.min(max_scroll).min(MAX_SCROLL);
    }

    // ========================================================================
    // Status bar
    // ========================================================================

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    // ========================================================================
    // Background events
    // ========================================================================

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::HealthChecked(status) => {
                self.health = status;
                self.health_handle = None;
            }
        }
    }

    /// Route a controller event to its owner. Returns true if state changed.
    pub fn handle_controller_event(&mut self, event: ControllerEvent) -> bool {
        match event {
            ControllerEvent::Feed { page, event } => {
                let note: Option<Cow<'static, str>> = match &event {
                    FeedEvent::TriggerSettled { result: Ok(_), .. } => {
                        Some("Backend is fetching news, reloading shortly...".into())
                    }
                    FeedEvent::TriggerSettled { result: Err(e), .. } => {
                        Some(format!("Fetch failed: {}", e).into())
                    }
                    _ => None,
                };
                let applied = self.feed_mut(page).handle_event(event);
                if applied {
                    if let Some(note) = note {
                        self.set_status(note);
                    }
                    if page == FeedPage::Categories {
                        self.sync_category_cursor();
                    }
                    self.clamp_selections();
                }
                applied
            }
            ControllerEvent::Detail(event) => {
                let applied = self.detail.handle_event(event);
                if applied {
                    self.scroll_offset = 0;
                }
                applied
            }
        }
    }

    /// True while any visible page is waiting on the backend.
    pub fn is_busy(&self) -> bool {
        let feed = self.active_feed();
        let detail_loading = matches!(self.detail.state(), DetailState::Loading { .. });
        feed.state().loading()
            || feed.is_refreshing()
            || (self.view == View::Detail && detail_loading)
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

/// Controllers abort their own tasks on drop; only the health probe is
/// owned here.
impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.health_handle.take() {
            handle.abort();
            tracing::debug!("Aborted health check task on App drop");
        }
    }
}
