use super::state::{CategoryState, FeedState, FeedStatus, FetchOutcome, TIMEOUT_MESSAGE};
use super::{deliver, ControllerEvent, ControllerSender};
use crate::api::{ArticleQuery, NewsApi, TriggerResponse};
use crate::util::catch_task_panic;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Which list page a [`FeedController`] drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedPage {
    Dashboard,
    Categories,
}

impl FeedPage {
    pub fn label(self) -> &'static str {
        match self {
            FeedPage::Dashboard => "dashboard",
            FeedPage::Categories => "categories",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    /// `limit` sent with every list request.
    pub limit: u32,
    /// Upper bound on how long the page may show a loading state.
    pub ui_timeout: Duration,
    /// Pause between a successful backend trigger and the re-fetch.
    pub refresh_delay: Duration,
    /// When set, no list request is made while no category is selected.
    pub require_category: bool,
}

/// Settled background work for a [`FeedController`].
#[derive(Debug)]
pub enum FeedEvent {
    ArticlesSettled {
        seq: u64,
        outcome: FetchOutcome,
    },
    CategoriesSettled {
        seq: u64,
        result: Result<Vec<String>, String>,
    },
    TriggerSettled {
        seq: u64,
        result: Result<TriggerResponse, String>,
    },
    RefetchDue {
        seq: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshPhase {
    Triggering,
    Waiting,
    Fetching,
}

/// Drives one list page: category list, filtered article fetches, and the
/// trigger-then-refetch refresh cycle.
pub struct FeedController {
    api: Arc<dyn NewsApi>,
    page: FeedPage,
    settings: FeedSettings,
    tx: ControllerSender,

    query: ArticleQuery,
    state: FeedState,
    categories: CategoryState,

    // Monotonic tags; a settled event is applied only if its tag is in flight.
    fetch_seq: u64,
    fetch_in_flight: Option<u64>,
    categories_seq: u64,
    categories_in_flight: Option<u64>,
    trigger_seq: u64,
    refresh_phase: Option<RefreshPhase>,

    fetch_handle: Option<JoinHandle<()>>,
    categories_handle: Option<JoinHandle<()>>,
    trigger_handle: Option<JoinHandle<()>>,
}

impl FeedController {
    pub fn new(
        api: Arc<dyn NewsApi>,
        page: FeedPage,
        settings: FeedSettings,
        tx: ControllerSender,
    ) -> Self {
        Self {
            api,
            page,
            query: ArticleQuery::new(None, None, settings.limit),
            settings,
            tx,
            state: FeedState::default(),
            categories: CategoryState::default(),
            fetch_seq: 0,
            fetch_in_flight: None,
            categories_seq: 0,
            categories_in_flight: None,
            trigger_seq: 0,
            refresh_phase: None,
            fetch_handle: None,
            categories_handle: None,
            trigger_handle: None,
        }
    }

    /// Preset the filters used by [`start`](Self::start) without fetching.
    pub fn preset_query(&mut self, category: Option<String>, search: Option<String>) {
        self.query = ArticleQuery::new(category, search, self.settings.limit);
    }

    /// Mount: load categories and issue the first article fetch.
    pub fn start(&mut self) {
        self.load_categories();
        self.issue_fetch();
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn query(&self) -> &ArticleQuery {
        &self.query
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn categories(&self) -> &CategoryState {
        &self.categories
    }

    /// True from a trigger request until its follow-up fetch settles.
    pub fn is_refreshing(&self) -> bool {
        self.refresh_phase.is_some()
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Replace the filters and re-fetch. Always issues a new request, even
    /// when the filters are unchanged.
    pub fn set_query(&mut self, category: Option<String>, search: Option<String>) {
        self.query = ArticleQuery::new(category, search, self.settings.limit);
        tracing::debug!(
            page = self.page.label(),
            category = ?self.query.category,
            search = ?self.query.search,
            "Query changed"
        );
        self.issue_fetch();
    }

    /// Re-run the current query.
    pub fn refresh(&mut self) {
        self.issue_fetch();
    }

    /// Ask the backend to ingest new articles, then re-fetch after the
    /// configured delay. Returns `false` if a refresh is already running.
    pub fn trigger_refresh(&mut self) -> bool {
        if self.refresh_phase.is_some() {
            tracing::debug!(page = self.page.label(), "Refresh already in progress");
            return false;
        }
        self.trigger_seq = self.trigger_seq.wrapping_add(1);
        let seq = self.trigger_seq;
        self.refresh_phase = Some(RefreshPhase::Triggering);

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let page = self.page;
        self.trigger_handle = Some(tokio::spawn(async move {
            let result = match catch_task_panic(api.trigger_fetch()).await {
                Ok(Ok(reply)) => Ok(reply),
                Ok(Err(e)) => Err(e.user_message()),
                Err(panic) => {
                    tracing::error!(panic = %panic, "Trigger task panicked");
                    Err(format!("Internal error: {}", panic))
                }
            };
            deliver(
                &tx,
                ControllerEvent::Feed {
                    page,
                    event: FeedEvent::TriggerSettled { seq, result },
                },
            )
            .await;
        }));
        true
    }

    /// Apply a settled event. Returns `true` if state changed; stale or
    /// superseded events are dropped and return `false`.
    pub fn handle_event(&mut self, event: FeedEvent) -> bool {
        match event {
            FeedEvent::ArticlesSettled { seq, outcome } => self.apply_articles(seq, outcome),
            FeedEvent::CategoriesSettled { seq, result } => {
                if self.categories_in_flight != Some(seq) {
                    tracing::debug!(seq, "Discarding stale categories result");
                    return false;
                }
                self.categories_in_flight = None;
                self.categories_handle = None;
                self.categories.loading = false;
                match result {
                    Ok(categories) => {
                        self.categories.categories = Arc::new(categories);
                        self.categories.error = None;
                    }
                    Err(message) => {
                        tracing::warn!(page = self.page.label(), error = %message, "Failed to load categories");
                        self.categories.categories = Arc::new(Vec::new());
                        self.categories.error = Some(message);
                    }
                }
                true
            }
            FeedEvent::TriggerSettled { seq, result } => {
                if seq != self.trigger_seq || self.refresh_phase != Some(RefreshPhase::Triggering) {
                    return false;
                }
                self.trigger_handle = None;
                match result {
                    Ok(reply) => {
                        tracing::info!(
                            status = %reply.status,
                            message = %reply.message,
                            "Backend fetch triggered"
                        );
                        self.refresh_phase = Some(RefreshPhase::Waiting);
                        self.schedule_refetch(seq);
                    }
                    Err(message) => {
                        tracing::warn!(error = %message, "Backend fetch trigger failed");
                        self.refresh_phase = None;
                    }
                }
                true
            }
            FeedEvent::RefetchDue { seq } => {
                if seq != self.trigger_seq || self.refresh_phase != Some(RefreshPhase::Waiting) {
                    return false;
                }
                self.trigger_handle = None;
                self.refresh_phase = Some(RefreshPhase::Fetching);
                self.issue_fetch();
                true
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn apply_articles(&mut self, seq: u64, outcome: FetchOutcome) -> bool {
        if self.fetch_in_flight != Some(seq) {
            tracing::debug!(
                page = self.page.label(),
                seq,
                current = self.fetch_seq,
                "Discarding superseded fetch result"
            );
            return false;
        }
        self.fetch_in_flight = None;
        self.fetch_handle = None;

        match outcome {
            FetchOutcome::Articles(articles) => {
                tracing::debug!(page = self.page.label(), count = articles.len(), "Articles loaded");
                self.state.articles = Arc::new(articles);
                self.state.error = None;
                self.state.status = FeedStatus::Loaded;
            }
            FetchOutcome::Failed(message) => {
                self.state.articles = Arc::new(Vec::new());
                self.state.error = Some(message);
                self.state.status = FeedStatus::Failed;
            }
            FetchOutcome::TimedOut => {
                // Whatever was on screen stays; only the banner changes.
                self.state.error = Some(TIMEOUT_MESSAGE.to_string());
                self.state.status = FeedStatus::TimedOut;
            }
        }
        self.finish_refresh_fetch();
        true
    }

    fn finish_refresh_fetch(&mut self) {
        if self.refresh_phase == Some(RefreshPhase::Fetching) {
            self.refresh_phase = None;
        }
    }

    fn issue_fetch(&mut self) {
        self.fetch_seq = self.fetch_seq.wrapping_add(1);
        let seq = self.fetch_seq;
        if let Some(handle) = self.fetch_handle.take() {
            handle.abort();
        }
        self.state.error = None;

        if self.settings.require_category && self.query.category.is_none() {
            self.fetch_in_flight = None;
            self.state.articles = Arc::new(Vec::new());
            self.state.status = FeedStatus::Idle;
            self.finish_refresh_fetch();
            tracing::debug!(page = self.page.label(), "No category selected, skipping fetch");
            return;
        }

        self.fetch_in_flight = Some(seq);
        self.state.status = FeedStatus::Loading;

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let query = self.query.clone();
        let ui_timeout = self.settings.ui_timeout;
        let page = self.page;
        self.fetch_handle = Some(tokio::spawn(async move {
            let fetch = tokio::time::timeout(ui_timeout, api.latest(&query));
            let outcome = match catch_task_panic(fetch).await {
                Ok(Ok(Ok(articles))) => FetchOutcome::Articles(articles),
                Ok(Ok(Err(e))) => {
                    tracing::warn!(page = page.label(), error = %e, "Article fetch failed");
                    FetchOutcome::Failed(e.user_message())
                }
                Ok(Err(_)) => {
                    tracing::warn!(
                        page = page.label(),
                        timeout_secs = ui_timeout.as_secs(),
                        "Article fetch timed out"
                    );
                    FetchOutcome::TimedOut
                }
                Err(panic) => {
                    tracing::error!(panic = %panic, "Fetch task panicked");
                    FetchOutcome::Failed(format!("Internal error: {}", panic))
                }
            };
            deliver(
                &tx,
                ControllerEvent::Feed {
                    page,
                    event: FeedEvent::ArticlesSettled { seq, outcome },
                },
            )
            .await;
        }));
    }

    fn load_categories(&mut self) {
        self.categories_seq = self.categories_seq.wrapping_add(1);
        let seq = self.categories_seq;
        if let Some(handle) = self.categories_handle.take() {
            handle.abort();
        }
        self.categories_in_flight = Some(seq);
        self.categories.loading = true;
        self.categories.error = None;

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let ui_timeout = self.settings.ui_timeout;
        let page = self.page;
        self.categories_handle = Some(tokio::spawn(async move {
            let fetch = tokio::time::timeout(ui_timeout, api.categories());
            let result = match catch_task_panic(fetch).await {
                Ok(Ok(Ok(categories))) => Ok(categories),
                Ok(Ok(Err(e))) => Err(e.user_message()),
                Ok(Err(_)) => Err(TIMEOUT_MESSAGE.to_string()),
                Err(panic) => Err(format!("Internal error: {}", panic)),
            };
            deliver(
                &tx,
                ControllerEvent::Feed {
                    page,
                    event: FeedEvent::CategoriesSettled { seq, result },
                },
            )
            .await;
        }));
    }

    fn schedule_refetch(&mut self, seq: u64) {
        let tx = self.tx.clone();
        let delay = self.settings.refresh_delay;
        let page = self.page;
        self.trigger_handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            deliver(
                &tx,
                ControllerEvent::Feed {
                    page,
                    event: FeedEvent::RefetchDue { seq },
                },
            )
            .await;
        }));
    }
}

impl Drop for FeedController {
    fn drop(&mut self) {
        for handle in [
            self.fetch_handle.take(),
            self.categories_handle.take(),
            self.trigger_handle.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{sample_article, ApiError};
    use crate::controller::testing::{channel, next_feed_event, PanickingApi, Scripted, ScriptedApi};
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::Receiver;
    use tokio::time::Instant;

    fn settings(require_category: bool) -> FeedSettings {
        FeedSettings {
            limit: 50,
            ui_timeout: Duration::from_secs(15),
            refresh_delay: Duration::from_secs(2),
            require_category,
        }
    }

    fn controller(
        api: &Arc<ScriptedApi>,
        require_category: bool,
    ) -> (FeedController, Receiver<ControllerEvent>) {
        let (tx, rx) = channel();
        let page = if require_category {
            FeedPage::Categories
        } else {
            FeedPage::Dashboard
        };
        let api: Arc<dyn NewsApi> = api.clone();
        (FeedController::new(api, page, settings(require_category), tx), rx)
    }

    fn ids(ctrl: &FeedController) -> Vec<i64> {
        ctrl.state().articles.iter().map(|a| a.id).collect()
    }

    async fn settle(ctrl: &mut FeedController, rx: &mut Receiver<ControllerEvent>) -> bool {
        let event = next_feed_event(rx).await;
        ctrl.handle_event(event)
    }

    #[tokio::test(start_paused = true)]
    async fn test_articles_kept_in_server_order() {
        let api = Arc::new(ScriptedApi::default());
        api.push_latest(Scripted::ok(vec![
            sample_article(5),
            sample_article(2),
            sample_article(9),
        ]));
        let (mut ctrl, mut rx) = controller(&api, false);

        ctrl.set_query(None, None);
        assert!(ctrl.state().loading());

        assert!(settle(&mut ctrl, &mut rx).await);
        assert_eq!(ids(&ctrl), vec![5, 2, 9]);
        assert!(!ctrl.state().loading());
        assert_eq!(ctrl.state().error, None);
        assert_eq!(ctrl.state().status, FeedStatus::Loaded);
        assert_eq!(api.latest_calls(), vec![ArticleQuery::new(None, None, 50)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_detail_becomes_error_and_clears_articles() {
        let api = Arc::new(ScriptedApi::default());
        api.push_latest(Scripted::ok(vec![sample_article(1)]));
        api.push_latest(Scripted::err(ApiError::Server {
            status: 500,
            detail: Some("db unavailable".to_string()),
        }));
        let (mut ctrl, mut rx) = controller(&api, false);

        ctrl.set_query(None, None);
        settle(&mut ctrl, &mut rx).await;
        assert_eq!(ids(&ctrl), vec![1]);

        ctrl.set_query(Some("AI".to_string()), None);
        settle(&mut ctrl, &mut rx).await;
        assert_eq!(ctrl.state().error.as_deref(), Some("db unavailable"));
        assert!(ctrl.state().articles.is_empty());
        assert!(!ctrl.state().loading());
        assert_eq!(ctrl.state().status, FeedStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_backend_names_base_url() {
        let api = Arc::new(ScriptedApi::default());
        api.push_latest(Scripted::err(ApiError::Unreachable {
            base_url: "http://localhost:8000".to_string(),
        }));
        let (mut ctrl, mut rx) = controller(&api, false);

        ctrl.set_query(None, None);
        settle(&mut ctrl, &mut rx).await;

        let error = ctrl.state().error.clone().unwrap_or_default();
        assert!(error.contains("http://localhost:8000"));
        assert!(error.contains("Make sure the backend is running"));
        assert!(!ctrl.state().loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_times_out_and_late_result_is_ignored() {
        let api = Arc::new(ScriptedApi::default());
        api.push_latest(
            Scripted::ok(vec![sample_article(1), sample_article(2)]).after(Duration::from_secs(20)),
        );
        let (mut ctrl, mut rx) = controller(&api, false);

        let started = Instant::now();
        ctrl.set_query(None, None);
        let event = next_feed_event(&mut rx).await;
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(15));
        assert!(waited < Duration::from_secs(16));
        assert!(matches!(
            event,
            FeedEvent::ArticlesSettled {
                outcome: FetchOutcome::TimedOut,
                ..
            }
        ));

        assert!(ctrl.handle_event(event));
        assert_eq!(ctrl.state().error.as_deref(), Some(TIMEOUT_MESSAGE));
        assert!(!ctrl.state().loading());
        assert!(ctrl.state().articles.is_empty());

        // The underlying call would have finished at 20s; nothing arrives.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());

        // A duplicate delivery for the settled request is not applied either.
        let late = FeedEvent::ArticlesSettled {
            seq: ctrl.fetch_seq,
            outcome: FetchOutcome::Articles(vec![sample_article(1)]),
        };
        assert!(!ctrl.handle_event(late));
        assert_eq!(ctrl.state().error.as_deref(), Some(TIMEOUT_MESSAGE));
        assert!(ctrl.state().articles.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_previous_articles() {
        let api = Arc::new(ScriptedApi::default());
        api.push_latest(Scripted::ok(vec![sample_article(3)]));
        api.push_latest(Scripted::ok(vec![]).after(Duration::from_secs(60)));
        let (mut ctrl, mut rx) = controller(&api, false);

        ctrl.set_query(None, None);
        settle(&mut ctrl, &mut rx).await;
        ctrl.refresh();
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(ids(&ctrl), vec![3]);
        assert_eq!(ctrl.state().status, FeedStatus::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_query_wins_over_slower_earlier_one() {
        let api = Arc::new(ScriptedApi::default());
        api.push_latest(Scripted::ok(vec![sample_article(1)]).after(Duration::from_secs(5)));
        api.push_latest(Scripted::ok(vec![sample_article(2)]).after(Duration::from_secs(1)));
        let (mut ctrl, mut rx) = controller(&api, false);

        ctrl.set_query(Some("AI".to_string()), None);
        let first_seq = ctrl.fetch_seq;
        // Let the first request reach the backend before superseding it.
        tokio::time::sleep(Duration::from_millis(100)).await;
        ctrl.set_query(Some("LLMs".to_string()), None);
        assert!(ctrl.state().loading());

        assert!(settle(&mut ctrl, &mut rx).await);
        assert_eq!(ids(&ctrl), vec![2]);
        assert_eq!(ctrl.query().category.as_deref(), Some("LLMs"));

        // The first request was cancelled and never reports.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());

        let stale = FeedEvent::ArticlesSettled {
            seq: first_seq,
            outcome: FetchOutcome::Articles(vec![sample_article(1)]),
        };
        assert!(!ctrl.handle_event(stale));
        assert_eq!(ids(&ctrl), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_identical_query_matches_single_query() {
        let single_api = Arc::new(ScriptedApi::default());
        single_api.push_latest(Scripted::ok(vec![sample_article(7)]));
        let (mut single, mut single_rx) = controller(&single_api, false);
        single.set_query(Some("AI".to_string()), Some("agents".to_string()));
        settle(&mut single, &mut single_rx).await;

        let twice_api = Arc::new(ScriptedApi::default());
        twice_api.push_latest(Scripted::ok(vec![sample_article(7)]));
        twice_api.push_latest(Scripted::ok(vec![sample_article(7)]));
        let (mut twice, mut twice_rx) = controller(&twice_api, false);
        twice.set_query(Some("AI".to_string()), Some("agents".to_string()));
        twice.set_query(Some("AI".to_string()), Some("agents".to_string()));
        settle(&mut twice, &mut twice_rx).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(twice_rx.try_recv().is_err());

        assert_eq!(ids(&twice), ids(&single));
        assert_eq!(twice.state().error, single.state().error);
        assert_eq!(twice.state().status, single.state().status);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_query_clears_previous_error() {
        let api = Arc::new(ScriptedApi::default());
        api.push_latest(Scripted::err(ApiError::Timeout(30)));
        api.push_latest(Scripted::ok(vec![sample_article(1)]).after(Duration::from_secs(1)));
        let (mut ctrl, mut rx) = controller(&api, false);

        ctrl.set_query(None, None);
        settle(&mut ctrl, &mut rx).await;
        assert!(ctrl.state().error.is_some());

        ctrl.set_query(None, Some("robots".to_string()));
        assert_eq!(ctrl.state().error, None);
        assert!(ctrl.state().loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_category_page_waits_for_category() {
        let api = Arc::new(ScriptedApi::default());
        let (mut ctrl, mut rx) = controller(&api, true);

        ctrl.set_query(None, Some("ignored".to_string()));
        assert!(!ctrl.state().loading());
        assert!(ctrl.state().articles.is_empty());
        assert_eq!(ctrl.state().status, FeedStatus::Idle);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());
        assert!(api.latest_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_category_page_fetches_selected_category() {
        let api = Arc::new(ScriptedApi::default());
        api.push_latest(Scripted::ok(vec![sample_article(4)]));
        let (mut ctrl, mut rx) = controller(&api, true);

        ctrl.set_query(Some("Robotics".to_string()), None);
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(ids(&ctrl), vec![4]);
        assert_eq!(
            api.latest_calls(),
            vec![ArticleQuery::new(Some("Robotics".to_string()), None, 50)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_on_category_page_loads_only_categories() {
        let api = Arc::new(ScriptedApi::default());
        api.push_categories(Scripted::ok(vec!["AI".to_string(), "Robotics".to_string()]));
        let (mut ctrl, mut rx) = controller(&api, true);

        ctrl.start();
        assert!(ctrl.categories().loading);
        assert!(!ctrl.state().loading());

        assert!(settle(&mut ctrl, &mut rx).await);
        assert_eq!(
            ctrl.categories().categories.as_slice(),
            &["AI".to_string(), "Robotics".to_string()]
        );
        assert!(!ctrl.categories().loading);
        assert!(api.latest_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_loads_categories_and_articles() {
        let api = Arc::new(ScriptedApi::default());
        api.push_categories(Scripted::ok(vec!["AI".to_string()]));
        api.push_latest(Scripted::ok(vec![sample_article(1)]));
        let (mut ctrl, mut rx) = controller(&api, false);

        ctrl.start();
        settle(&mut ctrl, &mut rx).await;
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.categories().categories.as_slice(), &["AI".to_string()]);
        assert_eq!(ids(&ctrl), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_categories_failure_sets_error() {
        let api = Arc::new(ScriptedApi::default());
        api.push_categories(Scripted::err(ApiError::Server {
            status: 503,
            detail: None,
        }));
        let (mut ctrl, mut rx) = controller(&api, true);

        ctrl.start();
        settle(&mut ctrl, &mut rx).await;

        assert!(ctrl.categories().categories.is_empty());
        assert!(!ctrl.categories().loading);
        assert_eq!(
            ctrl.categories().error.as_deref(),
            Some("Request failed with status code 503")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_preset_query_is_used_on_start() {
        let api = Arc::new(ScriptedApi::default());
        let (mut ctrl, _rx) = controller(&api, true);
        ctrl.preset_query(Some("AI".to_string()), None);
        assert!(!ctrl.state().loading());

        ctrl.start();
        assert!(ctrl.state().loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_refresh_refetches_after_delay() {
        let api = Arc::new(ScriptedApi::default());
        api.push_trigger(Scripted::ok(TriggerResponse {
            status: "success".to_string(),
            message: "News fetch started".to_string(),
        }));
        api.push_latest(Scripted::ok(vec![sample_article(4)]));
        let (mut ctrl, mut rx) = controller(&api, false);

        assert!(ctrl.trigger_refresh());
        assert!(ctrl.is_refreshing());
        assert!(!ctrl.trigger_refresh());

        assert!(settle(&mut ctrl, &mut rx).await);
        assert_eq!(api.trigger_count(), 1);
        assert!(api.latest_calls().is_empty());

        let waiting_since = Instant::now();
        let due = next_feed_event(&mut rx).await;
        assert!(matches!(due, FeedEvent::RefetchDue { .. }));
        assert!(waiting_since.elapsed() >= Duration::from_secs(2));
        assert!(ctrl.handle_event(due));
        tokio::task::yield_now().await;
        assert_eq!(api.latest_calls().len(), 1);
        assert!(ctrl.is_refreshing());

        settle(&mut ctrl, &mut rx).await;
        assert_eq!(ids(&ctrl), vec![4]);
        assert!(!ctrl.is_refreshing());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(api.latest_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_trigger_does_not_refetch() {
        let api = Arc::new(ScriptedApi::default());
        api.push_trigger(Scripted::err(ApiError::Server {
            status: 500,
            detail: Some("scraper offline".to_string()),
        }));
        let (mut ctrl, mut rx) = controller(&api, false);

        ctrl.trigger_refresh();
        assert!(settle(&mut ctrl, &mut rx).await);
        assert!(!ctrl.is_refreshing());
        assert_eq!(ctrl.state().error, None);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
        assert!(api.latest_calls().is_empty());

        // Allowed again once the failed attempt is over.
        assert!(ctrl.trigger_refresh());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_backend_reports_failure() {
        let (tx, mut rx) = channel();
        let api: Arc<dyn NewsApi> = Arc::new(PanickingApi);
        let mut ctrl = FeedController::new(api, FeedPage::Dashboard, settings(false), tx);

        ctrl.set_query(None, None);
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.state().status, FeedStatus::Failed);
        assert!(ctrl
            .state()
            .error
            .as_deref()
            .unwrap_or_default()
            .contains("backend exploded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_in_flight_fetch() {
        let api = Arc::new(ScriptedApi::default());
        api.push_latest(Scripted::ok(vec![sample_article(1)]).after(Duration::from_secs(5)));
        let (mut ctrl, mut rx) = controller(&api, false);

        ctrl.set_query(None, None);
        drop(ctrl);

        // Every sender is gone once the task is aborted.
        assert!(rx.recv().await.is_none());
    }
}
