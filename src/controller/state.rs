use crate::api::Article;
use std::sync::Arc;

/// Shown when a fetch exceeds the UI-level bound.
pub const TIMEOUT_MESSAGE: &str =
    "Request timed out. The backend may not be responding. Check if the server is running.";

/// Lifecycle of one page's article list.
///
/// `Idle → Loading → {Loaded, Failed, TimedOut}`; any query change goes back
/// to `Loading` (or `Idle` when the page is waiting for a category pick).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
    TimedOut,
}

/// Observable `{articles, loading, error}` snapshot for a list page.
///
/// `articles` is behind an `Arc` so the renderer can hold a snapshot without
/// copying the list.
#[derive(Debug, Clone)]
pub struct FeedState {
    pub status: FeedStatus,
    pub articles: Arc<Vec<Article>>,
    pub error: Option<String>,
}

impl FeedState {
    pub fn loading(&self) -> bool {
        self.status == FeedStatus::Loading
    }
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            status: FeedStatus::Idle,
            articles: Arc::new(Vec::new()),
            error: None,
        }
    }
}

/// Observable `{categories, categoriesLoading, categoriesError}` snapshot.
#[derive(Debug, Clone, Default)]
pub struct CategoryState {
    pub categories: Arc<Vec<String>>,
    pub loading: bool,
    pub error: Option<String>,
}

/// How a single list fetch ended.
#[derive(Debug)]
pub enum FetchOutcome {
    Articles(Vec<Article>),
    /// Already mapped to a display message.
    Failed(String),
    TimedOut,
}
