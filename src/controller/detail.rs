use super::state::TIMEOUT_MESSAGE;
use super::{deliver, ControllerEvent, ControllerSender};
use crate::api::{Article, NewsApi};
use crate::util::catch_task_panic;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Idle,
    Loading { id: i64 },
    Loaded(Arc<Article>),
    NotFound { id: i64 },
    Failed { id: i64, error: String },
}

#[derive(Debug)]
pub enum DetailOutcome {
    Found(Article),
    NotFound,
    Failed(String),
    TimedOut,
}

#[derive(Debug)]
pub struct DetailEvent {
    pub generation: u64,
    pub id: i64,
    pub outcome: DetailOutcome,
}

/// Loads a single article for the detail page.
///
/// Same discipline as the list controller: one request in flight, the newest
/// `load` wins, and loading never outlasts the UI timeout.
pub struct DetailController {
    api: Arc<dyn NewsApi>,
    tx: ControllerSender,
    ui_timeout: Duration,
    generation: u64,
    in_flight: Option<u64>,
    handle: Option<JoinHandle<()>>,
    state: DetailState,
}

impl DetailController {
    pub fn new(api: Arc<dyn NewsApi>, ui_timeout: Duration, tx: ControllerSender) -> Self {
        Self {
            api,
            tx,
            ui_timeout,
            generation: 0,
            in_flight: None,
            handle: None,
            state: DetailState::Idle,
        }
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn article(&self) -> Option<&Article> {
        match &self.state {
            DetailState::Loaded(article) => Some(article),
            _ => None,
        }
    }

    pub fn load(&mut self, id: i64) {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        self.in_flight = Some(generation);
        self.state = DetailState::Loading { id };

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let ui_timeout = self.ui_timeout;
        self.handle = Some(tokio::spawn(async move {
            let fetch = tokio::time::timeout(ui_timeout, api.article(id));
            let outcome = match catch_task_panic(fetch).await {
                Ok(Ok(Ok(Some(article)))) => DetailOutcome::Found(article),
                Ok(Ok(Ok(None))) => DetailOutcome::NotFound,
                Ok(Ok(Err(e))) => {
                    tracing::warn!(id, error = %e, "Article load failed");
                    DetailOutcome::Failed(e.user_message())
                }
                Ok(Err(_)) => DetailOutcome::TimedOut,
                Err(panic) => DetailOutcome::Failed(format!("Internal error: {}", panic)),
            };
            deliver(
                &tx,
                ControllerEvent::Detail(DetailEvent {
                    generation,
                    id,
                    outcome,
                }),
            )
            .await;
        }));
    }

    /// Leave the detail page: cancel any load and forget the article.
    pub fn clear(&mut self) {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        self.state = DetailState::Idle;
    }

    pub fn handle_event(&mut self, event: DetailEvent) -> bool {
        if self.in_flight != Some(event.generation) {
            tracing::debug!(id = event.id, "Discarding stale article load");
            return false;
        }
        self.in_flight = None;
        self.handle = None;
        let id = event.id;
        self.state = match event.outcome {
            DetailOutcome::Found(article) => DetailState::Loaded(Arc::new(article)),
            DetailOutcome::NotFound => DetailState::NotFound { id },
            DetailOutcome::Failed(error) => DetailState::Failed { id, error },
            DetailOutcome::TimedOut => DetailState::Failed {
                id,
                error: TIMEOUT_MESSAGE.to_string(),
            },
        };
        true
    }

    fn cancel(&mut self) {
        self.in_flight = None;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for DetailController {
    fn drop(&mut self) {
        self.cancel();
    }
}
