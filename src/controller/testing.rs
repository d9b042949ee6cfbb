//! In-memory [`NewsApi`] doubles for controller tests.

use super::{ControllerEvent, FeedEvent};
use crate::api::{
    ApiError, Article, ArticleQuery, HealthResponse, NewsApi, TriggerResponse,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc::{self, Receiver, Sender};

/// One canned reply, optionally delayed.
pub(crate) struct Scripted<T> {
    delay: Duration,
    result: Result<T, ApiError>,
}

impl<T> Scripted<T> {
    pub(crate) fn ok(value: T) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(value),
        }
    }

    pub(crate) fn err(error: ApiError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub(crate) fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Replies from per-endpoint queues; an empty queue answers with an empty success.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    latest: Mutex<VecDeque<Scripted<Vec<Article>>>>,
    categories: Mutex<VecDeque<Scripted<Vec<String>>>>,
    triggers: Mutex<VecDeque<Scripted<TriggerResponse>>>,
    articles: Mutex<VecDeque<Scripted<Option<Article>>>>,
    latest_calls: Mutex<Vec<ArticleQuery>>,
    trigger_calls: AtomicUsize,
}

impl ScriptedApi {
    pub(crate) fn push_latest(&self, reply: Scripted<Vec<Article>>) {
        self.latest.lock().unwrap().push_back(reply);
    }

    pub(crate) fn push_categories(&self, reply: Scripted<Vec<String>>) {
        self.categories.lock().unwrap().push_back(reply);
    }

    pub(crate) fn push_trigger(&self, reply: Scripted<TriggerResponse>) {
        self.triggers.lock().unwrap().push_back(reply);
    }

    pub(crate) fn push_article(&self, reply: Scripted<Option<Article>>) {
        self.articles.lock().unwrap().push_back(reply);
    }

    pub(crate) fn latest_calls(&self) -> Vec<ArticleQuery> {
        self.latest_calls.lock().unwrap().clone()
    }

    pub(crate) fn trigger_count(&self) -> usize {
        self.trigger_calls.load(Ordering::SeqCst)
    }
}

async fn play<T>(queue: &Mutex<VecDeque<Scripted<T>>>, fallback: T) -> Result<T, ApiError> {
    let next = queue.lock().unwrap().pop_front();
    match next {
        Some(reply) => {
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            reply.result
        }
        None => Ok(fallback),
    }
}

#[async_trait]
impl NewsApi for ScriptedApi {
    async fn latest(&self, query: &ArticleQuery) -> Result<Vec<Article>, ApiError> {
        self.latest_calls.lock().unwrap().push(query.clone());
        play(&self.latest, Vec::new()).await
    }

    async fn categories(&self) -> Result<Vec<String>, ApiError> {
        play(&self.categories, Vec::new()).await
    }

    async fn trigger_fetch(&self) -> Result<TriggerResponse, ApiError> {
        self.trigger_calls.fetch_add(1, Ordering::SeqCst);
        let fallback = TriggerResponse {
            status: "success".to_string(),
            message: String::new(),
        };
        play(&self.triggers, fallback).await
    }

    async fn article(&self, _id: i64) -> Result<Option<Article>, ApiError> {
        play(&self.articles, None).await
    }

    async fn health(&self) -> Result<HealthResponse, ApiError> {
        Ok(HealthResponse {
            status: "healthy".to_string(),
        })
    }
}

/// Every call panics, for exercising task panic capture.
pub(crate) struct PanickingApi;

#[async_trait]
impl NewsApi for PanickingApi {
    async fn latest(&self, _query: &ArticleQuery) -> Result<Vec<Article>, ApiError> {
        panic!("backend exploded")
    }

    async fn categories(&self) -> Result<Vec<String>, ApiError> {
        panic!("backend exploded")
    }

    async fn trigger_fetch(&self) -> Result<TriggerResponse, ApiError> {
        panic!("backend exploded")
    }

    async fn article(&self, _id: i64) -> Result<Option<Article>, ApiError> {
        panic!("backend exploded")
    }

    async fn health(&self) -> Result<HealthResponse, ApiError> {
        panic!("backend exploded")
    }
}

pub(crate) fn channel() -> (Sender<ControllerEvent>, Receiver<ControllerEvent>) {
    mpsc::channel(32)
}

pub(crate) async fn next_feed_event(rx: &mut Receiver<ControllerEvent>) -> FeedEvent {
    match rx.recv().await {
        Some(ControllerEvent::Feed { event, .. }) => event,
        other => panic!("expected feed event, got {:?}", other),
    }
}
