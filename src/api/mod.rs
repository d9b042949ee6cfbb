//! News API access.
//!
//! The backend owns ingestion, summarization and storage; this module only
//! speaks its HTTP contract. [`NewsApi`] is the seam the controllers depend
//! on, and [`HttpNewsApi`] is the reqwest implementation used at runtime.

mod client;
mod error;
mod types;

pub use client::{HttpNewsApi, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
pub use error::{ApiError, GENERIC_FAILURE_MESSAGE};
pub use types::{
    parse_timestamp, Article, ArticleQuery, CategoriesResponse, HealthResponse, TriggerResponse,
    DEFAULT_CATEGORY,
};

#[cfg(test)]
pub(crate) use types::sample_article;

use async_trait::async_trait;

/// Operations the dashboard needs from the backend.
#[async_trait]
pub trait NewsApi: Send + Sync {
    /// `GET /news/latest` — articles in server order.
    async fn latest(&self, query: &ArticleQuery) -> Result<Vec<Article>, ApiError>;

    /// `GET /news/categories`.
    async fn categories(&self) -> Result<Vec<String>, ApiError>;

    /// `POST /news/fetch` — ask the backend to run an ingestion cycle.
    async fn trigger_fetch(&self) -> Result<TriggerResponse, ApiError>;

    /// `GET /news/{id}`; `Ok(None)` when the backend reports 404.
    async fn article(&self, id: i64) -> Result<Option<Article>, ApiError>;

    /// `GET /health`.
    async fn health(&self) -> Result<HealthResponse, ApiError>;
}
