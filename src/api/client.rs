use super::error::extract_detail;
use super::{ApiError, Article, ArticleQuery, CategoriesResponse, HealthResponse, NewsApi, TriggerResponse};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Default backend location when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Transport-level timeout applied to every call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Error bodies only need to hold a `detail` message.
const MAX_ERROR_BODY_SIZE: usize = 64 * 1024;

/// reqwest-backed client for the News API.
#[derive(Clone)]
pub struct HttpNewsApi {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpNewsApi {
    /// Build a client for `base_url` with the given transport timeout.
    ///
    /// Only `http` and `https` base URLs are accepted. A trailing slash is
    /// dropped so paths join cleanly.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed =
            Url::parse(base_url.trim()).map_err(|e| ApiError::InvalidBaseUrl(e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ApiError::InvalidBaseUrl(format!(
                    "unsupported scheme '{}' (only http/https allowed)",
                    scheme
                )))
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("newsdash/", env!("CARGO_PKG_VERSION")))
            .redirect(Policy::limited(3))
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()?;

        let base_url = parsed.as_str().trim_end_matches('/').to_string();
        tracing::debug!(base_url = %base_url, timeout_secs = timeout.as_secs(), "News API client ready");

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ApiError::InvalidBaseUrl(e.to_string()))
    }

    fn map_transport(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout.as_secs())
        } else if err.status().is_none()
            && (err.is_connect() || err.is_request() || err.is_body())
        {
            ApiError::Unreachable {
                base_url: self.base_url.clone(),
            }
        } else {
            ApiError::Network(err)
        }
    }

    /// Send a request and return the body of a 2xx reply.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();

        if !status.is_success() {
            let body = match self.read_limited_body(response, MAX_ERROR_BODY_SIZE).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(status = status.as_u16(), error = %e, "Failed to read error body");
                    Vec::new()
                }
            };
            let detail = extract_detail(&body);
            tracing::debug!(status = status.as_u16(), detail = ?detail, "News API returned error status");
            return Err(ApiError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        self.read_limited_body(response, MAX_RESPONSE_SIZE).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::trace!(url = %url, "GET");
        let body = self.send(self.client.get(url)).await?;
        decode(&body)
    }

    async fn read_limited_body(
        &self,
        response: reqwest::Response,
        limit: usize,
    ) -> Result<Vec<u8>, ApiError> {
        if let Some(len) = response.content_length() {
            if len as usize > limit {
                return Err(ApiError::ResponseTooLarge(limit));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.map_transport(e))?;
            if bytes.len().saturating_add(chunk.len()) > limit {
                return Err(ApiError::ResponseTooLarge(limit));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(bytes)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl NewsApi for HttpNewsApi {
    async fn latest(&self, query: &ArticleQuery) -> Result<Vec<Article>, ApiError> {
        let mut url = self.endpoint("/news/latest")?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.to_pairs() {
                pairs.append_pair(key, &value);
            }
        }
        // A `null` body means "nothing yet"; treat it as an empty list.
        let articles: Option<Vec<Article>> = self.get_json(url).await?;
        Ok(articles.unwrap_or_default())
    }

    async fn categories(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint("/news/categories")?;
        let response: CategoriesResponse = self.get_json(url).await?;
        Ok(response.categories)
    }

    async fn trigger_fetch(&self) -> Result<TriggerResponse, ApiError> {
        let url = self.endpoint("/news/fetch")?;
        tracing::info!(url = %url, "Requesting backend news fetch");
        let body = self.send(self.client.post(url)).await?;
        decode(&body)
    }

    async fn article(&self, id: i64) -> Result<Option<Article>, ApiError> {
        let url = self.endpoint(&format!("/news/{}", id))?;
        match self.get_json(url).await {
            Ok(article) => Ok(Some(article)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn health(&self) -> Result<HealthResponse, ApiError> {
        let url = self.endpoint("/health")?;
        self.get_json(url).await
    }
}
