use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Article
// ============================================================================

/// A news item as served by the backend. Read-only once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub url: String,
    pub source: String,
    pub summary: Option<String>,
    /// Comma-separated keyword list.
    pub keywords: Option<String>,
    pub category: Option<String>,
    pub published_at: Option<String>,
    pub created_at: String,
}

/// Category shown for articles the backend left uncategorized.
pub const DEFAULT_CATEGORY: &str = "AI";

impl Article {
    /// Keywords split on commas, trimmed, empties dropped.
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .as_deref()
            .map(|k| {
                k.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn display_category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    /// Publication time, if the backend sent a parseable one.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published_at.as_deref().and_then(parse_timestamp)
    }
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 and the naive ISO-8601 form the backend emits for
/// timezone-less columns (treated as UTC), with or without fractional seconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// ============================================================================
// Query
// ============================================================================

/// Parameters for `GET /news/latest`.
///
/// Empty strings are normalized to `None` so that "no filter" has a single
/// representation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: u32,
}

impl ArticleQuery {
    pub fn new(category: Option<String>, search: Option<String>, limit: u32) -> Self {
        Self {
            category: normalize(category),
            search: normalize(search),
            limit,
        }
    }

    /// Query-string pairs in the order the backend documents them.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.to_string())];
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Reply to `POST /news/fetch`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TriggerResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
pub(crate) fn sample_article(id: i64) -> Article {
    Article {
        id,
        title: format!("Article {}", id),
        content: None,
        url: format!("https://news.example.com/{}", id),
        source: "Example Wire".to_string(),
        summary: Some(format!("Summary of article {}", id)),
        keywords: Some("ai, llm".to_string()),
        category: Some("AI".to_string()),
        published_at: Some("2024-05-01T12:00:00".to_string()),
        created_at: "2024-05-01T12:05:00".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use proptest::prelude::*;

    #[test]
    fn test_article_deserializes_with_nulls() {
        let json = r#"{
            "id": 7,
            "title": "GPT news",
            "content": null,
            "url": "https://example.com/a",
            "source": "TechCrunch",
            "summary": null,
            "keywords": null,
            "category": null,
            "published_at": null,
            "created_at": "2024-01-02T03:04:05"
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.id, 7);
        assert!(article.summary.is_none());
        assert_eq!(article.display_category(), "AI");
        assert!(article.keyword_list().is_empty());
        assert!(article.published().is_none());
    }

    #[test]
    fn test_keyword_list_trims_and_drops_empty() {
        let mut article = sample_article(1);
        article.keywords = Some(" robotics ,  , vision,".to_string());
        assert_eq!(article.keyword_list(), vec!["robotics", "vision"]);
    }

    #[test]
    fn test_parse_naive_timestamp_as_utc() {
        let dt = parse_timestamp("2024-03-15T08:30:00").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 15));
        assert_eq!((dt.hour(), dt.minute()), (8, 30));
    }

    #[test]
    fn test_parse_fractional_and_rfc3339() {
        assert!(parse_timestamp("2024-03-15T08:30:00.123456").is_some());
        let dt = parse_timestamp("2024-03-15T08:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 6);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_query_pairs_omit_absent_filters() {
        let q = ArticleQuery::new(None, Some("".to_string()), 50);
        assert_eq!(q.to_pairs(), vec![("limit", "50".to_string())]);

        let q = ArticleQuery::new(Some("LLMs".into()), Some("gpt".into()), 10);
        assert_eq!(
            q.to_pairs(),
            vec![
                ("limit", "10".to_string()),
                ("category", "LLMs".to_string()),
                ("search", "gpt".to_string()),
            ]
        );
    }

    #[test]
    fn test_trigger_response_without_message() {
        let r: TriggerResponse = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert_eq!(r.status, "success");
        assert!(r.message.is_empty());
    }

    proptest! {
        #[test]
        fn prop_blank_filters_normalize_to_none(spaces in "[ \t]{0,8}") {
            let q = ArticleQuery::new(Some(spaces.clone()), Some(spaces), 1);
            prop_assert!(q.category.is_none());
            prop_assert!(q.search.is_none());
        }

        #[test]
        fn prop_non_blank_filters_are_kept(word in "[a-zA-Z]{1,12}") {
            let q = ArticleQuery::new(Some(word.clone()), None, 1);
            prop_assert_eq!(q.category.as_deref(), Some(word.as_str()));
        }
    }
}
