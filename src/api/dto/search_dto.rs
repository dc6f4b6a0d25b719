//! Web search tool DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn default_count() -> usize {
    6
}

/// Request body for `POST /api/search/web-search`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct WebSearchRequest {
    /// Terms to search for.
    #[serde(default)]
    pub query: Option<String>,
    /// Number of results to return. Defaults to 6.
    #[serde(default = "default_count")]
    pub count: usize,
}

impl Default for WebSearchRequest {
    fn default() -> Self {
        Self {
            query: None,
            count: default_count(),
        }
    }
}

/// One curated search result.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchHit {
    /// Result title.
    pub title: Option<String>,
    /// Result URL.
    pub url: Option<String>,
    /// Snippet.
    pub content: Option<String>,
}

/// Either the curated hits or a human-readable "no results" message.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SearchResults {
    /// Curated hits.
    Hits(Vec<SearchHit>),
    /// Explanation shown when nothing matched.
    Message(String),
}

/// Response body for `POST /api/search/web-search`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WebSearchResponse {
    /// Always `"success"`.
    pub status: String,
    /// Results or a "no results" message.
    pub results: SearchResults,
    /// Query suggestions from the search engine, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}
