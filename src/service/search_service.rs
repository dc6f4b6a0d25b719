//! Web search tool backed by a SearXNG instance.
//!
//! Stateless proxy: one outbound `GET <SEARXNG_URL>?q=..&format=json`, then
//! the upstream results are trimmed to the fields an agent needs.

use serde::Deserialize;

use crate::api::dto::{SearchHit, SearchResults, WebSearchResponse};
use crate::error::GatewayError;

/// Message returned when the upstream list is empty.
pub const NO_RESULTS_MESSAGE: &str = "No se encontraron resultados relevantes para la búsqueda.";

/// Raw SearXNG JSON response (only the fields we read).
#[derive(Debug, Default, Deserialize)]
pub struct SearxngResponse {
    /// Ranked results.
    #[serde(default)]
    pub results: Vec<SearxngResult>,
    /// Query suggestions.
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// One SearXNG result.
#[derive(Debug, Default, Deserialize)]
pub struct SearxngResult {
    /// Result title.
    #[serde(default)]
    pub title: Option<String>,
    /// Result URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Snippet.
    #[serde(default)]
    pub content: Option<String>,
}

/// Client for the configured SearXNG endpoint.
#[derive(Debug, Clone)]
pub struct SearchService {
    client: reqwest::Client,
    searxng_url: Option<String>,
}

impl SearchService {
    /// Creates a service; `searxng_url` of `None` leaves the tool unconfigured.
    #[must_use]
    pub fn new(client: reqwest::Client, searxng_url: Option<String>) -> Self {
        Self {
            client,
            searxng_url,
        }
    }

    /// Runs a web search and returns at most `count` curated results.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotConfigured`] if no SearXNG URL is set and
    /// [`GatewayError::Upstream`] if the request or its decoding fails.
    pub async fn web_search(
        &self,
        query: &str,
        count: usize,
    ) -> Result<WebSearchResponse, GatewayError> {
        let Some(url) = self.searxng_url.as_deref() else {
            return Err(GatewayError::NotConfigured(
                "El servicio de búsqueda web no está configurado.".to_string(),
            ));
        };

        let upstream = self
            .client
            .get(url)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(upstream_error)?
            .json::<SearxngResponse>()
            .await
            .map_err(upstream_error)?;

        tracing::debug!(
            query,
            results = upstream.results.len(),
            "searxng responded"
        );
        Ok(curate(upstream, count))
    }
}

/// Trims an upstream response into the tool's response envelope.
#[must_use]
pub fn curate(upstream: SearxngResponse, count: usize) -> WebSearchResponse {
    let results = if upstream.results.is_empty() {
        SearchResults::Message(NO_RESULTS_MESSAGE.to_string())
    } else {
        SearchResults::Hits(
            upstream
                .results
                .into_iter()
                .take(count)
                .map(|r| SearchHit {
                    title: r.title,
                    url: r.url,
                    content: r.content,
                })
                .collect(),
        )
    };

    WebSearchResponse {
        status: "success".to_string(),
        results,
        suggestions: (!upstream.suggestions.is_empty()).then_some(upstream.suggestions),
    }
}

fn upstream_error(err: reqwest::Error) -> GatewayError {
    tracing::error!(error = %err, "searxng request failed");
    GatewayError::Upstream(
        "El servicio de búsqueda web no está disponible en este momento.".to_string(),
    )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn result(title: &str) -> SearxngResult {
        SearxngResult {
            title: Some(title.to_string()),
            url: Some(format!("https://example.com/{title}")),
            content: None,
        }
    }

    #[test]
    fn curate_keeps_first_count_results() {
        let upstream = SearxngResponse {
            results: vec![result("a"), result("b"), result("c")],
            suggestions: vec![],
        };
        let response = curate(upstream, 2);
        let SearchResults::Hits(hits) = response.results else {
            panic!("expected hits");
        };
        let titles: Vec<_> = hits.iter().filter_map(|h| h.title.as_deref()).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert!(response.suggestions.is_none());
    }

    #[test]
    fn curate_empty_results_returns_message_and_suggestions() {
        let upstream = SearxngResponse {
            results: vec![],
            suggestions: vec!["rust lang".to_string()],
        };
        let response = curate(upstream, 6);
        let json = serde_json::to_value(&response).unwrap_or_default();
        assert_eq!(json["status"], "success");
        assert_eq!(json["results"], NO_RESULTS_MESSAGE);
        assert_eq!(json["suggestions"][0], "rust lang");
    }

    #[tokio::test]
    async fn unconfigured_service_is_configuration_error() {
        let service = SearchService::new(reqwest::Client::new(), None);
        let result = service.web_search("x", 6).await;
        assert!(matches!(result, Err(GatewayError::NotConfigured(_))));
    }
}
