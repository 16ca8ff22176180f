//! Retriever backed by an HTTP similarity-search service.
//!
//! Request: `POST {endpoint}` with `{"query": "...", "top_k": 3}`.
//! Response: `{"nodes": [{"content": "...", "metadata": {...}, "score": 0.8}]}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{RetrievalError, RetrievedNode, Retriever};
use crate::config::RetrievalConfig;
use crate::providers::{ApiCredential, CredentialSource};

/// Environment variable holding the search endpoint.
pub const RETRIEVAL_URL_ENV: &str = "RETRIEVAL_URL";

/// Environment variable holding the search service key.
pub const RETRIEVAL_API_KEY_ENV: &str = "RETRIEVAL_API_KEY";

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    nodes: Vec<RetrievedNode>,
}

/// HTTP search client.
pub struct HttpRetriever {
    client: reqwest::Client,
    endpoint: String,
    credential: Option<ApiCredential>,
    timeout: Duration,
}

impl HttpRetriever {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RetrievalError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            credential: None,
            timeout,
        })
    }

    /// Build from the `retrieval` config section.
    pub fn from_config(config: &RetrievalConfig) -> Result<Self, RetrievalError> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            RetrievalError::NotConfigured(format!(
                "set retrieval.endpoint or {}",
                RETRIEVAL_URL_ENV
            ))
        })?;

        let retriever = Self::new(endpoint, config.timeout)?;
        Ok(match &config.api_key {
            Some(key) => retriever.with_credential(ApiCredential::new(
                key.clone(),
                CredentialSource::Config,
                "retrieval API key",
            )),
            None => retriever,
        })
    }

    /// Send `X-API-KEY` with every search.
    pub fn with_credential(mut self, credential: ApiCredential) -> Self {
        self.credential = Some(credential).filter(|c| !c.is_empty());
        self
    }
}

impl std::fmt::Debug for HttpRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRetriever")
            .field("endpoint", &self.endpoint)
            .field("credential", &self.credential)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedNode>, RetrievalError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&SearchRequest { query, top_k });

        if let Some(credential) = &self.credential {
            request = request.header("X-API-KEY", credential.expose());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RetrievalError::Timeout(self.timeout)
            } else {
                RetrievalError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RetrievalError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::ParseError(e.to_string()))?;

        Ok(body.nodes)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;

    #[tokio::test]
    async fn test_search_request_and_response() {
        let (url, request) = serve_once(
            "200 OK",
            r#"{"nodes":[{"content":"CO2 levels rose.","metadata":{"titulo":"Informe","url":"http://a"},"score":0.91}]}"#,
        )
        .await;

        let retriever = HttpRetriever::new(url, Duration::from_secs(5))
            .unwrap()
            .with_credential(ApiCredential::new(
                "search-key",
                CredentialSource::Programmatic,
                "search key",
            ));
        let nodes = retriever.retrieve("is CO2 rising", 3).await.unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].score, Some(0.91));
        assert_eq!(nodes[0].to_chunk().source_tag(), "[SOURCE: Informe (http://a)]");

        let request = request.await.unwrap();
        assert!(request.to_lowercase().contains("x-api-key: search-key"));
        assert!(request.contains(r#""query":"is CO2 rising""#));
        assert!(request.contains(r#""top_k":3"#));
    }

    #[tokio::test]
    async fn test_error_status() {
        let (url, _request) = serve_once("503 Service Unavailable", "index loading").await;

        let err = HttpRetriever::new(url, Duration::from_secs(5))
            .unwrap()
            .retrieve("q", 3)
            .await
            .unwrap_err();

        assert!(matches!(err, RetrievalError::ApiError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (url, _request) = serve_once("200 OK", r#"{"results": []}"#).await;

        let err = HttpRetriever::new(url, Duration::from_secs(5))
            .unwrap()
            .retrieve("q", 3)
            .await
            .unwrap_err();

        assert!(matches!(err, RetrievalError::ParseError(_)));
    }

    #[test]
    fn test_from_config_requires_endpoint() {
        let err = HttpRetriever::from_config(&RetrievalConfig::default()).unwrap_err();
        assert!(err.to_string().contains("RETRIEVAL_URL"));

        let config = RetrievalConfig {
            endpoint: Some("http://localhost:8000/search".to_string()),
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        let retriever = HttpRetriever::from_config(&config).unwrap();
        assert_eq!(retriever.endpoint, "http://localhost:8000/search");
        assert!(retriever.credential.is_some());
    }

    #[test]
    fn test_empty_credential_not_sent() {
        let retriever = HttpRetriever::new("http://localhost/search", Duration::from_secs(1))
            .unwrap()
            .with_credential(ApiCredential::missing("search key"));
        assert!(retriever.credential.is_none());
    }
}
