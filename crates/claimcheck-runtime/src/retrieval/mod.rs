//! Similarity search over the document index.
//!
//! A [`Retriever`] returns the `top_k` passages closest to a query, each
//! with its metadata. [`retrieve_context`] turns them into the
//! [`RetrievedContext`] the prompts are built from.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use claimcheck_core::{ContextChunk, RetrievedContext};

#[cfg(feature = "http-retriever")]
mod http;

#[cfg(feature = "http-retriever")]
pub use http::{HttpRetriever, RETRIEVAL_API_KEY_ENV, RETRIEVAL_URL_ENV};

/// Errors from the retrieval backend.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Search service error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Malformed search response: {0}")]
    ParseError(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Cannot read passages from {path}: {message}")]
    Source { path: String, message: String },

    #[error("Retriever not configured: {0}")]
    NotConfigured(String),
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedNode {
    /// Passage text
    pub content: String,

    /// Free-form metadata; `titulo`/`title` and `url` are read for citations
    #[serde(default)]
    pub metadata: Map<String, JsonValue>,

    /// Similarity score, when the backend reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl RetrievedNode {
    pub fn new(content: impl Into<String>, metadata: Map<String, JsonValue>) -> Self {
        Self {
            content: content.into(),
            metadata,
            score: None,
        }
    }

    /// The passage as a citable context chunk.
    pub fn to_chunk(&self) -> ContextChunk {
        ContextChunk::from_metadata(&self.metadata, &self.content)
    }
}

/// Similarity-search backend.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Up to `top_k` passages for `query`, most similar first.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedNode>, RetrievalError>;

    /// Retriever name for logs.
    fn name(&self) -> &str;
}

/// Retrieve passages for a claim and assemble them into a context.
///
/// Extra nodes beyond `top_k` are dropped in case the backend ignores the
/// limit.
pub async fn retrieve_context(
    retriever: &dyn Retriever,
    claim: &str,
    top_k: usize,
) -> Result<RetrievedContext, RetrievalError> {
    let nodes = retriever.retrieve(claim, top_k).await?;
    tracing::debug!(
        retriever = retriever.name(),
        hits = nodes.len(),
        top_k,
        "Passages retrieved"
    );

    Ok(nodes.iter().take(top_k).map(RetrievedNode::to_chunk).collect())
}

/// Passages loaded up front, returned in file order regardless of query.
///
/// Stands in for a search service: a JSON file holding either a list of
/// nodes or `{"nodes": [...]}`.
#[derive(Debug, Clone, Default)]
pub struct StaticRetriever {
    nodes: Vec<RetrievedNode>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NodeFile {
    List(Vec<RetrievedNode>),
    Wrapped { nodes: Vec<RetrievedNode> },
}

impl StaticRetriever {
    pub fn new(nodes: Vec<RetrievedNode>) -> Self {
        Self { nodes }
    }

    /// Parse nodes from JSON text.
    pub fn from_json(json: &str) -> Result<Self, RetrievalError> {
        let file: NodeFile =
            serde_json::from_str(json).map_err(|e| RetrievalError::ParseError(e.to_string()))?;
        let nodes = match file {
            NodeFile::List(nodes) | NodeFile::Wrapped { nodes } => nodes,
        };
        Ok(Self::new(nodes))
    }

    /// Load nodes from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RetrievalError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| RetrievalError::Source {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&text).map_err(|e| RetrievalError::Source {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn retrieve(&self, _query: &str, top_k: usize) -> Result<Vec<RetrievedNode>, RetrievalError> {
        Ok(self.nodes.iter().take(top_k).cloned().collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{node, FixedRetriever};

    #[tokio::test]
    async fn test_retrieve_context_renders_tags() {
        let retriever = FixedRetriever::new(vec![
            node("Report", "url1", "CO2 levels\nrose."),
            node("Study", "url2", "Temperatures climbed."),
        ]);

        let context = retrieve_context(&retriever, "CO2", 3).await.unwrap();
        assert_eq!(
            context.render(),
            "[SOURCE: Report (url1)]\nCO2 levels rose.\n\n[SOURCE: Study (url2)]\nTemperatures climbed."
        );
        assert_eq!(retriever.queries(), vec![("CO2".to_string(), 3)]);
    }

    #[tokio::test]
    async fn test_retrieve_context_caps_at_top_k() {
        struct Greedy;

        #[async_trait]
        impl Retriever for Greedy {
            async fn retrieve(&self, _q: &str, _k: usize) -> Result<Vec<RetrievedNode>, RetrievalError> {
                Ok((0..10).map(|i| node("T", "U", &format!("p{i}"))).collect())
            }

            fn name(&self) -> &str {
                "greedy"
            }
        }

        let context = retrieve_context(&Greedy, "q", 3).await.unwrap();
        assert_eq!(context.len(), 3);
    }

    #[tokio::test]
    async fn test_metadata_defaults() {
        let retriever = FixedRetriever::new(vec![RetrievedNode::new("text", Map::new())]);
        let context = retrieve_context(&retriever, "q", 3).await.unwrap();

        assert_eq!(context.render(), "[SOURCE: Doc (Local)]\ntext");
    }

    #[test]
    fn test_static_retriever_accepts_both_layouts() {
        let list = StaticRetriever::from_json(
            r#"[{"content": "a", "metadata": {"title": "A"}}, {"content": "b"}]"#,
        )
        .unwrap();
        assert_eq!(list.len(), 2);

        let wrapped = StaticRetriever::from_json(r#"{"nodes": [{"content": "a"}]}"#).unwrap();
        assert_eq!(wrapped.len(), 1);
    }

    #[tokio::test]
    async fn test_sample_passages_load() {
        let retriever =
            StaticRetriever::from_json(include_str!("../../../../demos/passages.json")).unwrap();
        let context = retrieve_context(&retriever, "CO2", 3).await.unwrap();

        assert_eq!(context.len(), 3);
        assert_eq!(context.chunks()[1].title, "Informe climático OMM");
        assert_eq!(context.chunks()[2].url, "Local");
    }

    #[test]
    fn test_static_retriever_rejects_garbage() {
        assert!(matches!(
            StaticRetriever::from_json("{\"not\": \"nodes\"}"),
            Err(RetrievalError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let err = StaticRetriever::from_json_file("/nonexistent/passages.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/passages.json"));
    }

    #[tokio::test]
    async fn test_static_retriever_respects_top_k() {
        let retriever = StaticRetriever::new(vec![
            node("A", "a", "1"),
            node("B", "b", "2"),
            node("C", "c", "3"),
            node("D", "d", "4"),
        ]);

        let nodes = retriever.retrieve("anything", 3).await.unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].content, "1");
    }
}
