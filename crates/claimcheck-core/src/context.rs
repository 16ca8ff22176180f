//! Assembly of retrieved chunks into a prompt context block.
//!
//! Each chunk is rendered as a source tag line followed by its content:
//!
//! ```text
//! [SOURCE: Title (URL)]
//! content on a single line
//! ```
//!
//! Chunks are separated by a blank line. The tag format is what the model
//! is told to copy into its evidence citations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Title used when a chunk has no title metadata.
pub const DEFAULT_TITLE: &str = "Doc";

/// URL used when a chunk has no url metadata.
pub const DEFAULT_URL: &str = "Local";

/// Metadata keys checked for a title, in order.
const TITLE_KEYS: &[&str] = &["titulo", "title"];

/// One retrieved passage with its citation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextChunk {
    pub title: String,
    pub url: String,
    pub content: String,
}

impl ContextChunk {
    /// Create a chunk. Line breaks in `content` are collapsed to spaces.
    pub fn new(title: impl Into<String>, url: impl Into<String>, content: &str) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: collapse_newlines(content),
        }
    }

    /// Create a chunk from a similarity-search hit.
    ///
    /// The title comes from `titulo` or `title`, the URL from `url`. Missing,
    /// empty, or non-string values fall back to [`DEFAULT_TITLE`] and
    /// [`DEFAULT_URL`].
    pub fn from_metadata(metadata: &Map<String, JsonValue>, content: &str) -> Self {
        let title = TITLE_KEYS
            .iter()
            .find_map(|key| non_empty_str(metadata, key))
            .unwrap_or(DEFAULT_TITLE);
        let url = non_empty_str(metadata, "url").unwrap_or(DEFAULT_URL);

        Self::new(title, url, content)
    }

    /// The `[SOURCE: title (url)]` tag line.
    pub fn source_tag(&self) -> String {
        format!("[SOURCE: {} ({})]", self.title, self.url)
    }
}

/// The ordered chunks retrieved for one claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedContext {
    chunks: Vec<ContextChunk>,
}

impl RetrievedContext {
    pub fn new(chunks: Vec<ContextChunk>) -> Self {
        Self { chunks }
    }

    pub fn chunks(&self) -> &[ContextChunk] {
        &self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Render the context block passed to the prompts.
    pub fn render(&self) -> String {
        self.chunks
            .iter()
            .map(|chunk| format!("{}\n{}", chunk.source_tag(), chunk.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl fmt::Display for RetrievedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromIterator<ContextChunk> for RetrievedContext {
    fn from_iter<I: IntoIterator<Item = ContextChunk>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn non_empty_str<'a>(metadata: &'a Map<String, JsonValue>, key: &str) -> Option<&'a str> {
    metadata
        .get(key)
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
}

fn collapse_newlines(content: &str) -> String {
    content.replace("\r\n", " ").replace('\n', " ")
}
