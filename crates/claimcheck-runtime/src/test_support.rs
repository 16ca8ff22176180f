//! Fakes shared by the unit tests of this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::detect::{DetectionError, LanguageDetector};
use crate::providers::{Generation, GenerationOptions, LlmProvider, ProviderError};
use crate::retrieval::{RetrievalError, RetrievedNode, Retriever};

/// Provider that replays canned replies and records the prompts it saw.
pub struct ScriptedProvider {
    replies: Mutex<Vec<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    /// Always answers with `reply`.
    pub fn replying(reply: &str) -> Self {
        Self::sequence(vec![Ok(reply.to_string())])
    }

    /// Always fails with a connection error.
    pub fn failing(message: &str) -> Self {
        Self::sequence(vec![Err(ProviderError::HttpError(message.to_string()))])
    }

    /// Replies in order; the last entry repeats once the list runs out.
    pub fn sequence(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Result<String, ProviderError> {
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            return replies.remove(0);
        }
        match replies.first() {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(e)) => Err(ProviderError::HttpError(e.to_string())),
            None => Ok(String::new()),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<Generation, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_reply().map(Generation::text)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Retriever returning a fixed node list, truncated to `top_k`.
pub struct FixedRetriever {
    nodes: Vec<RetrievedNode>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl FixedRetriever {
    pub fn new(nodes: Vec<RetrievedNode>) -> Self {
        Self {
            nodes,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedNode>, RetrievalError> {
        self.queries.lock().unwrap().push((query.to_string(), top_k));
        Ok(self.nodes.iter().take(top_k).cloned().collect())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Detector returning a fixed answer.
pub struct FixedDetector(pub Option<&'static str>);

impl LanguageDetector for FixedDetector {
    fn detect(&self, _text: &str) -> Result<String, DetectionError> {
        self.0
            .map(str::to_string)
            .ok_or(DetectionError::Undetectable)
    }
}

pub fn node(title: &str, url: &str, content: &str) -> RetrievedNode {
    RetrievedNode::new(
        content,
        serde_json::json!({"title": title, "url": url})
            .as_object()
            .cloned()
            .unwrap_or_default(),
    )
}

/// Serve one HTTP response on a local port.
///
/// Returns the URL to call and a handle yielding the raw request text.
pub async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{addr}/api/generate"), handle)
}

/// Accept connections and never answer.
pub async fn serve_silently() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{addr}/api/generate")
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}
