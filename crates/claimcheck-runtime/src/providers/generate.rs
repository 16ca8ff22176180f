//! Provider for `/api/generate`-style completion endpoints.
//!
//! One POST per prompt, non-streaming:
//!
//! ```json
//! {"model": "qwen3:8b", "prompt": "...", "stream": false,
//!  "options": {"temperature": 0.0, "num_ctx": 8192}}
//! ```
//!
//! The generated text is read from the `response` field of the reply; a
//! reply without it counts as an empty answer. The API key travels in the `X-API-KEY` header.

use super::{
    factory::ProviderFactory, secrets::ApiCredential, Generation, GenerationOptions, LlmProvider,
    ProviderError, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Environment variable holding the endpoint URL.
pub const LLM_API_URL_ENV: &str = "LLM_API_URL";

/// Environment variable holding the API key.
pub const LLM_API_KEY_ENV: &str = "LLM_API_KEY";

/// Endpoint used when neither config nor environment name one.
pub const DEFAULT_API_URL: &str = "http://localhost:11434/api/generate";

const CREDENTIAL_NAME: &str = "LLM API key";

/// Longest error body kept in an [`ProviderError::ApiError`] message.
const MAX_ERROR_BODY: usize = 300;

/// Generate-API provider.
///
/// The key is held as an [`ApiCredential`] and only exposed when the
/// request header is set.
pub struct GenerateApiProvider {
    credential: ApiCredential,
    api_url: String,
    accept_invalid_certs: bool,
    client: reqwest::Client,
}

impl std::fmt::Debug for GenerateApiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateApiProvider")
            .field("credential", &self.credential)
            .field("api_url", &self.api_url)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl GenerateApiProvider {
    /// Create a provider for `api_url` with certificate verification on.
    pub fn new(api_url: impl Into<String>, credential: ApiCredential) -> Result<Self, ProviderError> {
        Self::build(api_url.into(), credential, false)
    }

    /// Create from JSON configuration with environment fallback.
    ///
    /// - `api_url`: config, then `LLM_API_URL`, then [`DEFAULT_API_URL`]
    /// - `api_key`: config, then `LLM_API_KEY`, then empty with a warning
    /// - `accept_invalid_certs`: defaults to `false`
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_config_env_or_empty(
            config,
            "api_key",
            LLM_API_KEY_ENV,
            CREDENTIAL_NAME,
        );

        let api_url = config["api_url"]
            .as_str()
            .map(str::to_string)
            .or_else(|| std::env::var(LLM_API_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let accept_invalid_certs = config["accept_invalid_certs"].as_bool().unwrap_or(false);
        tracing::debug!(
            api_url = %api_url,
            credential = %credential.source(),
            "Configuring generate provider"
        );

        Self::build(api_url, credential, accept_invalid_certs)
    }

    fn build(
        api_url: String,
        credential: ApiCredential,
        accept_invalid_certs: bool,
    ) -> Result<Self, ProviderError> {
        if accept_invalid_certs {
            tracing::warn!(api_url = %api_url, "TLS certificate verification disabled");
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            credential,
            api_url,
            accept_invalid_certs,
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    temperature: f32,
    num_ctx: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[async_trait]
impl LlmProvider for GenerateApiProvider {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Generation, ProviderError> {
        let request = GenerateRequest {
            model: &options.model,
            prompt,
            stream: false,
            options: RequestOptions {
                temperature: options.temperature,
                num_ctx: options.num_ctx,
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("X-API-KEY", self.credential.expose())
            .timeout(options.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(options.timeout)
                } else {
                    ProviderError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthError(status.as_u16()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(Generation {
            text: body.response,
            model: body.model,
            usage: TokenUsage {
                prompt_tokens: body.prompt_eval_count.unwrap_or(0),
                completion_tokens: body.eval_count.unwrap_or(0),
            },
        })
    }

    fn name(&self) -> &str {
        "generate"
    }
}

/// Factory for [`GenerateApiProvider`].
///
/// ## Configuration Format
/// ```json
/// {
///   "api_url": "https://host/api/generate",   // Optional, LLM_API_URL env, then localhost
///   "api_key": "...",                          // Optional, LLM_API_KEY env, then empty
///   "accept_invalid_certs": false              // Optional
/// }
/// ```
pub struct GenerateApiProviderFactory;

impl ProviderFactory for GenerateApiProviderFactory {
    fn provider_type(&self) -> &'static str {
        "generate"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(GenerateApiProvider::from_config(config)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if let Some(url) = config["api_url"].as_str() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ProviderError::NotConfigured(
                    "api_url must start with http:// or https://".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Non-streaming /api/generate completion endpoint"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::CredentialSource;
    use crate::test_support::{serve_once, serve_silently};
    use std::time::Duration;

    fn provider(url: &str, key: &str) -> GenerateApiProvider {
        GenerateApiProvider::new(
            url,
            ApiCredential::new(key, CredentialSource::Programmatic, "test key"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_sends_contract_and_reads_response() {
        let (url, request) = serve_once(
            "200 OK",
            r#"{"model":"qwen3:8b","response":"VERDICT: TRUE","done":true,"prompt_eval_count":12,"eval_count":3}"#,
        )
        .await;

        let generation = provider(&url, "test-key-123")
            .generate("Is the sky blue?", &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(generation.text, "VERDICT: TRUE");
        assert_eq!(generation.model.as_deref(), Some("qwen3:8b"));
        assert_eq!(generation.usage.total(), 15);

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /api/generate"));
        assert!(request.to_lowercase().contains("x-api-key: test-key-123"));

        let body: JsonValue = serde_json::from_str(request.split("\r\n\r\n").nth(1).unwrap()).unwrap();
        assert_eq!(body["model"], "qwen3:8b");
        assert_eq!(body["prompt"], "Is the sky blue?");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["temperature"], 0.0);
        assert_eq!(body["options"]["num_ctx"], 8192);
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let (url, _request) = serve_once("500 Internal Server Error", "model not loaded").await;

        let err = provider(&url, "k")
            .generate("p", &GenerationOptions::default())
            .await
            .unwrap_err();

        match err {
            ProviderError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "model not loaded");
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_is_auth_error() {
        let (url, _request) = serve_once("401 Unauthorized", "{}").await;

        let err = provider(&url, "wrong")
            .generate("p", &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::AuthError(401)));
    }

    #[tokio::test]
    async fn test_missing_response_field_is_empty_answer() {
        let (url, _request) = serve_once("200 OK", r#"{"done":true}"#).await;

        let generation = provider(&url, "k")
            .generate("p", &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(generation.text, "");
    }

    #[tokio::test]
    async fn test_non_json_body_is_parse_error() {
        let (url, _request) = serve_once("200 OK", "<html>gateway</html>").await;

        let err = provider(&url, "k")
            .generate("p", &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let url = serve_silently().await;
        let options = GenerationOptions {
            timeout: Duration::from_millis(200),
            ..Default::default()
        };

        let err = provider(&url, "k").generate("p", &options).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let err = provider("http://127.0.0.1:9/api/generate", "k")
            .generate("p", &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::HttpError(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = provider(DEFAULT_API_URL, "sk-very-secret");
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_from_config_reads_fields() {
        let config = serde_json::json!({
            "api_url": "https://llm.internal/api/generate",
            "api_key": "cfg-key",
            "accept_invalid_certs": true
        });
        let provider = GenerateApiProvider::from_config(&config).unwrap();

        assert_eq!(provider.api_url, "https://llm.internal/api/generate");
        assert_eq!(provider.credential.expose(), "cfg-key");
        assert_eq!(provider.credential.source(), CredentialSource::Config);
        assert!(provider.accept_invalid_certs);
    }

    #[test]
    fn test_factory_rejects_bad_url() {
        let factory = GenerateApiProviderFactory;
        assert!(factory
            .validate_config(&serde_json::json!({"api_url": "ftp://nope"}))
            .is_err());
        assert!(factory
            .validate_config(&serde_json::json!({"api_url": "http://ok"}))
            .is_ok());
    }
}
