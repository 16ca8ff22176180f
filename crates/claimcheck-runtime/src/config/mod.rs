//! Runtime configuration.
//!
//! Loaded from YAML, validated against an embedded JSON Schema, then
//! completed from the environment. Every key is optional:
//!
//! ```yaml
//! model:
//!   provider: generate
//!   api_url: https://llm.internal/api/generate   # else LLM_API_URL, else localhost
//!   api_key: "..."                               # else LLM_API_KEY, else empty
//!   name: qwen3:8b                               # else LLM_MODEL
//!   temperature: 0.0
//!   num_ctx: 8192
//!   timeout: 2m
//!   accept_invalid_certs: false
//! retrieval:
//!   endpoint: http://localhost:8000/search       # else RETRIEVAL_URL
//!   top_k: 3
//!   timeout: 30s
//! cache:
//!   enabled: false
//!   max_entries: 1000
//!   ttl: 1h
//! ```

mod schema;

pub use schema::validate_config_schema;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::cache::GenerationCache;
use crate::providers::GenerationOptions;

/// Environment variable naming the model.
pub const LLM_MODEL_ENV: &str = "LLM_MODEL";

/// Model used when neither config nor environment name one.
pub const DEFAULT_MODEL: &str = "qwen3:8b";

/// Errors while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config does not match schema: {}", .0.join("; "))]
    Schema(Vec<String>),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub model: ModelConfig,
    pub retrieval: RetrievalConfig,
    pub cache: CacheConfig,
}

/// Text-generation endpoint settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Registered provider type
    pub provider: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub temperature: f32,

    pub num_ctx: u32,

    #[serde(with = "duration_str")]
    pub timeout: Duration,

    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "generate".to_string(),
            api_url: None,
            api_key: None,
            name: None,
            temperature: 0.0,
            num_ctx: 8192,
            timeout: Duration::from_secs(120),
            accept_invalid_certs: false,
        }
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("name", &self.name)
            .field("temperature", &self.temperature)
            .field("num_ctx", &self.num_ctx)
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl ModelConfig {
    /// Configured model, or [`DEFAULT_MODEL`].
    pub fn model_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Similarity-search settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Passages per claim
    pub top_k: usize,

    #[serde(with = "duration_str")]
    pub timeout: Duration,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            top_k: 3,
            timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for RetrievalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievalConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("top_k", &self.top_k)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Reply cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: u64,
    #[serde(with = "duration_str")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries: 1_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate a YAML document. The environment is not read.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let mut document: JsonValue = serde_yaml::from_str(yaml)?;
        if document.is_null() {
            document = JsonValue::Object(Default::default());
        }

        validate_config_schema(&document).map_err(ConfigError::Schema)?;

        let config: Self =
            serde_json::from_value(document).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML file. The environment is not read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Load from `path` (or defaults) and fill unset keys from the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env(|key| std::env::var(key).ok());

        tracing::debug!(
            model = config.model.model_name(),
            provider = %config.model.provider,
            retrieval = ?config.retrieval.endpoint,
            cache = config.cache.enabled,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Fill keys the file left unset from `lookup`.
    ///
    /// Endpoint URL and key of the model are resolved by the provider
    /// itself, so only the model name and retrieval settings are read here.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.model.name.is_none() {
            self.model.name = lookup(LLM_MODEL_ENV).filter(|v| !v.is_empty());
        }
        #[cfg(feature = "http-retriever")]
        {
            use crate::retrieval::{RETRIEVAL_API_KEY_ENV, RETRIEVAL_URL_ENV};
            if self.retrieval.endpoint.is_none() {
                self.retrieval.endpoint = lookup(RETRIEVAL_URL_ENV).filter(|v| !v.is_empty());
            }
            if self.retrieval.api_key.is_none() {
                self.retrieval.api_key = lookup(RETRIEVAL_API_KEY_ENV).filter(|v| !v.is_empty());
            }
        }
        self
    }

    /// Check invariants the schema cannot express, or that programmatic
    /// edits may have broken.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::Invalid("retrieval.top_k must be at least 1".to_string()));
        }
        if self.model.num_ctx == 0 {
            return Err(ConfigError::Invalid("model.num_ctx must be at least 1".to_string()));
        }
        if self.model.timeout.is_zero() {
            return Err(ConfigError::Invalid("model.timeout must be positive".to_string()));
        }
        for (key, url) in [
            ("model.api_url", &self.model.api_url),
            ("retrieval.endpoint", &self.retrieval.endpoint),
        ] {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ConfigError::Invalid(format!(
                        "{} must start with http:// or https://",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    /// Options sent with every prompt.
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            model: self.model.model_name().to_string(),
            temperature: self.model.temperature,
            num_ctx: self.model.num_ctx,
            timeout: self.model.timeout,
        }
    }

    /// The `model` section as the JSON the provider factory expects.
    pub fn provider_config(&self) -> JsonValue {
        serde_json::to_value(&self.model).unwrap_or_else(|_| JsonValue::Object(Default::default()))
    }

    /// The reply cache, if enabled.
    pub fn generation_cache(&self) -> Option<GenerationCache> {
        self.cache
            .enabled
            .then(|| GenerationCache::new(self.cache.max_entries, self.cache.ttl))
    }
}

/// `humantime` strings such as `30s` or `1h 30m`.
mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();

        assert_eq!(config.model.provider, "generate");
        assert_eq!(config.model.model_name(), "qwen3:8b");
        assert_eq!(config.retrieval.top_k, 3);
        assert!(!config.cache.enabled);
        assert!(config.generation_cache().is_none());

        let options = config.generation_options();
        assert_eq!(options.temperature, 0.0);
        assert_eq!(options.num_ctx, 8192);
        assert_eq!(options.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = RuntimeConfig::from_yaml("").unwrap();
        assert_eq!(config.retrieval.top_k, 3);
    }

    #[test]
    fn test_yaml_with_durations() {
        let yaml = r#"
model:
  name: llama3.1:8b
  api_url: https://llm.internal/api/generate
  timeout: 2m
  accept_invalid_certs: true
retrieval:
  top_k: 5
  timeout: 10s
cache:
  enabled: true
  ttl: 1h 30m
"#;
        let config = RuntimeConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.model.model_name(), "llama3.1:8b");
        assert_eq!(config.model.timeout, Duration::from_secs(120));
        assert!(config.model.accept_invalid_certs);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.timeout, Duration::from_secs(10));
        assert_eq!(config.cache.ttl, Duration::from_secs(5400));
        assert!(config.generation_cache().is_some());
    }

    #[test]
    fn test_schema_errors_reported() {
        let err = RuntimeConfig::from_yaml("model:\n  temprature: 0.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Schema(_)));
        assert!(err.to_string().contains("/model"));
    }

    #[test]
    fn test_bad_duration_reported() {
        let err = RuntimeConfig::from_yaml("model:\n  timeout: 5 parsecs\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_env_fills_unset_keys_only() {
        let env: HashMap<&str, &str> = [("LLM_MODEL", "mistral:7b")].into_iter().collect();
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let from_env = RuntimeConfig::default().with_env(lookup);
        assert_eq!(from_env.model.model_name(), "mistral:7b");

        let from_file = RuntimeConfig::from_yaml("model:\n  name: qwen3:8b\n")
            .unwrap()
            .with_env(lookup);
        assert_eq!(from_file.model.model_name(), "qwen3:8b");
    }

    #[cfg(feature = "http-retriever")]
    #[test]
    fn test_env_sets_retrieval_endpoint() {
        let config = RuntimeConfig::default().with_env(|key| {
            (key == "RETRIEVAL_URL").then(|| "http://localhost:8000/search".to_string())
        });
        assert_eq!(
            config.retrieval.endpoint.as_deref(),
            Some("http://localhost:8000/search")
        );
    }

    #[test]
    fn test_validate_catches_programmatic_edits() {
        let mut config = RuntimeConfig::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());

        let mut config = RuntimeConfig::default();
        config.model.api_url = Some("localhost:11434".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_config_and_redaction() {
        let mut config = RuntimeConfig::default();
        config.model.api_key = Some("secret-key".to_string());
        config.model.api_url = Some("http://localhost:11434/api/generate".to_string());

        let json = config.provider_config();
        assert_eq!(json["api_key"], "secret-key");
        assert_eq!(json["api_url"], "http://localhost:11434/api/generate");
        assert_eq!(json["timeout"], "2m");

        assert!(!format!("{:?}", config).contains("secret-key"));
    }

    #[test]
    fn test_sample_config_loads() {
        let config = RuntimeConfig::from_yaml(include_str!("../../../../demos/claimcheck.yaml")).unwrap();

        assert_eq!(config.model.model_name(), "qwen3:8b");
        assert_eq!(config.cache.ttl, Duration::from_secs(1800));
        assert!(!config.cache.enabled);
        assert!(config.generation_cache().is_none());
    }

    #[test]
    fn test_missing_file() {
        let err = RuntimeConfig::from_file("/nonexistent/claimcheck.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
