//! Secure credential handling for providers.
//!
//! Credentials are wrapped as soon as they are read so they cannot appear in
//! `Debug`/`Display` output or logs, and are zeroed on drop.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::providers::secrets::ApiCredential;
//!
//! // Load from config with env fallback, empty (with a warning) if neither is set
//! let cred = ApiCredential::from_config_env_or_empty(&config, "api_key", "LLM_API_KEY", "LLM API key");
//!
//! // Use in HTTP header (explicit exposure)
//! request.header("X-API-KEY", cred.expose());
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from.
///
/// Useful for debugging configuration issues without exposing the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from configuration file/JSON
    Config,
    /// Loaded from environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
    /// Not configured anywhere; the credential is empty
    Missing,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
            CredentialSource::Missing => write!(f, "missing"),
        }
    }
}

/// A securely-stored API credential.
///
/// - `Debug` and `Display` show `[REDACTED]`
/// - memory is zeroed on drop via `secrecy`
/// - the value is only reachable through [`expose`](Self::expose)
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Create a new credential from a string value.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// An empty credential for an endpoint that was not configured.
    pub fn missing(name: &'static str) -> Self {
        Self::new(String::new(), CredentialSource::Missing, name)
    }

    /// Load credential from JSON config, falling back to environment variable.
    ///
    /// 1. Check if `config_key` exists in the JSON config
    /// 2. If not, fall back to `env_var`
    /// 3. Return error if neither is set
    pub fn from_config_or_env(
        config: &JsonValue,
        config_key: &str,
        env_var: &str,
        name: &'static str,
    ) -> Result<Self, ProviderError> {
        if let Some(value) = config[config_key].as_str() {
            return Ok(Self::new(value, CredentialSource::Config, name));
        }

        if let Ok(value) = std::env::var(env_var) {
            return Ok(Self::new(value, CredentialSource::Environment, name));
        }

        Err(ProviderError::NotConfigured(format!(
            "{} required: set '{}' in config or {} environment variable",
            name, config_key, env_var
        )))
    }

    /// Like [`from_config_or_env`](Self::from_config_or_env), but a missing
    /// credential is not an error.
    ///
    /// The endpoint may not need a key. If it does, requests fail with an
    /// authentication error at call time. A warning is logged either way.
    pub fn from_config_env_or_empty(
        config: &JsonValue,
        config_key: &str,
        env_var: &str,
        name: &'static str,
    ) -> Self {
        Self::from_config_or_env(config, config_key, env_var, name).unwrap_or_else(|_| {
            tracing::warn!(
                credential = name,
                env_var,
                "Credential not found, requests will be sent without it"
            );
            Self::missing(name)
        })
    }

    /// Expose the credential value for use in API calls.
    ///
    /// Only call this where the credential is actually needed (e.g. setting
    /// an HTTP header). Never store the exposed value.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Check if the credential is empty.
    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    /// Get the source of this credential.
    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}
