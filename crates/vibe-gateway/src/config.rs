//! Gateway configuration from the environment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GatewayResult, ModelCallError};
use crate::retry::RetryPolicy;

pub const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Anthropic => "claude-haiku-4-5",
        }
    }

    pub fn default_url(self) -> &'static str {
        match self {
            Provider::OpenAi => OPENAI_URL,
            Provider::Anthropic => ANTHROPIC_URL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ModelCallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(ModelCallError::Misconfigured(format!(
                "unknown LLM_PROVIDER '{other}' (expected openai or anthropic)"
            ))),
        }
    }
}

/// Everything the HTTP gateway needs for one provider.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub api_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub retry: RetryPolicy,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("retry", &self.retry)
            .finish()
    }
}

impl GatewayConfig {
    /// Provider defaults with the given key.
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: provider.default_model().to_string(),
            api_url: provider.default_url().to_string(),
            temperature: 0.3,
            max_tokens: 4096,
            retry: RetryPolicy::default(),
        }
    }

    /// Reads `LLM_PROVIDER`, `LLM_API_KEY` (or `ANTHROPIC_API_KEY`),
    /// `LLM_MODEL`, `LLM_API_URL` and `LLM_TIMEOUT_MS`.
    ///
    /// Fails fast when no API key is configured.
    pub fn from_env() -> GatewayResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GatewayConfig::from_env`] over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> GatewayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider: Provider = match non_empty("LLM_PROVIDER") {
            Some(raw) => raw.parse()?,
            None => Provider::default(),
        };

        let api_key = non_empty("LLM_API_KEY")
            .or_else(|| non_empty("ANTHROPIC_API_KEY"))
            .ok_or_else(|| {
                ModelCallError::Misconfigured(
                    "LLM_API_KEY is not set (ANTHROPIC_API_KEY is also accepted)".to_string(),
                )
            })?;

        let mut config = Self::new(provider, api_key);
        if let Some(model) = non_empty("LLM_MODEL") {
            config.model = model;
        }
        if let Some(url) = non_empty("LLM_API_URL") {
            config.api_url = url;
        }
        if let Some(raw) = non_empty("LLM_TIMEOUT_MS") {
            config.retry.timeout_ms = raw.trim().parse().map_err(|_| {
                ModelCallError::Misconfigured(format!("LLM_TIMEOUT_MS is not a number: {raw}"))
            })?;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn validate(&self) -> GatewayResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(ModelCallError::Misconfigured("API key is empty".to_string()));
        }
        if self.api_url.trim().is_empty() {
            return Err(ModelCallError::Misconfigured("API URL is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_openai() {
        let config = GatewayConfig::from_lookup(lookup(&[("LLM_API_KEY", "sk-1")])).unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_url, OPENAI_URL);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_anthropic_key_fallback_and_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("LLM_PROVIDER", "anthropic"),
            ("ANTHROPIC_API_KEY", "ak-1"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "ak-1");
        assert_eq!(config.model, "claude-haiku-4-5");
        assert_eq!(config.api_url, ANTHROPIC_URL);
    }

    #[test]
    fn test_missing_key_fails_fast() {
        let err = GatewayConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ModelCallError::Misconfigured(_)));
    }

    #[test]
    fn test_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("LLM_API_KEY", "k"),
            ("LLM_MODEL", "gpt-4.1"),
            ("LLM_API_URL", "http://localhost:9999/v1/chat"),
            ("LLM_TIMEOUT_MS", "1500"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.api_url, "http://localhost:9999/v1/chat");
        assert_eq!(config.retry.timeout_ms, 1500);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = GatewayConfig::from_lookup(lookup(&[
            ("LLM_API_KEY", "k"),
            ("LLM_PROVIDER", "mystery"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GatewayConfig::new(Provider::OpenAi, "secret-key");
        assert!(!format!("{config:?}").contains("secret-key"));
    }
}
