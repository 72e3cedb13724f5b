//! reqwest-backed gateway for OpenAI- and Anthropic-style endpoints.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, error};

use crate::config::{GatewayConfig, Provider};
use crate::error::{truncate_chars, GatewayResult, ModelCallError};
use crate::gateway::ModelGateway;
use crate::retry::call_with_retry;
use crate::wire::{self, AnthropicRequest, AnthropicResponse, OpenAiRequest, OpenAiResponse};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ERROR_BODY_LIMIT: usize = 200;

pub struct HttpModelGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpModelGateway {
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ModelCallError::Misconfigured(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> GatewayResult<Self> {
        Self::new(GatewayConfig::from_env()?)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// One request, no retries.
    async fn attempt(&self, system: &str, user: &str) -> GatewayResult<String> {
        let request = match self.config.provider {
            Provider::OpenAi => self
                .client
                .post(&self.config.api_url)
                .bearer_auth(&self.config.api_key)
                .json(&OpenAiRequest::build(&self.config, system, user)),
            Provider::Anthropic => self
                .client
                .post(&self.config.api_url)
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&AnthropicRequest::build(&self.config, system, user)),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ModelCallError::Timeout {
                    limit_ms: self.config.retry.timeout_ms,
                }
            } else {
                ModelCallError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ModelCallError::RateLimited { attempts: 1 });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ModelCallError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!(
                status = status.as_u16(),
                provider = %self.config.provider,
                "model call failed"
            );
            return Err(ModelCallError::Http {
                status: status.as_u16(),
                body: truncate_chars(&body, ERROR_BODY_LIMIT),
            });
        }

        let text = match self.config.provider {
            Provider::OpenAi => wire::decode::<OpenAiResponse>("openai", &body)?.into_text(),
            Provider::Anthropic => {
                wire::decode::<AnthropicResponse>("anthropic", &body)?.into_text()
            }
        };
        Ok(text)
    }
}

#[async_trait]
impl ModelGateway for HttpModelGateway {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> GatewayResult<String> {
        debug!(
            provider = %self.config.provider,
            model = %self.config.model,
            "invoking model"
        );
        call_with_retry(&self.config.retry, || self.attempt(system_prompt, user_prompt)).await
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.config.provider, self.config.model)
    }
}
