//! Request and response bodies for the two supported providers.

use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;
use crate::error::{GatewayResult, ModelCallError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// OpenAI chat-completions request.
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl OpenAiRequest {
    pub fn build(config: &GatewayConfig, system: &str, user: &str) -> Self {
        Self {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiResponse {
    #[serde(default)]
    pub choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChoice {
    pub message: Option<OpenAiMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiMessage {
    pub content: Option<String>,
}

impl OpenAiResponse {
    /// First choice's content; an absent content is an empty reply.
    pub fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}

/// Anthropic messages request. The system prompt is a top-level field.
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl AnthropicRequest {
    pub fn build(config: &GatewayConfig, system: &str, user: &str) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            system: system.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            temperature: (config.temperature > 0.0).then_some(config.temperature),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
}

impl AnthropicResponse {
    /// Concatenation of all text blocks.
    pub fn into_text(self) -> String {
        self.content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect()
    }
}

pub(crate) fn decode<T: for<'de> Deserialize<'de>>(provider: &str, body: &str) -> GatewayResult<T> {
    serde_json::from_str(body).map_err(|e| {
        ModelCallError::MalformedResponse(format!("{provider} response is not valid JSON: {e}"))
    })
}
