//! vibe-gateway: the model-call contract
//!
//! ## Layer 1 - Model access
//!
//! `(system prompt, user prompt) -> text`, failing with a distinguishable
//! rate-limit, timeout or HTTP error. Rate limits are retried with capped
//! exponential backoff; every attempt runs under a hard timeout.
//!
//! ## Key Components
//!
//! - [`ModelGateway`]: the trait pipeline stages call through
//! - [`HttpModelGateway`]: OpenAI chat-completions / Anthropic messages client
//! - [`RetryPolicy`] / [`call_with_retry`]: backoff and timeout controls
//! - [`fakes::ScriptedGateway`]: deterministic gateway for tests

pub mod config;
mod error;
pub mod fakes;
mod gateway;
mod http;
mod retry;
pub mod wire;

pub use config::{GatewayConfig, Provider};
pub use error::{GatewayResult, ModelCallError};
pub use gateway::ModelGateway;
pub use http::HttpModelGateway;
pub use retry::{call_with_retry, RetryPolicy};
