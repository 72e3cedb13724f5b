//! Gateway error taxonomy.

use thiserror::Error;

/// Why a model call failed. Each kind is distinguishable so callers can
/// apply their own fallback policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelCallError {
    /// HTTP 429 on every attempt.
    #[error("rate limited after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },

    #[error("model call timed out after {limit_ms}ms")]
    Timeout { limit_ms: u64 },

    /// Any other non-success status. `body` is truncated.
    #[error("AI API error: {status} - {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("gateway misconfigured: {0}")]
    Misconfigured(String),

    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

impl ModelCallError {
    /// Only rate limiting is retried; everything else propagates at once.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelCallError::RateLimited { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelCallError::RateLimited { .. } => "rate_limited",
            ModelCallError::Timeout { .. } => "timeout",
            ModelCallError::Http { .. } => "http",
            ModelCallError::Transport(_) => "transport",
            ModelCallError::Misconfigured(_) => "misconfigured",
            ModelCallError::MalformedResponse(_) => "malformed_response",
        }
    }
}

pub type GatewayResult<T> = std::result::Result<T, ModelCallError>;

/// Truncate to at most `max` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
