//! Parsed program shape: tokens, initial values and validation outcome.

use serde::{Deserialize, Serialize};

use crate::error::GrammarError;
use crate::profile::GrammarProfile;
use crate::state::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    SetState,
    SetFriction,
    IncreaseFriction,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    State(State),
    Number(f64),
}

/// One accepted statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub value: TokenValue,
    pub line: usize,
    /// Enclosing `on <EVENT>` block, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

/// Derived deterministically from program source. Never mutated; re-parse on
/// change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedProgram {
    pub profile: GrammarProfile,
    pub tokens: Vec<Token>,
    pub initial_state: State,
    pub initial_friction: f64,
    pub friction_increments: Vec<f64>,
    /// Names of the `on <EVENT>` blocks, in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Typed form of `errors`.
    #[serde(skip)]
    pub diagnostics: Vec<GrammarError>,
}

impl ParsedProgram {
    /// Thin projection used by callers that only need the verdict.
    pub fn validation(&self) -> Validation {
        Validation {
            valid: self.is_valid,
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

/// `{valid, errors, warnings}`; warnings never affect validity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Validation {
    /// An invalid verdict carrying a single error message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![message.into()],
            warnings: Vec::new(),
        }
    }
}
