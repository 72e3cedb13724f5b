//! Error taxonomy for the VibeCode grammar and interpreter.
//!
//! None of these abort anything: grammar errors end up as diagnostic strings
//! in [`crate::ParsedProgram::errors`], interpreter errors are surfaced as
//! `false` returns plus [`crate::Interpreter::last_rejection`].

use serde::{Deserialize, Serialize};

use crate::state::State;

/// A state name that is not one of the five VibeCode states.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown state: {0}")]
pub struct UnknownState(pub String);

/// The grammar rule a line violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum GrammarRule {
    #[error("Invalid state \"{value}\". Valid states: {valid}")]
    InvalidState { value: String, valid: String },

    #[error("Friction must be {domain}")]
    FrictionOutOfRange { domain: String },

    #[error("Friction increment must be {domain}")]
    IncrementOutOfRange { domain: String },

    #[error("Forbidden pattern detected - {pattern}. VibeCode is purely declarative.")]
    ForbiddenPattern { pattern: String },

    #[error("Unrecognized command \"{text}\"")]
    UnrecognizedCommand { text: String },

    #[error("Nested event block \"{inner}\" inside \"{outer}\"")]
    NestedEventBlock { inner: String, outer: String },

    #[error("Unmatched closing brace")]
    UnmatchedBrace,

    #[error("Event block \"{event}\" is never closed")]
    UnclosedEventBlock { event: String },

    #[error("At least one \"on <EVENT> {{ ... }}\" block is required")]
    MissingEventBlock,
}

/// A named grammar rule violated at a (1-based) source line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarError {
    /// `None` for whole-program rules such as a missing event block.
    pub line: Option<usize>,
    pub rule: GrammarRule,
}

impl GrammarError {
    pub fn at(line: usize, rule: GrammarRule) -> Self {
        Self {
            line: Some(line),
            rule,
        }
    }

    pub fn program(rule: GrammarRule) -> Self {
        Self { line: None, rule }
    }
}

impl std::fmt::Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "Line {line}: {}", self.rule),
            None => write!(f, "{}", self.rule),
        }
    }
}

impl std::error::Error for GrammarError {}

/// Rejected interpreter mutations. Non-fatal; state is left untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InterpreterError {
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: State, to: State },

    #[error("invalid friction value: {value}. Must be between 0 and {max}")]
    FrictionOutOfRange { value: f64, max: f64 },
}
