//! VibeCode: the declarative language council personas write in.
//!
//! ## Layer 0 - Language
//!
//! A tiny, non-Turing-complete grammar describing an app's lifecycle state
//! and its "friction" (how much interactivity is damped), plus the
//! finite-state interpreter that drives a preview session from a parsed
//! program.
//!
//! ## Key Components
//!
//! - [`parse`] / [`parse_with`]: source text to [`ParsedProgram`]
//! - [`validate`]: `{valid, errors, warnings}` verdict
//! - [`Interpreter`]: transitions and friction changes with history
//! - [`GrammarProfile`]: the two supported dialects

mod error;
mod interpreter;
mod parser;
mod profile;
mod program;
mod state;

pub use error::{GrammarError, GrammarRule, InterpreterError, UnknownState};
pub use interpreter::{ExecutionContext, HistoryEntry, Interpreter};
pub use parser::{parse, parse_with, validate, validate_with};
pub use profile::GrammarProfile;
pub use program::{ParsedProgram, Token, TokenKind, TokenValue, Validation};
pub use state::{State, TRANSITIONS};

/// Result type for interpreter operations that report a reason.
pub type InterpreterResult<T> = std::result::Result<T, InterpreterError>;
