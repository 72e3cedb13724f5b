//! Compile-time and render-time failures of AI-authored components.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::diagnostics;

/// Raised before any component exists. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompileError {
    #[error("component source is empty")]
    EmptySource,

    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("unsupported construct at {line}:{column}: {construct}")]
    Unsupported {
        construct: String,
        line: usize,
        column: usize,
    },

    /// The script engine rejected or failed to run the program.
    #[error("script engine error: {message}")]
    Engine { message: String },

    /// The program ran but its output slot did not hold a component.
    #[error("compiled code did not return a component (got {found})")]
    NotAComponent { found: String },
}

impl CompileError {
    pub(crate) fn syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        CompileError::Syntax {
            message: message.into(),
            line,
            column,
        }
    }

    /// 1-based `(line, column)`, if one is known or can be read off the
    /// engine's message.
    pub fn location(&self) -> Option<(usize, Option<usize>)> {
        match self {
            CompileError::Syntax { line, column, .. }
            | CompileError::Unsupported { line, column, .. } => Some((*line, Some(*column))),
            CompileError::Engine { message } => diagnostics::locate(message),
            CompileError::EmptySource | CompileError::NotAComponent { .. } => None,
        }
    }
}

pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// Raised by an already-compiled component while rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("component {component} failed to render: {message}")]
pub struct RenderError {
    pub component: String,
    pub message: String,
    /// `true` when the failure was a panic caught at the boundary.
    pub panicked: bool,
}

impl RenderError {
    pub fn new(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            message: message.into(),
            panicked: false,
        }
    }
}
