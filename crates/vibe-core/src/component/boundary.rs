//! Render boundary: contains a failing component to its own subtree.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::diagnostics;
use super::engine::{Component, RenderTree};
use super::error::{CompileError, RenderError};
use crate::{metrics::METRICS, obs};

/// Render `component`, turning both returned errors and panics into a
/// [`RenderError`].
pub fn render_isolated(component: &dyn Component, props: &Value) -> Result<RenderTree, RenderError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| component.render(props)));
    let result = match outcome {
        Ok(result) => result,
        Err(payload) => Err(RenderError {
            component: component.name().to_string(),
            message: panic_message(payload.as_ref()),
            panicked: true,
        }),
    };
    if let Err(err) = &result {
        METRICS.inc_render_failures();
        obs::emit_render_failed(&err.component, &err.message, err.panicked);
    }
    result
}

/// Render `component`, substituting an [`ErrorPanel`] tree on failure.
pub fn render_or_panel(component: &dyn Component, props: &Value) -> RenderTree {
    render_isolated(component, props).unwrap_or_else(|err| ErrorPanel::from(&err).to_tree())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "component panicked".to_string()
    }
}

/// What the host shows in place of a component that could not be built or
/// rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPanel {
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

impl ErrorPanel {
    /// Panel for a compile failure, echoing the offending line of `source`
    /// when a position is known.
    pub fn from_compile(err: &CompileError, source: &str) -> Self {
        let location = err.location();
        Self {
            title: "Compilation Error".to_string(),
            message: err.to_string(),
            line: location.map(|(line, _)| line),
            column: location.and_then(|(_, column)| column),
            source_line: location.and_then(|(line, _)| diagnostics::source_line(source, line)),
        }
    }

    pub fn to_tree(&self) -> RenderTree {
        let mut children = vec![
            RenderTree::element("strong", json!({}), vec![RenderTree::text(&self.title)]),
            RenderTree::element("p", json!({}), vec![RenderTree::text(&self.message)]),
        ];
        if let Some(line) = self.line {
            let position = match self.column {
                Some(column) => format!("line {line}, column {column}"),
                None => format!("line {line}"),
            };
            children.push(RenderTree::element(
                "small",
                json!({}),
                vec![RenderTree::text(position)],
            ));
        }
        if let Some(source_line) = &self.source_line {
            children.push(RenderTree::element(
                "pre",
                json!({}),
                vec![RenderTree::text(source_line)],
            ));
        }
        RenderTree::element("div", json!({"role": "alert"}), children)
    }
}

impl From<&RenderError> for ErrorPanel {
    fn from(err: &RenderError) -> Self {
        let location = diagnostics::locate(&err.message);
        Self {
            title: "Render Error".to_string(),
            message: err.message.clone(),
            line: location.map(|(line, _)| line),
            column: location.and_then(|(_, column)| column),
            source_line: None,
        }
    }
}
