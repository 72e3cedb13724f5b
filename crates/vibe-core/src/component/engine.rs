//! Seams between compiled programs and whatever executes them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{CompileResult, RenderError};
use super::program::CompiledProgram;
use super::scope::Scope;

/// A rendered UI tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderTree {
    Element {
        tag: String,
        #[serde(default)]
        props: Value,
        #[serde(default)]
        children: Vec<RenderTree>,
    },
    Text {
        text: String,
    },
    Fragment {
        children: Vec<RenderTree>,
    },
    Empty,
}

impl RenderTree {
    pub fn element(tag: impl Into<String>, props: Value, children: Vec<RenderTree>) -> Self {
        RenderTree::Element {
            tag: tag.into(),
            props,
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        RenderTree::Text { text: text.into() }
    }

    /// Concatenated text content, depth first.
    pub fn text_content(&self) -> String {
        match self {
            RenderTree::Text { text } => text.clone(),
            RenderTree::Element { children, .. } | RenderTree::Fragment { children } => {
                children.iter().map(RenderTree::text_content).collect()
            }
            RenderTree::Empty => String::new(),
        }
    }
}

/// A callable component produced by a [`ScriptEngine`].
///
/// Instances are immutable once created, which is what lets the cache hand
/// the same `Arc` to every caller.
pub trait Component: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn render(&self, props: &Value) -> Result<RenderTree, RenderError>;
}

/// Capability-scoped script execution.
///
/// An engine builds a function whose formal parameters are exactly
/// `scope.keys()` and whose body is [`CompiledProgram::function_body`],
/// calls it with the scope's values in the same order and returns the
/// result. Anything other than a component is
/// [`CompileError::NotAComponent`](super::CompileError::NotAComponent).
pub trait ScriptEngine: Send + Sync {
    fn instantiate(
        &self,
        program: &CompiledProgram,
        scope: &Scope,
    ) -> CompileResult<Arc<dyn Component>>;
}

impl<E: ScriptEngine + ?Sized> ScriptEngine for Arc<E> {
    fn instantiate(
        &self,
        program: &CompiledProgram,
        scope: &Scope,
    ) -> CompileResult<Arc<dyn Component>> {
        (**self).instantiate(program, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_content_walks_children() {
        let tree = RenderTree::element(
            "div",
            json!({}),
            vec![
                RenderTree::text("a"),
                RenderTree::Fragment {
                    children: vec![RenderTree::text("b"), RenderTree::Empty],
                },
            ],
        );
        assert_eq!(tree.text_content(), "ab");
    }

    #[test]
    fn test_tree_serializes_tagged() {
        let value = serde_json::to_value(RenderTree::text("x")).unwrap();
        assert_eq!(value, json!({"type": "text", "text": "x"}));
    }
}
