//! [`ScriptEngine`] backed by an embedded JavaScript interpreter.
//!
//! Every instantiation and every render runs in a fresh interpreter context,
//! so a [`JsComponent`] holds only source text and is freely shareable
//! across threads. The context gets a small UI runtime (`React` with
//! `createElement` and the common hooks) and resolves the element tree a
//! component returns into a [`RenderTree`]. Hooks are evaluated once per
//! render: state setters and effects are inert.

use std::sync::Arc;

use boa_engine::{Context, JsError, JsResult, Source};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::engine::{Component, RenderTree, ScriptEngine};
use super::error::{CompileError, CompileResult, RenderError};
use super::program::CompiledProgram;
use super::scope::Scope;

const RUNTIME: &str = include_str!("runtime.js");

/// Bounds applied to every interpreter context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLimits {
    /// Iterations any single loop may run before the script is aborted.
    pub loop_iterations: u64,
    pub recursion: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            loop_iterations: 1_000_000,
            recursion: 512,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsEngine {
    limits: EngineLimits,
}

impl JsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: EngineLimits) -> Self {
        Self { limits }
    }
}

impl ScriptEngine for JsEngine {
    fn instantiate(
        &self,
        program: &CompiledProgram,
        scope: &Scope,
    ) -> CompileResult<Arc<dyn Component>> {
        let script = bootstrap(program, scope)?;
        let mut context = runtime_context(self.limits).map_err(engine_error)?;
        context
            .eval(Source::from_bytes(script.as_str()))
            .map_err(engine_error)?;

        let found = eval_string(&mut context, "__vibeRuntime.describe(__vibeSlot)")
            .map_err(engine_error)?;
        if found != "function" {
            return Err(CompileError::NotAComponent { found });
        }

        debug!(component = %program.component_name, "component instantiated");
        Ok(Arc::new(JsComponent {
            name: program.component_name.clone(),
            script,
            limits: self.limits,
        }))
    }
}

/// A component whose program is re-evaluated for each render.
#[derive(Debug, Clone)]
pub struct JsComponent {
    name: String,
    script: String,
    limits: EngineLimits,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum RenderOutcome {
    Tree(RenderTree),
    Error(String),
}

impl Component for JsComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, props: &Value) -> Result<RenderTree, RenderError> {
        let fail = |message: String| RenderError::new(&self.name, message);

        let mut context = runtime_context(self.limits).map_err(|e| fail(e.to_string()))?;
        context
            .eval(Source::from_bytes(self.script.as_str()))
            .map_err(|e| fail(e.to_string()))?;

        let call = format!("__vibeRuntime.render(__vibeSlot, {props})");
        let json = eval_string(&mut context, &call).map_err(|e| fail(e.to_string()))?;
        match serde_json::from_str(&json) {
            Ok(RenderOutcome::Tree(tree)) => Ok(tree),
            Ok(RenderOutcome::Error(message)) => Err(fail(message)),
            Err(err) => Err(fail(format!("unreadable render output: {err}"))),
        }
    }
}

fn runtime_context(limits: EngineLimits) -> JsResult<Context> {
    let mut context = Context::default();
    context
        .runtime_limits_mut()
        .set_loop_iteration_limit(limits.loop_iterations);
    context.runtime_limits_mut().set_recursion_limit(limits.recursion);
    context.eval(Source::from_bytes(RUNTIME))?;
    Ok(context)
}

fn eval_string(context: &mut Context, code: &str) -> JsResult<String> {
    let value = context.eval(Source::from_bytes(code))?;
    Ok(value.to_string(context)?.to_std_string_escaped())
}

fn engine_error(err: JsError) -> CompileError {
    CompileError::Engine {
        message: err.to_string(),
    }
}

/// Script that calls the program body as a function of the scope's keys and
/// stores its result in `__vibeSlot`.
fn bootstrap(program: &CompiledProgram, scope: &Scope) -> CompileResult<String> {
    let keys = scope.keys();
    let kinds: Vec<_> = scope.iter().map(|(_, capability)| capability).collect();

    Ok(format!(
        "var __vibeSlot = (function ({params}) {{\n{body}}}).apply(undefined, __vibeRuntime.bind({keys}, {kinds}));\n",
        params = keys.join(", "),
        body = program.function_body(),
        keys = js_literal(&keys)?,
        kinds = js_literal(&kinds)?,
    ))
}

fn js_literal<T: Serialize>(value: &T) -> CompileResult<String> {
    serde_json::to_string(value).map_err(|err| CompileError::Engine {
        message: format!("scope is not serializable: {err}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::scope::Capability;

    #[test]
    fn test_bootstrap_binds_scope_in_order() {
        let program = CompiledProgram::wrap("function App() {}", "App");
        let scope = Scope::empty()
            .with("React", Capability::Runtime)
            .with("useState", Capability::Hook)
            .with("Card", Capability::Primitive);
        let script = bootstrap(&program, &scope).unwrap();
        assert!(script.starts_with("var __vibeSlot = (function (React, useState, Card) {\n"));
        assert!(script.contains(
            r#"__vibeRuntime.bind(["React","useState","Card"], ["runtime","hook","primitive"])"#
        ));
    }
}
