//! Scripted [`ScriptEngine`] for tests and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use super::engine::{Component, RenderTree, ScriptEngine};
use super::error::{CompileError, CompileResult, RenderError};
use super::program::CompiledProgram;
use super::scope::Scope;

/// How components built by a [`ScriptedEngine`] behave when rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderBehavior {
    /// `<div data-component=Name>` containing the props as text.
    Echo,
    Fail(String),
    Panic(String),
}

#[derive(Debug, Clone)]
enum Outcome {
    Component(RenderBehavior),
    Error(CompileError),
}

/// Engine that never evaluates code: it records what it was asked to run
/// and answers with a canned outcome.
#[derive(Debug)]
pub struct ScriptedEngine {
    outcome: Mutex<Outcome>,
    instantiations: AtomicUsize,
    last_program: Mutex<Option<CompiledProgram>>,
    last_parameters: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::with_outcome(Outcome::Component(RenderBehavior::Echo))
    }

    pub fn rendering(behavior: RenderBehavior) -> Self {
        Self::with_outcome(Outcome::Component(behavior))
    }

    pub fn failing(err: CompileError) -> Self {
        Self::with_outcome(Outcome::Error(err))
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            instantiations: AtomicUsize::new(0),
            last_program: Mutex::new(None),
            last_parameters: Mutex::new(Vec::new()),
        }
    }

    /// Switch later instantiations to succeed with `behavior`.
    pub fn succeed_with(&self, behavior: RenderBehavior) {
        *self.outcome.lock().unwrap() = Outcome::Component(behavior);
    }

    pub fn fail_with(&self, err: CompileError) {
        *self.outcome.lock().unwrap() = Outcome::Error(err);
    }

    pub fn instantiations(&self) -> usize {
        self.instantiations.load(Ordering::SeqCst)
    }

    pub fn last_program(&self) -> Option<CompiledProgram> {
        self.last_program.lock().unwrap().clone()
    }

    /// Formal parameter list of the last instantiation.
    pub fn last_parameters(&self) -> Vec<String> {
        self.last_parameters.lock().unwrap().clone()
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEngine for ScriptedEngine {
    fn instantiate(
        &self,
        program: &CompiledProgram,
        scope: &Scope,
    ) -> CompileResult<Arc<dyn Component>> {
        self.instantiations.fetch_add(1, Ordering::SeqCst);
        *self.last_program.lock().unwrap() = Some(program.clone());
        *self.last_parameters.lock().unwrap() =
            scope.keys().into_iter().map(str::to_string).collect();

        match self.outcome.lock().unwrap().clone() {
            Outcome::Component(behavior) => Ok(Arc::new(ScriptedComponent {
                name: program.component_name.clone(),
                behavior,
            })),
            Outcome::Error(err) => Err(err),
        }
    }
}

#[derive(Debug)]
pub struct ScriptedComponent {
    name: String,
    behavior: RenderBehavior,
}

impl Component for ScriptedComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, props: &Value) -> Result<RenderTree, RenderError> {
        match &self.behavior {
            RenderBehavior::Echo => Ok(RenderTree::element(
                "div",
                json!({ "data-component": self.name }),
                vec![RenderTree::text(props.to_string())],
            )),
            RenderBehavior::Fail(message) => Err(RenderError::new(&self.name, message)),
            RenderBehavior::Panic(message) => panic!("{message}"),
        }
    }
}
