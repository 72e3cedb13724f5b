//! Finite-state interpreter driving a preview session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::InterpreterError;
use crate::parser;
use crate::profile::GrammarProfile;
use crate::InterpreterResult;
use crate::program::ParsedProgram;
use crate::state::State;

/// One recorded mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub state: State,
    pub friction: f64,
    pub timestamp: DateTime<Utc>,
}

/// Mutable session state. History is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    state: State,
    friction: f64,
    history: Vec<HistoryEntry>,
}

impl ExecutionContext {
    fn starting_at(state: State, friction: f64) -> Self {
        let mut ctx = Self {
            state,
            friction,
            history: Vec::with_capacity(8),
        };
        ctx.record();
        ctx
    }

    fn record(&mut self) {
        self.history.push(HistoryEntry {
            state: self.state,
            friction: self.friction,
            timestamp: Utc::now(),
        });
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }
}

/// Executes a [`ParsedProgram`] as a state machine.
///
/// Owns its context exclusively; rejected mutations return `false`, leave
/// the context untouched and are kept in [`Interpreter::last_rejection`].
#[derive(Debug, Clone)]
pub struct Interpreter {
    parsed: ParsedProgram,
    context: ExecutionContext,
    last_rejection: Option<InterpreterError>,
}

impl Interpreter {
    pub fn new(parsed: ParsedProgram) -> Self {
        let context = ExecutionContext::starting_at(parsed.initial_state, parsed.initial_friction);
        Self {
            parsed,
            context,
            last_rejection: None,
        }
    }

    /// Parse with the default profile and start an interpreter on the result,
    /// valid or not.
    pub fn from_source(source: &str) -> Self {
        Self::new(parser::parse(source))
    }

    pub fn from_source_with(source: &str, profile: GrammarProfile) -> Self {
        Self::new(parser::parse_with(source, profile))
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn parsed(&self) -> &ParsedProgram {
        &self.parsed
    }

    pub fn state(&self) -> State {
        self.context.state
    }

    pub fn friction(&self) -> f64 {
        self.context.friction
    }

    pub fn max_friction(&self) -> f64 {
        self.parsed.profile.max_friction()
    }

    pub fn last_rejection(&self) -> Option<&InterpreterError> {
        self.last_rejection.as_ref()
    }

    pub fn can_transition_to(&self, target: State) -> bool {
        self.context.state.can_transition_to(target)
    }

    pub fn available_transitions(&self) -> Vec<State> {
        self.context.state.successors()
    }

    pub fn transition_to(&mut self, target: State) -> bool {
        self.try_transition_to(target).is_ok()
    }

    /// Like [`Interpreter::transition_to`], reporting why a move was refused.
    pub fn try_transition_to(&mut self, target: State) -> InterpreterResult<()> {
        if !self.can_transition_to(target) {
            return Err(self.reject(InterpreterError::InvalidTransition {
                from: self.context.state,
                to: target,
            }));
        }

        debug!(from = %self.context.state, to = %target, "transition");
        self.context.state = target;
        self.context.record();
        Ok(())
    }

    pub fn set_friction(&mut self, value: f64) -> bool {
        self.try_set_friction(value).is_ok()
    }

    pub fn try_set_friction(&mut self, value: f64) -> InterpreterResult<()> {
        let max = self.max_friction();
        if !value.is_finite() || !(0.0..=max).contains(&value) {
            return Err(self.reject(InterpreterError::FrictionOutOfRange { value, max }));
        }

        self.context.friction = value;
        self.context.record();
        Ok(())
    }

    fn reject(&mut self, err: InterpreterError) -> InterpreterError {
        warn!(error = %err, state = %self.context.state, "interpreter mutation rejected");
        self.last_rejection = Some(err.clone());
        err
    }

    /// Adds `delta`, clamped to the profile maximum.
    pub fn increase_friction(&mut self, delta: f64) -> bool {
        if !delta.is_finite() {
            let max = self.max_friction();
            self.reject(InterpreterError::FrictionOutOfRange { value: delta, max });
            return false;
        }
        let next = (self.context.friction + delta).min(self.max_friction());
        self.set_friction(next)
    }

    /// Back to the parsed initial values with a single history entry.
    pub fn reset(&mut self) {
        self.context =
            ExecutionContext::starting_at(self.parsed.initial_state, self.parsed.initial_friction);
        self.last_rejection = None;
    }

    pub fn should_show_friction(&self) -> bool {
        self.context.friction > 0.0
    }

    /// `1 - friction / max`, in `[0, 1]`.
    pub fn friction_opacity(&self) -> f64 {
        1.0 - self.context.friction / self.max_friction()
    }

    pub fn state_color(&self) -> &'static str {
        self.context.state.color()
    }
}
