//! Scripted [`ModelGateway`] for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{GatewayResult, ModelCallError};
use crate::gateway::ModelGateway;

type Responder = Box<dyn Fn(&str, &str) -> GatewayResult<String> + Send + Sync>;

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_prompt: String,
}

enum Script {
    Queue(Mutex<VecDeque<GatewayResult<String>>>),
    Responder(Responder),
}

/// Answers from a fixed queue or a closure, recording every call.
pub struct ScriptedGateway {
    script: Script,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGateway {
    /// Replies in order; once drained, every call fails with a transport
    /// error.
    pub fn queue(replies: Vec<GatewayResult<String>>) -> Self {
        Self {
            script: Script::Queue(Mutex::new(replies.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replies computed from `(system, user)`; order-independent, so it
    /// suits parallel callers.
    pub fn responder<F>(f: F) -> Self
    where
        F: Fn(&str, &str) -> GatewayResult<String> + Send + Sync + 'static,
    {
        Self {
            script: Script::Responder(Box::new(f)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call succeeds with `reply`.
    pub fn always(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::responder(move |_, _| Ok(reply.clone()))
    }

    /// Every call fails with `err`.
    pub fn failing(err: ModelCallError) -> Self {
        Self::responder(move |_, _| Err(err.clone()))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> GatewayResult<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        });

        match &self.script {
            Script::Queue(queue) => queue.lock().unwrap().pop_front().unwrap_or_else(|| {
                Err(ModelCallError::Transport(
                    "scripted gateway exhausted".to_string(),
                ))
            }),
            Script::Responder(f) => f(system_prompt, user_prompt),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
