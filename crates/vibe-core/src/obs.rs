//! Structured observability hooks for council runs and component builds.
//!
//! Every pipeline run executes inside [`run_span`], so all logs it produces
//! carry its `conversation_id`. Lifecycle events are emitted at `info!`,
//! degraded paths at `warn!`.

use std::fmt::Display;

use tracing::{info, warn, Span};

/// Span scoping a council run. Attach with `tracing::Instrument`.
pub fn run_span(conversation_id: &str) -> Span {
    tracing::info_span!("vibe.council_run", conversation_id = %conversation_id)
}

pub fn emit_run_started(conversation_id: &str, mode: &str, intent_len: usize) {
    info!(
        event = "council.run_started",
        conversation_id = %conversation_id,
        mode = %mode,
        intent_len = intent_len,
    );
}

/// Emit event: a stage produced its result.
pub fn emit_stage_finished(stage: &str, candidates: usize, valid: usize, duration_ms: u64) {
    info!(
        event = "council.stage_finished",
        stage = %stage,
        candidates = candidates,
        valid = valid,
        duration_ms = duration_ms,
    );
}

/// Emit event: a stage fell back to its deterministic substitute.
pub fn emit_fallback(stage: &str, reason: &dyn Display) {
    warn!(event = "council.fallback", stage = %stage, reason = %reason);
}

pub fn emit_persistence_failed(what: &str, error: &dyn Display) {
    warn!(event = "council.persistence_failed", what = %what, error = %error);
}

pub fn emit_run_finished(conversation_id: &str, duration_ms: u64, chairman: &str, valid: bool) {
    info!(
        event = "council.run_finished",
        conversation_id = %conversation_id,
        duration_ms = duration_ms,
        chairman = %chairman,
        valid = valid,
    );
}

pub fn emit_component_compiled(component: &str, source_len: usize) {
    info!(
        event = "component.compiled",
        component = %component,
        source_len = source_len,
    );
}

pub fn emit_compile_failed(error: &dyn Display) {
    warn!(event = "component.compile_failed", error = %error);
}

pub fn emit_render_failed(component: &str, message: &str, panicked: bool) {
    warn!(
        event = "component.render_failed",
        component = %component,
        message = %message,
        panicked = panicked,
    );
}

/// Emit event: a generation attempt was not accepted and will be retried.
pub fn emit_generation_rejected(attempt: u32, reason: &dyn Display) {
    warn!(event = "component.generation_rejected", attempt = attempt, reason = %reason);
}
