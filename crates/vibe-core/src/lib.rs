//! vibe-core: the council pipeline and the dynamic component compiler
//!
//! ## Layer 2 - Orchestration
//!
//! Turns a free-text intent into a validated VibeCode program through a
//! council of personas, and compiles AI-authored UI component source into a
//! sandboxed, re-renderable component.
//!
//! ## Key Components
//!
//! - [`Council`]: Stage 1 generation, Stage 2 evaluation, Stage 3 synthesis
//! - [`ComponentCompiler`]: token-pass transform, script engine, LRU cache
//! - [`render_isolated`]: render boundary that contains failures
//! - [`CouncilConfig`]: profile, Stage 1 scheduling and chairman id

pub mod component;
pub mod config;
pub mod council;
pub mod metrics;
pub mod obs;
pub mod telemetry;

pub use component::{
    render_isolated, render_or_panel, transform, CompileError, CompiledProgram, Component,
    ComponentCache, ComponentCompiler, ErrorPanel, JsEngine, RenderError, RenderTree, Scope,
    ScriptEngine,
};
pub use config::{ConfigError, CouncilConfig, GenerationMode};
pub use council::{
    Council, CouncilError, CouncilResponse, CouncilResult, Evaluation, Generation, Mode, Persona,
    Scores, Stage2Result, Stage3Result,
};
pub use metrics::METRICS;
