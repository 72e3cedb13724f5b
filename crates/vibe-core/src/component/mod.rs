//! Dynamic component compiler and render sandbox.
//!
//! AI-authored UI component source goes through a fixed sequence of token
//! passes ([`transform`]): fence removal, a syntax sanity check, module
//! syntax removal, TypeScript erasure, component-name detection, JSX
//! lowering and output-slot wrapping. A [`ScriptEngine`] turns the result
//! into a [`Component`] inside a capability [`Scope`] ([`JsEngine`] runs it
//! on an embedded JavaScript interpreter), and
//! [`ComponentCompiler`] caches successes in a [`ComponentCache`].
//!
//! [`generate_component`] asks a model for component source and retries
//! until [`transform`] accepts it.
//!
//! Rendering goes through [`render_isolated`], which contains both returned
//! errors and panics so a broken component never takes the host down.

mod boundary;
mod cache;
mod compiler;
mod diagnostics;
mod engine;
mod error;
mod fence;
mod generate;
mod ident;
mod jsx;
mod lexer;
mod marked;
mod modules;
mod program;
mod runtime;
mod scope;
mod syntax;
mod typestrip;

pub mod fakes;

pub use boundary::{render_isolated, render_or_panel, ErrorPanel};
pub use cache::{ComponentCache, DEFAULT_CACHE_CAPACITY};
pub use compiler::{transform, ComponentCompiler};
pub use diagnostics::{locate, source_line};
pub use engine::{Component, RenderTree, ScriptEngine};
pub use error::{CompileError, CompileResult, RenderError};
pub use generate::{
    generate_component, GenerateError, GeneratedComponent, GenerationRequest,
    MAX_GENERATION_ATTEMPTS,
};
pub use ident::FALLBACK_COMPONENT;
pub use program::{CompiledProgram, OUTPUT_SLOT};
pub use runtime::{EngineLimits, JsComponent, JsEngine};
pub use scope::{Capability, Scope};
