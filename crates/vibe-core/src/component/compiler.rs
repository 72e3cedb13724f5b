//! Source text to callable component.

use std::sync::Arc;

use tracing::debug;

use super::cache::ComponentCache;
use super::engine::{Component, ScriptEngine};
use super::error::{CompileError, CompileResult};
use super::program::CompiledProgram;
use super::scope::Scope;
use super::{fence, ident, jsx, lexer, modules, syntax, typestrip};
use crate::{metrics::METRICS, obs};

/// Deterministic source-to-script transform. Pure: the same input always
/// yields the same program or the same error.
pub fn transform(source: &str) -> CompileResult<CompiledProgram> {
    if source.trim().is_empty() {
        return Err(CompileError::EmptySource);
    }

    let unfenced = fence::strip_fences(source);
    if unfenced.trim().is_empty() {
        return Err(CompileError::EmptySource);
    }

    let tokens = lexer::tokenize(&unfenced)?;
    syntax::check_balanced(&tokens)?;

    let stripped = modules::strip_modules(tokens);
    let tokens = typestrip::strip_types(stripped.tokens)?;
    let name = ident::component_name(&tokens, stripped.default_export.as_deref());
    let body = jsx::emit(&tokens);

    Ok(CompiledProgram::wrap(&body, &name))
}

/// Compiles component source through a [`ScriptEngine`], caching successes.
#[derive(Clone)]
pub struct ComponentCompiler {
    engine: Arc<dyn ScriptEngine>,
    scope: Scope,
    cache: ComponentCache,
}

impl ComponentCompiler {
    pub fn new(engine: Arc<dyn ScriptEngine>, scope: Scope, cache: ComponentCache) -> Self {
        Self {
            engine,
            scope,
            cache,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn cache(&self) -> &ComponentCache {
        &self.cache
    }

    /// Compile `source`, or return the cached component for identical
    /// source. Failures are returned as-is and never cached.
    pub fn compile(&self, source: &str) -> CompileResult<Arc<dyn Component>> {
        if let Some(hit) = self.cache.get(source) {
            METRICS.inc_cache_hits();
            debug!(component = hit.name(), "component cache hit");
            return Ok(hit);
        }
        METRICS.inc_cache_misses();

        let result = transform(source)
            .and_then(|program| self.engine.instantiate(&program, &self.scope));

        match result {
            Ok(component) => {
                obs::emit_component_compiled(component.name(), source.len());
                if let Some((_, evicted)) = self.cache.insert(source.to_string(), component.clone()) {
                    debug!(evicted = evicted.name(), "component evicted from cache");
                }
                Ok(component)
            }
            Err(err) => {
                METRICS.inc_compile_failures();
                obs::emit_compile_failed(&err);
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ComponentCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentCompiler")
            .field("scope_len", &self.scope.len())
            .field("cache", &self.cache)
            .finish()
    }
}
