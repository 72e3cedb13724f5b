//! Global atomic counters for council and compiler observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a CLI command).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    pipeline_runs: AtomicU64,
    persona_failures: AtomicU64,
    evaluation_fallbacks: AtomicU64,
    synthesis_fallbacks: AtomicU64,
    persistence_failures: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    compile_failures: AtomicU64,
    render_failures: AtomicU64,
    generation_retries: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! counter {
    ($inc:ident, $get:ident, $name:literal) => {
        pub fn $inc(&self) {
            self.$get.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(metric = $name, "counter incremented");
        }

        pub fn $get(&self) -> u64 {
            self.$get.load(Ordering::Relaxed)
        }
    };
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            pipeline_runs: AtomicU64::new(0),
            persona_failures: AtomicU64::new(0),
            evaluation_fallbacks: AtomicU64::new(0),
            synthesis_fallbacks: AtomicU64::new(0),
            persistence_failures: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            compile_failures: AtomicU64::new(0),
            render_failures: AtomicU64::new(0),
            generation_retries: AtomicU64::new(0),
        }
    }

    counter!(inc_pipeline_runs, pipeline_runs, "pipeline_runs");
    counter!(inc_persona_failures, persona_failures, "persona_failures");
    counter!(inc_evaluation_fallbacks, evaluation_fallbacks, "evaluation_fallbacks");
    counter!(inc_synthesis_fallbacks, synthesis_fallbacks, "synthesis_fallbacks");
    counter!(inc_persistence_failures, persistence_failures, "persistence_failures");
    counter!(inc_cache_hits, cache_hits, "cache_hits");
    counter!(inc_cache_misses, cache_misses, "cache_misses");
    counter!(inc_compile_failures, compile_failures, "compile_failures");
    counter!(inc_render_failures, render_failures, "render_failures");
    counter!(inc_generation_retries, generation_retries, "generation_retries");

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            pipeline_runs = self.pipeline_runs(),
            persona_failures = self.persona_failures(),
            evaluation_fallbacks = self.evaluation_fallbacks(),
            synthesis_fallbacks = self.synthesis_fallbacks(),
            persistence_failures = self.persistence_failures(),
            cache_hits = self.cache_hits(),
            cache_misses = self.cache_misses(),
            compile_failures = self.compile_failures(),
            render_failures = self.render_failures(),
            generation_retries = self.generation_retries(),
        );
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        for counter in [
            &self.pipeline_runs,
            &self.persona_failures,
            &self.evaluation_fallbacks,
            &self.synthesis_fallbacks,
            &self.persistence_failures,
            &self.cache_hits,
            &self.cache_misses,
            &self.compile_failures,
            &self.render_failures,
            &self.generation_retries,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment_and_reset() {
        let m = Metrics::new();
        m.inc_cache_hits();
        m.inc_cache_hits();
        m.inc_persona_failures();
        assert_eq!(m.cache_hits(), 2);
        assert_eq!(m.persona_failures(), 1);
        m.flush();
        m.reset();
        assert_eq!(m.cache_hits(), 0);
        assert_eq!(m.persona_failures(), 0);
    }
}
