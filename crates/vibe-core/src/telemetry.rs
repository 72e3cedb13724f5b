//! Log subscriber setup for the `vibe` binary.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const VIBE_TARGETS: &[&str] = &["vibe", "vibe_core", "vibe_gateway", "vibe_store", "vibe_lang"];

/// Filter used when `RUST_LOG` is unset: the workspace crates at `level`,
/// dependencies (SurrealDB, reqwest, hyper) at `warn`.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    std::iter::once("warn".to_string())
        .chain(VIBE_TARGETS.iter().map(|target| format!("{target}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the process-wide subscriber, writing to stderr so stdout carries
/// only command output. Later calls are no-ops.
pub fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let layer = fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry.with(layer.json().flatten_event(true)).try_init()
    } else {
        registry.with(layer.compact()).try_init()
    };
    if installed.is_err() {
        tracing::debug!("log subscriber already installed");
    }
}
