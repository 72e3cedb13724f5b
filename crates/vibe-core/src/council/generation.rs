//! Stage 1: one candidate program per persona.

use std::fmt::Display;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, warn, Instrument, Span};
use vibe_gateway::ModelGateway;
use vibe_lang::{validate_with, GrammarProfile, Validation};

use super::extract::extract_program;
use super::personas::Persona;
use super::prompts;
use super::types::Generation;
use crate::config::GenerationMode;
use crate::metrics::METRICS;

/// Ask one persona for a program. Never fails: a model error becomes a
/// generation whose code is a comment naming the error.
pub async fn generate_one(
    gateway: &dyn ModelGateway,
    persona: &Persona,
    intent: &str,
    profile: GrammarProfile,
) -> Generation {
    let system = prompts::persona_system(persona, profile);
    let user = prompts::generation_user(intent);

    match gateway.complete(&system, &user).await {
        Ok(reply) => {
            let code = extract_program(&reply);
            let validation = validate_with(&code, profile);
            debug!(
                persona = %persona.id,
                valid = validation.valid,
                errors = validation.errors.len(),
                "persona generated"
            );
            Generation {
                persona_id: persona.id.clone(),
                persona_name: persona.name.clone(),
                code,
                validation,
                timestamp: Utc::now(),
            }
        }
        Err(err) => failed_generation(persona, &err),
    }
}

fn failed_generation(persona: &Persona, err: &dyn Display) -> Generation {
    warn!(persona = %persona.id, error = %err, "persona generation failed");
    METRICS.inc_persona_failures();
    Generation {
        persona_id: persona.id.clone(),
        persona_name: persona.name.clone(),
        code: format!("// Generation failed: {err}"),
        validation: Validation::failed(format!("Generation failed: {err}")),
        timestamp: Utc::now(),
    }
}

/// Run every persona, returning exactly one generation each, in persona
/// order.
pub async fn run_stage1(
    gateway: Arc<dyn ModelGateway>,
    personas: &[Persona],
    intent: &str,
    profile: GrammarProfile,
    mode: GenerationMode,
) -> Vec<Generation> {
    match mode {
        GenerationMode::Sequential { .. } => {
            let mut generations = Vec::with_capacity(personas.len());
            for (i, persona) in personas.iter().enumerate() {
                if i > 0 {
                    if let Some(delay) = mode.delay() {
                        tokio::time::sleep(delay).await;
                    }
                }
                generations.push(generate_one(gateway.as_ref(), persona, intent, profile).await);
            }
            generations
        }
        GenerationMode::Parallel => {
            let handles: Vec<_> = personas
                .iter()
                .cloned()
                .map(|persona| {
                    let gateway = Arc::clone(&gateway);
                    let intent = intent.to_string();
                    tokio::spawn(
                        async move {
                            generate_one(gateway.as_ref(), &persona, &intent, profile).await
                        }
                        .instrument(Span::current()),
                    )
                })
                .collect();

            join_all(handles)
                .await
                .into_iter()
                .zip(personas)
                .map(|(joined, persona)| match joined {
                    Ok(generation) => generation,
                    Err(join_err) => failed_generation(persona, &join_err),
                })
                .collect()
        }
    }
}
