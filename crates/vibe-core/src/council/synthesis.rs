//! Stage 3: the chairman's final program, or a ranked fallback.

use chrono::Utc;
use tracing::debug;
use vibe_gateway::ModelGateway;
use vibe_lang::{validate_with, GrammarProfile, Validation};

use super::error::CouncilError;
use super::extract::extract_program;
use super::personas::Persona;
use super::prompts;
use super::types::{Generation, Stage2Result, Stage3Result, FALLBACK_CHAIRMAN};
use crate::metrics::METRICS;
use crate::obs;

pub const NO_PROPOSALS_CODE: &str = "// No proposals were generated";

/// Ask the chairman to synthesize. The result carries a valid program
/// whenever the chairman or any candidate produced one.
pub async fn run_stage3(
    gateway: &dyn ModelGateway,
    chairman: &Persona,
    intent: &str,
    candidates: &[Generation],
    stage2: &Stage2Result,
    profile: GrammarProfile,
) -> Stage3Result {
    if candidates.is_empty() {
        return no_proposals();
    }

    let reply = gateway
        .complete(
            &prompts::synthesis_system(chairman, profile),
            &prompts::synthesis_user(intent, candidates, stage2),
        )
        .await;

    let rejection = match reply {
        Ok(reply) => {
            let code = extract_program(&reply);
            let validation = validate_with(&code, profile);
            if validation.valid {
                debug!(chairman = %chairman.id, "synthesis accepted");
                return Stage3Result {
                    final_code: code,
                    validation,
                    chairman: chairman.id.clone(),
                    reasoning: format!(
                        "{} synthesized the ranked proposals into a single program.",
                        chairman.name
                    ),
                    timestamp: Utc::now(),
                };
            }
            CouncilError::SynthesisInvalid(validation.errors.join("; "))
        }
        Err(err) => CouncilError::SynthesisInvalid(format!("synthesis call failed: {err}")),
    };

    obs::emit_fallback("stage3", &rejection);
    METRICS.inc_synthesis_fallbacks();
    fallback_stage3(candidates, &stage2.ranking, &rejection.to_string())
}

fn no_proposals() -> Stage3Result {
    Stage3Result {
        final_code: NO_PROPOSALS_CODE.to_string(),
        validation: Validation::failed("No proposals were generated"),
        chairman: FALLBACK_CHAIRMAN.to_string(),
        reasoning: "Stage 1 produced no proposals to synthesize.".to_string(),
        timestamp: Utc::now(),
    }
}

/// Substitute the best-ranked valid candidate, or the first-ranked one when
/// none validated.
pub fn fallback_stage3(candidates: &[Generation], ranking: &[usize], reason: &str) -> Stage3Result {
    let ranked = || {
        ranking
            .iter()
            .filter_map(|&i| candidates.get(i).map(|g| (i, g)))
            .chain(candidates.iter().enumerate())
    };

    let (index, chosen, reasoning) = match ranked().find(|(_, g)| g.is_valid()) {
        Some((i, g)) => (
            i,
            g,
            format!(
                "Fallback to proposal {i} by {} (best-ranked valid proposal): {reason}",
                g.persona_name
            ),
        ),
        None => {
            let Some((i, g)) = ranked().next() else {
                return no_proposals();
            };
            (
                i,
                g,
                format!(
                    "No proposal passed validation; returning proposal {i} by {} as ranked first: {reason}",
                    g.persona_name
                ),
            )
        }
    };
    debug!(proposal = index, "synthesis fallback selected");

    Stage3Result {
        final_code: chosen.code.clone(),
        validation: chosen.validation.clone(),
        chairman: FALLBACK_CHAIRMAN.to_string(),
        reasoning,
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::council::evaluation::fallback_stage2;
    use vibe_gateway::fakes::ScriptedGateway;

    const VALID: &str = "set state = RUNNING\nset friction = 0.2";

    fn generation(name: &str, code: &str) -> Generation {
        Generation {
            persona_id: name.to_lowercase(),
            persona_name: name.into(),
            code: code.into(),
            validation: validate_with(code, GrammarProfile::default()),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_valid_synthesis_is_accepted() {
        let gateway = ScriptedGateway::always(format!("```vibecode\n{VALID}\n```"));
        let candidates = vec![generation("A", "set state = NOPE")];
        let result = run_stage3(
            &gateway,
            &Persona::chairman("chairman"),
            "intent",
            &candidates,
            &fallback_stage2(1),
            GrammarProfile::default(),
        )
        .await;
        assert_eq!(result.chairman, "chairman");
        assert_eq!(result.final_code, VALID);
        assert!(result.validation.valid);
    }

    #[tokio::test]
    async fn test_invalid_synthesis_falls_back_to_best_valid() {
        let gateway = ScriptedGateway::always("set state = SOMEWHERE");
        let candidates = vec![
            generation("A", "set state = NOPE"),
            generation("B", VALID),
            generation("C", "set state = DONE"),
        ];
        let mut stage2 = fallback_stage2(3);
        stage2.ranking = vec![2, 1, 0];
        let result = run_stage3(
            &gateway,
            &Persona::chairman("chairman"),
            "intent",
            &candidates,
            &stage2,
            GrammarProfile::default(),
        )
        .await;
        assert_eq!(result.chairman, FALLBACK_CHAIRMAN);
        assert_eq!(result.final_code, "set state = DONE");
        assert!(result.reasoning.contains("proposal 2"));
    }

    #[test]
    fn test_fallback_without_valid_candidates_uses_first_ranked() {
        let candidates = vec![generation("A", "set state = X"), generation("B", "set state = Y")];
        let result = fallback_stage3(&candidates, &[1, 0], "call failed");
        assert_eq!(result.final_code, "set state = Y");
        assert!(!result.validation.valid);
        assert!(result.reasoning.starts_with("No proposal passed validation"));
    }

    #[tokio::test]
    async fn test_no_candidates_yields_placeholder() {
        let gateway = ScriptedGateway::always(VALID);
        let result = run_stage3(
            &gateway,
            &Persona::chairman("chairman"),
            "intent",
            &[],
            &fallback_stage2(0),
            GrammarProfile::default(),
        )
        .await;
        assert_eq!(result.final_code, NO_PROPOSALS_CODE);
        assert_eq!(gateway.call_count(), 0);
    }
}
