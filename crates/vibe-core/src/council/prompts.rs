//! Prompt text for each stage.

use std::fmt::Write as _;

use vibe_lang::GrammarProfile;

use super::personas::Persona;
use super::types::{Generation, Stage2Result};

fn grammar_brief(profile: GrammarProfile) -> String {
    let mut brief = String::from(
        "Write a program in VibeCode, a tiny declarative language. One statement per line:\n\
         \n\
         set state = <STATE>\n\
         set friction = <NUMBER>\n\
         increase friction by <NUMBER>\n\
         \n\
         STATE is one of CANDIDATE, RUNNING, COOLING, DONE, ERROR. \
         Lines starting with // or # are comments.\n",
    );
    match profile {
        GrammarProfile::Fractional => brief.push_str(
            "Friction is a decimal between 0 and 1. There are no blocks.\n",
        ),
        GrammarProfile::EventBlocks => brief.push_str(
            "Friction is an integer between 0 and 100. Group reactions into at least one \
             block of the form:\n\non <EVENT> {\n  set state = RUNNING\n}\n\n\
             Blocks do not nest. let, const, var, class, import, export, async and await \
             are forbidden.\n",
        ),
    }
    brief.push_str(
        "Conditionals, loops, functions, return, comparisons, arithmetic and property \
         access are forbidden. Reply with the program in a ```vibecode fenced block.",
    );
    brief
}

/// System prompt for a generating persona.
pub fn persona_system(persona: &Persona, profile: GrammarProfile) -> String {
    format!(
        "You are the {} of an app-design council. {}\n\n{}",
        persona.name,
        persona.bias,
        grammar_brief(profile)
    )
}

pub fn generation_user(intent: &str) -> String {
    format!("Intent:\n{intent}\n\nWrite the VibeCode program for this intent.")
}

pub fn evaluation_system() -> String {
    "You are an impartial reviewer of VibeCode programs. Score every proposal from 1 \
     to 10 on clarity, completeness, elegance and robustness. Reply with JSON only, \
     in exactly this shape:\n\
     {\"evaluations\": [{\"proposalIndex\": 0, \"scores\": {\"clarity\": 8, \
     \"completeness\": 7, \"elegance\": 8, \"robustness\": 6}, \"totalScore\": 29, \
     \"strengths\": [\"...\"], \"weaknesses\": [\"...\"]}], \"ranking\": [0], \
     \"recommendation\": \"...\"}\n\
     proposalIndex and ranking use the 0-based proposal numbers shown. Rank the best \
     proposal first; never rank an invalid proposal above a valid one."
        .to_string()
}

pub fn evaluation_user(intent: &str, candidates: &[Generation]) -> String {
    let mut out = format!("Intent:\n{intent}\n\nProposals:\n");
    for (i, g) in candidates.iter().enumerate() {
        let status = if g.is_valid() { "valid" } else { "INVALID" };
        let _ = write!(
            out,
            "\n### Proposal {i} ({}, {status})\n```vibecode\n{}\n```\n",
            g.persona_name, g.code
        );
        if !g.validation.errors.is_empty() {
            let _ = writeln!(out, "Validation errors: {}", g.validation.errors.join("; "));
        }
    }
    out
}

pub fn synthesis_system(chairman: &Persona, profile: GrammarProfile) -> String {
    persona_system(chairman, profile)
}

pub fn synthesis_user(intent: &str, candidates: &[Generation], stage2: &Stage2Result) -> String {
    let mut out = format!("Intent:\n{intent}\n\nRanked proposals (best first):\n");
    for (rank, &index) in stage2.ranking.iter().enumerate() {
        let Some(g) = candidates.get(index) else {
            continue;
        };
        let status = if g.is_valid() { "valid" } else { "INVALID" };
        let _ = write!(
            out,
            "\n### #{} - Proposal {index} by {} ({status})\n```vibecode\n{}\n```\n",
            rank + 1,
            g.persona_name,
            g.code
        );
        if let Some(eval) = stage2.evaluations.iter().find(|e| e.proposal_index == index) {
            let _ = writeln!(out, "Score: {}/40", eval.total_score);
            if !eval.strengths.is_empty() {
                let _ = writeln!(out, "Strengths: {}", eval.strengths.join("; "));
            }
            if !eval.weaknesses.is_empty() {
                let _ = writeln!(out, "Weaknesses: {}", eval.weaknesses.join("; "));
            }
        }
    }
    let _ = write!(
        out,
        "\nEvaluators' recommendation: {}\n\nWrite the single final program.",
        stage2.recommendation
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vibe_lang::Validation;

    fn generation(code: &str, valid: bool) -> Generation {
        Generation {
            persona_id: "p".into(),
            persona_name: "P".into(),
            code: code.into(),
            validation: if valid {
                Validation {
                    valid: true,
                    ..Validation::default()
                }
            } else {
                Validation::failed("Line 1: bad")
            },
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_brief_follows_profile() {
        let persona = Persona::direct();
        let fractional = persona_system(&persona, GrammarProfile::Fractional);
        assert!(fractional.contains("between 0 and 1"));
        assert!(!fractional.contains("on <EVENT>"));
        let events = persona_system(&persona, GrammarProfile::EventBlocks);
        assert!(events.contains("between 0 and 100"));
        assert!(events.contains("on <EVENT> {"));
    }

    #[test]
    fn test_evaluation_user_numbers_from_zero() {
        let prompt = evaluation_user(
            "a timer",
            &[generation("set state = RUNNING", true), generation("oops", false)],
        );
        assert!(prompt.contains("### Proposal 0 (P, valid)"));
        assert!(prompt.contains("### Proposal 1 (P, INVALID)"));
        assert!(prompt.contains("Validation errors: Line 1: bad"));
    }

    #[test]
    fn test_synthesis_user_follows_ranking() {
        let candidates = vec![generation("a", false), generation("b", true)];
        let stage2 = Stage2Result {
            evaluations: vec![],
            ranking: vec![1, 0],
            recommendation: "use b".into(),
        };
        let prompt = synthesis_user("x", &candidates, &stage2);
        let first = prompt.find("Proposal 1").unwrap();
        let second = prompt.find("Proposal 0").unwrap();
        assert!(first < second);
        assert!(prompt.contains("recommendation: use b"));
    }
}
