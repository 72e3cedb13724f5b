//! Stage 2: cross-evaluation and ranking.

use serde_json::{Map, Value};
use vibe_gateway::ModelGateway;

use super::error::{CouncilError, CouncilResult};
use super::prompts;
use super::types::{Evaluation, Generation, Scores, Stage2Result};
use crate::metrics::METRICS;
use crate::obs;

pub const FALLBACK_RECOMMENDATION: &str =
    "Automatic evaluation unavailable; proposals keep their generation order with neutral scores.";

/// Score and rank `candidates`. Never fails: an unusable reply or a failed
/// call yields neutral scores. Whatever the model says, valid candidates
/// are ranked ahead of invalid ones.
pub async fn run_stage2(
    gateway: &dyn ModelGateway,
    intent: &str,
    candidates: &[Generation],
) -> Stage2Result {
    let n = candidates.len();
    let parsed = match gateway
        .complete(
            &prompts::evaluation_system(),
            &prompts::evaluation_user(intent, candidates),
        )
        .await
    {
        Ok(reply) => parse_evaluation(&reply, n),
        Err(err) => Err(CouncilError::EvaluationParse(format!(
            "evaluation call failed: {err}"
        ))),
    };

    let mut result = parsed.unwrap_or_else(|err| {
        obs::emit_fallback("stage2", &err);
        METRICS.inc_evaluation_fallbacks();
        fallback_stage2(n)
    });
    result.ranking = valid_first(&result.ranking, candidates);
    result
}

/// Uniform neutral scores in generation order.
pub fn fallback_stage2(n: usize) -> Stage2Result {
    Stage2Result {
        evaluations: (0..n).map(Evaluation::neutral).collect(),
        ranking: (0..n).collect(),
        recommendation: FALLBACK_RECOMMENDATION.to_string(),
    }
}

/// Lenient parse of an evaluator reply for `n` candidates.
///
/// Evaluations are completed to exactly one per candidate, scores clamped
/// to `1..=10`, totals recomputed, and the ranking turned into a
/// permutation of `0..n`.
pub fn parse_evaluation(reply: &str, n: usize) -> CouncilResult<Stage2Result> {
    let json = first_json_object(reply)
        .ok_or_else(|| CouncilError::EvaluationParse("no JSON object in reply".to_string()))?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| CouncilError::EvaluationParse(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| CouncilError::EvaluationParse("reply is not a JSON object".to_string()))?;

    let mut slots: Vec<Option<Evaluation>> = vec![None; n];
    if let Some(items) = obj.get("evaluations").and_then(Value::as_array) {
        for (pos, item) in items.iter().enumerate() {
            let index = item.get("proposalIndex").and_then(as_index).unwrap_or(pos);
            match slots.get_mut(index) {
                Some(slot) if slot.is_none() => *slot = Some(read_evaluation(item, index)),
                _ => {}
            }
        }
    }
    let evaluations = slots
        .into_iter()
        .enumerate()
        .map(|(i, e)| e.unwrap_or_else(|| Evaluation::neutral(i)))
        .collect();

    let raw_ranking: Vec<usize> = obj
        .get("ranking")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(as_index).collect())
        .unwrap_or_default();

    let recommendation = obj
        .get("recommendation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(Stage2Result {
        evaluations,
        ranking: complete_permutation(&raw_ranking, n),
        recommendation,
    })
}

fn as_index(v: &Value) -> Option<usize> {
    match v {
        Value::Number(n) => match n.as_u64() {
            Some(u) => usize::try_from(u).ok(),
            None => n
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as usize),
        },
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn read_evaluation(item: &Value, index: usize) -> Evaluation {
    let empty = Map::new();
    let scores = item
        .get("scores")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let dim = |english: &str, portuguese: &str| {
        scores
            .get(english)
            .or_else(|| scores.get(portuguese))
            .and_then(Value::as_f64)
            .map(clamp_score)
            .unwrap_or(Scores::NEUTRAL)
    };
    let scores = Scores {
        clarity: dim("clarity", "clareza"),
        completeness: dim("completeness", "completude"),
        elegance: dim("elegance", "elegancia"),
        robustness: dim("robustness", "robustez"),
    };
    Evaluation {
        proposal_index: index,
        total_score: scores.total(),
        scores,
        strengths: string_list(item.get("strengths")),
        weaknesses: string_list(item.get("weaknesses")),
    }
}

fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return Scores::NEUTRAL;
    }
    raw.round()
        .clamp(f64::from(Scores::MIN), f64::from(Scores::MAX)) as u8
}

fn string_list(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Deduplicate, drop out-of-range indices and append the missing ones in
/// ascending order.
pub fn complete_permutation(raw: &[usize], n: usize) -> Vec<usize> {
    let mut seen = vec![false; n];
    let mut out = Vec::with_capacity(n);
    for &i in raw {
        if i < n && !seen[i] {
            seen[i] = true;
            out.push(i);
        }
    }
    out.extend((0..n).filter(|&i| !seen[i]));
    out
}

/// Stable partition: valid candidates first, each group in input order.
pub fn valid_first(ranking: &[usize], candidates: &[Generation]) -> Vec<usize> {
    let is_valid = |i: &usize| candidates.get(*i).is_some_and(Generation::is_valid);
    let (valid, invalid): (Vec<usize>, Vec<usize>) = ranking.iter().copied().partition(|i| is_valid(i));
    valid.into_iter().chain(invalid).collect()
}

/// The first balanced `{...}` in `text`, skipping braces inside strings.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vibe_lang::Validation;

    fn candidate(valid: bool) -> Generation {
        Generation {
            persona_id: "p".into(),
            persona_name: "P".into(),
            code: String::new(),
            validation: if valid {
                Validation {
                    valid: true,
                    ..Validation::default()
                }
            } else {
                Validation::failed("bad")
            },
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_first_json_object_skips_string_braces() {
        let text = r#"Here you go: {"a": "}{", "b": {"c": 1}} trailing {"#;
        assert_eq!(
            first_json_object(text),
            Some(r#"{"a": "}{", "b": {"c": 1}}"#)
        );
        assert_eq!(first_json_object("no json"), None);
        assert_eq!(first_json_object("{ unclosed"), None);
    }

    #[test]
    fn test_permutation_completion() {
        assert_eq!(complete_permutation(&[2, 2, 9, 0], 4), vec![2, 0, 1, 3]);
        assert_eq!(complete_permutation(&[], 3), vec![0, 1, 2]);
    }

    #[test]
    fn test_valid_first_is_stable() {
        let candidates = vec![candidate(false), candidate(true), candidate(false), candidate(true)];
        assert_eq!(valid_first(&[0, 1, 2, 3], &candidates), vec![1, 3, 0, 2]);
        assert_eq!(valid_first(&[3, 2, 1, 0], &candidates), vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_parse_normalises_scores_and_missing_entries() {
        let reply = r#"```json
{"evaluations": [
  {"proposalIndex": 1, "scores": {"clareza": 12, "completude": 0, "elegancia": 8.4}, "strengths": "short"},
  {"proposalIndex": 1, "scores": {"clarity": 1}}
], "ranking": [1], "recommendation": "pick 1"}
```"#;
        let result = parse_evaluation(reply, 3).unwrap();
        assert_eq!(result.evaluations.len(), 3);
        let e1 = &result.evaluations[1];
        assert_eq!(e1.scores, Scores { clarity: 10, completeness: 1, elegance: 8, robustness: 7 });
        assert_eq!(e1.total_score, 26);
        assert_eq!(e1.strengths, vec!["short".to_string()]);
        assert_eq!(result.evaluations[0], Evaluation::neutral(0));
        assert_eq!(result.ranking, vec![1, 0, 2]);
        assert_eq!(result.recommendation, "pick 1");
    }

    #[test]
    fn test_parse_without_json_is_an_error() {
        let err = parse_evaluation("I liked them all.", 2).unwrap_err();
        assert!(matches!(err, CouncilError::EvaluationParse(_)));
    }

    #[test]
    fn test_fallback_is_neutral_identity() {
        let result = fallback_stage2(3);
        assert_eq!(result.ranking, vec![0, 1, 2]);
        assert!(result.evaluations.iter().all(|e| e.total_score == 28));
    }
}
