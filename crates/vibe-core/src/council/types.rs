//! Response shapes of a council run. All serialise in camelCase.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vibe_lang::Validation;

/// One persona's candidate program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub persona_id: String,
    pub persona_name: String,
    pub code: String,
    pub validation: Validation,
    pub timestamp: DateTime<Utc>,
}

impl Generation {
    pub fn is_valid(&self) -> bool {
        self.validation.valid
    }
}

/// Rubric scores, each in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(alias = "clareza")]
    pub clarity: u8,
    #[serde(alias = "completude")]
    pub completeness: u8,
    #[serde(alias = "elegancia")]
    pub elegance: u8,
    #[serde(alias = "robustez")]
    pub robustness: u8,
}

impl Scores {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    pub const NEUTRAL: u8 = 7;

    pub fn neutral() -> Self {
        Self::uniform(Self::NEUTRAL)
    }

    pub fn uniform(score: u8) -> Self {
        Self {
            clarity: score,
            completeness: score,
            elegance: score,
            robustness: score,
        }
    }

    pub fn total(&self) -> u32 {
        [self.clarity, self.completeness, self.elegance, self.robustness]
            .iter()
            .map(|&s| u32::from(s))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub proposal_index: usize,
    pub scores: Scores,
    pub total_score: u32,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

impl Evaluation {
    /// Neutral placeholder used when the evaluator said nothing usable.
    pub fn neutral(proposal_index: usize) -> Self {
        let scores = Scores::neutral();
        Self {
            proposal_index,
            total_score: scores.total(),
            scores,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage2Result {
    pub evaluations: Vec<Evaluation>,
    /// Always a permutation of the candidate indices, valid candidates first.
    pub ranking: Vec<usize>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage3Result {
    pub final_code: String,
    pub validation: Validation,
    /// Chairman id when the synthesis was accepted, otherwise
    /// [`FALLBACK_CHAIRMAN`] or the direct persona's id.
    pub chairman: String,
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
}

/// `chairman` value recorded when Stage 3 substituted a Stage 1 candidate.
pub const FALLBACK_CHAIRMAN: &str = "fallback";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Council,
    Direct,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Council => "council",
            Mode::Direct => "direct",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller of [`Council::run`](super::Council::run) always gets back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouncilResponse {
    pub conversation_id: String,
    pub stage1: Vec<Generation>,
    pub stage2: Stage2Result,
    pub stage3: Stage3Result,
    pub mode: Mode,
}
