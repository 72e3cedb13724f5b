use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouncilError {
    #[error("intent must not be empty")]
    EmptyIntent,

    /// The evaluator's reply held no usable JSON. Recovered with neutral
    /// scores.
    #[error("evaluation reply could not be parsed: {0}")]
    EvaluationParse(String),

    /// The chairman's program failed validation or the call failed.
    /// Recovered with the best-ranked valid candidate.
    #[error("synthesis rejected: {0}")]
    SynthesisInvalid(String),
}

pub type CouncilResult<T> = std::result::Result<T, CouncilError>;
