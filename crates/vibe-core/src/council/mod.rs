//! The council: persona generation, cross-evaluation and synthesis.
//!
//! [`Council::run`] always returns one [`CouncilResponse`] per intent. Every
//! stage has a deterministic substitute for model failures, so the only
//! error a caller sees is [`CouncilError::EmptyIntent`].

mod error;
mod evaluation;
mod extract;
mod generation;
mod personas;
mod pipeline;
mod prompts;
mod synthesis;
mod types;

pub use error::{CouncilError, CouncilResult};
pub use evaluation::{
    complete_permutation, fallback_stage2, first_json_object, parse_evaluation, run_stage2,
    valid_first, FALLBACK_RECOMMENDATION,
};
pub use extract::extract_program;
pub use generation::{generate_one, run_stage1};
pub use personas::Persona;
pub use pipeline::{Council, DIRECT_RECOMMENDATION};
pub use synthesis::{fallback_stage3, run_stage3, NO_PROPOSALS_CODE};
pub use types::{
    CouncilResponse, Evaluation, Generation, Mode, Scores, Stage2Result, Stage3Result,
    FALLBACK_CHAIRMAN,
};
