//! The council's voices.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    /// Design bias, prepended to the shared grammar brief.
    pub bias: String,
}

impl Persona {
    pub fn new(id: impl Into<String>, name: impl Into<String>, bias: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bias: bias.into(),
        }
    }

    /// The four default personas, in stage order.
    pub fn council() -> Vec<Persona> {
        vec![
            Persona::new(
                "creative",
                "Creative Architect",
                "You favour expressive, surprising experiences. Use every state the \
                 grammar offers when it serves the intent, and let friction tell a story.",
            ),
            Persona::new(
                "conservative",
                "Conservative Engineer",
                "You favour the smallest program that satisfies the intent. Prefer a \
                 single clear initial state and avoid friction unless the intent needs it.",
            ),
            Persona::new(
                "efficient",
                "Performance Optimizer",
                "You favour programs with few statements and no redundant friction \
                 changes. Every line must earn its place.",
            ),
            Persona::new(
                "robust",
                "Resilience Architect",
                "You favour programs that behave well when things go wrong. Plan for the \
                 ERROR and COOLING states and keep friction within safe bounds.",
            ),
        ]
    }

    /// Synthesises the ranked candidates into one program.
    pub fn chairman(id: impl Into<String>) -> Persona {
        Persona::new(
            id,
            "Council Chairman",
            "You chair a council of engineers. Combine the strengths of the ranked \
             proposals into one final program, preferring valid proposals and the \
             evaluators' recommendation.",
        )
    }

    /// Single-shot persona used by direct mode.
    pub fn direct() -> Persona {
        Persona::new(
            "direct",
            "Direct Generator",
            "You write one complete, valid program for the intent in a single pass.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_council_ids_are_distinct() {
        let personas = Persona::council();
        let mut ids: Vec<_> = personas.iter().map(|p| p.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids, vec!["creative", "conservative", "efficient", "robust"]);
    }
}
