//! Council pipeline configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vibe_lang::GrammarProfile;

/// Pause between sequential persona calls, to stay under shared rate limits.
pub const DEFAULT_PERSONA_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {key}: {value}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

/// How Stage 1 schedules its persona calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GenerationMode {
    /// One persona at a time, sleeping `delay_ms` between calls.
    Sequential { delay_ms: u64 },
    /// All personas at once.
    Parallel,
}

impl GenerationMode {
    pub fn delay(&self) -> Option<Duration> {
        match self {
            GenerationMode::Sequential { delay_ms } if *delay_ms > 0 => {
                Some(Duration::from_millis(*delay_ms))
            }
            _ => None,
        }
    }
}

impl Default for GenerationMode {
    fn default() -> Self {
        GenerationMode::Sequential {
            delay_ms: DEFAULT_PERSONA_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilConfig {
    /// Dialect every candidate is validated against.
    pub profile: GrammarProfile,
    pub generation: GenerationMode,
    /// Recorded as `chairman` when the synthesis is accepted.
    pub chairman_id: String,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            profile: GrammarProfile::default(),
            generation: GenerationMode::default(),
            chairman_id: "chairman".to_string(),
        }
    }
}

impl CouncilConfig {
    /// Reads `VIBE_PROFILE`, `COUNCIL_PARALLEL`, `COUNCIL_PERSONA_DELAY_MS`
    /// and `COUNCIL_CHAIRMAN_ID` on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = non_empty("VIBE_PROFILE") {
            config.profile = raw.parse().map_err(|_| ConfigError {
                key: "VIBE_PROFILE",
                value: raw.clone(),
            })?;
        }

        let parallel = match non_empty("COUNCIL_PARALLEL") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError {
                key: "COUNCIL_PARALLEL",
                value: raw,
            })?,
            None => false,
        };

        config.generation = if parallel {
            GenerationMode::Parallel
        } else {
            let delay_ms = match non_empty("COUNCIL_PERSONA_DELAY_MS") {
                Some(raw) => raw.trim().parse().map_err(|_| ConfigError {
                    key: "COUNCIL_PERSONA_DELAY_MS",
                    value: raw.clone(),
                })?,
                None => DEFAULT_PERSONA_DELAY_MS,
            };
            GenerationMode::Sequential { delay_ms }
        };

        if let Some(id) = non_empty("COUNCIL_CHAIRMAN_ID") {
            config.chairman_id = id;
        }
        Ok(config)
    }

    pub fn with_profile(mut self, profile: GrammarProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_generation(mut self, generation: GenerationMode) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_chairman_id(mut self, id: impl Into<String>) -> Self {
        self.chairman_id = id.into();
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CouncilConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CouncilConfig::default());
        assert_eq!(
            config.generation.delay(),
            Some(Duration::from_millis(DEFAULT_PERSONA_DELAY_MS))
        );
    }

    #[test]
    fn test_parallel_and_profile() {
        let config = CouncilConfig::from_lookup(lookup(&[
            ("COUNCIL_PARALLEL", "true"),
            ("VIBE_PROFILE", "event_blocks"),
            ("COUNCIL_CHAIRMAN_ID", "lead"),
        ]))
        .unwrap();
        assert_eq!(config.generation, GenerationMode::Parallel);
        assert_eq!(config.profile, GrammarProfile::EventBlocks);
        assert_eq!(config.chairman_id, "lead");
        assert_eq!(config.generation.delay(), None);
    }

    #[test]
    fn test_zero_delay_means_no_sleep() {
        let config =
            CouncilConfig::from_lookup(lookup(&[("COUNCIL_PERSONA_DELAY_MS", "0")])).unwrap();
        assert_eq!(config.generation, GenerationMode::Sequential { delay_ms: 0 });
        assert_eq!(config.generation.delay(), None);
    }

    #[test]
    fn test_bad_values_rejected() {
        let err = CouncilConfig::from_lookup(lookup(&[("COUNCIL_PARALLEL", "maybe")])).unwrap_err();
        assert_eq!(err.key, "COUNCIL_PARALLEL");
        let err =
            CouncilConfig::from_lookup(lookup(&[("COUNCIL_PERSONA_DELAY_MS", "soon")])).unwrap_err();
        assert_eq!(err.key, "COUNCIL_PERSONA_DELAY_MS");
        assert!(CouncilConfig::from_lookup(lookup(&[("VIBE_PROFILE", "xml")])).is_err());
    }
}
