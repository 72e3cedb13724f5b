//! Grammar profiles.
//!
//! Two incompatible dialects of VibeCode exist. They are kept apart as a
//! parameter of the parser rather than unified:
//!
//! - [`GrammarProfile::Fractional`]: friction is a decimal in `[0, 1]`, there
//!   are no event blocks.
//! - [`GrammarProfile::EventBlocks`]: friction is an integer in `[0, 100]`,
//!   statements may be grouped into `on <EVENT> { ... }` blocks (at least one
//!   is required) and a stricter forbidden-keyword list applies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrammarProfile {
    #[default]
    Fractional,
    EventBlocks,
}

impl GrammarProfile {
    /// Upper bound of the friction domain; the lower bound is always 0.
    pub fn max_friction(self) -> f64 {
        match self {
            GrammarProfile::Fractional => 1.0,
            GrammarProfile::EventBlocks => 100.0,
        }
    }

    pub fn allows_event_blocks(self) -> bool {
        matches!(self, GrammarProfile::EventBlocks)
    }

    /// Human-readable friction domain used in diagnostics.
    pub fn friction_domain(self) -> &'static str {
        match self {
            GrammarProfile::Fractional => "a number between 0 and 1",
            GrammarProfile::EventBlocks => "an integer between 0 and 100",
        }
    }

    /// Parse a friction literal in this profile's domain.
    ///
    /// Returns `None` for malformed literals and for values out of range.
    pub fn parse_friction(self, literal: &str) -> Option<f64> {
        match self {
            GrammarProfile::Fractional => {
                let digits_and_one_dot = literal.chars().all(|c| c.is_ascii_digit() || c == '.')
                    && literal.matches('.').count() <= 1
                    && literal.chars().any(|c| c.is_ascii_digit());
                if !digits_and_one_dot {
                    return None;
                }
                let value: f64 = literal.parse().ok()?;
                (0.0..=1.0).contains(&value).then_some(value)
            }
            GrammarProfile::EventBlocks => {
                if !literal.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                let value: u32 = literal.parse().ok()?;
                (value <= 100).then_some(f64::from(value))
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GrammarProfile::Fractional => "fractional",
            GrammarProfile::EventBlocks => "event_blocks",
        }
    }
}

impl fmt::Display for GrammarProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrammarProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fractional" => Ok(GrammarProfile::Fractional),
            "event_blocks" | "events" => Ok(GrammarProfile::EventBlocks),
            other => Err(format!("unknown grammar profile: {other}")),
        }
    }
}
