//! The five VibeCode states and the fixed transition table between them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownState;

/// Lifecycle state of a generated app.
///
/// There is no terminal state: both `Done` and `Error` lead back to
/// `Candidate`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    #[default]
    Candidate,
    Running,
    Cooling,
    Done,
    Error,
}

/// Directed edges `(from, to)`. Exactly eight; nothing else is reachable.
pub const TRANSITIONS: [(State, State); 8] = [
    (State::Candidate, State::Running),
    (State::Running, State::Cooling),
    (State::Running, State::Error),
    (State::Cooling, State::Running),
    (State::Cooling, State::Done),
    (State::Cooling, State::Error),
    (State::Error, State::Candidate),
    (State::Done, State::Candidate),
];

impl State {
    pub const ALL: [State; 5] = [
        State::Candidate,
        State::Running,
        State::Cooling,
        State::Done,
        State::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            State::Candidate => "CANDIDATE",
            State::Running => "RUNNING",
            State::Cooling => "COOLING",
            State::Done => "DONE",
            State::Error => "ERROR",
        }
    }

    /// Pure lookup against [`TRANSITIONS`].
    pub fn can_transition_to(self, target: State) -> bool {
        TRANSITIONS
            .iter()
            .any(|&(from, to)| from == self && to == target)
    }

    /// Outgoing edges from this state, in table order.
    pub fn successors(self) -> Vec<State> {
        TRANSITIONS
            .iter()
            .filter(|(from, _)| *from == self)
            .map(|&(_, to)| to)
            .collect()
    }

    /// Display colour used by preview chrome for this state.
    pub fn color(self) -> &'static str {
        match self {
            State::Candidate => "hsl(var(--muted))",
            State::Running => "hsl(var(--primary))",
            State::Cooling => "hsl(var(--accent))",
            State::Done => "hsl(142 76% 36%)",
            State::Error => "hsl(var(--destructive))",
        }
    }

    /// Comma separated list of every state name, for diagnostics.
    pub fn names() -> String {
        State::ALL
            .iter()
            .map(State::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for State {
    type Err = UnknownState;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        State::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == upper)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}
