//! Line-oriented VibeCode parser and validator.
//!
//! Grammar (case-insensitive keywords, `//` and `#` line comments, blank
//! lines ignored):
//!
//! ```text
//! set state = <STATE>
//! set friction = <NUMBER>
//! increase friction by <NUMBER>
//! on <EVENT> {          (EventBlocks profile only)
//! }
//! ```
//!
//! Anything else is rejected, either with the name of the forbidden
//! construct it contains or as an unrecognized command.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::{GrammarError, GrammarRule};
use crate::profile::GrammarProfile;
use crate::program::{ParsedProgram, Token, TokenKind, TokenValue, Validation};
use crate::state::State;

const NO_STATE_WARNING: &str = "No state declaration found. Defaulting to CANDIDATE.";
const NO_FRICTION_WARNING: &str = "No friction declaration found. Defaulting to 0.";

struct Statements {
    set_state: Regex,
    set_friction: Regex,
    increase_friction: Regex,
    open_block: Regex,
}

struct ForbiddenRule {
    name: &'static str,
    pattern: Regex,
}

fn statements() -> &'static Statements {
    static STATEMENTS: OnceLock<Statements> = OnceLock::new();
    STATEMENTS.get_or_init(|| Statements {
        set_state: compile(r"(?i)^set\s+state\s*=\s*(\w+)$"),
        set_friction: compile(r"(?i)^set\s+friction\s*=\s*([\d.]+)$"),
        increase_friction: compile(r"(?i)^increase\s+friction\s+by\s+([\d.]+)$"),
        open_block: compile(r"(?i)^on\s+([A-Za-z_]\w*)\s*\{$"),
    })
}

const BASE_RULES: &[(&str, &str)] = &[
    ("if statement", r"(?i)\bif\b"),
    ("else statement", r"(?i)\belse\b"),
    ("for loop", r"(?i)\bfor\b"),
    ("while loop", r"(?i)\bwhile\b"),
    ("function declaration", r"(?i)\bfunction\b"),
    ("return statement", r"(?i)\breturn\b"),
    ("cell keyword", r"(?i)\bcell\b"),
    ("trigger keyword", r"(?i)\btrigger\b"),
    ("when keyword", r"(?i)\bwhen\b"),
    ("comparison operator", r"==|!=|<=|>=|<|>"),
    ("property access", r"\b[A-Za-z_]\w*\.[A-Za-z_]"),
    ("mathematical operation", r"[+\-*/]"),
];

const STRICT_RULES: &[(&str, &str)] = &[
    ("variable declaration", r"(?i)\b(let|const|var)\b"),
    ("class declaration", r"(?i)\bclass\b"),
    ("module import", r"(?i)\bimport\b"),
    ("module export", r"(?i)\bexport\b"),
    ("async keyword", r"(?i)\basync\b"),
    ("await keyword", r"(?i)\bawait\b"),
];

fn forbidden_rules(profile: GrammarProfile) -> &'static [ForbiddenRule] {
    static BASE: OnceLock<Vec<ForbiddenRule>> = OnceLock::new();
    static STRICT: OnceLock<Vec<ForbiddenRule>> = OnceLock::new();

    let build = |tables: &[&[(&'static str, &str)]]| -> Vec<ForbiddenRule> {
        tables
            .iter()
            .flat_map(|table| table.iter())
            .map(|&(name, pattern)| ForbiddenRule {
                name,
                pattern: compile(pattern),
            })
            .collect()
    };

    match profile {
        GrammarProfile::Fractional => BASE.get_or_init(|| build(&[BASE_RULES])),
        GrammarProfile::EventBlocks => STRICT.get_or_init(|| build(&[BASE_RULES, STRICT_RULES])),
    }
}

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    // Patterns are compile-time constants covered by the unit tests below.
    Regex::new(pattern).expect("static grammar pattern must compile")
}

/// Parse with the default ([`GrammarProfile::Fractional`]) profile.
pub fn parse(source: &str) -> ParsedProgram {
    parse_with(source, GrammarProfile::Fractional)
}

/// Parse `source` under the given grammar profile.
///
/// Deterministic: the same input always yields an equal `ParsedProgram`.
pub fn parse_with(source: &str, profile: GrammarProfile) -> ParsedProgram {
    let mut builder = ProgramBuilder::new(profile);
    for (index, raw) in source.lines().enumerate() {
        builder.line(index + 1, raw.trim());
    }
    builder.finish()
}

/// `{valid, errors, warnings}` projection of [`parse`].
pub fn validate(source: &str) -> Validation {
    parse(source).validation()
}

/// `{valid, errors, warnings}` projection of [`parse_with`].
pub fn validate_with(source: &str, profile: GrammarProfile) -> Validation {
    parse_with(source, profile).validation()
}

struct ProgramBuilder {
    profile: GrammarProfile,
    tokens: Vec<Token>,
    diagnostics: Vec<GrammarError>,
    initial_state: Option<State>,
    initial_friction: Option<f64>,
    increments: Vec<f64>,
    events: Vec<String>,
    open_block: Option<(String, usize)>,
}

impl ProgramBuilder {
    fn new(profile: GrammarProfile) -> Self {
        Self {
            profile,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            initial_state: None,
            initial_friction: None,
            increments: Vec::new(),
            events: Vec::new(),
            open_block: None,
        }
    }

    fn line(&mut self, line_no: usize, line: &str) {
        if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
            return;
        }

        if self.profile.allows_event_blocks() && self.block_delimiter(line_no, line) {
            return;
        }

        let grammar = statements();

        if let Some(caps) = grammar.set_state.captures(line) {
            let raw = &caps[1];
            match raw.parse::<State>() {
                Ok(state) => {
                    if self.at_top_level() && self.initial_state.is_none() {
                        self.initial_state = Some(state);
                    }
                    self.push(TokenKind::SetState, TokenValue::State(state), line_no);
                }
                Err(_) => self.error(
                    line_no,
                    GrammarRule::InvalidState {
                        value: raw.to_string(),
                        valid: State::names(),
                    },
                ),
            }
            return;
        }

        if let Some(caps) = grammar.set_friction.captures(line) {
            match self.profile.parse_friction(&caps[1]) {
                Some(value) => {
                    if self.at_top_level() && self.initial_friction.is_none() {
                        self.initial_friction = Some(value);
                    }
                    self.push(TokenKind::SetFriction, TokenValue::Number(value), line_no);
                }
                None => self.error(
                    line_no,
                    GrammarRule::FrictionOutOfRange {
                        domain: self.profile.friction_domain().to_string(),
                    },
                ),
            }
            return;
        }

        if let Some(caps) = grammar.increase_friction.captures(line) {
            match self.profile.parse_friction(&caps[1]) {
                Some(value) => {
                    self.increments.push(value);
                    self.push(
                        TokenKind::IncreaseFriction,
                        TokenValue::Number(value),
                        line_no,
                    );
                }
                None => self.error(
                    line_no,
                    GrammarRule::IncrementOutOfRange {
                        domain: self.profile.friction_domain().to_string(),
                    },
                ),
            }
            return;
        }

        self.reject(line_no, line);
    }

    /// Handles `on <EVENT> {` and `}`. Returns `true` if the line was one.
    fn block_delimiter(&mut self, line_no: usize, line: &str) -> bool {
        if line == "}" {
            if self.open_block.take().is_none() {
                self.error(line_no, GrammarRule::UnmatchedBrace);
            }
            return true;
        }

        let Some(caps) = statements().open_block.captures(line) else {
            return false;
        };
        let event = caps[1].to_string();
        match &self.open_block {
            Some((outer, _)) => {
                let outer = outer.clone();
                self.error(
                    line_no,
                    GrammarRule::NestedEventBlock {
                        inner: event,
                        outer,
                    },
                );
            }
            None => {
                self.events.push(event.clone());
                self.open_block = Some((event, line_no));
            }
        }
        true
    }

    /// Reports every forbidden construct on the line, or an unrecognized
    /// command if there is none.
    fn reject(&mut self, line_no: usize, line: &str) {
        let mut matched = false;
        for rule in forbidden_rules(self.profile) {
            if rule.pattern.is_match(line) {
                matched = true;
                self.error(
                    line_no,
                    GrammarRule::ForbiddenPattern {
                        pattern: rule.name.to_string(),
                    },
                );
            }
        }
        if !matched {
            self.error(
                line_no,
                GrammarRule::UnrecognizedCommand {
                    text: line.to_string(),
                },
            );
        }
    }

    fn at_top_level(&self) -> bool {
        self.open_block.is_none()
    }

    fn push(&mut self, kind: TokenKind, value: TokenValue, line: usize) {
        self.tokens.push(Token {
            kind,
            value,
            line,
            event: self.open_block.as_ref().map(|(name, _)| name.clone()),
        });
    }

    fn error(&mut self, line: usize, rule: GrammarRule) {
        self.diagnostics.push(GrammarError::at(line, rule));
    }

    fn finish(mut self) -> ParsedProgram {
        if self.profile.allows_event_blocks() {
            if let Some((event, line)) = self.open_block.take() {
                self.error(line, GrammarRule::UnclosedEventBlock { event });
            }
            if self.events.is_empty() {
                self.diagnostics
                    .push(GrammarError::program(GrammarRule::MissingEventBlock));
            }
        }

        let mut warnings = Vec::new();
        if self.initial_state.is_none() {
            warnings.push(NO_STATE_WARNING.to_string());
        }
        if self.initial_friction.is_none() {
            warnings.push(NO_FRICTION_WARNING.to_string());
        }

        let errors: Vec<String> = self.diagnostics.iter().map(ToString::to_string).collect();
        debug!(
            profile = %self.profile,
            tokens = self.tokens.len(),
            errors = errors.len(),
            warnings = warnings.len(),
            "parsed vibecode"
        );

        ParsedProgram {
            profile: self.profile,
            tokens: self.tokens,
            initial_state: self.initial_state.unwrap_or_default(),
            initial_friction: self.initial_friction.unwrap_or(0.0),
            friction_increments: self.increments,
            events: self.events,
            is_valid: errors.is_empty(),
            errors,
            warnings,
            diagnostics: self.diagnostics,
        }
    }
}
