//! Best-effort line/column recovery from free-form error messages.

use std::sync::OnceLock;

use regex::Regex;

struct Patterns {
    paren: Regex,
    words: Regex,
    colon: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        #[allow(clippy::expect_used)]
        let compile = |re: &str| Regex::new(re).expect("diagnostic pattern is valid");
        Patterns {
            paren: compile(r"\((\d+):(\d+)\)"),
            words: compile(r"(?i)\bline (\d+)(?:,?\s*col(?:umn)? (\d+))?"),
            colon: compile(r":(\d+):(\d+)\b"),
        }
    })
}

/// `(line, column)` named in `message`, 1-based. The column is optional.
pub fn locate(message: &str) -> Option<(usize, Option<usize>)> {
    let p = patterns();
    for re in [&p.paren, &p.words, &p.colon] {
        if let Some(caps) = re.captures(message) {
            let line = caps.get(1)?.as_str().parse().ok()?;
            let column = caps.get(2).and_then(|c| c.as_str().parse().ok());
            return Some((line, column));
        }
    }
    None
}

/// The 1-based `line` of `source`, if it exists and is not blank.
pub fn source_line(source: &str, line: usize) -> Option<String> {
    let text = source.lines().nth(line.checked_sub(1)?)?;
    (!text.trim().is_empty()).then(|| text.to_string())
}
