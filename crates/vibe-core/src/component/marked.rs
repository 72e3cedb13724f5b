//! Token stream view that skips trivia and supports marking ranges for
//! removal. Line breaks inside removed ranges survive, so line numbers of
//! later tokens do not move.

use std::collections::HashMap;

use super::lexer::{Token, TokenKind};

pub(crate) struct Marked {
    tokens: Vec<Token>,
    sig: Vec<usize>,
    removed: Vec<bool>,
    replacements: HashMap<usize, Vec<Token>>,
}

impl Marked {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        let sig = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_trivia())
            .map(|(i, _)| i)
            .collect();
        let removed = vec![false; tokens.len()];
        Self {
            tokens,
            sig,
            removed,
            replacements: HashMap::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.sig.len()
    }

    pub(crate) fn get(&self, i: usize) -> Option<&Token> {
        self.sig.get(i).map(|&raw| &self.tokens[raw])
    }

    pub(crate) fn punct(&self, i: usize, p: &str) -> bool {
        self.get(i).is_some_and(|t| t.is_punct(p))
    }

    pub(crate) fn ident(&self, i: usize, name: &str) -> bool {
        self.get(i).is_some_and(|t| t.is_ident(name))
    }

    pub(crate) fn is_any_ident(&self, i: usize) -> bool {
        self.get(i).is_some_and(|t| t.kind == TokenKind::Ident)
    }

    pub(crate) fn is_removed(&self, i: usize) -> bool {
        self.sig.get(i).is_some_and(|&raw| self.removed[raw])
    }

    /// Mark significant tokens `from..=to` and the trivia between them.
    pub(crate) fn remove(&mut self, from: usize, to: usize) {
        if from > to || to >= self.sig.len() {
            return;
        }
        for raw in self.sig[from]..=self.sig[to] {
            self.removed[raw] = true;
        }
    }

    /// Like [`Marked::remove`], also dropping same-line trivia before `from`.
    pub(crate) fn remove_with_leading_space(&mut self, from: usize, to: usize) {
        if from > 0 && from < self.sig.len() && !self.newline_before(from) {
            for raw in self.sig[from - 1] + 1..self.sig[from] {
                self.removed[raw] = true;
            }
        }
        self.remove(from, to);
    }

    /// No trivia between `i - 1` and `i`.
    pub(crate) fn adjacent(&self, i: usize) -> bool {
        i > 0 && i < self.sig.len() && self.sig[i] == self.sig[i - 1] + 1
    }

    pub(crate) fn newline_before(&self, i: usize) -> bool {
        if i == 0 {
            return true;
        }
        let Some(&end) = self.sig.get(i) else {
            return true;
        };
        self.tokens[self.sig[i - 1] + 1..end]
            .iter()
            .any(Token::has_newline)
    }

    pub(crate) fn at_statement_start(&self, i: usize) -> bool {
        if i == 0 {
            return true;
        }
        let Some(prev) = self.get(i - 1) else {
            return false;
        };
        if prev.kind == TokenKind::Punct {
            return matches!(prev.text.as_str(), ";" | "{" | "}")
                || (self.newline_before(i) && matches!(prev.text.as_str(), ")" | "]"));
        }
        self.newline_before(i)
    }

    /// Index of the bracket closing the `(`, `[` or `{` at `open`.
    pub(crate) fn matching(&self, open: usize) -> Option<usize> {
        let mut depth = 0i32;
        for i in open..self.sig.len() {
            depth += bracket_delta(self.get(i)?);
            if depth == 0 {
                return Some(i);
            }
        }
        None
    }

    /// Index of the `>` closing the `<` at `open`. A `>>` closing two levels
    /// at once counts for both.
    pub(crate) fn matching_angle(&self, open: usize) -> Option<usize> {
        let mut depth = 0i32;
        for i in open..self.sig.len() {
            let t = self.get(i)?;
            if t.kind == TokenKind::Punct {
                match t.text.as_str() {
                    "<" => depth += 1,
                    ">" => depth -= 1,
                    ">>" => depth -= 2,
                    ">>>" => depth -= 3,
                    ";" | "{" | "}" | "=" | "&&" | "||" => return None,
                    _ => {}
                }
            }
            if depth <= 0 {
                return Some(i);
            }
        }
        None
    }

    /// Emit `with` in place of significant token `i`.
    pub(crate) fn replace(&mut self, i: usize, with: Vec<Token>) {
        if let Some(&raw) = self.sig.get(i) {
            self.replacements.insert(raw, with);
        }
    }

    pub(crate) fn finish(mut self) -> Vec<Token> {
        let mut out = Vec::with_capacity(self.tokens.len());
        for (raw, (t, removed)) in self.tokens.into_iter().zip(self.removed).enumerate() {
            if let Some(with) = self.replacements.remove(&raw) {
                out.extend(with);
                continue;
            }
            if !removed {
                out.push(t);
                continue;
            }
            let breaks = t.text.matches('\n').count();
            if breaks > 0 {
                out.push(Token {
                    kind: TokenKind::Whitespace,
                    text: "\n".repeat(breaks),
                    ..t
                });
            }
        }
        out
    }
}

pub(crate) fn bracket_delta(t: &Token) -> i32 {
    if t.kind != TokenKind::Punct {
        return 0;
    }
    match t.text.as_str() {
        "(" | "[" | "{" => 1,
        ")" | "]" | "}" => -1,
        _ => 0,
    }
}

/// Like [`bracket_delta`] but also counting angle brackets, for use inside
/// type positions only.
pub(crate) fn type_delta(t: &Token) -> i32 {
    if t.kind != TokenKind::Punct {
        return 0;
    }
    match t.text.as_str() {
        "<" => 1,
        ">" => -1,
        ">>" => -2,
        ">>>" => -3,
        _ => bracket_delta(t),
    }
}
