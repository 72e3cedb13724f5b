//! Removal of module syntax. The scope injects every dependency, so
//! `import` and `export` have nothing left to do.

use super::ident::FALLBACK_COMPONENT;
use super::lexer::{Token, TokenKind};
use super::marked::Marked;

pub struct ModuleOutput {
    pub tokens: Vec<Token>,
    /// Identifier named by `export default`, if any.
    pub default_export: Option<String>,
}

pub fn strip_modules(tokens: Vec<Token>) -> ModuleOutput {
    let mut m = Marked::new(tokens);
    let mut default_export = None;
    let mut depth = 0i32;
    let mut i = 0;

    while i < m.len() {
        let top_level = depth == 0;
        if top_level && m.ident(i, "import") && !m.punct(i + 1, "(") && !m.punct(i + 1, ".") {
            let end = statement_end_at_specifier(&m, i);
            m.remove(i, end);
            i = end + 1;
            continue;
        }
        if top_level && m.ident(i, "export") {
            i = strip_export(&mut m, i, &mut default_export);
            continue;
        }
        if let Some(t) = m.get(i) {
            depth += super::marked::bracket_delta(t);
        }
        i += 1;
    }

    ModuleOutput {
        tokens: m.finish(),
        default_export,
    }
}

/// Returns the index to resume scanning from.
fn strip_export(m: &mut Marked, i: usize, default_export: &mut Option<String>) -> usize {
    if m.ident(i + 1, "default") {
        let next = i + 2;
        *default_export = default_name(m, next);
        if default_export.is_none() && next < m.len() {
            // Anonymous default export: bind it to the fallback name.
            m.remove(i, i);
            let binding = m.get(i + 1).map(fallback_binding).unwrap_or_default();
            m.replace(i + 1, binding);
            *default_export = Some(FALLBACK_COMPONENT.to_string());
        } else {
            m.remove(i, i + 1);
        }
        return next;
    }

    let braces = m.punct(i + 1, "{") || (m.ident(i + 1, "type") && m.punct(i + 2, "{"));
    if braces || m.punct(i + 1, "*") {
        let end = statement_end_at_specifier(m, i);
        m.remove(i, end);
        return end + 1;
    }

    m.remove(i, i);
    i + 1
}

/// `var App =`, positioned where `default` was.
fn fallback_binding(at: &Token) -> Vec<Token> {
    let token = |kind, text: &str| Token {
        kind,
        text: text.to_string(),
        line: at.line,
        column: at.column,
    };
    vec![
        token(TokenKind::Ident, "var"),
        token(TokenKind::Whitespace, " "),
        token(TokenKind::Ident, FALLBACK_COMPONENT),
        token(TokenKind::Whitespace, " "),
        token(TokenKind::Punct, "="),
    ]
}

fn default_name(m: &Marked, at: usize) -> Option<String> {
    let named_after = |kw: usize| {
        m.get(kw + 1)
            .filter(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text.clone())
    };
    if m.ident(at, "function") || m.ident(at, "class") {
        return named_after(at);
    }
    if m.ident(at, "async") && m.ident(at + 1, "function") {
        return named_after(at + 1);
    }
    let t = m.get(at)?;
    let ends_statement = at + 1 >= m.len() || m.punct(at + 1, ";") || m.newline_before(at + 1);
    (t.kind == TokenKind::Ident && ends_statement).then(|| t.text.clone())
}

/// End of an `import`/`export ... from` statement: the module specifier
/// string, plus a trailing `;`. Without a specifier the statement ends at
/// its closing `}` or `;`.
fn statement_end_at_specifier(m: &Marked, start: usize) -> usize {
    let mut i = start + 1;
    let mut end = start;
    while let Some(t) = m.get(i) {
        if t.kind == TokenKind::Str {
            end = i;
            break;
        }
        if t.is_punct("{") {
            let close = m.matching(i).unwrap_or(m.len() - 1);
            end = close;
            i = close + 1;
            if !m.ident(i, "from") {
                break;
            }
            continue;
        }
        if t.is_punct(";") {
            return i;
        }
        end = i;
        i += 1;
    }
    if m.punct(end + 1, ";") {
        end + 1
    } else {
        end
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn strip(src: &str) -> (String, Option<String>) {
        let out = strip_modules(tokenize(src).unwrap());
        let text = out.tokens.into_iter().map(|t| t.text).collect();
        (text, out.default_export)
    }

    #[test]
    fn test_imports_removed_lines_kept() {
        let (text, _) = strip(
            "import React, { useState } from 'react';\nimport './x.css'\nimport type { A } from \"a\";\nconst a = 1;",
        );
        assert_eq!(text.trim_start(), "const a = 1;");
        assert_eq!(text.matches('\n').count(), 3);
    }

    #[test]
    fn test_dynamic_import_kept() {
        let (text, _) = strip("const m = import('x');");
        assert_eq!(text, "const m = import('x');");
    }

    #[test]
    fn test_export_default_identifier() {
        let (text, name) = strip("function Widget() {}\nexport default Widget;");
        assert_eq!(name.as_deref(), Some("Widget"));
        assert_eq!(text, "function Widget() {}\n Widget;");
    }

    #[test]
    fn test_export_default_function() {
        let (text, name) = strip("export default function Panel() { return null; }");
        assert_eq!(name.as_deref(), Some("Panel"));
        assert_eq!(text.trim_start(), "function Panel() { return null; }");
    }

    #[test]
    fn test_anonymous_default_export_is_bound() {
        let (text, name) = strip("export default () => null;");
        assert_eq!(name.as_deref(), Some("App"));
        assert_eq!(text.trim_start(), "var App = () => null;");

        let (text, _) = strip("export default memo(Card);");
        assert_eq!(text.trim_start(), "var App = memo(Card);");
    }

    #[test]
    fn test_export_keyword_and_lists() {
        let (text, name) = strip("export const A = 1;\nexport { A as B };\nexport * from './c';");
        assert_eq!(name, None);
        assert_eq!(text.trim(), "const A = 1;");
    }
}
