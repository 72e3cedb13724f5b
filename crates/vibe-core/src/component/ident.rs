//! Component name detection.

use super::lexer::{Token, TokenKind};
use super::marked::{bracket_delta, Marked};

pub const FALLBACK_COMPONENT: &str = "App";

/// Name of the component the wrapped program returns.
///
/// In priority order: the `export default` identifier, the first top-level
/// `function Name`, the first top-level `const|let|var Name =` bound to an
/// arrow, function or class expression, and finally `App`.
pub fn component_name(tokens: &[Token], default_export: Option<&str>) -> String {
    if let Some(name) = default_export {
        return name.to_string();
    }

    let m = Marked::new(tokens.to_vec());
    let mut depth = 0;
    let mut binding = None;

    for i in 0..m.len() {
        let Some(t) = m.get(i) else {
            break;
        };
        if depth == 0 {
            if t.is_ident("function") {
                let name_at = if m.punct(i + 1, "*") { i + 2 } else { i + 1 };
                if let Some(name) = ident_text(&m, name_at) {
                    return name;
                }
            }
            if binding.is_none()
                && (t.is_ident("const") || t.is_ident("let") || t.is_ident("var"))
                && m.punct(i + 2, "=")
                && binds_callable(&m, i + 3)
            {
                binding = ident_text(&m, i + 1);
            }
        }
        depth += bracket_delta(t);
    }

    binding.unwrap_or_else(|| FALLBACK_COMPONENT.to_string())
}

fn ident_text(m: &Marked, i: usize) -> Option<String> {
    m.get(i)
        .filter(|t| t.kind == TokenKind::Ident)
        .map(|t| t.text.clone())
}

fn binds_callable(m: &Marked, i: usize) -> bool {
    if m.ident(i, "function") || m.ident(i, "class") {
        return true;
    }
    let i = if m.ident(i, "async") { i + 1 } else { i };
    if m.is_any_ident(i) && m.punct(i + 1, "=>") {
        return true;
    }
    if m.punct(i, "(") {
        return m.matching(i).is_some_and(|close| m.punct(close + 1, "=>"));
    }
    // React.memo(...), forwardRef(...) and friends.
    m.is_any_ident(i) && (m.punct(i + 1, "(") || m.punct(i + 1, "."))
}
