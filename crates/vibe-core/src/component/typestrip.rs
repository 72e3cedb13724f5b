//! TypeScript erasure.
//!
//! Removes the type-only syntax components commonly carry: interfaces, type
//! aliases, annotations on bindings, parameters and return types, generic
//! parameters and arguments, `as`/`satisfies` casts and non-null assertions.
//! Constructs with runtime semantics (`enum`, `namespace`) are rejected.

use super::error::{CompileError, CompileResult};
use super::lexer::{Token, TokenKind};
use super::marked::{bracket_delta, type_delta, Marked};

const NOT_A_METHOD: &[&str] = &[
    "if", "for", "while", "switch", "with", "return", "catch", "function", "typeof", "await",
    "new", "void", "delete", "in", "of", "case", "throw",
];

pub fn strip_types(mut tokens: Vec<Token>) -> CompileResult<Vec<Token>> {
    for token in &mut tokens {
        if let TokenKind::Jsx(el) = &mut token.kind {
            el.try_map_expressions(&mut strip_types)?;
        }
    }
    let mut m = Marked::new(tokens);
    erase(&mut m)?;
    Ok(m.finish())
}

fn erase(m: &mut Marked) -> CompileResult<()> {
    let mut i = 0;
    while i < m.len() {
        if m.is_removed(i) {
            i += 1;
            continue;
        }

        if m.at_statement_start(i) {
            if let Some(end) = declaration_end(m, i)? {
                m.remove(i, end);
                i = end + 1;
                continue;
            }
        }

        if m.ident(i, "const") || m.ident(i, "let") || m.ident(i, "var") {
            strip_binding_annotation(m, i + 1);
        } else if m.ident(i, "function") {
            strip_function_signature(m, i);
        } else if m.ident(i, "catch") && m.punct(i + 1, "(") {
            if let Some(close) = m.matching(i + 1) {
                strip_params(m, i + 1, close);
            }
        } else if m.ident(i, "implements") {
            if let Some(brace) = next_brace(m, i + 1) {
                m.remove(i, brace - 1);
            }
        } else if m.punct(i, "(") {
            strip_parenthesized_signature(m, i);
        } else if (m.ident(i, "as") || m.ident(i, "satisfies")) && is_cast(m, i) {
            if let Some(end) = type_extent(m, i + 1) {
                m.remove_with_leading_space(i, end);
                i = end + 1;
                continue;
            }
        } else if m.is_any_ident(i) && m.punct(i + 1, "<") && m.adjacent(i + 1) {
            strip_type_arguments(m, i + 1);
        } else if m.punct(i, "!") && is_non_null(m, i) {
            m.remove(i, i);
        }
        i += 1;
    }
    Ok(())
}

/// Type-only declarations at statement start. Returns the index of their
/// last token, or an error for declarations that would need code generated.
fn declaration_end(m: &Marked, i: usize) -> CompileResult<Option<usize>> {
    let unsupported = |what: &str| {
        let (line, column) = m.get(i).map(|t| (t.line, t.column)).unwrap_or((1, 1));
        Err(CompileError::Unsupported {
            construct: what.to_string(),
            line,
            column,
        })
    };

    if m.ident(i, "interface") && m.is_any_ident(i + 1) {
        return Ok(next_brace(m, i + 2).and_then(|b| m.matching(b)));
    }
    if m.ident(i, "type") && m.is_any_ident(i + 1) && (m.punct(i + 2, "=") || m.punct(i + 2, "<")) {
        return Ok(Some(type_alias_end(m, i)));
    }
    if m.ident(i, "declare") && m.is_any_ident(i + 1) {
        return Ok(Some(ambient_end(m, i)));
    }
    if (m.ident(i, "enum") && m.is_any_ident(i + 1))
        || (m.ident(i, "const") && m.ident(i + 1, "enum"))
    {
        return unsupported("enum declaration");
    }
    if (m.ident(i, "namespace") || m.ident(i, "module"))
        && m.is_any_ident(i + 1)
        && m.punct(i + 2, "{")
    {
        return unsupported("namespace declaration");
    }
    Ok(None)
}

fn next_brace(m: &Marked, from: usize) -> Option<usize> {
    let mut depth = 0;
    for j in from..m.len() {
        let t = m.get(j)?;
        if depth == 0 && t.is_punct("{") {
            return Some(j);
        }
        depth += type_delta(t);
        if t.is_punct(";") {
            return None;
        }
    }
    None
}

/// Tokens that leave a type unfinished at the end of a line.
fn continues_type(t: Option<&Token>) -> bool {
    t.is_some_and(|t| match t.kind {
        TokenKind::Punct => matches!(
            t.text.as_str(),
            "=" | "|" | "&" | "," | ":" | "=>" | "?" | "(" | "[" | "{" | "<" | "."
        ),
        TokenKind::Ident => matches!(t.text.as_str(), "keyof" | "typeof" | "extends" | "readonly"),
        _ => false,
    })
}

fn starts_continuation(t: &Token) -> bool {
    match t.kind {
        TokenKind::Punct => matches!(t.text.as_str(), "|" | "&" | "=>" | "." | "?" | ":"),
        TokenKind::Ident => t.text == "extends",
        _ => false,
    }
}

/// Last index of the type starting at `start`. Stops before any of `stops`
/// at nesting depth zero, before an unmatched closer and, when
/// `newline_ends` is set, at a line break that cannot continue the type.
fn annotation_end(m: &Marked, start: usize, stops: &[&str], newline_ends: bool) -> usize {
    let mut depth = 0;
    let mut last = start.saturating_sub(1);
    let mut j = start;
    while let Some(t) = m.get(j) {
        if depth == 0 {
            if t.kind == TokenKind::Punct && stops.contains(&t.text.as_str()) {
                break;
            }
            if newline_ends
                && j > start
                && m.newline_before(j)
                && !continues_type(m.get(j - 1))
                && !starts_continuation(t)
            {
                break;
            }
        }
        depth += type_delta(t);
        if depth < 0 {
            break;
        }
        last = j;
        j += 1;
    }
    last
}

fn type_alias_end(m: &Marked, i: usize) -> usize {
    let mut j = i + 2;
    let mut depth = 0;
    while let Some(t) = m.get(j) {
        if depth == 0 && t.is_punct("=") {
            let end = annotation_end(m, j + 1, &[";"], true);
            return if m.punct(end + 1, ";") { end + 1 } else { end };
        }
        depth += type_delta(t);
        j += 1;
    }
    m.len() - 1
}

fn ambient_end(m: &Marked, i: usize) -> usize {
    let mut j = i + 1;
    while let Some(t) = m.get(j) {
        if t.is_punct("{") {
            return m.matching(j).unwrap_or(m.len() - 1);
        }
        if t.is_punct(";") {
            return j;
        }
        if m.newline_before(j + 1) && !continues_type(Some(t)) {
            return j;
        }
        j += 1;
    }
    m.len() - 1
}

fn strip_binding_annotation(m: &mut Marked, binding: usize) {
    let mut k = binding;
    if m.punct(k, "[") || m.punct(k, "{") {
        match m.matching(k) {
            Some(close) => k = close,
            None => return,
        }
    } else if !m.is_any_ident(k) {
        return;
    }
    if m.punct(k + 1, "!") && m.punct(k + 2, ":") {
        m.remove(k + 1, k + 1);
        k += 1;
    }
    if m.punct(k + 1, ":") {
        let end = annotation_end(m, k + 2, &["=", ";", ","], true);
        m.remove(k + 1, end);
    }
}

fn strip_function_signature(m: &mut Marked, i: usize) {
    let mut j = i + 1;
    if m.punct(j, "*") {
        j += 1;
    }
    if m.is_any_ident(j) {
        j += 1;
    }
    if m.punct(j, "<") {
        if let Some(close) = m.matching_angle(j) {
            m.remove(j, close);
            j = close + 1;
        }
    }
    if !m.punct(j, "(") {
        return;
    }
    let Some(close) = m.matching(j) else {
        return;
    };
    strip_params(m, j, close);
    if m.punct(close + 1, ":") {
        if let Some(brace) = return_type_brace(m, close + 2) {
            m.remove(close + 1, brace - 1);
        }
    }
}

/// Arrow functions and method heads: `(a: T): R =>` and `name(a: T): R {`.
fn strip_parenthesized_signature(m: &mut Marked, open: usize) {
    let Some(close) = m.matching(open) else {
        return;
    };
    if m.is_removed(close + 1) {
        return;
    }
    if m.punct(close + 1, "=>") {
        strip_params(m, open, close);
        return;
    }

    let method = is_method_head(m, open);
    if m.punct(close + 1, ":") {
        if let Some(arrow) = arrow_after_return_type(m, close + 2) {
            strip_params(m, open, close);
            m.remove(close + 1, arrow - 1);
        } else if method {
            if let Some(brace) = return_type_brace(m, close + 2) {
                strip_params(m, open, close);
                m.remove(close + 1, brace - 1);
            }
        }
    } else if method && m.punct(close + 1, "{") {
        strip_params(m, open, close);
    }
}

fn is_method_head(m: &Marked, open: usize) -> bool {
    if open == 0 || !m.is_any_ident(open - 1) {
        return false;
    }
    let name = m.get(open - 1).map(|t| t.text.as_str()).unwrap_or("");
    if NOT_A_METHOD.contains(&name) {
        return false;
    }
    let before = open - 1;
    before == 0
        || m.punct(before - 1, "{")
        || m.punct(before - 1, "}")
        || m.punct(before - 1, ";")
        || m.punct(before - 1, ",")
        || ["async", "get", "set", "static"]
            .iter()
            .any(|kw| m.ident(before - 1, kw))
        || m.newline_before(before)
}

fn strip_params(m: &mut Marked, open: usize, close: usize) {
    let mut j = open + 1;
    let mut depth = 0;
    let mut in_default = false;
    while j < close {
        let Some(t) = m.get(j) else {
            return;
        };
        if depth == 0 {
            if t.is_punct(",") {
                in_default = false;
            } else if t.is_punct("=") {
                in_default = true;
            } else if !in_default
                && t.is_punct("?")
                && (m.punct(j + 1, ":") || m.punct(j + 1, ",") || j + 1 == close)
            {
                m.remove(j, j);
                j += 1;
                continue;
            } else if !in_default && t.is_punct(":") {
                let end = annotation_end(m, j + 1, &[",", "="], false).min(close - 1);
                m.remove(j, end);
                j = end + 1;
                continue;
            }
        }
        depth += bracket_delta(t);
        j += 1;
    }
}

/// For `): T =>`, the index of the `=>`.
fn arrow_after_return_type(m: &Marked, start: usize) -> Option<usize> {
    let mut j = start;
    if m.punct(j, "{") {
        j = m.matching(j)? + 1;
    }
    let mut depth = 0;
    while let Some(t) = m.get(j) {
        if depth == 0 {
            if t.is_punct("=>") {
                return Some(j);
            }
            if t.kind == TokenKind::Punct && matches!(t.text.as_str(), ";" | "," | "=" | "{") {
                return None;
            }
        }
        depth += type_delta(t);
        if depth < 0 {
            return None;
        }
        j += 1;
    }
    None
}

/// For `): T {`, the index of the body's `{`.
fn return_type_brace(m: &Marked, start: usize) -> Option<usize> {
    let mut j = start;
    if m.punct(j, "{") {
        j = m.matching(j)? + 1;
    }
    let mut depth = 0;
    while let Some(t) = m.get(j) {
        if depth == 0 && t.is_punct("{") {
            return Some(j);
        }
        if t.is_punct(";") {
            return None;
        }
        depth += type_delta(t);
        j += 1;
    }
    None
}

fn is_cast(m: &Marked, i: usize) -> bool {
    if i == 0 {
        return false;
    }
    let Some(prev) = m.get(i - 1) else {
        return false;
    };
    let prev_ends_expression = match prev.kind {
        TokenKind::Ident => !matches!(
            prev.text.as_str(),
            "const" | "let" | "var" | "function" | "class" | "import" | "export"
        ),
        TokenKind::Punct => matches!(prev.text.as_str(), ")" | "]" | "}"),
        TokenKind::Comment | TokenKind::Whitespace => false,
        _ => true,
    };
    let next_starts_type = m.get(i + 1).is_some_and(|t| match t.kind {
        TokenKind::Ident | TokenKind::Str | TokenKind::Number => true,
        TokenKind::Punct => matches!(t.text.as_str(), "(" | "[" | "{"),
        _ => false,
    });
    prev_ends_expression && next_starts_type
}

/// Last index of the type expression starting at `start`.
fn type_extent(m: &Marked, start: usize) -> Option<usize> {
    let t = m.get(start)?;
    let mut k = match t.kind {
        TokenKind::Punct if matches!(t.text.as_str(), "(" | "[" | "{") => m.matching(start)?,
        TokenKind::Ident if matches!(t.text.as_str(), "typeof" | "keyof" | "readonly") => {
            return type_extent(m, start + 1);
        }
        TokenKind::Ident => {
            let mut k = start;
            while m.punct(k + 1, ".") && m.is_any_ident(k + 2) {
                k += 2;
            }
            k
        }
        TokenKind::Str | TokenKind::Number => start,
        _ => return None,
    };
    if m.punct(k + 1, "<") {
        if let Some(close) = m.matching_angle(k + 1) {
            k = close;
        }
    }
    while m.punct(k + 1, "[") && m.punct(k + 2, "]") {
        k += 2;
    }
    if m.punct(k + 1, "|") || m.punct(k + 1, "&") {
        if let Some(rest) = type_extent(m, k + 2) {
            k = rest;
        }
    }
    Some(k)
}

fn strip_type_arguments(m: &mut Marked, lt: usize) {
    let Some(gt) = m.matching_angle(lt) else {
        return;
    };
    if !m.punct(gt + 1, "(") {
        return;
    }
    let type_like = (lt + 1..gt).all(|j| {
        m.get(j).is_some_and(|t| match t.kind {
            TokenKind::Ident | TokenKind::Str | TokenKind::Number => true,
            TokenKind::Punct => matches!(
                t.text.as_str(),
                "." | "," | "[" | "]" | "|" | "&" | "<" | ">" | ">>" | ">>>" | "{" | "}" | ":"
                    | ";" | "?" | "(" | ")" | "=>"
            ),
            _ => false,
        })
    });
    if type_like {
        m.remove(lt, gt);
    }
}

fn is_non_null(m: &Marked, i: usize) -> bool {
    if !m.adjacent(i) {
        return false;
    }
    let prev_ok = m.get(i - 1).is_some_and(|t| {
        t.kind == TokenKind::Ident || t.is_punct(")") || t.is_punct("]")
    });
    let next_ok = match m.get(i + 1) {
        None => true,
        Some(t) => {
            t.kind == TokenKind::Punct
                && matches!(t.text.as_str(), "." | "?." | "[" | ")" | "," | ";" | "}" | "]")
        }
    };
    prev_ok && next_ok
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn erase(src: &str) -> String {
        strip_types(tokenize(src).unwrap())
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    fn squash(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_interface_and_alias_removed() {
        let out = erase("interface Props {\n  title: string;\n}\ntype Mode = 'a' | 'b';\nconst x = 1;");
        assert_eq!(squash(&out), "const x = 1;");
        assert_eq!(out.matches('\n').count(), 4);
    }

    #[test]
    fn test_alias_without_semicolon_ends_at_line() {
        let out = erase("type Id = string\nconst a = 1");
        assert_eq!(squash(&out), "const a = 1");
    }

    #[test]
    fn test_binding_annotations() {
        let out = erase("const count: number = 0;\nlet items: Array<string> = [];");
        assert_eq!(squash(&out), "const count = 0; let items = [];");
    }

    #[test]
    fn test_function_params_and_return_type() {
        let out = erase("function sum<T>(a: number, b?: number): number { return a; }");
        assert_eq!(squash(&out), "function sum(a, b) { return a; }");
    }

    #[test]
    fn test_arrow_params_with_destructuring_and_defaults() {
        let out = erase("const C = ({ title, n = 2 }: Props, flag = x ? 1 : 2): JSX.Element => null;");
        assert_eq!(squash(&out), "const C = ({ title, n = 2 }, flag = x ? 1 : 2) => null;");
    }

    #[test]
    fn test_generic_call_arguments() {
        let out = erase("const [v, setV] = useState<string | null>(null);\nconst r = React.useRef<Map<string, Array<number>>>(null);");
        assert_eq!(
            squash(&out),
            "const [v, setV] = useState(null); const r = React.useRef(null);"
        );
    }

    #[test]
    fn test_comparison_is_not_generic() {
        let out = erase("for (let i = 0; i<n; i++) { if (a<b && c>(d)) {} }");
        assert_eq!(out, "for (let i = 0; i<n; i++) { if (a<b && c>(d)) {} }");
    }

    #[test]
    fn test_casts_and_non_null() {
        let out = erase("const el = ref.current!.value as string;\nconst k = keys as const;");
        assert_eq!(out, "const el = ref.current.value;\nconst k = keys;");
    }

    #[test]
    fn test_method_return_type() {
        let out = erase("const o = {\n  render(x: number): string {\n    return '';\n  }\n};");
        assert_eq!(squash(&out), "const o = { render(x) { return ''; } };");
    }

    #[test]
    fn test_ternary_untouched() {
        let src = "const v = ok ? (a) : b;";
        assert_eq!(erase(src), src);
    }

    #[test]
    fn test_enum_is_unsupported() {
        let err = strip_types(tokenize("enum Color { Red }").unwrap()).unwrap_err();
        assert!(matches!(err, CompileError::Unsupported { line: 1, column: 1, .. }));
    }

    #[test]
    fn test_types_erased_inside_jsx() {
        let tokens = strip_types(tokenize("x = <B onClick={(e: Event) => go(e as any)} />").unwrap()).unwrap();
        let out = super::super::jsx::emit(&tokens);
        assert_eq!(out, "x = React.createElement(B, {onClick: (e) => go(e)})");
    }
}
