//! JSX element parsing and lowering to `React.createElement` calls.

use super::error::CompileResult;
use super::lexer::{self, is_ident_continue, is_ident_start, Cursor, Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
    /// `None` for a fragment (`<>...</>`).
    pub name: Option<String>,
    pub attributes: Vec<JsxAttribute>,
    pub children: Vec<JsxChild>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttribute {
    Named { name: String, value: AttrValue },
    Spread(Vec<Token>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Bare attribute, e.g. `disabled`.
    True,
    Str(String),
    Expr(Vec<Token>),
    Element(Box<JsxElement>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxChild {
    Text(String),
    Expr(Vec<Token>),
    Element(JsxElement),
}

impl JsxElement {
    /// Apply `f` to every embedded expression, depth first.
    pub fn try_map_expressions<F>(&mut self, f: &mut F) -> CompileResult<()>
    where
        F: FnMut(Vec<Token>) -> CompileResult<Vec<Token>>,
    {
        for attr in &mut self.attributes {
            match attr {
                JsxAttribute::Spread(tokens)
                | JsxAttribute::Named {
                    value: AttrValue::Expr(tokens),
                    ..
                } => *tokens = f(std::mem::take(tokens))?,
                JsxAttribute::Named {
                    value: AttrValue::Element(el),
                    ..
                } => el.try_map_expressions(f)?,
                JsxAttribute::Named { .. } => {}
            }
        }
        for child in &mut self.children {
            match child {
                JsxChild::Expr(tokens) => *tokens = f(std::mem::take(tokens))?,
                JsxChild::Element(el) => el.try_map_expressions(f)?,
                JsxChild::Text(_) => {}
            }
        }
        Ok(())
    }

    /// Visit every embedded expression, depth first.
    pub fn for_each_expression<'a>(&'a self, f: &mut dyn FnMut(&'a [Token])) {
        for attr in &self.attributes {
            match attr {
                JsxAttribute::Spread(tokens)
                | JsxAttribute::Named {
                    value: AttrValue::Expr(tokens),
                    ..
                } => f(tokens),
                JsxAttribute::Named {
                    value: AttrValue::Element(el),
                    ..
                } => el.for_each_expression(f),
                JsxAttribute::Named { .. } => {}
            }
        }
        for child in &self.children {
            match child {
                JsxChild::Expr(tokens) => f(tokens),
                JsxChild::Element(el) => el.for_each_expression(f),
                JsxChild::Text(_) => {}
            }
        }
    }
}

/// Parse one element. The cursor sits on its `<`.
pub(crate) fn parse_element(cur: &mut Cursor) -> CompileResult<JsxElement> {
    let (line, column) = cur.position();
    cur.bump();
    skip_whitespace(cur);

    if cur.peek() == Some('>') {
        cur.bump();
        let children = parse_children(cur, None)?;
        return Ok(JsxElement {
            name: None,
            attributes: Vec::new(),
            children,
            line,
            column,
        });
    }

    let name = parse_name(cur)?;
    let mut attributes = Vec::new();

    loop {
        skip_whitespace(cur);
        match cur.peek() {
            None => return Err(cur.error(format!("unterminated <{name}> tag"))),
            Some('/') => {
                cur.bump();
                skip_whitespace(cur);
                expect(cur, '>')?;
                return Ok(JsxElement {
                    name: Some(name),
                    attributes,
                    children: Vec::new(),
                    line,
                    column,
                });
            }
            Some('>') => {
                cur.bump();
                let children = parse_children(cur, Some(&name))?;
                return Ok(JsxElement {
                    name: Some(name),
                    attributes,
                    children,
                    line,
                    column,
                });
            }
            Some('{') => {
                cur.bump();
                skip_whitespace(cur);
                if !cur.starts_with("...") {
                    return Err(cur.error("expected `...` in JSX spread attribute"));
                }
                for _ in 0..3 {
                    cur.bump();
                }
                attributes.push(JsxAttribute::Spread(lexer::lex_expression_container(cur)?));
            }
            Some(c) if is_ident_start(c) => {
                let attr_name = parse_name(cur)?;
                skip_whitespace(cur);
                let value = if cur.peek() == Some('=') {
                    cur.bump();
                    skip_whitespace(cur);
                    parse_attr_value(cur)?
                } else {
                    AttrValue::True
                };
                attributes.push(JsxAttribute::Named {
                    name: attr_name,
                    value,
                });
            }
            Some(c) => return Err(cur.error(format!("unexpected `{c}` in <{name}> tag"))),
        }
    }
}

fn parse_attr_value(cur: &mut Cursor) -> CompileResult<AttrValue> {
    match cur.peek() {
        Some(q @ ('"' | '\'')) => {
            cur.bump();
            let start = cur.offset();
            loop {
                match cur.peek() {
                    Some(c) if c == q => break,
                    Some(_) => {
                        cur.bump();
                    }
                    None => return Err(cur.error("unterminated JSX attribute string")),
                }
            }
            let raw = cur.slice(start);
            cur.bump();
            Ok(AttrValue::Str(raw))
        }
        Some('{') => {
            cur.bump();
            Ok(AttrValue::Expr(lexer::lex_expression_container(cur)?))
        }
        Some('<') => Ok(AttrValue::Element(Box::new(parse_element(cur)?))),
        _ => Err(cur.error("expected a JSX attribute value")),
    }
}

fn parse_children(cur: &mut Cursor, parent: Option<&str>) -> CompileResult<Vec<JsxChild>> {
    let mut children = Vec::new();
    let mut text = String::new();

    loop {
        match cur.peek() {
            None => {
                let tag = parent.unwrap_or("");
                return Err(cur.error(format!("unclosed <{tag}> element")));
            }
            Some('<') if cur.peek_at(1).is_some_and(|c| c == '/') => {
                flush_text(&mut text, &mut children);
                cur.bump();
                cur.bump();
                skip_whitespace(cur);
                let closing = if cur.peek() == Some('>') {
                    None
                } else {
                    Some(parse_name(cur)?)
                };
                skip_whitespace(cur);
                expect(cur, '>')?;
                if closing.as_deref() != parent {
                    return Err(cur.error(format!(
                        "expected </{}> but found </{}>",
                        parent.unwrap_or(""),
                        closing.as_deref().unwrap_or("")
                    )));
                }
                return Ok(children);
            }
            Some('<') => {
                flush_text(&mut text, &mut children);
                children.push(JsxChild::Element(parse_element(cur)?));
            }
            Some('{') => {
                flush_text(&mut text, &mut children);
                cur.bump();
                children.push(JsxChild::Expr(lexer::lex_expression_container(cur)?));
            }
            Some(c) => {
                text.push(c);
                cur.bump();
            }
        }
    }
}

fn flush_text(text: &mut String, children: &mut Vec<JsxChild>) {
    if let Some(cleaned) = clean_text(text) {
        children.push(JsxChild::Text(cleaned));
    }
    text.clear();
}

fn parse_name(cur: &mut Cursor) -> CompileResult<String> {
    let start = cur.offset();
    cur.eat_while(|c| is_ident_continue(c) || matches!(c, '-' | '.' | ':'));
    let name = cur.slice(start);
    if name.is_empty() {
        return Err(cur.error("expected a JSX name"));
    }
    Ok(name)
}

fn skip_whitespace(cur: &mut Cursor) {
    cur.eat_while(char::is_whitespace);
}

fn expect(cur: &mut Cursor, c: char) -> CompileResult<()> {
    if cur.peek() == Some(c) {
        cur.bump();
        Ok(())
    } else {
        Err(cur.error(format!("expected `{c}`")))
    }
}

/// JSX text whitespace rules: lines are trimmed where they meet a line
/// break, whitespace-only lines vanish and the rest are joined by a space.
fn clean_text(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw.split('\n').collect();
    let last = lines.len() - 1;
    let mut out = String::new();

    for (i, line) in lines.iter().enumerate() {
        let line = line.replace('\t', " ");
        let mut s = line.trim_end_matches('\r');
        if i != 0 {
            s = s.trim_start_matches(' ');
        }
        if i != last {
            s = s.trim_end_matches(' ');
        }
        if s.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(s);
    }

    (!out.is_empty()).then(|| decode_entities(&out))
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Lower a token stream to plain script, expanding JSX tokens.
pub fn emit(tokens: &[Token]) -> String {
    let mut out = String::new();
    emit_into(tokens, &mut out);
    out
}

fn emit_into(tokens: &[Token], out: &mut String) {
    for token in tokens {
        match &token.kind {
            TokenKind::Jsx(el) => emit_element(el, out),
            _ => out.push_str(&token.text),
        }
    }
}

fn emit_element(el: &JsxElement, out: &mut String) {
    out.push_str("React.createElement(");
    out.push_str(&element_type(el.name.as_deref()));
    out.push_str(", ");

    if el.attributes.is_empty() {
        out.push_str("null");
    } else {
        out.push('{');
        for (i, attr) in el.attributes.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match attr {
                JsxAttribute::Spread(tokens) => {
                    out.push_str("...");
                    emit_into(tokens, out);
                }
                JsxAttribute::Named { name, value } => {
                    out.push_str(&prop_key(name));
                    out.push_str(": ");
                    match value {
                        AttrValue::True => out.push_str("true"),
                        AttrValue::Str(s) => out.push_str(&quote(&decode_entities(s))),
                        AttrValue::Expr(tokens) if is_blank(tokens) => out.push_str("undefined"),
                        AttrValue::Expr(tokens) => emit_into(tokens, out),
                        AttrValue::Element(child) => emit_element(child, out),
                    }
                }
            }
        }
        out.push('}');
    }

    for child in &el.children {
        match child {
            JsxChild::Text(text) => {
                out.push_str(", ");
                out.push_str(&quote(text));
            }
            JsxChild::Expr(tokens) if is_blank(tokens) => {}
            JsxChild::Expr(tokens) => {
                out.push_str(", ");
                emit_into(tokens, out);
            }
            JsxChild::Element(child) => {
                out.push_str(", ");
                emit_element(child, out);
            }
        }
    }
    out.push(')');
}

fn element_type(name: Option<&str>) -> String {
    match name {
        None => "React.Fragment".to_string(),
        Some(n) if n.contains(':') || n.contains('-') => quote(n),
        Some(n) if n.starts_with(|c: char| c.is_ascii_lowercase()) && !n.contains('.') => quote(n),
        Some(n) => n.to_string(),
    }
}

fn prop_key(name: &str) -> String {
    if name.chars().all(is_ident_continue) {
        name.to_string()
    } else {
        quote(name)
    }
}

fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn is_blank(tokens: &[Token]) -> bool {
    tokens.iter().all(Token::is_trivia)
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn lower(src: &str) -> String {
        emit(&tokenize(src).unwrap())
    }

    #[test]
    fn test_intrinsic_and_component_types() {
        assert_eq!(
            lower("x = <div />"),
            "x = React.createElement(\"div\", null)"
        );
        assert_eq!(
            lower("x = <Card.Header />"),
            "x = React.createElement(Card.Header, null)"
        );
    }

    #[test]
    fn test_props_and_children() {
        let out = lower(r#"x = <Button variant="outline" disabled onClick={() => go(1)}>Go</Button>"#);
        assert_eq!(
            out,
            r#"x = React.createElement(Button, {variant: "outline", disabled: true, onClick: () => go(1)}, "Go")"#
        );
    }

    #[test]
    fn test_fragment_and_nested_expression_jsx() {
        let out = lower("x = <>{ok && <b>yes</b>}</>");
        assert_eq!(
            out,
            "x = React.createElement(React.Fragment, null, ok && React.createElement(\"b\", null, \"yes\"))"
        );
    }

    #[test]
    fn test_multiline_text_collapses() {
        let out = lower("x = <p>\n    hello\n    world\n  </p>");
        assert_eq!(out, "x = React.createElement(\"p\", null, \"hello world\")");
    }

    #[test]
    fn test_hyphenated_prop_is_quoted() {
        let out = lower("x = <div aria-label=\"a\" {...rest} />");
        assert_eq!(
            out,
            "x = React.createElement(\"div\", {\"aria-label\": \"a\", ...rest})"
        );
    }

    #[test]
    fn test_comment_child_dropped() {
        let out = lower("x = <div>{/* note */}</div>");
        assert_eq!(out, "x = React.createElement(\"div\", null)");
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let err = tokenize("x = <div></span>").unwrap_err();
        assert!(err.to_string().contains("expected </div> but found </span>"));
    }

    #[test]
    fn test_unclosed_element() {
        let err = tokenize("x = <div>text").unwrap_err();
        assert!(err.to_string().contains("unclosed <div>"));
    }
}
