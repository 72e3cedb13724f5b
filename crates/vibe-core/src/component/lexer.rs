//! Tokenizer for component source.
//!
//! Produces a lossless token stream: concatenating every token's `text`
//! gives back the input. JSX elements are parsed eagerly into a single
//! [`TokenKind::Jsx`] token whose embedded expressions are token streams of
//! their own.

use super::error::{CompileError, CompileResult};
use super::jsx::{self, JsxElement};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    Template,
    Regex,
    Punct,
    Comment,
    Whitespace,
    Jsx(Box<JsxElement>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Comment | TokenKind::Whitespace)
    }

    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == p
    }

    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == name
    }

    pub fn has_newline(&self) -> bool {
        self.is_trivia() && self.text.contains('\n')
    }
}

const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>",
];

/// Keywords after which an expression (and so a regex or JSX) may start.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await", "default",
];

pub(crate) struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    pub(crate) fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub(crate) fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub(crate) fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    pub(crate) fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    pub(crate) fn slice(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    pub(crate) fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::syntax(message, self.line, self.column)
    }
}

pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Tokenize a whole source file.
pub fn tokenize(source: &str) -> CompileResult<Vec<Token>> {
    let mut cursor = Cursor::new(source);
    lex_until(&mut cursor, false)
}

/// Tokenize the inside of a `{ ... }` JSX expression container. The cursor
/// sits just past the opening brace; on return it sits past the closing one.
pub(crate) fn lex_expression_container(cursor: &mut Cursor) -> CompileResult<Vec<Token>> {
    lex_until(cursor, true)
}

fn lex_until(cur: &mut Cursor, stop_at_brace: bool) -> CompileResult<Vec<Token>> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut depth = 0usize;

    loop {
        let Some(c) = cur.peek() else {
            if stop_at_brace {
                return Err(cur.error("unterminated JSX expression, expected `}`"));
            }
            return Ok(tokens);
        };

        if stop_at_brace && c == '}' && depth == 0 {
            cur.bump();
            return Ok(tokens);
        }

        let (line, column) = cur.position();
        let start = cur.offset();
        let prev = tokens.iter().rev().find(|t| !t.is_trivia());

        let kind = if c.is_whitespace() {
            cur.eat_while(char::is_whitespace);
            TokenKind::Whitespace
        } else if cur.starts_with("//") {
            cur.eat_while(|c| c != '\n');
            TokenKind::Comment
        } else if cur.starts_with("/*") {
            lex_block_comment(cur)?;
            TokenKind::Comment
        } else if c == '"' || c == '\'' {
            lex_string(cur, c)?;
            TokenKind::Str
        } else if c == '`' {
            lex_template(cur)?;
            TokenKind::Template
        } else if is_ident_start(c) {
            cur.eat_while(is_ident_continue);
            TokenKind::Ident
        } else if c.is_ascii_digit() || (c == '.' && cur.peek_at(1).is_some_and(|d| d.is_ascii_digit())) {
            lex_number(cur);
            TokenKind::Number
        } else if c == '<'
            && expression_may_start(prev)
            && cur.peek_at(1).is_some_and(|n| is_ident_start(n) || n == '>')
        {
            let element = jsx::parse_element(cur)?;
            TokenKind::Jsx(Box::new(element))
        } else if c == '/' && expression_may_start(prev) {
            lex_regex(cur)?;
            TokenKind::Regex
        } else {
            let punct = lex_punct(cur);
            match punct.as_str() {
                "{" => depth += 1,
                "}" => depth = depth.saturating_sub(1),
                _ => {}
            }
            TokenKind::Punct
        };

        tokens.push(Token {
            kind,
            text: cur.slice(start),
            line,
            column,
        });
    }
}

/// Whether the previous significant token leaves the lexer in expression
/// position, where `/` opens a regex and `<` opens JSX.
fn expression_may_start(prev: Option<&Token>) -> bool {
    match prev {
        None => true,
        Some(t) => match &t.kind {
            TokenKind::Punct => !matches!(t.text.as_str(), ")" | "]" | "}" | "++" | "--"),
            TokenKind::Ident => EXPRESSION_KEYWORDS.contains(&t.text.as_str()),
            _ => false,
        },
    }
}

fn lex_block_comment(cur: &mut Cursor) -> CompileResult<()> {
    let (line, column) = cur.position();
    cur.bump();
    cur.bump();
    loop {
        if cur.starts_with("*/") {
            cur.bump();
            cur.bump();
            return Ok(());
        }
        if cur.bump().is_none() {
            return Err(CompileError::syntax("unterminated comment", line, column));
        }
    }
}

fn lex_string(cur: &mut Cursor, quote: char) -> CompileResult<()> {
    let (line, column) = cur.position();
    cur.bump();
    loop {
        match cur.bump() {
            Some('\\') => {
                cur.bump();
            }
            Some(c) if c == quote => return Ok(()),
            Some('\n') | None => {
                return Err(CompileError::syntax(
                    "unterminated string literal",
                    line,
                    column,
                ))
            }
            Some(_) => {}
        }
    }
}

fn lex_template(cur: &mut Cursor) -> CompileResult<()> {
    let (line, column) = cur.position();
    cur.bump();
    loop {
        if cur.starts_with("${") {
            cur.bump();
            cur.bump();
            lex_until(cur, true).map_err(|_| {
                CompileError::syntax("unterminated template expression", line, column)
            })?;
            continue;
        }
        match cur.bump() {
            Some('\\') => {
                cur.bump();
            }
            Some('`') => return Ok(()),
            None => {
                return Err(CompileError::syntax(
                    "unterminated template literal",
                    line,
                    column,
                ))
            }
            Some(_) => {}
        }
    }
}

fn lex_regex(cur: &mut Cursor) -> CompileResult<()> {
    let (line, column) = cur.position();
    cur.bump();
    let mut in_class = false;
    loop {
        match cur.bump() {
            Some('\\') => {
                cur.bump();
            }
            Some('[') => in_class = true,
            Some(']') => in_class = false,
            Some('/') if !in_class => break,
            Some('\n') | None => {
                return Err(CompileError::syntax(
                    "unterminated regular expression",
                    line,
                    column,
                ))
            }
            Some(_) => {}
        }
    }
    cur.eat_while(is_ident_continue);
    Ok(())
}

fn lex_number(cur: &mut Cursor) {
    let start = cur.offset();
    let hex = cur.starts_with("0x") || cur.starts_with("0X");
    loop {
        cur.eat_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
        let exponent_sign = !hex
            && matches!(cur.peek(), Some('+' | '-'))
            && cur.offset() > start
            && matches!(cur.chars[cur.offset() - 1], 'e' | 'E');
        if !exponent_sign {
            return;
        }
        cur.bump();
    }
}

fn lex_punct(cur: &mut Cursor) -> String {
    if let Some(p) = PUNCTUATORS.iter().find(|p| cur.starts_with(p)) {
        for _ in 0..p.len() {
            cur.bump();
        }
        return (*p).to_string();
    }
    cur.bump().map(String::from).unwrap_or_default()
}
