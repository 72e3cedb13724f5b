//! Structural checks run before any rewriting.

use super::error::{CompileError, CompileResult};
use super::lexer::{Token, TokenKind};

/// Reject unbalanced `()`, `[]` and `{}`, including inside JSX expressions.
pub fn check_balanced(tokens: &[Token]) -> CompileResult<()> {
    let mut open: Vec<&Token> = Vec::new();

    for token in tokens {
        match &token.kind {
            TokenKind::Punct => match token.text.as_str() {
                "(" | "[" | "{" => open.push(token),
                ")" | "]" | "}" => {
                    let expected = match token.text.as_str() {
                        ")" => "(",
                        "]" => "[",
                        _ => "{",
                    };
                    match open.pop() {
                        Some(opener) if opener.text == expected => {}
                        _ => {
                            return Err(CompileError::syntax(
                                format!("unexpected `{}`", token.text),
                                token.line,
                                token.column,
                            ))
                        }
                    }
                }
                _ => {}
            },
            TokenKind::Jsx(el) => {
                let mut result = Ok(());
                el.for_each_expression(&mut |inner| {
                    if result.is_ok() {
                        result = check_balanced(inner);
                    }
                });
                result?;
            }
            _ => {}
        }
    }

    match open.pop() {
        Some(opener) => Err(CompileError::syntax(
            format!("unclosed `{}`", opener.text),
            opener.line,
            opener.column,
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    #[test]
    fn test_balanced_source_passes() {
        let tokens = tokenize("function A() { return [1, (2)]; }").unwrap();
        assert!(check_balanced(&tokens).is_ok());
    }

    #[test]
    fn test_unclosed_brace_points_at_opener() {
        let tokens = tokenize("function A() {\n  return 1;\n").unwrap();
        let err = check_balanced(&tokens).unwrap_err();
        assert_eq!(err.location(), Some((1, Some(14))));
    }

    #[test]
    fn test_stray_closer() {
        let tokens = tokenize("const a = 1);").unwrap();
        let err = check_balanced(&tokens).unwrap_err();
        assert!(err.to_string().contains("unexpected `)`"));
    }

    #[test]
    fn test_checks_inside_jsx_expressions() {
        let tokens = tokenize("x = <div>{f(}</div>").unwrap();
        assert!(check_balanced(&tokens).is_err());
    }
}
