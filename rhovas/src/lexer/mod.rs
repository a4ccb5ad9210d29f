//! Lexer implementation using logos

mod token;

pub use token::{dedent, DslBlock, Token};

use crate::ast::Span;
use crate::error::{CompileError, Result};
use logos::Logos;

/// Tokenize source code
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(_) => {
                return Err(CompileError::lexer(
                    format!("unexpected input: {:?}", lexer.slice()),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_keywords() {
        assert_eq!(
            kinds("class struct ctor func val var try catch finally"),
            vec![
                Token::Class,
                Token::Struct,
                Token::Ctor,
                Token::Func,
                Token::Val,
                Token::Var,
                Token::Try,
                Token::Catch,
                Token::Finally,
            ]
        );
    }

    #[test]
    fn test_tokenize_identity_operators_before_equality() {
        assert_eq!(
            kinds("a === b !== c == d != e"),
            vec![
                Token::Ident("a".into()),
                Token::EqEqEq,
                Token::Ident("b".into()),
                Token::NotEqEq,
                Token::Ident("c".into()),
                Token::EqEq,
                Token::Ident("d".into()),
                Token::NotEq,
                Token::Ident("e".into()),
            ]
        );
    }

    #[test]
    fn test_tokenize_rest_capture() {
        assert_eq!(
            kinds("[head, tail..]"),
            vec![
                Token::LBracket,
                Token::Ident("head".into()),
                Token::Comma,
                Token::Ident("tail".into()),
                Token::DotDot,
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_tokenize_keyword_prefix_is_identifier() {
        assert_eq!(kinds("value"), vec![Token::Ident("value".into())]);
        assert_eq!(kinds("importer"), vec![Token::Ident("importer".into())]);
    }

    #[test]
    fn test_tokenize_spans() {
        let tokens = tokenize("func main").unwrap();
        assert_eq!(tokens[0].1, Span::new(0, 4));
        assert_eq!(tokens[1].1, Span::new(5, 9));
    }

    #[test]
    fn test_tokenize_skips_comments() {
        assert_eq!(
            kinds("func // comment\nmain"),
            vec![Token::Func, Token::Ident("main".into())]
        );
    }

    #[test]
    fn test_tokenize_error_reports_span() {
        let err = tokenize("val x = $;").unwrap_err();
        assert_eq!(err.span(), Some(Span::new(8, 9)));
        assert!(err.message().contains('$'));
    }
}
