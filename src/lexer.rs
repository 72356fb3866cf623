//! A [`nom`]-based lexer for program source text.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{multispace1, not_line_ending},
    combinator::recognize,
    error::VerboseError,
    multi::many0_count,
    sequence::pair,
    IResult, Parser,
};
use thiserror::Error;

use crate::pos::{LineIndex, Pos, Spanned};

use self::token::{Token, Tokens};

pub mod ident;
pub mod number;
pub mod symbol;
pub mod token;

/// The general return type for [`crate::lexer`] parsers.
pub type LexResult<'src> = IResult<&'src str, Token<'src>, VerboseError<&'src str>>;

/// The error produced when source text cannot be split into tokens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct LexError {
    /// Where the offending character sits.
    pub pos: Pos,
    /// A description of the problem.
    pub message: String,
}

/// Splits the entirety of `source` into [`Tokens`], skipping whitespace and
/// `//` line comments.
pub fn tokenize(source: &str) -> Result<Tokens<'_>, LexError> {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut rest = skip_trivia(source);

    while !rest.is_empty() {
        let offset = source.len() - rest.len();
        match alt((symbol::glyph, number::number, ident::word)).parse(rest) {
            Ok((tail, token)) => {
                tokens.push(Spanned::new(token, index.pos(offset)));
                rest = skip_trivia(tail);
            }
            Err(_) => {
                return Err(LexError {
                    pos: index.pos(offset),
                    message: describe_failure(rest),
                })
            }
        }
    }

    tracing::debug!(count = tokens.len(), "lexed source");
    Ok(Tokens::new(tokens, index.end()))
}

/// Consumes any leading whitespace and comments.
fn skip_trivia(input: &str) -> &str {
    let trivia: IResult<&str, &str, VerboseError<&str>> = recognize(many0_count(alt((
        multispace1,
        recognize(pair(tag("//"), not_line_ending)),
    ))))
    .parse(input);

    match trivia {
        Ok((tail, _)) => tail,
        Err(_) => input,
    }
}

/// Explains why no token could be read from the start of `input`.
fn describe_failure(input: &str) -> String {
    match input.chars().next() {
        Some('&') => "expected `&&`, found a lone `&`".to_string(),
        Some('|') => "expected `||`, found a lone `|`".to_string(),
        Some(c) if c.is_ascii_digit() => {
            let digits: String = input.chars().take_while(char::is_ascii_digit).collect();
            format!("integer literal `{digits}` is out of range")
        }
        Some(c) => format!("unexpected character `{c}`"),
        None => "unexpected end of input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_small_example_program() {
        let source = r#"
        int i = 1; int s = 0;
        // sum the first four naturals
        while i < 5 do { s += i; i += 1 };
        PrintInt(s)
        "#;

        let tokens = tokenize(source).unwrap();
        dbg!(&tokens);

        assert_eq!(
            tokens.kinds().take(5).collect::<Vec<_>>(),
            vec![
                Token::IntType,
                Token::Ident("i"),
                Token::Assign,
                Token::Int(1),
                Token::Semicolon
            ]
        );
        assert_eq!(tokens.as_slice()[0].pos, Pos::new(2, 9));
        assert!(tokens.kinds().all(|token| token != Token::Slash));
        assert_eq!(tokens.kinds().last(), Some(Token::RightParen));
    }

    #[test]
    fn positions_follow_lines() {
        let tokens = tokenize("double r = 10.0;\n\tbool b = r >= 2").unwrap();
        let bool_type = tokens.as_slice()[5];
        assert_eq!(bool_type.node, Token::BoolType);
        assert_eq!(bool_type.pos, Pos::new(2, 2));
    }

    #[test]
    fn empty_and_comment_only_sources_have_no_tokens() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("  // nothing here\n\t").unwrap().is_empty());
    }

    #[test]
    fn bad_characters_are_reported_with_positions() {
        let err = tokenize("int a = 1;\nbool b = a & 2").unwrap_err();
        assert_eq!(err.pos, Pos::new(2, 12));
        assert!(err.message.contains("&&"));

        let err = tokenize("int x = 1 # 2").unwrap_err();
        assert_eq!(err.pos, Pos::new(1, 11));
        assert_eq!(err.message, "unexpected character `#`");

        let err = tokenize("int x = 123456789012345678901234").unwrap_err();
        assert!(err.message.contains("out of range"));
    }
}
