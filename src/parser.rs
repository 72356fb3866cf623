//! A [`nom`]-based parser operating on slices of positioned tokens.
//!
//! # Expressions
//! Expressions are parsed by precedence climbing over a fixed set of levels (see
//! [`expr`]); every expression node records the position where it starts.
//!
//! # Statements
//! A program is a `;`-separated list of statements (see [`stmt`]), which the
//! parser wraps in a single top-level [`StmtNode::Seq`].

use nom::error::{VerboseError, VerboseErrorKind};
use thiserror::Error;

use crate::{
    ast::{Stmt, StmtNode},
    lexer::token::{SpannedToken, Tokens},
    pos::Pos,
};

pub mod expr;
pub mod stmt;
mod util;

/// The input type consumed by all parsers in the [`crate::parser`] module.
pub type ParserInput<'buf, 'src> = &'buf [SpannedToken<'src>];

/// The return type of all parsers in the [`crate::parser`] module.
pub type PResult<'buf, 'src, O> =
    nom::IResult<ParserInput<'buf, 'src>, O, VerboseError<ParserInput<'buf, 'src>>>;

/// The error produced when a token sequence is not a well-formed program.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ParseError {
    /// The position of the offending token, or the end of the source.
    pub pos: Pos,
    /// A description of the problem.
    pub message: String,
}

/// Parses a complete program from `tokens`.
///
/// The result is always a [`StmtNode::Seq`], which is empty for an empty program.
pub fn parse<'src>(tokens: &Tokens<'src>) -> Result<Stmt<'src>, ParseError> {
    let input = tokens.as_slice();
    let start = input.first().map_or(tokens.end(), |head| head.pos);

    if input.is_empty() {
        return Ok(Stmt::new(StmtNode::Seq(Vec::new()), start));
    }

    match stmt::stmts(input) {
        Ok(([], stmts)) => Ok(Stmt::new(StmtNode::Seq(stmts), start)),
        Ok((tail, _)) => Err(ParseError {
            pos: tail[0].pos,
            message: format!("expected `;`, found `{}`", tail[0].node),
        }),
        Err(nom::Err::Error(err) | nom::Err::Failure(err)) => Err(describe(tokens, err)),
        Err(nom::Err::Incomplete(_)) => Err(ParseError {
            pos: tokens.end(),
            message: "unexpected end of input".to_string(),
        }),
    }
}

/// Converts a [`VerboseError`] into a [`ParseError`], using the innermost
/// failure for the position and the innermost context for the message.
fn describe(tokens: &Tokens<'_>, err: VerboseError<ParserInput<'_, '_>>) -> ParseError {
    let expected = err
        .errors
        .iter()
        .find_map(|(_, kind)| match kind {
            VerboseErrorKind::Context(context) => Some(*context),
            _ => None,
        })
        .unwrap_or("expected a statement");

    match err.errors.first().and_then(|(input, _)| input.first()) {
        Some(found) => ParseError {
            pos: found.pos,
            message: format!("{expected}, found `{}`", found.node),
        },
        None => ParseError {
            pos: tokens.end(),
            message: format!("{expected}, found end of input"),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::tokenize;

    use super::*;

    #[test]
    fn programs_parse_to_a_top_level_sequence() {
        let tokens =
            tokenize("int i = 1; int s = 0; while i < 5 do { s += i; i += 1 }; PrintInt(s)")
                .unwrap();
        let program = parse(&tokens).unwrap();
        eprintln!("{program}");

        let StmtNode::Seq(stmts) = &program.node else {
            panic!("top level is not a sequence");
        };
        assert_eq!(stmts.len(), 4);
        assert_eq!(program.names().len(), 2);
    }

    #[test]
    fn empty_program_is_an_empty_sequence() {
        let tokens = tokenize("// nothing\n").unwrap();
        assert_eq!(parse(&tokens).unwrap().node, StmtNode::Seq(vec![]));
    }

    #[test]
    fn errors_point_at_the_offending_token() {
        let tokens = tokenize("int x = 1\nint y = 2").unwrap();
        let err = parse(&tokens).unwrap_err();
        assert_eq!(err.pos, Pos::new(2, 1));
        assert_eq!(err.message, "expected `;`, found `int`");

        let tokens = tokenize("int x = ;").unwrap();
        let err = parse(&tokens).unwrap_err();
        assert_eq!(err.pos, Pos::new(1, 9));
        assert_eq!(err.message, "expected an expression, found `;`");

        let tokens = tokenize("while x < 3 do").unwrap();
        let err = parse(&tokens).unwrap_err();
        assert_eq!(err.pos, Pos::new(1, 15));
        assert_eq!(err.message, "expected a statement, found end of input");
    }

    #[test]
    fn a_stray_token_at_the_start_is_reported() {
        let tokens = tokenize(") x = 1").unwrap();
        let err = parse(&tokens).unwrap_err();
        assert_eq!(err.pos, Pos::new(1, 1));
        assert_eq!(err.message, "expected a statement, found `)`");
    }
}
