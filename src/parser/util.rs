//! Common functionality for the [`crate::parser`] submodules.
//!
//! # Relationship to [`nom`]
//! Most primitive [`nom`] parsers (e.g. [`nom::bytes::complete::tag`]) rely on the
//! [`nom::InputTake`] trait to describe the relationship between a sequence and
//! its elements, so they cannot be used on slices of positioned tokens.
//!
//! The handful of primitives the grammar needs are replaced here: [`token`] acts
//! like [`nom::bytes::complete::tag`] for a single token, [`ident`] extracts an
//! identifier, and [`left_assoc`] builds a left-associative chain of binary
//! operations.

use nom::{
    combinator::{cut, fail},
    error::context,
};

use crate::{
    ast::{BinOp, Expr, ExprNode},
    lexer::token::Token,
    pos::{Pos, Spanned},
};

use super::{PResult, ParserInput};

/// Returns a parser that matches `expected` and yields its position.
pub fn token<'buf, 'src: 'buf>(
    expected: Token<'static>,
) -> impl FnMut(ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Pos> + Clone {
    move |input: ParserInput<'buf, 'src>| match input.split_first() {
        Some((head, tail)) if head.node == expected => Ok((tail, head.pos)),
        _ => fail(input),
    }
}

/// Parses a [`Token::Ident`], yielding the name and its position.
pub fn ident<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Spanned<&'src str>> {
    match input.split_first() {
        Some((
            Spanned {
                node: Token::Ident(name),
                pos,
            },
            tail,
        )) => Ok((tail, Spanned::new(*name, *pos))),
        _ => fail(input),
    }
}

/// Returns a parser for `operand (op operand)*`, folding the operands into
/// left-nested [`ExprNode::Binary`] nodes.
///
/// `op_of` picks the operator for a token, or returns `None` for tokens that end
/// the chain. Once an operator has been consumed, a missing right operand is a
/// hard failure.
pub fn left_assoc<'buf, 'src: 'buf, F>(
    mut operand: F,
    op_of: fn(&Token<'src>) -> Option<BinOp>,
) -> impl FnMut(ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Expr<'src>>
where
    F: FnMut(ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Expr<'src>> + Clone,
{
    move |input: ParserInput<'buf, 'src>| {
        let (mut input, mut lhs) = operand(input)?;

        loop {
            let Some((op, tail)) = input
                .split_first()
                .and_then(|(head, tail)| op_of(&head.node).map(|op| (op, tail)))
            else {
                return Ok((input, lhs));
            };

            let (rest, rhs) = context("expected an expression", cut(operand.clone()))(tail)?;
            let pos = lhs.pos;
            lhs = Expr::new(ExprNode::Binary(op, Box::new(lhs), Box::new(rhs)), pos);
            input = rest;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::tokenize;

    use super::*;

    #[test]
    fn token_parser_matches_only_its_token() {
        let tokens = tokenize("; x").unwrap();
        let (tail, pos) = token(Token::Semicolon)(tokens.as_slice()).unwrap();
        assert_eq!(pos, Pos::new(1, 1));
        assert_eq!(tail.len(), 1);

        assert!(token(Token::Comma)(tokens.as_slice()).is_err());
    }

    #[test]
    fn ident_parser_extracts_names() {
        let tokens = tokenize("total = 1").unwrap();
        let (tail, name) = ident(tokens.as_slice()).unwrap();
        assert_eq!(name.node, "total");
        assert_eq!(tail[0].node, Token::Assign);

        assert!(ident(&tokens.as_slice()[1..]).is_err());
    }

    fn int_literal<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Expr<'src>> {
        match input.split_first() {
            Some((
                Spanned {
                    node: Token::Int(int),
                    pos,
                },
                tail,
            )) => Ok((tail, Expr::new(ExprNode::Int(*int), *pos))),
            _ => fail(input),
        }
    }

    #[test]
    fn left_assoc_nests_to_the_left() {
        let tokens = tokenize("1 - 2 - 3 ;").unwrap();
        let mut chain = left_assoc(int_literal, |token| match token {
            Token::Minus => Some(BinOp::Sub),
            _ => None,
        });

        let (tail, expr) = chain(tokens.as_slice()).unwrap();
        assert_eq!(expr.to_string(), "(- (- 1 2) 3)");
        assert_eq!(tail.len(), 1);

        // a trailing operator with no right operand cannot backtrack
        assert!(matches!(
            chain(&tokens.as_slice()[..4]),
            Err(nom::Err::Failure(_))
        ));
    }
}
