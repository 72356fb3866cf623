//! Statements, the building blocks of programs.
//!
//! # Grammar
//! ```raw
//! stmts ::= stmt (';' stmt)* ';'?
//! stmt  ::=
//!       ('int' | 'double' | 'bool') IDENT '=' expr
//!     | 'if' expr 'then' stmt ('else' stmt)?
//!     | 'while' expr 'do' stmt
//!     | '{' stmts? '}'
//!     | IDENT '=' expr
//!     | IDENT '+=' expr
//!     | IDENT '(' (expr (',' expr)*)? ')'
//! ```
//!
//! An `else` always attaches to the nearest unmatched `if`.

use nom::{
    branch::alt,
    combinator::{cut, fail, map, opt},
    error::context,
    multi::{separated_list0, separated_list1},
    sequence::{delimited, preceded, terminated, tuple},
    Parser,
};

use crate::{
    ast::{Stmt, StmtNode},
    kind::Kind,
    lexer::token::Token,
};

use super::{
    expr::expr,
    util::{ident, token},
    PResult, ParserInput,
};

/// Parses a `;`-separated list of statements, allowing a trailing `;`.
pub fn stmts<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Vec<Stmt<'src>>> {
    terminated(
        separated_list1(token(Token::Semicolon), stmt),
        opt(token(Token::Semicolon)),
    )
    .parse(input)
}

/// Parses an individual [`Stmt`] from `input`.
pub fn stmt<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Stmt<'src>> {
    alt((decl, r#if, r#while, block, named)).parse(input)
}

/// Parses a [`StmtNode::Decl`] from `input`.
fn decl<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Stmt<'src>> {
    let kind = match input.first().map(|head| head.node) {
        Some(Token::IntType) => Kind::Int,
        Some(Token::DoubleType) => Kind::Real,
        Some(Token::BoolType) => Kind::Bool,
        _ => return fail(input),
    };
    let pos = input[0].pos;

    cut(tuple((
        context("expected a variable name", ident),
        context("expected `=`", token(Token::Assign)),
        context("expected an expression", expr),
    )))
    .parse(&input[1..])
    .map(|(tail, (name, _, value))| {
        let node = StmtNode::Decl {
            kind,
            name: name.node,
            value,
        };
        (tail, Stmt::new(node, pos))
    })
}

/// Parses a [`StmtNode::If`] from `input`.
fn r#if<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Stmt<'src>> {
    let (input, pos) = token(Token::If).parse(input)?;

    cut(tuple((
        context("expected a condition", expr),
        context("expected `then`", token(Token::Then)),
        context("expected a statement", stmt),
        opt(preceded(
            token(Token::Else),
            context("expected a statement", cut(stmt)),
        )),
    )))
    .parse(input)
    .map(|(tail, (cond, _, then_branch, else_branch))| {
        let node = StmtNode::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        };
        (tail, Stmt::new(node, pos))
    })
}

/// Parses a [`StmtNode::While`] from `input`.
fn r#while<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Stmt<'src>> {
    let (input, pos) = token(Token::While).parse(input)?;

    cut(tuple((
        context("expected a condition", expr),
        context("expected `do`", token(Token::Do)),
        context("expected a statement", stmt),
    )))
    .parse(input)
    .map(|(tail, (cond, _, body))| {
        let node = StmtNode::While {
            cond,
            body: Box::new(body),
        };
        (tail, Stmt::new(node, pos))
    })
}

/// Parses a braced [`StmtNode::Seq`] from `input`.
fn block<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Stmt<'src>> {
    let (input, pos) = token(Token::LeftBrace).parse(input)?;

    cut(terminated(
        opt(stmts),
        context("expected `;` or `}`", token(Token::RightBrace)),
    ))
    .parse(input)
    .map(|(tail, body)| (tail, Stmt::new(StmtNode::Seq(body.unwrap_or_default()), pos)))
}

/// Parses one of the statements that begin with an identifier: an assignment,
/// a compound addition, or a call.
fn named<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Stmt<'src>> {
    let (input, name) = ident(input)?;

    context(
        "expected `=`, `+=` or `(`",
        cut(alt((
            map(
                preceded(token(Token::Assign), context("expected an expression", cut(expr))),
                |value| StmtNode::Assign {
                    name: name.node,
                    value,
                },
            ),
            map(
                preceded(
                    token(Token::PlusAssign),
                    context("expected an expression", cut(expr)),
                ),
                |value| StmtNode::AddAssign {
                    name: name.node,
                    value,
                },
            ),
            map(
                delimited(
                    token(Token::LeftParen),
                    separated_list0(
                        token(Token::Comma),
                        context("expected an expression", expr),
                    ),
                    context("expected `,` or `)`", cut(token(Token::RightParen))),
                ),
                |args| StmtNode::Call {
                    name: name.node,
                    args,
                },
            ),
        ))),
    )
    .parse(input)
    .map(|(tail, node)| (tail, Stmt::new(node, name.pos)))
}
