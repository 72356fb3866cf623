//! Expressions.
//!
//! # Grammar
//! Binary operators are split into precedence levels, loosest first, and every
//! level is left-associative:
//!
//! ```raw
//! expr       ::= and ('||' and)*
//! and        ::= comparison ('&&' comparison)*
//! comparison ::= sum (('<' | '<=' | '>' | '>=' | '==' | '!=') sum)*
//! sum        ::= product (('+' | '-') product)*
//! product    ::= unary (('*' | '/') unary)*
//! unary      ::= ('-' | '!') unary | atom
//! atom       ::= INT | REAL | 'true' | 'false' | IDENT | '(' expr ')'
//! ```

use nom::{
    combinator::{cut, fail},
    error::context,
    sequence::delimited,
};

use crate::{
    ast::{BinOp, Expr, ExprNode, UnOp},
    lexer::token::Token,
};

use super::{
    util::{left_assoc, token},
    PResult, ParserInput,
};

/// Parses a complete [`Expr`] from `input`.
pub fn expr<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Expr<'src>> {
    left_assoc(and, |token| (*token == Token::OrOr).then_some(BinOp::Or))(input)
}

/// Parses a chain of `&&` operations.
fn and<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Expr<'src>> {
    left_assoc(comparison, |token| {
        (*token == Token::AndAnd).then_some(BinOp::And)
    })(input)
}

/// Parses a chain of comparisons.
fn comparison<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Expr<'src>> {
    left_assoc(sum, |token| match token {
        Token::Less => Some(BinOp::Less),
        Token::LessEq => Some(BinOp::LessEq),
        Token::Greater => Some(BinOp::Greater),
        Token::GreaterEq => Some(BinOp::GreaterEq),
        Token::EqEq => Some(BinOp::Eq),
        Token::NotEq => Some(BinOp::NotEq),
        _ => None,
    })(input)
}

/// Parses a chain of additions and subtractions.
fn sum<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Expr<'src>> {
    left_assoc(product, |token| match token {
        Token::Plus => Some(BinOp::Add),
        Token::Minus => Some(BinOp::Sub),
        _ => None,
    })(input)
}

/// Parses a chain of multiplications and divisions.
fn product<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Expr<'src>> {
    left_assoc(unary, |token| match token {
        Token::Star => Some(BinOp::Mul),
        Token::Slash => Some(BinOp::Div),
        _ => None,
    })(input)
}

/// Parses a prefix negation, or else an [`atom`].
fn unary<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Expr<'src>> {
    let op = match input.first().map(|head| head.node) {
        Some(Token::Minus) => UnOp::Neg,
        Some(Token::Bang) => UnOp::Not,
        _ => return atom(input),
    };

    let pos = input[0].pos;
    let (tail, inner) = context("expected an expression", cut(unary))(&input[1..])?;
    Ok((tail, Expr::new(ExprNode::Unary(op, Box::new(inner)), pos)))
}

/// Parses a literal, a variable, or a parenthesised expression.
fn atom<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Expr<'src>> {
    let Some((head, tail)) = input.split_first() else {
        return fail(input);
    };

    let node = match head.node {
        Token::Int(int) => ExprNode::Int(int),
        Token::Real(real) => ExprNode::Real(real),
        Token::True => ExprNode::Bool(true),
        Token::False => ExprNode::Bool(false),
        Token::Ident(name) => ExprNode::Var(name),
        Token::LeftParen => return parens(input),
        _ => return fail(input),
    };

    Ok((tail, Expr::new(node, head.pos)))
}

/// Parses a parenthesised [`Expr`].
fn parens<'buf, 'src>(input: ParserInput<'buf, 'src>) -> PResult<'buf, 'src, Expr<'src>> {
    delimited(
        token(Token::LeftParen),
        context("expected an expression", cut(expr)),
        context("expected `)`", cut(token(Token::RightParen))),
    )(input)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{lexer::tokenize, pos::Pos};

    use super::*;

    fn parse_expr(source: &str) -> Expr<'_> {
        let tokens = tokenize(source).unwrap();
        let (tail, expr) = expr(tokens.as_slice()).unwrap();
        assert!(tail.is_empty(), "unconsumed tokens: {tail:?}");
        expr
    }

    #[test]
    fn check_precedence() {
        // in this first case, we expect to get (* (+ x 13) 6)
        assert_eq!(parse_expr("(x+13)*6").to_string(), "(* (+ x 13) 6)");

        // with parentheses omitted, we expect to get (+ x (* 13 6))
        assert_eq!(parse_expr("x+13*6").to_string(), "(+ x (* 13 6))");

        assert_eq!(
            parse_expr("a < b && c >= 2.5 || !d").to_string(),
            "(|| (&& (< a b) (>= c 2.5)) (! d))"
        );
    }

    #[test]
    fn chains_are_left_associative() {
        assert_eq!(parse_expr("10 - 4 - 3").to_string(), "(- (- 10 4) 3)");
        assert_eq!(parse_expr("r / n / 2").to_string(), "(/ (/ r n) 2)");
    }

    #[test]
    fn unary_operators_nest() {
        let expr = parse_expr("- -x");
        assert_eq!(expr.to_string(), "(- (- x))");
        assert_eq!(expr.pos, Pos::new(1, 1));
    }

    #[test]
    fn binary_nodes_start_at_their_left_operand() {
        let expr = parse_expr("  a + b");
        assert_eq!(expr.pos, Pos::new(1, 3));
        assert!(matches!(expr.node, ExprNode::Binary(BinOp::Add, _, _)));
    }

    #[test]
    fn missing_operand_is_a_failure() {
        let tokens = tokenize("1 + )").unwrap();
        assert!(matches!(expr(tokens.as_slice()), Err(nom::Err::Failure(_))));

        let tokens = tokenize("(1 + 2").unwrap();
        assert!(matches!(expr(tokens.as_slice()), Err(nom::Err::Failure(_))));

        let tokens = tokenize(")").unwrap();
        assert!(matches!(expr(tokens.as_slice()), Err(nom::Err::Error(_))));
    }
}
