//! Basic parsing functionality for integer and real literals.

use nom::{
    branch::alt,
    character::complete::{char, digit1},
    combinator::{map_res, recognize},
    sequence::tuple,
    Parser,
};

use crate::kind::{Int, Real};

use super::{token::Token, LexResult};

/// Parses a [`Token::Real`] or a [`Token::Int`] from `input`.
pub fn number(input: &str) -> LexResult<'_> {
    alt((real, int)).parse(input)
}

/// Parses a [`Token::Real`], which needs digits on both sides of the point.
fn real(input: &str) -> LexResult<'_> {
    map_res(recognize(tuple((digit1, char('.'), digit1))), |text: &str| {
        text.parse::<Real>().map(Token::Real)
    })
    .parse(input)
}

/// Parses a [`Token::Int`], failing if the value does not fit in an [`Int`].
fn int(input: &str) -> LexResult<'_> {
    map_res(digit1, |text: &str| text.parse::<Int>().map(Token::Int)).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_parser_is_correct() {
        assert_eq!(number("42;"), Ok((";", Token::Int(42))));
        assert_eq!(number("10.0)"), Ok((")", Token::Real(10.0))));
        assert_eq!(number("3.25"), Ok(("", Token::Real(3.25))));

        // a trailing point is not part of the literal
        assert_eq!(number("7."), Ok((".", Token::Int(7))));

        assert!(number("x1").is_err());
        assert!(number("99999999999999999999").is_err());
    }
}
