//! Simple parsers for the operator and punctuation symbols of a program.
//!
//! Multi-character symbols are tried before their single-character prefixes,
//! so that e.g. `<=` never lexes as `<` followed by `=`.

use nom::{branch::alt, bytes::complete::tag, Parser};

use super::{token::Token, LexResult};

/// Parses an operator or punctuation [`Token`] from `input`.
pub fn glyph(input: &str) -> LexResult<'_> {
    alt((compound, single)).parse(input)
}

/// Parses a two-character symbol from `input`.
fn compound(input: &str) -> LexResult<'_> {
    alt((
        symbol("+=", Token::PlusAssign),
        symbol("==", Token::EqEq),
        symbol("!=", Token::NotEq),
        symbol("<=", Token::LessEq),
        symbol(">=", Token::GreaterEq),
        symbol("&&", Token::AndAnd),
        symbol("||", Token::OrOr),
    ))
    .parse(input)
}

/// Parses a one-character symbol from `input`.
fn single(input: &str) -> LexResult<'_> {
    alt((
        symbol("+", Token::Plus),
        symbol("-", Token::Minus),
        symbol("*", Token::Star),
        symbol("/", Token::Slash),
        symbol("=", Token::Assign),
        symbol("!", Token::Bang),
        symbol("<", Token::Less),
        symbol(">", Token::Greater),
        symbol("(", Token::LeftParen),
        symbol(")", Token::RightParen),
        symbol("{", Token::LeftBrace),
        symbol("}", Token::RightBrace),
        symbol(",", Token::Comma),
        symbol(";", Token::Semicolon),
    ))
    .parse(input)
}

/// Returns a parser producing `token` when `input` starts with `text`.
fn symbol<'src>(
    text: &'static str,
    token: Token<'static>,
) -> impl FnMut(&'src str) -> LexResult<'src> {
    move |input| tag(text).parse(input).map(|(tail, _)| (tail, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_symbol_wins() {
        assert_eq!(glyph("<= 3"), Ok((" 3", Token::LessEq)));
        assert_eq!(glyph("< 3"), Ok((" 3", Token::Less)));
        assert_eq!(glyph("+=1"), Ok(("1", Token::PlusAssign)));
        assert_eq!(glyph("+1"), Ok(("1", Token::Plus)));
        assert_eq!(glyph("!x"), Ok(("x", Token::Bang)));
        assert_eq!(glyph("!=x"), Ok(("x", Token::NotEq)));
    }

    #[test]
    fn lone_ampersand_is_not_a_glyph() {
        assert!(glyph("& b").is_err());
        assert!(glyph("| b").is_err());
        assert!(glyph("x").is_err());
    }
}
