//! Identifiers and keywords.

use nom::{
    bytes::complete::take_while,
    character::complete::satisfy,
    combinator::recognize,
    sequence::pair,
    Parser,
};

use super::{token::Token, LexResult};

/// Parses a word from `input`, producing the matching keyword token or else a
/// [`Token::Ident`].
///
/// A word begins with a letter or an underscore and continues with letters,
/// digits and underscores.
pub fn word(input: &str) -> LexResult<'_> {
    recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)
    .map(|(tail, word)| (tail, Token::keyword(word).unwrap_or(Token::Ident(word))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_parser_is_correct() {
        assert_eq!(word("sum_2 += 1"), Ok((" += 1", Token::Ident("sum_2"))));
        assert_eq!(word("_tmp"), Ok(("", Token::Ident("_tmp"))));
        assert_eq!(word("while i"), Ok((" i", Token::While)));

        // keywords only match whole words
        assert_eq!(word("iffy"), Ok(("", Token::Ident("iffy"))));
        assert_eq!(word("double2"), Ok(("", Token::Ident("double2"))));

        assert!(word("2x").is_err());
    }
}
