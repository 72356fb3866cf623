//! The [`Token`] type and token sequences.

use crate::{
    kind::{Int, Real},
    pos::{Pos, Spanned},
};

/// A single lexical unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'src> {
    /// An integer literal.
    Int(Int),
    /// A real literal, written with a decimal point.
    Real(Real),
    /// An identifier that is not a keyword.
    Ident(&'src str),

    /// The keyword `int`.
    IntType,
    /// The keyword `double`.
    DoubleType,
    /// The keyword `bool`.
    BoolType,
    /// The keyword `true`.
    True,
    /// The keyword `false`.
    False,
    /// The keyword `if`.
    If,
    /// The keyword `then`.
    Then,
    /// The keyword `else`.
    Else,
    /// The keyword `while`.
    While,
    /// The keyword `do`.
    Do,

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `+=`
    PlusAssign,
    /// `=`
    Assign,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `!`
    Bang,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
}

impl<'src> Token<'src> {
    /// Returns the keyword token spelled `word`, if there is one.
    pub fn keyword(word: &str) -> Option<Self> {
        Some(match word {
            "int" => Token::IntType,
            "double" => Token::DoubleType,
            "bool" => Token::BoolType,
            "true" => Token::True,
            "false" => Token::False,
            "if" => Token::If,
            "then" => Token::Then,
            "else" => Token::Else,
            "while" => Token::While,
            "do" => Token::Do,
            _ => return None,
        })
    }
}

impl<'src> std::fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let glyph = match self {
            Token::Int(int) => return write!(f, "{int}"),
            Token::Real(real) => return write!(f, "{real:?}"),
            Token::Ident(name) => return f.write_str(name),
            Token::IntType => "int",
            Token::DoubleType => "double",
            Token::BoolType => "bool",
            Token::True => "true",
            Token::False => "false",
            Token::If => "if",
            Token::Then => "then",
            Token::Else => "else",
            Token::While => "while",
            Token::Do => "do",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::PlusAssign => "+=",
            Token::Assign => "=",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Bang => "!",
            Token::Less => "<",
            Token::LessEq => "<=",
            Token::Greater => ">",
            Token::GreaterEq => ">=",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::LeftBrace => "{",
            Token::RightBrace => "}",
            Token::Comma => ",",
            Token::Semicolon => ";",
        };
        f.write_str(glyph)
    }
}

/// A positioned token.
pub type SpannedToken<'src> = Spanned<Token<'src>>;

/// An owned sequence of positioned tokens, produced by [`tokenize`](super::tokenize).
#[derive(Debug, Clone, PartialEq)]
pub struct Tokens<'src> {
    tokens: Vec<SpannedToken<'src>>,
    /// The position just past the end of the source.
    end: Pos,
}

impl<'src> Tokens<'src> {
    /// Wraps an already lexed token vector, where `end` is the position just past
    /// the end of the source.
    pub fn new(tokens: Vec<SpannedToken<'src>>, end: Pos) -> Self {
        Self { tokens, end }
    }

    /// Returns the tokens as a slice, which is the input type of the parser.
    pub fn as_slice(&self) -> &[SpannedToken<'src>] {
        &self.tokens
    }

    /// Returns an iterator over the bare tokens, discarding positions.
    pub fn kinds(&self) -> impl Iterator<Item = Token<'src>> + '_ {
        self.tokens.iter().map(|spanned| spanned.node)
    }

    /// Returns the position just past the end of the source.
    pub fn end(&self) -> Pos {
        self.end
    }

    /// Returns the number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<'src> AsRef<[SpannedToken<'src>]> for Tokens<'src> {
    fn as_ref(&self) -> &[SpannedToken<'src>] {
        &self.tokens
    }
}
