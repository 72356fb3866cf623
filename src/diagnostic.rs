//! Pipeline-wide errors and their rendering against source text.

use thiserror::Error;

use crate::{
    backend::{interpreter::RunError, lower::LowerError},
    check::CheckError,
    lexer::LexError,
    parser::ParseError,
    pos::Pos,
};

/// An error from any stage of the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The source could not be split into tokens.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// The tokens did not form a program.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The program was ill-typed.
    #[error(transparent)]
    Check(#[from] CheckError),
    /// The checked program could not be lowered.
    #[error(transparent)]
    Lower(#[from] LowerError),
    /// The program failed while running.
    #[error(transparent)]
    Run(#[from] RunError),
}

impl Error {
    /// Returns the source position of the error, if it has one.
    pub fn pos(&self) -> Option<Pos> {
        match self {
            Error::Lex(err) => Some(err.pos),
            Error::Parse(err) => Some(err.pos),
            Error::Check(err) => Some(err.pos()),
            Error::Lower(err) => err.pos(),
            Error::Run(_) => None,
        }
    }

    /// Returns the name of the stage that produced the error.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Lex(_) => "lex",
            Error::Parse(_) => "parse",
            Error::Check(_) => "check",
            Error::Lower(_) => "lower",
            Error::Run(_) => "runtime",
        }
    }

    /// Renders the error against the `source` it came from, quoting the
    /// offending line with a caret under the column.
    pub fn render(&self, source: &str) -> String {
        let Some(pos) = self.pos() else {
            return format!("{} error: {self}", self.stage());
        };

        let header = format!("{} error at {pos}: {self}", self.stage());
        let Some(line) = source.lines().nth(pos.line.saturating_sub(1)) else {
            return header;
        };

        // keep tabs so the caret lines up under the same indentation
        let padding: String = line
            .chars()
            .take(pos.column.saturating_sub(1))
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();

        format!("{line}\n{padding}^\n{header}")
    }
}
