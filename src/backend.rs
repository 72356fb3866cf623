//! The [`Backend`] trait and corresponding implementations.

use crate::check::Checked;

pub mod interpreter;
pub mod lower;
pub mod slot;
pub mod tree;

/// A trait for compiler backends which can consume checked programs and produce some IR.
pub trait Backend {
    /// The _internal representation_ used by this backend.
    type IR;
    /// The error produced when a program cannot be translated into [`Backend::IR`].
    type Error;

    /// Translates the given `program` into backend-specific IR.
    fn lower(&mut self, program: &Checked<'_>) -> Result<Self::IR, Self::Error>;
}

/// A trait for compiler backends that can execute programs.
pub trait Executor: Backend {
    /// The result of executing a program with this backend.
    type Output;
    /// The error produced when execution fails.
    type Fault;

    /// Executes the given `program` and produces some output.
    fn execute(&mut self, program: &Self::IR) -> Result<Self::Output, Self::Fault>;
}
