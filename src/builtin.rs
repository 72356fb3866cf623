//! The built-in procedures, which are the only names a program may call.

use crate::kind::Kind;

/// A built-in output procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `PrintInt(i)`
    PrintInt,
    /// `PrintReal(r)`, which also accepts an integer argument.
    PrintReal,
    /// `PrintBool(b)`
    PrintBool,
}

impl Builtin {
    /// Looks up the builtin called `name`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PrintInt" => Some(Builtin::PrintInt),
            "PrintReal" => Some(Builtin::PrintReal),
            "PrintBool" => Some(Builtin::PrintBool),
            _ => None,
        }
    }

    /// Returns the source name of `self`.
    pub const fn name(self) -> &'static str {
        match self {
            Builtin::PrintInt => "PrintInt",
            Builtin::PrintReal => "PrintReal",
            Builtin::PrintBool => "PrintBool",
        }
    }

    /// Returns the kind of the single parameter of `self`.
    pub const fn param(self) -> Kind {
        match self {
            Builtin::PrintInt => Kind::Int,
            Builtin::PrintReal => Kind::Real,
            Builtin::PrintBool => Kind::Bool,
        }
    }

    /// Returns the number of arguments `self` takes.
    pub const fn arity(self) -> usize {
        1
    }
}

impl std::fmt::Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for builtin in [Builtin::PrintInt, Builtin::PrintReal, Builtin::PrintBool] {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::from_name("printint"), None);
    }
}
