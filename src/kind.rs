//! Static value kinds and the operand-pair [`Combo`] codes used by the specializer.

/// The host type of integer values.
pub type Int = i64;

/// The host type of real values.
pub type Real = f64;

/// The static kind of a value, as fixed by a declaration or inferred by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A 64-bit signed integer.
    Int,
    /// An IEEE-754 double.
    Real,
    /// A boolean.
    Bool,
}

impl Kind {
    /// Returns the weight of `self` in a [`Combo`] code.
    #[inline(always)]
    pub const fn weight(self) -> u8 {
        match self {
            Kind::Int => 0,
            Kind::Real => 1,
            Kind::Bool => 2,
        }
    }

    /// Returns `true` if `self` is [`Kind::Int`] or [`Kind::Real`].
    pub const fn is_numeric(self) -> bool {
        matches!(self, Kind::Int | Kind::Real)
    }

    /// Returns `true` if a value of kind `from` may be stored in a slot of kind `self`.
    ///
    /// The only implicit conversion is integer to real.
    pub fn accepts(self, from: Kind) -> bool {
        self == from || (self == Kind::Real && from == Kind::Int)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Kind::Int => "int",
            Kind::Real => "double",
            Kind::Bool => "bool",
        })
    }
}

/// The combination code of an ordered pair of operand kinds, computed as
/// `left.weight() * 3 + right.weight()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Combo(u8);

impl Combo {
    /// int, int
    pub const II: Combo = Combo(0);
    /// int, real
    pub const IR: Combo = Combo(1);
    /// int, bool
    pub const IB: Combo = Combo(2);
    /// real, int
    pub const RI: Combo = Combo(3);
    /// real, real
    pub const RR: Combo = Combo(4);
    /// real, bool
    pub const RB: Combo = Combo(5);
    /// bool, int
    pub const BI: Combo = Combo(6);
    /// bool, real
    pub const BR: Combo = Combo(7);
    /// bool, bool
    pub const BB: Combo = Combo(8);

    /// Encodes the pair `(lhs, rhs)`.
    #[inline(always)]
    pub const fn of(lhs: Kind, rhs: Kind) -> Self {
        Combo(lhs.weight() * 3 + rhs.weight())
    }

    /// Returns the raw code in `0..9`.
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Returns `true` if both operands are numeric.
    pub const fn is_numeric(self) -> bool {
        matches!(self.0, 0 | 1 | 3 | 4)
    }
}

impl std::fmt::Display for Combo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.0 {
            0 => "int-int",
            1 => "int-real",
            2 => "int-bool",
            3 => "real-int",
            4 => "real-real",
            5 => "real-bool",
            6 => "bool-int",
            7 => "bool-real",
            _ => "bool-bool",
        };
        write!(f, "{name} ({})", self.0)
    }
}
