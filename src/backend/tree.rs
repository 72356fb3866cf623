//! The execution tree: specialized nodes that run directly against a [`SlotStore`].
//!
//! Expressions come in three typed families, [`IntExpr`], [`RealExpr`] and
//! [`BoolExpr`], each of which evaluates straight to its host type. Every binary
//! node is specialized for the kinds of its operands, and variables are read
//! through typed slot bindings, so evaluation never inspects a kind or looks up a
//! name.
//!
//! # Notation
//! The [`Display`](std::fmt::Display) implementations produce s-expressions in
//! which each operator is suffixed with the shapes of its operands: `i`, `r` and
//! `b` for integer, real and boolean subtrees, and `I` and `R` for embedded
//! integer and real constants. Slots are written `$n`. For example, `s += i` with
//! `s` in slot 1 and `i` in slot 0 lowers to `(+=ii $1 $0)`, and `i < 5` to
//! `(<iI $0 5)`.

use num_traits::{WrappingAdd, WrappingMul, WrappingSub};
use thiserror::Error;

use crate::{
    ast::BinOp,
    kind::{Int, Kind, Real},
};

use super::slot::SlotStore;

pub mod expr;
pub mod stmt;

pub use self::{
    expr::{BoolExpr, IntExpr, RealExpr},
    stmt::Stmt,
};

/// A SAM trait for evaluating expression trees against a [`SlotStore`].
pub trait Evaluate {
    /// The type of value produced by evaluation.
    type Output;

    /// Evaluates `self`, reading variables from `store`.
    fn eval(&self, store: &SlotStore) -> Self::Output;
}

/// A trait for trees with countable nodes.
pub trait NodeCount {
    /// Returns the number of nodes in `self`.
    fn count_nodes(&self) -> usize;
}

/// Arithmetic shared by the numeric kinds.
///
/// Integer arithmetic wraps on overflow; real arithmetic follows IEEE-754.
pub trait Arith: Copy {
    /// `self + rhs`
    fn add(self, rhs: Self) -> Self;
    /// `self - rhs`
    fn sub(self, rhs: Self) -> Self;
    /// `self * rhs`
    fn mul(self, rhs: Self) -> Self;
}

impl Arith for Int {
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        WrappingAdd::wrapping_add(&self, &rhs)
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        WrappingSub::wrapping_sub(&self, &rhs)
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        WrappingMul::wrapping_mul(&self, &rhs)
    }
}

impl Arith for Real {
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self + rhs
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }
}

/// The arithmetic operators that exist for both numeric kinds.
///
/// Division always produces a real, so it has dedicated [`RealExpr`] nodes
/// instead of an operator code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
}

impl ArithOp {
    /// Applies `self` to `lhs` and `rhs`.
    #[inline(always)]
    pub fn apply<T: Arith>(self, lhs: T, rhs: T) -> T {
        match self {
            ArithOp::Add => lhs.add(rhs),
            ArithOp::Sub => lhs.sub(rhs),
            ArithOp::Mul => lhs.mul(rhs),
        }
    }

    /// Returns the operator code for `op`, if it is one.
    pub fn from_bin(op: BinOp) -> Option<Self> {
        match op {
            BinOp::Add => Some(ArithOp::Add),
            BinOp::Sub => Some(ArithOp::Sub),
            BinOp::Mul => Some(ArithOp::Mul),
            _ => None,
        }
    }

    /// Returns `true` if a constant may be embedded on the left of `self`.
    pub fn embeds_left(self) -> bool {
        matches!(self, ArithOp::Add | ArithOp::Sub)
    }
}

impl std::fmt::Display for ArithOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
        })
    }
}

/// The comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEq,
    /// `>=`
    GreaterEq,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
}

impl CmpOp {
    /// Applies `self` to `lhs` and `rhs`.
    #[inline(always)]
    pub fn apply<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            CmpOp::Less => lhs < rhs,
            CmpOp::Greater => lhs > rhs,
            CmpOp::LessEq => lhs <= rhs,
            CmpOp::GreaterEq => lhs >= rhs,
            CmpOp::Eq => lhs == rhs,
            CmpOp::NotEq => lhs != rhs,
        }
    }

    /// Returns the operator code for `op`, if it is one.
    pub fn from_bin(op: BinOp) -> Option<Self> {
        match op {
            BinOp::Less => Some(CmpOp::Less),
            BinOp::Greater => Some(CmpOp::Greater),
            BinOp::LessEq => Some(CmpOp::LessEq),
            BinOp::GreaterEq => Some(CmpOp::GreaterEq),
            BinOp::Eq => Some(CmpOp::Eq),
            BinOp::NotEq => Some(CmpOp::NotEq),
            _ => None,
        }
    }

    /// Returns `true` for `==` and `!=`.
    pub fn is_equality(self) -> bool {
        matches!(self, CmpOp::Eq | CmpOp::NotEq)
    }
}

impl std::fmt::Display for CmpOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CmpOp::Less => "<",
            CmpOp::Greater => ">",
            CmpOp::LessEq => "<=",
            CmpOp::GreaterEq => ">=",
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
        })
    }
}

/// The error produced when an expression is evaluated as the wrong kind.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot evaluate a {found} expression as {expected}")]
pub struct KindMismatch {
    /// The kind that was asked for.
    pub expected: Kind,
    /// The kind of the expression.
    pub found: Kind,
}

/// An expression of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// An integer expression.
    Int(IntExpr),
    /// A real expression.
    Real(RealExpr),
    /// A boolean expression.
    Bool(BoolExpr),
}

impl Expr {
    /// Returns the kind of value `self` evaluates to.
    pub fn kind(&self) -> Kind {
        match self {
            Expr::Int(_) => Kind::Int,
            Expr::Real(_) => Kind::Real,
            Expr::Bool(_) => Kind::Bool,
        }
    }

    /// Evaluates `self` as an integer.
    pub fn eval_int(&self, store: &SlotStore) -> Result<Int, KindMismatch> {
        match self {
            Expr::Int(expr) => Ok(expr.eval(store)),
            _ => Err(self.mismatch(Kind::Int)),
        }
    }

    /// Evaluates `self` as a real.
    pub fn eval_real(&self, store: &SlotStore) -> Result<Real, KindMismatch> {
        match self {
            Expr::Real(expr) => Ok(expr.eval(store)),
            _ => Err(self.mismatch(Kind::Real)),
        }
    }

    /// Evaluates `self` as a boolean.
    pub fn eval_bool(&self, store: &SlotStore) -> Result<bool, KindMismatch> {
        match self {
            Expr::Bool(expr) => Ok(expr.eval(store)),
            _ => Err(self.mismatch(Kind::Bool)),
        }
    }

    fn mismatch(&self, expected: Kind) -> KindMismatch {
        KindMismatch {
            expected,
            found: self.kind(),
        }
    }
}

impl NodeCount for Expr {
    fn count_nodes(&self) -> usize {
        match self {
            Expr::Int(expr) => expr.count_nodes(),
            Expr::Real(expr) => expr.count_nodes(),
            Expr::Bool(expr) => expr.count_nodes(),
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Int(expr) => write!(f, "{expr}"),
            Expr::Real(expr) => write!(f, "{expr}"),
            Expr::Bool(expr) => write!(f, "{expr}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_wraps() {
        assert_eq!(ArithOp::Add.apply(Int::MAX, 1), Int::MIN);
        assert_eq!(ArithOp::Sub.apply(Int::MIN, 1), Int::MAX);
        assert_eq!(ArithOp::Mul.apply(Int::MAX, 2), -2);
        assert_eq!(ArithOp::Sub.apply(2.5, 0.5), 2.0);
    }

    #[test]
    fn comparisons_are_generic() {
        assert!(CmpOp::LessEq.apply(3, 3));
        assert!(CmpOp::Greater.apply(2.5, 2.0));
        assert!(CmpOp::NotEq.apply(true, false));
        assert!(!CmpOp::Eq.apply(Real::NAN, Real::NAN));
    }

    #[test]
    fn typed_accessors_reject_other_kinds() {
        let store = SlotStore::new();
        let expr = Expr::Real(RealExpr::Lit(2.5));

        assert_eq!(expr.eval_real(&store), Ok(2.5));
        assert_eq!(
            expr.eval_int(&store),
            Err(KindMismatch {
                expected: Kind::Int,
                found: Kind::Real
            })
        );
        assert!(Expr::Bool(BoolExpr::Lit(true)).eval_real(&store).is_err());
        assert_eq!(Expr::Int(IntExpr::Lit(7)).eval_int(&store), Ok(7));
    }
}
