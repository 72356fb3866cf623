//! The typed expression families.

use crate::{
    backend::slot::{BoolSlot, IntSlot, RealSlot, SlotStore},
    kind::{Int, Real},
};

use super::{ArithOp, CmpOp, Evaluate, NodeCount};

/// An expression producing an integer.
#[derive(Debug, Clone, PartialEq)]
pub enum IntExpr {
    /// A literal.
    Lit(Int),
    /// A read of an integer slot.
    Load(IntSlot),
    /// `-x`
    Neg(Box<IntExpr>),
    /// `x op y`
    Arith(ArithOp, Box<IntExpr>, Box<IntExpr>),
    /// `x op c`
    ArithConst(ArithOp, Box<IntExpr>, Int),
    /// `c op x`, only for `+` and `-`.
    ConstArith(ArithOp, Int, Box<IntExpr>),
}

/// An expression producing a real.
///
/// Mixed integer/real operations have their own variants, which convert the
/// integer operand as they evaluate it.
#[derive(Debug, Clone, PartialEq)]
pub enum RealExpr {
    /// A literal.
    Lit(Real),
    /// A read of a real slot.
    Load(RealSlot),
    /// `-x`
    Neg(Box<RealExpr>),
    /// `x op y`
    Arith(ArithOp, Box<RealExpr>, Box<RealExpr>),
    /// `i op y`
    ArithIR(ArithOp, Box<IntExpr>, Box<RealExpr>),
    /// `x op i`
    ArithRI(ArithOp, Box<RealExpr>, Box<IntExpr>),
    /// `x op c`
    ArithConst(ArithOp, Box<RealExpr>, Real),
    /// `c op x`, only for `+` and `-`.
    ConstArith(ArithOp, Real, Box<RealExpr>),
    /// `i op c`
    IntArithConst(ArithOp, Box<IntExpr>, Real),
    /// `c op i`, only for `+` and `-`.
    ConstArithInt(ArithOp, Real, Box<IntExpr>),
    /// `x / y`
    Div(Box<RealExpr>, Box<RealExpr>),
    /// `i / y`
    DivIR(Box<IntExpr>, Box<RealExpr>),
    /// `x / i`
    DivRI(Box<RealExpr>, Box<IntExpr>),
    /// `i / j`
    DivII(Box<IntExpr>, Box<IntExpr>),
    /// `x / c`
    DivConst(Box<RealExpr>, Real),
    /// `i / c`
    IntDivConst(Box<IntExpr>, Real),
    /// `c / i`
    ConstDivInt(Real, Box<IntExpr>),
}

/// An expression producing a boolean.
#[derive(Debug, Clone, PartialEq)]
pub enum BoolExpr {
    /// A literal.
    Lit(bool),
    /// A read of a boolean slot.
    Load(BoolSlot),
    /// `!b`
    Not(Box<BoolExpr>),
    /// `i op j`
    CmpInt(CmpOp, Box<IntExpr>, Box<IntExpr>),
    /// `i op c`
    CmpIntConst(CmpOp, Box<IntExpr>, Int),
    /// `i op y`
    CmpIR(CmpOp, Box<IntExpr>, Box<RealExpr>),
    /// `x op i`
    CmpRI(CmpOp, Box<RealExpr>, Box<IntExpr>),
    /// `x op y`
    CmpReal(CmpOp, Box<RealExpr>, Box<RealExpr>),
    /// `a == b` or `a != b`
    CmpBool(CmpOp, Box<BoolExpr>, Box<BoolExpr>),
    /// `a && b`, skipping `b` when `a` is false.
    And(Box<BoolExpr>, Box<BoolExpr>),
    /// `a || b`, skipping `b` when `a` is true.
    Or(Box<BoolExpr>, Box<BoolExpr>),
}

impl IntExpr {
    /// Returns the value of `self` if it is a literal.
    pub fn lit(&self) -> Option<Int> {
        match self {
            IntExpr::Lit(int) => Some(*int),
            _ => None,
        }
    }
}

impl RealExpr {
    /// Returns the value of `self` if it is a literal.
    pub fn lit(&self) -> Option<Real> {
        match self {
            RealExpr::Lit(real) => Some(*real),
            _ => None,
        }
    }
}

impl BoolExpr {
    /// Returns the value of `self` if it is a literal.
    pub fn lit(&self) -> Option<bool> {
        match self {
            BoolExpr::Lit(atom) => Some(*atom),
            _ => None,
        }
    }
}

/// Widens an integer operand.
#[inline(always)]
fn widen(int: Int) -> Real {
    int as Real
}

impl Evaluate for IntExpr {
    type Output = Int;

    fn eval(&self, store: &SlotStore) -> Int {
        match self {
            IntExpr::Lit(int) => *int,
            IntExpr::Load(slot) => slot.get(store),
            IntExpr::Neg(inner) => inner.eval(store).wrapping_neg(),
            IntExpr::Arith(op, lhs, rhs) => op.apply(lhs.eval(store), rhs.eval(store)),
            IntExpr::ArithConst(op, lhs, c) => op.apply(lhs.eval(store), *c),
            IntExpr::ConstArith(op, c, rhs) => op.apply(*c, rhs.eval(store)),
        }
    }
}

impl Evaluate for RealExpr {
    type Output = Real;

    fn eval(&self, store: &SlotStore) -> Real {
        match self {
            RealExpr::Lit(real) => *real,
            RealExpr::Load(slot) => slot.get(store),
            RealExpr::Neg(inner) => -inner.eval(store),
            RealExpr::Arith(op, lhs, rhs) => op.apply(lhs.eval(store), rhs.eval(store)),
            RealExpr::ArithIR(op, lhs, rhs) => op.apply(widen(lhs.eval(store)), rhs.eval(store)),
            RealExpr::ArithRI(op, lhs, rhs) => op.apply(lhs.eval(store), widen(rhs.eval(store))),
            RealExpr::ArithConst(op, lhs, c) => op.apply(lhs.eval(store), *c),
            RealExpr::ConstArith(op, c, rhs) => op.apply(*c, rhs.eval(store)),
            RealExpr::IntArithConst(op, lhs, c) => op.apply(widen(lhs.eval(store)), *c),
            RealExpr::ConstArithInt(op, c, rhs) => op.apply(*c, widen(rhs.eval(store))),
            RealExpr::Div(lhs, rhs) => lhs.eval(store) / rhs.eval(store),
            RealExpr::DivIR(lhs, rhs) => widen(lhs.eval(store)) / rhs.eval(store),
            RealExpr::DivRI(lhs, rhs) => lhs.eval(store) / widen(rhs.eval(store)),
            RealExpr::DivII(lhs, rhs) => widen(lhs.eval(store)) / widen(rhs.eval(store)),
            RealExpr::DivConst(lhs, c) => lhs.eval(store) / c,
            RealExpr::IntDivConst(lhs, c) => widen(lhs.eval(store)) / c,
            RealExpr::ConstDivInt(c, rhs) => c / widen(rhs.eval(store)),
        }
    }
}

impl Evaluate for BoolExpr {
    type Output = bool;

    fn eval(&self, store: &SlotStore) -> bool {
        match self {
            BoolExpr::Lit(atom) => *atom,
            BoolExpr::Load(slot) => slot.get(store),
            BoolExpr::Not(inner) => !inner.eval(store),
            BoolExpr::CmpInt(op, lhs, rhs) => op.apply(lhs.eval(store), rhs.eval(store)),
            BoolExpr::CmpIntConst(op, lhs, c) => op.apply(lhs.eval(store), *c),
            BoolExpr::CmpIR(op, lhs, rhs) => op.apply(widen(lhs.eval(store)), rhs.eval(store)),
            BoolExpr::CmpRI(op, lhs, rhs) => op.apply(lhs.eval(store), widen(rhs.eval(store))),
            BoolExpr::CmpReal(op, lhs, rhs) => op.apply(lhs.eval(store), rhs.eval(store)),
            BoolExpr::CmpBool(op, lhs, rhs) => op.apply(lhs.eval(store), rhs.eval(store)),
            BoolExpr::And(lhs, rhs) => lhs.eval(store) && rhs.eval(store),
            BoolExpr::Or(lhs, rhs) => lhs.eval(store) || rhs.eval(store),
        }
    }
}

impl NodeCount for IntExpr {
    fn count_nodes(&self) -> usize {
        1 + match self {
            IntExpr::Lit(_) | IntExpr::Load(_) => 0,
            IntExpr::Neg(inner) => inner.count_nodes(),
            IntExpr::ArithConst(_, inner, _) | IntExpr::ConstArith(_, _, inner) => {
                inner.count_nodes()
            }
            IntExpr::Arith(_, lhs, rhs) => lhs.count_nodes() + rhs.count_nodes(),
        }
    }
}

impl NodeCount for RealExpr {
    fn count_nodes(&self) -> usize {
        1 + match self {
            RealExpr::Lit(_) | RealExpr::Load(_) => 0,
            RealExpr::Neg(inner)
            | RealExpr::ArithConst(_, inner, _)
            | RealExpr::ConstArith(_, _, inner)
            | RealExpr::DivConst(inner, _) => inner.count_nodes(),
            RealExpr::IntArithConst(_, inner, _)
            | RealExpr::ConstArithInt(_, _, inner)
            | RealExpr::IntDivConst(inner, _)
            | RealExpr::ConstDivInt(_, inner) => inner.count_nodes(),
            RealExpr::Arith(_, lhs, rhs) | RealExpr::Div(lhs, rhs) => {
                lhs.count_nodes() + rhs.count_nodes()
            }
            RealExpr::ArithIR(_, lhs, rhs) | RealExpr::DivIR(lhs, rhs) => {
                lhs.count_nodes() + rhs.count_nodes()
            }
            RealExpr::ArithRI(_, lhs, rhs) | RealExpr::DivRI(lhs, rhs) => {
                lhs.count_nodes() + rhs.count_nodes()
            }
            RealExpr::DivII(lhs, rhs) => lhs.count_nodes() + rhs.count_nodes(),
        }
    }
}

impl NodeCount for BoolExpr {
    fn count_nodes(&self) -> usize {
        1 + match self {
            BoolExpr::Lit(_) | BoolExpr::Load(_) => 0,
            BoolExpr::Not(inner) => inner.count_nodes(),
            BoolExpr::CmpIntConst(_, inner, _) => inner.count_nodes(),
            BoolExpr::CmpInt(_, lhs, rhs) => lhs.count_nodes() + rhs.count_nodes(),
            BoolExpr::CmpIR(_, lhs, rhs) => lhs.count_nodes() + rhs.count_nodes(),
            BoolExpr::CmpRI(_, lhs, rhs) => lhs.count_nodes() + rhs.count_nodes(),
            BoolExpr::CmpReal(_, lhs, rhs) => lhs.count_nodes() + rhs.count_nodes(),
            BoolExpr::CmpBool(_, lhs, rhs) | BoolExpr::And(lhs, rhs) | BoolExpr::Or(lhs, rhs) => {
                lhs.count_nodes() + rhs.count_nodes()
            }
        }
    }
}

impl std::fmt::Display for IntExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntExpr::Lit(int) => write!(f, "{int}"),
            IntExpr::Load(slot) => write!(f, "{slot}"),
            IntExpr::Neg(inner) => write!(f, "(-i {inner})"),
            IntExpr::Arith(op, lhs, rhs) => write!(f, "({op}ii {lhs} {rhs})"),
            IntExpr::ArithConst(op, lhs, c) => write!(f, "({op}iI {lhs} {c})"),
            IntExpr::ConstArith(op, c, rhs) => write!(f, "({op}Ii {c} {rhs})"),
        }
    }
}

impl std::fmt::Display for RealExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RealExpr::Lit(real) => write!(f, "{real:?}"),
            RealExpr::Load(slot) => write!(f, "{slot}"),
            RealExpr::Neg(inner) => write!(f, "(-r {inner})"),
            RealExpr::Arith(op, lhs, rhs) => write!(f, "({op}rr {lhs} {rhs})"),
            RealExpr::ArithIR(op, lhs, rhs) => write!(f, "({op}ir {lhs} {rhs})"),
            RealExpr::ArithRI(op, lhs, rhs) => write!(f, "({op}ri {lhs} {rhs})"),
            RealExpr::ArithConst(op, lhs, c) => write!(f, "({op}rR {lhs} {c:?})"),
            RealExpr::ConstArith(op, c, rhs) => write!(f, "({op}Rr {c:?} {rhs})"),
            RealExpr::IntArithConst(op, lhs, c) => write!(f, "({op}iR {lhs} {c:?})"),
            RealExpr::ConstArithInt(op, c, rhs) => write!(f, "({op}Ri {c:?} {rhs})"),
            RealExpr::Div(lhs, rhs) => write!(f, "(/rr {lhs} {rhs})"),
            RealExpr::DivIR(lhs, rhs) => write!(f, "(/ir {lhs} {rhs})"),
            RealExpr::DivRI(lhs, rhs) => write!(f, "(/ri {lhs} {rhs})"),
            RealExpr::DivII(lhs, rhs) => write!(f, "(/ii {lhs} {rhs})"),
            RealExpr::DivConst(lhs, c) => write!(f, "(/rR {lhs} {c:?})"),
            RealExpr::IntDivConst(lhs, c) => write!(f, "(/iR {lhs} {c:?})"),
            RealExpr::ConstDivInt(c, rhs) => write!(f, "(/Ri {c:?} {rhs})"),
        }
    }
}

impl std::fmt::Display for BoolExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoolExpr::Lit(atom) => write!(f, "{atom}"),
            BoolExpr::Load(slot) => write!(f, "{slot}"),
            BoolExpr::Not(inner) => write!(f, "(!b {inner})"),
            BoolExpr::CmpInt(op, lhs, rhs) => write!(f, "({op}ii {lhs} {rhs})"),
            BoolExpr::CmpIntConst(op, lhs, c) => write!(f, "({op}iI {lhs} {c})"),
            BoolExpr::CmpIR(op, lhs, rhs) => write!(f, "({op}ir {lhs} {rhs})"),
            BoolExpr::CmpRI(op, lhs, rhs) => write!(f, "({op}ri {lhs} {rhs})"),
            BoolExpr::CmpReal(op, lhs, rhs) => write!(f, "({op}rr {lhs} {rhs})"),
            BoolExpr::CmpBool(op, lhs, rhs) => write!(f, "({op}bb {lhs} {rhs})"),
            BoolExpr::And(lhs, rhs) => write!(f, "(&&bb {lhs} {rhs})"),
            BoolExpr::Or(lhs, rhs) => write!(f, "(||bb {lhs} {rhs})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(ints: &[Int], reals: &[Real]) -> (SlotStore, Vec<IntSlot>, Vec<RealSlot>) {
        let mut store = SlotStore::new();
        store.allocate(ints.len() + reals.len()).unwrap();

        let int_slots = (0..ints.len())
            .map(|i| store.bind::<Int>(i).unwrap())
            .collect::<Vec<_>>();
        let real_slots = (0..reals.len())
            .map(|i| store.bind::<Real>(ints.len() + i).unwrap())
            .collect::<Vec<_>>();

        for (slot, value) in int_slots.iter().zip(ints) {
            slot.set(&mut store, *value);
        }
        for (slot, value) in real_slots.iter().zip(reals) {
            slot.set(&mut store, *value);
        }

        (store, int_slots, real_slots)
    }

    #[test]
    fn constant_forms_match_their_generic_forms() {
        let (store, ints, _) = store_with(&[7], &[]);
        let x = || Box::new(IntExpr::Load(ints[0]));

        let folded = IntExpr::ConstArith(ArithOp::Sub, 10, x());
        let generic = IntExpr::Arith(ArithOp::Sub, Box::new(IntExpr::Lit(10)), x());
        assert_eq!(folded.eval(&store), 3);
        assert_eq!(folded.eval(&store), generic.eval(&store));

        let folded = BoolExpr::CmpIntConst(CmpOp::Less, x(), 5);
        assert!(!folded.eval(&store));
    }

    #[test]
    fn mixed_nodes_widen_the_integer_side() {
        let (store, ints, reals) = store_with(&[4], &[10.0]);
        let n = || Box::new(IntExpr::Load(ints[0]));
        let r = || Box::new(RealExpr::Load(reals[0]));

        assert_eq!(RealExpr::DivRI(r(), n()).eval(&store), 2.5);
        assert_eq!(RealExpr::DivII(n(), Box::new(IntExpr::Lit(8))).eval(&store), 0.5);
        assert_eq!(RealExpr::ConstDivInt(1.0, n()).eval(&store), 0.25);
        assert_eq!(RealExpr::ArithIR(ArithOp::Mul, n(), r()).eval(&store), 40.0);
        assert!(BoolExpr::CmpIR(CmpOp::Less, n(), r()).eval(&store));
    }

    #[test]
    fn real_division_by_zero_is_infinite() {
        let (store, ints, _) = store_with(&[0], &[]);
        let zero = Box::new(IntExpr::Load(ints[0]));
        assert_eq!(
            RealExpr::ConstDivInt(1.0, zero.clone()).eval(&store),
            Real::INFINITY
        );
        assert!(RealExpr::DivII(zero.clone(), zero).eval(&store).is_nan());
    }

    #[test]
    fn logic_short_circuits() {
        // the slot belongs to a larger store, so reading it from `empty` would panic
        let mut store = SlotStore::new();
        store.allocate(1).unwrap();
        let unreadable = store.bind::<bool>(0).unwrap();
        let empty = SlotStore::new();
        let poison = || Box::new(BoolExpr::Load(unreadable));

        assert!(!BoolExpr::And(Box::new(BoolExpr::Lit(false)), poison()).eval(&empty));
        assert!(BoolExpr::Or(Box::new(BoolExpr::Lit(true)), poison()).eval(&empty));
    }

    #[test]
    fn display_names_operand_shapes() {
        let (_, ints, reals) = store_with(&[0], &[0.0]);
        let expr = RealExpr::ArithRI(
            ArithOp::Add,
            Box::new(RealExpr::DivConst(Box::new(RealExpr::Load(reals[0])), 2.0)),
            Box::new(IntExpr::ArithConst(ArithOp::Mul, Box::new(IntExpr::Load(ints[0])), 3)),
        );

        assert_eq!(expr.to_string(), "(+ri (/rR $1 2.0) (*iI $0 3))");
        assert_eq!(expr.count_nodes(), 5);
    }
}
