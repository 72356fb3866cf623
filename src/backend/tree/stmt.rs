//! Execution tree statements.

use crate::{
    backend::slot::{BoolSlot, IntSlot, RealSlot},
    builtin::Builtin,
    kind::{Int, Real},
};

use super::{BoolExpr, Expr, IntExpr, NodeCount, RealExpr};

/// A specialized statement.
///
/// Assignments are split by the kind of their target, and by whether their value
/// is a constant or needs widening from an integer.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Runs each statement in order.
    Seq(Vec<Stmt>),
    /// Runs `then_branch` if `cond` holds, and `else_branch` (if any) otherwise.
    If {
        /// The condition, evaluated once.
        cond: BoolExpr,
        /// Run when `cond` holds.
        then_branch: Box<Stmt>,
        /// Run when `cond` does not hold.
        else_branch: Option<Box<Stmt>>,
    },
    /// Runs `body` for as long as `cond` holds, checking before every iteration.
    While {
        /// The condition, evaluated before every iteration.
        cond: BoolExpr,
        /// The loop body.
        body: Box<Stmt>,
    },
    /// `i = e`
    AssignInt(IntSlot, IntExpr),
    /// `i = c`
    AssignIntConst(IntSlot, Int),
    /// `x = e`
    AssignReal(RealSlot, RealExpr),
    /// `x = c`
    AssignRealConst(RealSlot, Real),
    /// `x = i`, widening the integer value.
    AssignRealInt(RealSlot, IntExpr),
    /// `b = e`
    AssignBool(BoolSlot, BoolExpr),
    /// `b = c`
    AssignBoolConst(BoolSlot, bool),
    /// `i += e`
    AddAssignInt(IntSlot, IntExpr),
    /// `i += c`
    AddAssignIntConst(IntSlot, Int),
    /// `x += e`
    AddAssignReal(RealSlot, RealExpr),
    /// `x += c`, including widened integer constants.
    AddAssignRealConst(RealSlot, Real),
    /// `x += i`, widening the integer value.
    AddAssignRealInt(RealSlot, IntExpr),
    /// A call to a builtin with its single argument.
    Call {
        /// The callee.
        builtin: Builtin,
        /// The argument, whose kind matches the builtin's parameter (or is an
        /// integer passed to [`Builtin::PrintReal`]).
        arg: Expr,
    },
}

impl NodeCount for Stmt {
    fn count_nodes(&self) -> usize {
        1 + match self {
            Stmt::Seq(stmts) => stmts.iter().map(NodeCount::count_nodes).sum(),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                cond.count_nodes()
                    + then_branch.count_nodes()
                    + else_branch.as_ref().map_or(0, |stmt| stmt.count_nodes())
            }
            Stmt::While { cond, body } => cond.count_nodes() + body.count_nodes(),
            Stmt::AssignInt(_, value) | Stmt::AddAssignInt(_, value) => value.count_nodes(),
            Stmt::AssignRealInt(_, value) | Stmt::AddAssignRealInt(_, value) => {
                value.count_nodes()
            }
            Stmt::AssignReal(_, value) | Stmt::AddAssignReal(_, value) => value.count_nodes(),
            Stmt::AssignBool(_, value) => value.count_nodes(),
            Stmt::AssignIntConst(..)
            | Stmt::AssignRealConst(..)
            | Stmt::AssignBoolConst(..)
            | Stmt::AddAssignIntConst(..)
            | Stmt::AddAssignRealConst(..) => 0,
            Stmt::Call { arg, .. } => arg.count_nodes(),
        }
    }
}

/// Indents every line after the first of `node`'s display by one tab.
fn indented(node: &impl std::fmt::Display) -> String {
    node.to_string().replace('\n', "\n\t")
}

impl std::fmt::Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::Seq(stmts) => {
                write!(f, "(seq")?;
                for stmt in stmts {
                    write!(f, "\n\t{}", indented(stmt))?;
                }
                write!(f, ")")
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                write!(f, "(if {cond}\n\t{}", indented(then_branch))?;
                if let Some(else_branch) = else_branch {
                    write!(f, "\n\t{}", indented(else_branch))?;
                }
                write!(f, ")")
            }
            Stmt::While { cond, body } => write!(f, "(while {cond}\n\t{})", indented(body)),
            Stmt::AssignInt(slot, value) => write!(f, "(=ii {slot} {value})"),
            Stmt::AssignIntConst(slot, c) => write!(f, "(=iI {slot} {c})"),
            Stmt::AssignReal(slot, value) => write!(f, "(=rr {slot} {value})"),
            Stmt::AssignRealConst(slot, c) => write!(f, "(=rR {slot} {c:?})"),
            Stmt::AssignRealInt(slot, value) => write!(f, "(=ri {slot} {value})"),
            Stmt::AssignBool(slot, value) => write!(f, "(=bb {slot} {value})"),
            Stmt::AssignBoolConst(slot, c) => write!(f, "(=bB {slot} {c})"),
            Stmt::AddAssignInt(slot, value) => write!(f, "(+=ii {slot} {value})"),
            Stmt::AddAssignIntConst(slot, c) => write!(f, "(+=iI {slot} {c})"),
            Stmt::AddAssignReal(slot, value) => write!(f, "(+=rr {slot} {value})"),
            Stmt::AddAssignRealConst(slot, c) => write!(f, "(+=rR {slot} {c:?})"),
            Stmt::AddAssignRealInt(slot, value) => write!(f, "(+=ri {slot} {value})"),
            Stmt::Call { builtin, arg } => write!(f, "({builtin} {arg})"),
        }
    }
}
