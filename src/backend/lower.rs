//! Lowering from a checked syntax tree into the execution tree.
//!
//! Every binary operator is specialized by the [`Combo`] code of its operand
//! kinds (see [`specialize`] for the full matrix), so that the resulting node
//! evaluates without inspecting kinds. Variables are resolved to typed slot
//! bindings once, here, and never looked up by name again.
//!
//! When [`Options::fold_constants`] is set, an operand that lowers to a literal is
//! embedded directly in its parent node:
//! - `x + c`, `c + x`, `x - c` and `c - x`;
//! - `x * c` and `x / c`;
//! - `c / i`, for an integer expression `i`;
//! - `i < c` and the other integer comparisons against a constant;
//! - `v = c` and `v += c` for numeric targets, and `b = c` for booleans.
//!
//! An integer constant next to a real operand is widened as it is embedded, and
//! when both operands are literals the right one is embedded. Negated literals
//! are folded into literals.

use thiserror::Error;

use crate::{
    ast::{BinOp, CheckedExpr, CheckedStmt, ExprNode, StmtNode, UnOp},
    builtin::Builtin,
    check::Checked,
    kind::{Combo, Kind, Real},
    pos::Pos,
    symbol::{Symbol, SymbolTable},
};

use super::{
    slot::{Slot, SlotError, SlotStore, SlotValue},
    tree::{ArithOp, BoolExpr, CmpOp, Expr, IntExpr, NodeCount, RealExpr, Stmt},
};

/// Options controlling how a program is lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Embed literal operands in their parent nodes.
    pub fold_constants: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fold_constants: true,
        }
    }
}

/// The ways lowering can fail.
///
/// None of these can be caused by a program that passed the checker; they
/// indicate an inconsistent checked tree, symbol table or slot store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LowerError {
    /// No specialized node exists for this operator and pair of operand kinds.
    #[error("operator `{op}` has no {combo} form")]
    UnsupportedOperator {
        /// The operator.
        op: BinOp,
        /// The operand kinds.
        combo: Combo,
        /// The position of the operation.
        pos: Pos,
    },
    /// No specialized node exists for this unary operator and operand kind.
    #[error("operator `{op}` has no {operand} form")]
    UnsupportedUnary {
        /// The operator.
        op: UnOp,
        /// The operand kind.
        operand: Kind,
        /// The position of the operation.
        pos: Pos,
    },
    /// A call to a name that is not a builtin.
    #[error("`{name}` is not a builtin")]
    UnknownBuiltin {
        /// The called name.
        name: String,
        /// The position of the call.
        pos: Pos,
    },
    /// A builtin called with the wrong number of arguments.
    #[error("`{builtin}` takes {} argument(s), found {found}", .builtin.arity())]
    Arity {
        /// The callee.
        builtin: Builtin,
        /// The number of arguments given.
        found: usize,
        /// The position of the call.
        pos: Pos,
    },
    /// A variable missing from the symbol table.
    #[error("`{name}` has no slot")]
    UnboundIdentifier {
        /// The variable name.
        name: String,
        /// The position of the reference.
        pos: Pos,
    },
    /// A node whose kind disagrees with its annotation or its use.
    #[error("expected a {expected} expression, found {found}")]
    KindMismatch {
        /// The kind that was required.
        expected: Kind,
        /// The kind that was lowered.
        found: Kind,
        /// The position of the node.
        pos: Pos,
    },
    /// The slot store refused an allocation or binding.
    #[error("{source}")]
    Slot {
        /// The underlying store error.
        source: SlotError,
        /// The position of the reference, if the error came from a binding.
        pos: Option<Pos>,
    },
}

impl LowerError {
    /// Returns the position of the node that failed to lower, if there is one.
    pub fn pos(&self) -> Option<Pos> {
        match self {
            LowerError::UnsupportedOperator { pos, .. }
            | LowerError::UnsupportedUnary { pos, .. }
            | LowerError::UnknownBuiltin { pos, .. }
            | LowerError::Arity { pos, .. }
            | LowerError::UnboundIdentifier { pos, .. }
            | LowerError::KindMismatch { pos, .. } => Some(*pos),
            LowerError::Slot { pos, .. } => *pos,
        }
    }
}

impl From<SlotError> for LowerError {
    fn from(source: SlotError) -> Self {
        LowerError::Slot { source, pos: None }
    }
}

/// Returns the result kind of `op` applied to operands with the kinds in `combo`,
/// or `None` if no such node exists.
///
/// | operator          | ii   | ir, ri, rr | bb   | ib, rb, bi, br |
/// |-------------------|------|------------|------|----------------|
/// | `+` `-` `*`       | int  | double     | -    | -              |
/// | `/`               | double | double   | -    | -              |
/// | `<` `>` `<=` `>=` | bool | bool       | -    | -              |
/// | `==` `!=`         | bool | bool       | bool | -              |
/// | `&&` `\|\|`       | -    | -          | bool | -              |
pub fn specialize(op: BinOp, combo: Combo) -> Option<Kind> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul => match combo {
            Combo::II => Some(Kind::Int),
            Combo::IR | Combo::RI | Combo::RR => Some(Kind::Real),
            _ => None,
        },
        BinOp::Div => combo.is_numeric().then_some(Kind::Real),
        BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq => {
            combo.is_numeric().then_some(Kind::Bool)
        }
        BinOp::Eq | BinOp::NotEq => (combo.is_numeric() || combo == Combo::BB).then_some(Kind::Bool),
        BinOp::And | BinOp::Or => (combo == Combo::BB).then_some(Kind::Bool),
    }
}

/// Lowers `program` into an execution tree whose bindings point into `store`.
///
/// The store must already be allocated with at least one slot per symbol, and
/// is frozen before any node is lowered.
#[tracing::instrument(level = "debug", skip_all, fields(slots = program.symbols.len()))]
pub fn lower(
    program: &Checked<'_>,
    store: &mut SlotStore,
    options: Options,
) -> Result<Stmt, LowerError> {
    store.freeze();
    let mut lowerer = Lowerer {
        symbols: &program.symbols,
        store,
        options,
    };

    let root = lowerer.stmt(&program.root)?;
    tracing::debug!(nodes = root.count_nodes(), "lowered program");
    Ok(root)
}

/// The state threaded through a single lowering pass.
struct Lowerer<'a, 'src> {
    symbols: &'a SymbolTable<'src>,
    store: &'a mut SlotStore,
    options: Options,
}

impl<'a, 'src> Lowerer<'a, 'src> {
    fn stmt(&mut self, stmt: &CheckedStmt<'src>) -> Result<Stmt, LowerError> {
        let pos = stmt.pos;
        match &stmt.node {
            StmtNode::Seq(stmts) => Ok(Stmt::Seq(
                stmts
                    .iter()
                    .map(|stmt| self.stmt(stmt))
                    .collect::<Result<_, _>>()?,
            )),
            // a declaration stores its initial value every time it runs
            StmtNode::Decl { name, value, .. } | StmtNode::Assign { name, value } => {
                self.assign(name, value, pos)
            }
            StmtNode::AddAssign { name, value } => self.add_assign(name, value, pos),
            StmtNode::If {
                cond,
                then_branch,
                else_branch,
            } => Ok(Stmt::If {
                cond: self.bool(cond)?,
                then_branch: Box::new(self.stmt(then_branch)?),
                else_branch: match else_branch {
                    Some(stmt) => Some(Box::new(self.stmt(stmt)?)),
                    None => None,
                },
            }),
            StmtNode::While { cond, body } => Ok(Stmt::While {
                cond: self.bool(cond)?,
                body: Box::new(self.stmt(body)?),
            }),
            StmtNode::Call { name, args } => self.call(name, args, pos),
        }
    }

    fn assign(
        &mut self,
        name: &str,
        value: &CheckedExpr<'src>,
        pos: Pos,
    ) -> Result<Stmt, LowerError> {
        let target = self.symbol(name, pos)?;
        let value = self.expr(value)?;
        let fold = self.options.fold_constants;

        Ok(match (target.kind, value) {
            (Kind::Int, Expr::Int(value)) => {
                let slot = self.bind(target, pos)?;
                match value.lit().filter(|_| fold) {
                    Some(c) => Stmt::AssignIntConst(slot, c),
                    None => Stmt::AssignInt(slot, value),
                }
            }
            (Kind::Real, Expr::Real(value)) => {
                let slot = self.bind(target, pos)?;
                match value.lit().filter(|_| fold) {
                    Some(c) => Stmt::AssignRealConst(slot, c),
                    None => Stmt::AssignReal(slot, value),
                }
            }
            (Kind::Real, Expr::Int(value)) => {
                let slot = self.bind(target, pos)?;
                match value.lit().filter(|_| fold) {
                    Some(c) => Stmt::AssignRealConst(slot, c as Real),
                    None => Stmt::AssignRealInt(slot, value),
                }
            }
            (Kind::Bool, Expr::Bool(value)) => {
                let slot = self.bind(target, pos)?;
                match value.lit().filter(|_| fold) {
                    Some(c) => Stmt::AssignBoolConst(slot, c),
                    None => Stmt::AssignBool(slot, value),
                }
            }
            (expected, value) => {
                return Err(LowerError::KindMismatch {
                    expected,
                    found: value.kind(),
                    pos,
                })
            }
        })
    }

    fn add_assign(
        &mut self,
        name: &str,
        value: &CheckedExpr<'src>,
        pos: Pos,
    ) -> Result<Stmt, LowerError> {
        let target = self.symbol(name, pos)?;
        let value = self.expr(value)?;
        let fold = self.options.fold_constants;

        Ok(match (target.kind, value) {
            (Kind::Int, Expr::Int(value)) => {
                let slot = self.bind(target, pos)?;
                match value.lit().filter(|_| fold) {
                    Some(c) => Stmt::AddAssignIntConst(slot, c),
                    None => Stmt::AddAssignInt(slot, value),
                }
            }
            (Kind::Real, Expr::Real(value)) => {
                let slot = self.bind(target, pos)?;
                match value.lit().filter(|_| fold) {
                    Some(c) => Stmt::AddAssignRealConst(slot, c),
                    None => Stmt::AddAssignReal(slot, value),
                }
            }
            (Kind::Real, Expr::Int(value)) => {
                let slot = self.bind(target, pos)?;
                match value.lit().filter(|_| fold) {
                    Some(c) => Stmt::AddAssignRealConst(slot, c as Real),
                    None => Stmt::AddAssignRealInt(slot, value),
                }
            }
            (target, value) => {
                return Err(LowerError::UnsupportedOperator {
                    op: BinOp::Add,
                    combo: Combo::of(target, value.kind()),
                    pos,
                })
            }
        })
    }

    fn call(
        &mut self,
        name: &str,
        args: &[CheckedExpr<'src>],
        pos: Pos,
    ) -> Result<Stmt, LowerError> {
        let builtin = Builtin::from_name(name).ok_or_else(|| LowerError::UnknownBuiltin {
            name: name.to_string(),
            pos,
        })?;

        let [arg] = args else {
            return Err(LowerError::Arity {
                builtin,
                found: args.len(),
                pos,
            });
        };

        let lowered = self.expr(arg)?;
        match builtin.param().accepts(lowered.kind()) {
            true => Ok(Stmt::Call {
                builtin,
                arg: lowered,
            }),
            false => Err(LowerError::KindMismatch {
                expected: builtin.param(),
                found: lowered.kind(),
                pos: arg.pos,
            }),
        }
    }

    fn bool(&mut self, expr: &CheckedExpr<'src>) -> Result<BoolExpr, LowerError> {
        match self.expr(expr)? {
            Expr::Bool(expr) => Ok(expr),
            other => Err(LowerError::KindMismatch {
                expected: Kind::Bool,
                found: other.kind(),
                pos: expr.pos,
            }),
        }
    }

    fn expr(&mut self, expr: &CheckedExpr<'src>) -> Result<Expr, LowerError> {
        let pos = expr.pos;
        let lowered = match &expr.node {
            ExprNode::Int(int) => Expr::Int(IntExpr::Lit(*int)),
            ExprNode::Real(real) => Expr::Real(RealExpr::Lit(*real)),
            ExprNode::Bool(atom) => Expr::Bool(BoolExpr::Lit(*atom)),
            ExprNode::Var(name) => {
                let symbol = self.symbol(name, pos)?;
                match symbol.kind {
                    Kind::Int => Expr::Int(IntExpr::Load(self.bind(symbol, pos)?)),
                    Kind::Real => Expr::Real(RealExpr::Load(self.bind(symbol, pos)?)),
                    Kind::Bool => Expr::Bool(BoolExpr::Load(self.bind(symbol, pos)?)),
                }
            }
            ExprNode::Unary(op, inner) => {
                let inner = self.expr(inner)?;
                let operand = inner.kind();
                self.unary(*op, inner)
                    .ok_or(LowerError::UnsupportedUnary {
                        op: *op,
                        operand,
                        pos,
                    })?
            }
            ExprNode::Binary(op, lhs, rhs) => {
                let lhs = self.expr(lhs)?;
                let rhs = self.expr(rhs)?;
                let combo = Combo::of(lhs.kind(), rhs.kind());
                let unsupported = LowerError::UnsupportedOperator { op: *op, combo, pos };

                specialize(*op, combo).ok_or(unsupported.clone())?;
                let lowered = self.binary(*op, lhs, rhs).ok_or(unsupported)?;
                tracing::trace!(%op, %combo, node = %lowered, "specialized operator");
                lowered
            }
        };

        match lowered.kind() == expr.ann {
            true => Ok(lowered),
            false => Err(LowerError::KindMismatch {
                expected: expr.ann,
                found: lowered.kind(),
                pos,
            }),
        }
    }

    fn unary(&self, op: UnOp, inner: Expr) -> Option<Expr> {
        let fold = self.options.fold_constants;
        Some(match (op, inner) {
            (UnOp::Neg, Expr::Int(inner)) => Expr::Int(match inner.lit().filter(|_| fold) {
                Some(c) => IntExpr::Lit(c.wrapping_neg()),
                None => IntExpr::Neg(Box::new(inner)),
            }),
            (UnOp::Neg, Expr::Real(inner)) => Expr::Real(match inner.lit().filter(|_| fold) {
                Some(c) => RealExpr::Lit(-c),
                None => RealExpr::Neg(Box::new(inner)),
            }),
            (UnOp::Not, Expr::Bool(inner)) => Expr::Bool(match inner.lit().filter(|_| fold) {
                Some(c) => BoolExpr::Lit(!c),
                None => BoolExpr::Not(Box::new(inner)),
            }),
            _ => return None,
        })
    }

    fn binary(&self, op: BinOp, lhs: Expr, rhs: Expr) -> Option<Expr> {
        if let Some(op) = ArithOp::from_bin(op) {
            return self.arith(op, lhs, rhs);
        }

        match (op, lhs, rhs) {
            (BinOp::Div, lhs, rhs) => self.div(lhs, rhs),
            (BinOp::And, Expr::Bool(lhs), Expr::Bool(rhs)) => {
                Some(Expr::Bool(BoolExpr::And(Box::new(lhs), Box::new(rhs))))
            }
            (BinOp::Or, Expr::Bool(lhs), Expr::Bool(rhs)) => {
                Some(Expr::Bool(BoolExpr::Or(Box::new(lhs), Box::new(rhs))))
            }
            (op, lhs, rhs) => self.cmp(CmpOp::from_bin(op)?, lhs, rhs),
        }
    }

    fn arith(&self, op: ArithOp, lhs: Expr, rhs: Expr) -> Option<Expr> {
        let fold = self.options.fold_constants;
        let left = op.embeds_left();

        Some(match (lhs, rhs) {
            (Expr::Int(l), Expr::Int(r)) => Expr::Int(
                match (l.lit().filter(|_| fold), r.lit().filter(|_| fold)) {
                    (_, Some(c)) => IntExpr::ArithConst(op, Box::new(l), c),
                    (Some(c), None) if left => IntExpr::ConstArith(op, c, Box::new(r)),
                    _ => IntExpr::Arith(op, Box::new(l), Box::new(r)),
                },
            ),
            (Expr::Int(l), Expr::Real(r)) => Expr::Real(
                match (l.lit().filter(|_| fold), r.lit().filter(|_| fold)) {
                    (_, Some(c)) => RealExpr::IntArithConst(op, Box::new(l), c),
                    (Some(c), None) if left => RealExpr::ConstArith(op, c as Real, Box::new(r)),
                    _ => RealExpr::ArithIR(op, Box::new(l), Box::new(r)),
                },
            ),
            (Expr::Real(l), Expr::Int(r)) => Expr::Real(
                match (l.lit().filter(|_| fold), r.lit().filter(|_| fold)) {
                    (_, Some(c)) => RealExpr::ArithConst(op, Box::new(l), c as Real),
                    (Some(c), None) if left => RealExpr::ConstArithInt(op, c, Box::new(r)),
                    _ => RealExpr::ArithRI(op, Box::new(l), Box::new(r)),
                },
            ),
            (Expr::Real(l), Expr::Real(r)) => Expr::Real(
                match (l.lit().filter(|_| fold), r.lit().filter(|_| fold)) {
                    (_, Some(c)) => RealExpr::ArithConst(op, Box::new(l), c),
                    (Some(c), None) if left => RealExpr::ConstArith(op, c, Box::new(r)),
                    _ => RealExpr::Arith(op, Box::new(l), Box::new(r)),
                },
            ),
            _ => return None,
        })
    }

    fn div(&self, lhs: Expr, rhs: Expr) -> Option<Expr> {
        let fold = self.options.fold_constants;

        Some(Expr::Real(match (lhs, rhs) {
            (Expr::Int(l), Expr::Int(r)) => {
                match (l.lit().filter(|_| fold), r.lit().filter(|_| fold)) {
                    (_, Some(c)) => RealExpr::IntDivConst(Box::new(l), c as Real),
                    (Some(c), None) => RealExpr::ConstDivInt(c as Real, Box::new(r)),
                    _ => RealExpr::DivII(Box::new(l), Box::new(r)),
                }
            }
            (Expr::Int(l), Expr::Real(r)) => match r.lit().filter(|_| fold) {
                Some(c) => RealExpr::IntDivConst(Box::new(l), c),
                None => RealExpr::DivIR(Box::new(l), Box::new(r)),
            },
            (Expr::Real(l), Expr::Int(r)) => {
                match (l.lit().filter(|_| fold), r.lit().filter(|_| fold)) {
                    (_, Some(c)) => RealExpr::DivConst(Box::new(l), c as Real),
                    (Some(c), None) => RealExpr::ConstDivInt(c, Box::new(r)),
                    _ => RealExpr::DivRI(Box::new(l), Box::new(r)),
                }
            }
            (Expr::Real(l), Expr::Real(r)) => match r.lit().filter(|_| fold) {
                Some(c) => RealExpr::DivConst(Box::new(l), c),
                None => RealExpr::Div(Box::new(l), Box::new(r)),
            },
            _ => return None,
        }))
    }

    fn cmp(&self, op: CmpOp, lhs: Expr, rhs: Expr) -> Option<Expr> {
        let fold = self.options.fold_constants;

        Some(Expr::Bool(match (lhs, rhs) {
            (Expr::Int(l), Expr::Int(r)) => match r.lit().filter(|_| fold) {
                Some(c) => BoolExpr::CmpIntConst(op, Box::new(l), c),
                None => BoolExpr::CmpInt(op, Box::new(l), Box::new(r)),
            },
            (Expr::Int(l), Expr::Real(r)) => BoolExpr::CmpIR(op, Box::new(l), Box::new(r)),
            (Expr::Real(l), Expr::Int(r)) => BoolExpr::CmpRI(op, Box::new(l), Box::new(r)),
            (Expr::Real(l), Expr::Real(r)) => BoolExpr::CmpReal(op, Box::new(l), Box::new(r)),
            (Expr::Bool(l), Expr::Bool(r)) if op.is_equality() => {
                BoolExpr::CmpBool(op, Box::new(l), Box::new(r))
            }
            _ => return None,
        }))
    }

    fn symbol(&self, name: &str, pos: Pos) -> Result<Symbol, LowerError> {
        self.symbols
            .get(name)
            .ok_or_else(|| LowerError::UnboundIdentifier {
                name: name.to_string(),
                pos,
            })
    }

    fn bind<T: SlotValue>(&mut self, symbol: Symbol, pos: Pos) -> Result<Slot<T>, LowerError> {
        if symbol.kind != T::KIND {
            return Err(LowerError::KindMismatch {
                expected: symbol.kind,
                found: T::KIND,
                pos,
            });
        }

        self.store
            .bind(symbol.slot)
            .map_err(|source| LowerError::Slot {
                source,
                pos: Some(pos),
            })
    }
}
