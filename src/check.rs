//! Static checking: name resolution, slot assignment and kind inference.
//!
//! The checker consumes a parsed [`Stmt`] and produces a [`Checked`] program, in
//! which every expression is annotated with its [`Kind`] and every declared name
//! has a slot in the [`SymbolTable`]. Scoping is global: a declaration inside a
//! block or loop body introduces a program-wide name.
//!
//! # Kind rules
//! - `+`, `-` and `*` need numeric operands, and produce `int` only when both
//!   operands are `int` (otherwise `double`).
//! - `/` needs numeric operands and always produces `double`.
//! - `<`, `<=`, `>` and `>=` need numeric operands; `==` and `!=` need two numeric
//!   or two `bool` operands. All comparisons produce `bool`.
//! - `&&`, `||` and `!` need `bool` operands, and unary `-` a numeric one.
//! - An `int` value may be stored in a `double` variable; no other conversion
//!   exists.

use thiserror::Error;

use crate::{
    ast::{BinOp, CheckedExpr, CheckedStmt, Expr, ExprNode, Stmt, StmtNode, UnOp},
    builtin::Builtin,
    kind::Kind,
    pos::Pos,
    symbol::SymbolTable,
};

/// A program that has passed checking.
#[derive(Debug, Clone, PartialEq)]
pub struct Checked<'src> {
    /// The annotated root statement.
    pub root: CheckedStmt<'src>,
    /// Every declared variable with its slot.
    pub symbols: SymbolTable<'src>,
}

/// The ways a program can fail to check.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// A declaration of a name that is already declared.
    #[error("`{name}` is already declared as {previous}")]
    Redeclared {
        /// The declared name.
        name: String,
        /// The kind of the earlier declaration.
        previous: Kind,
        /// The position of the second declaration.
        pos: Pos,
    },
    /// A use of a name that has no declaration.
    #[error("`{name}` is not declared")]
    Undeclared {
        /// The name.
        name: String,
        /// The position of the use.
        pos: Pos,
    },
    /// A value whose kind cannot be stored in its target.
    #[error("cannot store a {found} value in `{name}`, which is {expected}")]
    Mismatch {
        /// The target name.
        name: String,
        /// The kind of the target.
        expected: Kind,
        /// The kind of the value.
        found: Kind,
        /// The position of the value.
        pos: Pos,
    },
    /// A `+=` whose target is not numeric.
    #[error("`+=` needs a numeric target, but `{name}` is {kind}")]
    NonNumericTarget {
        /// The target name.
        name: String,
        /// The kind of the target.
        kind: Kind,
        /// The position of the statement.
        pos: Pos,
    },
    /// A binary operator applied to operands it does not accept.
    #[error("operator `{op}` cannot be applied to {lhs} and {rhs}")]
    BinaryOperands {
        /// The operator.
        op: BinOp,
        /// The kind of the left operand.
        lhs: Kind,
        /// The kind of the right operand.
        rhs: Kind,
        /// The position of the operation.
        pos: Pos,
    },
    /// A unary operator applied to an operand it does not accept.
    #[error("operator `{op}` cannot be applied to {operand}")]
    UnaryOperand {
        /// The operator.
        op: UnOp,
        /// The kind of the operand.
        operand: Kind,
        /// The position of the operation.
        pos: Pos,
    },
    /// An `if` or `while` condition that is not `bool`.
    #[error("a condition must be bool, found {found}")]
    Condition {
        /// The kind of the condition.
        found: Kind,
        /// The position of the condition.
        pos: Pos,
    },
    /// A builtin called with the wrong number of arguments.
    #[error("`{name}` takes {expected} argument(s), found {found}")]
    Arity {
        /// The callee.
        name: String,
        /// The number of parameters.
        expected: usize,
        /// The number of arguments given.
        found: usize,
        /// The position of the call.
        pos: Pos,
    },
    /// A builtin argument of the wrong kind.
    #[error("`{name}` expects a {expected} argument, found {found}")]
    Argument {
        /// The callee.
        name: String,
        /// The parameter kind.
        expected: Kind,
        /// The kind of the argument.
        found: Kind,
        /// The position of the argument.
        pos: Pos,
    },
}

impl CheckError {
    /// Returns the position of the node that failed to check.
    pub fn pos(&self) -> Pos {
        match self {
            CheckError::Redeclared { pos, .. }
            | CheckError::Undeclared { pos, .. }
            | CheckError::Mismatch { pos, .. }
            | CheckError::NonNumericTarget { pos, .. }
            | CheckError::BinaryOperands { pos, .. }
            | CheckError::UnaryOperand { pos, .. }
            | CheckError::Condition { pos, .. }
            | CheckError::Arity { pos, .. }
            | CheckError::Argument { pos, .. } => *pos,
        }
    }
}

/// Checks `program`, returning the annotated tree and its symbol table.
pub fn check<'src>(program: &Stmt<'src>) -> Result<Checked<'src>, CheckError> {
    let mut checker = Checker::default();
    let root = checker.stmt(program)?;
    tracing::debug!(slots = checker.symbols.len(), "checked program");

    Ok(Checked {
        root,
        symbols: checker.symbols,
    })
}

/// The state threaded through a single checking pass.
#[derive(Debug, Default)]
struct Checker<'src> {
    symbols: SymbolTable<'src>,
}

impl<'src> Checker<'src> {
    fn stmt(&mut self, stmt: &Stmt<'src>) -> Result<CheckedStmt<'src>, CheckError> {
        let pos = stmt.pos;
        let node = match &stmt.node {
            StmtNode::Seq(stmts) => StmtNode::Seq(
                stmts
                    .iter()
                    .map(|stmt| self.stmt(stmt))
                    .collect::<Result<_, _>>()?,
            ),
            StmtNode::Decl { kind, name, value } => {
                // the initialiser cannot see the name it initialises
                let value = self.expr(value)?;
                store(name, *kind, &value)?;

                if let Err(previous) = self.symbols.declare(*name, *kind) {
                    return Err(CheckError::Redeclared {
                        name: name.to_string(),
                        previous: previous.kind,
                        pos,
                    });
                }

                StmtNode::Decl {
                    kind: *kind,
                    name: *name,
                    value,
                }
            }
            StmtNode::Assign { name, value } => {
                let target = self.lookup(name, pos)?;
                let value = self.expr(value)?;
                store(name, target, &value)?;
                StmtNode::Assign { name: *name, value }
            }
            StmtNode::AddAssign { name, value } => {
                let target = self.lookup(name, pos)?;
                if !target.is_numeric() {
                    return Err(CheckError::NonNumericTarget {
                        name: name.to_string(),
                        kind: target,
                        pos,
                    });
                }

                let value = self.expr(value)?;
                store(name, target, &value)?;
                StmtNode::AddAssign { name: *name, value }
            }
            StmtNode::If {
                cond,
                then_branch,
                else_branch,
            } => StmtNode::If {
                cond: self.condition(cond)?,
                then_branch: Box::new(self.stmt(then_branch)?),
                else_branch: match else_branch {
                    Some(stmt) => Some(Box::new(self.stmt(stmt)?)),
                    None => None,
                },
            },
            StmtNode::While { cond, body } => StmtNode::While {
                cond: self.condition(cond)?,
                body: Box::new(self.stmt(body)?),
            },
            StmtNode::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.expr(arg))
                    .collect::<Result<Vec<_>, _>>()?;

                // unknown callees are left for lowering to reject
                if let Some(builtin) = Builtin::from_name(name) {
                    call(builtin, &args, pos)?;
                }

                StmtNode::Call { name: *name, args }
            }
        };

        Ok(Stmt::new(node, pos))
    }

    fn condition(&mut self, cond: &Expr<'src>) -> Result<CheckedExpr<'src>, CheckError> {
        let cond = self.expr(cond)?;
        match cond.ann {
            Kind::Bool => Ok(cond),
            found => Err(CheckError::Condition {
                found,
                pos: cond.pos,
            }),
        }
    }

    fn expr(&mut self, expr: &Expr<'src>) -> Result<CheckedExpr<'src>, CheckError> {
        let pos = expr.pos;
        let (node, ann) = match &expr.node {
            ExprNode::Int(int) => (ExprNode::Int(*int), Kind::Int),
            ExprNode::Real(real) => (ExprNode::Real(*real), Kind::Real),
            ExprNode::Bool(atom) => (ExprNode::Bool(*atom), Kind::Bool),
            ExprNode::Var(name) => (ExprNode::Var(*name), self.lookup(name, pos)?),
            ExprNode::Unary(op, inner) => {
                let inner = self.expr(inner)?;
                let ann = match (op, inner.ann) {
                    (UnOp::Neg, kind) if kind.is_numeric() => kind,
                    (UnOp::Not, Kind::Bool) => Kind::Bool,
                    (op, operand) => {
                        return Err(CheckError::UnaryOperand {
                            op: *op,
                            operand,
                            pos,
                        })
                    }
                };
                (ExprNode::Unary(*op, Box::new(inner)), ann)
            }
            ExprNode::Binary(op, lhs, rhs) => {
                let lhs = self.expr(lhs)?;
                let rhs = self.expr(rhs)?;
                let ann = binary(*op, lhs.ann, rhs.ann).ok_or(CheckError::BinaryOperands {
                    op: *op,
                    lhs: lhs.ann,
                    rhs: rhs.ann,
                    pos,
                })?;
                (ExprNode::Binary(*op, Box::new(lhs), Box::new(rhs)), ann)
            }
        };

        Ok(Expr { node, pos, ann })
    }

    fn lookup(&self, name: &str, pos: Pos) -> Result<Kind, CheckError> {
        self.symbols
            .get(name)
            .map(|symbol| symbol.kind)
            .ok_or_else(|| CheckError::Undeclared {
                name: name.to_string(),
                pos,
            })
    }
}

/// Returns the result kind of `op` applied to `lhs` and `rhs`, or `None` if the
/// operands are not allowed.
fn binary(op: BinOp, lhs: Kind, rhs: Kind) -> Option<Kind> {
    let numeric = lhs.is_numeric() && rhs.is_numeric();
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul if numeric => Some(match (lhs, rhs) {
            (Kind::Int, Kind::Int) => Kind::Int,
            _ => Kind::Real,
        }),
        BinOp::Div if numeric => Some(Kind::Real),
        BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq if numeric => {
            Some(Kind::Bool)
        }
        BinOp::Eq | BinOp::NotEq if numeric || (lhs == Kind::Bool && rhs == Kind::Bool) => {
            Some(Kind::Bool)
        }
        BinOp::And | BinOp::Or if lhs == Kind::Bool && rhs == Kind::Bool => Some(Kind::Bool),
        _ => None,
    }
}

/// Checks that `value` may be stored in the variable `name` of kind `target`.
fn store(name: &str, target: Kind, value: &CheckedExpr<'_>) -> Result<(), CheckError> {
    match target.accepts(value.ann) {
        true => Ok(()),
        false => Err(CheckError::Mismatch {
            name: name.to_string(),
            expected: target,
            found: value.ann,
            pos: value.pos,
        }),
    }
}

/// Checks the arity and argument kinds of a call to `builtin`.
fn call(builtin: Builtin, args: &[CheckedExpr<'_>], pos: Pos) -> Result<(), CheckError> {
    if args.len() != builtin.arity() {
        return Err(CheckError::Arity {
            name: builtin.name().to_string(),
            expected: builtin.arity(),
            found: args.len(),
            pos,
        });
    }

    match args.iter().find(|arg| !builtin.param().accepts(arg.ann)) {
        Some(arg) => Err(CheckError::Argument {
            name: builtin.name().to_string(),
            expected: builtin.param(),
            found: arg.ann,
            pos: arg.pos,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use crate::{lexer::tokenize, parser::parse, symbol::Symbol};

    use super::*;

    fn check_source(source: &str) -> Result<Checked<'_>, CheckError> {
        let tokens = tokenize(source).unwrap();
        let program = parse(&tokens).unwrap();
        check(&program)
    }

    fn kind_of(source: &str, expr: &str) -> Kind {
        let program = format!("{source}; bool probe = true; probe = {expr} == {expr}");
        let tokens = tokenize(&program).unwrap();
        let checked = check(&parse(&tokens).unwrap()).unwrap();

        let StmtNode::Seq(stmts) = checked.root.node else {
            panic!("top level is not a sequence");
        };
        let Some(StmtNode::Assign { value, .. }) = stmts.last().map(|stmt| &stmt.node) else {
            panic!("last statement is not an assignment");
        };
        let ExprNode::Binary(_, lhs, _) = &value.node else {
            panic!("probe is not a comparison");
        };
        lhs.ann
    }

    #[test]
    fn slots_follow_declaration_order() {
        let checked = check_source("int i = 1; double r = 2.0; { bool b = true }").unwrap();
        dbg!(&checked.symbols);

        assert_eq!(checked.symbols.len(), 3);
        assert_eq!(
            checked.symbols.get("b"),
            Some(Symbol {
                kind: Kind::Bool,
                slot: 2
            })
        );
    }

    #[test]
    fn arithmetic_kinds() {
        let vars = "int i = 1; double r = 1.0";
        assert_eq!(kind_of(vars, "i + i"), Kind::Int);
        assert_eq!(kind_of(vars, "i * r"), Kind::Real);
        assert_eq!(kind_of(vars, "i / i"), Kind::Real);
        assert_eq!(kind_of(vars, "-i"), Kind::Int);
        assert_eq!(kind_of(vars, "r - 1"), Kind::Real);
    }

    #[test]
    fn int_widens_into_real_targets() {
        assert!(check_source("int n = 4; double q = n; q += n; q = n * 2; PrintReal(n)").is_ok());

        let err = check_source("double r = 1.5; int n = r").unwrap_err();
        assert_eq!(
            err,
            CheckError::Mismatch {
                name: "n".to_string(),
                expected: Kind::Int,
                found: Kind::Real,
                pos: Pos::new(1, 25),
            }
        );
    }

    #[test]
    fn names_must_be_declared_once() {
        let err = check_source("x = 1").unwrap_err();
        assert!(matches!(err, CheckError::Undeclared { ref name, .. } if name == "x"));

        let err = check_source("int x = 1;\nbool x = true").unwrap_err();
        assert_eq!(err.pos(), Pos::new(2, 1));
        assert_eq!(err.to_string(), "`x` is already declared as int");

        let err = check_source("int x = x + 1").unwrap_err();
        assert!(matches!(err, CheckError::Undeclared { .. }));
    }

    #[test]
    fn operand_rules() {
        for source in [
            "bool b = true; int i = b + 1",
            "int i = 1; bool b = i && true",
            "bool b = 1 < true",
            "bool b = !3",
            "int i = -false",
            "bool b = true == 1",
        ] {
            assert!(check_source(source).is_err(), "{source:?} should not check");
        }

        assert!(check_source("bool b = true == false; bool c = 1 != 2.5").is_ok());
    }

    #[test]
    fn conditions_must_be_bool() {
        let err = check_source("int i = 1; while i do i += 1").unwrap_err();
        assert_eq!(
            err,
            CheckError::Condition {
                found: Kind::Int,
                pos: Pos::new(1, 18),
            }
        );
    }

    #[test]
    fn compound_addition_needs_a_numeric_target() {
        let err = check_source("bool b = true; b += true").unwrap_err();
        assert!(matches!(err, CheckError::NonNumericTarget { kind: Kind::Bool, .. }));
    }

    #[test]
    fn builtin_calls_are_checked() {
        let err = check_source("PrintInt(1, 2)").unwrap_err();
        assert!(matches!(err, CheckError::Arity { expected: 1, found: 2, .. }));

        let err = check_source("PrintBool(1)").unwrap_err();
        assert_eq!(err.to_string(), "`PrintBool` expects a bool argument, found int");

        // unknown names are for lowering to reject, but their arguments still check
        assert!(check_source("Frobnicate(1)").is_ok());
        assert!(check_source("Frobnicate(y)").is_err());
    }
}
