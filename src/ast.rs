//! Syntax trees, before and after checking.
//!
//! Both trees share one shape: a [`Stmt`] or [`Expr`] is generic over an
//! annotation `A` carried by every expression node. The parser produces trees
//! annotated with `()`, and the checker produces trees annotated with the static
//! [`Kind`] of each expression (see [`CheckedStmt`] and [`CheckedExpr`]).
//!
//! The [`Display`](std::fmt::Display) implementations produce lisp-style
//! s-expressions.

use std::collections::HashSet;

use crate::{
    kind::{Int, Kind, Real},
    pos::Pos,
};

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
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
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinOp {
    /// Returns the source spelling of `self`.
    pub const fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    /// Arithmetic negation, `-`.
    Neg,
    /// Logical negation, `!`.
    Not,
}

impl std::fmt::Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            UnOp::Neg => "-",
            UnOp::Not => "!",
        })
    }
}

/// An expression node together with its position and annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr<'src, A = ()> {
    /// The shape of this expression.
    pub node: ExprNode<'src, A>,
    /// Where this expression starts.
    pub pos: Pos,
    /// The per-pass annotation, e.g. the static [`Kind`] after checking.
    pub ann: A,
}

/// The shapes an [`Expr`] can take.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode<'src, A = ()> {
    /// An integer literal.
    Int(Int),
    /// A real literal.
    Real(Real),
    /// `true` or `false`.
    Bool(bool),
    /// A variable reference.
    Var(&'src str),
    /// A unary operation.
    Unary(UnOp, Box<Expr<'src, A>>),
    /// A binary operation.
    Binary(BinOp, Box<Expr<'src, A>>, Box<Expr<'src, A>>),
}

/// A statement node together with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt<'src, A = ()> {
    /// The shape of this statement.
    pub node: StmtNode<'src, A>,
    /// Where this statement starts.
    pub pos: Pos,
}

/// The shapes a [`Stmt`] can take.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtNode<'src, A = ()> {
    /// A (left-to-right) sequence of statements, written `{ a; b; ... }` or
    /// forming the top level of a program.
    Seq(Vec<Stmt<'src, A>>),
    /// A typed declaration with its initial value, e.g. `int x = 1`.
    Decl {
        /// The declared kind.
        kind: Kind,
        /// The declared name.
        name: &'src str,
        /// The initial value.
        value: Expr<'src, A>,
    },
    /// A plain assignment to a declared variable, `x = e`.
    Assign {
        /// The target.
        name: &'src str,
        /// The assigned value.
        value: Expr<'src, A>,
    },
    /// A compound addition to a declared variable, `x += e`.
    AddAssign {
        /// The target.
        name: &'src str,
        /// The added value.
        value: Expr<'src, A>,
    },
    /// A conditional with an optional `else` branch.
    If {
        /// The condition between `if` and `then`.
        cond: Expr<'src, A>,
        /// The statement run when `cond` holds.
        then_branch: Box<Stmt<'src, A>>,
        /// The statement run otherwise, if any.
        else_branch: Option<Box<Stmt<'src, A>>>,
    },
    /// A pre-tested loop.
    While {
        /// The condition between `while` and `do`.
        cond: Expr<'src, A>,
        /// The loop body.
        body: Box<Stmt<'src, A>>,
    },
    /// A call statement, e.g. `PrintInt(x)`.
    Call {
        /// The callee name.
        name: &'src str,
        /// The arguments, in order.
        args: Vec<Expr<'src, A>>,
    },
}

/// An expression annotated with its static [`Kind`].
pub type CheckedExpr<'src> = Expr<'src, Kind>;

/// A statement whose expressions are annotated with their static [`Kind`]s.
pub type CheckedStmt<'src> = Stmt<'src, Kind>;

impl<'src> Expr<'src> {
    /// Constructs an unannotated expression at `pos`.
    pub fn new(node: ExprNode<'src>, pos: Pos) -> Self {
        Self { node, pos, ann: () }
    }
}

impl<'src, A> Expr<'src, A> {
    /// Returns the variables mentioned in `self`.
    pub fn names(&self) -> HashSet<&'src str> {
        match &self.node {
            ExprNode::Int(_) | ExprNode::Real(_) | ExprNode::Bool(_) => HashSet::new(),
            ExprNode::Var(name) => HashSet::from([*name]),
            ExprNode::Unary(_, inner) => inner.names(),
            ExprNode::Binary(_, lhs, rhs) => lhs.names().union(&rhs.names()).copied().collect(),
        }
    }

    /// Returns the number of nodes in `self`.
    pub fn count_nodes(&self) -> usize {
        1 + match &self.node {
            ExprNode::Int(_) | ExprNode::Real(_) | ExprNode::Bool(_) | ExprNode::Var(_) => 0,
            ExprNode::Unary(_, inner) => inner.count_nodes(),
            ExprNode::Binary(_, lhs, rhs) => lhs.count_nodes() + rhs.count_nodes(),
        }
    }
}

impl<'src, A> Stmt<'src, A> {
    /// Constructs a statement at `pos`.
    pub fn new(node: StmtNode<'src, A>, pos: Pos) -> Self {
        Self { node, pos }
    }

    /// Returns the variables mentioned in `self`.
    pub fn names(&self) -> HashSet<&'src str> {
        match &self.node {
            StmtNode::Seq(stmts) => stmts.iter().flat_map(Stmt::names).collect(),
            StmtNode::Decl { name, value, .. }
            | StmtNode::Assign { name, value }
            | StmtNode::AddAssign { name, value } => {
                let mut names = value.names();
                names.insert(*name);
                names
            }
            StmtNode::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let mut names = cond.names();
                names.extend(then_branch.names());
                names.extend(else_branch.iter().flat_map(|stmt| stmt.names()));
                names
            }
            StmtNode::While { cond, body } => cond.names().union(&body.names()).copied().collect(),
            StmtNode::Call { args, .. } => args.iter().flat_map(Expr::names).collect(),
        }
    }
}

impl<'src, A> std::fmt::Display for Expr<'src, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node {
            ExprNode::Int(int) => write!(f, "{int}"),
            ExprNode::Real(real) => write!(f, "{real:?}"),
            ExprNode::Bool(atom) => write!(f, "{atom}"),
            ExprNode::Var(name) => write!(f, "{name}"),
            ExprNode::Unary(op, inner) => write!(f, "({op} {inner})"),
            ExprNode::Binary(op, lhs, rhs) => write!(f, "({op} {lhs} {rhs})"),
        }
    }
}

impl<'src, A> std::fmt::Display for Stmt<'src, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node {
            StmtNode::Seq(stmts) => {
                let body = stmts
                    .iter()
                    .map(|stmt| format!("{stmt}").replace('\n', "\n\t"))
                    .collect::<Vec<_>>()
                    .join("\n\t");
                write!(f, "(seq\n\t{body})")
            }
            StmtNode::Decl { kind, name, value } => write!(f, "(decl {kind} {name} {value})"),
            StmtNode::Assign { name, value } => write!(f, "(assign {name} {value})"),
            StmtNode::AddAssign { name, value } => write!(f, "(add-assign {name} {value})"),
            StmtNode::If {
                cond,
                then_branch,
                else_branch,
            } => {
                write!(
                    f,
                    "(if {cond}\n\t{}",
                    format!("{then_branch}").replace('\n', "\n\t")
                )?;
                if let Some(else_branch) = else_branch {
                    write!(f, "\n\t{}", format!("{else_branch}").replace('\n', "\n\t"))?;
                }
                write!(f, ")")
            }
            StmtNode::While { cond, body } => write!(
                f,
                "(while {cond}\n\t{})",
                format!("{body}").replace('\n', "\n\t")
            ),
            StmtNode::Call { name, args } => {
                write!(f, "(call {name}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expr<'_> {
        Expr::new(ExprNode::Var(name), Pos::default())
    }

    fn int<'src>(value: Int) -> Expr<'src> {
        Expr::new(ExprNode::Int(value), Pos::default())
    }

    #[test]
    fn names_cover_targets_and_operands() {
        let stmt = Stmt::new(
            StmtNode::While {
                cond: Expr::new(
                    ExprNode::Binary(BinOp::Less, Box::new(var("i")), Box::new(int(5))),
                    Pos::default(),
                ),
                body: Box::new(Stmt::new(
                    StmtNode::AddAssign {
                        name: "s",
                        value: var("i"),
                    },
                    Pos::default(),
                )),
            },
            Pos::default(),
        );

        assert_eq!(stmt.names(), HashSet::from(["i", "s"]));
    }

    #[test]
    fn display_is_an_s_expression() {
        let expr = Expr::new(
            ExprNode::Binary(
                BinOp::Mul,
                Box::new(Expr::new(
                    ExprNode::Binary(BinOp::Add, Box::new(var("x")), Box::new(int(13))),
                    Pos::default(),
                )),
                Box::new(int(6)),
            ),
            Pos::default(),
        );

        assert_eq!(expr.to_string(), "(* (+ x 13) 6)");
        assert_eq!(expr.count_nodes(), 5);
    }
}
