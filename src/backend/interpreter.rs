//! A tree-walk [`Interpreter`] for lowered programs.

use std::io::Write;

use thiserror::Error;

use crate::{
    builtin::Builtin,
    check::Checked,
    kind::Real,
};

use super::{
    lower::{lower, LowerError, Options},
    slot::SlotStore,
    tree::{ArithOp, Evaluate, Expr, KindMismatch, Stmt},
    Backend, Executor,
};

/// The ways a running program can fail.
#[derive(Debug, Error)]
pub enum RunError {
    /// The output sink could not be written to.
    #[error("failed to write program output")]
    Output(#[from] std::io::Error),
    /// An expression was evaluated as the wrong kind.
    #[error(transparent)]
    Mismatch(#[from] KindMismatch),
}

/// A lowered program, together with the number of slots its bindings index into.
///
/// Only [`Interpreter`]'s [`Backend::lower`] builds these, so every binding in
/// `root` is in range for a store of `slots` slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    root: Stmt,
    slots: usize,
}

impl Program {
    /// Returns the number of slots the program needs.
    pub fn slots(&self) -> usize {
        self.slots
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// A tree-walk interpreter, which executes lowered programs by walking the tree,
/// updating its slot store and writing builtin output to `W`.
#[derive(Debug)]
pub struct Interpreter<W> {
    /// The variables of the current program.
    store: SlotStore,
    /// Where builtins write their output.
    out: W,
    options: Options,
}

impl<W: Write> Interpreter<W> {
    /// Constructs an interpreter writing to `out`, with default lowering options.
    pub fn new(out: W) -> Self {
        Self::with_options(out, Options::default())
    }

    /// Constructs an interpreter writing to `out`.
    pub fn with_options(out: W, options: Options) -> Self {
        Self {
            store: SlotStore::new(),
            out,
            options,
        }
    }

    /// Returns the slot store, e.g. to inspect variables after a run.
    pub fn store(&self) -> &SlotStore {
        &self.store
    }

    /// Consumes `self` and returns the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs `program` against the current contents of the slot store.
    #[tracing::instrument(level = "debug", skip_all, fields(slots = self.store.len()))]
    fn run(&mut self, program: &Stmt) -> Result<(), RunError> {
        self.exec(program)?;
        self.out.flush()?;
        tracing::debug!("program finished");
        Ok(())
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<(), RunError> {
        let store = &mut self.store;

        match stmt {
            Stmt::Seq(stmts) => {
                for stmt in stmts {
                    self.exec(stmt)?;
                }
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if cond.eval(store) {
                    self.exec(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.exec(else_branch)?;
                }
            }
            Stmt::While { cond, body } => {
                while cond.eval(&self.store) {
                    self.exec(body)?;
                }
            }
            Stmt::AssignInt(slot, value) => {
                let value = value.eval(store);
                slot.set(store, value);
            }
            Stmt::AssignIntConst(slot, c) => slot.set(store, *c),
            Stmt::AssignReal(slot, value) => {
                let value = value.eval(store);
                slot.set(store, value);
            }
            Stmt::AssignRealConst(slot, c) => slot.set(store, *c),
            Stmt::AssignRealInt(slot, value) => {
                let value = value.eval(store) as Real;
                slot.set(store, value);
            }
            Stmt::AssignBool(slot, value) => {
                let value = value.eval(store);
                slot.set(store, value);
            }
            Stmt::AssignBoolConst(slot, c) => slot.set(store, *c),
            Stmt::AddAssignInt(slot, value) => {
                let value = ArithOp::Add.apply(slot.get(store), value.eval(store));
                slot.set(store, value);
            }
            Stmt::AddAssignIntConst(slot, c) => {
                let value = ArithOp::Add.apply(slot.get(store), *c);
                slot.set(store, value);
            }
            Stmt::AddAssignReal(slot, value) => {
                let value = slot.get(store) + value.eval(store);
                slot.set(store, value);
            }
            Stmt::AddAssignRealConst(slot, c) => {
                let value = slot.get(store) + c;
                slot.set(store, value);
            }
            Stmt::AddAssignRealInt(slot, value) => {
                let value = slot.get(store) + value.eval(store) as Real;
                slot.set(store, value);
            }
            Stmt::Call { builtin, arg } => self.call(*builtin, arg)?,
        }

        Ok(())
    }

    fn call(&mut self, builtin: Builtin, arg: &Expr) -> Result<(), RunError> {
        let store = &self.store;
        match (builtin, arg) {
            (Builtin::PrintReal, Expr::Int(int)) => writeln!(self.out, "{}", int.eval(store) as Real)?,
            (Builtin::PrintInt, arg) => writeln!(self.out, "{}", arg.eval_int(store)?)?,
            (Builtin::PrintReal, arg) => writeln!(self.out, "{}", arg.eval_real(store)?)?,
            (Builtin::PrintBool, arg) => writeln!(self.out, "{}", arg.eval_bool(store)?)?,
        }
        Ok(())
    }
}

impl<W: Write> Backend for Interpreter<W> {
    type IR = Program;
    type Error = LowerError;

    /// Lowers `program` against a fresh slot store sized to its symbol table,
    /// replacing the store of any previous program.
    fn lower(&mut self, program: &Checked<'_>) -> Result<Program, LowerError> {
        let mut store = SlotStore::new();
        store.allocate(program.symbols.len())?;
        self.store = store;

        let root = lower(program, &mut self.store, self.options)?;
        Ok(Program {
            root,
            slots: self.store.len(),
        })
    }
}

impl<W: Write> Executor for Interpreter<W> {
    type Output = ();
    type Fault = RunError;

    /// Runs `program` from zeroed slots, in a store of the size it was lowered
    /// against. Any program lowered earlier by this interpreter can still run.
    fn execute(&mut self, program: &Program) -> Result<(), RunError> {
        match self.store.len() == program.slots() {
            true => self.store.clear(),
            false => self.store = SlotStore::zeroed(program.slots()),
        }
        self.run(&program.root)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        backend::tree::{BoolExpr, IntExpr},
        check::check,
        kind::Kind,
        lexer::tokenize,
        parser::parse,
    };

    use super::*;

    fn run_source(source: &str) -> String {
        let tokens = tokenize(source).unwrap();
        let checked = check(&parse(&tokens).unwrap()).unwrap();

        let mut interpreter = Interpreter::new(Vec::new());
        let program = interpreter.lower(&checked).unwrap();
        interpreter.execute(&program).unwrap();
        String::from_utf8(interpreter.into_output()).unwrap()
    }

    #[test]
    fn check_summing_loop() {
        let output =
            run_source("int i = 1; int s = 0; while i < 5 do { s += i; i += 1 }; PrintInt(s)");
        assert_eq!(output, "10\n");
    }

    #[test]
    fn check_mixed_division() {
        let output = run_source("double r = 10.0; int n = 4; double q = r / n; PrintReal(q)");
        assert_eq!(output, "2.5\n");
    }

    #[test]
    fn check_boolean_slots() {
        let output = run_source("bool b = true; bool c = false; PrintBool(b)");
        assert_eq!(output, "true\n");

        let output = run_source(
            "int i = 7; bool b = true; double r = 0.5; bool c = false; \
            PrintInt(i); PrintBool(b); PrintReal(r); PrintBool(c)",
        );
        assert_eq!(output, "7\ntrue\n0.5\nfalse\n");
    }

    #[test]
    fn loops_check_their_condition_first() {
        assert_eq!(run_source("int n = 0; while false do n += 1; PrintInt(n)"), "0\n");
        assert_eq!(run_source("int i = 0; while i < 3 do i += 1; PrintInt(i)"), "3\n");
    }

    #[test]
    fn conditionals_pick_one_branch() {
        let source = "int x = 5; \
            if x > 3 then PrintInt(1) else PrintInt(2); \
            if x == 3 then PrintInt(3) else PrintInt(4); \
            if x != 5 then PrintInt(5)";
        assert_eq!(run_source(source), "1\n4\n");
    }

    #[test]
    fn integers_widen_into_reals() {
        assert_eq!(
            run_source("double d = 1; d += 2; PrintReal(d); int k = 3; d = k; d += k; PrintReal(d); PrintReal(k)"),
            "3\n6\n3\n"
        );
    }

    #[test]
    fn integer_overflow_wraps() {
        let output = run_source(
            "int big = 9223372036854775807; big += 1; PrintInt(big); PrintInt(-big)",
        );
        assert_eq!(output, "-9223372036854775808\n-9223372036854775808\n");
    }

    #[test]
    fn real_division_by_zero_follows_ieee() {
        let output = run_source("int z = 0; PrintReal(1 / z); PrintReal(-1.0 / z); PrintReal(z / z)");
        assert_eq!(output, "inf\n-inf\nNaN\n");
    }

    #[test]
    fn logic_operators_short_circuit() {
        let output = run_source(
            "int n = 0; bool t = true; \
            if t || 1 / n > 0 then PrintBool(true); \
            if !t && n == 0 then PrintBool(false) else PrintBool(t && n <= 0)",
        );
        assert_eq!(output, "true\ntrue\n");
    }

    #[test]
    fn declarations_in_loops_reinitialise() {
        let output = run_source(
            "int i = 0; while i < 2 do { int k = 10; k += i; PrintInt(k); i += 1 }",
        );
        assert_eq!(output, "10\n11\n");
    }

    #[test]
    fn one_slot_per_distinct_name() {
        let source = "int a = 1; double b = 2.0; bool c = a < 2; { int d = a; d += 1 }; a = 3";
        let tokens = tokenize(source).unwrap();
        let parsed = parse(&tokens).unwrap();
        let checked = check(&parsed).unwrap();

        let mut interpreter = Interpreter::new(std::io::sink());
        let program = interpreter.lower(&checked).unwrap();
        interpreter.execute(&program).unwrap();

        assert_eq!(parsed.names().len(), 4);
        assert_eq!(checked.symbols.len(), 4);
        assert_eq!(interpreter.store().len(), 4);

        let mut slots = checked
            .symbols
            .iter()
            .map(|(_, symbol)| symbol.slot)
            .collect::<Vec<_>>();
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots, vec![0, 1, 2, 3]);

        let a = checked.symbols.get("a").unwrap();
        assert_eq!(
            interpreter.store().load(a.slot, a.kind).map(|value| value.to_string()),
            Some("3".to_string())
        );
    }

    #[test]
    fn independent_lowerings_behave_identically() {
        let source = "double x = 0.5; int i = 0; while i < 4 do { x = x * 3 - i; i += 1 }; PrintReal(x)";
        let tokens = tokenize(source).unwrap();
        let checked = check(&parse(&tokens).unwrap()).unwrap();

        let mut first = Interpreter::new(Vec::new());
        let mut second = Interpreter::new(Vec::new());
        let first_program = first.lower(&checked).unwrap();
        let second_program = second.lower(&checked).unwrap();

        // executing twice starts from zeroed slots each time
        first.execute(&first_program).unwrap();
        first.execute(&first_program).unwrap();
        second.execute(&second_program).unwrap();
        second.execute(&second_program).unwrap();

        let first = String::from_utf8(first.into_output()).unwrap();
        let second = String::from_utf8(second.into_output()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.lines().count(), 2);
        assert_eq!(first.lines().next(), first.lines().nth(1));
    }

    #[test]
    fn earlier_programs_survive_relowering() {
        let mut interpreter = Interpreter::new(Vec::new());

        let tokens = tokenize("int a = 1; int b = 2; int c = 3; PrintInt(c)").unwrap();
        let larger = check(&parse(&tokens).unwrap()).unwrap();
        let larger = interpreter.lower(&larger).unwrap();

        let tokens = tokenize("int z = 0; PrintInt(z)").unwrap();
        let smaller = check(&parse(&tokens).unwrap()).unwrap();
        let smaller = interpreter.lower(&smaller).unwrap();
        assert_eq!(interpreter.store().len(), 1);

        interpreter.execute(&larger).unwrap();
        assert_eq!(interpreter.store().len(), larger.slots());
        interpreter.execute(&smaller).unwrap();
        interpreter.execute(&larger).unwrap();

        let output = String::from_utf8(interpreter.into_output()).unwrap();
        assert_eq!(output, "3\n0\n3\n");
    }

    #[test]
    fn mismatched_builtin_arguments_are_reported() {
        let mut interpreter = Interpreter::new(Vec::new());
        let program = Stmt::Call {
            builtin: Builtin::PrintBool,
            arg: Expr::Int(IntExpr::Lit(1)),
        };

        let err = interpreter.run(&program).unwrap_err();
        assert!(matches!(
            err,
            RunError::Mismatch(KindMismatch {
                expected: Kind::Bool,
                found: Kind::Int
            })
        ));
    }

    /// A sink that refuses every write.
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn output_failures_are_reported() {
        let mut interpreter = Interpreter::new(Broken);
        let program = Stmt::If {
            cond: BoolExpr::Lit(true),
            then_branch: Box::new(Stmt::Call {
                builtin: Builtin::PrintBool,
                arg: Expr::Bool(BoolExpr::Lit(true)),
            }),
            else_branch: None,
        };

        assert!(matches!(interpreter.run(&program), Err(RunError::Output(_))));
    }
}
