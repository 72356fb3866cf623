//! The command-line interface for `slotwalk`.
//!
//! Usage (as with any other [`argh`] interface) involves first invoking [`argh::from_env()`], and
//! then processing the resulting data (in this case an instance of [`Cli`]).

use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context};
use argh::FromArgs;

use crate::{
    backend::{interpreter::Interpreter, lower::Options, Backend, Executor},
    check::{check, Checked},
    diagnostic::Error,
    lexer::tokenize,
    parser::parse,
};

/// A specializing tree-walk interpreter for a small imperative language.
#[derive(Debug, Clone, FromArgs)]
pub struct Cli {
    #[argh(subcommand)]
    cmd: CliSubCommand,
}

impl Cli {
    /// Consumes `self` and processes the given subcommand.
    pub fn handle(self) -> anyhow::Result<()> {
        match self.cmd {
            CliSubCommand::Run(args) => args.run(),
            CliSubCommand::Check(args) => args.run(),
            CliSubCommand::Lower(args) => args.run(),
        }
    }
}

/// The set of the distinct subcommands available to be passed to the [`Cli`].
#[derive(Debug, Clone, FromArgs)]
#[argh(subcommand)]
enum CliSubCommand {
    Run(Run),
    Check(Check),
    Lower(Lower),
}

/// Runs a program with the tree-walk interpreter, printing builtin output to stdout.
#[derive(Debug, Clone, FromArgs)]
#[argh(subcommand, name = "run")]
struct Run {
    /// a path to a program file
    #[argh(positional)]
    file: Option<PathBuf>,

    /// run the given source text instead of a file
    #[argh(option)]
    eval: Option<String>,

    /// print the lowered execution tree to stderr before running
    #[argh(switch)]
    dump: bool,

    /// do not embed constant operands into their parent nodes
    #[argh(switch)]
    no_fold: bool,
}

impl Run {
    fn run(self) -> anyhow::Result<()> {
        let source = match (self.file, self.eval) {
            (Some(file), None) => read_source(&file)?,
            (None, Some(source)) => source,
            (Some(_), Some(_)) => bail!("expected a file or --eval, not both"),
            (None, None) => bail!("expected a file or --eval"),
        };

        let checked = front_end(&source).map_err(|err| rendered(err, &source))?;

        let stdout = BufWriter::new(std::io::stdout().lock());
        let mut interpreter = Interpreter::with_options(stdout, options(self.no_fold));
        let program = interpreter
            .lower(&checked)
            .map_err(|err| rendered(err, &source))?;

        if self.dump {
            eprintln!("{program}");
        }

        interpreter
            .execute(&program)
            .map_err(|err| rendered(err, &source))
    }
}

/// Checks a program and prints its symbol table, one variable per line.
#[derive(Debug, Clone, FromArgs)]
#[argh(subcommand, name = "check")]
struct Check {
    /// a path to a program file
    #[argh(positional)]
    file: PathBuf,
}

impl Check {
    fn run(self) -> anyhow::Result<()> {
        let source = read_source(&self.file)?;
        let checked = front_end(&source).map_err(|err| rendered(err, &source))?;

        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{}", checked.symbols)?;
        Ok(())
    }
}

/// Lowers a program and prints its execution tree without running it.
#[derive(Debug, Clone, FromArgs)]
#[argh(subcommand, name = "lower")]
struct Lower {
    /// a path to a program file
    #[argh(positional)]
    file: PathBuf,

    /// do not embed constant operands into their parent nodes
    #[argh(switch)]
    no_fold: bool,
}

impl Lower {
    fn run(self) -> anyhow::Result<()> {
        let source = read_source(&self.file)?;
        let checked = front_end(&source).map_err(|err| rendered(err, &source))?;

        let mut interpreter = Interpreter::with_options(std::io::sink(), options(self.no_fold));
        let program = interpreter
            .lower(&checked)
            .map_err(|err| rendered(err, &source))?;

        println!("{program}");
        Ok(())
    }
}

fn options(no_fold: bool) -> Options {
    Options {
        fold_constants: !no_fold,
    }
}

fn read_source(file: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

/// Lexes, parses and checks `source`.
fn front_end(source: &str) -> Result<Checked<'_>, Error> {
    let tokens = tokenize(source)?;
    let program = parse(&tokens)?;
    Ok(check(&program)?)
}

fn rendered(err: impl Into<Error>, source: &str) -> anyhow::Error {
    anyhow!("\n{}", err.into().render(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_subcommand_parsing() {
        let cli = Cli::from_args(&["slotwalk"], &["run", "prog.sw", "--dump", "--no-fold"]).unwrap();
        match cli.cmd {
            CliSubCommand::Run(run) => {
                assert_eq!(run.file, Some(PathBuf::from("prog.sw")));
                assert_eq!(run.eval, None);
                assert!(run.dump);
                assert!(run.no_fold);
            }
            other => panic!("expected run, got {other:?}"),
        }

        let cli = Cli::from_args(&["slotwalk"], &["run", "--eval", "PrintInt(1)"]).unwrap();
        assert!(matches!(
            cli.cmd,
            CliSubCommand::Run(Run { file: None, eval: Some(ref source), dump: false, no_fold: false })
                if source == "PrintInt(1)"
        ));

        let cli = Cli::from_args(&["slotwalk"], &["check", "prog.sw"]).unwrap();
        assert!(matches!(cli.cmd, CliSubCommand::Check(Check { ref file }) if file == Path::new("prog.sw")));

        let cli = Cli::from_args(&["slotwalk"], &["lower", "prog.sw"]).unwrap();
        assert!(matches!(cli.cmd, CliSubCommand::Lower(Lower { no_fold: false, .. })));
    }

    #[test]
    fn front_end_errors_are_rendered() {
        let source = "int x = 1;\nx = true";
        let err = front_end(source).map_err(|err| rendered(err, source)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "\nx = true\n    ^\ncheck error at 2:5: cannot store a bool value in `x`, which is int"
        );
    }
}
