//! A specializing tree-walk interpreter for a small imperative language.
//!
//! Programs pass through the [`lexer`], the [`parser`] and the [`check`]er before
//! being lowered onto a [`backend::slot::SlotStore`] and executed by the
//! [`backend::interpreter::Interpreter`].

#![warn(missing_docs)]

use std::sync::Once;

use cli::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

extern crate static_assertions as sa;

pub mod ast;
pub mod backend;
pub mod builtin;
pub mod check;
pub mod cli;
pub mod diagnostic;
pub mod kind;
pub mod lexer;
pub mod parser;
pub mod pos;
pub mod symbol;

static INIT: Once = Once::new();

/// Installs a `tracing` subscriber if `RUST_LOG` is set, e.g. `RUST_LOG=slotwalk=debug`.
fn init_tracing() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

fn main() -> anyhow::Result<()> {
    better_panic::install();
    init_tracing();
    argh::from_env::<Cli>().handle()
}
