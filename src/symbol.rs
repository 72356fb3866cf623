//! The [`SymbolTable`] produced by the checker and consumed by lowering.

use std::collections::HashMap;

use crate::kind::Kind;

/// A declared variable: its kind and the slot it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    /// The declared kind, fixed for the lifetime of the program.
    pub kind: Kind,
    /// The index of the variable's slot in the slot store.
    pub slot: usize,
}

/// Maps variable names to their [`Symbol`]s.
///
/// Slots are handed out densely in declaration order, so the slot indices of a
/// table with `n` entries are exactly `0..n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable<'src> {
    entries: HashMap<&'src str, Symbol>,
    /// Names in slot order.
    order: Vec<&'src str>,
}

impl<'src> SymbolTable<'src> {
    /// Constructs an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` with `kind`, returning the new [`Symbol`], or the existing
    /// one if `name` was already declared.
    pub fn declare(&mut self, name: &'src str, kind: Kind) -> Result<Symbol, Symbol> {
        if let Some(existing) = self.entries.get(name) {
            return Err(*existing);
        }

        let symbol = Symbol {
            kind,
            slot: self.order.len(),
        };
        self.entries.insert(name, symbol);
        self.order.push(name);
        Ok(symbol)
    }

    /// Returns the [`Symbol`] declared for `name`, if any.
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.entries.get(name).copied()
    }

    /// Returns the number of declared variables, which is also the slot count.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the declared names and their symbols, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&'src str, Symbol)> + '_ {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name).map(|symbol| (*name, *symbol)))
    }
}

impl<'src> std::fmt::Display for SymbolTable<'src> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, symbol) in self.iter() {
            writeln!(f, "{:>4}  {:<6} {name}", symbol.slot, symbol.kind)?;
        }
        Ok(())
    }
}
