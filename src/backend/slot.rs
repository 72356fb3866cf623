//! The flat [`SlotStore`] holding every variable of a running program.
//!
//! Slots are untyped 64-bit cells. The kind of a slot is fixed by its declaration
//! and lives only in the typed [`Slot`] bindings handed out by [`SlotStore::bind`],
//! so a binding can only ever read or write values of its own kind.
//!
//! The store is sized once with [`SlotStore::allocate`] and frozen by the first
//! call to [`SlotStore::bind`]; after that it never grows, so every binding stays
//! valid for the lifetime of the store.

use std::marker::PhantomData;

use thiserror::Error;

use crate::kind::{Int, Kind, Real};

sa::assert_eq_size!(Int, u64);
sa::assert_eq_size!(Real, u64);
sa::assert_eq_size!(Slot<Int>, usize);

/// A value kind that fits in a single slot.
pub trait SlotValue: Copy + std::fmt::Debug {
    /// The [`Kind`] of values of this type.
    const KIND: Kind;

    /// Encodes `self` as raw slot bits.
    fn to_bits(self) -> u64;

    /// Decodes a value previously encoded with [`SlotValue::to_bits`].
    fn from_bits(bits: u64) -> Self;
}

impl SlotValue for Int {
    const KIND: Kind = Kind::Int;

    fn to_bits(self) -> u64 {
        self as u64
    }

    fn from_bits(bits: u64) -> Self {
        bits as Int
    }
}

impl SlotValue for Real {
    const KIND: Kind = Kind::Real;

    fn to_bits(self) -> u64 {
        Real::to_bits(self)
    }

    fn from_bits(bits: u64) -> Self {
        Real::from_bits(bits)
    }
}

impl SlotValue for bool {
    const KIND: Kind = Kind::Bool;

    fn to_bits(self) -> u64 {
        u64::from(self)
    }

    fn from_bits(bits: u64) -> Self {
        bits != 0
    }
}

/// A typed binding to one slot of a frozen [`SlotStore`].
#[derive(Debug, PartialEq)]
pub struct Slot<T> {
    index: usize,
    _kind: PhantomData<T>,
}

// manual impls, since derives would require `T: Clone`
impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Slot<T> {}

/// A binding to an integer slot.
pub type IntSlot = Slot<Int>;
/// A binding to a real slot.
pub type RealSlot = Slot<Real>;
/// A binding to a boolean slot.
pub type BoolSlot = Slot<bool>;

impl<T: SlotValue> Slot<T> {
    /// Returns the index of the bound slot.
    pub fn index(self) -> usize {
        self.index
    }

    /// Reads the current value of the bound slot.
    #[inline]
    pub fn get(self, store: &SlotStore) -> T {
        T::from_bits(store.slots[self.index])
    }

    /// Overwrites the bound slot with `value`.
    #[inline]
    pub fn set(self, store: &mut SlotStore, value: T) {
        store.slots[self.index] = value.to_bits();
    }
}

impl<T> std::fmt::Display for Slot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.index)
    }
}

/// A dynamically typed slot value, as read back for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// An integer.
    Int(Int),
    /// A real.
    Real(Real),
    /// A boolean.
    Bool(bool),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(int) => write!(f, "{int}"),
            Value::Real(real) => write!(f, "{real}"),
            Value::Bool(atom) => write!(f, "{atom}"),
        }
    }
}

/// The ways the slot store can be misused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// [`SlotStore::allocate`] was called after the store was frozen.
    #[error("cannot resize the slot store after binding, it is frozen at {len} slot(s)")]
    Frozen {
        /// The frozen size.
        len: usize,
    },
    /// A binding was requested past the end of the store.
    #[error("slot {index} is out of range for a store of {len} slot(s)")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The size of the store.
        len: usize,
    },
}

/// Flat storage for the variables of a program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotStore {
    slots: Vec<u64>,
    frozen: bool,
}

impl SlotStore {
    /// Constructs an empty, unfrozen store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resizes the store to `len` zeroed slots.
    ///
    /// Zeroed slots read as `0`, `0.0` and `false` for every kind.
    pub fn allocate(&mut self, len: usize) -> Result<(), SlotError> {
        if self.frozen {
            return Err(SlotError::Frozen {
                len: self.slots.len(),
            });
        }

        self.slots = vec![0; len];
        tracing::debug!(slots = len, "allocated slot store");
        Ok(())
    }

    /// Constructs a frozen store of `len` zeroed slots.
    pub fn zeroed(len: usize) -> Self {
        Self {
            slots: vec![0; len],
            frozen: true,
        }
    }

    /// Freezes the store, so that later calls to [`SlotStore::allocate`] fail.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Returns a typed binding to the slot at `index`, freezing the store.
    pub fn bind<T: SlotValue>(&mut self, index: usize) -> Result<Slot<T>, SlotError> {
        self.frozen = true;

        match index < self.slots.len() {
            true => Ok(Slot {
                index,
                _kind: PhantomData,
            }),
            false => Err(SlotError::OutOfRange {
                index,
                len: self.slots.len(),
            }),
        }
    }

    /// Resets every slot to zero without unfreezing the store.
    pub fn clear(&mut self) {
        self.slots.fill(0);
    }

    /// Reads the slot at `index` as a value of `kind`, or `None` if `index` is out
    /// of range.
    pub fn load(&self, index: usize, kind: Kind) -> Option<Value> {
        let bits = *self.slots.get(index)?;
        Some(match kind {
            Kind::Int => Value::Int(Int::from_bits(bits)),
            Kind::Real => Value::Real(Real::from_bits(bits)),
            Kind::Bool => Value::Bool(bool::from_bits(bits)),
        })
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the store has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` once the store has been frozen or a binding has been handed out.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}
