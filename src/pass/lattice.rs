//! Lattice trait definition and the value-set lattice.

use crate::ir::Value;
use fxhash::FxHashSet;
use std::fmt::Debug;

/// A lattice type used for an analysis.
///
/// The `meet` operator must compute the greatest lower bound of its
/// operands and obey the usual lattice laws:
///
/// * a `meet` a == a  (reflexivity)
/// * a `meet` b == b `meet` a (commutativity)
/// * a `meet` (b `meet` c) == (a `meet` b) `meet` c (associativity)
/// * a `meet` top == a
///
/// We never make direct ordering comparisons while solving; the
/// ordering is only implicitly depended upon for termination, which
/// additionally requires that the lattice has finite chain length.
/// Equality is used to detect that a block's input did not change.
/// `Default` must agree with `top`.
pub trait Lattice: Clone + Debug + PartialEq + Default {
    /// Return the `top` lattice value.
    fn top() -> Self;
    /// Mutate self to `meet(self, other)`. Returns `true` if any
    /// changes occurred.
    fn meet_with(&mut self, other: &Self) -> bool;
}

/// A duplicate-free set of `Value`s that remembers insertion order.
///
/// As a lattice, `top` is the empty set and `meet` is union, which
/// makes it suitable for may-analyses. Iteration order is the order in
/// which elements were first added, so printed results are
/// reproducible; equality ignores order.
#[derive(Clone, Debug, Default)]
pub struct ValueSet {
    order: Vec<Value>,
    members: FxHashSet<Value>,
}

impl ValueSet {
    pub fn new() -> ValueSet {
        ValueSet::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, value: Value) -> bool {
        self.members.contains(&value)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Value> + ExactSizeIterator + '_ {
        self.order.iter().copied()
    }

    /// Elements in insertion order.
    pub fn as_slice(&self) -> &[Value] {
        &self.order[..]
    }

    /// Add `value` at the end unless already present. Returns `true`
    /// if the set grew.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.members.insert(value) {
            self.order.push(value);
            true
        } else {
            false
        }
    }

    /// Returns `true` if `value` was present.
    pub fn remove(&mut self, value: Value) -> bool {
        if self.members.remove(&value) {
            self.order.retain(|&v| v != value);
            true
        } else {
            false
        }
    }

    /// In-place union: appends `other`'s new elements in `other`'s
    /// order. Returns `true` if the set grew.
    pub fn union_with(&mut self, other: &ValueSet) -> bool {
        let mut changed = false;
        for value in other.iter() {
            changed |= self.insert(value);
        }
        changed
    }

    /// In-place difference. Returns `true` if anything was removed.
    pub fn remove_all_of(&mut self, other: &ValueSet) -> bool {
        let before = self.order.len();
        if other.is_empty() || before == 0 {
            return false;
        }
        self.members.retain(|v| !other.contains(*v));
        let members = &self.members;
        self.order.retain(|v| members.contains(v));
        self.order.len() != before
    }

    /// `self ∪ other`: `self`'s elements in order, then `other`'s new
    /// elements in order.
    pub fn union(&self, other: &ValueSet) -> ValueSet {
        let mut result = self.clone();
        result.union_with(other);
        result
    }

    /// `self \ other`, keeping `self`'s order.
    pub fn remove_all(&self, other: &ValueSet) -> ValueSet {
        let mut result = self.clone();
        result.remove_all_of(other);
        result
    }

    /// Same elements, regardless of order.
    pub fn equals(&self, other: &ValueSet) -> bool {
        self.len() == other.len() && self.iter().all(|value| other.contains(value))
    }

    pub fn is_subset(&self, other: &ValueSet) -> bool {
        self.iter().all(|value| other.contains(value))
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &ValueSet) -> bool {
        self.equals(other)
    }
}

impl Eq for ValueSet {}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> ValueSet {
        let mut set = ValueSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl Extend<Value> for ValueSet {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl Lattice for ValueSet {
    fn top() -> Self {
        ValueSet::new()
    }

    fn meet_with(&mut self, other: &ValueSet) -> bool {
        self.union_with(other)
    }
}
