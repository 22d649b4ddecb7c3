//! Type-safe indices and indexed containers.
//!
//! Every IR entity (blocks, values, functions) is a `u32` index
//! wrapped in its own newtype so that a `Block` can never be used
//! where a `Value` is expected. Entities are allocated densely by an
//! `EntityVec`; analyses attach per-entity data with a `PerEntity`
//! side table, which grows lazily and reads back a default for
//! entities it has never seen.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

pub trait EntityRef: Clone + Copy + PartialEq + Eq + PartialOrd + Ord + Hash + Debug {
    fn new(value: usize) -> Self;
    fn index(self) -> usize;
    fn invalid() -> Self;
    fn is_valid(self) -> bool {
        self != Self::invalid()
    }
    fn is_invalid(self) -> bool {
        self == Self::invalid()
    }
}

#[macro_export]
macro_rules! declare_entity {
    ($name:tt, $prefix:tt) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $crate::entity::EntityRef for $name {
            fn new(value: usize) -> Self {
                let value = u32::try_from(value).unwrap();
                debug_assert!(value != u32::MAX);
                Self(value)
            }
            fn index(self) -> usize {
                self.0 as usize
            }
            fn invalid() -> Self {
                Self(u32::MAX)
            }
        }

        impl std::convert::From<u32> for $name {
            fn from(val: u32) -> Self {
                <Self as $crate::entity::EntityRef>::new(val as usize)
            }
        }

        impl std::default::Default for $name {
            fn default() -> Self {
                <Self as $crate::entity::EntityRef>::invalid()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

/// A dense arena: pushing a `T` allocates the next `Idx`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityVec<Idx: EntityRef, T>(Vec<T>, PhantomData<Idx>);

impl<Idx: EntityRef, T> Default for EntityVec<Idx, T> {
    fn default() -> Self {
        Self(vec![], PhantomData)
    }
}

impl<Idx: EntityRef, T> From<Vec<T>> for EntityVec<Idx, T> {
    fn from(vec: Vec<T>) -> Self {
        Self(vec, PhantomData)
    }
}

impl<Idx: EntityRef, T> EntityVec<Idx, T> {
    pub fn push(&mut self, t: T) -> Idx {
        let idx = Idx::new(self.0.len());
        self.0.push(t);
        idx
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Does `idx` name an entity allocated in this arena?
    pub fn contains(&self, idx: Idx) -> bool {
        idx.is_valid() && idx.index() < self.0.len()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Idx> + ExactSizeIterator {
        (0..self.0.len()).map(Idx::new)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.0.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.0.iter_mut()
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = (Idx, &T)> + ExactSizeIterator {
        self.0
            .iter()
            .enumerate()
            .map(|(index, t)| (Idx::new(index), t))
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = (Idx, &mut T)> {
        self.0
            .iter_mut()
            .enumerate()
            .map(|(index, t)| (Idx::new(index), t))
    }

    pub fn get(&self, idx: Idx) -> Option<&T> {
        self.0.get(idx.index())
    }

    pub fn get_mut(&mut self, idx: Idx) -> Option<&mut T> {
        self.0.get_mut(idx.index())
    }
}

impl<Idx: EntityRef, T> Index<Idx> for EntityVec<Idx, T> {
    type Output = T;
    fn index(&self, idx: Idx) -> &T {
        &self.0[idx.index()]
    }
}

impl<Idx: EntityRef, T> IndexMut<Idx> for EntityVec<Idx, T> {
    fn index_mut(&mut self, idx: Idx) -> &mut T {
        &mut self.0[idx.index()]
    }
}

/// A side table keyed by entity. Reads of never-written entries
/// return the default; writes grow the table as needed.
#[derive(Clone, Debug)]
pub struct PerEntity<Idx: EntityRef, T: Clone + Default> {
    entries: Vec<T>,
    default: T,
    _phantom: PhantomData<Idx>,
}

impl<Idx: EntityRef, T: Clone + Default> Default for PerEntity<Idx, T> {
    fn default() -> Self {
        PerEntity {
            entries: vec![],
            default: T::default(),
            _phantom: PhantomData,
        }
    }
}

impl<Idx: EntityRef, T: Clone + Default + PartialEq> PartialEq for PerEntity<Idx, T> {
    fn eq(&self, other: &Self) -> bool {
        let len = std::cmp::max(self.entries.len(), other.entries.len());
        (0..len).all(|i| self[Idx::new(i)] == other[Idx::new(i)])
    }
}

impl<Idx: EntityRef, T: Clone + Default> PerEntity<Idx, T> {
    /// Create a table with `len` default entries preallocated.
    pub fn with_len(len: usize) -> Self {
        PerEntity {
            entries: vec![T::default(); len],
            default: T::default(),
            _phantom: PhantomData,
        }
    }
}

impl<Idx: EntityRef, T: Clone + Default> Index<Idx> for PerEntity<Idx, T> {
    type Output = T;
    fn index(&self, idx: Idx) -> &T {
        self.entries.get(idx.index()).unwrap_or(&self.default)
    }
}

impl<Idx: EntityRef, T: Clone + Default> IndexMut<Idx> for PerEntity<Idx, T> {
    fn index_mut(&mut self, idx: Idx) -> &mut T {
        if idx.index() >= self.entries.len() {
            self.entries.resize(idx.index() + 1, T::default());
        }
        &mut self.entries[idx.index()]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    crate::declare_entity!(Thing, "thing");

    #[test]
    fn per_entity_reads_default_beyond_len() {
        let mut table: PerEntity<Thing, u32> = PerEntity::default();
        table[Thing::new(3)] = 7;
        assert_eq!(table[Thing::new(3)], 7);
        assert_eq!(table[Thing::new(1)], 0);
        assert_eq!(table[Thing::new(100)], 0);
    }

    #[test]
    fn per_entity_equality_ignores_trailing_defaults() {
        let mut a: PerEntity<Thing, u32> = PerEntity::with_len(10);
        let mut b: PerEntity<Thing, u32> = PerEntity::default();
        a[Thing::new(2)] = 5;
        b[Thing::new(2)] = 5;
        assert_eq!(a, b);
        b[Thing::new(8)] = 1;
        assert_ne!(a, b);
    }

    #[test]
    fn entity_vec_contains() {
        let mut arena: EntityVec<Thing, &str> = EntityVec::default();
        let a = arena.push("a");
        assert!(arena.contains(a));
        assert!(!arena.contains(Thing::new(1)));
        assert!(!arena.contains(Thing::invalid()));
        assert_eq!(format!("{}", a), "thing0");
    }
}
