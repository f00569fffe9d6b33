//! Slot storage for intrusively linked records.
//!
//! Records are addressed by typed ids instead of references, which keeps the
//! borrow checker out of the way when two trees thread links through the same
//! records. A slot never moves while it is occupied, so an id stays valid until
//! its slot is removed.

use std::marker::PhantomData;

pub trait UsizeId:
    From<usize> + Into<usize> + Eq + PartialOrd + Ord + std::hash::Hash + Copy + Default
{
}

#[macro_export]
macro_rules! define_usize_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(usize);
        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                Self(value)
            }
        }
        impl From<$name> for usize {
            fn from(value: $name) -> Self {
                value.0
            }
        }
        impl $crate::heap::UsizeId for $name {}
    };
}

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied(T),
    /// Next vacant slot on the free list
    Vacant(Option<usize>),
}

/// A vector of slots with a free list. Removed slots are recycled by later
/// insertions.
#[derive(Debug, Clone)]
pub struct SlotHeap<I, T> {
    slots: Vec<Slot<T>>,
    free: Option<usize>,
    len: usize,
    _id: PhantomData<I>,
}

const PANIC_MSG: &'static str =
    "Id does not refer to an occupied slot. Perhaps it was removed, or belongs to another heap?";

impl<I: UsizeId, T> std::ops::Index<I> for SlotHeap<I, T> {
    type Output = T;
    fn index(&self, index: I) -> &Self::Output {
        self.get(index).expect(PANIC_MSG)
    }
}

impl<I: UsizeId, T> std::ops::IndexMut<I> for SlotHeap<I, T> {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        self.get_mut(index).expect(PANIC_MSG)
    }
}

impl<I: UsizeId, T> SlotHeap<I, T> {
    pub fn insert(&mut self, t: T) -> I {
        self.len += 1;
        match self.free {
            Some(i) => {
                let next = match self.slots[i] {
                    Slot::Vacant(next) => next,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                self.free = next;
                self.slots[i] = Slot::Occupied(t);
                i.into()
            }
            None => {
                let i = self.slots.len();
                self.slots.push(Slot::Occupied(t));
                i.into()
            }
        }
    }

    /// Vacates the slot and returns its content.
    ///
    /// Panics if `i` does not refer to an occupied slot.
    pub fn remove(&mut self, i: I) -> T {
        let i: usize = i.into();
        if !matches!(self.slots.get(i), Some(Slot::Occupied(_))) {
            panic!("{}", PANIC_MSG);
        }
        let old = std::mem::replace(&mut self.slots[i], Slot::Vacant(self.free));
        self.free = Some(i);
        self.len -= 1;
        match old {
            Slot::Occupied(t) => t,
            Slot::Vacant(_) => unreachable!(),
        }
    }

    pub fn get(&self, i: I) -> Option<&T> {
        let i: usize = i.into();
        match self.slots.get(i) {
            Some(Slot::Occupied(t)) => Some(t),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, i: I) -> Option<&mut T> {
        let i: usize = i.into();
        match self.slots.get_mut(i) {
            Some(Slot::Occupied(t)) => Some(t),
            _ => None,
        }
    }

    pub fn contains(&self, i: I) -> bool {
        self.get(i).is_some()
    }

    pub fn iter_with_id(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied(t) => Some((i.into(), t)),
            Slot::Vacant(_) => None,
        })
    }
}

impl<I, T> SlotHeap<I, T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            len: 0,
            _id: PhantomData,
        }
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.len = 0;
    }
}

impl<I, T> Default for SlotHeap<I, T> {
    fn default() -> Self {
        Self::new()
    }
}
