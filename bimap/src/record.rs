//! Records shared by the two trees of a bimap.
//!
//! Every [`Record`] carries one set of tree links per side. The left tree only
//! ever touches `left_links`, the right tree only `right_links`, so a single
//! [`RecordId`] names a node of both trees at once.

use crate::define_usize_id;
use crate::heap::SlotHeap;

define_usize_id!(RecordId);

/// Per-side tree links of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Links {
    pub(crate) parent: Option<RecordId>,
    pub(crate) left: Option<RecordId>,
    pub(crate) right: Option<RecordId>,
    pub(crate) height: u16,
}

impl Links {
    pub(crate) fn leaf(parent: Option<RecordId>) -> Self {
        Self {
            parent,
            left: None,
            right: None,
            height: 1,
        }
    }
}

impl Default for Links {
    fn default() -> Self {
        Self::leaf(None)
    }
}

/// One association between a left value and a right value.
#[derive(Debug, Clone)]
pub struct Record<L, R> {
    pub(crate) left: L,
    pub(crate) right: R,
    pub(crate) left_links: Links,
    pub(crate) right_links: Links,
}

impl<L, R> Record<L, R> {
    pub(crate) fn new(left: L, right: R) -> Self {
        Self {
            left,
            right,
            left_links: Links::default(),
            right_links: Links::default(),
        }
    }

    pub fn left(&self) -> &L {
        &self.left
    }

    pub fn right(&self) -> &R {
        &self.right
    }

    pub fn into_pair(self) -> (L, R) {
        (self.left, self.right)
    }
}

/// Anchor of both trees. A node is a root exactly when its parent link on that
/// side is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sentinel {
    left_root: Option<RecordId>,
    right_root: Option<RecordId>,
}

mod private {
    pub trait Sealed {}
}

/// Selects which half of a [`Record`] a tree operates on.
pub trait Side: private::Sealed + Copy + Eq + std::fmt::Debug + Default + 'static {
    type Value<L, R>;
    type Flip: Side<Flip = Self>;

    const NAME: &'static str;

    fn value<L, R>(record: &Record<L, R>) -> &Self::Value<L, R>;
    fn links<L, R>(record: &Record<L, R>) -> &Links;
    fn links_mut<L, R>(record: &mut Record<L, R>) -> &mut Links;
    fn root(sentinel: &Sentinel) -> Option<RecordId>;
    fn root_mut(sentinel: &mut Sentinel) -> &mut Option<RecordId>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LeftSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RightSide;

impl private::Sealed for LeftSide {}
impl private::Sealed for RightSide {}

impl Side for LeftSide {
    type Value<L, R> = L;
    type Flip = RightSide;

    const NAME: &'static str = "left";

    fn value<L, R>(record: &Record<L, R>) -> &L {
        &record.left
    }
    fn links<L, R>(record: &Record<L, R>) -> &Links {
        &record.left_links
    }
    fn links_mut<L, R>(record: &mut Record<L, R>) -> &mut Links {
        &mut record.left_links
    }
    fn root(sentinel: &Sentinel) -> Option<RecordId> {
        sentinel.left_root
    }
    fn root_mut(sentinel: &mut Sentinel) -> &mut Option<RecordId> {
        &mut sentinel.left_root
    }
}

impl Side for RightSide {
    type Value<L, R> = R;
    type Flip = LeftSide;

    const NAME: &'static str = "right";

    fn value<L, R>(record: &Record<L, R>) -> &R {
        &record.right
    }
    fn links<L, R>(record: &Record<L, R>) -> &Links {
        &record.right_links
    }
    fn links_mut<L, R>(record: &mut Record<L, R>) -> &mut Links {
        &mut record.right_links
    }
    fn root(sentinel: &Sentinel) -> Option<RecordId> {
        sentinel.right_root
    }
    fn root_mut(sentinel: &mut Sentinel) -> &mut Option<RecordId> {
        &mut sentinel.right_root
    }
}

/// Owner of every record of a bimap, together with the sentinel anchoring
/// both trees.
#[derive(Debug, Clone)]
pub struct RecordPool<L, R> {
    records: SlotHeap<RecordId, Record<L, R>>,
    sentinel: Sentinel,
}

impl<L, R> RecordPool<L, R> {
    pub fn new() -> Self {
        Self {
            records: SlotHeap::new(),
            sentinel: Sentinel::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn root<S: Side>(&self) -> Option<RecordId> {
        S::root(&self.sentinel)
    }

    pub(crate) fn set_root<S: Side>(&mut self, root: Option<RecordId>) {
        *S::root_mut(&mut self.sentinel) = root;
    }

    pub fn get(&self, id: RecordId) -> Option<&Record<L, R>> {
        self.records.get(id)
    }

    pub fn value<S: Side>(&self, id: RecordId) -> &S::Value<L, R> {
        S::value(&self.records[id])
    }

    pub(crate) fn links<S: Side>(&self, id: RecordId) -> &Links {
        S::links(&self.records[id])
    }

    pub(crate) fn links_mut<S: Side>(&mut self, id: RecordId) -> &mut Links {
        S::links_mut(&mut self.records[id])
    }

    /// Stores a record with detached links. Nothing is threaded yet.
    pub(crate) fn alloc(&mut self, left: L, right: R) -> RecordId {
        self.records.insert(Record::new(left, right))
    }

    /// Frees a record. The caller must have unlinked it from both trees.
    pub(crate) fn free(&mut self, id: RecordId) -> Record<L, R> {
        self.records.remove(id)
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.sentinel = Sentinel::default();
    }
}

impl<L, R> Default for RecordPool<L, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_id_addresses_both_sides() {
        let mut pool = RecordPool::new();
        let id = pool.alloc(7, "seven");
        pool.links_mut::<LeftSide>(id).height = 3;

        assert_eq!(*pool.value::<LeftSide>(id), 7);
        assert_eq!(*pool.value::<RightSide>(id), "seven");
        assert_eq!(pool.links::<LeftSide>(id).height, 3);
        assert_eq!(pool.links::<RightSide>(id).height, 1);
    }

    #[test]
    fn roots_are_tracked_per_side() {
        let mut pool: RecordPool<u32, u32> = RecordPool::new();
        let id = pool.alloc(1, 2);
        pool.set_root::<RightSide>(Some(id));

        assert_eq!(pool.root::<LeftSide>(), None);
        assert_eq!(pool.root::<RightSide>(), Some(id));

        pool.clear();
        assert_eq!(pool.root::<RightSide>(), None);
        assert_eq!(pool.len(), 0);
    }
}
