//! Ordered bijective map.
//!
//! A [`Bimap`] keeps two AVL trees over one set of records: the left tree
//! orders records by their left value, the right tree by their right value.
//! Both trees always hold exactly the same records, and no left or right value
//! occurs twice.

use std::fmt;
use std::marker::PhantomData;
use std::ops::RangeBounds;

use crate::avl_tree::{self, AvlTree};
use crate::compare::{Compare, Natural};
use crate::error::{BimapError, Result};
use crate::record::{LeftSide, RecordId, RecordPool, RightSide, Side};

mod graphviz;
mod iter;
mod serialization;

pub use iter::{IntoIter, Iter, Range};

/// A place in the traversal order of side `S`: either a record or the end.
///
/// A position stays valid until the record it refers to is erased. Erasing
/// or inserting other records, and the rotations that follow, do not affect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position<S> {
    node: Option<RecordId>,
    _side: PhantomData<S>,
}

pub type LeftPosition = Position<LeftSide>;
pub type RightPosition = Position<RightSide>;

impl<S: Side> Position<S> {
    fn new(node: Option<RecordId>) -> Self {
        Self {
            node,
            _side: PhantomData,
        }
    }

    pub fn end() -> Self {
        Self::new(None)
    }

    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    pub fn record(&self) -> Option<RecordId> {
        self.node
    }

    /// The same record seen from the other side. The end flips to the end.
    pub fn flip(self) -> Position<S::Flip> {
        Position::new(self.node)
    }
}

pub struct Bimap<L, R, CL = Natural, CR = Natural> {
    pool: RecordPool<L, R>,
    left_tree: AvlTree<LeftSide, CL>,
    right_tree: AvlTree<RightSide, CR>,
    len: usize,
}

impl<L, R> Bimap<L, R> {
    /// An empty bimap ordering both sides by [`Ord`].
    pub fn new() -> Self {
        Self::with_comparators(Natural, Natural)
    }
}

impl<L, R, CL, CR> Bimap<L, R, CL, CR> {
    pub fn with_comparators(compare_left: CL, compare_right: CR) -> Self {
        Self {
            pool: RecordPool::new(),
            left_tree: AvlTree::new(compare_left),
            right_tree: AvlTree::new(compare_right),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn begin_left(&self) -> LeftPosition {
        Position::new(avl_tree::first::<LeftSide, L, R>(&self.pool))
    }

    pub fn end_left(&self) -> LeftPosition {
        Position::end()
    }

    pub fn begin_right(&self) -> RightPosition {
        Position::new(avl_tree::first::<RightSide, L, R>(&self.pool))
    }

    pub fn end_right(&self) -> RightPosition {
        Position::end()
    }

    /// Next position in the order of side `S`. The end stays the end.
    pub fn next<S: Side>(&self, pos: Position<S>) -> Position<S> {
        Position::new(avl_tree::next::<S, L, R>(&self.pool, pos.node))
    }

    /// Previous position in the order of side `S`. Stepping back from the end
    /// gives the last record, stepping back from the first record gives the end.
    pub fn prev<S: Side>(&self, pos: Position<S>) -> Position<S> {
        Position::new(avl_tree::prev::<S, L, R>(&self.pool, pos.node))
    }

    /// Value of side `S` stored at `pos`, `None` at the end.
    pub fn value<S: Side>(&self, pos: Position<S>) -> Option<&S::Value<L, R>> {
        pos.node.map(|id| self.pool.value::<S>(id))
    }

    /// Value paired with the one at `pos`, that is the other side's value.
    pub fn paired<S: Side>(&self, pos: Position<S>) -> Option<&<S::Flip as Side>::Value<L, R>> {
        self.value(pos.flip())
    }

    pub fn erase_left(&mut self, pos: LeftPosition) -> LeftPosition {
        Position::new(self.erase_at::<LeftSide>(pos.node))
    }

    pub fn erase_right(&mut self, pos: RightPosition) -> RightPosition {
        Position::new(self.erase_at::<RightSide>(pos.node))
    }

    /// Erases every record in `[first, last)` of the left order.
    /// Returns the position following the last erased record.
    pub fn erase_left_range(&mut self, first: LeftPosition, last: LeftPosition) -> LeftPosition {
        self.erase_range(first, last)
    }

    pub fn erase_right_range(
        &mut self,
        first: RightPosition,
        last: RightPosition,
    ) -> RightPosition {
        self.erase_range(first, last)
    }

    pub fn iter_left(&self) -> Iter<'_, LeftSide, L, R> {
        Iter::new(&self.pool, self.len)
    }

    pub fn iter_right(&self) -> Iter<'_, RightSide, L, R> {
        Iter::new(&self.pool, self.len)
    }

    pub fn clear(&mut self) {
        self.pool.clear();
        self.len = 0;
    }

    /// Exchanges the content of two bimaps in constant time.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    pub fn height_left(&self) -> usize {
        avl_tree::height::<LeftSide, L, R>(&self.pool) as usize
    }

    pub fn height_right(&self) -> usize {
        avl_tree::height::<RightSide, L, R>(&self.pool) as usize
    }

    /// Unlinks the record at `node` from both trees and frees it.
    /// Returns its successor on side `S`.
    fn erase_at<S: Side>(&mut self, node: Option<RecordId>) -> Option<RecordId> {
        let id = node?;
        let successor = avl_tree::erase::<S, L, R>(&mut self.pool, id);
        avl_tree::erase::<S::Flip, L, R>(&mut self.pool, id);
        self.pool.free(id);
        self.len -= 1;
        successor
    }

    fn erase_range<S: Side>(&mut self, first: Position<S>, last: Position<S>) -> Position<S> {
        let mut cur = first;
        while cur != last && !cur.is_end() {
            cur = Position::new(self.erase_at::<S>(cur.node));
        }
        cur
    }
}

impl<L, R, CL, CR> Bimap<L, R, CL, CR>
where
    CL: Compare<L>,
    CR: Compare<R>,
{
    /// Associates `left` with `right`.
    ///
    /// If `left` is already present on the left side or `right` on the right
    /// side, nothing changes and the end position is returned.
    pub fn insert(&mut self, left: L, right: R) -> LeftPosition {
        match self.try_insert(left, right) {
            Ok(pos) => pos,
            Err(e) => {
                log::debug!("insert rejected: {}", e);
                self.end_left()
            }
        }
    }

    /// Like [`Bimap::insert`], but tells which side conflicted.
    pub fn try_insert(&mut self, left: L, right: R) -> Result<LeftPosition> {
        if self.left_tree.find(&self.pool, &left).is_some() {
            return Err(BimapError::DuplicateLeft);
        }
        if self.right_tree.find(&self.pool, &right).is_some() {
            return Err(BimapError::DuplicateRight);
        }
        Ok(Position::new(Some(self.link(left, right))))
    }

    /// Stores a record and threads it into both trees. Both values must be
    /// absent from their side.
    fn link(&mut self, left: L, right: R) -> RecordId {
        let id = self.pool.alloc(left, right);
        self.left_tree.insert(&mut self.pool, id);
        self.right_tree.insert(&mut self.pool, id);
        self.len += 1;
        id
    }

    pub fn find_left(&self, left: &L) -> LeftPosition {
        Position::new(self.left_tree.find(&self.pool, left))
    }

    pub fn find_right(&self, right: &R) -> RightPosition {
        Position::new(self.right_tree.find(&self.pool, right))
    }

    pub fn contains_left(&self, left: &L) -> bool {
        self.left_tree.find(&self.pool, left).is_some()
    }

    pub fn contains_right(&self, right: &R) -> bool {
        self.right_tree.find(&self.pool, right).is_some()
    }

    pub fn get_by_left(&self, left: &L) -> Option<&R> {
        self.paired(self.find_left(left))
    }

    pub fn get_by_right(&self, right: &R) -> Option<&L> {
        self.paired(self.find_right(right))
    }

    pub fn lower_bound_left(&self, left: &L) -> LeftPosition {
        Position::new(self.left_tree.lower_bound(&self.pool, left))
    }

    pub fn upper_bound_left(&self, left: &L) -> LeftPosition {
        Position::new(self.left_tree.upper_bound(&self.pool, left))
    }

    pub fn lower_bound_right(&self, right: &R) -> RightPosition {
        Position::new(self.right_tree.lower_bound(&self.pool, right))
    }

    pub fn upper_bound_right(&self, right: &R) -> RightPosition {
        Position::new(self.right_tree.upper_bound(&self.pool, right))
    }

    /// Right value paired with `left`.
    pub fn at_left(&self, left: &L) -> Result<&R> {
        self.get_by_left(left).ok_or(BimapError::KeyNotFound)
    }

    /// Left value paired with `right`.
    pub fn at_right(&self, right: &R) -> Result<&L> {
        self.get_by_right(right).ok_or(BimapError::KeyNotFound)
    }

    /// Right value paired with `left`, pairing it with `R::default()` first
    /// if it is absent.
    ///
    /// A default right value can only belong to one record, so whatever record
    /// currently holds it is erased before the new pair is inserted.
    pub fn at_left_or_default(&mut self, left: L) -> &R
    where
        R: Default,
    {
        let id = match self.left_tree.find(&self.pool, &left) {
            Some(id) => id,
            None => {
                let right = R::default();
                if let Some(stale) = self.right_tree.find(&self.pool, &right) {
                    log::debug!("evicting {:?} which holds the default right value", stale);
                    self.erase_at::<RightSide>(Some(stale));
                }
                self.link(left, right)
            }
        };
        self.pool.value::<RightSide>(id)
    }

    /// Left value paired with `right`, pairing it with `L::default()` first
    /// if it is absent. See [`Bimap::at_left_or_default`].
    pub fn at_right_or_default(&mut self, right: R) -> &L
    where
        L: Default,
    {
        let id = match self.right_tree.find(&self.pool, &right) {
            Some(id) => id,
            None => {
                let left = L::default();
                if let Some(stale) = self.left_tree.find(&self.pool, &left) {
                    log::debug!("evicting {:?} which holds the default left value", stale);
                    self.erase_at::<LeftSide>(Some(stale));
                }
                self.link(left, right)
            }
        };
        self.pool.value::<LeftSide>(id)
    }

    /// Erases the record whose left value is `left`. Returns whether one was found.
    pub fn erase_left_key(&mut self, left: &L) -> bool {
        let found = self.left_tree.find(&self.pool, left);
        self.erase_at::<LeftSide>(found);
        found.is_some()
    }

    pub fn erase_right_key(&mut self, right: &R) -> bool {
        let found = self.right_tree.find(&self.pool, right);
        self.erase_at::<RightSide>(found);
        found.is_some()
    }

    /// Pairs whose left value falls in `range`, in left order.
    pub fn range_left<B>(&self, range: B) -> Range<'_, LeftSide, L, R>
    where
        B: RangeBounds<L>,
    {
        let (start, stop) = self.left_tree.range(&self.pool, &range);
        Range::new(&self.pool, start, stop)
    }

    pub fn range_right<B>(&self, range: B) -> Range<'_, RightSide, L, R>
    where
        B: RangeBounds<R>,
    {
        let (start, stop) = self.right_tree.range(&self.pool, &range);
        Range::new(&self.pool, start, stop)
    }

    /// Checks the structure of both trees and that they hold the same records.
    pub fn validate(&self) -> Result<()> {
        let left = self.left_tree.check(&self.pool)?;
        let right = self.right_tree.check(&self.pool)?;
        if left != self.len || right != self.len || self.pool.len() != self.len {
            return Err(BimapError::Corrupted {
                side: "both",
                reason: format!(
                    "{} left nodes, {} right nodes, {} records, count {}",
                    left,
                    right,
                    self.pool.len(),
                    self.len
                ),
            });
        }
        Ok(())
    }
}

impl<L, R, CL: Default, CR: Default> Default for Bimap<L, R, CL, CR> {
    fn default() -> Self {
        Self::with_comparators(CL::default(), CR::default())
    }
}

impl<L, R, CL, CR> Clone for Bimap<L, R, CL, CR>
where
    L: Clone,
    R: Clone,
    CL: Compare<L> + Clone,
    CR: Compare<R> + Clone,
{
    /// Rebuilds the copy by inserting every pair in left order.
    fn clone(&self) -> Self {
        let mut out = Self::with_comparators(
            self.left_tree.comparator().clone(),
            self.right_tree.comparator().clone(),
        );
        for (left, right) in self.iter_left() {
            out.insert(left.clone(), right.clone());
        }
        out
    }
}

impl<L, R, CL, CR> PartialEq for Bimap<L, R, CL, CR>
where
    L: PartialEq,
    R: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter_left().eq(other.iter_left())
    }
}

impl<L: Eq, R: Eq, CL, CR> Eq for Bimap<L, R, CL, CR> {}

impl<L: fmt::Debug, R: fmt::Debug, CL, CR> fmt::Debug for Bimap<L, R, CL, CR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter_left()).finish()
    }
}

impl<L, R, CL, CR> Extend<(L, R)> for Bimap<L, R, CL, CR>
where
    CL: Compare<L>,
    CR: Compare<R>,
{
    /// Pairs conflicting with an existing one are dropped.
    fn extend<I: IntoIterator<Item = (L, R)>>(&mut self, iter: I) {
        for (left, right) in iter {
            self.insert(left, right);
        }
    }
}

impl<L, R, CL, CR> FromIterator<(L, R)> for Bimap<L, R, CL, CR>
where
    CL: Compare<L> + Default,
    CR: Compare<R> + Default,
{
    fn from_iter<I: IntoIterator<Item = (L, R)>>(iter: I) -> Self {
        let mut bimap = Self::with_comparators(CL::default(), CR::default());
        bimap.extend(iter);
        bimap
    }
}

impl<'a, L, R, CL, CR> IntoIterator for &'a Bimap<L, R, CL, CR> {
    type Item = (&'a L, &'a R);
    type IntoIter = Iter<'a, LeftSide, L, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_left()
    }
}

impl<L, R, CL, CR> IntoIterator for Bimap<L, R, CL, CR> {
    type Item = (L, R);
    type IntoIter = IntoIter<L, R>;

    /// Consumes the bimap, yielding pairs in left order.
    fn into_iter(self) -> Self::IntoIter {
        let order = self.iter_left().records();
        IntoIter::new(self.pool, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Bimap<u32, &'static str> {
        let mut bimap = Bimap::new();
        bimap.insert(1, "a");
        bimap.insert(2, "b");
        bimap.insert(3, "c");
        bimap
    }

    #[test]
    fn insert_and_lookup() {
        let bimap = abc();
        assert_eq!(bimap.len(), 3);
        assert_eq!(bimap.at_left(&2), Ok(&"b"));
        assert_eq!(bimap.at_right(&"c"), Ok(&3));
        assert_eq!(bimap.at_left(&4), Err(BimapError::KeyNotFound));
        let lefts: Vec<u32> = bimap.iter_left().map(|(l, _)| *l).collect();
        assert_eq!(lefts, vec![1, 2, 3]);
        bimap.validate().unwrap();
    }

    #[test]
    fn conflicting_insert_changes_nothing() {
        let mut bimap = abc();
        assert!(bimap.insert(1, "z").is_end());
        assert!(bimap.insert(9, "a").is_end());
        assert_eq!(bimap.try_insert(1, "z"), Err(BimapError::DuplicateLeft));
        assert_eq!(bimap.try_insert(9, "b"), Err(BimapError::DuplicateRight));
        assert_eq!(bimap.len(), 3);
        assert_eq!(bimap.at_left(&1), Ok(&"a"));
        assert!(!bimap.contains_left(&9));
    }

    #[test]
    fn flip_reaches_the_paired_value() {
        let bimap = abc();
        let pos = bimap.find_left(&2);
        assert_eq!(bimap.value(pos), Some(&2));
        assert_eq!(bimap.value(pos.flip()), Some(&"b"));
        assert_eq!(bimap.paired(pos), Some(&"b"));
        assert_eq!(pos.flip().flip(), pos);
        assert!(bimap.end_left().flip().is_end());
    }

    #[test]
    fn erase_by_position_returns_successor() {
        let mut bimap = abc();
        let pos = bimap.find_left(&2);
        let next = bimap.erase_left(pos);
        assert_eq!(bimap.value(next), Some(&3));
        assert!(bimap.find_left(&2).is_end());
        assert!(bimap.find_right(&"b").is_end());
        assert_eq!(bimap.len(), 2);
        bimap.validate().unwrap();

        let pos = bimap.find_right(&"c");
        assert!(bimap.erase_right(pos).is_end());
        assert_eq!(bimap.len(), 1);
    }

    #[test]
    fn erase_by_key() {
        let mut bimap = abc();
        assert!(bimap.erase_right_key(&"a"));
        assert!(!bimap.erase_right_key(&"a"));
        assert!(bimap.erase_left_key(&3));
        assert!(!bimap.erase_left_key(&3));
        assert_eq!(bimap.len(), 1);
        assert_eq!(bimap.at_left(&2), Ok(&"b"));
    }

    #[test]
    fn erasing_the_end_is_a_no_op() {
        let mut bimap = abc();
        assert!(bimap.erase_left(bimap.end_left()).is_end());
        assert_eq!(bimap.len(), 3);
    }

    #[test]
    fn navigation_is_bidirectional() {
        let bimap = abc();
        let last = bimap.prev(bimap.end_left());
        assert_eq!(bimap.value(last), Some(&3));
        let first = bimap.begin_right();
        assert_eq!(bimap.value(first), Some(&"a"));
        assert_eq!(bimap.value(bimap.next(first)), Some(&"b"));
        assert!(bimap.prev(first).is_end());
    }

    #[test]
    fn default_insertion_evicts_stale_default() {
        let mut bimap: Bimap<u32, String> = Bimap::new();
        bimap.insert(1, String::new());
        bimap.insert(2, "two".to_string());

        assert_eq!(bimap.at_left_or_default(2), "two");
        assert_eq!(bimap.len(), 2);

        assert_eq!(bimap.at_left_or_default(5), "");
        assert_eq!(bimap.len(), 2);
        assert!(!bimap.contains_left(&1));
        assert_eq!(bimap.at_right(&String::new()), Ok(&5));
        bimap.validate().unwrap();
    }

    #[test]
    fn at_right_or_default_mirrors_left() {
        let mut bimap: Bimap<u32, &str> = Bimap::new();
        bimap.insert(0, "zero");
        assert_eq!(*bimap.at_right_or_default("zero"), 0);
        assert_eq!(*bimap.at_right_or_default("new"), 0);
        assert!(!bimap.contains_right(&"zero"));
        assert_eq!(bimap.len(), 1);
    }

    #[test]
    fn clear_and_reuse() {
        let mut bimap = abc();
        bimap.clear();
        assert!(bimap.is_empty());
        assert!(bimap.begin_left().is_end());
        bimap.insert(4, "d");
        assert_eq!(bimap.len(), 1);
        bimap.validate().unwrap();
    }
}
