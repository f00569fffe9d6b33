use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::avl_tree;
use crate::record::{RecordId, RecordPool, Side};

fn entry<'a, S: Side, L, R>(
    pool: &'a RecordPool<L, R>,
    id: RecordId,
) -> (&'a S::Value<L, R>, &'a <S::Flip as Side>::Value<L, R>) {
    (pool.value::<S>(id), pool.value::<S::Flip>(id))
}

/// Pairs of a bimap in the order of side `S`, each given as
/// `(value on S, paired value)`.
pub struct Iter<'a, S, L, R> {
    pool: &'a RecordPool<L, R>,
    front: Option<RecordId>,
    back: Option<RecordId>,
    remaining: usize,
    _side: PhantomData<S>,
}

impl<'a, S: Side, L, R> Iter<'a, S, L, R> {
    pub(crate) fn new(pool: &'a RecordPool<L, R>, len: usize) -> Self {
        Self {
            pool,
            front: avl_tree::first::<S, L, R>(pool),
            back: avl_tree::last::<S, L, R>(pool),
            remaining: len,
            _side: PhantomData,
        }
    }

    /// Record ids instead of values, in the same order.
    pub(crate) fn records(self) -> Vec<RecordId> {
        let mut out = Vec::with_capacity(self.remaining);
        let mut cur = self.front;
        while let Some(id) = cur {
            if out.len() == self.remaining {
                break;
            }
            out.push(id);
            cur = avl_tree::next::<S, L, R>(self.pool, cur);
        }
        out
    }
}

impl<'a, S: Side, L, R> Iterator for Iter<'a, S, L, R> {
    type Item = (&'a S::Value<L, R>, &'a <S::Flip as Side>::Value<L, R>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        self.remaining -= 1;
        self.front = avl_tree::next::<S, L, R>(self.pool, Some(id));
        Some(entry::<S, L, R>(self.pool, id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, S: Side, L, R> DoubleEndedIterator for Iter<'a, S, L, R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        self.remaining -= 1;
        self.back = avl_tree::prev::<S, L, R>(self.pool, Some(id));
        Some(entry::<S, L, R>(self.pool, id))
    }
}

impl<'a, S: Side, L, R> ExactSizeIterator for Iter<'a, S, L, R> {}

impl<'a, S: Side, L, R> FusedIterator for Iter<'a, S, L, R> {}

impl<'a, S, L, R> Clone for Iter<'a, S, L, R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
            _side: PhantomData,
        }
    }
}

/// Pairs between two positions of side `S`, start included, stop excluded.
pub struct Range<'a, S, L, R> {
    pool: &'a RecordPool<L, R>,
    front: Option<RecordId>,
    stop: Option<RecordId>,
    _side: PhantomData<S>,
}

impl<'a, S: Side, L, R> Range<'a, S, L, R> {
    pub(crate) fn new(
        pool: &'a RecordPool<L, R>,
        start: Option<RecordId>,
        stop: Option<RecordId>,
    ) -> Self {
        Self {
            pool,
            front: start,
            stop,
            _side: PhantomData,
        }
    }
}

impl<'a, S: Side, L, R> Iterator for Range<'a, S, L, R> {
    type Item = (&'a S::Value<L, R>, &'a <S::Flip as Side>::Value<L, R>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.stop {
            return None;
        }
        let id = self.front?;
        self.front = avl_tree::next::<S, L, R>(self.pool, Some(id));
        Some(entry::<S, L, R>(self.pool, id))
    }
}

impl<'a, S: Side, L, R> FusedIterator for Range<'a, S, L, R> {}

/// Owning iterator over the pairs of a bimap, in left order.
pub struct IntoIter<L, R> {
    pool: RecordPool<L, R>,
    order: std::vec::IntoIter<RecordId>,
}

impl<L, R> IntoIter<L, R> {
    pub(crate) fn new(pool: RecordPool<L, R>, order: Vec<RecordId>) -> Self {
        Self {
            pool,
            order: order.into_iter(),
        }
    }
}

impl<L, R> Iterator for IntoIter<L, R> {
    type Item = (L, R);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.order.next()?;
        Some(self.pool.free(id).into_pair())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<L, R> DoubleEndedIterator for IntoIter<L, R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let id = self.order.next_back()?;
        Some(self.pool.free(id).into_pair())
    }
}

impl<L, R> ExactSizeIterator for IntoIter<L, R> {}

#[cfg(test)]
mod tests {
    use crate::bimap::Bimap;

    fn sample() -> Bimap<u32, char> {
        [(3, 'a'), (1, 'c'), (2, 'b'), (4, 'd')].into_iter().collect()
    }

    #[test]
    fn iterates_in_side_order() {
        let bimap = sample();
        let left: Vec<(u32, char)> = bimap.iter_left().map(|(l, r)| (*l, *r)).collect();
        assert_eq!(left, vec![(1, 'c'), (2, 'b'), (3, 'a'), (4, 'd')]);
        let right: Vec<(char, u32)> = bimap.iter_right().map(|(r, l)| (*r, *l)).collect();
        assert_eq!(right, vec![('a', 3), ('b', 2), ('c', 1), ('d', 4)]);
    }

    #[test]
    fn meets_in_the_middle() {
        let bimap = sample();
        let mut iter = bimap.iter_left();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next().map(|(l, _)| *l), Some(1));
        assert_eq!(iter.next_back().map(|(l, _)| *l), Some(4));
        assert_eq!(iter.next_back().map(|(l, _)| *l), Some(3));
        assert_eq!(iter.next().map(|(l, _)| *l), Some(2));
        assert!(iter.next().is_none());
        assert!(iter.next_back().is_none());
    }

    #[test]
    fn ranges() {
        let bimap = sample();
        let lefts: Vec<u32> = bimap.range_left(2..4).map(|(l, _)| *l).collect();
        assert_eq!(lefts, vec![2, 3]);
        let rights: Vec<char> = bimap.range_right('b'..).map(|(r, _)| *r).collect();
        assert_eq!(rights, vec!['b', 'c', 'd']);
        assert_eq!(bimap.range_left(5..).count(), 0);
        assert_eq!(bimap.range_left(3..3).count(), 0);
    }

    #[test]
    fn owning_iteration() {
        let pairs: Vec<(u32, char)> = sample().into_iter().rev().collect();
        assert_eq!(pairs, vec![(4, 'd'), (3, 'a'), (2, 'b'), (1, 'c')]);
    }
}
