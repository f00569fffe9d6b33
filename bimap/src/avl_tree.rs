//! AVL tree threaded through one side of the records of a [`RecordPool`].
//!
//! The tree never owns, allocates or frees records. It only rewrites the
//! links of side `S`, so rotations relink records in place and every
//! [`RecordId`] stays valid across rebalancing.
//!
//! Operations that need the order live on [`AvlTree`], which holds the
//! comparator. Navigation and unlinking only follow links and are free
//! functions, so they can run on a side without knowing its comparator.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::ops::{Bound, RangeBounds};

use crate::compare::Compare;
use crate::error::{BimapError, Result};
use crate::record::{Links, RecordId, RecordPool, Side};

#[derive(Debug, Clone, Default)]
pub struct AvlTree<S, C> {
    cmp: C,
    _side: PhantomData<S>,
}

impl<S: Side, C> AvlTree<S, C> {
    pub fn new(cmp: C) -> Self {
        Self {
            cmp,
            _side: PhantomData,
        }
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    pub fn find<L, R>(
        &self,
        pool: &RecordPool<L, R>,
        value: &S::Value<L, R>,
    ) -> Option<RecordId>
    where
        C: Compare<S::Value<L, R>>,
    {
        let mut cur = pool.root::<S>();
        while let Some(id) = cur {
            let links = pool.links::<S>(id);
            cur = match self.cmp.compare(value, pool.value::<S>(id)) {
                Ordering::Less => links.left,
                Ordering::Greater => links.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// First record not ordered before `value`.
    pub fn lower_bound<L, R>(
        &self,
        pool: &RecordPool<L, R>,
        value: &S::Value<L, R>,
    ) -> Option<RecordId>
    where
        C: Compare<S::Value<L, R>>,
    {
        let mut best = None;
        let mut cur = pool.root::<S>();
        while let Some(id) = cur {
            let links = pool.links::<S>(id);
            if self.cmp.lt(pool.value::<S>(id), value) {
                cur = links.right;
            } else {
                best = Some(id);
                cur = links.left;
            }
        }
        best
    }

    /// First record ordered after `value`.
    pub fn upper_bound<L, R>(
        &self,
        pool: &RecordPool<L, R>,
        value: &S::Value<L, R>,
    ) -> Option<RecordId>
    where
        C: Compare<S::Value<L, R>>,
    {
        let mut best = None;
        let mut cur = pool.root::<S>();
        while let Some(id) = cur {
            let links = pool.links::<S>(id);
            if self.cmp.lt(value, pool.value::<S>(id)) {
                best = Some(id);
                cur = links.left;
            } else {
                cur = links.right;
            }
        }
        best
    }

    /// Resolves `range` into a half-open pair `(start, stop)` of positions,
    /// `None` standing for the end. An empty range yields `start == stop`.
    pub fn range<L, R, B>(
        &self,
        pool: &RecordPool<L, R>,
        range: &B,
    ) -> (Option<RecordId>, Option<RecordId>)
    where
        C: Compare<S::Value<L, R>>,
        B: RangeBounds<S::Value<L, R>>,
    {
        let start = match range.start_bound() {
            Bound::Included(v) => self.lower_bound(pool, v),
            Bound::Excluded(v) => self.upper_bound(pool, v),
            Bound::Unbounded => first::<S, L, R>(pool),
        };
        let stop = match range.end_bound() {
            Bound::Included(v) => self.upper_bound(pool, v),
            Bound::Excluded(v) => self.lower_bound(pool, v),
            Bound::Unbounded => None,
        };
        match (start, stop) {
            (Some(a), Some(b)) if !self.cmp.lt(pool.value::<S>(a), pool.value::<S>(b)) => {
                (stop, stop)
            }
            (None, _) => (None, None),
            _ => (start, stop),
        }
    }

    /// Links a detached record into the tree and rebalances the path above it.
    ///
    /// The caller guarantees no equivalent value is present.
    pub fn insert<L, R>(&self, pool: &mut RecordPool<L, R>, id: RecordId)
    where
        C: Compare<S::Value<L, R>>,
    {
        let mut parent = None;
        let mut go_left = false;
        let mut cur = pool.root::<S>();
        while let Some(at) = cur {
            parent = Some(at);
            let links = pool.links::<S>(at);
            go_left = self.cmp.lt(pool.value::<S>(id), pool.value::<S>(at));
            cur = if go_left { links.left } else { links.right };
        }

        *pool.links_mut::<S>(id) = Links::leaf(parent);
        match parent {
            None => pool.set_root::<S>(Some(id)),
            Some(p) if go_left => pool.links_mut::<S>(p).left = Some(id),
            Some(p) => pool.links_mut::<S>(p).right = Some(id),
        }
        log::trace!("linked {:?} into {} tree under {:?}", id, S::NAME, parent);

        rebalance_upward::<S, L, R>(pool, parent);
    }

    /// Checks parent links, heights, balance and strict ordering.
    /// Returns the number of records reachable from the root.
    pub fn check<L, R>(&self, pool: &RecordPool<L, R>) -> Result<usize>
    where
        C: Compare<S::Value<L, R>>,
    {
        let corrupted = |reason: String| BimapError::Corrupted {
            side: S::NAME,
            reason,
        };

        if let Some(root) = pool.root::<S>() {
            if pool.links::<S>(root).parent.is_some() {
                return Err(corrupted(format!("root {:?} has a parent", root)));
            }
        }

        for id in reachable::<S, L, R>(pool) {
            let links = pool.links::<S>(id);
            for child in [links.left, links.right].into_iter().flatten() {
                if pool.links::<S>(child).parent != Some(id) {
                    return Err(corrupted(format!(
                        "{:?} is a child of {:?} but does not point back to it",
                        child, id
                    )));
                }
            }
            let hl = height_of::<S, L, R>(pool, links.left);
            let hr = height_of::<S, L, R>(pool, links.right);
            if links.height != 1 + hl.max(hr) {
                return Err(corrupted(format!(
                    "{:?} has height {} but children of heights {} and {}",
                    id, links.height, hl, hr
                )));
            }
            if hl.abs_diff(hr) > 1 {
                return Err(corrupted(format!(
                    "{:?} is unbalanced: children of heights {} and {}",
                    id, hl, hr
                )));
            }
        }

        let mut count = 0;
        let mut prev: Option<RecordId> = None;
        let mut cur = first::<S, L, R>(pool);
        while let Some(id) = cur {
            if let Some(p) = prev {
                if !self.cmp.lt(pool.value::<S>(p), pool.value::<S>(id)) {
                    return Err(corrupted(format!("{:?} is not ordered after {:?}", id, p)));
                }
            }
            count += 1;
            prev = cur;
            cur = next::<S, L, R>(pool, cur);
        }
        Ok(count)
    }
}

/// Ids of all records reachable from the root, in preorder.
fn reachable<S: Side, L, R>(pool: &RecordPool<L, R>) -> Vec<RecordId> {
    let mut out = Vec::new();
    let mut stack: Vec<RecordId> = pool.root::<S>().into_iter().collect();
    while let Some(id) = stack.pop() {
        out.push(id);
        let links = pool.links::<S>(id);
        stack.extend(links.right);
        stack.extend(links.left);
    }
    out
}

fn height_of<S: Side, L, R>(pool: &RecordPool<L, R>, node: Option<RecordId>) -> u16 {
    node.map_or(0, |id| pool.links::<S>(id).height)
}

fn update_height<S: Side, L, R>(pool: &mut RecordPool<L, R>, id: RecordId) {
    let links = pool.links::<S>(id);
    let h = 1 + height_of::<S, L, R>(pool, links.left).max(height_of::<S, L, R>(pool, links.right));
    pool.links_mut::<S>(id).height = h;
}

fn balance_factor<S: Side, L, R>(pool: &RecordPool<L, R>, id: RecordId) -> i32 {
    let links = pool.links::<S>(id);
    height_of::<S, L, R>(pool, links.left) as i32 - height_of::<S, L, R>(pool, links.right) as i32
}

/// Makes `new` take the place of `old` under `parent`, or as root.
fn replace_child<S: Side, L, R>(
    pool: &mut RecordPool<L, R>,
    parent: Option<RecordId>,
    old: RecordId,
    new: Option<RecordId>,
) {
    match parent {
        None => pool.set_root::<S>(new),
        Some(p) => {
            let links = pool.links_mut::<S>(p);
            if links.left == Some(old) {
                links.left = new;
            } else {
                links.right = new;
            }
        }
    }
    if let Some(n) = new {
        pool.links_mut::<S>(n).parent = parent;
    }
}

fn set_parent<S: Side, L, R>(
    pool: &mut RecordPool<L, R>,
    child: Option<RecordId>,
    parent: RecordId,
) {
    if let Some(c) = child {
        pool.links_mut::<S>(c).parent = Some(parent);
    }
}

//     x              y
//    / \            / \
//   a   y    =>    x   c
//      / \        / \
//     b   c      a   b
fn rotate_left<S: Side, L, R>(pool: &mut RecordPool<L, R>, x: RecordId) -> RecordId {
    let Links { parent, right, .. } = *pool.links::<S>(x);
    let y = right.expect("left rotation needs a right child");
    let b = pool.links::<S>(y).left;

    pool.links_mut::<S>(x).right = b;
    set_parent::<S, L, R>(pool, b, x);
    replace_child::<S, L, R>(pool, parent, x, Some(y));
    pool.links_mut::<S>(y).left = Some(x);
    pool.links_mut::<S>(x).parent = Some(y);

    update_height::<S, L, R>(pool, x);
    update_height::<S, L, R>(pool, y);
    log::trace!("rotated {:?} left in {} tree", x, S::NAME);
    y
}

fn rotate_right<S: Side, L, R>(pool: &mut RecordPool<L, R>, y: RecordId) -> RecordId {
    let Links { parent, left, .. } = *pool.links::<S>(y);
    let x = left.expect("right rotation needs a left child");
    let b = pool.links::<S>(x).right;

    pool.links_mut::<S>(y).left = b;
    set_parent::<S, L, R>(pool, b, y);
    replace_child::<S, L, R>(pool, parent, y, Some(x));
    pool.links_mut::<S>(x).right = Some(y);
    pool.links_mut::<S>(y).parent = Some(x);

    update_height::<S, L, R>(pool, y);
    update_height::<S, L, R>(pool, x);
    log::trace!("rotated {:?} right in {} tree", y, S::NAME);
    x
}

/// Restores the height and balance of `id`, whose subtrees are valid AVL
/// trees differing in height by at most two. Returns the new subtree root.
fn rebalance<S: Side, L, R>(pool: &mut RecordPool<L, R>, id: RecordId) -> RecordId {
    update_height::<S, L, R>(pool, id);
    let bf = balance_factor::<S, L, R>(pool, id);
    if bf > 1 {
        let l = pool.links::<S>(id).left.expect("left-heavy node has a left child");
        if balance_factor::<S, L, R>(pool, l) < 0 {
            rotate_left::<S, L, R>(pool, l);
        }
        rotate_right::<S, L, R>(pool, id)
    } else if bf < -1 {
        let r = pool.links::<S>(id).right.expect("right-heavy node has a right child");
        if balance_factor::<S, L, R>(pool, r) > 0 {
            rotate_right::<S, L, R>(pool, r);
        }
        rotate_left::<S, L, R>(pool, id)
    } else {
        id
    }
}

/// Rebalances `from` and every ancestor of it, up to the root.
fn rebalance_upward<S: Side, L, R>(pool: &mut RecordPool<L, R>, from: Option<RecordId>) {
    let mut cur = from;
    while let Some(id) = cur {
        let top = rebalance::<S, L, R>(pool, id);
        cur = pool.links::<S>(top).parent;
    }
}

fn min_below<S: Side, L, R>(pool: &RecordPool<L, R>, mut id: RecordId) -> RecordId {
    while let Some(l) = pool.links::<S>(id).left {
        id = l;
    }
    id
}

fn max_below<S: Side, L, R>(pool: &RecordPool<L, R>, mut id: RecordId) -> RecordId {
    while let Some(r) = pool.links::<S>(id).right {
        id = r;
    }
    id
}

/// Unlinks `id` from the tree of side `S` and returns its in-order successor.
///
/// The record keeps its storage; only its links on side `S` are reset.
pub fn erase<S: Side, L, R>(pool: &mut RecordPool<L, R>, id: RecordId) -> Option<RecordId> {
    let successor = next::<S, L, R>(pool, Some(id));
    let Links {
        parent,
        left,
        right,
        ..
    } = *pool.links::<S>(id);

    let vacated = match (left, right) {
        (Some(l), Some(r)) => {
            let m = min_below::<S, L, R>(pool, r);
            let from = if m == r {
                Some(m)
            } else {
                let m_parent = pool.links::<S>(m).parent;
                let m_right = pool.links::<S>(m).right;
                if let Some(mp) = m_parent {
                    pool.links_mut::<S>(mp).left = m_right;
                    set_parent::<S, L, R>(pool, m_right, mp);
                }
                pool.links_mut::<S>(m).right = Some(r);
                set_parent::<S, L, R>(pool, Some(r), m);
                m_parent
            };
            pool.links_mut::<S>(m).left = Some(l);
            set_parent::<S, L, R>(pool, Some(l), m);
            replace_child::<S, L, R>(pool, parent, id, Some(m));
            from
        }
        (child, None) | (None, child) => {
            replace_child::<S, L, R>(pool, parent, id, child);
            parent
        }
    };

    *pool.links_mut::<S>(id) = Links::default();
    log::trace!("unlinked {:?} from {} tree", id, S::NAME);

    rebalance_upward::<S, L, R>(pool, vacated);
    successor
}

pub fn first<S: Side, L, R>(pool: &RecordPool<L, R>) -> Option<RecordId> {
    pool.root::<S>().map(|root| min_below::<S, L, R>(pool, root))
}

pub fn last<S: Side, L, R>(pool: &RecordPool<L, R>) -> Option<RecordId> {
    pool.root::<S>().map(|root| max_below::<S, L, R>(pool, root))
}

/// In-order successor. The end has no successor and stays the end.
pub fn next<S: Side, L, R>(pool: &RecordPool<L, R>, pos: Option<RecordId>) -> Option<RecordId> {
    let mut id = pos?;
    if let Some(r) = pool.links::<S>(id).right {
        return Some(min_below::<S, L, R>(pool, r));
    }
    while let Some(p) = pool.links::<S>(id).parent {
        if pool.links::<S>(p).left == Some(id) {
            return Some(p);
        }
        id = p;
    }
    None
}

/// In-order predecessor. The predecessor of the end is the last record, the
/// predecessor of the first record is the end.
pub fn prev<S: Side, L, R>(pool: &RecordPool<L, R>, pos: Option<RecordId>) -> Option<RecordId> {
    let Some(mut id) = pos else {
        return last::<S, L, R>(pool);
    };
    if let Some(l) = pool.links::<S>(id).left {
        return Some(max_below::<S, L, R>(pool, l));
    }
    while let Some(p) = pool.links::<S>(id).parent {
        if pool.links::<S>(p).right == Some(id) {
            return Some(p);
        }
        id = p;
    }
    None
}

/// Height of the whole tree, zero when empty.
pub fn height<S: Side, L, R>(pool: &RecordPool<L, R>) -> u16 {
    height_of::<S, L, R>(pool, pool.root::<S>())
}
