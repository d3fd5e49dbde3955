use std::{borrow::Borrow, ops::RangeBounds, ptr::NonNull};

use crate::cursor::{find_node, lower_bound, upper_bound, Cursor, CursorMut};
use crate::iter::{Iter, IterMut, Range};
use crate::node::{self, Node, NodeLink};

mod private {
    // Only trees of this crate hand out root handles.
    pub trait Sealed {}

    impl<K, V> Sealed for crate::Llrb<K, V> {}
    impl<K, V> Sealed for crate::Bst<K, V> {}
}

/// OrderedMap is the abstract ordered map, implemented by the balanced
/// [`Llrb`] and the unbalanced [`Bst`]. Both share the same node shape,
/// so every read operation is provided here. The trait is sealed, it
/// cannot be implemented outside this crate.
///
/// Write operations are left to the implementation. Mixing the two
/// write paths on one tree would break the red-black rules, which is why
/// they are two types and not two sets of methods.
///
/// [`Llrb`]: crate::Llrb
/// [`Bst`]: crate::Bst
pub trait OrderedMap<K, V>: private::Sealed
where
    K: Ord,
{
    // Handle on the root node. Every node reachable from it stays
    // allocated while self is borrowed, and nothing but the tree's own
    // write operations touch it.
    #[doc(hidden)]
    fn root_ptr(&self) -> Option<NonNull<Node<K, V>>>;

    /// Return number of entries.
    fn len(&self) -> usize;

    /// Set value for key, return the old value if key was present.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Remove key and return its value, no-op if key is missing.
    fn erase<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the root node, `None` for an empty map.
    fn root(&self) -> Option<&Node<K, V>> {
        // SAFETY: see root_ptr(), the node lives as long as the borrow.
        self.root_ptr().map(|root| unsafe { &*root.as_ptr() })
    }

    /// Get the value for key.
    fn get<'a, Q>(&'a self, key: &Q) -> Option<&'a V>
    where
        K: Borrow<Q> + 'a,
        Q: Ord + ?Sized,
    {
        self.find(key).value()
    }

    fn get_mut<'a, Q>(&'a mut self, key: &Q) -> Option<&'a mut V>
    where
        K: Borrow<Q> + 'a,
        Q: Ord + ?Sized,
    {
        self.find_mut(key).into_value_mut()
    }

    fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        find_node(self.root_ptr(), key).is_some()
    }

    /// Return a cursor on `key`, or the end cursor when key is missing.
    fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let root = self.root_ptr();
        Cursor::new(root, find_node(root, key))
    }

    /// Mutable variant of [`OrderedMap::find`].
    fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let root = self.root_ptr();
        CursorMut::new(root, find_node(root, key))
    }

    /// Cursor on the first entry, end cursor on an empty map.
    fn begin(&self) -> Cursor<'_, K, V> {
        let root = self.root_ptr();
        Cursor::new(root, root.map(node::leftmost))
    }

    fn end(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.root_ptr(), None)
    }

    /// Mutable variant of [`OrderedMap::begin`].
    fn begin_mut(&mut self) -> CursorMut<'_, K, V> {
        let root = self.root_ptr();
        CursorMut::new(root, root.map(node::leftmost))
    }

    /// Cursor on the entry with smallest key.
    fn min(&self) -> Cursor<'_, K, V> {
        self.begin()
    }

    /// Cursor on the entry with largest key.
    fn max(&self) -> Cursor<'_, K, V> {
        let root = self.root_ptr();
        Cursor::new(root, root.map(node::rightmost))
    }

    /// Return the half open range `[first, last)` of entries matching
    /// `key`. `last` is found by stepping forward from `first` while the
    /// key still matches, so with unique keys the range is at most one
    /// entry long. A missing key returns `(end, end)`.
    fn equal_range<Q>(&self, key: &Q) -> (Cursor<'_, K, V>, Cursor<'_, K, V>)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let first = self.find(key);
        let mut last = first;
        if !last.is_end() {
            last.move_next();
            while last.key().map_or(false, |k| k.borrow() == key) {
                last.move_next();
            }
        }
        (first, last)
    }

    /// Among the entries matching `key`, return a cursor on the one with
    /// the smallest value. End cursor when key is missing.
    fn min_value_of<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: PartialOrd,
    {
        let (mut cursor, last) = self.equal_range(key);
        let mut best = cursor;
        while cursor != last {
            if let (Some(value), Some(best_value)) = (cursor.value(), best.value()) {
                if value < best_value {
                    best = cursor;
                }
            }
            cursor.move_next();
        }
        best
    }

    /// Among the entries matching `key`, return a cursor on the one with
    /// the largest value. End cursor when key is missing.
    fn max_value_of<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: PartialOrd,
    {
        let (mut cursor, last) = self.equal_range(key);
        let mut best = cursor;
        while cursor != last {
            if let (Some(value), Some(best_value)) = (cursor.value(), best.value()) {
                if value > best_value {
                    best = cursor;
                }
            }
            cursor.move_next();
        }
        best
    }

    /// Return an iterator over all entries in sort order.
    fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root_ptr(), self.len())
    }

    /// Return an iterator over all entries in sort order, values can be
    /// updated in place.
    fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.root_ptr(), self.len())
    }

    /// Range over entries within `range`, use `.rev()` on the returned
    /// iterator to walk from high to low.
    fn range<Q, R>(&self, range: R) -> Range<'_, K, V>
    where
        K: Borrow<Q>,
        R: RangeBounds<Q>,
        Q: Ord + ?Sized,
    {
        let root = self.root_ptr();
        let low = lower_bound(root, range.start_bound());
        let high = upper_bound(root, range.end_bound());
        Range::new(low, high)
    }

    /// Height of the tree, counted in edges from root to the deepest
    /// node. Empty and single entry trees have height 0.
    fn max_height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<_> = self.root_ptr().into_iter().map(|n| (n, 0)).collect();
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            if let Some(left) = node.left() {
                stack.push((left, depth + 1));
            }
            if let Some(right) = node.right() {
                stack.push((right, depth + 1));
            }
        }
        height
    }
}
