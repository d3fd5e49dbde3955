use std::{iter::FusedIterator, marker::PhantomData};

use crate::node::{self, Node, NodePtr};

/// Iterator over entries in sort order, stepping via parent links.
pub struct Iter<'a, K, V> {
    front: NodePtr<K, V>,
    back: NodePtr<K, V>,
    len: usize,
    marker: PhantomData<&'a Node<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V> {
    // root belongs to a tree borrowed for 'a, holding len entries.
    pub(crate) fn new(root: NodePtr<K, V>, len: usize) -> Self {
        Iter {
            front: root.map(node::leftmost),
            back: root.map(node::rightmost),
            len,
            marker: PhantomData,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node = self.front?;
        self.len -= 1;
        self.front = node::next(node);
        // SAFETY: the tree is borrowed for 'a.
        Some(unsafe { (node::key(node), node::value(node)) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node = self.back?;
        self.len -= 1;
        self.back = node::prev(node);
        Some(unsafe { (node::key(node), node::value(node)) })
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over entries in sort order, with mutable values.
pub struct IterMut<'a, K, V> {
    front: NodePtr<K, V>,
    back: NodePtr<K, V>,
    len: usize,
    marker: PhantomData<&'a mut Node<K, V>>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    // root belongs to a tree exclusively borrowed for 'a.
    pub(crate) fn new(root: NodePtr<K, V>, len: usize) -> Self {
        IterMut {
            front: root.map(node::leftmost),
            back: root.map(node::rightmost),
            len,
            marker: PhantomData,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node = self.front?;
        self.len -= 1;
        self.front = node::next(node);
        // SAFETY: the tree is exclusively borrowed for 'a and every node
        // is yielded at most once, len stops front and back from crossing.
        // Stepping reads links only, never the values handed out.
        Some(unsafe { (node::key(node), node::value_mut(node)) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node = self.back?;
        self.len -= 1;
        self.back = node::prev(node);
        // SAFETY: same as next().
        Some(unsafe { (node::key(node), node::value_mut(node)) })
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Iterator over a sub-range of entries, refer to [`OrderedMap::range`].
/// Use `.rev()` to walk the range from high to low.
///
/// [`OrderedMap::range`]: crate::OrderedMap::range
pub struct Range<'a, K, V> {
    front: NodePtr<K, V>,
    back: NodePtr<K, V>,
    marker: PhantomData<&'a Node<K, V>>,
}

impl<'a, K, V> Range<'a, K, V>
where
    K: Ord,
{
    // `low` and `high` are the first and last nodes within bounds.
    pub(crate) fn new(low: NodePtr<K, V>, high: NodePtr<K, V>) -> Self {
        let (front, back) = match (low, high) {
            // SAFETY: the tree is borrowed for 'a.
            (Some(l), Some(h)) if unsafe { node::key(l) <= node::key(h) } => (low, high),
            _ => (None, None),
        };
        Range {
            front,
            back,
            marker: PhantomData,
        }
    }
}

impl<'a, K, V> Range<'a, K, V> {
    // front and back met, range is exhausted after this item.
    fn meet(&mut self) -> bool {
        let met = self.front.is_some() && self.front == self.back;
        if met {
            self.front = None;
            self.back = None;
        }
        met
    }
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.front?;
        if !self.meet() {
            self.front = node::next(node);
        }
        Some(unsafe { (node::key(node), node::value(node)) })
    }
}

impl<'a, K, V> DoubleEndedIterator for Range<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.back?;
        if !self.meet() {
            self.back = node::prev(node);
        }
        Some(unsafe { (node::key(node), node::value(node)) })
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}
