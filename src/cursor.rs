use std::{borrow::Borrow, cmp::Ordering, fmt, marker::PhantomData, ops::Bound};

use crate::node::{self, Node, NodeLink, NodePtr};

/// Cursor is a read-only position in the tree, either on an entry or
/// on the `end` position.
///
/// End is both "one past the last entry" and "one before the first
/// entry": [`Cursor::move_next`] from end lands on the first entry and
/// [`Cursor::move_prev`] from end lands on the last entry. Two cursors
/// compare equal when they point to the same node, or both are end.
pub struct Cursor<'a, K, V> {
    root: NodePtr<K, V>,
    node: NodePtr<K, V>,
    marker: PhantomData<&'a Node<K, V>>,
}

impl<'a, K, V> Cursor<'a, K, V> {
    // root and node belong to a tree that is borrowed for 'a.
    pub(crate) fn new(root: NodePtr<K, V>, node: NodePtr<K, V>) -> Self {
        Cursor {
            root,
            node,
            marker: PhantomData,
        }
    }

    /// Return whether this cursor is at the end position.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Key at cursor, `None` at end.
    #[inline]
    pub fn key(&self) -> Option<&'a K> {
        // SAFETY: the tree is borrowed for 'a, see new().
        self.node.map(|node| unsafe { node::key(node) })
    }

    /// Value at cursor, `None` at end.
    #[inline]
    pub fn value(&self) -> Option<&'a V> {
        self.node.map(|node| unsafe { node::value(node) })
    }

    #[inline]
    pub fn entry(&self) -> Option<(&'a K, &'a V)> {
        self.node
            .map(|node| unsafe { (node::key(node), node::value(node)) })
    }

    /// Node at cursor, gives access to its color.
    #[inline]
    pub fn node(&self) -> Option<&'a Node<K, V>> {
        self.node.map(|node| unsafe { &*node.as_ptr() })
    }

    /// Step to the in-order successor.
    pub fn move_next(&mut self) {
        self.node = match self.node {
            Some(node) => node::next(node),
            None => self.root.map(node::leftmost),
        }
    }

    /// Step to the in-order predecessor.
    pub fn move_prev(&mut self) {
        self.node = match self.node {
            Some(node) => node::prev(node),
            None => self.root.map(node::rightmost),
        }
    }
}

impl<'a, K, V> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V> Copy for Cursor<'a, K, V> {}

impl<'a, K, V> PartialEq for Cursor<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<'a, K, V> Eq for Cursor<'a, K, V> {}

impl<'a, K, V> fmt::Debug for Cursor<'a, K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.node() {
            Some(node) => write!(f, "Cursor({:?})", node),
            None => write!(f, "Cursor(end)"),
        }
    }
}

/// CursorMut is a position in the tree that can update the value of the
/// entry it points to. Keys are never handed out mutably, so the sort
/// order cannot be broken through a cursor.
pub struct CursorMut<'a, K, V> {
    root: NodePtr<K, V>,
    node: NodePtr<K, V>,
    marker: PhantomData<&'a mut Node<K, V>>,
}

impl<'a, K, V> CursorMut<'a, K, V> {
    // root and node belong to a tree that is exclusively borrowed for 'a.
    pub(crate) fn new(root: NodePtr<K, V>, node: NodePtr<K, V>) -> Self {
        CursorMut {
            root,
            node,
            marker: PhantomData,
        }
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    #[inline]
    pub fn key(&self) -> Option<&K> {
        // SAFETY: the tree is exclusively borrowed for 'a, keys are
        // never written through a cursor.
        self.node.map(|node| unsafe { node::key(node) })
    }

    #[inline]
    pub fn value(&self) -> Option<&V> {
        // SAFETY: &self keeps value_mut() from running meanwhile.
        self.node.map(|node| unsafe { node::value(node) })
    }

    /// Mutable access to the value at cursor, `None` at end.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        // SAFETY: &mut self keeps the reference unique.
        self.node.map(|node| unsafe { node::value_mut(node) })
    }

    /// Consume the cursor, return the value it points to with the
    /// lifetime of the map borrow.
    pub fn into_value_mut(self) -> Option<&'a mut V> {
        // SAFETY: the cursor is consumed, nothing else can reach the
        // value until 'a ends.
        self.node.map(|node| unsafe { node::value_mut(node) })
    }

    pub fn move_next(&mut self) {
        self.node = match self.node {
            Some(node) => node::next(node),
            None => self.root.map(node::leftmost),
        }
    }

    pub fn move_prev(&mut self) {
        self.node = match self.node {
            Some(node) => node::prev(node),
            None => self.root.map(node::rightmost),
        }
    }

    /// Borrow this cursor as a read-only [`Cursor`].
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.root, self.node)
    }
}

/// Binary search for `key` starting from `node`.
pub(crate) fn find_node<K, V, Q>(mut node: NodePtr<K, V>, key: &Q) -> NodePtr<K, V>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    while let Some(nref) = node {
        // SAFETY: callers hold a borrow on the tree.
        node = match unsafe { node::key(nref) }.borrow().cmp(key) {
            Ordering::Less => nref.right(),
            Ordering::Greater => nref.left(),
            Ordering::Equal => return Some(nref),
        };
    }
    None
}

/// First node that falls within the `low` bound.
pub(crate) fn lower_bound<K, V, Q>(mut node: NodePtr<K, V>, low: Bound<&Q>) -> NodePtr<K, V>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut candidate = None;
    while let Some(nref) = node {
        let nkey: &Q = unsafe { node::key(nref) }.borrow();
        let below = match low {
            Bound::Included(qow) => nkey.lt(qow),
            Bound::Excluded(qow) => nkey.le(qow),
            Bound::Unbounded => false,
        };
        if below {
            node = nref.right();
        } else {
            candidate = Some(nref);
            node = nref.left();
        }
    }
    candidate
}

/// Last node that falls within the `high` bound.
pub(crate) fn upper_bound<K, V, Q>(mut node: NodePtr<K, V>, high: Bound<&Q>) -> NodePtr<K, V>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut candidate = None;
    while let Some(nref) = node {
        let nkey: &Q = unsafe { node::key(nref) }.borrow();
        let above = match high {
            Bound::Included(qigh) => nkey.gt(qigh),
            Bound::Excluded(qigh) => nkey.ge(qigh),
            Bound::Unbounded => false,
        };
        if above {
            node = nref.left();
        } else {
            candidate = Some(nref);
            node = nref.right();
        }
    }
    candidate
}
