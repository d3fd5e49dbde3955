use std::{fmt, mem, ptr::NonNull};

/// Handle on a node owned by its tree, `None` is an empty link.
pub(crate) type NodePtr<K, V> = Option<NonNull<Node<K, V>>>;

/// Node corresponds to a single entry in [`Llrb`] or [`Bst`] instance.
///
/// Nodes are allocated one by one and linked through raw pointers: the
/// tree owns every node, left and right links point down to the
/// children and the parent link points back up. A node is released
/// only by the tree that allocated it.
///
/// [`Llrb`]: crate::Llrb
/// [`Bst`]: crate::Bst
pub struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) black: bool,              // store: black or red
    pub(crate) parent: NodePtr<K, V>,    // back-link, root has none
    pub(crate) left: NodePtr<K, V>,      // store: left child
    pub(crate) right: NodePtr<K, V>,     // store: right child
}

impl<K, V> Node<K, V> {
    // CREATE operation, leaks a node without links. Give it back with
    // Node::free.
    pub(crate) fn alloc(key: K, value: V, black: bool) -> NonNull<Node<K, V>> {
        let node = Box::new(Node {
            key,
            value,
            black,
            parent: None,
            left: None,
            right: None,
        });
        NonNull::from(Box::leak(node))
    }

    /// Reclaim a node allocated by [`Node::alloc`], returning its entry.
    ///
    /// # Safety
    ///
    /// `node` must come from [`Node::alloc`], no link in the tree may
    /// still lead to it, and it must not be used after this call.
    pub(crate) unsafe fn free(node: NonNull<Node<K, V>>) -> (K, V) {
        let node = Box::from_raw(node.as_ptr());
        let Node { key, value, .. } = *node;
        (key, value)
    }

    /// Return the key of this entry.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Return the value of this entry.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Color of the link from parent to this node. Root is always black
    /// in an [`Llrb`], every node of a [`Bst`] stays red.
    ///
    /// [`Llrb`]: crate::Llrb
    /// [`Bst`]: crate::Bst
    #[inline]
    pub fn is_black(&self) -> bool {
        self.black
    }

    /// Inverse of [`Node::is_black`].
    #[inline]
    pub fn is_red(&self) -> bool {
        !self.black
    }
}

/// Link access on node handles.
///
/// A handle stays valid from [`Node::alloc`] until [`Node::free`], and
/// every method goes through the raw pointer one field at a time. No
/// reference to a whole node is ever made here, so references handed
/// out for other fields of the same node, say a `&mut V` yielded by
/// [`IterMut`], stay intact while links are read or written.
///
/// [`IterMut`]: crate::IterMut
pub(crate) trait NodeLink<K, V>: Copy {
    fn left(self) -> NodePtr<K, V>;

    fn right(self) -> NodePtr<K, V>;

    fn parent(self) -> NodePtr<K, V>;

    fn is_black(self) -> bool;

    fn set_black(self, black: bool);

    fn toggle_link(self);

    fn set_parent(self, parent: NodePtr<K, V>);

    // link `left` as left child, its parent back-link points to self.
    fn set_left(self, left: NodePtr<K, V>);

    // link `right` as right child, its parent back-link points to self.
    fn set_right(self, right: NodePtr<K, V>);

    // unlink and return the left child, its back-link is left as is.
    fn take_left(self) -> NodePtr<K, V>;

    fn take_right(self) -> NodePtr<K, V>;
}

impl<K, V> NodeLink<K, V> for NonNull<Node<K, V>> {
    // SAFETY, for every method: the handle is live, see NodeLink.

    #[inline]
    fn left(self) -> NodePtr<K, V> {
        unsafe { (*self.as_ptr()).left }
    }

    #[inline]
    fn right(self) -> NodePtr<K, V> {
        unsafe { (*self.as_ptr()).right }
    }

    #[inline]
    fn parent(self) -> NodePtr<K, V> {
        unsafe { (*self.as_ptr()).parent }
    }

    #[inline]
    fn is_black(self) -> bool {
        unsafe { (*self.as_ptr()).black }
    }

    #[inline]
    fn set_black(self, black: bool) {
        unsafe { (*self.as_ptr()).black = black }
    }

    #[inline]
    fn toggle_link(self) {
        self.set_black(!self.is_black())
    }

    #[inline]
    fn set_parent(self, parent: NodePtr<K, V>) {
        unsafe { (*self.as_ptr()).parent = parent }
    }

    #[inline]
    fn set_left(self, left: NodePtr<K, V>) {
        unsafe { (*self.as_ptr()).left = left };
        if let Some(child) = left {
            child.set_parent(Some(self));
        }
    }

    #[inline]
    fn set_right(self, right: NodePtr<K, V>) {
        unsafe { (*self.as_ptr()).right = right };
        if let Some(child) = right {
            child.set_parent(Some(self));
        }
    }

    #[inline]
    fn take_left(self) -> NodePtr<K, V> {
        unsafe { (*self.as_ptr()).left.take() }
    }

    #[inline]
    fn take_right(self) -> NodePtr<K, V> {
        unsafe { (*self.as_ptr()).right.take() }
    }
}

/// Empty links are black.
#[inline]
pub(crate) fn is_red<K, V>(node: NodePtr<K, V>) -> bool {
    node.map_or(false, |node| !node.is_black())
}

/// Borrow the key of `node` for `'a`.
///
/// # Safety
///
/// `node` must stay allocated, with its key untouched, for `'a`.
#[inline]
pub(crate) unsafe fn key<'a, K, V>(node: NonNull<Node<K, V>>) -> &'a K {
    &(*node.as_ptr()).key
}

/// Borrow the value of `node` for `'a`.
///
/// # Safety
///
/// Same as [`key`], and the value is not written for `'a`.
#[inline]
pub(crate) unsafe fn value<'a, K, V>(node: NonNull<Node<K, V>>) -> &'a V {
    &(*node.as_ptr()).value
}

/// Borrow the value of `node` mutably for `'a`.
///
/// # Safety
///
/// `node` must stay allocated for `'a` and nothing else may access its
/// value for `'a`.
#[inline]
pub(crate) unsafe fn value_mut<'a, K, V>(node: NonNull<Node<K, V>>) -> &'a mut V {
    &mut (*node.as_ptr()).value
}

/// Exchange the entries of two nodes, colors and links stay.
///
/// # Safety
///
/// Both handles are live, distinct, and their entries are not borrowed.
pub(crate) unsafe fn swap_entry<K, V>(a: NonNull<Node<K, V>>, b: NonNull<Node<K, V>>) {
    mem::swap(&mut (*a.as_ptr()).key, &mut (*b.as_ptr()).key);
    mem::swap(&mut (*a.as_ptr()).value, &mut (*b.as_ptr()).value);
}

// Traversal via parent back-links.

pub(crate) fn leftmost<K, V>(mut node: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
    while let Some(left) = node.left() {
        node = left;
    }
    node
}

pub(crate) fn rightmost<K, V>(mut node: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
    while let Some(right) = node.right() {
        node = right;
    }
    node
}

/// In-order successor of `node`. If there is a right subtree, it is the
/// leftmost node there. Otherwise climb while we are a right child, the
/// first ancestor we reach from its left side is next.
pub(crate) fn next<K, V>(node: NonNull<Node<K, V>>) -> NodePtr<K, V> {
    if let Some(right) = node.right() {
        return Some(leftmost(right));
    }
    let mut node = node;
    let mut parent = node.parent();
    while let Some(p) = parent {
        if p.right() != Some(node) {
            break;
        }
        node = p;
        parent = p.parent();
    }
    parent
}

/// In-order predecessor of `node`, mirror of [`next`].
pub(crate) fn prev<K, V>(node: NonNull<Node<K, V>>) -> NodePtr<K, V> {
    if let Some(left) = node.left() {
        return Some(rightmost(left));
    }
    let mut node = node;
    let mut parent = node.parent();
    while let Some(p) = parent {
        if p.left() != Some(node) {
            break;
        }
        node = p;
        parent = p.parent();
    }
    parent
}

/// Copy the subtree under `node`, parent links are re-derived for the
/// copy and the returned root is detached. Works off a heap stack, an
/// unbalanced tree of any height can be copied.
pub(crate) fn deep_clone<K, V>(node: NonNull<Node<K, V>>) -> NonNull<Node<K, V>>
where
    K: Clone,
    V: Clone,
{
    // copy of the entry and color, with no links.
    let clone_detach = |node: NonNull<Node<K, V>>| {
        // SAFETY: source tree is borrowed for the whole copy.
        let (key, value) = unsafe { (key(node), value(node)) };
        Node::alloc(key.clone(), value.clone(), node.is_black())
    };

    let root = clone_detach(node);
    let mut stack = vec![(node, root)];
    while let Some((src, dst)) = stack.pop() {
        if let Some(left) = src.left() {
            let copy = clone_detach(left);
            dst.set_left(Some(copy));
            stack.push((left, copy));
        }
        if let Some(right) = src.right() {
            let copy = clone_detach(right);
            dst.set_right(Some(copy));
            stack.push((right, copy));
        }
    }
    root
}

/// Free a subtree, children before parent. Uses a heap stack so that an
/// unbalanced tree of any height can be released.
///
/// # Safety
///
/// `root` must be the detached root of a subtree built from
/// [`Node::alloc`] handles, no node in it may be used afterwards.
pub(crate) unsafe fn teardown<K, V>(root: NodePtr<K, V>) {
    let mut stack: Vec<NonNull<Node<K, V>>> = root.into_iter().collect();
    while let Some(&top) = stack.last() {
        match top.take_left().or_else(|| top.take_right()) {
            Some(child) => stack.push(child),
            None => {
                stack.pop();
                Node::free(top);
            }
        }
    }
}

// Structural equality on the payload only, color and links are ignored.
impl<K, V> PartialEq for Node<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Node<K, V>) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl<K, V> fmt::Debug for Node<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let color = if self.black { "black" } else { "red" };
        write!(f, "{}::({:?},{:?})", color, self.key, self.value)
    }
}
