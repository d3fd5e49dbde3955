use std::{borrow::Borrow, cmp::Ordering, fmt, marker::PhantomData, mem, ptr::NonNull};

use crate::cursor::find_node;
use crate::map::OrderedMap;
use crate::node::{self, Node, NodeLink, NodePtr};

/// Bst is the unbalanced ordered map. It shares the node shape with
/// [`Llrb`] and all read operations through [`OrderedMap`], but insert
/// and erase are plain iterative binary-search-tree operations that
/// never look at, or repair, node colors.
///
/// Height is whatever the insertion order makes it, a sorted load
/// degenerates into a list.
///
/// [`Llrb`]: crate::Llrb
pub struct Bst<K, V> {
    name: String,
    root: NodePtr<K, V>,
    n_count: usize,
    marker: PhantomData<Box<Node<K, V>>>,
}

impl<K, V> Bst<K, V>
where
    K: Ord,
{
    /// Create an empty instance of Bst, identified by `name`.
    pub fn new<S>(name: S) -> Bst<K, V>
    where
        S: AsRef<str>,
    {
        Bst {
            name: name.as_ref().to_string(),
            root: Default::default(),
            n_count: Default::default(),
            marker: PhantomData,
        }
    }

    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Set value for key, return the old value if key was present. New
    /// nodes hang off the last node visited, nothing is rebalanced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut parent: Option<(NonNull<Node<K, V>>, Ordering)> = None;
        let mut link = self.root;
        while let Some(node) = link {
            // SAFETY: the tree is exclusively borrowed.
            let cmp = unsafe { node::key(node) }.cmp(&key);
            link = match cmp {
                Ordering::Greater => node.left(),
                Ordering::Less => node.right(),
                Ordering::Equal => {
                    return Some(mem::replace(unsafe { node::value_mut(node) }, value));
                }
            };
            parent = Some((node, cmp));
        }

        let node = Some(Node::alloc(key, value, false /*black*/));
        match parent {
            None => self.root = node,
            Some((parent, Ordering::Greater)) => parent.set_left(node),
            Some((parent, _)) => parent.set_right(node),
        }
        self.n_count += 1;
        None
    }

    /// Remove key and return its value, no-op if key is missing. A node
    /// with two children takes over its in-order successor's entry and
    /// the successor is unlinked instead.
    pub fn erase<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = find_node(self.root, key)?;

        let victim = match (node.left(), node.right()) {
            (Some(_), Some(right)) => {
                let succ = node::leftmost(right);
                // SAFETY: succ sits under node, they are distinct.
                unsafe { node::swap_entry(node, succ) };
                succ
            }
            _ => node,
        };

        // victim has at most one child, splice it in.
        let child = victim.left().or_else(|| victim.right());
        self.replace_child(victim, child);
        // SAFETY: no link leads to victim after the splice.
        let (_, value) = unsafe { Node::free(victim) };
        self.n_count -= 1;
        Some(value)
    }

    // hang `child` where `node` hangs today.
    fn replace_child(&mut self, node: NonNull<Node<K, V>>, child: NodePtr<K, V>) {
        match node.parent() {
            None => {
                if let Some(child) = child {
                    child.set_parent(None);
                }
                self.root = child;
            }
            Some(parent) if parent.left() == Some(node) => parent.set_left(child),
            Some(parent) => parent.set_right(child),
        }
    }
}

impl<K, V> Bst<K, V> {
    /// Remove all entries.
    pub fn clear(&mut self) {
        // SAFETY: root is detached from self before it is freed.
        unsafe { node::teardown(self.root.take()) };
        self.n_count = 0;
    }

    /// Move all entries into a new instance with the same name, leaving
    /// this instance empty.
    pub fn take(&mut self) -> Bst<K, V> {
        Bst {
            name: self.name.clone(),
            root: self.root.take(),
            n_count: mem::replace(&mut self.n_count, 0),
            marker: PhantomData,
        }
    }
}

impl<K, V> OrderedMap<K, V> for Bst<K, V>
where
    K: Ord,
{
    fn root_ptr(&self) -> Option<NonNull<Node<K, V>>> {
        self.root
    }

    fn len(&self) -> usize {
        self.n_count
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        Bst::insert(self, key, value)
    }

    fn erase<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Bst::erase(self, key)
    }
}

impl<K, V> Clone for Bst<K, V>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Bst<K, V> {
        Bst {
            name: self.name.clone(),
            root: self.root.map(node::deep_clone),
            n_count: self.n_count,
            marker: PhantomData,
        }
    }
}

impl<K, V> Drop for Bst<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V> fmt::Debug for Bst<K, V>
where
    K: Ord + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
