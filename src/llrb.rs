use std::{
    borrow::Borrow,
    cmp::Ordering,
    fmt,
    marker::PhantomData,
    mem,
    ops::Index,
    ptr::NonNull,
};

use rand::Rng;

use crate::cursor::find_node;
use crate::depth::Depth;
use crate::error::Error;
use crate::map::OrderedMap;
use crate::node::{self, is_red, Node, NodeLink, NodePtr};

/// Llrb is a balanced in-memory ordered map, kept in shape by the
/// 2-3 variant of the [left leaning red black][wiki] rules.
///
/// Every node carries a back-link to its parent, so cursors and
/// iterators walk the tree in-order without an explicit stack. Read
/// operations are provided through the [`OrderedMap`] trait.
///
/// [wiki]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree
pub struct Llrb<K, V> {
    name: String,
    root: NodePtr<K, V>,
    n_count: usize, // live entries
    marker: PhantomData<Box<Node<K, V>>>,
}

/// Constructors.
impl<K, V> Llrb<K, V>
where
    K: Ord,
{
    /// Empty map, `name` shows up in log lines.
    pub fn new<S>(name: S) -> Llrb<K, V>
    where
        S: AsRef<str>,
    {
        Llrb {
            name: name.as_ref().to_string(),
            root: Default::default(),
            n_count: Default::default(),
            marker: PhantomData,
        }
    }

    /// Build a map from (key, value) pairs. Keys must be unique, the
    /// first repeated key aborts the load with [`Error::OverwriteKey`].
    pub fn load_from<S, I>(name: S, iter: I) -> Result<Llrb<K, V>, Error<K>>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut llrb = Llrb::new(name);
        for (key, value) in iter {
            llrb.create(key, value)?;
        }
        log::debug!("{}: loaded {} entries", llrb.name, llrb.n_count);
        Ok(llrb)
    }
}

/// Maintenance API.
impl<K, V> Llrb<K, V> {
    /// Name given to [`Llrb::new`].
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

    /// Cheap statistics: entry count and node size. Use
    /// [`Llrb::validate`] for black height and depth figures.
    pub fn stats(&self) -> Stats {
        Stats::new(self.n_count, mem::size_of::<Node<K, V>>())
    }

    /// Move all entries into a new instance with the same name, leaving
    /// this instance empty.
    pub fn take(&mut self) -> Llrb<K, V> {
        Llrb {
            name: self.name.clone(),
            root: self.root.take(),
            n_count: mem::replace(&mut self.n_count, 0),
            marker: PhantomData,
        }
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        // SAFETY: root is detached from self before it is freed.
        unsafe { node::teardown(self.root.take()) };
        self.n_count = 0;
    }

    // before a delete walks down from root: if both children are black
    // turn root red, so that there is a red link to borrow from.
    fn prepare_delete(&mut self) {
        if let Some(root) = self.root {
            if !is_red(root.left()) && !is_red(root.right()) {
                root.set_black(false);
            }
        }
    }

    // root is always black and never has a parent.
    fn set_root(&mut self, root: NodePtr<K, V>) {
        if let Some(root) = root {
            root.set_black(true);
            root.set_parent(None);
        }
        self.root = root;
    }
}

type Upsert<K, V> = (NonNull<Node<K, V>>, Option<V>);

type Delete<K, V> = (NodePtr<K, V>, Option<V>);

type Delmin<K, V> = (NodePtr<K, V>, NodePtr<K, V>);

/// Mutations.
impl<K, V> Llrb<K, V>
where
    K: Ord,
{
    /// Insert only when `key` is absent, fails with
    /// [`Error::OverwriteKey`] otherwise and leaves the map as is.
    pub fn create(&mut self, key: K, value: V) -> Result<(), Error<K>> {
        if find_node(self.root, &key).is_some() {
            return Err(Error::OverwriteKey);
        }
        self.insert(key, value);
        Ok(())
    }

    /// Upsert. A present key keeps its node and gets the new value, the
    /// old value is handed back.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (root, old_value) = Llrb::upsert(self.root, key, value);
        self.set_root(Some(root));
        if old_value.is_none() {
            self.n_count += 1;
        }
        old_value
    }

    /// Remove `key` and hand back its value. A missing key, including
    /// on an empty map, returns `None` without touching a single link.
    pub fn erase<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        find_node(self.root, key)?;

        self.prepare_delete();
        let (root, old_value) = Llrb::do_delete(self.root, key);
        self.set_root(root);
        if old_value.is_some() {
            self.n_count -= 1;
        }
        old_value
    }

    /// Remove and return the entry with smallest key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.prepare_delete();
        let (root, old_node) = Llrb::delete_min(self.root);
        self.set_root(root);
        old_node.map(|node| {
            self.n_count -= 1;
            // SAFETY: delete_min unlinked the node.
            unsafe { Node::free(node) }
        })
    }

    /// Remove and return the entry with largest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.prepare_delete();
        let (root, old_node) = Llrb::delete_max(self.root);
        self.set_root(root);
        old_node.map(|node| {
            self.n_count -= 1;
            unsafe { Node::free(node) }
        })
    }

    /// Walk the whole tree and check:
    ///
    /// * no red node has a red child, and red links lean left only.
    /// * the root is black.
    /// * every path from root to an empty link crosses the same number
    ///   of black nodes.
    /// * keys ascend in-order.
    /// * parent back-links match ownership, and the count matches len().
    ///
    /// On success the returned [`Stats`] carries black height and leaf
    /// depths.
    pub fn validate(&self) -> Result<Stats, Error<K>>
    where
        K: Clone + fmt::Debug,
    {
        match self.do_validate() {
            Ok(stats) => {
                log::debug!("{}: validated {} entries", self.name, stats.entries);
                Ok(stats)
            }
            Err(err) => {
                log::error!("{}: validate failed, {}", self.name, err);
                Err(err)
            }
        }
    }

    fn do_validate(&self) -> Result<Stats, Error<K>>
    where
        K: Clone,
    {
        if is_red(self.root) {
            return Err(Error::RedRoot);
        }
        let mut stats = Stats::new(self.n_count, mem::size_of::<Node<K, V>>());
        stats.set_depths(Depth::new());
        let mut count = 0;
        let blacks = Llrb::validate_tree(self.root, None, false, 0, 0, &mut count, &mut stats)?;
        if count != self.n_count {
            return Err(Error::CountMismatch(count, self.n_count));
        }
        stats.set_blacks(blacks);
        Ok(stats)
    }
}

/// Sampling.
impl<K, V> Llrb<K, V>
where
    K: Ord,
{
    /// Pick an entry by a random walk from root, stopping at a random
    /// depth or at the first missing child.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<(&K, &V)> {
        let mut nref = self.root?;

        let mut at_depth = rng.gen_range(0, 40);
        loop {
            let next = if rng.gen::<bool>() {
                nref.left()
            } else {
                nref.right()
            };
            match next {
                Some(next) if at_depth > 0 => {
                    at_depth -= 1;
                    nref = next;
                }
                // SAFETY: the entry lives as long as the borrow on self.
                _ => break Some(unsafe { (node::key(nref), node::value(nref)) }),
            }
        }
    }
}

impl<K, V> Llrb<K, V>
where
    K: Ord,
{
    fn upsert(node: NodePtr<K, V>, key: K, value: V) -> Upsert<K, V> {
        let node = match node {
            None => return (Node::alloc(key, value, false /*black*/), None),
            Some(node) => node,
        };

        // SAFETY: every handle below is owned by the tree, which is
        // exclusively borrowed by the calling write operation.
        match unsafe { node::key(node) }.cmp(&key) {
            Ordering::Greater => {
                let (left, old_value) = Llrb::upsert(node.left(), key, value);
                node.set_left(Some(left));
                (Llrb::walkuprot_23(node), old_value)
            }
            Ordering::Less => {
                let (right, old_value) = Llrb::upsert(node.right(), key, value);
                node.set_right(Some(right));
                (Llrb::walkuprot_23(node), old_value)
            }
            Ordering::Equal => {
                let old_value = mem::replace(unsafe { node::value_mut(node) }, value);
                (Llrb::walkuprot_23(node), Some(old_value))
            }
        }
    }

    fn do_delete<Q>(node: NodePtr<K, V>, key: &Q) -> Delete<K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = match node {
            None => return (None, None),
            Some(node) => node,
        };

        if unsafe { node::key(node) }.borrow().gt(key) {
            if node.left().is_none() {
                return (Some(node), None);
            }
            let left = node.left();
            if !is_red(left) && !is_red(left.and_then(NodeLink::left)) {
                node = Llrb::move_red_left(node);
            }
            let (left, old_value) = Llrb::do_delete(node.left(), key);
            node.set_left(left);
            (Some(Llrb::fixup(node)), old_value)
        } else {
            if is_red(node.left()) {
                node = Llrb::rotate_right(node);
            }

            if !unsafe { node::key(node) }.borrow().lt(key) && node.right().is_none() {
                let left = node.left();
                // SAFETY: the caller relinks `left` in place of node.
                let (_, value) = unsafe { Node::free(node) };
                return (left, Some(value));
            }

            let right = node.right();
            let ok = right.is_some() && !is_red(right);
            if ok && !is_red(right.and_then(NodeLink::left)) {
                node = Llrb::move_red_right(node);
            }

            if !unsafe { node::key(node) }.borrow().lt(key) {
                // node == key, pull up the successor into this node.
                let (right, res_node) = Llrb::delete_min(node.right());
                node.set_right(right);
                let subdel = match res_node {
                    Some(subdel) => subdel,
                    None => panic!("do_delete(): fatal logic, call the programmer"),
                };
                // SAFETY: subdel is unlinked, node stays in the tree.
                let (_, value) = unsafe {
                    node::swap_entry(node, subdel);
                    Node::free(subdel)
                };
                (Some(Llrb::fixup(node)), Some(value))
            } else {
                let (right, old_value) = Llrb::do_delete(node.right(), key);
                node.set_right(right);
                (Some(Llrb::fixup(node)), old_value)
            }
        }
    }

    // unlink the smallest node under `node`, return the new subtree root
    // and the unlinked node.
    fn delete_min(node: NodePtr<K, V>) -> Delmin<K, V> {
        let mut node = match node {
            None => return (None, None),
            Some(node) => node,
        };
        if node.left().is_none() {
            return (node.take_right(), Some(node));
        }
        let left = node.left();
        if !is_red(left) && !is_red(left.and_then(NodeLink::left)) {
            node = Llrb::move_red_left(node);
        }
        let (left, old_node) = Llrb::delete_min(node.left());
        node.set_left(left);
        (Some(Llrb::fixup(node)), old_node)
    }

    fn delete_max(node: NodePtr<K, V>) -> Delmin<K, V> {
        let mut node = match node {
            None => return (None, None),
            Some(node) => node,
        };
        if is_red(node.left()) {
            node = Llrb::rotate_right(node);
        }
        if node.right().is_none() {
            return (node.take_left(), Some(node));
        }
        let right = node.right();
        if !is_red(right) && !is_red(right.and_then(NodeLink::left)) {
            node = Llrb::move_red_right(node);
        }
        let (right, old_node) = Llrb::delete_max(node.right());
        node.set_right(right);
        (Some(Llrb::fixup(node)), old_node)
    }

    fn validate_tree(
        node: NodePtr<K, V>,
        parent: NodePtr<K, V>,
        fromred: bool,
        mut nb: usize,
        depth: usize,
        count: &mut usize,
        stats: &mut Stats,
    ) -> Result<usize, Error<K>>
    where
        K: Clone,
    {
        let node = match node {
            None => return Ok(nb),
            Some(node) => node,
        };
        *count += 1;
        // SAFETY: validate() holds a borrow on the tree.
        let key = unsafe { node::key(node) };

        if node.parent() != parent {
            return Err(Error::BrokenParent(key.clone()));
        }

        let red = !node.is_black();
        if fromred && red {
            return Err(Error::ConsecutiveReds);
        }
        if is_red(node.right()) {
            return Err(Error::RightRed);
        }
        if !red {
            nb += 1;
        }
        let (left, right) = (node.left(), node.right());
        if left.is_none() && right.is_none() {
            if let Some(depths) = stats.depths.as_mut() {
                depths.sample(depth);
            }
        }
        let lblacks = Llrb::validate_tree(left, Some(node), red, nb, depth + 1, count, stats)?;
        let rblacks = Llrb::validate_tree(right, Some(node), red, nb, depth + 1, count, stats)?;
        if lblacks != rblacks {
            let msg = format!("at depth {}, {} vs {}", depth, lblacks, rblacks);
            return Err(Error::UnbalancedBlacks(msg));
        }
        let lkey = left.map(|n| unsafe { node::key(n) });
        let rkey = right.map(|n| unsafe { node::key(n) });
        match (lkey, rkey) {
            (Some(child), _) if child >= key => Err(Error::SortError(child.clone(), key.clone())),
            (_, Some(child)) if child <= key => Err(Error::SortError(child.clone(), key.clone())),
            _ => Ok(lblacks),
        }
    }

    // 2-3 tree maintenance.

    // lean right-leaning reds left, split a 4-node, on the way up.
    fn walkuprot_23(mut node: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
        if is_red(node.right()) && !is_red(node.left()) {
            node = Llrb::rotate_left(node);
        }
        let left = node.left();
        if is_red(left) && is_red(left.and_then(NodeLink::left)) {
            node = Llrb::rotate_right(node);
        }
        if is_red(node.left()) && is_red(node.right()) {
            Llrb::flip(node)
        }
        node
    }

    //     node                x
    //    /    \\             //   \
    //   a      x     =>    node   c
    //         / \          /  \
    //        b   c        a    b
    //
    // x takes over node's parent and color, node turns red under x and
    // b moves across to node.
    fn rotate_left(node: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
        let x = match node.right() {
            Some(x) if !x.is_black() => x,
            _ => panic!("rotateleft(): rotating a black link ? Call the programmer"),
        };
        let parent = node.parent();
        node.set_right(x.left());
        x.set_black(node.is_black());
        node.set_black(false);
        x.set_left(Some(node));
        x.set_parent(parent);
        x
    }

    //       node            x
    //      //   \          /  \\
    //     x      c   =>   a    node
    //    / \                   /  \
    //   a   b                 b    c
    //
    fn rotate_right(node: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
        let x = match node.left() {
            Some(x) if !x.is_black() => x,
            _ => panic!("rotateright(): rotating a black link ? Call the programmer"),
        };
        let parent = node.parent();
        node.set_left(x.right());
        x.set_black(node.is_black());
        node.set_black(false);
        x.set_right(Some(node));
        x.set_parent(parent);
        x
    }

    // invert the color of node and of both its children. Applied to a
    // black node with two red children it splits a 4-node, applied in
    // reverse it borrows a red link from the parent.
    fn flip(node: NonNull<Node<K, V>>) {
        if let Some(left) = node.left() {
            left.toggle_link();
        }
        if let Some(right) = node.right() {
            right.toggle_link();
        }
        node.toggle_link();
    }

    fn fixup(mut node: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
        if is_red(node.right()) {
            node = Llrb::rotate_left(node);
        }
        let left = node.left();
        if is_red(left) && is_red(left.and_then(NodeLink::left)) {
            node = Llrb::rotate_right(node);
        }
        if is_red(node.left()) && is_red(node.right()) {
            Llrb::flip(node);
        }
        node
    }

    fn move_red_left(mut node: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
        Llrb::flip(node);
        if is_red(node.right().and_then(NodeLink::left)) {
            let right = node.right().map(Llrb::rotate_right);
            node.set_right(right);
            node = Llrb::rotate_left(node);
            Llrb::flip(node);
        }
        node
    }

    fn move_red_right(mut node: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
        Llrb::flip(node);
        if is_red(node.left().and_then(NodeLink::left)) {
            node = Llrb::rotate_right(node);
            Llrb::flip(node);
        }
        node
    }
}

impl<K, V> OrderedMap<K, V> for Llrb<K, V>
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
        Llrb::insert(self, key, value)
    }

    fn erase<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Llrb::erase(self, key)
    }
}

impl<K, V> Clone for Llrb<K, V>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Llrb<K, V> {
        Llrb {
            name: self.name.clone(),
            root: self.root.map(node::deep_clone),
            n_count: self.n_count,
            marker: PhantomData,
        }
    }

    // copy and swap, the old tree is released only after the copy
    // is complete.
    fn clone_from(&mut self, source: &Llrb<K, V>) {
        let mut other = source.clone();
        mem::swap(self, &mut other);
    }
}

impl<K, V> Drop for Llrb<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V> Extend<(K, V)> for Llrb<K, V>
where
    K: Ord,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a Llrb<K, V>
where
    K: Ord,
{
    type Item = (&'a K, &'a V);
    type IntoIter = crate::iter::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, Q: ?Sized, V> Index<&Q> for Llrb<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the `Llrb`.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("no entry found for key"),
        }
    }
}

impl<K, V> PartialEq for Llrb<K, V>
where
    K: Ord,
    V: PartialEq,
{
    fn eq(&self, other: &Llrb<K, V>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V> fmt::Debug for Llrb<K, V>
where
    K: Ord + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Figures on an [`Llrb`] instance. [`Llrb::stats`] fills only the
/// entry count and node size, [`Llrb::validate`] fills everything.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize,
    node_size: usize,
    blacks: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            blacks: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_blacks(&mut self, blacks: usize) {
        self.blacks = Some(blacks)
    }

    #[inline]
    fn set_depths(&mut self, depths: Depth) {
        self.depths = Some(depths)
    }

    /// Entries in the map when the figures were taken.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Bytes per node: key, value, color and the three links. The link
    /// overhead is fixed, the rest follows `K` and `V`:
    ///
    /// ```
    /// use llrb_map::Llrb;
    /// let llrb: Llrb<u64,i128> = Llrb::new("myinstance");
    ///
    /// // key, value, color and three links.
    /// assert!(llrb.stats().node_size() >= 8 + 16 + 1 + 24);
    /// ```
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Black nodes on any path from root to an empty link, set by
    /// [`Llrb::validate`].
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Leaf depth histogram, `None` for an empty map or cheap stats.
    pub fn depths(&self) -> Option<Depth> {
        match &self.depths {
            Some(depths) if depths.samples() > 0 => Some(depths.clone()),
            _ => None,
        }
    }
}
