use core::fmt;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use log::trace;

/// Color of a tree node. Absent children are considered [`Black`].
///
/// [`Black`]: Color::Black
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Returns `true` if the color is [`Red`].
    ///
    /// [`Red`]: Color::Red
    #[must_use]
    pub fn is_red(&self) -> bool {
        matches!(self, Self::Red)
    }

    /// Returns `true` if the color is [`Black`].
    ///
    /// [`Black`]: Color::Black
    #[must_use]
    pub fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }
}

/// Copy of a single node as seen by [`RedBlackTree::preorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSnapshot<K, V> {
    pub key: K,
    pub value: V,
    pub color: Color,
}

pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) color: Color,
    pub(crate) parent: Option<RawNode<K, V>>,
    pub(crate) left: Option<RawNode<K, V>>,
    pub(crate) right: Option<RawNode<K, V>>,
}

impl<K, V> fmt::Debug for Node<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("Node");
        f.field("key", &self.key)
            .field("value", &self.value)
            .field("color", &self.color);

        let mut dbg_opt_node = |name: &str, node: &Option<RawNode<K, V>>| match node {
            Some(node) => {
                let node = unsafe { node.as_ref() };
                f.field(name, &(&node.key, &node.value, &node.color));
            }
            None => {
                f.field(name, &None::<K>);
            }
        };
        dbg_opt_node("parent", &self.parent);
        dbg_opt_node("left", &self.left);
        dbg_opt_node("right", &self.right);

        f.finish()
    }
}

/// Wrapper around `NonNull<Node<K, V>>` to provide convenient methods in order
/// to make the algorithms of RedBlackTree much more readable.
///
/// Every accessor is unsafe: the caller must guarantee that the node is still
/// owned by a live tree.
#[derive(Debug)]
#[repr(transparent)]
pub(crate) struct RawNode<K, V> {
    ptr: NonNull<Node<K, V>>,
}

impl<K, V> Clone for RawNode<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for RawNode<K, V> {}

impl<K, V> PartialEq for RawNode<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<K, V> Eq for RawNode<K, V> {}

impl<K, V> RawNode<K, V> {
    pub(crate) fn from_node(node: Node<K, V>) -> Self {
        Self {
            ptr: NonNull::from(Box::leak(Box::new(node))),
        }
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut Node<K, V> {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) unsafe fn as_ref<'a>(&self) -> &'a Node<K, V> {
        unsafe { self.ptr.as_ref() }
    }

    #[inline]
    pub(crate) unsafe fn as_mut<'a>(&mut self) -> &'a mut Node<K, V> {
        unsafe { self.ptr.as_mut() }
    }

    #[inline]
    pub(crate) unsafe fn key<'a>(&self) -> &'a K {
        unsafe { &(*self.as_ptr()).key }
    }

    #[inline]
    unsafe fn as_refs<'a>(&self) -> (&'a K, &'a V) {
        let ptr = self.as_ptr();
        unsafe { (&(*ptr).key, &(*ptr).value) }
    }

    #[inline]
    pub(crate) unsafe fn parent(&self) -> Option<RawNode<K, V>> {
        unsafe { (*self.as_ptr()).parent }
    }

    #[inline]
    pub(crate) unsafe fn set_parent(&mut self, new_parent: Option<RawNode<K, V>>) {
        unsafe {
            (*self.as_ptr()).parent = new_parent;
        }
    }

    #[inline]
    pub(crate) unsafe fn right(&self) -> Option<RawNode<K, V>> {
        unsafe { (*self.as_ptr()).right }
    }

    #[inline]
    pub(crate) unsafe fn set_right(&mut self, new_right: Option<RawNode<K, V>>) {
        unsafe {
            (*self.as_ptr()).right = new_right;
        }
    }

    #[inline]
    pub(crate) unsafe fn left(&self) -> Option<RawNode<K, V>> {
        unsafe { (*self.as_ptr()).left }
    }

    #[inline]
    pub(crate) unsafe fn set_left(&mut self, new_left: Option<RawNode<K, V>>) {
        unsafe {
            (*self.as_ptr()).left = new_left;
        }
    }

    #[inline]
    pub(crate) unsafe fn color(&self) -> Color {
        unsafe { (*self.as_ptr()).color }
    }

    #[inline]
    pub(crate) unsafe fn set_color(&mut self, new_color: Color) {
        unsafe { (*self.as_ptr()).color = new_color }
    }

    /// Which child slot of its parent this node occupies.
    #[inline]
    unsafe fn pos(&self) -> NodePos {
        match unsafe { self.parent() } {
            None => NodePos::Root,
            Some(parent) if unsafe { parent.left() } == Some(*self) => NodePos::Left,
            Some(_) => NodePos::Right,
        }
    }

    #[inline]
    unsafe fn grand_parent(&self) -> Option<RawNode<K, V>> {
        unsafe { self.parent().and_then(|p| p.parent()) }
    }
}

/// Color of a possibly absent node, absent nodes are black leaves.
#[inline]
pub(crate) fn color_of<K, V>(node: Option<RawNode<K, V>>) -> Color {
    node.map_or(Color::Black, |node| unsafe { node.color() })
}

#[inline]
unsafe fn set_color_of<K, V>(node: Option<RawNode<K, V>>, color: Color) {
    if let Some(mut node) = node {
        unsafe { node.set_color(color) };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodePos {
    Root,
    Left,
    Right,
}

/// An ordered map backed by a red-black tree.
///
/// Insert, lookup and remove run in `O(log n)` worst case. Keys are unique,
/// inserting an existing key replaces its value.
pub struct RedBlackTree<K, V> {
    // INVARIANTS:
    //  * `root` is `None` iff `len == 0`
    //  * every node reachable from `root` was allocated by `RawNode::from_node`
    //    and is owned by this tree only
    pub(crate) root: Option<RawNode<K, V>>,
    pub(crate) len: usize,
    marker: PhantomData<Box<Node<K, V>>>,
}

// Nodes are only reachable through the tree, so it is as thread safe as
// `Box<Node<K, V>>` would be.
unsafe impl<K: Send, V: Send> Send for RedBlackTree<K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for RedBlackTree<K, V> {}

impl<K, V> Drop for RedBlackTree<K, V> {
    fn drop(&mut self) {
        /// Keeps freeing the pending nodes if dropping a key or value panics.
        struct DropGuard<K, V>(Vec<RawNode<K, V>>);

        impl<K, V> Drop for DropGuard<K, V> {
            fn drop(&mut self) {
                while let Some(node) = self.0.pop() {
                    unsafe { free(node, &mut self.0) };
                }
            }
        }

        // Children are queued before the node itself is dropped.
        unsafe fn free<K, V>(node: RawNode<K, V>, pending: &mut Vec<RawNode<K, V>>) {
            pending.extend(unsafe { node.left() });
            pending.extend(unsafe { node.right() });
            let _: Box<Node<K, V>> = unsafe { Box::from_raw(node.as_ptr()) };
        }

        self.len = 0;
        if let Some(root) = self.root.take() {
            let mut guard = DropGuard(vec![root]);
            while let Some(node) = guard.0.pop() {
                unsafe { free(node, &mut guard.0) };
            }
        }
    }
}

impl<K, V> fmt::Debug for RedBlackTree<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct TreeDebug<'a, K, V> {
            root: RawNode<K, V>,
            marker: PhantomData<&'a Node<K, V>>,
        }

        impl<K, V> fmt::Debug for TreeDebug<'_, K, V>
        where
            K: fmt::Debug,
            V: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut f = f.debug_list();

                let mut func = |node: RawNode<K, V>| {
                    let node = unsafe { node.as_ref() };
                    f.entry(&node);
                };

                unsafe { RedBlackTree::inorder_for_each_core(self.root, &mut func) };
                f.finish()
            }
        }

        let mut f = f.debug_struct("RedBlackTree");
        f.field("len", &self.len);

        match self.root {
            None => {
                f.field("root", &None::<K>);
                let nodes: &[K] = &[];
                f.field("nodes", &nodes);
            }
            Some(root) => {
                f.field("root", &Some(unsafe { root.as_ref() }));
                f.field(
                    "nodes",
                    &TreeDebug {
                        root,
                        marker: PhantomData,
                    },
                );
            }
        }

        f.finish()
    }
}

impl<K, V> Default for RedBlackTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RedBlackTree<K, V> {
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            marker: PhantomData,
        }
    }

    /// Number of distinct keys in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Calls `f` on every entry in ascending key order.
    pub fn inorder_for_each<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V),
    {
        let Some(root) = self.root else {
            return;
        };

        let mut f = |mut node: RawNode<K, V>| {
            let node = unsafe { node.as_mut() };
            f(&node.key, &mut node.value)
        };
        unsafe { Self::inorder_for_each_core(root, &mut f) }
    }

    unsafe fn inorder_for_each_core<F>(node: RawNode<K, V>, f: &mut F)
    where
        F: FnMut(RawNode<K, V>),
    {
        if let Some(l) = unsafe { node.left() } {
            unsafe { Self::inorder_for_each_core(l, f) };
        }
        f(node);
        if let Some(r) = unsafe { node.right() } {
            unsafe { Self::inorder_for_each_core(r, f) };
        }
    }

    unsafe fn preorder_for_each_core<F>(node: RawNode<K, V>, f: &mut F)
    where
        F: FnMut(RawNode<K, V>),
    {
        f(node);
        if let Some(l) = unsafe { node.left() } {
            unsafe { Self::preorder_for_each_core(l, f) };
        }
        if let Some(r) = unsafe { node.right() } {
            unsafe { Self::preorder_for_each_core(r, f) };
        }
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut keys = Vec::with_capacity(self.len);
        if let Some(root) = self.root {
            let mut push = |node: RawNode<K, V>| keys.push(unsafe { node.key() }.clone());
            unsafe { Self::inorder_for_each_core(root, &mut push) };
        }
        keys
    }

    /// Copies of all nodes in pre-order, which exposes the shape of the tree.
    pub fn preorder(&self) -> Vec<NodeSnapshot<K, V>>
    where
        K: Clone,
        V: Clone,
    {
        let mut nodes = Vec::with_capacity(self.len);
        if let Some(root) = self.root {
            let mut push = |node: RawNode<K, V>| {
                let node = unsafe { node.as_ref() };
                nodes.push(NodeSnapshot {
                    key: node.key.clone(),
                    value: node.value.clone(),
                    color: node.color,
                });
            };
            unsafe { Self::preorder_for_each_core(root, &mut push) };
        }
        nodes
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).map(|node| unsafe { &node.as_ref().value })
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).map(|node| unsafe { node.as_refs() })
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key)
            .map(|mut node| unsafe { &mut node.as_mut().value })
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).is_some()
    }

    pub(crate) fn search<Q>(&self, key: &Q) -> Option<RawNode<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut x = self.root;
        while let Some(node) = x {
            match key.cmp(unsafe { node.key() }.borrow()) {
                Ordering::Less => x = unsafe { node.left() },
                Ordering::Equal => return Some(node),
                Ordering::Greater => x = unsafe { node.right() },
            }
        }

        None
    }

    pub fn min(&self) -> Option<(&K, &V)> {
        self.root
            .map(|root| unsafe { Self::min_of(root).as_refs() })
    }

    unsafe fn min_of(root: RawNode<K, V>) -> RawNode<K, V> {
        let mut x = root;
        while let Some(left) = unsafe { x.left() } {
            x = left;
        }

        x
    }

    pub fn max(&self) -> Option<(&K, &V)> {
        self.root
            .map(|root| unsafe { Self::max_of(root).as_refs() })
    }

    unsafe fn max_of(root: RawNode<K, V>) -> RawNode<K, V> {
        let mut x = root;
        while let Some(right) = unsafe { x.right() } {
            x = right;
        }

        x
    }

    /// The entry with the smallest key greater than `key`, if `key` is present.
    pub fn successor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.search(key)?;
        unsafe { Self::successor_core(node).map(|node| node.as_refs()) }
    }

    unsafe fn successor_core(mut node: RawNode<K, V>) -> Option<RawNode<K, V>> {
        //       +---------- 34 ---------+
        //       |                       |
        // +---- 2 ----+                 58 ----+
        // |           |                        |
        // 1      +--- 9 ----+              +-- 77 --+
        //        |          |              |        |
        //     +- 6       +- 20 -+      +- 71 -+     82
        //     |          |      |      |      |
        //     5         12 -+   24    67      75
        //                   |
        //                   13

        match unsafe { node.right() } {
            // 9 -> 12, 2 -> 5, 58 -> 67 ...
            // Everything in the right subtree is larger than node but smaller
            // than any larger ancestor.
            Some(right) => unsafe { Some(Self::min_of(right)) },
            None => {
                // 6 -> 9, 1 -> 2, 13 -> 20, 24 -> 34 ...
                // Move up until we leave a left subtree, that parent is the successor.
                let mut node_parent = unsafe { node.parent() };
                while let Some(parent) = node_parent {
                    if unsafe { parent.left() } == Some(node) {
                        break;
                    }
                    node = parent;
                    node_parent = unsafe { node.parent() };
                }

                node_parent
            }
        }
    }

    /// The entry with the largest key smaller than `key`, if `key` is present.
    pub fn predecessor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.search(key)?;
        unsafe { Self::predecessor_core(node).map(|node| node.as_refs()) }
    }

    unsafe fn predecessor_core(mut node: RawNode<K, V>) -> Option<RawNode<K, V>> {
        match unsafe { node.left() } {
            // 2 -> 1, 9 -> 6, 20 -> 13, 77 -> 75
            Some(left) => unsafe { Some(Self::max_of(left)) },
            None => {
                // 12 -> 9, 58 -> 34, 67 -> 58
                let mut node_parent = unsafe { node.parent() };
                while let Some(parent) = node_parent {
                    if unsafe { parent.right() } == Some(node) {
                        break;
                    }
                    node = parent;
                    node_parent = unsafe { node.parent() };
                }

                node_parent
            }
        }
    }

    fn rotate_left(&mut self, mut node: RawNode<K, V>) {
        //    p                       p
        //    |                       |
        // +-node-+               +-right-+
        // |      |      -->      |       |
        // a  +-right-+       +-node-+    c
        //    |       |       |      |
        //    b       c       a      b
        // where a, b, c can be any subtrees
        unsafe {
            if let Some(mut right) = node.right() {
                // attach b to node
                let b = right.left();
                node.set_right(b);
                if let Some(mut b) = b {
                    b.set_parent(Some(node));
                }

                // attach right to parent
                self.transplant(node, Some(right));

                // attach node to right
                right.set_left(Some(node));
                node.set_parent(Some(right));
            }
        }
    }

    fn rotate_right(&mut self, mut node: RawNode<K, V>) {
        //         p              p
        //         |              |
        //     +-node-+       +-left-+
        //     |      |       |      |
        // +-left-+   c  -->  a  +-node-+
        // |      |              |      |
        // a      b              b      c
        // where a, b, c can be any subtrees
        unsafe {
            if let Some(mut left) = node.left() {
                // attach b to node
                let b = left.right();
                node.set_left(b);
                if let Some(mut b) = b {
                    b.set_parent(Some(node));
                }

                // attach left to parent
                self.transplant(node, Some(left));

                // attach node to left
                left.set_right(Some(node));
                node.set_parent(Some(left));
            }
        }
    }

    /// Replaces subtree `old` with subtree `new`.
    ///
    /// Only the link between `old`'s parent and the subtree changes, children
    /// of `old` and `new` are left for the caller to fix up.
    unsafe fn transplant(&mut self, old: RawNode<K, V>, new: Option<RawNode<K, V>>) {
        // a) make the parent of `old` point to `new` instead of `old`,
        //    if `old` doesn't have a parent it was the root
        // b) make `new` point to the parent of `old`
        unsafe {
            let parent = old.parent();
            match (old.pos(), parent) {
                (NodePos::Left, Some(mut parent)) => parent.set_left(new),
                (NodePos::Right, Some(mut parent)) => parent.set_right(new),
                _ => self.root = new,
            }

            if let Some(mut new) = new {
                new.set_parent(parent);
            }
        }
    }

    /// Inserts `key` with `value`. If the key is already present its value is
    /// replaced and the old value is returned, the tree shape doesn't change.
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Ord,
    {
        // Move left/right down the tree until we find empty slot
        let mut parent = None;
        let mut goes_left = false;
        let mut x = self.root;
        while let Some(mut node) = x {
            parent = x;
            match key.cmp(unsafe { node.key() }) {
                Ordering::Less => {
                    goes_left = true;
                    x = unsafe { node.left() };
                }
                Ordering::Equal => {
                    let old = mem::replace(unsafe { &mut node.as_mut().value }, value);
                    return Some(old);
                }
                Ordering::Greater => {
                    goes_left = false;
                    x = unsafe { node.right() };
                }
            }
        }

        // new node is a leaf, it cannot have left or right subtrees
        let new_node = RawNode::from_node(Node {
            key,
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        });
        match parent {
            Some(mut parent) => unsafe {
                if goes_left {
                    parent.set_left(Some(new_node));
                } else {
                    parent.set_right(Some(new_node));
                }
            },
            None => self.root = Some(new_node),
        }

        self.insert_fixup(new_node);
        self.len += 1;
        None
    }

    fn insert_fixup(&mut self, mut node: RawNode<K, V>) {
        unsafe {
            // There is at most one violation at a time: `node` and its parent
            // are both red. The recolor case moves it two levels up, the
            // rotation case removes it.
            while let Some(mut parent) = node.parent() {
                if parent.color().is_black() {
                    break;
                }
                debug_assert!(node.color().is_red());

                // grand parent must exist because parent is red and
                // thus not root as root is always black
                let mut grand_parent = node
                    .grand_parent()
                    .expect("red parent cannot be the root");
                debug_assert!(grand_parent.color().is_black());

                match parent.pos() {
                    NodePos::Root => unreachable!("red parent cannot be the root"),
                    NodePos::Left => {
                        let uncle = grand_parent.right();
                        if color_of(uncle).is_red() {
                            //     +--- gp:b ---+               +--- gp:r ---+
                            //     |            |               |            |
                            //  + p:r +      + u:r +   -->   + p:b +      + u:b +
                            //  |     |      |     |         |     |      |     |
                            // n:r   a:b    b:b   c:b       n:r   a:b    b:b   c:b
                            //
                            // Black height is unchanged but gp may now have a red parent.
                            trace!("insert fixup: red uncle, recolor");
                            parent.set_color(Color::Black);
                            set_color_of(uncle, Color::Black);
                            grand_parent.set_color(Color::Red);
                            node = grand_parent;
                        } else {
                            if node.pos() == NodePos::Right {
                                //       +-- gp:b --+                 +-- gp:b --+
                                //       |          |                 |          |
                                //  +-- p:r --+    u:b  -->       +- n:r --+    u:b
                                //  |         |                   |        |
                                // a:b    +- n:r -+           +- p:r -+   c:b
                                //        |       |           |       |
                                //       b:b     c:b         a:b     b:b
                                trace!("insert fixup: inner grandchild, rotate left");
                                self.rotate_left(parent);
                                mem::swap(&mut parent, &mut node);
                            }

                            //           +-- gp:b --+            +----- p:b -----+
                            //           |          |            |               |
                            //      +-- p:r --+    u:b  -->   +- n:r -+     +- gp:r -+
                            //      |         |               |       |     |        |
                            //  +- n:r -+    c:b             a:b     b:b   c:b      u:b
                            //  |       |
                            // a:b     b:b
                            trace!("insert fixup: outer grandchild, rotate right");
                            parent.set_color(Color::Black);
                            grand_parent.set_color(Color::Red);
                            self.rotate_right(grand_parent);
                        }
                    }
                    NodePos::Right => {
                        // same as Left branch but left/right are switched
                        let uncle = grand_parent.left();
                        if color_of(uncle).is_red() {
                            trace!("insert fixup: red uncle, recolor");
                            parent.set_color(Color::Black);
                            set_color_of(uncle, Color::Black);
                            grand_parent.set_color(Color::Red);
                            node = grand_parent;
                        } else {
                            if node.pos() == NodePos::Left {
                                trace!("insert fixup: inner grandchild, rotate right");
                                self.rotate_right(parent);
                                mem::swap(&mut parent, &mut node);
                            }

                            trace!("insert fixup: outer grandchild, rotate left");
                            parent.set_color(Color::Black);
                            grand_parent.set_color(Color::Red);
                            self.rotate_left(grand_parent);
                        }
                    }
                }
            }

            set_color_of(self.root, Color::Black);
        }
    }

    /// Removes `key` and returns the removed entry, or `None` if the key was
    /// not present (in which case the tree is left untouched).
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).map(|node| self.remove_node(node))
    }

    fn remove_node(&mut self, mut target: RawNode<K, V>) -> (K, V) {
        //       ┌────────── 34 ─────────┐
        //       │                       │
        // ┌──── 2 ────┐                 58 ────┐
        // │           │                        │
        // 1      ┌─── 9 ────┐              ┌── 77 ──┐
        //        │          │              │        │
        //     ┌─ 6       ┌─ 20 ─┐      ┌─ 71 ─┐     82
        //     │          │      │      │      │
        //     5         12 ─┐   24    67      75
        //                   │
        //                   13
        //
        // Removing 1, 6, 12 or 58 splices the node itself out. Removing 9
        // splices out its successor 12 instead and moves 12's entry into 9's node.
        unsafe {
            let mut spliced = match (target.left(), target.right()) {
                (Some(_), Some(right)) => Self::min_of(right),
                _ => target,
            };
            // spliced has at most one child
            let replacement = spliced.left().or(spliced.right());
            let replacement_parent = spliced.parent();
            self.transplant(spliced, replacement);

            if spliced != target {
                // Swapping instead of copying hands the removed entry back
                // through the node that is about to be freed.
                let (target, spliced) = (target.as_mut(), spliced.as_mut());
                mem::swap(&mut target.key, &mut spliced.key);
                mem::swap(&mut target.value, &mut spliced.value);
            }

            if spliced.color().is_black() {
                self.delete_fixup(replacement, replacement_parent);
            }

            self.len -= 1;
            let node = Box::from_raw(spliced.as_ptr());
            (node.key, node.value)
        }
    }

    /// Restores the black height after a black node was spliced out above `node`.
    ///
    /// `node` may be absent, so its parent is tracked separately.
    fn delete_fixup(&mut self, mut node: Option<RawNode<K, V>>, mut parent: Option<RawNode<K, V>>) {
        // Every path through `node` is missing one black node. If `node` is
        // red, coloring it black after the loop fixes that. Otherwise the
        // deficit is pushed up or resolved by rotations.
        unsafe {
            while node != self.root && color_of(node).is_black() {
                let mut x_parent = parent.expect("non-root position has a parent");

                // The sibling can't be absent: the black height through it is
                // at least one larger than through `node`.
                if node == x_parent.left() {
                    let mut sibling = x_parent.right().expect("deficit side has a sibling");

                    if sibling.color().is_red() {
                        //     ┌─── p:b ───┐                    ┌─── s:b ───┐
                        //     │           │                    │           │
                        // ┌─ x:b ─┐   ┌─ s:r ─┐   ──►      ┌─ p:r ─┐      d:b
                        // │       │   │       │            │       │
                        // a       b  c:b     d:b       ┌─ x:b ─┐  c:b
                        //                              │       │
                        //                              a       b
                        trace!("delete fixup: case 1 (red sibling)");
                        sibling.set_color(Color::Black);
                        x_parent.set_color(Color::Red);
                        self.rotate_left(x_parent);
                        sibling = x_parent.right().expect("deficit side has a sibling");
                    }

                    if color_of(sibling.left()).is_black() && color_of(sibling.right()).is_black() {
                        //     ┌─── p:c ───┐                ┌─── p:c ───┐
                        //     │           │                │           │
                        // ┌─ x:b ─┐   ┌─ s:b ─┐   ──►  ┌─ x:b ─┐   ┌─ s:r ─┐
                        // │       │   │       │        │       │   │       │
                        // a       b  c:b     d:b       a       b  c:b     d:b
                        trace!("delete fixup: case 2 (black nephews)");
                        sibling.set_color(Color::Red);
                        node = Some(x_parent);
                        parent = x_parent.parent();
                    } else {
                        if color_of(sibling.right()).is_black() {
                            //    ┌───── p:c ─────┐                ┌─── p:c ───┐
                            //    │               │                │           │
                            // ┌─ x:b ─┐      ┌─ s:b ─┐   ──►  ┌─ x:b ─┐   ┌─ c:b ─┐
                            // │       │      │       │        │       │   │       │
                            // a       b  ┌─ c:r ─┐  d:b       a       b   e   ┌─ s:r ─┐
                            //            │       │                            │       │
                            //            e       f                            f      d:b
                            trace!("delete fixup: case 3 (red near nephew)");
                            set_color_of(sibling.left(), Color::Black);
                            sibling.set_color(Color::Red);
                            self.rotate_right(sibling);
                            sibling = x_parent.right().expect("deficit side has a sibling");
                        }

                        //     ┌─── p:c ───┐                     ┌── s:c ──┐
                        //     │           │                     │         │
                        // ┌─ x:b ─┐   ┌─ s:b ─┐   ──►       ┌─ p:b ─┐    d:b
                        // │       │   │       │           │       │
                        // a       b  c:c     d:r     ┌─ x:b ─┐   c:c
                        //                            │       │
                        //                            a       b
                        trace!("delete fixup: case 4 (red far nephew)");
                        sibling.set_color(x_parent.color());
                        x_parent.set_color(Color::Black);
                        set_color_of(sibling.right(), Color::Black);
                        self.rotate_left(x_parent);
                        node = self.root;
                        parent = None;
                    }
                } else {
                    // same as above but left/right are switched
                    let mut sibling = x_parent.left().expect("deficit side has a sibling");

                    if sibling.color().is_red() {
                        trace!("delete fixup: case 1 (red sibling)");
                        sibling.set_color(Color::Black);
                        x_parent.set_color(Color::Red);
                        self.rotate_right(x_parent);
                        sibling = x_parent.left().expect("deficit side has a sibling");
                    }

                    if color_of(sibling.left()).is_black() && color_of(sibling.right()).is_black() {
                        trace!("delete fixup: case 2 (black nephews)");
                        sibling.set_color(Color::Red);
                        node = Some(x_parent);
                        parent = x_parent.parent();
                    } else {
                        if color_of(sibling.left()).is_black() {
                            trace!("delete fixup: case 3 (red near nephew)");
                            set_color_of(sibling.right(), Color::Black);
                            sibling.set_color(Color::Red);
                            self.rotate_left(sibling);
                            sibling = x_parent.left().expect("deficit side has a sibling");
                        }

                        trace!("delete fixup: case 4 (red far nephew)");
                        sibling.set_color(x_parent.color());
                        x_parent.set_color(Color::Black);
                        set_color_of(sibling.left(), Color::Black);
                        self.rotate_right(x_parent);
                        node = self.root;
                        parent = None;
                    }
                }
            }

            set_color_of(node, Color::Black);
        }
    }
}
