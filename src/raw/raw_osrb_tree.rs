use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::fmt::Write;

use alloc::string::String;
use alloc::vec::Vec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Node};
use super::size::Size;

/// The core red-black tree implementation backing `OSRBTreeMap`.
///
/// All structural invariants hold whenever control returns to a caller:
/// binary-search order (non-strict across equal keys in multiset mode),
/// red-black coloring, and per-node subtree sizes. No intermediate fixup
/// state is ever observable.
#[derive(Clone)]
pub(crate) struct RawOSRBTree<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node; `Handle::NIL` when the tree is empty.
    root: Handle,
    /// Whether an equal key overwrites in place (`true`) or accumulates as a
    /// distinct entry (`false`). Fixed at construction.
    unique_keys: bool,
    /// The sentinel's parent slot. Deletion fixup walks upward from a
    /// spliced-out position even when the splice child is the sentinel, so
    /// this is the one sentinel property that is ever written. The
    /// sentinel's color (black) and size (zero) are constants served by the
    /// guarded accessors below.
    nil_parent: Handle,
}

impl<K, V> RawOSRBTree<K, V> {
    /// Creates a new, empty tree. Does not allocate.
    pub(crate) const fn new(unique_keys: bool) -> Self {
        Self {
            nodes: Arena::new(),
            root: Handle::NIL,
            unique_keys,
            nil_parent: Handle::NIL,
        }
    }

    /// Creates a new tree with room for `capacity` entries.
    pub(crate) fn with_capacity(unique_keys: bool, capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: Handle::NIL,
            unique_keys,
            nil_parent: Handle::NIL,
        }
    }

    /// Returns the number of stored entries (counting duplicates).
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree contains no entries.
    pub(crate) const fn is_empty(&self) -> bool {
        self.root.is_nil()
    }

    /// Returns the capacity of the backing arena.
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Returns true if equal keys overwrite instead of accumulating.
    pub(crate) const fn unique_keys(&self) -> bool {
        self.unique_keys
    }

    /// Removes all entries. A no-op on an empty tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = Handle::NIL;
        self.nil_parent = Handle::NIL;
    }

    /// Returns the entry stored at `handle`.
    pub(crate) fn entry_at(&self, handle: Handle) -> (&K, Option<&V>) {
        let node = self.nodes.get(handle);
        (node.key(), node.value())
    }

    /// Returns the entry at `handle` with a mutable payload reference.
    pub(crate) fn entry_mut_at(&mut self, handle: Handle) -> (&K, Option<&mut V>) {
        self.nodes.get_mut(handle).entry_mut()
    }

    /// Borrows the payload slot stored at `handle`.
    pub(crate) fn payload_at(&self, handle: Handle) -> &Option<V> {
        self.nodes.get(handle).payload()
    }

    /// Mutably borrows the payload slot stored at `handle`.
    pub(crate) fn payload_mut_at(&mut self, handle: Handle) -> &mut Option<V> {
        self.nodes.get_mut(handle).payload_mut()
    }

    // ─── Sentinel-aware field accessors ──────────────────────────────────

    #[inline]
    fn color(&self, handle: Handle) -> Color {
        if handle.is_nil() {
            Color::Black
        } else {
            self.nodes.get(handle).color()
        }
    }

    #[inline]
    fn is_red(&self, handle: Handle) -> bool {
        self.color(handle) == Color::Red
    }

    #[inline]
    fn set_color(&mut self, handle: Handle, color: Color) {
        // The sentinel stays black; fixup code may harmlessly target it.
        if !handle.is_nil() {
            self.nodes.get_mut(handle).set_color(color);
        }
    }

    #[inline]
    fn size(&self, handle: Handle) -> usize {
        if handle.is_nil() {
            0
        } else {
            self.nodes.get(handle).size().to_usize()
        }
    }

    #[inline]
    fn left(&self, handle: Handle) -> Handle {
        if handle.is_nil() {
            Handle::NIL
        } else {
            self.nodes.get(handle).left()
        }
    }

    #[inline]
    fn right(&self, handle: Handle) -> Handle {
        if handle.is_nil() {
            Handle::NIL
        } else {
            self.nodes.get(handle).right()
        }
    }

    #[inline]
    fn parent(&self, handle: Handle) -> Handle {
        if handle.is_nil() {
            self.nil_parent
        } else {
            self.nodes.get(handle).parent()
        }
    }

    #[inline]
    fn set_parent(&mut self, handle: Handle, parent: Handle) {
        if handle.is_nil() {
            self.nil_parent = parent;
        } else {
            self.nodes.get_mut(handle).set_parent(parent);
        }
    }

    /// Recomputes `handle`'s subtree size from its children.
    fn refresh_size(&mut self, handle: Handle) {
        let total = self.size(self.left(handle)) + self.size(self.right(handle)) + 1;
        self.nodes.get_mut(handle).set_size(Size::from_usize(total));
    }

    /// Recomputes subtree sizes bottom-up from `from` to the root.
    fn rebuild_sizes_above(&mut self, from: Handle) {
        let mut current = from;
        while !current.is_nil() {
            self.refresh_size(current);
            current = self.nodes.get(current).parent();
        }
    }

    /// Adds one to every subtree size on the path above `handle`.
    fn bump_sizes_above(&mut self, handle: Handle) {
        let mut current = self.nodes.get(handle).parent();
        while !current.is_nil() {
            let node = self.nodes.get_mut(current);
            let grown = node.size().to_usize() + 1;
            node.set_size(Size::from_usize(grown));
            current = node.parent();
        }
    }

    // ─── Extremes and in-order neighbors ─────────────────────────────────

    /// Leftmost node of the subtree rooted at `node` (which must be real).
    fn minimum(&self, mut node: Handle) -> Handle {
        while !self.left(node).is_nil() {
            node = self.left(node);
        }
        node
    }

    /// Rightmost node of the subtree rooted at `node` (which must be real).
    fn maximum(&self, mut node: Handle) -> Handle {
        while !self.right(node).is_nil() {
            node = self.right(node);
        }
        node
    }

    /// Handle of the first entry in sorted order, or `NIL` when empty.
    pub(crate) fn first(&self) -> Handle {
        if self.root.is_nil() {
            Handle::NIL
        } else {
            self.minimum(self.root)
        }
    }

    /// Handle of the last entry in sorted order, or `NIL` when empty.
    pub(crate) fn last(&self) -> Handle {
        if self.root.is_nil() {
            Handle::NIL
        } else {
            self.maximum(self.root)
        }
    }

    /// In-order successor of `node` (which must be real), or `NIL`.
    pub(crate) fn successor(&self, node: Handle) -> Handle {
        let right = self.right(node);
        if !right.is_nil() {
            return self.minimum(right);
        }
        let mut current = node;
        let mut parent = self.nodes.get(current).parent();
        while !parent.is_nil() && current == self.right(parent) {
            current = parent;
            parent = self.nodes.get(parent).parent();
        }
        parent
    }

    /// In-order predecessor of `node` (which must be real), or `NIL`.
    pub(crate) fn predecessor(&self, node: Handle) -> Handle {
        let left = self.left(node);
        if !left.is_nil() {
            return self.maximum(left);
        }
        let mut current = node;
        let mut parent = self.nodes.get(current).parent();
        while !parent.is_nil() && current == self.left(parent) {
            current = parent;
            parent = self.nodes.get(parent).parent();
        }
        parent
    }

    // ─── Rotations ───────────────────────────────────────────────────────

    fn rotate_left(&mut self, x: Handle) {
        let y = self.right(x);
        debug_assert!(!y.is_nil(), "rotate_left: pivot has no right child");
        let y_left = self.left(y);

        self.nodes.get_mut(x).set_right(y_left);
        if !y_left.is_nil() {
            // Guarded: child relinking must not clobber the sentinel's
            // transient parent mid-fixup.
            self.nodes.get_mut(y_left).set_parent(x);
        }

        let x_parent = self.nodes.get(x).parent();
        self.nodes.get_mut(y).set_parent(x_parent);
        if x_parent.is_nil() {
            self.root = y;
        } else if self.left(x_parent) == x {
            self.nodes.get_mut(x_parent).set_left(y);
        } else {
            self.nodes.get_mut(x_parent).set_right(y);
        }

        self.nodes.get_mut(y).set_left(x);
        self.nodes.get_mut(x).set_parent(y);

        self.refresh_size(x);
        self.refresh_size(y);
    }

    fn rotate_right(&mut self, y: Handle) {
        let x = self.left(y);
        debug_assert!(!x.is_nil(), "rotate_right: pivot has no left child");
        let x_right = self.right(x);

        self.nodes.get_mut(y).set_left(x_right);
        if !x_right.is_nil() {
            self.nodes.get_mut(x_right).set_parent(y);
        }

        let y_parent = self.nodes.get(y).parent();
        self.nodes.get_mut(x).set_parent(y_parent);
        if y_parent.is_nil() {
            self.root = x;
        } else if self.left(y_parent) == y {
            self.nodes.get_mut(y_parent).set_left(x);
        } else {
            self.nodes.get_mut(y_parent).set_right(x);
        }

        self.nodes.get_mut(x).set_right(y);
        self.nodes.get_mut(y).set_parent(x);

        self.refresh_size(y);
        self.refresh_size(x);
    }

    // ─── Bulk extraction ─────────────────────────────────────────────────

    /// Drains all entries in sorted order, leaving the tree empty.
    ///
    /// O(n): collects the in-order handle sequence, then reclaims every
    /// node without rebalancing.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, Option<V>)> {
        let mut handles = Vec::with_capacity(self.len());
        let mut current = self.first();
        while !current.is_nil() {
            handles.push(current);
            current = self.successor(current);
        }

        let mut entries = Vec::with_capacity(handles.len());
        for handle in handles {
            entries.push(self.nodes.take(handle).into_entry());
        }

        self.nodes.clear();
        self.root = Handle::NIL;
        self.nil_parent = Handle::NIL;
        entries
    }
}

impl<K: Ord, V> RawOSRBTree<K, V> {
    // ─── Search ──────────────────────────────────────────────────────────

    /// Returns the topmost node matching `key`, or `NIL`.
    pub(crate) fn search<Q>(&self, key: &Q) -> Handle
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while !current.is_nil() {
            let node = self.nodes.get(current);
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => current = node.right(),
                Ordering::Equal => return current,
            }
        }
        Handle::NIL
    }

    /// Returns the first (lowest-rank) node matching `key`, or `NIL`.
    ///
    /// With duplicates this is the earliest-inserted occurrence, since new
    /// duplicates always land rightmost among their equals.
    pub(crate) fn find_first<Q>(&self, key: &Q) -> Handle
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut found = Handle::NIL;
        while !current.is_nil() {
            let node = self.nodes.get(current);
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => current = node.right(),
                Ordering::Equal => {
                    found = current;
                    current = node.left();
                }
            }
        }
        found
    }

    /// Returns the stored payload for `key`.
    ///
    /// The outer `Option` reports key presence; the inner one is the
    /// payload itself, which may legitimately be absent.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<Option<&V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.find_first(key);
        if handle.is_nil() {
            None
        } else {
            Some(self.nodes.get(handle).value())
        }
    }

    /// Returns a mutable reference to the stored payload for `key`.
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<Option<&mut V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.find_first(key);
        if handle.is_nil() {
            None
        } else {
            Some(self.nodes.get_mut(handle).value_mut())
        }
    }

    /// Returns true if the tree contains `key`.
    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        !self.search(key).is_nil()
    }

    // ─── Insertion ───────────────────────────────────────────────────────

    /// Inserts `key` with the given optional payload.
    ///
    /// Returns `Some(previous_payload)` when an equal key was overwritten
    /// in place (unique mode only); `None` when a new entry was created.
    pub(crate) fn insert(&mut self, key: K, value: Option<V>) -> Option<Option<V>> {
        let mut parent = Handle::NIL;
        let mut current = self.root;
        let mut went_left = false;

        while !current.is_nil() {
            parent = current;
            let node = self.nodes.get(current);
            let (left, right) = (node.left(), node.right());
            match key.cmp(node.key()) {
                Ordering::Less => {
                    current = left;
                    went_left = true;
                }
                Ordering::Greater => {
                    current = right;
                    went_left = false;
                }
                Ordering::Equal => {
                    if self.unique_keys {
                        return Some(self.nodes.get_mut(current).replace_value(value));
                    }
                    // Duplicates keep insertion order: ties descend right,
                    // so the new occurrence lands rightmost among equals.
                    current = right;
                    went_left = false;
                }
            }
        }

        let handle = self.nodes.alloc(Node::new(key, value));
        self.nodes.get_mut(handle).set_parent(parent);
        if parent.is_nil() {
            self.root = handle;
        } else if went_left {
            self.nodes.get_mut(parent).set_left(handle);
        } else {
            self.nodes.get_mut(parent).set_right(handle);
        }

        self.bump_sizes_above(handle);
        self.insert_fixup(handle);
        None
    }

    /// Restores the coloring invariants after linking a new red leaf.
    fn insert_fixup(&mut self, mut node: Handle) {
        while self.is_red(self.parent(node)) {
            let parent = self.parent(node);
            // A red parent is never the root, so the grandparent is real.
            let grandparent = self.parent(parent);

            if parent == self.left(grandparent) {
                let uncle = self.right(grandparent);
                if self.is_red(uncle) {
                    // Red uncle: recolor and continue from the grandparent.
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if node == self.right(parent) {
                        // Inner grandchild: rotate onto the outer track.
                        node = parent;
                        self.rotate_left(node);
                    }
                    let parent = self.parent(node);
                    let grandparent = self.parent(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.left(grandparent);
                if self.is_red(uncle) {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if node == self.left(parent) {
                        node = parent;
                        self.rotate_right(node);
                    }
                    let parent = self.parent(node);
                    let grandparent = self.parent(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_left(grandparent);
                }
            }
        }
        self.set_color(self.root, Color::Black);
    }

    // ─── Deletion ────────────────────────────────────────────────────────

    /// Removes the first occurrence of `key` and returns its entry.
    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, Option<V>)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let target = self.find_first(key);
        if target.is_nil() {
            None
        } else {
            Some(self.remove_at(target))
        }
    }

    /// Removes every occurrence of `key`, returning how many were removed.
    pub(crate) fn remove_all<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut removed = 0;
        loop {
            let target = self.find_first(key);
            if target.is_nil() {
                return removed;
            }
            self.remove_at(target);
            removed += 1;
        }
    }

    /// Removes and returns the first entry in sorted order.
    pub(crate) fn pop_first(&mut self) -> Option<(K, Option<V>)> {
        let first = self.first();
        if first.is_nil() {
            None
        } else {
            Some(self.remove_at(first))
        }
    }

    /// Removes and returns the last entry in sorted order.
    pub(crate) fn pop_last(&mut self) -> Option<(K, Option<V>)> {
        let last = self.last();
        if last.is_nil() {
            None
        } else {
            Some(self.remove_at(last))
        }
    }

    /// Unlinks the node at `target` and returns its entry.
    fn remove_at(&mut self, target: Handle) -> (K, Option<V>) {
        debug_assert!(!target.is_nil(), "remove_at: target is the sentinel");

        let target_left = self.left(target);
        let target_right = self.right(target);
        let original_color = self.color(target);
        let mut removed_color = original_color;
        let fixup_child;

        if target_left.is_nil() {
            fixup_child = target_right;
            self.transplant(target, target_right);
        } else if target_right.is_nil() {
            fixup_child = target_left;
            self.transplant(target, target_left);
        } else {
            // Two children: relink the in-order successor into the target's
            // position. The successor inherits the target's color, so the
            // black deficiency (if any) appears at the successor's old spot.
            let successor = self.minimum(target_right);
            removed_color = self.color(successor);
            fixup_child = self.right(successor);

            if self.parent(successor) == target {
                // The fixup child may be the sentinel; its parent must still
                // point at the successor for the upward walk.
                self.set_parent(fixup_child, successor);
            } else {
                self.transplant(successor, fixup_child);
                self.nodes.get_mut(successor).set_right(target_right);
                self.nodes.get_mut(target_right).set_parent(successor);
            }

            self.transplant(target, successor);
            self.nodes.get_mut(successor).set_left(target_left);
            self.nodes.get_mut(target_left).set_parent(successor);
            self.set_color(successor, original_color);
        }

        // Deepest position whose subtree shrank; sizes are rebuilt from
        // here to the root once the structure has settled.
        let size_anchor = self.parent(fixup_child);

        if removed_color == Color::Black {
            self.remove_fixup(fixup_child);
        }
        self.rebuild_sizes_above(size_anchor);

        self.nodes.take(target).into_entry()
    }

    /// Replaces the subtree rooted at `old` with the one rooted at `new`.
    fn transplant(&mut self, old: Handle, new: Handle) {
        let parent = self.parent(old);
        if parent.is_nil() {
            self.root = new;
        } else if self.left(parent) == old {
            self.nodes.get_mut(parent).set_left(new);
        } else {
            self.nodes.get_mut(parent).set_right(new);
        }
        self.set_parent(new, parent);
    }

    /// Repairs the double-black deficiency sitting on `node`.
    fn remove_fixup(&mut self, mut node: Handle) {
        while node != self.root && !self.is_red(node) {
            let parent = self.parent(node);

            if node == self.left(parent) {
                let mut sibling = self.right(parent);
                if self.is_red(sibling) {
                    // Red sibling: rotate it above so the cases below see a
                    // black one.
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_left(parent);
                    sibling = self.right(self.parent(node));
                }

                if !self.is_red(self.left(sibling)) && !self.is_red(self.right(sibling)) {
                    // Both nephews black: push the deficiency upward.
                    self.set_color(sibling, Color::Red);
                    node = self.parent(node);
                } else {
                    if !self.is_red(self.right(sibling)) {
                        self.set_color(self.left(sibling), Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_right(sibling);
                        sibling = self.right(self.parent(node));
                    }
                    let parent = self.parent(node);
                    self.set_color(sibling, self.color(parent));
                    self.set_color(parent, Color::Black);
                    self.set_color(self.right(sibling), Color::Black);
                    self.rotate_left(parent);
                    node = self.root;
                }
            } else {
                let mut sibling = self.left(parent);
                if self.is_red(sibling) {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_right(parent);
                    sibling = self.left(self.parent(node));
                }

                if !self.is_red(self.left(sibling)) && !self.is_red(self.right(sibling)) {
                    self.set_color(sibling, Color::Red);
                    node = self.parent(node);
                } else {
                    if !self.is_red(self.left(sibling)) {
                        self.set_color(self.right(sibling), Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_left(sibling);
                        sibling = self.left(self.parent(node));
                    }
                    let parent = self.parent(node);
                    self.set_color(sibling, self.color(parent));
                    self.set_color(parent, Color::Black);
                    self.set_color(self.left(sibling), Color::Black);
                    self.rotate_right(parent);
                    node = self.root;
                }
            }
        }
        self.set_color(node, Color::Black);
    }

    // ─── Order statistics ────────────────────────────────────────────────

    /// Returns the node at the given rank (0-indexed sorted position), or
    /// `NIL` if `rank` is out of range.
    pub(crate) fn get_by_rank(&self, rank: usize) -> Handle {
        if rank >= self.len() {
            return Handle::NIL;
        }

        let mut current = self.root;
        let mut remaining = rank;
        loop {
            debug_assert!(
                !current.is_nil(),
                "get_by_rank: size invariant violated - rank {rank} ran off the tree"
            );
            let left = self.left(current);
            let left_size = self.size(left);
            match remaining.cmp(&left_size) {
                Ordering::Less => current = left,
                Ordering::Equal => return current,
                Ordering::Greater => {
                    remaining -= left_size + 1;
                    current = self.right(current);
                }
            }
        }
    }

    /// Number of stored entries whose key is strictly less than `key`.
    ///
    /// This is also the rank of `key`'s first occurrence when present.
    pub(crate) fn rank_lower<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut count = 0;
        let mut current = self.root;
        while !current.is_nil() {
            let node = self.nodes.get(current);
            if node.key().borrow() < key {
                count += self.size(node.left()) + 1;
                current = node.right();
            } else {
                current = node.left();
            }
        }
        count
    }

    /// Number of stored entries whose key is less than or equal to `key`.
    pub(crate) fn rank_upper<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut count = 0;
        let mut current = self.root;
        while !current.is_nil() {
            let node = self.nodes.get(current);
            if node.key().borrow() <= key {
                count += self.size(node.left()) + 1;
                current = node.right();
            } else {
                current = node.left();
            }
        }
        count
    }

    /// Returns the rank of `key`'s first occurrence, or `None` if absent.
    pub(crate) fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if self.search(key).is_nil() {
            None
        } else {
            Some(self.rank_lower(key))
        }
    }

    /// Number of stored occurrences of `key` (0 when absent, 1 in unique
    /// mode, possibly more in multiset mode).
    pub(crate) fn occurrences<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.rank_upper(key) - self.rank_lower(key)
    }

}

impl<K: fmt::Debug, V> RawOSRBTree<K, V> {
    /// Renders the tree shape as indented text, one node per line with its
    /// key, color and subtree size. The format is for debugging only and
    /// is not stable.
    pub(crate) fn dump_structure(&self) -> String {
        let mut out = String::new();
        if self.root.is_nil() {
            out.push_str("(empty)\n");
        } else {
            self.dump_node(self.root, "root", 0, &mut out);
        }
        out
    }

    fn dump_node(&self, handle: Handle, slot: &str, depth: usize, out: &mut String) {
        let node = self.nodes.get(handle);
        for _ in 0..depth {
            out.push_str("  ");
        }
        let color = match node.color() {
            Color::Red => "red",
            Color::Black => "black",
        };
        let _ = writeln!(out, "{slot}: {:?} ({color}, size {})", node.key(), node.size().to_usize());
        if !node.left().is_nil() {
            self.dump_node(node.left(), "l", depth + 1, out);
        }
        if !node.right().is_nil() {
            self.dump_node(node.right(), "r", depth + 1, out);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl<K: Ord, V> RawOSRBTree<K, V> {
        /// Validates every structural invariant, panicking with a
        /// descriptive message on the first violation. Test-only.
        pub(crate) fn validate_invariants(&self) {
            if self.root.is_nil() {
                assert_eq!(self.len(), 0, "empty tree must have len 0");
                return;
            }

            assert_eq!(self.color(self.root), Color::Black, "root must be black");
            assert!(self.nodes.get(self.root).parent().is_nil(), "root must have no parent");

            let (_, size) = self.validate_node(self.root);
            assert_eq!(size, self.len(), "root subtree size must equal len");

            // In-order keys must be sorted; strictly so in unique mode.
            let mut current = self.first();
            let mut previous: Option<&K> = None;
            while !current.is_nil() {
                let key = self.nodes.get(current).key();
                if let Some(previous) = previous {
                    if self.unique_keys {
                        assert!(previous < key, "in-order keys must be strictly increasing");
                    } else {
                        assert!(previous <= key, "in-order keys must be non-decreasing");
                    }
                }
                previous = Some(key);
                current = self.successor(current);
            }
        }

        /// Returns (black-height, subtree size) for the subtree at `handle`.
        fn validate_node(&self, handle: Handle) -> (usize, usize) {
            if handle.is_nil() {
                return (1, 0);
            }

            let node = self.nodes.get(handle);
            if node.color() == Color::Red {
                assert_eq!(self.color(node.left()), Color::Black, "red node with a red left child");
                assert_eq!(self.color(node.right()), Color::Black, "red node with a red right child");
            }
            if !node.left().is_nil() {
                assert_eq!(self.nodes.get(node.left()).parent(), handle, "left child has a stale parent link");
            }
            if !node.right().is_nil() {
                assert_eq!(self.nodes.get(node.right()).parent(), handle, "right child has a stale parent link");
            }

            let (left_height, left_size) = self.validate_node(node.left());
            let (right_height, right_size) = self.validate_node(node.right());
            assert_eq!(left_height, right_height, "black-height mismatch between siblings");

            let size = left_size + right_size + 1;
            assert_eq!(node.size().to_usize(), size, "stored subtree size is stale");

            (left_height + usize::from(node.color() == Color::Black), size)
        }

        /// Collects the in-order entry sequence. Test-only.
        fn in_order(&self) -> Vec<(&K, Option<&V>)> {
            let mut entries = Vec::with_capacity(self.len());
            let mut current = self.first();
            while !current.is_nil() {
                entries.push(self.entry_at(current));
                current = self.successor(current);
            }
            entries
        }
    }

    #[test]
    fn empty_tree() {
        let tree: RawOSRBTree<i32, i32> = RawOSRBTree::new(true);
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.first().is_nil());
        assert!(tree.last().is_nil());
        assert!(tree.get(&1).is_none());
        assert!(tree.rank_of(&1).is_none());
        assert!(tree.get_by_rank(0).is_nil());
        tree.validate_invariants();
    }

    #[test]
    fn clear_is_idempotent() {
        let mut tree: RawOSRBTree<i32, i32> = RawOSRBTree::new(true);
        let _ = tree.insert(1, Some(10));
        tree.clear();
        assert_eq!(tree.len(), 0);
        tree.clear();
        assert_eq!(tree.len(), 0);
        tree.validate_invariants();
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut tree: RawOSRBTree<i32, i32> = RawOSRBTree::new(true);
        for key in 0..512 {
            assert!(tree.insert(key, Some(key * 10)).is_none());
            tree.validate_invariants();
        }
        assert_eq!(tree.len(), 512);
        assert_eq!(tree.get(&7), Some(Some(&70)));
    }

    #[test]
    fn descending_inserts_stay_balanced() {
        let mut tree: RawOSRBTree<i32, i32> = RawOSRBTree::new(true);
        for key in (0..512).rev() {
            let _ = tree.insert(key, Some(key));
            tree.validate_invariants();
        }
        assert_eq!(tree.len(), 512);
    }

    #[test]
    fn unique_mode_overwrites_in_place() {
        let mut tree: RawOSRBTree<i32, &str> = RawOSRBTree::new(true);
        assert_eq!(tree.insert(1, Some("old")), None);
        assert_eq!(tree.insert(1, Some("new")), Some(Some("old")));
        assert_eq!(tree.insert(1, None), Some(Some("new")));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&1), Some(None));
        tree.validate_invariants();
    }

    #[test]
    fn duplicates_keep_insertion_order() {
        let mut tree: RawOSRBTree<i32, &str> = RawOSRBTree::new(false);
        let _ = tree.insert(1, Some("a"));
        let _ = tree.insert(0, Some("low"));
        let _ = tree.insert(1, Some("b"));
        let _ = tree.insert(2, Some("high"));
        let _ = tree.insert(1, Some("c"));
        tree.validate_invariants();

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.occurrences(&1), 3);
        let values: Vec<_> = tree.in_order().into_iter().map(|(_, v)| v.copied()).collect();
        assert_eq!(
            values,
            [Some("low"), Some("a"), Some("b"), Some("c"), Some("high")]
        );

        // Removal takes the earliest-inserted occurrence.
        assert_eq!(tree.remove_entry(&1), Some((1, Some("a"))));
        tree.validate_invariants();
        assert_eq!(tree.remove_entry(&1), Some((1, Some("b"))));
        assert_eq!(tree.occurrences(&1), 1);
    }

    #[test]
    fn remove_all_reports_multiplicity() {
        let mut tree: RawOSRBTree<i32, ()> = RawOSRBTree::new(false);
        for _ in 0..4 {
            let _ = tree.insert(9, None);
        }
        let _ = tree.insert(1, None);
        assert_eq!(tree.remove_all(&9), 4);
        assert_eq!(tree.remove_all(&9), 0);
        assert_eq!(tree.len(), 1);
        tree.validate_invariants();
    }

    #[test]
    fn rank_round_trip() {
        let mut tree: RawOSRBTree<i32, i32> = RawOSRBTree::new(true);
        for key in [50, 20, 80, 10, 30, 70, 90] {
            let _ = tree.insert(key, Some(key));
        }
        for rank in 0..tree.len() {
            let handle = tree.get_by_rank(rank);
            let (key, _) = tree.entry_at(handle);
            assert_eq!(tree.rank_of(key), Some(rank));
        }
        assert!(tree.get_by_rank(tree.len()).is_nil());
    }

    #[test]
    fn rank_of_duplicates_is_first_occurrence() {
        let mut tree: RawOSRBTree<i32, ()> = RawOSRBTree::new(false);
        for key in [5, 3, 5, 5, 8] {
            let _ = tree.insert(key, None);
        }
        assert_eq!(tree.rank_of(&3), Some(0));
        assert_eq!(tree.rank_of(&5), Some(1));
        assert_eq!(tree.rank_of(&8), Some(4));
        assert_eq!(tree.rank_of(&4), None);
    }

    #[test]
    fn two_child_removal_promotes_successor() {
        let mut tree: RawOSRBTree<i32, i32> = RawOSRBTree::new(true);
        for key in [50, 20, 80, 10, 30, 70, 90, 25, 35] {
            let _ = tree.insert(key, Some(key));
        }
        // 20 has two children; its successor 25 must take its place.
        assert_eq!(tree.remove_entry(&20), Some((20, Some(20))));
        tree.validate_invariants();
        let keys: Vec<i32> = tree.in_order().into_iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, [10, 25, 30, 35, 50, 70, 80, 90]);
    }

    #[test]
    fn drain_yields_sorted_entries() {
        let mut tree: RawOSRBTree<i32, i32> = RawOSRBTree::new(true);
        for key in [3, 1, 2] {
            let _ = tree.insert(key, Some(key));
        }
        let drained = tree.drain_to_vec();
        assert_eq!(drained, [(1, Some(1)), (2, Some(2)), (3, Some(3))]);
        assert!(tree.is_empty());
        tree.validate_invariants();
    }

    #[test]
    fn dump_structure_is_nonempty() {
        let mut tree: RawOSRBTree<i32, i32> = RawOSRBTree::new(true);
        assert_eq!(tree.dump_structure(), "(empty)\n");
        let _ = tree.insert(2, None);
        let _ = tree.insert(1, None);
        let _ = tree.insert(3, None);
        let dump = tree.dump_structure();
        assert!(dump.contains("root: 2 (black, size 3)"));
        assert!(dump.contains("l: 1"));
        assert!(dump.contains("r: 3"));
    }

    // ─── Randomized operation sequences ──────────────────────────────────

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i8, i8),
        Remove(i8),
        PopFirst,
        PopLast,
        Clear,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            8 => (any::<i8>(), any::<i8>()).prop_map(|(k, v)| Op::Insert(k, v)),
            5 => any::<i8>().prop_map(Op::Remove),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        /// Replays random operation sequences against `BTreeMap` in unique
        /// mode, validating every invariant after every step.
        #[test]
        fn unique_ops_match_btreemap(ops in prop::collection::vec(op_strategy(), 0..300)) {
            let mut tree: RawOSRBTree<i8, i8> = RawOSRBTree::new(true);
            let mut model: BTreeMap<i8, i8> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(k, v) => {
                        let replaced = tree.insert(k, Some(v)).map(|old| old.unwrap());
                        prop_assert_eq!(replaced, model.insert(k, v));
                    }
                    Op::Remove(k) => {
                        let removed = tree.remove_entry(&k).map(|(key, value)| (key, value.unwrap()));
                        prop_assert_eq!(removed, model.remove_entry(&k));
                    }
                    Op::PopFirst => {
                        let popped = tree.pop_first().map(|(key, value)| (key, value.unwrap()));
                        prop_assert_eq!(popped, model.pop_first());
                    }
                    Op::PopLast => {
                        let popped = tree.pop_last().map(|(key, value)| (key, value.unwrap()));
                        prop_assert_eq!(popped, model.pop_last());
                    }
                    Op::Clear => {
                        tree.clear();
                        model.clear();
                    }
                }

                tree.validate_invariants();
                prop_assert_eq!(tree.len(), model.len());
                let entries: Vec<(i8, i8)> = tree.in_order().into_iter().map(|(k, v)| (*k, *v.unwrap())).collect();
                let expected: Vec<(i8, i8)> = model.iter().map(|(&k, &v)| (k, v)).collect();
                prop_assert_eq!(entries, expected);
            }
        }

        /// Replays random operation sequences against a sorted, insertion-
        /// stable `Vec` model in multiset mode. Exercises the rightmost
        /// tie-break for duplicates.
        #[test]
        fn multiset_ops_match_stable_model(ops in prop::collection::vec(op_strategy(), 0..300)) {
            let mut tree: RawOSRBTree<i8, u16> = RawOSRBTree::new(false);
            let mut model: Vec<(i8, u16)> = Vec::new();
            let mut stamp: u16 = 0;

            for op in ops {
                match op {
                    Op::Insert(k, _) => {
                        prop_assert!(tree.insert(k, Some(stamp)).is_none());
                        // New duplicates land after every equal key.
                        let at = model.partition_point(|&(key, _)| key <= k);
                        model.insert(at, (k, stamp));
                        stamp += 1;
                    }
                    Op::Remove(k) => {
                        let removed = tree.remove_entry(&k).map(|(key, value)| (key, value.unwrap()));
                        let expected = model.iter().position(|&(key, _)| key == k).map(|at| model.remove(at));
                        prop_assert_eq!(removed, expected);
                    }
                    Op::PopFirst => {
                        let popped = tree.pop_first().map(|(key, value)| (key, value.unwrap()));
                        let expected = if model.is_empty() { None } else { Some(model.remove(0)) };
                        prop_assert_eq!(popped, expected);
                    }
                    Op::PopLast => {
                        let popped = tree.pop_last().map(|(key, value)| (key, value.unwrap()));
                        prop_assert_eq!(popped, model.pop());
                    }
                    Op::Clear => {
                        tree.clear();
                        model.clear();
                    }
                }

                tree.validate_invariants();
                prop_assert_eq!(tree.len(), model.len());
                let entries: Vec<(i8, u16)> = tree.in_order().into_iter().map(|(k, v)| (*k, *v.unwrap())).collect();
                prop_assert_eq!(&entries, &model);

                // Occurrence counts agree with the model on every stored key.
                for &(key, _) in &model {
                    let expected = model.iter().filter(|&&(k, _)| k == key).count();
                    prop_assert_eq!(tree.occurrences(&key), expected);
                }
            }
        }

        /// `get_by_rank` and `rank_of` round-trip over random contents.
        #[test]
        fn rank_round_trips(keys in prop::collection::vec(any::<i8>(), 0..200)) {
            let mut tree: RawOSRBTree<i8, ()> = RawOSRBTree::new(false);
            let mut sorted = keys.clone();
            sorted.sort_unstable();
            for key in keys {
                let _ = tree.insert(key, None);
            }

            for (rank, key) in sorted.iter().enumerate() {
                let handle = tree.get_by_rank(rank);
                prop_assert!(!handle.is_nil());
                let (found, _) = tree.entry_at(handle);
                prop_assert_eq!(found, key);
            }
            for key in &sorted {
                let rank = tree.rank_of(key).unwrap();
                prop_assert_eq!(tree.rank_lower(key), rank);
                let (found, _) = tree.entry_at(tree.get_by_rank(rank));
                prop_assert_eq!(found, key);
            }
            prop_assert!(tree.get_by_rank(sorted.len()).is_nil());
        }
    }
}
