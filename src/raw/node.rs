use super::handle::Handle;
use super::size::Size;

/// Node color for red-black balancing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// A tree node: one key, its optional payload, and the structural fields
/// maintained by the balancing engine.
///
/// `parent` is a non-owning back-reference used for fixup walks, rank
/// queries and iteration; `left`/`right` are the structural links. Absent
/// links hold [`Handle::NIL`]. `size` counts the non-sentinel nodes of the
/// subtree rooted here, inclusive of this node.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    key: K,
    value: Option<V>,
    color: Color,
    parent: Handle,
    left: Handle,
    right: Handle,
    size: Size,
}

impl<K, V> Node<K, V> {
    /// Creates a freshly inserted leaf: red, size one, no links.
    pub(crate) const fn new(key: K, value: Option<V>) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            parent: Handle::NIL,
            left: Handle::NIL,
            right: Handle::NIL,
            size: Size::ONE,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) const fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    #[inline]
    pub(crate) const fn value_mut(&mut self) -> Option<&mut V> {
        self.value.as_mut()
    }

    /// Overwrites the payload in place, returning the previous one.
    pub(crate) const fn replace_value(&mut self, value: Option<V>) -> Option<V> {
        core::mem::replace(&mut self.value, value)
    }

    /// Borrows the payload slot itself (for indexing sugar).
    #[inline]
    pub(crate) const fn payload(&self) -> &Option<V> {
        &self.value
    }

    /// Mutably borrows the payload slot itself.
    #[inline]
    pub(crate) const fn payload_mut(&mut self) -> &mut Option<V> {
        &mut self.value
    }

    /// Borrows the key and, mutably, the payload in one go.
    pub(crate) const fn entry_mut(&mut self) -> (&K, Option<&mut V>) {
        (&self.key, self.value.as_mut())
    }

    /// Consumes the node, yielding its entry.
    pub(crate) fn into_entry(self) -> (K, Option<V>) {
        (self.key, self.value)
    }

    #[inline]
    pub(crate) const fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub(crate) const fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Handle {
        self.parent
    }

    #[inline]
    pub(crate) const fn set_parent(&mut self, parent: Handle) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) const fn left(&self) -> Handle {
        self.left
    }

    #[inline]
    pub(crate) const fn set_left(&mut self, left: Handle) {
        self.left = left;
    }

    #[inline]
    pub(crate) const fn right(&self) -> Handle {
        self.right
    }

    #[inline]
    pub(crate) const fn set_right(&mut self, right: Handle) {
        self.right = right;
    }

    #[inline]
    pub(crate) const fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub(crate) const fn set_size(&mut self, size: Size) {
        self.size = size;
    }
}
