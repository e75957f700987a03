use core::borrow::Borrow;
use core::ops::{Index, IndexMut};

use super::OSRBTreeMap;
use crate::Rank;

impl<K: Ord, V> OSRBTreeMap<K, V> {
    /// Returns the entry at position `rank` in sorted order.
    ///
    /// The rank is zero-based. Returns `None` if `rank` is out of bounds.
    /// With duplicate keys every occurrence occupies its own rank.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    /// map.insert("a", Some(10));
    /// map.insert("c", Some(30));
    /// map.insert("b", Some(20));
    ///
    /// let (key, value) = map.get_by_rank(1).unwrap();
    /// assert_eq!((key, value), (&"b", Some(&20)));
    /// assert!(map.get_by_rank(3).is_none());
    /// ```
    #[must_use]
    pub fn get_by_rank(&self, rank: usize) -> Option<(&K, Option<&V>)> {
        let handle = self.raw.get_by_rank(rank);
        if handle.is_nil() {
            None
        } else {
            Some(self.raw.entry_at(handle))
        }
    }

    /// Returns the key and a mutable payload reference for the entry at
    /// position `rank` in sorted order.
    ///
    /// The rank is zero-based. Returns `None` if `rank` is out of bounds.
    /// The key is returned as a shared reference because mutating it would
    /// violate the map's ordering invariants.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    /// map.insert(10, Some("a"));
    /// map.insert(5, Some("b"));
    ///
    /// if let Some((key, Some(value))) = map.get_by_rank_mut(0) {
    ///     assert_eq!(*key, 5);
    ///     *value = "updated";
    /// }
    ///
    /// assert_eq!(map.get(&5), Some(Some(&"updated")));
    /// ```
    #[must_use]
    pub fn get_by_rank_mut(&mut self, rank: usize) -> Option<(&K, Option<&mut V>)> {
        let handle = self.raw.get_by_rank(rank);
        if handle.is_nil() {
            None
        } else {
            Some(self.raw.entry_mut_at(handle))
        }
    }

    /// Returns the zero-based rank of `key` in sorted order, or `None` if
    /// the key is not present.
    ///
    /// With duplicate keys this is the rank of the first occurrence, which
    /// equals the number of stored keys strictly less than `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    /// map.insert(10, Some("a"));
    /// map.insert(20, Some("b"));
    ///
    /// assert_eq!(map.rank_of(&10), Some(0));
    /// assert_eq!(map.rank_of(&15), None);
    /// ```
    #[must_use]
    pub fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.rank_of(key)
    }
}

/// Indexes into the map by rank, yielding the stored payload slot.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use osrb_tree::{OSRBTreeMap, Rank};
///
/// let mut map = OSRBTreeMap::new();
/// map.insert("a", Some(1));
/// map.insert("b", None);
///
/// assert_eq!(map[Rank(0)], Some(1));
/// assert_eq!(map[Rank(1)], None);
/// ```
impl<K: Ord, V> Index<Rank> for OSRBTreeMap<K, V> {
    type Output = Option<V>;

    fn index(&self, rank: Rank) -> &Self::Output {
        let handle = self.raw.get_by_rank(rank.0);
        assert!(!handle.is_nil(), "index out of bounds");
        self.raw.payload_at(handle)
    }
}

/// Mutably indexes into the map by rank, yielding the stored payload slot.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use osrb_tree::{OSRBTreeMap, Rank};
///
/// let mut map = OSRBTreeMap::from([("a", Some(1)), ("b", Some(2))]);
/// map[Rank(1)] = None;
///
/// assert_eq!(map.get(&"b"), Some(None));
/// ```
impl<K: Ord, V> IndexMut<Rank> for OSRBTreeMap<K, V> {
    fn index_mut(&mut self, rank: Rank) -> &mut Self::Output {
        let handle = self.raw.get_by_rank(rank.0);
        assert!(!handle.is_nil(), "index out of bounds");
        self.raw.payload_mut_at(handle)
    }
}
