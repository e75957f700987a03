use super::OSRBTreeMap;
use crate::raw::RawOSRBTree;

impl<K, V> OSRBTreeMap<K, V> {
    /// Creates an empty unique-keys map with room for at least `capacity`
    /// entries before the node arena reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map: OSRBTreeMap<i32, i32> = OSRBTreeMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OSRBTreeMap {
            raw: RawOSRBTree::with_capacity(true, capacity),
        }
    }

    /// Creates an empty duplicate-keys map with room for at least
    /// `capacity` entries before the node arena reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map: OSRBTreeMap<i32, i32> = OSRBTreeMap::with_capacity_duplicates(32);
    /// assert!(map.allows_duplicates());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity_duplicates(capacity: usize) -> Self {
        OSRBTreeMap {
            raw: RawOSRBTree::with_capacity(false, capacity),
        }
    }

    /// Returns the current capacity of the map's node arena.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map: OSRBTreeMap<i32, i32> = OSRBTreeMap::with_capacity(32);
    /// assert!(map.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
