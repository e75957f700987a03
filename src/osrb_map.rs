use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::Index;

use alloc::string::String;

use crate::raw::{Handle, RawOSRBTree};

mod capacity;
mod order_statistic;
mod statistics;

pub use crate::Rank;

/// The result of an [`insert`](OSRBTreeMap::insert).
///
/// # Examples
///
/// ```
/// use osrb_tree::{InsertOutcome, OSRBTreeMap};
///
/// let mut map = OSRBTreeMap::new();
/// assert_eq!(map.insert("a", Some(1)), InsertOutcome::Created);
/// assert_eq!(map.insert("a", Some(2)), InsertOutcome::Replaced(Some(1)));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InsertOutcome<V> {
    /// A new entry was created.
    Created,
    /// An existing key's payload was overwritten in place, without creating
    /// a node; carries the previous payload. Only reported by unique-keys
    /// maps - maps built with [`OSRBTreeMap::with_duplicates`] always
    /// create.
    Replaced(Option<V>),
}

impl<V> InsertOutcome<V> {
    /// Returns true if the insertion created a new entry.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, InsertOutcome::Created)
    }

    /// Returns true if the insertion overwrote an existing entry.
    #[must_use]
    pub const fn is_replaced(&self) -> bool {
        matches!(self, InsertOutcome::Replaced(_))
    }
}

/// An ordered map from totally-ordered keys to *optional* values, built on
/// a red-black tree with order-statistic augmentation.
///
/// Keys must implement [`Ord`]; entries are kept in sorted key order, and
/// every entry is additionally addressable by its zero-based sorted
/// position (its [`Rank`]) in O(log n).
///
/// Two details set `OSRBTreeMap` apart from the standard ordered maps:
///
/// - **Payloads are optional.** A key stored with `None` is *present* -
///   [`contains_key`](OSRBTreeMap::contains_key) reports `true` and the
///   entry occupies a rank - it simply has no value attached. Accordingly,
///   [`get`](OSRBTreeMap::get) returns `Option<Option<&V>>`: the outer
///   level answers "is the key stored?", the inner one "does it carry a
///   value?".
/// - **Duplicate keys are opt-in.** A map built with
///   [`new`](OSRBTreeMap::new) overwrites payloads on equal keys; one built
///   with [`with_duplicates`](OSRBTreeMap::with_duplicates) stores every
///   insertion as its own entry. Equal keys stay in insertion order: a new
///   duplicate always lands after (to the right of) its equals, and removal
///   takes the earliest-inserted occurrence first. Multiplicities feed the
///   statistics queries ([`occurrences`](OSRBTreeMap::occurrences),
///   [`probability_of`](OSRBTreeMap::probability_of),
///   [`expected_value`](OSRBTreeMap::expected_value)).
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key, as determined by the [`Ord`] trait,
/// changes while it is in the map. This is normally only possible through
/// [`Cell`], [`RefCell`], global state, I/O, or unsafe code. The behavior
/// resulting from such a logic error is not specified, but will be
/// encapsulated to the `OSRBTreeMap` that observed it and not result in
/// undefined behavior.
///
/// # Examples
///
/// ```
/// use osrb_tree::OSRBTreeMap;
///
/// let mut inventory = OSRBTreeMap::new();
///
/// // Stock some items; quantities may be unknown.
/// inventory.insert("bolts", Some(250));
/// inventory.insert("nuts", Some(175));
/// inventory.insert("washers", None);
///
/// assert_eq!(inventory.get(&"nuts"), Some(Some(&175)));
/// assert_eq!(inventory.get(&"washers"), Some(None));
/// assert_eq!(inventory.get(&"rivets"), None);
///
/// // Entries iterate in key order.
/// let names: Vec<_> = inventory.keys().copied().collect();
/// assert_eq!(names, ["bolts", "nuts", "washers"]);
///
/// // And every entry has a rank.
/// assert_eq!(inventory.rank_of(&"nuts"), Some(1));
/// ```
///
/// An `OSRBTreeMap` with a known list of entries can be initialized from an
/// array:
///
/// ```
/// use osrb_tree::OSRBTreeMap;
///
/// let solar_distance = OSRBTreeMap::from([
///     ("Mercury", Some(0.4)),
///     ("Venus", Some(0.7)),
///     ("Earth", Some(1.0)),
///     ("Mars", Some(1.5)),
/// ]);
/// assert_eq!(solar_distance.len(), 4);
/// ```
///
/// [`Cell`]: core::cell::Cell
/// [`RefCell`]: core::cell::RefCell
#[derive(Clone)]
pub struct OSRBTreeMap<K, V> {
    raw: RawOSRBTree<K, V>,
}

/// An iterator over the entries of an `OSRBTreeMap`.
///
/// This `struct` is created by the [`iter`] method on [`OSRBTreeMap`]. See
/// its documentation for more.
///
/// # Examples
///
/// ```
/// use osrb_tree::OSRBTreeMap;
///
/// let map = OSRBTreeMap::from([(1, Some("a")), (2, Some("b"))]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, Some(&"a"))));
/// assert_eq!(iter.next_back(), Some((&2, Some(&"b"))));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: OSRBTreeMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    tree: &'a RawOSRBTree<K, V>,
    front: Handle,
    back: Handle,
    remaining: usize,
}

/// An owning iterator over the entries of an `OSRBTreeMap`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`OSRBTreeMap`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, Option<V>)>,
}

/// An iterator over the keys of an `OSRBTreeMap`.
///
/// This `struct` is created by the [`keys`] method on [`OSRBTreeMap`]. See
/// its documentation for more.
///
/// [`keys`]: OSRBTreeMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the payloads of an `OSRBTreeMap`.
///
/// Yields `Option<&V>`: one item per stored entry, `None` for entries whose
/// payload is absent.
///
/// This `struct` is created by the [`values`] method on [`OSRBTreeMap`].
/// See its documentation for more.
///
/// [`values`]: OSRBTreeMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An owning iterator over the keys of an `OSRBTreeMap`.
///
/// This `struct` is created by the [`into_keys`] method on [`OSRBTreeMap`].
///
/// [`into_keys`]: OSRBTreeMap::into_keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoKeys<K, V> {
    inner: IntoIter<K, V>,
}

/// An owning iterator over the payloads of an `OSRBTreeMap`.
///
/// This `struct` is created by the [`into_values`] method on
/// [`OSRBTreeMap`].
///
/// [`into_values`]: OSRBTreeMap::into_values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoValues<K, V> {
    inner: IntoIter<K, V>,
}

impl<K, V> OSRBTreeMap<K, V> {
    /// Makes a new, empty `OSRBTreeMap` with unique keys: inserting an
    /// already-present key overwrites its payload in place.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    ///
    /// // entries can now be inserted into the empty map
    /// map.insert(1, Some("a"));
    /// ```
    #[must_use]
    pub const fn new() -> OSRBTreeMap<K, V> {
        OSRBTreeMap {
            raw: RawOSRBTree::new(true),
        }
    }

    /// Makes a new, empty `OSRBTreeMap` that permits duplicate keys:
    /// every insertion stores its own entry, and equal keys stay in
    /// insertion order.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut votes: OSRBTreeMap<&str, ()> = OSRBTreeMap::with_duplicates();
    /// votes.insert("yes", None);
    /// votes.insert("yes", None);
    /// votes.insert("no", None);
    ///
    /// assert_eq!(votes.len(), 3);
    /// assert_eq!(votes.occurrences(&"yes"), 2);
    /// ```
    #[must_use]
    pub const fn with_duplicates() -> OSRBTreeMap<K, V> {
        OSRBTreeMap {
            raw: RawOSRBTree::new(false),
        }
    }

    /// Returns true if this map permits duplicate keys.
    ///
    /// The mode is fixed at construction.
    #[must_use]
    pub const fn allows_duplicates(&self) -> bool {
        !self.raw.unique_keys()
    }

    /// Clears the map, removing all entries. Calling this on an empty map
    /// is a no-op.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut a = OSRBTreeMap::new();
    /// a.insert(1, Some("a"));
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of entries in the map, counting every stored
    /// duplicate.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut a = OSRBTreeMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, Some("a"));
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if the map contains no entries.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut a = OSRBTreeMap::new();
    /// assert!(a.is_empty());
    /// a.insert(1, Some("a"));
    /// assert!(!a.is_empty());
    /// ```
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// Yields `(&K, Option<&V>)` pairs; the payload is `None` for entries
    /// stored without a value.
    ///
    /// # Complexity
    ///
    /// O(log n) per item, amortized O(1).
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    /// map.insert(3, Some("c"));
    /// map.insert(1, Some("a"));
    /// map.insert(2, None);
    ///
    /// let entries: Vec<_> = map.iter().collect();
    /// assert_eq!(entries, [(&1, Some(&"a")), (&2, None), (&3, Some(&"c"))]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    ///
    /// Duplicate keys are yielded once per stored occurrence.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map = OSRBTreeMap::from([(2, Some("b")), (1, Some("a"))]);
    /// let keys: Vec<_> = map.keys().copied().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the payloads of the map, in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map = OSRBTreeMap::from([(1, Some("a")), (2, None)]);
    /// let values: Vec<_> = map.values().collect();
    /// assert_eq!(values, [Some(&"a"), None]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Creates a consuming iterator visiting all the keys, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map = OSRBTreeMap::from([(2, Some("b")), (1, Some("a"))]);
    /// let keys: Vec<_> = map.into_keys().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn into_keys(self) -> IntoKeys<K, V> {
        IntoKeys {
            inner: self.into_iter(),
        }
    }

    /// Creates a consuming iterator visiting all the payloads, in key
    /// order.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map = OSRBTreeMap::from([(1, Some("a")), (2, None)]);
    /// let values: Vec<_> = map.into_values().collect();
    /// assert_eq!(values, [Some("a"), None]);
    /// ```
    pub fn into_values(self) -> IntoValues<K, V> {
        IntoValues {
            inner: self.into_iter(),
        }
    }

    /// Renders the internal tree shape as indented text for debugging: one
    /// node per line with its key, color and subtree size.
    ///
    /// The output format is not stable and must not be parsed.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map: OSRBTreeMap<i32, ()> = OSRBTreeMap::from([(2, None), (1, None), (3, None)]);
    /// let dump = map.dump_structure();
    /// assert!(dump.starts_with("root: 2"));
    /// ```
    #[must_use]
    pub fn dump_structure(&self) -> String
    where
        K: fmt::Debug,
    {
        self.raw.dump_structure()
    }
}

impl<K: Ord, V> OSRBTreeMap<K, V> {
    /// Returns the stored payload for `key`.
    ///
    /// The outer `Option` reports whether the key is present at all; the
    /// inner one is the stored payload, which may legitimately be absent.
    /// With duplicate keys, the earliest-inserted occurrence is read.
    ///
    /// The key may be any borrowed form of the map's key type, but the
    /// ordering on the borrowed form *must* match the ordering on the key
    /// type.
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
    /// map.insert(1, Some("a"));
    /// map.insert(2, None);
    /// assert_eq!(map.get(&1), Some(Some(&"a")));
    /// assert_eq!(map.get(&2), Some(None));
    /// assert_eq!(map.get(&3), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<Option<&V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Returns the stored key and payload for `key`.
    ///
    /// Useful for key types where non-identical keys can compare equal, or
    /// for recovering the stored `&K` from a borrowed lookup key.
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
    /// map.insert(1, Some("a"));
    /// assert_eq!(map.get_key_value(&1), Some((&1, Some(&"a"))));
    /// assert_eq!(map.get_key_value(&2), None);
    /// ```
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, Option<&V>)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.find_first(key);
        if handle.is_nil() {
            None
        } else {
            Some(self.raw.entry_at(handle))
        }
    }

    /// Returns a mutable reference to the stored payload for `key`.
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
    /// map.insert(1, Some(10));
    /// if let Some(Some(value)) = map.get_mut(&1) {
    ///     *value += 5;
    /// }
    /// assert_eq!(map.get(&1), Some(Some(&15)));
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<Option<&mut V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_mut(key)
    }

    /// Returns true if the map contains `key`.
    ///
    /// An entry stored with an absent payload still counts as present.
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
    /// map.insert(1, None::<&str>);
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains_key(key)
    }

    /// Inserts `key` with the given optional payload.
    ///
    /// In a unique-keys map, inserting an already-present key overwrites
    /// its payload in place - no node is created, no rank changes - and
    /// reports [`InsertOutcome::Replaced`] with the previous payload. In a
    /// map built with [`with_duplicates`](OSRBTreeMap::with_duplicates)
    /// every insertion creates its own entry, placed after all equal keys.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::{InsertOutcome, OSRBTreeMap};
    ///
    /// let mut map = OSRBTreeMap::new();
    /// assert_eq!(map.insert(37, Some("a")), InsertOutcome::Created);
    /// assert_eq!(map.insert(37, Some("b")), InsertOutcome::Replaced(Some("a")));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: Option<V>) -> InsertOutcome<V> {
        match self.raw.insert(key, value) {
            None => InsertOutcome::Created,
            Some(previous) => InsertOutcome::Replaced(previous),
        }
    }

    /// Removes one occurrence of `key` from the map, returning whether an
    /// entry was removed. Absent keys are a no-op.
    ///
    /// With duplicate keys the earliest-inserted occurrence is removed.
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
    /// map.insert(1, Some("a"));
    /// assert!(map.remove(&1));
    /// assert!(!map.remove(&1));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key).is_some()
    }

    /// Removes one occurrence of `key` from the map, returning the stored
    /// key and payload if the key was present.
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
    /// map.insert(1, Some("a"));
    /// assert_eq!(map.remove_entry(&1), Some((1, Some("a"))));
    /// assert_eq!(map.remove_entry(&1), None);
    /// ```
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, Option<V>)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key)
    }

    /// Removes every occurrence of `key`, returning how many entries were
    /// removed (0 for an absent key).
    ///
    /// # Complexity
    ///
    /// O(m log n) for m removed occurrences.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map: OSRBTreeMap<i32, ()> = OSRBTreeMap::with_duplicates();
    /// map.insert(1, None);
    /// map.insert(1, None);
    /// assert_eq!(map.remove_all_occurrences(&1), 2);
    /// assert_eq!(map.remove_all_occurrences(&1), 0);
    /// ```
    pub fn remove_all_occurrences<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_all(key)
    }

    /// Returns the first entry in sorted order, or `None` if the map is
    /// empty.
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
    /// assert_eq!(map.first(), None);
    /// map.insert(2, Some("b"));
    /// map.insert(1, Some("a"));
    /// assert_eq!(map.first(), Some((&1, Some(&"a"))));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<(&K, Option<&V>)> {
        let handle = self.raw.first();
        if handle.is_nil() {
            None
        } else {
            Some(self.raw.entry_at(handle))
        }
    }

    /// Returns the last entry in sorted order, or `None` if the map is
    /// empty.
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
    /// map.insert(2, Some("b"));
    /// map.insert(1, Some("a"));
    /// assert_eq!(map.last(), Some((&2, Some(&"b"))));
    /// ```
    #[must_use]
    pub fn last(&self) -> Option<(&K, Option<&V>)> {
        let handle = self.raw.last();
        if handle.is_nil() {
            None
        } else {
            Some(self.raw.entry_at(handle))
        }
    }

    /// Removes and returns the first entry in sorted order.
    ///
    /// With duplicate keys, equal keys leave in insertion order.
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
    /// let mut map = OSRBTreeMap::from([(1, Some("a")), (2, Some("b"))]);
    /// assert_eq!(map.pop_first(), Some((1, Some("a"))));
    /// assert_eq!(map.pop_first(), Some((2, Some("b"))));
    /// assert_eq!(map.pop_first(), None);
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, Option<V>)> {
        self.raw.pop_first()
    }

    /// Removes and returns the last entry in sorted order.
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
    /// let mut map = OSRBTreeMap::from([(1, Some("a")), (2, Some("b"))]);
    /// assert_eq!(map.pop_last(), Some((2, Some("b"))));
    /// assert_eq!(map.pop_last(), Some((1, Some("a"))));
    /// assert_eq!(map.pop_last(), None);
    /// ```
    pub fn pop_last(&mut self) -> Option<(K, Option<V>)> {
        self.raw.pop_last()
    }
}

impl<K: Hash, V: Hash> Hash for OSRBTreeMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for entry in self.iter() {
            entry.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OSRBTreeMap<K, V> {
    fn eq(&self, other: &OSRBTreeMap<K, V>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for OSRBTreeMap<K, V> {}

impl<K: PartialOrd, V: PartialOrd> PartialOrd for OSRBTreeMap<K, V> {
    fn partial_cmp(&self, other: &OSRBTreeMap<K, V>) -> Option<core::cmp::Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord> Ord for OSRBTreeMap<K, V> {
    fn cmp(&self, other: &OSRBTreeMap<K, V>) -> core::cmp::Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OSRBTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for OSRBTreeMap<K, V> {
    /// Creates an empty `OSRBTreeMap` with unique keys.
    fn default() -> OSRBTreeMap<K, V> {
        OSRBTreeMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, Option<V>)> for OSRBTreeMap<K, V> {
    /// Collects into a unique-keys map; later payloads win on equal keys.
    fn from_iter<T: IntoIterator<Item = (K, Option<V>)>>(iter: T) -> OSRBTreeMap<K, V> {
        let mut map = OSRBTreeMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, Option<V>)> for OSRBTreeMap<K, V> {
    #[inline]
    fn extend<T: IntoIterator<Item = (K, Option<V>)>>(&mut self, iter: T) {
        iter.into_iter().for_each(move |(key, value)| {
            self.insert(key, value);
        });
    }
}

impl<K: Ord, V, const N: usize> From<[(K, Option<V>); N]> for OSRBTreeMap<K, V> {
    /// Converts a `[(K, Option<V>); N]` into a unique-keys `OSRBTreeMap`.
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map1 = OSRBTreeMap::from([(1, Some(2)), (3, Some(4))]);
    /// let map2: OSRBTreeMap<_, _> = [(1, Some(2)), (3, Some(4))].into();
    /// assert_eq!(map1, map2);
    /// ```
    fn from(arr: [(K, Option<V>); N]) -> OSRBTreeMap<K, V> {
        arr.into_iter().collect()
    }
}

/// Indexes the map by key, yielding the stored payload slot.
///
/// # Panics
///
/// Panics if the key is not present in the map. A present key with an
/// absent payload does not panic; it yields `None`.
///
/// # Examples
///
/// ```
/// use osrb_tree::OSRBTreeMap;
///
/// let map = OSRBTreeMap::from([("a", Some(1)), ("b", None)]);
/// assert_eq!(map[&"a"], Some(1));
/// assert_eq!(map[&"b"], None);
/// ```
impl<K, Q, V> Index<&Q> for OSRBTreeMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = Option<V>;

    fn index(&self, key: &Q) -> &Self::Output {
        let handle = self.raw.find_first(key);
        assert!(!handle.is_nil(), "no entry found for key");
        self.raw.payload_at(handle)
    }
}

impl<'a, K, V> IntoIterator for &'a OSRBTreeMap<K, V> {
    type Item = (&'a K, Option<&'a V>);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> IntoIterator for OSRBTreeMap<K, V> {
    type Item = (K, Option<V>);
    type IntoIter = IntoIter<K, V>;

    /// Creates a consuming iterator over the entries in sorted key order.
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, Option<&'a V>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.front;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.front = self.tree.successor(handle);
        }
        Some(self.tree.entry_at(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.back;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.back = self.tree.predecessor(handle);
        }
        Some(self.tree.entry_at(handle))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, Option<V>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("remaining", &self.inner.len()).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys").field("remaining", &self.inner.remaining).finish()
    }
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = Option<&'a V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Values").field("remaining", &self.inner.remaining).finish()
    }
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> Iterator for IntoKeys<K, V> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoKeys<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for IntoKeys<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoKeys<K, V> {}

impl<K: fmt::Debug, V> fmt::Debug for IntoKeys<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoKeys").field("remaining", &self.inner.inner.len()).finish()
    }
}

impl<K, V> Iterator for IntoValues<K, V> {
    type Item = Option<V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoValues<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for IntoValues<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoValues<K, V> {}

impl<K, V: fmt::Debug> fmt::Debug for IntoValues<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoValues").field("remaining", &self.inner.inner.len()).finish()
    }
}
