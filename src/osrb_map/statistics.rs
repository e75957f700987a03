use core::borrow::Borrow;

use super::OSRBTreeMap;

// Occurrence counts fit in f64's integer range for any realistic tree, so
// the lossy casts below are benign.
#[allow(clippy::cast_precision_loss)]
impl<K: Ord, V> OSRBTreeMap<K, V> {
    /// Returns the number of stored occurrences of `key`: 0 when absent, 1
    /// in a unique-keys map, possibly more in a map built with
    /// [`with_duplicates`](OSRBTreeMap::with_duplicates).
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
    /// let mut grades: OSRBTreeMap<char, ()> = OSRBTreeMap::with_duplicates();
    /// for grade in ['b', 'a', 'b', 'c', 'b'] {
    ///     grades.insert(grade, None);
    /// }
    ///
    /// assert_eq!(grades.occurrences(&'b'), 3);
    /// assert_eq!(grades.occurrences(&'f'), 0);
    /// ```
    #[must_use]
    pub fn occurrences<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.occurrences(key)
    }

    /// Sums the occurrence counts of every key in `keys`. Absent keys
    /// contribute 0; a missing key never fails the batch.
    ///
    /// # Complexity
    ///
    /// O(k log n) for k queried keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut grades: OSRBTreeMap<char, ()> = OSRBTreeMap::with_duplicates();
    /// for grade in ['b', 'a', 'b', 'c', 'b'] {
    ///     grades.insert(grade, None);
    /// }
    ///
    /// assert_eq!(grades.occurrences_of([&'a', &'b', &'f']), 4);
    /// ```
    pub fn occurrences_of<'q, Q, I>(&self, keys: I) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord + 'q,
        I: IntoIterator<Item = &'q Q>,
    {
        keys.into_iter().map(|key| self.raw.occurrences(key)).sum()
    }

    /// Returns the empirical probability that an entry drawn uniformly at
    /// random from the map has a key in `keys`.
    ///
    /// Defined as `occurrences_of(keys) / len()`; an empty map yields 0.0
    /// rather than dividing by zero.
    ///
    /// # Complexity
    ///
    /// O(k log n) for k queried keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut draws: OSRBTreeMap<&str, ()> = OSRBTreeMap::with_duplicates();
    /// for color in ["red", "blue", "red"] {
    ///     draws.insert(color, None);
    /// }
    ///
    /// assert!((draws.probability_of([&"red"]) - 2.0 / 3.0).abs() < 1e-12);
    /// assert_eq!(draws.probability_of([&"green"]), 0.0);
    /// ```
    pub fn probability_of<'q, Q, I>(&self, keys: I) -> f64
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord + 'q,
        I: IntoIterator<Item = &'q Q>,
    {
        if self.is_empty() {
            return 0.0;
        }
        self.occurrences_of(keys) as f64 / self.len() as f64
    }

    /// Returns the fraction of stored entries satisfying `predicate`.
    ///
    /// An empty map yields 0.0.
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
    /// let map = OSRBTreeMap::from([(1, Some(10)), (2, None), (3, Some(30)), (4, Some(40))]);
    /// let with_payload = map.probability_where(|_, value| value.is_some());
    /// assert!((with_payload - 0.75).abs() < 1e-12);
    /// ```
    pub fn probability_where<F>(&self, mut predicate: F) -> f64
    where
        F: FnMut(&K, Option<&V>) -> bool,
    {
        if self.is_empty() {
            return 0.0;
        }
        let matches = self.iter().filter(|&(key, value)| predicate(key, value)).count();
        matches as f64 / self.len() as f64
    }

    /// Returns the expected number of hits on `keys` over `trials`
    /// independent uniform draws: `trials * probability_of(keys)`.
    ///
    /// This is a Bernoulli-style expectation, not a distribution model.
    ///
    /// # Complexity
    ///
    /// O(k log n) for k queried keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut die: OSRBTreeMap<u8, ()> = OSRBTreeMap::with_duplicates();
    /// for face in 1..=6 {
    ///     die.insert(face, None);
    /// }
    ///
    /// // Rolling 60 times, a single face is expected 10 times.
    /// assert!((die.expected_value(60, [&3]) - 10.0).abs() < 1e-12);
    /// ```
    pub fn expected_value<'q, Q, I>(&self, trials: usize, keys: I) -> f64
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord + 'q,
        I: IntoIterator<Item = &'q Q>,
    {
        trials as f64 * self.probability_of(keys)
    }
}
