/// A zero-based rank into the sorted order of a map.
///
/// This is an order-statistic extension and is not part of the standard
/// ordered-map APIs.
///
/// # Examples
///
/// ```
/// use osrb_tree::{OSRBTreeMap, Rank};
///
/// let mut map = OSRBTreeMap::new();
/// map.insert("a", Some(10));
/// map.insert("b", Some(20));
///
/// assert_eq!(map[Rank(0)], Some(10));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
