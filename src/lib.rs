//! Order-statistic red-black tree collections for Rust.
//!
//! This crate provides [`OSRBTreeMap`], an ordered map from totally-ordered
//! keys to *optional* values with O(log n) order-statistic operations and
//! multiset-style statistics:
//!
//! - [`get_by_rank`](OSRBTreeMap::get_by_rank) - Get the entry at a given sorted position
//! - [`rank_of`](OSRBTreeMap::rank_of) - Get the sorted position of a key
//! - Indexing by [`Rank`] - e.g., `map[Rank(0)]` for the first entry
//! - [`occurrences`](OSRBTreeMap::occurrences) / [`probability_of`](OSRBTreeMap::probability_of) /
//!   [`expected_value`](OSRBTreeMap::expected_value) - Multiplicity and empirical-probability
//!   queries over trees that permit duplicate keys
//!
//! # Example
//!
//! ```
//! use osrb_tree::{InsertOutcome, OSRBTreeMap, Rank};
//!
//! let mut scores = OSRBTreeMap::new();
//! scores.insert("Alice", Some(100));
//! scores.insert("Bob", Some(85));
//! scores.insert("Carol", None); // registered, score pending
//!
//! // Standard dictionary operations work as expected.
//! assert_eq!(scores.get(&"Bob"), Some(Some(&85)));
//! assert_eq!(scores.get(&"Carol"), Some(None));
//! assert_eq!(scores.len(), 3);
//!
//! // Order-statistic operations (O(log n)).
//! let (name, score) = scores.get_by_rank(1).unwrap();
//! assert_eq!((*name, score), ("Bob", Some(&85)));
//! assert_eq!(scores.rank_of(&"Carol"), Some(2));
//! assert_eq!(scores[Rank(0)], Some(100));
//!
//! // Re-inserting an existing key overwrites in place.
//! let outcome = scores.insert("Carol", Some(92));
//! assert_eq!(outcome, InsertOutcome::Replaced(None));
//! ```
//!
//! Duplicate keys are permitted when the map is built with
//! [`with_duplicates`](OSRBTreeMap::with_duplicates); occurrence counts and
//! probabilities then reflect multiplicity:
//!
//! ```
//! use osrb_tree::OSRBTreeMap;
//!
//! let mut rolls: OSRBTreeMap<u8, ()> = OSRBTreeMap::with_duplicates();
//! for roll in [3, 1, 3] {
//!     rolls.insert(roll, None);
//! }
//!
//! assert_eq!(rolls.occurrences(&3), 2);
//! assert!((rolls.probability_of([&3]) - 2.0 / 3.0).abs() < 1e-12);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **O(log n) rank operations** - Efficient order-statistic queries via subtree size augmentation
//! - **Optional payloads** - A stored-but-absent value is distinct from an absent key
//! - **Multiset mode** - Duplicate keys kept in insertion order, with occurrence counting
//!
//! # Implementation
//!
//! The map is a red-black binary search tree over an arena of nodes addressed
//! by stable integer handles. Each node tracks the size of its subtree,
//! enabling O(log n) rank-based access without full traversal. A reserved
//! sentinel handle stands in for "no child"/"no parent", so structural code
//! compares identities instead of unwrapping options.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod order_statistic;
mod raw;

pub mod osrb_map;

pub use order_statistic::Rank;
pub use osrb_map::{InsertOutcome, OSRBTreeMap};
