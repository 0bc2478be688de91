//! A scapegoat tree for Rust.
//!
//! This crate provides [`ScapegoatTree`], an ordered set that keeps itself balanced without
//! storing any per-node balance data: no heights, no colours and no parent links. Instead:
//!
//! - An insertion that lands too deep walks back up its path, finds the lowest ancestor whose
//!   subtree is too deep for its size (the *scapegoat*) and rebuilds that subtree into perfect
//!   balance, in place and without allocating.
//! - A run of deletions that shrinks the tree well below its historical maximum triggers one
//!   rebuild of the whole tree.
//! - How much imbalance is tolerated is set per tree by a [`BalanceFactor`] between `0`
//!   (strict) and `1000` (never rebuild on insertion).
//!
//! Navigation without parent links goes through [`Cursor`], which records its root-to-node
//! path and walks back along it.
//!
//! # Example
//!
//! ```
//! use scapegoat_tree::ScapegoatTree;
//!
//! let mut tree = ScapegoatTree::with_balance(250);
//! for word in ["kiwi", "apple", "fig", "cherry", "banana"] {
//!     tree.add(word);
//! }
//!
//! assert_eq!(tree.len(), 5);
//! assert_eq!(tree.min(), Some(&"apple"));
//! assert_eq!(tree.get(&"fig"), Some(&"fig"));
//!
//! // Everything from "c" onwards.
//! let tail: Vec<_> = tree.iter_from(&"c").copied().collect();
//! assert_eq!(tail, ["cherry", "fig", "kiwi"]);
//!
//! // Step around with a cursor.
//! let mut cursor = tree.cursor(&"cherry");
//! assert_eq!(cursor.move_prev().key(), Some(&"banana"));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Custom ordering** - Any `Fn(&T, &T) -> Ordering` comparator, not just [`Ord`]
//! - **Bulk construction** - [`ScapegoatTree::from_keys`] and [`FromIterator`] build a
//!   perfectly balanced tree directly
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to their children by index. Rebuilding uses the
//! Day–Stout–Warren transform: right rotations flatten the subtree into a sorted *vine*, then
//! rounds of left rotations fold it into a complete tree, reusing every node. Rebuilds are
//! logged at `debug` level through [`tracing`](https://docs.rs/tracing).
//!
//! The tree is not synchronized. Share it across threads only behind external locking.

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

mod balance;
mod raw;

pub mod scapegoat_tree;

pub use balance::{BalanceFactor, BalanceFactorError};
pub use scapegoat_tree::{Cursor, ScapegoatTree};
