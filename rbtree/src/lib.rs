//! An ordered map backed by a red-black tree.
//!
//! ```
//! use rbtree::RedBlackTree;
//!
//! let mut tree = RedBlackTree::new();
//! for key in [8, 18, 5, 15, 17, 25, 40, 80] {
//!     tree.insert(key, key * 10);
//! }
//!
//! assert_eq!(tree.get(&15), Some(&150));
//! assert_eq!(tree.remove(&15), Some((15, 150)));
//! assert_eq!(tree.keys(), [5, 8, 17, 18, 25, 40, 80]);
//! assert!(tree.is_valid());
//! ```

#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

mod bounds;
mod red_black_tree;
mod validate;

#[cfg(test)]
mod test_utils;

pub use bounds::{Bounded, STRING_MAX_BOUND_LEN};
pub use red_black_tree::{Color, NodeSnapshot, RedBlackTree};
pub use validate::Violation;
