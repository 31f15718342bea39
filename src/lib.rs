//! A height-balanced binary search tree (AVL tree) over ordered keys,
//! together with the doubly linked queue its level-order traversal runs on.
//!
//! ```
//! use avltree::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! for key in [2, 1, 3] {
//!     tree.insert(key);
//! }
//!
//! let mut sorted = Vec::new();
//! tree.traverse_inorder(|key| sorted.push(*key));
//! assert_eq!(sorted, [1, 2, 3]);
//! ```
//!
//! The `consistency_check` feature exposes internal structure checkers
//! that are otherwise compiled only into the tests.

mod queue;
mod tree;

pub use queue::Queue;
pub use tree::{AvlTree, PrintMode};
