//! A height-balanced binary search tree with parent back-pointers.

use std::cmp::{self, Ordering};
use std::fmt;
use std::io::{self, Write};
use std::ptr::NonNull;

use crate::queue::Queue;

/// An AVL tree over ordered keys.
///
/// Every node caches the height of the subtree rooted at it (a leaf has
/// height 0) and keeps a non-owning back-pointer to its structural parent.
/// Insertion restores balance with at most one single or double rotation.
pub struct AvlTree<K: Ord> {
    root: Link<K>,
}

struct Node<K> {
    key: K,
    left: Link<K>,
    right: Link<K>,
    parent: Link<K>,
    height: usize,
}

type NodePtr<K> = NonNull<Node<K>>;
type Link<K> = Option<NodePtr<K>>;

/// Selects how much information the diagnostic writers emit per node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PrintMode {
    /// Only the key.
    Simple,
    /// Key, addresses, height and balance factor.
    Verbose,
}

impl<K: Ord> AvlTree<K> {
    /// Creates an empty tree.
    /// No memory is allocated until the first key is inserted.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Returns true if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the height of the root node, or 0 for an empty tree.
    pub fn height(&self) -> usize {
        Self::height_of(self.root)
    }

    /// Clears the tree, deallocating all nodes.
    pub fn clear(&mut self) {
        Self::drop_subtree(self.root);
        self.root = None;
    }

    /// Returns a reference to the stored key equal to the given key.
    pub fn get(&self, key: &K) -> Option<&K> {
        if let Some(node_ptr) = self.find(key) {
            return Some(&unsafe { &*node_ptr.as_ptr() }.key);
        }
        None
    }

    /// Inserts a key into the tree, rebalancing as needed.
    /// Returns false if the key was already present; the tree is left
    /// untouched then, down to the heights of the nodes on the search path.
    pub fn insert(&mut self, key: K) -> bool {
        let (mut new_root_ptr, inserted) = Self::insert_at(self.root, key);
        unsafe {
            new_root_ptr.as_mut().parent = None;
        }
        self.root = Some(new_root_ptr);
        inserted
    }

    /// Visits every key in ascending order.
    pub fn traverse_inorder<F: FnMut(&K)>(&self, mut visit: F) {
        Self::inorder_at(self.root, &mut |node_ptr| {
            visit(&unsafe { &*node_ptr.as_ptr() }.key)
        });
    }

    /// Visits the root first, then the left and right subtrees each in
    /// ascending order. This is not a conventional pre-order walk; only the
    /// root is moved to the front.
    pub fn traverse_preorder<F: FnMut(&K)>(&self, mut visit: F) {
        Self::preorder_at(self.root, &mut |node_ptr| {
            visit(&unsafe { &*node_ptr.as_ptr() }.key)
        });
    }

    /// Visits every key level by level, left to right within a level.
    /// `Some(key)` is a visited node, `None` marks the end of a level.
    ///
    /// Levels are delimited by sentinel entries in the work queue, and the
    /// sentinel that drains last signals one final boundary: a tree with L
    /// levels produces L + 1 `None` calls. An empty tree produces no calls
    /// at all.
    pub fn traverse_level_order<F: FnMut(Option<&K>)>(&self, mut visit: F) {
        let root_ptr = match self.root {
            None => return,
            Some(root_ptr) => root_ptr,
        };

        let mut queue: Queue<Link<K>> = Queue::new();
        queue.push_back(Some(root_ptr));
        queue.push_back(None);

        while !queue.is_empty() {
            if let Some(Some(node_ptr)) = queue.pop_front() {
                unsafe {
                    if let Some(left_ptr) = node_ptr.as_ref().left {
                        queue.push_back(Some(left_ptr));
                    }
                    if let Some(right_ptr) = node_ptr.as_ref().right {
                        queue.push_back(Some(right_ptr));
                    }
                    visit(Some(&node_ptr.as_ref().key));
                }
            }

            // A sentinel (or nothing at all) at the front means the current
            // level is exhausted: reseed the sentinel behind the last level
            // and report the boundary.
            if queue.front().map_or(true, |link| link.is_none()) {
                queue.push_back(None);
                queue.pop_front();
                visit(None);
            }
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        unsafe {
            // Check root link
            if let Some(root_ptr) = self.root {
                assert!(root_ptr.as_ref().parent.is_none());
            }

            // Check tree nodes
            Self::inorder_at(self.root, &mut |node_ptr| {
                let mut height = 0;
                let mut left_height = 0;
                let mut right_height = 0;

                // Check link for left child node
                if let Some(left_ptr) = node_ptr.as_ref().left {
                    assert!(left_ptr.as_ref().parent == Some(node_ptr));
                    assert!(left_ptr.as_ref().key < node_ptr.as_ref().key);
                    left_height = left_ptr.as_ref().height + 1;
                    height = cmp::max(height, left_height);
                }

                // Check link for right child node
                if let Some(right_ptr) = node_ptr.as_ref().right {
                    assert!(right_ptr.as_ref().parent == Some(node_ptr));
                    assert!(right_ptr.as_ref().key > node_ptr.as_ref().key);
                    right_height = right_ptr.as_ref().height + 1;
                    height = cmp::max(height, right_height);
                }

                // Check height
                assert_eq!(node_ptr.as_ref().height, height);

                // Check AVL condition (near balance)
                assert!(left_height <= right_height + 1);
                assert!(right_height <= left_height + 1);
            });
        }
    }

    fn find(&self, key: &K) -> Link<K> {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            current = unsafe {
                match key.cmp(&node_ptr.as_ref().key) {
                    Ordering::Equal => break,
                    Ordering::Less => node_ptr.as_ref().left,
                    Ordering::Greater => node_ptr.as_ref().right,
                }
            }
        }
        current
    }

    /// Inserts into the subtree rooted at `link` and returns the subtree's
    /// new root, which the caller must rewire into its own child link.
    /// The second component reports whether a node was actually created.
    fn insert_at(link: Link<K>, key: K) -> (NodePtr<K>, bool) {
        let mut node_ptr = match link {
            None => return (Node::create(None, key), true),
            Some(node_ptr) => node_ptr,
        };
        unsafe {
            match key.cmp(&node_ptr.as_ref().key) {
                Ordering::Less => {
                    let (mut child_ptr, inserted) = Self::insert_at(node_ptr.as_ref().left, key);
                    child_ptr.as_mut().parent = Some(node_ptr);
                    node_ptr.as_mut().left = Some(child_ptr);
                    if !inserted {
                        return (node_ptr, false);
                    }
                }
                Ordering::Greater => {
                    let (mut child_ptr, inserted) = Self::insert_at(node_ptr.as_ref().right, key);
                    child_ptr.as_mut().parent = Some(node_ptr);
                    node_ptr.as_mut().right = Some(child_ptr);
                    if !inserted {
                        return (node_ptr, false);
                    }
                }
                // Key already present, leave the node untouched
                Ordering::Equal => return (node_ptr, false),
            }

            node_ptr.as_mut().height = cmp::max(
                Self::height_of(node_ptr.as_ref().left),
                Self::height_of(node_ptr.as_ref().right),
            ) + 1;
            (Self::balance(node_ptr), true)
        }
    }

    /// Height of a possibly absent subtree: 0 when absent, else the cached
    /// height of its root. Note that a leaf also reports 0; the balance
    /// factor uses its own child contribution rule to tell the two apart.
    fn height_of(link: Link<K>) -> usize {
        match link {
            None => 0,
            Some(node_ptr) => unsafe { node_ptr.as_ref().height },
        }
    }

    /// Recomputed height after a rotation: 0 for a node without children,
    /// else one more than the taller subtree.
    fn updated_height(node_ptr: NodePtr<K>) -> usize {
        unsafe {
            let node = node_ptr.as_ref();
            if node.left.is_none() && node.right.is_none() {
                0
            } else {
                cmp::max(Self::height_of(node.left), Self::height_of(node.right)) + 1
            }
        }
    }

    /// Balance factor of a node: left child contribution minus right child
    /// contribution, where a present child contributes its height plus one
    /// and an absent child contributes 0. +2 means left-heavy by two.
    fn balance_factor(node_ptr: NodePtr<K>) -> isize {
        unsafe {
            let node = node_ptr.as_ref();
            let left_height = node
                .left
                .map_or(0, |left_ptr| left_ptr.as_ref().height as isize + 1);
            let right_height = node
                .right
                .map_or(0, |right_ptr| right_ptr.as_ref().height as isize + 1);
            left_height - right_height
        }
    }

    /// Rotates the subtree right around its root and returns the new root
    /// (the former left child). No-op without a left child.
    ///
    /// ```text
    ///      |       |
    ///      X       Y
    ///     /   ->    \
    ///    Y           X
    /// ```
    fn rotate_right(mut node_ptr: NodePtr<K>) -> NodePtr<K> {
        unsafe {
            let mut left_ptr = match node_ptr.as_ref().left {
                None => return node_ptr,
                Some(left_ptr) => left_ptr,
            };

            node_ptr.as_mut().left = left_ptr.as_ref().right;
            left_ptr.as_mut().parent = node_ptr.as_ref().parent;
            node_ptr.as_mut().parent = Some(left_ptr);

            if let Some(mut moved_ptr) = left_ptr.as_ref().right {
                moved_ptr.as_mut().parent = Some(node_ptr);
            }

            left_ptr.as_mut().right = Some(node_ptr);
            node_ptr.as_mut().height = Self::updated_height(node_ptr);
            left_ptr.as_mut().height = Self::updated_height(left_ptr);
            left_ptr
        }
    }

    /// Rotates the subtree left around its root and returns the new root
    /// (the former right child). No-op without a right child.
    ///
    /// ```text
    ///    |          |
    ///    X          Y
    ///     \   ->   /
    ///      Y      X
    /// ```
    fn rotate_left(mut node_ptr: NodePtr<K>) -> NodePtr<K> {
        unsafe {
            let mut right_ptr = match node_ptr.as_ref().right {
                None => return node_ptr,
                Some(right_ptr) => right_ptr,
            };

            node_ptr.as_mut().right = right_ptr.as_ref().left;
            right_ptr.as_mut().parent = node_ptr.as_ref().parent;
            node_ptr.as_mut().parent = Some(right_ptr);

            if let Some(mut moved_ptr) = right_ptr.as_ref().left {
                moved_ptr.as_mut().parent = Some(node_ptr);
            }

            right_ptr.as_mut().left = Some(node_ptr);
            node_ptr.as_mut().height = Self::updated_height(node_ptr);
            right_ptr.as_mut().height = Self::updated_height(right_ptr);
            right_ptr
        }
    }

    /// Left rotation of the left child followed by a right rotation.
    fn rotate_left_right(mut node_ptr: NodePtr<K>) -> NodePtr<K> {
        unsafe {
            if let Some(left_ptr) = node_ptr.as_ref().left {
                node_ptr.as_mut().left = Some(Self::rotate_left(left_ptr));
            }
            Self::rotate_right(node_ptr)
        }
    }

    /// Right rotation of the right child followed by a left rotation.
    fn rotate_right_left(mut node_ptr: NodePtr<K>) -> NodePtr<K> {
        unsafe {
            if let Some(right_ptr) = node_ptr.as_ref().right {
                node_ptr.as_mut().right = Some(Self::rotate_right(right_ptr));
            }
            Self::rotate_left(node_ptr)
        }
    }

    /// Restores balance at a node whose subtrees differ in height by two
    /// and returns the subtree's new root.
    ///
    /// A child balance factor of 0 under a magnitude-2 factor is left
    /// unrotated; that combination never arises from insertions alone.
    fn balance(node_ptr: NodePtr<K>) -> NodePtr<K> {
        let factor = Self::balance_factor(node_ptr);
        unsafe {
            if factor == 2 {
                let left_ptr = node_ptr.as_ref().left.unwrap();
                match Self::balance_factor(left_ptr) {
                    1 => return Self::rotate_right(node_ptr),
                    -1 => return Self::rotate_left_right(node_ptr),
                    _ => {}
                }
            } else if factor == -2 {
                let right_ptr = node_ptr.as_ref().right.unwrap();
                match Self::balance_factor(right_ptr) {
                    -1 => return Self::rotate_left(node_ptr),
                    1 => return Self::rotate_right_left(node_ptr),
                    _ => {}
                }
            }
        }
        node_ptr
    }

    fn inorder_at<F: FnMut(NodePtr<K>)>(link: Link<K>, visit: &mut F) {
        if let Some(node_ptr) = link {
            unsafe {
                Self::inorder_at(node_ptr.as_ref().left, visit);
                visit(node_ptr);
                Self::inorder_at(node_ptr.as_ref().right, visit);
            }
        }
    }

    fn preorder_at<F: FnMut(NodePtr<K>)>(link: Link<K>, visit: &mut F) {
        if let Some(node_ptr) = link {
            unsafe {
                visit(node_ptr);
                Self::inorder_at(node_ptr.as_ref().left, visit);
                Self::inorder_at(node_ptr.as_ref().right, visit);
            }
        }
    }

    /// Frees a whole subtree in post-order, detaching each node's parent
    /// link before the node itself is destroyed.
    fn drop_subtree(link: Link<K>) {
        if let Some(mut node_ptr) = link {
            unsafe {
                Self::drop_subtree(node_ptr.as_ref().left);
                Self::drop_subtree(node_ptr.as_ref().right);
                node_ptr.as_mut().parent = None;
                Node::destroy(node_ptr);
            }
        }
    }
}

impl<K: Ord + fmt::Display> AvlTree<K> {
    /// Writes every key in ascending order.
    pub fn write_inorder<W: Write>(&self, out: &mut W, mode: PrintMode) -> io::Result<()> {
        Self::write_inorder_at(self.root, out, mode)
    }

    /// Writes the root first, then both subtrees in ascending order,
    /// mirroring [`AvlTree::traverse_preorder`].
    pub fn write_preorder<W: Write>(&self, out: &mut W, mode: PrintMode) -> io::Result<()> {
        if let Some(node_ptr) = self.root {
            unsafe {
                Self::write_node(node_ptr, out, mode)?;
                Self::write_inorder_at(node_ptr.as_ref().left, out, mode)?;
                Self::write_inorder_at(node_ptr.as_ref().right, out, mode)?;
            }
        }
        Ok(())
    }

    /// Writes the keys level by level, one line per level, preceded by a
    /// blank line. Always uses the simple per-node format.
    pub fn write_breadth_first<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let root_ptr = match self.root {
            None => return Ok(()),
            Some(root_ptr) => root_ptr,
        };

        let mut queue: Queue<Link<K>> = Queue::new();
        queue.push_back(Some(root_ptr));
        queue.push_back(None);

        writeln!(out)?;
        while !queue.is_empty() {
            if let Some(Some(node_ptr)) = queue.pop_front() {
                unsafe {
                    if let Some(left_ptr) = node_ptr.as_ref().left {
                        queue.push_back(Some(left_ptr));
                    }
                    if let Some(right_ptr) = node_ptr.as_ref().right {
                        queue.push_back(Some(right_ptr));
                    }
                    Self::write_node(node_ptr, out, PrintMode::Simple)?;
                }
            }

            if queue.front().map_or(true, |link| link.is_none()) {
                queue.push_back(None);
                queue.pop_front();
                writeln!(out)?;
            }
        }
        Ok(())
    }

    fn write_inorder_at<W: Write>(link: Link<K>, out: &mut W, mode: PrintMode) -> io::Result<()> {
        if let Some(node_ptr) = link {
            unsafe {
                Self::write_inorder_at(node_ptr.as_ref().left, out, mode)?;
                Self::write_node(node_ptr, out, mode)?;
                Self::write_inorder_at(node_ptr.as_ref().right, out, mode)?;
            }
        }
        Ok(())
    }

    fn write_node<W: Write>(node_ptr: NodePtr<K>, out: &mut W, mode: PrintMode) -> io::Result<()> {
        let node = unsafe { node_ptr.as_ref() };
        match mode {
            PrintMode::Simple => write!(out, "{} ", node.key),
            PrintMode::Verbose => {
                let as_addr = |link: Link<K>| {
                    link.map_or(std::ptr::null(), |ptr| ptr.as_ptr() as *const Node<K>)
                };
                writeln!(out)?;
                writeln!(out, "Value in node: {}", node.key)?;
                writeln!(out, "Node at address: {:p}", node_ptr.as_ptr())?;
                writeln!(out, "Height: {}", node.height)?;
                writeln!(out, "Parent address: {:p}", as_addr(node.parent))?;
                writeln!(out, "Left child address: {:p}", as_addr(node.left))?;
                writeln!(out, "Right child address: {:p}", as_addr(node.right))?;
                writeln!(out, "Balance Factor: {}", Self::balance_factor(node_ptr))
            }
        }
    }
}

impl<K: Ord> Drop for AvlTree<K> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Ord> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> Node<K> {
    fn create(parent: Link<K>, key: K) -> NodePtr<K> {
        let boxed = Box::new(Node {
            key,
            parent,
            left: None,
            right: None,
            height: 0,
        });
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    unsafe fn destroy(node_ptr: NodePtr<K>) {
        drop(Box::from_raw(node_ptr.as_ptr()));
    }
}

#[cfg(test)]
mod tests {
    use super::{AvlTree, Node, NodePtr};

    // Hand-built subtree: 4 with left child 2 and grandchildren 1 and 3.
    // Balance factor at 4 is +2 while the factor at 2 is 0.
    fn left_heavy_even_subtree() -> NodePtr<i32> {
        unsafe {
            let mut root = Node::create(None, 4);
            let mut left = Node::create(Some(root), 2);
            let left_left = Node::create(Some(left), 1);
            let left_right = Node::create(Some(left), 3);
            left.as_mut().left = Some(left_left);
            left.as_mut().right = Some(left_right);
            left.as_mut().height = 1;
            root.as_mut().left = Some(left);
            root.as_mut().height = 2;
            root
        }
    }

    #[test]
    fn balance_ignores_even_child_factor() {
        // A magnitude-2 factor whose child factor is 0 is not rotated.
        // Insertions never produce this shape; it is pinned down here so a
        // change to the fall-through does not go unnoticed.
        let root = left_heavy_even_subtree();
        assert_eq!(AvlTree::balance_factor(root), 2);
        assert_eq!(
            AvlTree::balance_factor(unsafe { root.as_ref().left.unwrap() }),
            0
        );

        let returned = AvlTree::balance(root);
        assert_eq!(returned, root);
        assert_eq!(AvlTree::balance_factor(root), 2);
        unsafe {
            assert_eq!(root.as_ref().height, 2);
            assert_eq!(root.as_ref().left.unwrap().as_ref().key, 2);
            assert!(root.as_ref().right.is_none());
        }

        AvlTree::drop_subtree(Some(root));
    }

    #[test]
    fn balance_leaves_settled_nodes_alone() {
        let mut tree = AvlTree::new();
        tree.insert(2);
        tree.insert(1);
        tree.insert(3);
        let root = tree.root.unwrap();
        assert_eq!(AvlTree::balance_factor(root), 0);
        assert_eq!(AvlTree::balance(root), root);
    }

    #[test]
    fn rotation_without_pivot_is_a_noop() {
        let mut tree = AvlTree::new();
        tree.insert(1);
        let root = tree.root.unwrap();
        assert_eq!(AvlTree::rotate_left(root), root);
        assert_eq!(AvlTree::rotate_right(root), root);
        unsafe {
            assert_eq!(root.as_ref().height, 0);
        }
    }

    #[test]
    fn single_left_rotation_reroots_the_middle_key() {
        let mut tree = AvlTree::new();
        tree.insert(1);
        tree.insert(2);
        tree.insert(3);
        tree.check_consistency();

        unsafe {
            let root = tree.root.unwrap();
            assert_eq!(root.as_ref().key, 2);
            assert_eq!(root.as_ref().height, 1);
            assert_eq!(root.as_ref().left.unwrap().as_ref().key, 1);
            assert_eq!(root.as_ref().right.unwrap().as_ref().key, 3);
        }
    }

    #[test]
    fn double_rotations_reroot_the_middle_key() {
        // Left-right case
        let mut tree = AvlTree::new();
        tree.insert(3);
        tree.insert(1);
        tree.insert(2);
        tree.check_consistency();
        unsafe {
            let root = tree.root.unwrap();
            assert_eq!(root.as_ref().key, 2);
            assert_eq!(root.as_ref().left.unwrap().as_ref().key, 1);
            assert_eq!(root.as_ref().right.unwrap().as_ref().key, 3);
        }

        // Right-left case
        let mut tree = AvlTree::new();
        tree.insert(1);
        tree.insert(3);
        tree.insert(2);
        tree.check_consistency();
        unsafe {
            let root = tree.root.unwrap();
            assert_eq!(root.as_ref().key, 2);
            assert_eq!(root.as_ref().left.unwrap().as_ref().key, 1);
            assert_eq!(root.as_ref().right.unwrap().as_ref().key, 3);
        }
    }

    #[test]
    fn duplicate_insert_preserves_leaf_heights() {
        let mut tree = AvlTree::new();
        tree.insert(2);
        tree.insert(1);
        tree.insert(3);

        // Re-inserting a leaf key must not touch the stored heights on the
        // search path, in particular not the height of the matched leaf.
        assert!(!tree.insert(3));
        unsafe {
            let root = tree.root.unwrap();
            assert_eq!(root.as_ref().height, 1);
            assert_eq!(root.as_ref().right.unwrap().as_ref().height, 0);
        }
        tree.check_consistency();
    }
}
