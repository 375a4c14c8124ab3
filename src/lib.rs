//! # avl-rs
//!
//! A height-balanced binary search tree (AVL) used as an ordered map, with a
//! subtree aggregation query.
//!
//! Every node caches the height of its subtree. After each insert or delete
//! the nodes along the affected path are rebalanced so that sibling subtrees
//! never differ in height by more than one, which keeps lookup, insertion and
//! deletion at `O(log n)`.
//!
//! Duplicate keys are kept rather than merged: inserting a key that is already
//! present adds another node to the right of the existing one, and
//! [`AvlTree::find`] returns the first match on the search path.
//!
//! ## Example
//!
//! ```rust
//! use avl_rs::AvlTree;
//!
//! let mut tree: AvlTree<u32, Vec<&str>> = AvlTree::new();
//! tree.insert(50, vec!["P1"]);
//! tree.insert(30, vec!["P2", "P3"]);
//! tree.insert(70, vec![]);
//! tree.insert(20, vec!["P4"]);
//!
//! assert_eq!(tree.find(&30), Some(&vec!["P2", "P3"]));
//!
//! // 30 and everything below it.
//! let mut recommended = tree.recommend(&30);
//! recommended.sort();
//! assert_eq!(recommended, vec![&"P2", &"P3", &"P4"]);
//! ```

#![deny(unsafe_code)]

mod contribute;

pub use contribute::Contribute;

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

use tracing::trace;

// =============================================================================
// Nodes
// =============================================================================

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    /// Height of the subtree rooted here. A leaf has height 1.
    height: u32,
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        })
    }

    #[inline]
    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    #[inline]
    fn balance(&self) -> i32 {
        height(&self.left) as i32 - height(&self.right) as i32
    }
}

#[inline]
fn height<K, V>(link: &Link<K, V>) -> u32 {
    link.as_ref().map_or(0, |node| node.height)
}

#[inline]
fn balance<K, V>(link: &Link<K, V>) -> i32 {
    link.as_ref().map_or(0, |node| node.balance())
}

/// Follows left links down to the smallest key of the subtree.
fn leftmost<K, V>(mut node: &Node<K, V>) -> &Node<K, V> {
    while let Some(left) = node.left.as_deref() {
        node = left;
    }
    node
}

fn rightmost<K, V>(mut node: &Node<K, V>) -> &Node<K, V> {
    while let Some(right) = node.right.as_deref() {
        node = right;
    }
    node
}

// =============================================================================
// Rotations and rebalancing
// =============================================================================

/// The left child becomes the subtree root.
fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

/// The right child becomes the subtree root.
fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

/// Recomputes `node`'s height and restores the balance invariant if its
/// subtrees differ in height by two. Returns the (possibly new) subtree root.
///
/// Children must already be balanced with coherent heights.
fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.update_height();
    let factor = node.balance();

    if factor > 1 {
        if balance(&node.left) < 0 {
            trace!(factor, "rebalance: left-right");
            node.left = node.left.take().map(rotate_left);
        } else {
            trace!(factor, "rebalance: left-left");
        }
        return rotate_right(node);
    }

    if factor < -1 {
        if balance(&node.right) > 0 {
            trace!(factor, "rebalance: right-left");
            node.right = node.right.take().map(rotate_right);
        } else {
            trace!(factor, "rebalance: right-right");
        }
        return rotate_left(node);
    }

    node
}

// =============================================================================
// Recursive mutation
// =============================================================================

fn insert_at<K: Ord, V>(link: Link<K, V>, key: K, value: V) -> Box<Node<K, V>> {
    let Some(mut node) = link else {
        return Node::leaf(key, value);
    };
    // Equal keys go right.
    if key < node.key {
        node.left = Some(insert_at(node.left.take(), key, value));
    } else {
        node.right = Some(insert_at(node.right.take(), key, value));
    }
    rebalance(node)
}

fn delete_at<K, V, Q>(link: Link<K, V>, key: &Q, removed: &mut Option<V>) -> Link<K, V>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut node = link?;
    match key.cmp(node.key.borrow()) {
        Ordering::Less => node.left = delete_at(node.left.take(), key, removed),
        Ordering::Greater => node.right = delete_at(node.right.take(), key, removed),
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, None) => {
                let Node { value, .. } = *node;
                *removed = Some(value);
                return None;
            }
            (Some(child), None) | (None, Some(child)) => {
                let Node { value, .. } = *node;
                *removed = Some(value);
                return Some(child);
            }
            (Some(left), Some(right)) => {
                let (rest, successor) = take_min(right);
                let Node {
                    key: successor_key,
                    value: successor_value,
                    ..
                } = *successor;
                node.key = successor_key;
                *removed = Some(mem::replace(&mut node.value, successor_value));
                node.left = Some(left);
                node.right = rest;
            }
        },
    }
    Some(rebalance(node))
}

/// Detaches the in-order minimum of `node`'s subtree. Returns the rebalanced
/// remainder and the detached node.
fn take_min<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    match node.left.take() {
        None => (node.right.take(), node),
        Some(left) => {
            let (rest, min) = take_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
    }
}

// =============================================================================
// AvlTree
// =============================================================================

/// An ordered map backed by an AVL tree.
///
/// The tree exclusively owns its nodes. Mutation takes ownership of a subtree
/// and returns its rebalanced root, so nodes carry no parent links.
pub struct AvlTree<K, V> {
    root: Link<K, V>,
    count: usize,
}

impl<K, V> AvlTree<K, V> {
    pub fn new() -> Self {
        Self {
            root: None,
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Height of the whole tree; 0 when empty.
    #[inline]
    pub fn height(&self) -> usize {
        height(&self.root) as usize
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.count = 0;
    }

    /// The entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.root
            .as_deref()
            .map(leftmost)
            .map(|node| (&node.key, &node.value))
    }

    /// The entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.root
            .as_deref()
            .map(rightmost)
            .map(|node| (&node.key, &node.value))
    }

    /// In-order iterator. Entries with equal keys are yielded in tree order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            stack: Vec::with_capacity(self.height()),
            remaining: self.count,
        };
        iter.push_left_spine(self.root.as_deref());
        iter
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Inserts `key` with `value`. An existing equal key is not replaced; the
    /// new node lands in its right subtree.
    pub fn insert(&mut self, key: K, value: V) {
        self.root = Some(insert_at(self.root.take(), key, value));
        self.count += 1;
    }

    /// Returns the value of the first node matching `key` on the search path.
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).map(|node| &node.value)
    }

    /// Mutable access to the value [`find`](Self::find) would return.
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cur = self.root.as_deref_mut();
        while let Some(node) = cur {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => cur = node.left.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
                Ordering::Greater => cur = node.right.as_deref_mut(),
            }
        }
        None
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).is_some()
    }

    /// Removes the first node matching `key` on the search path and returns
    /// its value. A missing key leaves the tree untouched.
    ///
    /// A node with two children takes over the key and value of its in-order
    /// successor, which is then unlinked from the right subtree.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut removed = None;
        self.root = delete_at(self.root.take(), key, &mut removed);
        if removed.is_some() {
            self.count -= 1;
        }
        removed
    }

    /// Collects the contributions of the node matching `key` and of every
    /// node in its subtree.
    ///
    /// Returns an empty vector if `key` is absent. The order of the result is
    /// unspecified; each node contributes exactly once.
    pub fn recommend<Q>(&self, key: &Q) -> Vec<&V::Item>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Contribute,
    {
        let mut out = Vec::new();
        let Some(start) = self.find_node(key) else {
            return out;
        };

        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if let Some(items) = node.value.contribution() {
                out.extend(items);
            }
            stack.extend(node.right.as_deref());
            stack.extend(node.left.as_deref());
        }
        out
    }

    fn find_node<Q>(&self, key: &Q) -> Option<&Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Equal => return Some(node),
                Ordering::Greater => cur = node.right.as_deref(),
            }
        }
        None
    }
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for AvlTree<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            count: self.count,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a, K, V> {
    /// Nodes whose left subtree has been fully pushed but which have not been
    /// yielded yet.
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut link: Option<&'a Node<K, V>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}


#[cfg(test)]
mod proptests;
