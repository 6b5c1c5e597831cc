//! # Avltree: A Self-Balancing Ordered Binary Search Tree
//!
//! This crate provides an in-memory AVL tree that stores unique, totally
//! ordered keys and hands them back in ascending order.
//!
//! ## Design Overview
//!
//! **Exclusive ownership**: every node is owned by exactly one parent through
//! an `Option<Box<Node<K>>>` link, and the root is owned by the [`Tree`]
//! itself. There are no parent pointers and no sharing, so the structure is a
//! strict tree.
//!
//! **Rebuild on the way up**: insertion is a recursive function that consumes
//! a subtree and returns the (possibly different) root of the rebuilt
//! subtree. After the recursive call returns, the current node recomputes its
//! height and rebalances itself before returning. There is no separate fix-up
//! pass.
//!
//! **Rotations move, never copy**: a rotation takes ownership of a subtree
//! root, rearranges three links and returns ownership of the new root. No node
//! is allocated, cloned, or freed while rebalancing.
//!
//! ### Rotation Cases
//!
//! ```text
//!   Left-Left            Left-Right            Right-Right          Right-Left
//!
//!       z                    z                  z                    z
//!      /                    /                    \                    \
//!     y      rotate        x      rotate          y      rotate        x      rotate
//!    /       right(z)       \     left(x),         \     left(z)      /       right(x),
//!   x                        y    right(z)          x                y        left(z)
//!
//!                   all four cases end as:     y
//!                                             / \
//!                                            x   z   (in key order)
//! ```
//!
//! ## Basic Usage
//!
//! ```
//! use avltree::Tree;
//!
//! let mut tree = Tree::new();
//!
//! for key in [10, 20, 30, 40, 50, 25] {
//!     tree.insert(key);
//! }
//!
//! // Inserting a key twice is a silent no-op
//! tree.insert(30);
//!
//! assert_eq!(tree.to_sorted_vec(), vec![10, 20, 25, 30, 40, 50]);
//! assert_eq!(tree.height(), 3);
//! ```
//!
//! ## Thread Safety
//!
//! The tree has no interior mutability: `insert` takes `&mut self`, so the
//! borrow checker already rules out concurrent mutation. Callers that need to
//! share a tree across threads must wrap it in their own lock.

use log::{debug, trace};

use std::cmp::Ordering;
use std::fmt;

pub mod error;
pub mod iter;

#[cfg(feature = "test-utils")]
pub mod alloc;
#[cfg(any(test, feature = "test-utils"))]
pub mod util;

// ---------------------------------------------------------------------------
// Configuration Constants
// ---------------------------------------------------------------------------

/// Number of node references an iterator stack keeps inline before spilling
/// to the heap.
///
/// An AVL tree of height 32 holds at least several million keys, so in
/// practice iteration never allocates.
pub(crate) const ITER_STACK_INLINE: usize = 32;

// ---------------------------------------------------------------------------
// Core Tree Structure
// ---------------------------------------------------------------------------

/// An owning link to a subtree. `None` is an empty subtree of height 0.
pub(crate) type Link<K> = Option<Box<Node<K>>>;

/// A self-balancing binary search tree of unique keys.
///
/// # Type Parameters
///
/// - `K`: The key type. Insertion requires `Ord`; the natural order of the key
///   type is used throughout and no comparator can be injected.
///
/// # Invariants
///
/// After every public operation:
/// - every key in a node's left subtree is smaller, and every key in its right
///   subtree is larger, than the node's key
/// - every node's stored height is `1 + max(height(left), height(right))`
/// - every node's balance factor is in `-1..=1`
/// - no two nodes hold equal keys
#[derive(Clone)]
pub struct Tree<K> {
	/// The topmost node. Reassigned whenever a rotation lifts a different node
	/// to the top.
	pub(crate) root: Link<K>,

	/// Number of distinct keys stored.
	pub(crate) len: usize,
}

impl<K> Default for Tree<K> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K> Tree<K> {
	/// Creates a new, empty tree.
	///
	/// Unlike most operations this does not allocate: the first node is
	/// created by the first insertion.
	///
	/// # Example
	///
	/// ```
	/// use avltree::Tree;
	///
	/// let tree: Tree<u32> = Tree::new();
	/// assert!(tree.is_empty());
	/// assert_eq!(tree.height(), 0);
	/// ```
	pub const fn new() -> Self {
		Tree {
			root: None,
			len: 0,
		}
	}

	// -----------------------------------------------------------------------
	// Tree Metadata
	// -----------------------------------------------------------------------

	/// Returns the number of distinct keys in the tree.
	///
	/// This is tracked as keys are inserted, so it is O(1).
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns `true` if the tree holds no keys.
	pub fn is_empty(&self) -> bool {
		self.root.is_none()
	}

	/// Returns the height of the tree.
	///
	/// - Height 0: the tree is empty
	/// - Height 1: the tree holds a single node
	/// - Height N: the longest root-to-leaf path visits N nodes
	///
	/// For `n` keys the height never exceeds `1.44 * log2(n + 2) - 0.328`.
	pub fn height(&self) -> usize {
		height(&self.root)
	}

	/// Returns the key stored at the root, if any.
	///
	/// # Example
	///
	/// ```
	/// use avltree::Tree;
	///
	/// let mut tree = Tree::new();
	/// tree.insert(10);
	/// tree.insert(20);
	/// tree.insert(30); // right-right case, rotates left around 10
	///
	/// assert_eq!(tree.root_key(), Some(&20));
	/// ```
	pub fn root_key(&self) -> Option<&K> {
		self.root.as_deref().map(|node| &node.key)
	}

	// -----------------------------------------------------------------------
	// Traversal
	// -----------------------------------------------------------------------

	/// Returns all keys in ascending order.
	///
	/// The keys are cloned into a fresh vector, so the tree is left untouched
	/// and repeated calls return independent sequences.
	///
	/// # Example
	///
	/// ```
	/// use avltree::Tree;
	///
	/// let mut tree = Tree::new();
	/// tree.insert(30);
	/// tree.insert(10);
	/// tree.insert(20);
	///
	/// assert_eq!(tree.to_sorted_vec(), vec![10, 20, 30]);
	/// ```
	pub fn to_sorted_vec(&self) -> Vec<K>
	where
		K: Clone,
	{
		let mut out = Vec::with_capacity(self.len);
		collect_in_order(&self.root, &mut out);
		out
	}

	/// Consumes the tree and returns its keys in ascending order.
	///
	/// Keys are moved out of the nodes, so `K` does not need to be `Clone`.
	pub fn into_sorted_vec(self) -> Vec<K> {
		let mut out = Vec::with_capacity(self.len);
		drain_in_order(self.root, &mut out);
		out
	}

	/// Returns a borrowing iterator over the keys in ascending order.
	///
	/// The iterator is double-ended, so `.rev()` walks the keys in descending
	/// order without collecting them first.
	///
	/// # Example
	///
	/// ```
	/// use avltree::Tree;
	///
	/// let tree: Tree<i32> = [3, 1, 2].into_iter().collect();
	///
	/// let keys: Vec<_> = tree.iter().copied().collect();
	/// assert_eq!(keys, vec![1, 2, 3]);
	///
	/// let keys: Vec<_> = tree.iter().rev().copied().collect();
	/// assert_eq!(keys, vec![3, 2, 1]);
	/// ```
	pub fn iter(&self) -> iter::Iter<'_, K> {
		iter::Iter::new(self)
	}
}

impl<K: Ord> Tree<K> {
	// -----------------------------------------------------------------------
	// Insertion
	// -----------------------------------------------------------------------

	/// Inserts a key into the tree, rebalancing as needed.
	///
	/// If an equal key is already present the tree is left exactly as it was:
	/// the new key is dropped, nothing is reported, and no node is touched.
	///
	/// # Example
	///
	/// ```
	/// use avltree::Tree;
	///
	/// let mut tree = Tree::new();
	/// tree.insert(5);
	/// tree.insert(5);
	///
	/// assert_eq!(tree.len(), 1);
	/// assert_eq!(tree.to_sorted_vec(), vec![5]);
	/// ```
	pub fn insert(&mut self, key: K) {
		let (root, placement) = insert_into(self.root.take(), key);
		self.root = Some(root);
		if placement != Placement::Duplicate {
			self.len += 1;
		}
	}
}

impl<K: Ord + fmt::Debug> Tree<K> {
	// -----------------------------------------------------------------------
	// Validation
	// -----------------------------------------------------------------------

	/// Walks the whole tree and reports the first broken invariant.
	///
	/// # Invariants Checked
	///
	/// 1. Search order: keys fall strictly between the bounds set by their
	///    ancestors (this also rejects duplicate keys)
	/// 2. Height: each stored height equals `1 + max(left, right)`
	/// 3. Balance: each balance factor is in `-1..=1`
	/// 4. Length: the recorded length equals the number of nodes
	pub fn check_invariants(&self) -> error::Result<()> {
		let mut counted = 0;
		if let Some(root) = self.root.as_deref() {
			validate_node(root, None, None, &mut counted)
				.inspect_err(|err| debug!("invariant check failed: {err}"))?;
		}
		if counted != self.len {
			debug!("invariant check failed: len {} but {counted} nodes", self.len);
			return Err(error::Error::Length {
				recorded: self.len,
				counted,
			});
		}
		Ok(())
	}

	/// Validates all tree invariants. Panics with diagnostic info if any
	/// invariant is violated.
	#[cfg(any(test, feature = "test-utils"))]
	pub fn assert_invariants(&self) {
		if let Err(err) = self.check_invariants() {
			panic!("tree invariant violated: {err}");
		}
	}
}

// ---------------------------------------------------------------------------
// Standard Trait Implementations
// ---------------------------------------------------------------------------

impl<K: fmt::Debug> fmt::Debug for Tree<K> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_set().entries(self.iter()).finish()
	}
}

impl<K: Ord> FromIterator<K> for Tree<K> {
	fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
		let mut tree = Tree::new();
		tree.extend(iter);
		tree
	}
}

impl<K: Ord> Extend<K> for Tree<K> {
	fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
		for key in iter {
			self.insert(key);
		}
	}
}

impl<'t, K> IntoIterator for &'t Tree<K> {
	type Item = &'t K;
	type IntoIter = iter::Iter<'t, K>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl<K> IntoIterator for Tree<K> {
	type Item = K;
	type IntoIter = std::vec::IntoIter<K>;

	fn into_iter(self) -> Self::IntoIter {
		self.into_sorted_vec().into_iter()
	}
}

// ===========================================================================
// Node Type
// ===========================================================================

/// One stored key together with its subtrees.
#[derive(Clone)]
pub(crate) struct Node<K> {
	pub(crate) key: K,
	/// Nodes on the longest path down to a leaf, counting this one (a leaf has
	/// height 1).
	pub(crate) height: usize,
	pub(crate) left: Link<K>,
	pub(crate) right: Link<K>,
}

/// Height of a possibly-empty subtree.
#[inline]
pub(crate) fn height<K>(link: &Link<K>) -> usize {
	link.as_ref().map_or(0, |node| node.height)
}

impl<K> Node<K> {
	/// Allocates a one-node subtree.
	#[inline]
	pub(crate) fn leaf(key: K) -> Box<Self> {
		Box::new(Node {
			key,
			height: 1,
			left: None,
			right: None,
		})
	}

	/// Recomputes the stored height from the children. The children's heights
	/// must already be correct.
	#[inline]
	pub(crate) fn update_height(&mut self) {
		self.height = 1 + height(&self.left).max(height(&self.right));
	}

	/// `height(left) - height(right)`.
	#[inline]
	pub(crate) fn balance_factor(&self) -> isize {
		height(&self.left) as isize - height(&self.right) as isize
	}

	// -----------------------------------------------------------------------
	// Rotations
	// -----------------------------------------------------------------------

	/// Rotates the subtree rooted at `self` (`y`) to the right.
	///
	/// ```text
	///        y               x
	///       / \             / \
	///      x   C    =>     A   y
	///     / \                 / \
	///    A   B               B   C
	/// ```
	///
	/// # Panics
	///
	/// Panics if `y` has no left child. Insertion only rotates right when the
	/// left side is at least two levels taller, so this is a logic error.
	pub(crate) fn rotate_right(mut self: Box<Self>) -> Box<Self> {
		let mut x = self.left.take().expect("right rotation requires a left child");
		self.left = x.right.take();
		// y is now below x, so its height has to be settled first
		self.update_height();
		x.right = Some(self);
		x.update_height();
		x
	}

	/// Rotates the subtree rooted at `self` (`x`) to the left.
	///
	/// ```text
	///      x                   y
	///     / \                 / \
	///    A   y       =>      x   C
	///       / \             / \
	///      B   C           A   B
	/// ```
	///
	/// # Panics
	///
	/// Panics if `x` has no right child.
	pub(crate) fn rotate_left(mut self: Box<Self>) -> Box<Self> {
		let mut y = self.right.take().expect("left rotation requires a right child");
		self.right = y.left.take();
		self.update_height();
		y.left = Some(self);
		y.update_height();
		y
	}
}

// ===========================================================================
// Insertion Algorithm
// ===========================================================================

/// Where an insertion ended up relative to the root of the subtree it was
/// applied to.
///
/// The rebalance step needs to know whether the inserted key is smaller or
/// larger than the key of the heavy child. That is exactly the direction the
/// insertion took one level below, so the recursion reports it upward instead
/// of keeping (or cloning) the key after it has been moved into its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
	/// The subtree was empty and is now the new one-node subtree.
	Created,
	/// The key was smaller than the subtree root and went into its left side.
	Left,
	/// The key was larger than the subtree root and went into its right side.
	Right,
	/// An equal key was already present; nothing changed.
	Duplicate,
}

/// Inserts `key` into the subtree `link` and returns the new subtree root.
fn insert_into<K: Ord>(link: Link<K>, key: K) -> (Box<Node<K>>, Placement) {
	let mut node = match link {
		Some(node) => node,
		None => return (Node::leaf(key), Placement::Created),
	};

	let (direction, below) = match key.cmp(&node.key) {
		Ordering::Less => {
			let (child, below) = insert_into(node.left.take(), key);
			node.left = Some(child);
			(Placement::Left, below)
		}
		Ordering::Greater => {
			let (child, below) = insert_into(node.right.take(), key);
			node.right = Some(child);
			(Placement::Right, below)
		}
		Ordering::Equal => {
			trace!("ignoring duplicate key at height {}", node.height);
			return (node, Placement::Duplicate);
		}
	};

	// Nothing below changed, so neither heights nor balance can have moved
	if below == Placement::Duplicate {
		return (node, Placement::Duplicate);
	}

	node.update_height();
	(rebalance(node, below), direction)
}

/// Restores the balance invariant at `node` after an insertion below it.
///
/// `below` is where the insertion went inside the child on the side that grew,
/// which stands in for comparing the inserted key with that child's key.
fn rebalance<K>(mut node: Box<Node<K>>, below: Placement) -> Box<Node<K>> {
	let balance = node.balance_factor();
	debug_assert!((-2..=2).contains(&balance), "balance factor {balance} out of range");

	match below {
		Placement::Left if balance > 1 => {
			trace!("left-left case at height {}, rotating right", node.height);
			node.rotate_right()
		}
		Placement::Right if balance < -1 => {
			trace!("right-right case at height {}, rotating left", node.height);
			node.rotate_left()
		}
		Placement::Right if balance > 1 => {
			trace!("left-right case at height {}, rotating left then right", node.height);
			node.left = node.left.take().map(Node::rotate_left);
			node.rotate_right()
		}
		Placement::Left if balance < -1 => {
			trace!("right-left case at height {}, rotating right then left", node.height);
			node.right = node.right.take().map(Node::rotate_right);
			node.rotate_left()
		}
		_ => node,
	}
}

// ===========================================================================
// Traversal Helpers
// ===========================================================================

/// In-order walk: left subtree, node, right subtree.
fn collect_in_order<K: Clone>(link: &Link<K>, out: &mut Vec<K>) {
	if let Some(node) = link {
		collect_in_order(&node.left, out);
		out.push(node.key.clone());
		collect_in_order(&node.right, out);
	}
}

fn drain_in_order<K>(link: Link<K>, out: &mut Vec<K>) {
	if let Some(node) = link {
		let Node {
			key,
			left,
			right,
			..
		} = *node;
		drain_in_order(left, out);
		out.push(key);
		drain_in_order(right, out);
	}
}

/// Recursively validates a node and its subtree.
///
/// # Arguments
/// * `node` - The node to validate
/// * `lower` - Exclusive lower bound from an ancestor, None if leftmost
/// * `upper` - Exclusive upper bound from an ancestor, None if rightmost
/// * `counted` - Running count of visited nodes
fn validate_node<K: Ord + fmt::Debug>(
	node: &Node<K>,
	lower: Option<&K>,
	upper: Option<&K>,
	counted: &mut usize,
) -> error::Result<()> {
	*counted += 1;

	if let Some(bound) = lower {
		if node.key <= *bound {
			return Err(error::Error::Order {
				key: format!("{:?}", node.key),
				bound: format!("{:?}", bound),
				relation: "greater than",
			});
		}
	}
	if let Some(bound) = upper {
		if node.key >= *bound {
			return Err(error::Error::Order {
				key: format!("{:?}", node.key),
				bound: format!("{:?}", bound),
				relation: "less than",
			});
		}
	}

	// Children first: a parent's expected height relies on theirs
	if let Some(left) = node.left.as_deref() {
		validate_node(left, lower, Some(&node.key), counted)?;
	}
	if let Some(right) = node.right.as_deref() {
		validate_node(right, Some(&node.key), upper, counted)?;
	}

	let expected = 1 + height(&node.left).max(height(&node.right));
	if node.height != expected {
		return Err(error::Error::Height {
			key: format!("{:?}", node.key),
			stored: node.height,
			expected,
		});
	}

	let factor = node.balance_factor();
	if !(-1..=1).contains(&factor) {
		return Err(error::Error::Balance {
			key: format!("{:?}", node.key),
			factor,
		});
	}

	Ok(())
}
