//! # Error Types for the AVL Tree
//!
//! The core operations of the tree are infallible: inserting a key that is
//! already present is a silent no-op, and rotations only ever move nodes that
//! the balance factor guarantees to exist. The errors defined here are
//! produced when *validating* a tree, and (with the `test-utils` feature) when
//! loading a tree shape from a fixture file.
//!
//! ## Validation Flow
//!
//! ```text
//! check_invariants()
//!      │
//!      ▼
//! Walk every node, carrying (lower, upper) key bounds
//!      │
//!      ├── key outside bounds ──────────► Err(Order)
//!      ├── stored height is stale ──────► Err(Height)
//!      ├── |balance factor| > 1 ────────► Err(Balance)
//!      ▼
//! Compare node count with recorded len ─► Err(Length)
//!      │
//!      ▼
//!    Ok(())
//! ```
//!
//! Keys are rendered with their `Debug` implementation so the error type
//! itself does not need to be generic over the key type.

use thiserror::Error;

/// Errors reported while validating or constructing an AVL tree.
#[derive(Error, Debug)]
pub enum Error {
	/// A key does not respect the search order imposed by one of its ancestors.
	///
	/// Bounds are strict, so a key that equals an ancestor's key (a duplicate)
	/// is reported through this variant as well.
	#[error("key {key} is not strictly {relation} ancestor key {bound}")]
	Order {
		/// The offending key.
		key: String,
		/// The ancestor key acting as the violated bound.
		bound: String,
		/// `"greater than"` or `"less than"`.
		relation: &'static str,
	},

	/// A node's stored height does not equal `1 + max(left, right)`.
	#[error("node {key} stores height {stored} but its subtrees imply {expected}")]
	Height {
		/// Key of the node with the stale height.
		key: String,
		/// Height recorded in the node.
		stored: usize,
		/// Height computed from the children.
		expected: usize,
	},

	/// A node's subtrees differ in height by more than one.
	#[error("node {key} has balance factor {factor}")]
	Balance {
		/// Key of the unbalanced node.
		key: String,
		/// `height(left) - height(right)`.
		factor: isize,
	},

	/// The tree's recorded length disagrees with the number of reachable nodes.
	#[error("tree records {recorded} keys but {counted} nodes are reachable")]
	Length {
		/// Length tracked by the tree.
		recorded: usize,
		/// Nodes found while walking the tree.
		counted: usize,
	},

	/// A fixture file could not be read.
	#[cfg(any(test, feature = "test-utils"))]
	#[error("failed to read tree fixture")]
	Io(#[from] std::io::Error),

	/// A fixture file did not contain a valid tree shape.
	#[cfg(any(test, feature = "test-utils"))]
	#[error("malformed tree fixture")]
	Fixture(#[from] serde_json::Error),
}

/// A Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;
