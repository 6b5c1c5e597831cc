//! Test utilities for snapshotting tree shapes and loading them from JSON fixtures
//!
//! A fixture describes a tree node by node:
//!
//! ```json
//! { "key": 20, "left": { "key": 10 }, "right": { "key": 30, "height": 1 } }
//! ```
//!
//! Trees built from a fixture are taken verbatim, without any balancing, so a
//! fixture can describe a broken tree for exercising
//! [`Tree::check_invariants`]. A missing `height` is computed from the
//! children; an explicit one is stored as given.
use crate::error::Result;
use crate::{height, Link, Node, Tree};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Serializable description of a subtree.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(bound(deserialize = "K: Deserialize<'de>"))]
pub struct TreeShape<K> {
	pub key: K,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub height: Option<usize>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub left: Option<Box<TreeShape<K>>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub right: Option<Box<TreeShape<K>>>,
}

impl<K> TreeShape<K> {
	/// A one-node shape whose height will be computed.
	pub fn leaf(key: K) -> Self {
		TreeShape {
			key,
			height: None,
			left: None,
			right: None,
		}
	}
}

/// Captures the exact shape of a tree, including the stored heights.
///
/// Two trees with equal shapes hold the same keys in the same positions.
pub fn shape<K: Clone>(tree: &Tree<K>) -> Option<TreeShape<K>> {
	tree.root.as_deref().map(snapshot_node)
}

fn snapshot_node<K: Clone>(node: &Node<K>) -> TreeShape<K> {
	TreeShape {
		key: node.key.clone(),
		height: Some(node.height),
		left: node.left.as_deref().map(|n| Box::new(snapshot_node(n))),
		right: node.right.as_deref().map(|n| Box::new(snapshot_node(n))),
	}
}

/// Builds a tree with exactly the given shape.
pub fn from_shape<K>(shape: Option<TreeShape<K>>) -> Tree<K> {
	let mut len = 0;
	let root = translate_node(shape.map(Box::new), &mut len);
	Tree {
		root,
		len,
	}
}

fn translate_node<K>(shape: Option<Box<TreeShape<K>>>, len: &mut usize) -> Link<K> {
	let shape = *shape?;
	*len += 1;

	let mut node = Node::leaf(shape.key);
	node.left = translate_node(shape.left, len);
	node.right = translate_node(shape.right, len);
	node.height = match shape.height {
		Some(h) => h,
		None => 1 + height(&node.left).max(height(&node.right)),
	};
	Some(node)
}

/// Parses a tree from a JSON document. `null` is the empty tree.
pub fn tree_from_json<K: DeserializeOwned>(json: &str) -> Result<Tree<K>> {
	let shape: Option<TreeShape<K>> = serde_json::from_str(json)?;
	Ok(from_shape(shape))
}

/// Loads a tree from a JSON fixture file.
pub fn sample_tree<K: DeserializeOwned, P: AsRef<std::path::Path>>(path: P) -> Result<Tree<K>> {
	let file = std::fs::File::open(path)?;
	let shape: Option<TreeShape<K>> = serde_json::from_reader(std::io::BufReader::new(file))?;
	Ok(from_shape(shape))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;

	#[test]
	fn heights_are_computed_when_missing() {
		let tree: Tree<i32> =
			tree_from_json(r#"{"key": 2, "left": {"key": 1}, "right": {"key": 3}}"#).unwrap();

		assert_eq!(tree.len(), 3);
		assert_eq!(tree.height(), 2);
		tree.assert_invariants();
	}

	#[test]
	fn explicit_heights_are_kept() {
		let tree: Tree<i32> = tree_from_json(r#"{"key": 1, "height": 4}"#).unwrap();

		assert_eq!(tree.height(), 4);
		assert!(matches!(tree.check_invariants(), Err(Error::Height { .. })));
	}

	#[test]
	fn null_is_empty_tree() {
		let tree: Tree<i32> = tree_from_json("null").unwrap();
		assert!(tree.is_empty());
		assert_eq!(shape(&tree), None);
	}

	#[test]
	fn malformed_json_is_reported() {
		let result: Result<Tree<i32>> = tree_from_json(r#"{"left": {}}"#);
		assert!(matches!(result, Err(Error::Fixture(_))));
	}

	#[test]
	fn missing_fixture_file_is_reported() {
		let result: Result<Tree<i32>> = sample_tree("does/not/exist.json");
		assert!(matches!(result, Err(Error::Io(_))));
	}

	#[test]
	fn shape_survives_json() {
		let tree: Tree<i32> = [4, 2, 6, 1, 3, 5, 7].into_iter().collect();
		let json = serde_json::to_string(&shape(&tree)).unwrap();

		let rebuilt: Tree<i32> = tree_from_json(&json).unwrap();
		assert_eq!(shape(&rebuilt), shape(&tree));
		rebuilt.assert_invariants();
	}
}
