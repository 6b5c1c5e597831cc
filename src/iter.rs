//! Iterators for the `Tree` data structure
use crate::{Node, Tree, ITER_STACK_INLINE};
use smallvec::SmallVec;
use std::iter::FusedIterator;

/// Path of nodes still to be visited from one end of the traversal.
type Stack<'t, K> = SmallVec<[&'t Node<K>; ITER_STACK_INLINE]>;

/// Borrowing in-order iterator over the keys of a [`Tree`].
///
/// The front cursor walks ascending and the back cursor descending. Each
/// keeps a stack of the ancestors it has yet to yield, so no recursion is
/// needed and stack depth is bounded by the tree height. The two ends never
/// cross because the iterator counts down the keys it has left.
pub struct Iter<'t, K> {
	front: Stack<'t, K>,
	back: Stack<'t, K>,
	remaining: usize,
}

impl<'t, K> Iter<'t, K> {
	pub(crate) fn new(tree: &'t Tree<K>) -> Iter<'t, K> {
		let mut iter = Iter {
			front: SmallVec::new(),
			back: SmallVec::new(),
			remaining: tree.len(),
		};
		iter.push_left_spine(tree.root.as_deref());
		iter.push_right_spine(tree.root.as_deref());
		iter
	}

	#[inline]
	fn push_left_spine(&mut self, mut node: Option<&'t Node<K>>) {
		while let Some(n) = node {
			self.front.push(n);
			node = n.left.as_deref();
		}
	}

	#[inline]
	fn push_right_spine(&mut self, mut node: Option<&'t Node<K>>) {
		while let Some(n) = node {
			self.back.push(n);
			node = n.right.as_deref();
		}
	}
}

impl<'t, K> Iterator for Iter<'t, K> {
	type Item = &'t K;

	fn next(&mut self) -> Option<&'t K> {
		if self.remaining == 0 {
			return None;
		}
		let node = self.front.pop()?;
		self.push_left_spine(node.right.as_deref());
		self.remaining -= 1;
		Some(&node.key)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}

impl<'t, K> DoubleEndedIterator for Iter<'t, K> {
	fn next_back(&mut self) -> Option<&'t K> {
		if self.remaining == 0 {
			return None;
		}
		let node = self.back.pop()?;
		self.push_right_spine(node.left.as_deref());
		self.remaining -= 1;
		Some(&node.key)
	}
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
	fn clone(&self) -> Self {
		Iter {
			front: self.front.clone(),
			back: self.back.clone(),
			remaining: self.remaining,
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::Tree;

	#[test]
	fn empty_iter() {
		let tree: Tree<i32> = Tree::new();
		let mut iter = tree.iter();

		assert_eq!(iter.len(), 0);
		assert!(iter.next().is_none());
		assert!(iter.next_back().is_none());
	}

	#[test]
	fn forward_scan() {
		let tree: Tree<i32> = (0..100).rev().collect();

		let mut iter = tree.iter();
		for i in 0..100 {
			assert_eq!(iter.next(), Some(&i));
		}
		assert!(iter.next().is_none());
		assert!(iter.next().is_none());
	}

	#[test]
	fn reverse_scan() {
		let tree: Tree<i32> = (0..100).collect();

		let keys: Vec<i32> = tree.iter().rev().copied().collect();
		assert_eq!(keys, (0..100).rev().collect::<Vec<_>>());
	}

	#[test]
	fn ends_meet_without_crossing() {
		let tree: Tree<i32> = (1..=7).collect();
		let mut iter = tree.iter();

		assert_eq!(iter.next(), Some(&1));
		assert_eq!(iter.next_back(), Some(&7));
		assert_eq!(iter.next(), Some(&2));
		assert_eq!(iter.next_back(), Some(&6));
		assert_eq!(iter.len(), 3);
		assert_eq!(iter.next(), Some(&3));
		assert_eq!(iter.next(), Some(&4));
		assert_eq!(iter.next_back(), Some(&5));
		assert!(iter.next().is_none());
		assert!(iter.next_back().is_none());
	}

	#[test]
	fn cloned_iter_resumes_independently() {
		let tree: Tree<i32> = (0..10).collect();
		let mut iter = tree.iter();
		iter.next();

		let rest: Vec<i32> = iter.clone().copied().collect();
		assert_eq!(rest, (1..10).collect::<Vec<_>>());
		assert_eq!(iter.next(), Some(&1));
	}

	#[test]
	fn for_loop_over_reference() {
		let tree: Tree<&str> = ["b", "c", "a"].into_iter().collect();

		let mut seen = Vec::new();
		for key in &tree {
			seen.push(*key);
		}
		assert_eq!(seen, vec!["a", "b", "c"]);
	}
}
