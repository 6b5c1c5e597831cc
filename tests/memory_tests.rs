//! Allocation accounting tests for avltree.
//!
//! These tests install the crate's `TrackingAllocator` as the global allocator
//! and verify that:
//!
//! - each distinct key costs exactly one node allocation
//! - duplicate keys and rotations allocate nothing
//! - every node is freed when the tree is dropped or consumed
//!
//! # Running Memory Tests
//!
//! ```bash
//! cargo test --test memory_tests
//! ```
//!
//! For more thorough leak detection, run under LeakSanitizer:
//!
//! ```bash
//! RUSTFLAGS="-Zsanitizer=leak" cargo +nightly test --target x86_64-unknown-linux-gnu
//! ```
//!
//! Counters are per thread, so tests can run in parallel.

use avltree::alloc::{check_no_leaks, get_stats, reset_counters, TrackingAllocator};
use avltree::Tree;

#[global_allocator]
static ALLOC: TrackingAllocator = TrackingAllocator;

// ===========================================================================
// Insertion Accounting
// ===========================================================================

/// Ascending keys trigger a rotation on most insertions; none of them may
/// allocate.
#[test]
fn one_allocation_per_distinct_key() {
	let mut tree: Tree<i32> = Tree::new();
	reset_counters();

	for i in 0..1000 {
		tree.insert(i);
	}

	let stats = get_stats();
	assert_eq!(stats.alloc_count, 1000);
	assert_eq!(stats.dealloc_count, 0);
	assert_eq!(tree.len(), 1000);
}

#[test]
fn duplicate_keys_do_not_allocate() {
	let mut tree: Tree<i32> = (0..500).collect();
	reset_counters();

	for i in (0..500).rev() {
		tree.insert(i);
	}

	let stats = get_stats();
	assert_eq!(stats.alloc_count, 0);
	assert_eq!(stats.dealloc_count, 0);
	assert_eq!(tree.len(), 500);
}

/// A rejected duplicate is dropped, nothing else is touched.
#[test]
fn duplicate_owned_keys_are_dropped() {
	let mut tree: Tree<String> = (0..100).map(|i| format!("key-{:03}", i)).collect();
	let again: Vec<String> = (0..100).map(|i| format!("key-{:03}", i)).collect();
	reset_counters();

	for key in again {
		tree.insert(key);
	}

	let stats = get_stats();
	assert_eq!(stats.alloc_count, 0);
	// 100 key strings plus the vector's buffer
	assert_eq!(stats.dealloc_count, 101);
	assert_eq!(tree.len(), 100);
}

// ===========================================================================
// Reclamation
// ===========================================================================

#[test]
fn drop_frees_every_node() {
	reset_counters();

	let mut tree: Tree<i32> = Tree::new();
	for i in (0..2000).rev() {
		tree.insert(i);
	}
	assert_eq!(get_stats().alloc_count, 2000);

	drop(tree);

	check_no_leaks();
}

#[test]
fn drop_frees_owned_keys() {
	reset_counters();

	let mut tree: Tree<String> = Tree::new();
	for i in 0..300 {
		tree.insert(format!("{:05}", i * 7 % 300));
	}
	assert_eq!(tree.len(), 300);

	drop(tree);

	check_no_leaks();
}

#[test]
fn into_sorted_vec_frees_nodes() {
	reset_counters();

	let tree: Tree<i32> = (0..1000).collect();
	let keys = tree.into_sorted_vec();

	let stats = get_stats();
	// One node per key plus the output vector, every node already freed
	assert_eq!(stats.alloc_count, 1001);
	assert_eq!(stats.dealloc_count, 1000);
	assert_eq!(keys.len(), 1000);

	drop(keys);

	check_no_leaks();
}

// ===========================================================================
// Traversal Accounting
// ===========================================================================

#[test]
fn to_sorted_vec_allocates_once() {
	let tree: Tree<i32> = (0..10_000).collect();
	reset_counters();

	let keys = tree.to_sorted_vec();

	assert_eq!(get_stats().alloc_count, 1);
	assert_eq!(keys.len(), 10_000);
}

#[test]
fn iteration_does_not_allocate() {
	let tree: Tree<i32> = (0..100_000).collect();
	reset_counters();

	let forward = tree.iter().count();
	let backward = tree.iter().rev().count();

	assert_eq!(forward, 100_000);
	assert_eq!(backward, 100_000);
	assert_eq!(get_stats().alloc_count, 0);
}
