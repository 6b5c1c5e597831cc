//! Allocation tracking for node accounting and leak detection.
//!
//! This module provides a global allocator that counts allocations,
//! deallocations and live bytes. Counters are kept per thread, so a test only
//! observes the allocations made by its own thread even when the test harness
//! runs other tests in parallel.
//!
//! # Usage
//!
//! ```ignore
//! use avltree::alloc::TrackingAllocator;
//!
//! #[global_allocator]
//! static ALLOC: TrackingAllocator = TrackingAllocator;
//!
//! #[test]
//! fn one_node_per_key() {
//!     let mut tree = avltree::Tree::new();
//!     avltree::alloc::reset_counters();
//!
//!     tree.insert(1);
//!     assert_eq!(avltree::alloc::get_stats().alloc_count, 1);
//!
//!     drop(tree);
//!     avltree::alloc::check_no_leaks();
//! }
//! ```

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

thread_local! {
	static ALLOC_COUNT: Cell<usize> = const { Cell::new(0) };
	static DEALLOC_COUNT: Cell<usize> = const { Cell::new(0) };
	static BYTES_ALLOCATED: Cell<isize> = const { Cell::new(0) };
	static PEAK_BYTES: Cell<isize> = const { Cell::new(0) };
}

/// A tracking allocator that counts allocations and deallocations on the
/// calling thread before forwarding to the system allocator.
pub struct TrackingAllocator;

// Counter updates use `try_with` because the allocator also runs while
// thread-local storage is being torn down.
fn record_alloc(size: usize) {
	let _ = ALLOC_COUNT.try_with(|count| count.set(count.get() + 1));
	record_bytes(size as isize);
}

fn record_dealloc(size: usize) {
	let _ = DEALLOC_COUNT.try_with(|count| count.set(count.get() + 1));
	record_bytes(-(size as isize));
}

fn record_bytes(diff: isize) {
	let _ = BYTES_ALLOCATED.try_with(|bytes| {
		let current = bytes.get() + diff;
		bytes.set(current);
		let _ = PEAK_BYTES.try_with(|peak| peak.set(peak.get().max(current)));
	});
}

unsafe impl GlobalAlloc for TrackingAllocator {
	unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
		record_alloc(layout.size());
		System.alloc(layout)
	}

	unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
		record_dealloc(layout.size());
		System.dealloc(ptr, layout)
	}

	unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
		record_alloc(layout.size());
		System.alloc_zeroed(layout)
	}

	unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
		record_bytes(new_size as isize - layout.size() as isize);
		System.realloc(ptr, layout, new_size)
	}
}

/// Resets the calling thread's counters to zero.
pub fn reset_counters() {
	ALLOC_COUNT.with(|c| c.set(0));
	DEALLOC_COUNT.with(|c| c.set(0));
	BYTES_ALLOCATED.with(|c| c.set(0));
	PEAK_BYTES.with(|c| c.set(0));
}

/// Returns the calling thread's allocation statistics.
pub fn get_stats() -> AllocationStats {
	AllocationStats {
		alloc_count: ALLOC_COUNT.with(Cell::get),
		dealloc_count: DEALLOC_COUNT.with(Cell::get),
		bytes_allocated: BYTES_ALLOCATED.with(Cell::get),
		peak_bytes: PEAK_BYTES.with(Cell::get),
	}
}

/// Allocation statistics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationStats {
	/// Number of allocations since reset.
	pub alloc_count: usize,
	/// Number of deallocations since reset.
	pub dealloc_count: usize,
	/// Bytes allocated since reset minus bytes freed. Negative if memory
	/// allocated before the reset was freed afterwards.
	pub bytes_allocated: isize,
	/// Peak of `bytes_allocated` since reset.
	pub peak_bytes: isize,
}

/// Checks that everything allocated since the last reset has been freed.
///
/// # Panics
///
/// Panics if there are unmatched allocations or bytes still allocated.
pub fn check_no_leaks() {
	let stats = get_stats();
	let diff = stats.alloc_count as isize - stats.dealloc_count as isize;

	if diff != 0 {
		panic!(
			"Memory leak detected!\n\
			 Allocations: {}\n\
			 Deallocations: {}\n\
			 Difference: {}\n\
			 Bytes still allocated: {}",
			stats.alloc_count, stats.dealloc_count, diff, stats.bytes_allocated
		);
	}

	if stats.bytes_allocated != 0 {
		panic!(
			"Memory leak detected!\n\
			 Bytes still allocated: {}\n\
			 (alloc_count == dealloc_count but bytes != 0, possible size mismatch)",
			stats.bytes_allocated
		);
	}
}
