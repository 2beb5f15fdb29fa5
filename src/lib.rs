//! Mergeable max-heaps behind one contract
//!
//! This crate provides three interchangeable max-heap (priority queue)
//! backends that all implement the [`Heap`] trait, plus a reproducible
//! benchmark harness that drives them through identical workloads.
//!
//! # Backends
//!
//! - **Binary Heap**: array-backed; O(log n) insert and extract_max; no merge
//! - **Binomial Heap**: forest of binomial trees kept at one tree per degree;
//!   O(log n) insert, extract_max and merge
//! - **Fibonacci Heap**: lazily consolidated forest; O(1) insert, O(log n)
//!   amortized extract_max, merge without consolidation
//!
//! Tree nodes of the binomial and Fibonacci backends live in a per-heap arena
//! ([`storage::SlotMapStorage`]) and refer to each other by generational keys.
//!
//! Pick a backend statically by naming its type, or at runtime through
//! [`Backend::create`], which returns an [`AnyHeap`].
//!
//! # Example
//!
//! ```rust
//! use max_heap_engine::{Backend, Heap, HeapError};
//!
//! for backend in Backend::ALL {
//!     let mut heap = backend.create();
//!     for key in [5, 3, 8, 1, 9, 2] {
//!         heap.insert(key);
//!     }
//!     assert_eq!(heap.get_max(), Ok(&9));
//!
//!     let mut drained = Vec::new();
//!     while let Ok(key) = heap.extract_max() {
//!         drained.push(key);
//!     }
//!     assert_eq!(drained, vec![9, 8, 5, 3, 2, 1]);
//!     assert_eq!(heap.get_max(), Err(HeapError::EmptyHeap));
//! }
//! ```

pub mod backend;
pub mod benchmark;
pub mod binary;
pub mod binomial;
pub mod fibonacci;
mod forest;
pub mod storage;
pub mod traits;

// Re-export the contract and factory for convenience
pub use backend::{AnyHeap, Backend};
pub use traits::{Heap, HeapError, InvariantViolation};
