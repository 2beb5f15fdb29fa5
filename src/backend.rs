//! The closed set of backends and a factory over it
//!
//! [`AnyHeap`] lets callers pick a backend at runtime while still going through
//! the [`Heap`] contract. Because the variant set is a closed enum, `merge`
//! between two different backends is an ordinary match arm that returns
//! [`HeapError::IncompatibleBackend`]; nothing is downcast.
//!
//! # Example
//!
//! ```rust
//! use max_heap_engine::{Backend, Heap, HeapError};
//!
//! let mut binomial = Backend::Binomial.create();
//! let mut fibonacci = Backend::Fibonacci.create();
//! binomial.insert(1);
//! fibonacci.insert(2);
//!
//! assert_eq!(
//!     binomial.merge(&mut fibonacci),
//!     Err(HeapError::IncompatibleBackend {
//!         receiver: Backend::Binomial,
//!         donor: Backend::Fibonacci,
//!     })
//! );
//! assert_eq!(fibonacci.size(), 1);
//! ```

use crate::binary::BinaryHeap;
use crate::binomial::BinomialHeap;
use crate::fibonacci::FibonacciHeap;
use crate::traits::{Heap, HeapError, InvariantViolation};
use std::fmt;
use std::str::FromStr;

/// Identifies one of the three heap implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Backend {
    Binary,
    Binomial,
    Fibonacci,
}

impl Backend {
    /// Every backend, in benchmark order
    pub const ALL: [Backend; 3] = [Backend::Binary, Backend::Fibonacci, Backend::Binomial];

    /// Name used in reports
    pub fn name(self) -> &'static str {
        match self {
            Backend::Binary => "BinaryHeap",
            Backend::Binomial => "BinomialHeap",
            Backend::Fibonacci => "FibonacciHeap",
        }
    }

    /// Creates an empty heap of this backend
    pub fn create<K: Ord>(self) -> AnyHeap<K> {
        match self {
            Backend::Binary => AnyHeap::Binary(BinaryHeap::new()),
            Backend::Binomial => AnyHeap::Binomial(BinomialHeap::new()),
            Backend::Fibonacci => AnyHeap::Fibonacci(FibonacciHeap::new()),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown backend name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBackendError(String);

impl fmt::Display for ParseBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown heap backend '{}' (expected binary, binomial or fibonacci)",
            self.0
        )
    }
}

impl std::error::Error for ParseBackendError {}

impl FromStr for Backend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "binaryheap" | "max" | "maxheap" => Ok(Backend::Binary),
            "binomial" | "binomialheap" => Ok(Backend::Binomial),
            "fibonacci" | "fibonacciheap" | "fib" => Ok(Backend::Fibonacci),
            _ => Err(ParseBackendError(s.to_string())),
        }
    }
}

/// A heap of any backend, driven through the [`Heap`] contract
pub enum AnyHeap<K: Ord> {
    Binary(BinaryHeap<K>),
    Binomial(BinomialHeap<K>),
    Fibonacci(FibonacciHeap<K>),
}

impl<K: Ord> AnyHeap<K> {
    /// Creates an empty heap of the given backend
    pub fn new(backend: Backend) -> Self {
        backend.create()
    }
}

impl<K: Ord> Heap<K> for AnyHeap<K> {
    fn backend(&self) -> Backend {
        match self {
            AnyHeap::Binary(_) => Backend::Binary,
            AnyHeap::Binomial(_) => Backend::Binomial,
            AnyHeap::Fibonacci(_) => Backend::Fibonacci,
        }
    }

    fn size(&self) -> usize {
        match self {
            AnyHeap::Binary(h) => h.size(),
            AnyHeap::Binomial(h) => h.size(),
            AnyHeap::Fibonacci(h) => h.size(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            AnyHeap::Binary(h) => h.is_empty(),
            AnyHeap::Binomial(h) => h.is_empty(),
            AnyHeap::Fibonacci(h) => h.is_empty(),
        }
    }

    fn insert(&mut self, key: K) {
        match self {
            AnyHeap::Binary(h) => h.insert(key),
            AnyHeap::Binomial(h) => h.insert(key),
            AnyHeap::Fibonacci(h) => h.insert(key),
        }
    }

    fn get_max(&self) -> Result<&K, HeapError> {
        match self {
            AnyHeap::Binary(h) => h.get_max(),
            AnyHeap::Binomial(h) => h.get_max(),
            AnyHeap::Fibonacci(h) => h.get_max(),
        }
    }

    fn extract_max(&mut self) -> Result<K, HeapError> {
        match self {
            AnyHeap::Binary(h) => h.extract_max(),
            AnyHeap::Binomial(h) => h.extract_max(),
            AnyHeap::Fibonacci(h) => h.extract_max(),
        }
    }

    /// Merges within a backend; rejects cross-backend merges
    ///
    /// A binary receiver reports [`HeapError::UnsupportedOperation`] whatever
    /// the donor is.
    fn merge(&mut self, other: &mut Self) -> Result<(), HeapError> {
        match (self, other) {
            (AnyHeap::Binary(a), AnyHeap::Binary(b)) => a.merge(b),
            (AnyHeap::Binary(_), _) => Err(HeapError::UnsupportedOperation {
                backend: Backend::Binary,
                operation: "merge",
            }),
            (AnyHeap::Binomial(a), AnyHeap::Binomial(b)) => a.merge(b),
            (AnyHeap::Fibonacci(a), AnyHeap::Fibonacci(b)) => a.merge(b),
            (receiver, donor) => Err(HeapError::IncompatibleBackend {
                receiver: receiver.backend(),
                donor: donor.backend(),
            }),
        }
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        match self {
            AnyHeap::Binary(h) => h.check_invariants(),
            AnyHeap::Binomial(h) => h.check_invariants(),
            AnyHeap::Fibonacci(h) => h.check_invariants(),
        }
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for AnyHeap<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyHeap::Binary(h) => fmt::Debug::fmt(h, f),
            AnyHeap::Binomial(h) => fmt::Debug::fmt(h, f),
            AnyHeap::Fibonacci(h) => fmt::Debug::fmt(h, f),
        }
    }
}
