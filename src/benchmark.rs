//! Reproducible benchmark harness
//!
//! Times `insert`, `extract_max` and `merge` on every backend under identical
//! random workloads and produces one [`BenchmarkRecord`] per
//! (backend, size, operation).
//!
//! For every input size the harness:
//!
//! 1. inserts `size` random keys into a fresh heap (timed)
//! 2. extracts `extract_fraction * size` maxima from that heap (timed)
//! 3. builds two more heaps from two independent key sets and merges the
//!    second into the first (timed). A backend that rejects the merge gets an
//!    [`Outcome::Failed`] record and the run carries on.
//!
//! All randomness comes from one [`StdRng`] seeded with
//! [`BenchmarkConfig::seed`], and key sets are generated once per size and
//! shared by every backend, so two runs with the same configuration feed the
//! heaps exactly the same keys.
//!
//! # Example
//!
//! ```rust
//! use max_heap_engine::benchmark::{write_csv, Benchmark, BenchmarkConfig};
//!
//! let config = BenchmarkConfig {
//!     sizes: vec![64],
//!     ..BenchmarkConfig::default()
//! };
//! let records = Benchmark::new(config).unwrap().run();
//! assert_eq!(records.len(), 9);
//!
//! let mut out = Vec::new();
//! write_csv(&records, &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().starts_with("Heap,Size,Operation,Time(ms)"));
//! ```

use crate::backend::Backend;
use crate::traits::{Heap, HeapError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::hint::black_box;
use std::io;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

/// Input sizes used when none are given
pub const DEFAULT_SIZES: [usize; 6] = [100, 500, 1000, 5000, 10000, 20000];

/// Share of the inserted keys removed in the extraction phase
pub const DEFAULT_EXTRACT_FRACTION: f64 = 0.1;

pub const DEFAULT_SEED: u64 = 42;

pub const DEFAULT_MIN_KEY: i32 = 1;
pub const DEFAULT_MAX_KEY: i32 = 1_000_000;

/// Benchmark parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    /// Number of keys per workload, one workload per entry
    pub sizes: Vec<usize>,
    /// Fraction of `size` extracted after the insert phase, in `[0, 1]`
    pub extract_fraction: f64,
    /// Seed of the workload generator
    pub seed: u64,
    /// Keys are drawn uniformly from this range
    pub key_range: RangeInclusive<i32>,
    /// Backends to run, in report order
    pub backends: Vec<Backend>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_SIZES.to_vec(),
            extract_fraction: DEFAULT_EXTRACT_FRACTION,
            seed: DEFAULT_SEED,
            key_range: DEFAULT_MIN_KEY..=DEFAULT_MAX_KEY,
            backends: Backend::ALL.to_vec(),
        }
    }
}

/// Reasons a [`BenchmarkConfig`] is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `extract_fraction` is NaN or outside `[0, 1]`
    ExtractFraction(f64),
    /// `key_range` contains no values
    EmptyKeyRange { min: i32, max: i32 },
    NoBackends,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ExtractFraction(fraction) => {
                write!(f, "extract fraction {fraction} is not between 0 and 1")
            }
            ConfigError::EmptyKeyRange { min, max } => {
                write!(f, "key range {min}..={max} is empty")
            }
            ConfigError::NoBackends => write!(f, "no heap backend selected"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl BenchmarkConfig {
    /// Checks that every parameter is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.extract_fraction) {
            return Err(ConfigError::ExtractFraction(self.extract_fraction));
        }
        if self.key_range.is_empty() {
            return Err(ConfigError::EmptyKeyRange {
                min: *self.key_range.start(),
                max: *self.key_range.end(),
            });
        }
        if self.backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }
        Ok(())
    }

    /// Number of extractions timed for a workload of `size` keys
    pub fn extract_count(&self, size: usize) -> usize {
        (size as f64 * self.extract_fraction) as usize
    }
}

/// A timed heap operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    ExtractMax,
    Merge,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::ExtractMax => "extract_max",
            Operation::Merge => "merge",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one timed operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Completed(Duration),
    /// The backend rejected the operation; nothing was timed
    Failed(HeapError),
}

/// One row of benchmark output
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    pub backend: Backend,
    pub size: usize,
    pub operation: Operation,
    pub outcome: Outcome,
}

impl BenchmarkRecord {
    /// Elapsed milliseconds, or `None` if the operation failed
    pub fn millis(&self) -> Option<f64> {
        match self.outcome {
            Outcome::Completed(elapsed) => Some(elapsed.as_secs_f64() * 1000.0),
            Outcome::Failed(_) => None,
        }
    }
}

/// Draws `size` keys uniformly from `range`
pub fn generate_keys<R: Rng>(
    rng: &mut R,
    size: usize,
    range: RangeInclusive<i32>,
) -> Vec<i32> {
    (0..size).map(|_| rng.gen_range(range.clone())).collect()
}

/// Keys fed to every backend for one input size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub size: usize,
    /// Inserted, extracted from, and used as the merge receiver
    pub primary: Vec<i32>,
    /// Used as the merge donor
    pub secondary: Vec<i32>,
}

impl Workload {
    pub fn generate<R: Rng>(rng: &mut R, size: usize, range: RangeInclusive<i32>) -> Self {
        let primary = generate_keys(rng, size, range.clone());
        let secondary = generate_keys(rng, size, range);
        Workload {
            size,
            primary,
            secondary,
        }
    }
}

/// Runs `f` once and measures its wall-clock time
fn time<R>(f: impl FnOnce() -> R) -> (R, Duration) {
    let start = Instant::now();
    let result = black_box(f());
    (result, start.elapsed())
}

/// Drives every configured backend through the same workloads
pub struct Benchmark {
    config: BenchmarkConfig,
    rng: StdRng,
}

impl Benchmark {
    /// Validates `config` and seeds the workload generator
    pub fn new(config: BenchmarkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Benchmark { config, rng })
    }

    /// The validated configuration this run uses
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Generates one workload per configured size
    pub fn workloads(&mut self) -> Vec<Workload> {
        let range = self.config.key_range.clone();
        self.config
            .sizes
            .iter()
            .map(|&size| Workload::generate(&mut self.rng, size, range.clone()))
            .collect()
    }

    /// Runs every backend on every workload
    ///
    /// Records are grouped by backend, then by size, then ordered
    /// insert / extract_max / merge.
    pub fn run(&mut self) -> Vec<BenchmarkRecord> {
        let workloads = self.workloads();
        let mut records = Vec::with_capacity(self.config.backends.len() * workloads.len() * 3);

        for &backend in &self.config.backends {
            for workload in &workloads {
                log::info!("benchmarking {} with {} keys", backend, workload.size);
                records.extend(self.run_workload(backend, workload));
            }
        }

        records
    }

    /// Times the three operations of one backend on one workload
    pub fn run_workload(&self, backend: Backend, workload: &Workload) -> [BenchmarkRecord; 3] {
        let record = |operation, outcome| {
            let record = BenchmarkRecord {
                backend,
                size: workload.size,
                operation,
                outcome,
            };
            log::debug!("{:?}", record);
            record
        };

        let mut heap = backend.create::<i32>();
        let ((), insert_time) = time(|| fill(&mut heap, &workload.primary));

        let extract_count = self.config.extract_count(workload.size);
        let ((), extract_time) = time(|| {
            for _ in 0..extract_count {
                if heap.is_empty() {
                    break;
                }
                let _ = black_box(heap.extract_max());
            }
        });

        let mut receiver = backend.create::<i32>();
        let mut donor = backend.create::<i32>();
        fill(&mut receiver, &workload.primary);
        fill(&mut donor, &workload.secondary);

        let merge_outcome = match time(|| receiver.merge(&mut donor)) {
            (Ok(()), elapsed) => Outcome::Completed(elapsed),
            (Err(error), _) => {
                log::warn!("{} merge skipped: {}", backend, error);
                Outcome::Failed(error)
            }
        };

        [
            record(Operation::Insert, Outcome::Completed(insert_time)),
            record(Operation::ExtractMax, Outcome::Completed(extract_time)),
            record(Operation::Merge, merge_outcome),
        ]
    }
}

/// Untimed setup: inserts every key
fn fill<H: Heap<i32>>(heap: &mut H, keys: &[i32]) {
    for &key in keys {
        heap.insert(key);
    }
}

/// One CSV line: `Heap,Size,Operation,Time(ms)`
#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Heap")]
    heap: &'a str,
    #[serde(rename = "Size")]
    size: usize,
    #[serde(rename = "Operation")]
    operation: &'a str,
    /// Milliseconds with microsecond precision, `-1` when unsupported
    #[serde(rename = "Time(ms)")]
    time_ms: String,
}

/// Writes `records` as CSV with a header row
///
/// Failed operations are reported with a time of `-1`.
pub fn write_csv<W: io::Write>(records: &[BenchmarkRecord], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(CsvRow {
            heap: record.backend.name(),
            size: record.size,
            operation: record.operation.name(),
            time_ms: match record.millis() {
                Some(ms) => format!("{ms:.3}"),
                None => "-1".to_string(),
            },
        })?;
    }
    writer.flush()?;
    Ok(())
}
