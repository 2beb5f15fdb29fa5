use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use max_heap_engine::benchmark::{
    write_csv, Benchmark, BenchmarkConfig, DEFAULT_EXTRACT_FRACTION, DEFAULT_MAX_KEY,
    DEFAULT_MIN_KEY, DEFAULT_SEED, DEFAULT_SIZES,
};
use max_heap_engine::Backend;

/// Times insert, extract_max and merge on the binary, binomial and Fibonacci
/// max-heaps and prints the results as CSV.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Comma-separated workload sizes
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SIZES.to_vec())]
    sizes: Vec<usize>,

    /// Fraction of each workload extracted after inserting it
    #[arg(long, default_value_t = DEFAULT_EXTRACT_FRACTION)]
    extract_fraction: f64,

    /// Seed for the key generator
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Backend to run (binary, binomial, fibonacci); repeat for several.
    /// All three run when omitted.
    #[arg(long = "backend", value_name = "BACKEND")]
    backends: Vec<Backend>,

    /// Smallest generated key
    #[arg(long, default_value_t = DEFAULT_MIN_KEY, allow_hyphen_values = true)]
    min_key: i32,

    /// Largest generated key
    #[arg(long, default_value_t = DEFAULT_MAX_KEY, allow_hyphen_values = true)]
    max_key: i32,

    /// Write the CSV here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> BenchmarkConfig {
        let backends = if self.backends.is_empty() {
            Backend::ALL.to_vec()
        } else {
            self.backends.clone()
        };
        BenchmarkConfig {
            sizes: self.sizes.clone(),
            extract_fraction: self.extract_fraction,
            seed: self.seed,
            key_range: self.min_key..=self.max_key,
            backends,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut benchmark = Benchmark::new(cli.config()).context("invalid benchmark configuration")?;
    let config = benchmark.config();
    log::info!(
        "seed {}, sizes {:?}, extract fraction {}",
        config.seed,
        config.sizes,
        config.extract_fraction
    );

    let records = benchmark.run();

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_csv(&records, file)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("wrote {} rows to {}", records.len(), path.display());
        }
        None => write_csv(&records, io::stdout().lock()).context("failed to write to stdout")?,
    }

    Ok(())
}
