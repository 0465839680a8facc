use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use thiserror::Error;

/// Error types for the timer.
#[derive(Debug, Error)]
pub enum TimerError {
    /// No samples were recorded under the given name.
    #[error("No timing records for {0}")]
    NotFound(String),

    /// Writing the timing records failed.
    #[error("Failed to write timing records")]
    IoError(#[from] std::io::Error),
}

/// Records wall-clock durations of named closures.
///
/// The timer is a plain value owned by the caller; share it by passing `&mut Timer` around.
///
/// # Example
///
/// ```
/// use navfuse_core::timer::Timer;
///
/// let mut timer = Timer::new();
/// let sum = timer.evaluate("sum", || (0..100).sum::<u64>());
/// assert_eq!(sum, 4950);
/// assert_eq!(timer.num_calls("sum"), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Timer {
    records: BTreeMap<String, Vec<f64>>,
}

impl Timer {
    /// Create an empty timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `func` and record its duration in milliseconds under `name`.
    pub fn evaluate<R>(&mut self, name: &str, func: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = func();
        let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

        self.records
            .entry(name.to_string())
            .or_default()
            .push(elapsed_ms);

        result
    }

    /// Mean duration in milliseconds of the calls recorded under `name`.
    pub fn mean_time(&self, name: &str) -> Result<f64, TimerError> {
        match self.records.get(name) {
            Some(samples) if !samples.is_empty() => {
                Ok(samples.iter().sum::<f64>() / samples.len() as f64)
            }
            _ => Err(TimerError::NotFound(name.to_string())),
        }
    }

    /// Number of calls recorded under `name`.
    pub fn num_calls(&self, name: &str) -> usize {
        self.records.get(name).map_or(0, Vec::len)
    }

    /// All recorded samples, keyed by name.
    pub fn records(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.records.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Log the call count and mean duration of every recorded function.
    pub fn print_all(&self) {
        for (name, samples) in &self.records {
            let mean = samples.iter().sum::<f64>() / samples.len().max(1) as f64;
            log::info!("{name}: {} calls, mean {mean:.4} ms", samples.len());
        }
    }

    /// Write one line per function: the name followed by every recorded duration.
    pub fn dump_into_file(&self, path: impl AsRef<Path>) -> Result<(), TimerError> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        for (name, samples) in &self.records {
            write!(writer, "{name}")?;
            for sample in samples {
                write!(writer, " {sample}")?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;

        log::debug!("timing records written to {}", path.as_ref().display());
        Ok(())
    }

    /// Drop all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
