//! Benchmark-report metrics and JSON export for CLI `sign`/`recover` runs.

use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::serde::ts_seconds;
use serde::{Deserialize, Serialize};

/// Metrics collected from one CLI `sign` or `recover` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    pub operation: String,
    pub h: u32,
    pub s: u32,
    #[serde(with = "ts_seconds")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub elapsed: Duration,
    pub bytes_processed: usize,
}

impl RunMetrics {
    pub fn new(operation: &str, h: u32, s: u32, elapsed: Duration, bytes_processed: usize) -> Self {
        Self {
            operation: operation.to_string(),
            h,
            s,
            timestamp: chrono::Utc::now(),
            elapsed,
            bytes_processed,
        }
    }

    /// Measures execution time of a closure.
    pub fn measure_time<F, R>(f: F) -> (Duration, R)
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        (start.elapsed(), result)
    }
}

/// Accumulates [`RunMetrics`] across a session and exports them.
#[derive(Debug, Default)]
pub struct BenchmarkReport {
    metrics: Vec<RunMetrics>,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self { metrics: Vec::new() }
    }

    pub fn add_metrics(&mut self, metrics: RunMetrics) {
        self.metrics.push(metrics);
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        let json = serde_json::to_string_pretty(&self.metrics)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads a previously saved report from `path`. Returns an empty report
    /// if the file does not exist yet; a pre-existing file that fails to
    /// parse as a metrics array is still an error, since silently discarding
    /// it would be as surprising as silently overwriting it.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path)?;
        let metrics: Vec<RunMetrics> = serde_json::from_str(&contents)?;
        Ok(Self { metrics })
    }

    pub fn summary(&self) -> String {
        if self.metrics.is_empty() {
            return "No metrics available".to_string();
        }
        let total_runs = self.metrics.len();
        let avg_secs = self.metrics.iter().map(|m| m.elapsed.as_secs_f64()).sum::<f64>() / total_runs as f64;
        let total_bytes: usize = self.metrics.iter().map(|m| m.bytes_processed).sum();
        format!(
            "Benchmark Summary:\nTotal runs: {total_runs}\nAverage elapsed time: {avg_secs:.6}s\nTotal bytes processed: {total_bytes}"
        )
    }
}
