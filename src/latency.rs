//! Lock and semaphore latency probe.
//!
//! Times individual lock/unlock (or acquire/release) pairs over a fixed
//! wall-clock window, pausing between samples, and reduces the raw samples
//! to min/max/mean/stddev. Raw samples can be dumped as a flat two-column
//! `<index> <nanoseconds>` file for plotting.
//!
//! This instrument has no shared-state protocol of its own: it is a
//! single-threaded measurement loop over uncontended primitives. It lives
//! here because the primitives it measures are the ones the pipeline runs on.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use handoff::latency::{ProbeConfig, probe_mutex, summarize};
//!
//! let config = ProbeConfig {
//!     duration: Duration::from_millis(20),
//!     pause: Duration::ZERO,
//!     pin_cpu: None,
//! };
//!
//! let samples = probe_mutex(&config);
//! let summary = summarize(&samples);
//! assert!(summary.count > 0);
//! assert!(summary.min <= summary.max);
//! ```

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use minstant::Instant;
use tracing::info;

use crate::sync::Semaphore;

/// Configuration for a sampling run.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Wall-clock measurement window.
    pub duration: Duration,
    /// Pause between samples, keeping the loop from measuring only its own
    /// cache-hot fast path.
    pub pause: Duration,
    /// Pin the sampling thread to this CPU for stable timings.
    pub pin_cpu: Option<usize>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60),
            pause: Duration::from_micros(1000),
            pin_cpu: None,
        }
    }
}

/// Descriptive statistics over one probe's samples, in nanoseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySummary {
    pub count: usize,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    /// Population standard deviation (divides by `count`).
    pub std_dev: f64,
}

/// Times mutex lock/unlock pairs over the configured window.
#[must_use]
pub fn probe_mutex(config: &ProbeConfig) -> Vec<u64> {
    info!(duration_ms = config.duration.as_millis() as u64, "mutex probe starting");

    let mutex = Mutex::new(());
    sample_until_deadline(config, || {
        drop(mutex.lock().unwrap_or_else(PoisonError::into_inner));
    })
}

/// Times semaphore acquire/release pairs over the configured window.
#[must_use]
pub fn probe_semaphore(config: &ProbeConfig) -> Vec<u64> {
    info!(
        duration_ms = config.duration.as_millis() as u64,
        "semaphore probe starting"
    );

    let semaphore = Semaphore::new(1);
    sample_until_deadline(config, || {
        semaphore.acquire();
        semaphore.release();
    })
}

/// Runs `op` repeatedly until the window elapses, recording each call's
/// latency in nanoseconds.
fn sample_until_deadline(config: &ProbeConfig, mut op: impl FnMut()) -> Vec<u64> {
    pin_to_cpu(config.pin_cpu);

    // Sized so steady sampling never reallocates mid-window.
    let estimate = if config.pause.is_zero() {
        4096
    } else {
        (config.duration.as_nanos() / config.pause.as_nanos()) as usize + 1
    };
    let mut samples = Vec::with_capacity(estimate);

    let deadline = Instant::now() + config.duration;
    while Instant::now() < deadline {
        let start = Instant::now();
        op();
        samples.push(start.elapsed().as_nanos() as u64);

        if !config.pause.is_zero() {
            thread::sleep(config.pause);
        }
    }

    samples
}

fn pin_to_cpu(cpu: Option<usize>) {
    if let Some(id) = cpu {
        core_affinity::set_for_current(core_affinity::CoreId { id });
    }
}

/// Reduces raw samples to min/max/mean/stddev.
///
/// An empty slice reduces to all zeros.
#[must_use]
pub fn summarize(samples: &[u64]) -> LatencySummary {
    if samples.is_empty() {
        return LatencySummary {
            count: 0,
            min: 0,
            max: 0,
            mean: 0.0,
            std_dev: 0.0,
        };
    }

    let mut min = samples[0];
    let mut max = samples[0];
    let mut total: u128 = 0;
    for &sample in samples {
        total += u128::from(sample);
        min = min.min(sample);
        max = max.max(sample);
    }

    let mean = total as f64 / samples.len() as f64;

    let sum_sq: f64 = samples
        .iter()
        .map(|&sample| {
            let delta = sample as f64 - mean;
            delta * delta
        })
        .sum();
    let std_dev = (sum_sq / samples.len() as f64).sqrt();

    LatencySummary {
        count: samples.len(),
        min,
        max,
        mean,
        std_dev,
    }
}

/// Writes samples as `<index> <nanoseconds>` lines, 1-based index.
///
/// # Errors
///
/// Returns any I/O error from creating or writing the file.
pub fn write_samples<P: AsRef<Path>>(samples: &[u64], path: P) -> std::io::Result<()> {
    let mut file = BufWriter::new(std::fs::File::create(path)?);
    for (index, sample) in samples.iter().enumerate() {
        writeln!(file, "{} {}", index + 1, sample)?;
    }
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_known_values() {
        let samples = vec![2, 4, 4, 4, 5, 5, 7, 9];
        let summary = summarize(&samples);

        assert_eq!(summary.count, 8);
        assert_eq!(summary.min, 2);
        assert_eq!(summary.max, 9);
        assert!((summary.mean - 5.0).abs() < f64::EPSILON);
        // Textbook population stddev of this set is exactly 2.
        assert!((summary.std_dev - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.min, 0);
        assert_eq!(summary.max, 0);
        assert!((summary.mean - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summarize_single_sample() {
        let summary = summarize(&[42]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.min, 42);
        assert_eq!(summary.max, 42);
        assert!((summary.mean - 42.0).abs() < f64::EPSILON);
        assert!((summary.std_dev - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_write_samples_format() {
        let path = std::env::temp_dir().join(format!("handoff-samples-{}.dat", std::process::id()));
        write_samples(&[120, 340, 90], &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "1 120\n2 340\n3 90\n");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_probes_collect_samples() {
        let config = ProbeConfig {
            duration: Duration::from_millis(20),
            pause: Duration::ZERO,
            pin_cpu: None,
        };

        let mutex_samples = probe_mutex(&config);
        let sem_samples = probe_semaphore(&config);

        assert!(!mutex_samples.is_empty());
        assert!(!sem_samples.is_empty());
    }
}
