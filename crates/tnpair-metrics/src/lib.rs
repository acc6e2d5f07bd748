#![deny(unsafe_code)]

//! Structured metric types and TSV writer for tnpair operations.
//!
//! This crate provides:
//! - [`Metric`] and [`ProcessingMetrics`] traits for extensible metric types
//! - [`pairing`] metric structs describing how each tumor was paired
//! - [`writer`] module for TSV file output

pub mod pairing;
pub mod writer;

use serde::{Deserialize, Serialize};

/// Formats a count with thousands separators.
///
/// # Examples
///
/// ```
/// use tnpair_metrics::format_count;
///
/// assert_eq!(format_count(1234567), "1,234,567");
/// assert_eq!(format_count(123), "123");
/// ```
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// A metric type that can be serialized to TSV files.
///
/// All metric types in tnpair implement this trait, providing a consistent
/// interface for serialization and identification.
pub trait Metric: Serialize + for<'de> Deserialize<'de> + Clone + Default {
    /// Human-readable name for this metric type.
    ///
    /// Used in error messages and logging when writing metrics files.
    fn metric_name() -> &'static str;
}

/// Common interface for metrics that track how many inputs made it to the output.
pub trait ProcessingMetrics {
    /// Total number of input items processed.
    fn total_input(&self) -> u64;

    /// Total number of output items produced.
    fn total_output(&self) -> u64;

    /// Total number of items dropped.
    fn total_filtered(&self) -> u64;

    /// Processing efficiency as a percentage (output / input * 100).
    fn efficiency(&self) -> f64 {
        if self.total_input() == 0 {
            0.0
        } else {
            #[expect(clippy::cast_precision_loss, reason = "sample counts never exceed 2^53")]
            let result = self.total_output() as f64 / self.total_input() as f64 * 100.0;
            result
        }
    }
}

pub use pairing::{NormalSource, PairingMetric, PairingSummaryMetrics};
pub use writer::{write_metrics, write_metrics_auto};
