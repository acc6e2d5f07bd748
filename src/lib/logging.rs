//! Logging utilities for formatted output.
//!
//! Consistent formatting of percentages, durations and rates, plus the pairing
//! summary logged at the end of a run.

use std::time::{Duration, Instant};

use tnpair_metrics::{NormalSource, PairingSummaryMetrics, ProcessingMetrics, format_count};

/// Formats a fraction (0.0-1.0) as a percentage with `decimals` places.
///
/// # Examples
///
/// ```
/// use tnpair_lib::logging::format_percent;
///
/// assert_eq!(format_percent(0.9543, 2), "95.43%");
/// assert_eq!(format_percent(1.0, 0), "100%");
/// ```
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", value * 100.0, decimals = decimals)
}

/// Formats a duration in human-readable form, e.g. "45s", "2m 15s", "1h 30m".
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let (mins, rem) = (secs / 60, secs % 60);
        if rem == 0 { format!("{mins}m") } else { format!("{mins}m {rem}s") }
    } else {
        let (hours, mins) = (secs / 3600, (secs % 3600) / 60);
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

/// Formats a rate of `count` items over `duration`.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{} items/s", format_count(count));
    }

    let rate = count as f64 / secs;
    if rate >= 1.0 {
        format!("{} items/s", format_count(rate as u64))
    } else {
        format!("{:.1} items/min", count as f64 / (secs / 60.0))
    }
}

/// Logs the tier breakdown of a pairing run.
///
/// # Examples
///
/// ```no_run
/// use tnpair_lib::logging::log_pairing_summary;
/// use tnpair_metrics::PairingSummaryMetrics;
///
/// let mut summary = PairingSummaryMetrics::new();
/// summary.tumors = 3;
/// summary.paired = 2;
/// summary.unpaired = 1;
/// log_pairing_summary(&summary);
/// ```
pub fn log_pairing_summary(summary: &PairingSummaryMetrics) {
    log::info!("Pairing Summary:");
    log::info!("  Tumors: {}", format_count(summary.total_input()));
    log::info!("  Paired: {}", format_count(summary.total_output()));
    if summary.tumors > 0 {
        log::info!("  Pair rate: {}", format_percent(summary.efficiency() / 100.0, 2));
    }

    for source in [
        NormalSource::Local,
        NormalSource::SameRequest,
        NormalSource::CrossRequest,
        NormalSource::DmpNormal,
        NormalSource::ClosestRelated,
        NormalSource::PooledNormal,
    ] {
        let count = summary.count(source);
        if count > 0 {
            log::info!("    {}: {}", source.description(), format_count(count));
        }
    }

    if summary.ambiguous > 0 {
        log::warn!("  Chosen by igo_id tie-break: {}", format_count(summary.ambiguous));
    }
    if summary.unpaired > 0 {
        log::warn!("  Unpaired tumors: {}", format_count(summary.unpaired));
    }
}

/// Operation timing helper.
///
/// ```no_run
/// use tnpair_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Pairing samples");
/// // ... do work ...
/// timer.log_completion(12);
/// ```
pub struct OperationTimer {
    operation: String,
    start_time: Instant,
}

impl OperationTimer {
    /// Creates a new timer and logs the start.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start_time: Instant::now() }
    }

    /// Logs the completion with item count and rate.
    pub fn log_completion(&self, count: u64) {
        let duration = self.start_time.elapsed();
        log::info!(
            "{} completed: {} in {} ({})",
            self.operation,
            format_count(count),
            format_duration(duration),
            format_rate(count, duration)
        );
    }
}
