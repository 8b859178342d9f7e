//! Per-run measurement report
//!
//! Collected by the controller side of every bridge: wall-clock
//! duration, row/round/notification counts, and an HDR histogram of the
//! latency between consecutive controller notifications.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use hdrhistogram::Histogram;
use serde::Serialize;

use crate::config::BridgeMode;
use crate::utils::Result;

/// Highest trackable notification latency: one hour, in microseconds.
const HISTOGRAM_MAX_US: u64 = 3_600_000_000;

/// Result of one bridging session.
#[derive(Debug)]
pub struct RunReport {
    /// Strategy that produced this run
    pub mode: BridgeMode,
    /// Total rows stepped by the worker
    pub rows: u64,
    /// Rounds the batch runner executed
    pub rounds: u64,
    /// Completion notifications the controller observed
    pub notifications: u64,
    /// Total wall-clock duration
    pub duration: Duration,
    /// Latency between consecutive controller notifications (microseconds)
    histogram: Histogram<u64>,
}

impl RunReport {
    pub fn new(mode: BridgeMode) -> Self {
        Self {
            mode,
            rows: 0,
            rounds: 0,
            notifications: 0,
            duration: Duration::ZERO,
            histogram: Histogram::new_with_bounds(1, HISTOGRAM_MAX_US, 3)
                .expect("Failed to create histogram"),
        }
    }

    /// Record one controller notification and its latency since the
    /// previous one.
    pub(crate) fn record_notification(&mut self, latency: Duration) {
        self.notifications += 1;
        let micros = (latency.as_micros() as u64).clamp(1, HISTOGRAM_MAX_US);
        let _ = self.histogram.record(micros);
    }

    /// Rows per second over the whole run.
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.rows as f64 / secs
        } else {
            0.0
        }
    }

    /// Notification latency percentile in microseconds.
    pub fn percentile_us(&self, p: f64) -> u64 {
        self.histogram.value_at_percentile(p)
    }

    /// Notification latency percentile in milliseconds.
    pub fn percentile_ms(&self, p: f64) -> f64 {
        self.percentile_us(p) as f64 / 1000.0
    }

    /// Print summary (compact format)
    pub fn print_summary(&self) {
        println!("\n=== {} ===", self.mode.as_str());
        println!(
            "Rows: {} | Rounds: {} | Notifications: {} | Duration: {:.3}s | {:.0} rows/s",
            self.rows,
            self.rounds,
            self.notifications,
            self.duration.as_secs_f64(),
            self.throughput(),
        );
        if self.notifications > 0 {
            println!(
                "Notify latency (ms): avg={:.3} p50={:.3} p95={:.3} p99={:.3} max={:.3}",
                self.histogram.mean() / 1000.0,
                self.percentile_ms(50.0),
                self.percentile_ms(95.0),
                self.percentile_ms(99.0),
                self.histogram.max() as f64 / 1000.0,
            );
        }
    }

    /// Write a flat JSON summary of this run.
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let summary = ReportSummary {
            mode: self.mode.as_str(),
            rows: self.rows,
            rounds: self.rounds,
            notifications: self.notifications,
            duration_secs: self.duration.as_secs_f64(),
            rows_per_sec: self.throughput(),
            notify_latency_us: LatencySummary {
                mean: self.histogram.mean(),
                p50: self.percentile_us(50.0),
                p95: self.percentile_us(95.0),
                p99: self.percentile_us(99.0),
                max: self.histogram.max(),
            },
        };

        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &summary)
            .map_err(|err| crate::utils::BenchmarkError::Io(err.into()))?;
        Ok(())
    }
}

/// Flat serialized form of a [`RunReport`].
#[derive(Debug, Serialize)]
struct ReportSummary {
    mode: &'static str,
    rows: u64,
    rounds: u64,
    notifications: u64,
    duration_secs: f64,
    rows_per_sec: f64,
    notify_latency_us: LatencySummary,
}

#[derive(Debug, Serialize)]
struct LatencySummary {
    mean: f64,
    p50: u64,
    p95: u64,
    p99: u64,
    max: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_notification_counts_and_clamps() {
        let mut report = RunReport::new(BridgeMode::Semaphore);
        report.record_notification(Duration::ZERO);
        report.record_notification(Duration::from_micros(250));

        assert_eq!(report.notifications, 2);
        // The zero-latency sample was clamped into the trackable range.
        assert!(report.percentile_us(100.0) >= 250);
    }

    #[test]
    fn test_throughput_handles_zero_duration() {
        let report = RunReport::new(BridgeMode::Sync);
        assert_eq!(report.throughput(), 0.0);
    }
}
