//! Per-snapshot average price report.
//!
//! For every snapshot, accumulates the current price of each record and
//! flushes one line (the snapshot label followed by the arithmetic mean)
//! when the snapshot ends (next label observed, or end-of-feed).

use std::path::PathBuf;

use crate::error::Result;
use crate::feed::{EndOfFeedDetector, ReportObserver};
use crate::sink::ReportSink;
use crate::types::StockRecord;

// ============================================================================
// Running mean
// ============================================================================

/// Incremental arithmetic mean over one snapshot's prices.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningMean {
    /// Number of samples
    count: u64,

    /// Sum of samples
    sum: f64,
}

impl RunningMean {
    /// Add one sample.
    #[inline]
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    /// Number of samples seen.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Arithmetic mean, `None` with no samples.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }

    /// Drop all samples.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Average report
// ============================================================================

/// Statistics for the average report.
#[derive(Debug, Clone, Default)]
pub struct AverageReportStats {
    /// Records accumulated (end-of-feed re-delivery excluded)
    pub records_seen: u64,

    /// Snapshot groups flushed
    pub groups_flushed: u64,
}

/// Per-snapshot average price aggregator.
///
/// # Example
///
/// ```no_run
/// use ticker_reports::AverageReport;
///
/// let report = AverageReport::new("Averages.dat");
/// // report.update(&record)? for every record in the feed
/// ```
pub struct AverageReport {
    /// Output sink
    sink: ReportSink,

    /// Label of the snapshot currently accumulating
    current_snapshot: String,

    /// Price accumulator for the current snapshot
    prices: RunningMean,

    /// End-of-feed tracker
    end_of_feed: EndOfFeedDetector,

    /// Statistics
    stats: AverageReportStats,
}

impl AverageReport {
    /// Create an average report writing to the given destination.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            sink: ReportSink::new(path.into()),
            current_snapshot: String::new(),
            prices: RunningMean::default(),
            end_of_feed: EndOfFeedDetector::new(),
            stats: AverageReportStats::default(),
        }
    }

    /// Whether the final flush has happened.
    pub fn is_finished(&self) -> bool {
        self.end_of_feed.is_finished()
    }

    /// Label of the snapshot currently accumulating.
    pub fn snapshot_label(&self) -> &str {
        &self.current_snapshot
    }

    /// Number of samples in the current snapshot.
    pub fn sample_count(&self) -> u64 {
        self.prices.count()
    }

    /// Get statistics.
    pub fn stats(&self) -> &AverageReportStats {
        &self.stats
    }

    /// Get the output sink.
    pub fn sink(&self) -> &ReportSink {
        &self.sink
    }

    /// Flush the accumulated snapshot as `"<label> <mean>"`.
    fn flush_current(&mut self) -> Result<()> {
        let mean = match self.prices.mean() {
            Some(mean) => mean,
            None => return Ok(()),
        };

        let line = format!("{} {}", self.current_snapshot, mean);
        self.sink.append_group(&[line])?;
        self.stats.groups_flushed += 1;
        self.prices.reset();

        Ok(())
    }
}

impl ReportObserver for AverageReport {
    fn name(&self) -> &str {
        "averages"
    }

    fn update(&mut self, record: &StockRecord) -> Result<()> {
        let was_finished = self.end_of_feed.is_finished();
        if self.end_of_feed.observe(record.ticker()) {
            // Final re-delivery: flush what is buffered, exactly once. The
            // repeated record itself is not a new sample.
            if !was_finished {
                self.flush_current()?;
            }
            return Ok(());
        }

        if record.snapshot != self.current_snapshot {
            // Snapshot boundary (or very first record): emit the prior group
            // before accumulating under the new label.
            self.flush_current()?;
            self.current_snapshot = record.snapshot.clone();
        }

        self.prices.add(record.quote.current);
        self.stats.records_seen += 1;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
