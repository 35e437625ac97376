//! 52-week record-close report.
//!
//! Collects records whose current price closed within 1% of the 52-week high
//! or low. Each flushed group opens with its snapshot label, followed by one
//! line per qualifying record, in arrival order.

use std::path::PathBuf;

use crate::error::Result;
use crate::feed::{EndOfFeedDetector, ReportObserver};
use crate::sink::ReportSink;
use crate::types::StockRecord;

/// Statistics for the record-close report.
#[derive(Debug, Clone, Default)]
pub struct RecordCloseStats {
    /// Records inspected (end-of-feed re-delivery excluded)
    pub records_seen: u64,

    /// Records that qualified
    pub records_matched: u64,

    /// Snapshot groups flushed
    pub groups_flushed: u64,
}

/// Aggregator for stocks closing within 1% of their 52-week extremes.
///
/// A record qualifies when `current + current/100 >= high` or
/// `current - current/100 <= low`; boundary values exactly at the threshold
/// qualify. Non-qualifying records are skipped for buffering but still
/// advance the end-of-feed tracker.
pub struct RecordCloseReport {
    /// Output sink
    sink: ReportSink,

    /// Label of the snapshot currently buffering; advances only on
    /// qualifying records
    current_snapshot: String,

    /// Buffered group: label line first, then one line per qualifying record
    buffer: Vec<String>,

    /// End-of-feed tracker
    end_of_feed: EndOfFeedDetector,

    /// Statistics
    stats: RecordCloseStats,
}

impl RecordCloseReport {
    /// Create a record-close report writing to the given destination.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            sink: ReportSink::new(path.into()),
            current_snapshot: String::new(),
            buffer: Vec::new(),
            end_of_feed: EndOfFeedDetector::new(),
            stats: RecordCloseStats::default(),
        }
    }

    /// Whether the final flush has happened.
    pub fn is_finished(&self) -> bool {
        self.end_of_feed.is_finished()
    }

    /// Number of lines currently buffered (label line included).
    pub fn buffered_lines(&self) -> usize {
        self.buffer.len()
    }

    /// Get statistics.
    pub fn stats(&self) -> &RecordCloseStats {
        &self.stats
    }

    /// Get the output sink.
    pub fn sink(&self) -> &ReportSink {
        &self.sink
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        self.sink.append_group(&self.buffer)?;
        self.stats.groups_flushed += 1;
        self.buffer.clear();

        Ok(())
    }

    fn format_line(record: &StockRecord) -> String {
        format!(
            "{} {} {} {}",
            record.quote.ticker, record.quote.current, record.quote.high, record.quote.low
        )
    }
}

impl ReportObserver for RecordCloseReport {
    fn name(&self) -> &str {
        "record-close"
    }

    fn update(&mut self, record: &StockRecord) -> Result<()> {
        let was_finished = self.end_of_feed.is_finished();
        if self.end_of_feed.observe(record.ticker()) {
            if !was_finished {
                self.flush_buffer()?;
            }
            return Ok(());
        }

        self.stats.records_seen += 1;

        if !record.is_near_52_week_extreme() {
            return Ok(());
        }

        self.stats.records_matched += 1;

        if record.snapshot != self.current_snapshot {
            // First qualifying record of a new snapshot: emit the prior
            // group, then open the new one with its label line.
            self.flush_buffer()?;
            self.buffer.push(record.snapshot.clone());
            self.current_snapshot = record.snapshot.clone();
        }

        self.buffer.push(Self::format_line(record));

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Quote;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique_temp_path(name: &str) -> PathBuf {
        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "rc_test_{}_{}_{}.dat",
            std::process::id(),
            name,
            counter
        ))
    }

    fn record(snapshot: &str, ticker: &str, current: f64, high: f64, low: f64) -> StockRecord {
        Quote {
            company: "Test Co".to_string(),
            ticker: ticker.to_string(),
            current,
            dollar_change: 0.0,
            percent_change: 0.0,
            ytd_change: 0.0,
            high,
            low,
            pe_ratio: 10.0,
        }
        .into_record(snapshot)
    }

    #[test]
    fn test_qualifying_record_is_buffered_with_label() {
        let path = unique_temp_path("qualify");
        let _ = fs::remove_file(&path);

        let mut report = RecordCloseReport::new(&path);
        report.update(&record("day1", "HI", 100.0, 101.0, 10.0)).unwrap();
        report.update(&record("day1", "HI", 100.0, 101.0, 10.0)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "day1\nHI 100 101 10\n\n");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_threshold_boundaries() {
        let path = unique_temp_path("threshold");
        let mut report = RecordCloseReport::new(&path);

        // Exactly at +1%: included.
        report.update(&record("d", "A", 100.0, 101.0, 0.0)).unwrap();
        assert_eq!(report.stats().records_matched, 1);

        // Just past +1%: excluded.
        report.update(&record("d", "B", 100.0, 101.01, 0.0)).unwrap();
        assert_eq!(report.stats().records_matched, 1);

        // Exactly at -1%: included.
        report.update(&record("d", "C", 100.0, 1000.0, 99.0)).unwrap();
        assert_eq!(report.stats().records_matched, 2);

        // Just past -1%: excluded.
        report.update(&record("d", "D", 100.0, 1000.0, 98.99)).unwrap();
        assert_eq!(report.stats().records_matched, 2);
    }

    #[test]
    fn test_non_qualifying_records_still_advance_eof_tracker() {
        let path = unique_temp_path("tracker");
        let _ = fs::remove_file(&path);

        let mut report = RecordCloseReport::new(&path);
        report.update(&record("day1", "HI", 100.0, 101.0, 10.0)).unwrap();
        // Does not qualify, but its re-delivery must still end the feed.
        report.update(&record("day1", "NO", 50.0, 100.0, 10.0)).unwrap();
        report.update(&record("day1", "NO", 50.0, 100.0, 10.0)).unwrap();

        assert!(report.is_finished());
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "day1\nHI 100 101 10\n\n");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_two_snapshots_yield_two_groups_in_order() {
        let path = unique_temp_path("two_groups");
        let _ = fs::remove_file(&path);

        let mut report = RecordCloseReport::new(&path);
        report.update(&record("day1", "X", 100.0, 100.5, 0.0)).unwrap();
        report.update(&record("day1", "Y", 100.0, 1000.0, 99.5)).unwrap();
        report.update(&record("day2", "Z", 200.0, 201.0, 0.0)).unwrap();
        report.update(&record("day2", "Z", 200.0, 201.0, 0.0)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "day1\nX 100 100.5 0\nY 100 1000 99.5\n\nday2\nZ 200 201 0\n\n"
        );
        assert_eq!(report.stats().groups_flushed, 2);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_no_qualifying_records_writes_no_file() {
        let path = unique_temp_path("no_match");
        let _ = fs::remove_file(&path);

        let mut report = RecordCloseReport::new(&path);
        report.update(&record("day1", "A", 50.0, 100.0, 10.0)).unwrap();
        report.update(&record("day1", "B", 50.0, 100.0, 10.0)).unwrap();
        report.update(&record("day1", "B", 50.0, 100.0, 10.0)).unwrap();

        assert!(report.is_finished());
        assert!(!path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_snapshot_tracker_advances_only_on_qualifying_records() {
        let path = unique_temp_path("lazy_label");
        let _ = fs::remove_file(&path);

        let mut report = RecordCloseReport::new(&path);
        // day1 has no qualifying records; day2's first qualifier must still
        // open its group with the day2 label.
        report.update(&record("day1", "A", 50.0, 100.0, 10.0)).unwrap();
        report.update(&record("day2", "B", 100.0, 101.0, 10.0)).unwrap();
        report.update(&record("day2", "B", 100.0, 101.0, 10.0)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "day2\nB 100 101 10\n\n");

        let _ = fs::remove_file(&path);
    }
}
