//! Watch-list detail report.
//!
//! Mirrors the snapshot/flush structure of the record-close report, but
//! filters on a fixed allow-list of tickers and emits every field of the
//! record. Tickers outside the list are ignored except for advancing the
//! end-of-feed tracker.

use std::path::PathBuf;

use ahash::AHashSet;

use crate::error::Result;
use crate::feed::{EndOfFeedDetector, ReportObserver};
use crate::sink::ReportSink;
use crate::types::StockRecord;

/// Default watch-list of tickers for the selected-stocks report.
pub const DEFAULT_WATCH_LIST: [&str; 8] = ["ALL", "BA", "BC", "GBEL", "KFT", "MCD", "TR", "WAG"];

/// Statistics for the selected-stocks report.
#[derive(Debug, Clone, Default)]
pub struct SelectedStocksStats {
    /// Records inspected (end-of-feed re-delivery excluded)
    pub records_seen: u64,

    /// Records matching the watch-list
    pub records_matched: u64,

    /// Snapshot groups flushed
    pub groups_flushed: u64,
}

/// Aggregator producing the full-detail view of watch-listed tickers.
///
/// # Example
///
/// ```no_run
/// use ticker_reports::SelectedStocksReport;
///
/// // Default watch-list
/// let report = SelectedStocksReport::new("Selected Stocks.dat");
///
/// // Custom watch-list
/// let report = SelectedStocksReport::new("mine.dat")
///     .with_watch_list(["AAPL", "MSFT"]);
/// ```
pub struct SelectedStocksReport {
    /// Output sink
    sink: ReportSink,

    /// Watch-list membership set
    watch_list: AHashSet<String>,

    /// Label of the snapshot currently buffering; advances only on
    /// watch-listed records
    current_snapshot: String,

    /// Buffered group: label line first, then one line per matched record
    buffer: Vec<String>,

    /// End-of-feed tracker
    end_of_feed: EndOfFeedDetector,

    /// Statistics
    stats: SelectedStocksStats,
}

impl SelectedStocksReport {
    /// Create a selected-stocks report with the default watch-list.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            sink: ReportSink::new(path.into()),
            watch_list: DEFAULT_WATCH_LIST.iter().map(|t| t.to_string()).collect(),
            current_snapshot: String::new(),
            buffer: Vec::new(),
            end_of_feed: EndOfFeedDetector::new(),
            stats: SelectedStocksStats::default(),
        }
    }

    /// Replace the watch-list.
    pub fn with_watch_list<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.watch_list = tickers.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a ticker is on the watch-list.
    pub fn is_watched(&self, ticker: &str) -> bool {
        self.watch_list.contains(ticker)
    }

    /// Whether the final flush has happened.
    pub fn is_finished(&self) -> bool {
        self.end_of_feed.is_finished()
    }

    /// Get statistics.
    pub fn stats(&self) -> &SelectedStocksStats {
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
        let q = &record.quote;
        format!(
            "{} {} {} {} {} {} {} {} {}",
            q.company,
            q.ticker,
            q.current,
            q.dollar_change,
            q.percent_change,
            q.ytd_change,
            q.high,
            q.low,
            q.pe_ratio
        )
    }
}

impl ReportObserver for SelectedStocksReport {
    fn name(&self) -> &str {
        "selected-stocks"
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

        if !self.is_watched(record.ticker()) {
            return Ok(());
        }

        self.stats.records_matched += 1;

        if record.snapshot != self.current_snapshot {
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
