//! # ticker-reports
//!
//! Streaming snapshot report generation for stock-ticker feeds.
//!
//! This library makes a single pass over an ordered feed of ticker records,
//! grouped into timestamped "snapshots", and produces three independent
//! derived reports: a per-snapshot average price, the stocks that closed
//! within 1% of their 52-week high/low, and a full-detail view of a fixed
//! watch-list of tickers.
//!
//! ## Features
//!
//! - **📈 Snapshot Inference**: group boundaries are reconstructed from data
//!   shape alone (label lines, blank-line runs, the re-delivery convention);
//!   the feed carries no explicit end-of-snapshot marker
//! - **🔀 Observer Fan-Out**: one dispatcher broadcasts every record to the
//!   subscribed reports in subscription order, with dynamic
//!   subscribe/unsubscribe between records
//! - **🧮 Independent Aggregators**: each report owns its own snapshot state
//!   machine, buffers, and output sink
//! - **💾 Durable Flushes**: every flushed group is a scoped append-and-close
//!   write, so earlier output survives later failures
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use ticker_reports::{
//!     AverageReport, FeedDispatcher, FeedSource, RecordCloseReport, ReportPaths,
//!     Result, SelectedStocksReport, SharedObserver, TickerFile,
//! };
//!
//! fn run() -> Result<()> {
//!     let paths = ReportPaths::default();
//!
//!     let averages: SharedObserver =
//!         Rc::new(RefCell::new(AverageReport::new(&paths.averages)));
//!     let record_close: SharedObserver =
//!         Rc::new(RefCell::new(RecordCloseReport::new(&paths.record_close)));
//!     let selected: SharedObserver =
//!         Rc::new(RefCell::new(SelectedStocksReport::new(&paths.selected)));
//!
//!     let mut dispatcher = FeedDispatcher::new();
//!     dispatcher.subscribe(&averages);
//!     dispatcher.subscribe(&record_close);
//!     dispatcher.subscribe(&selected);
//!
//!     for tokens in TickerFile::new("Ticker.dat")?.lines()? {
//!         dispatcher.ingest(&tokens)?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Feed Format
//!
//! Each line is one of:
//!
//! - a timestamp label (e.g., `Jan 30, 2009 field updated 10:30 AM`), opening
//!   the next snapshot;
//! - a quote: company name, ticker, then seven numerics
//!   (`current dollar_change percent_change ytd_change high low pe_ratio`,
//!   with `-` for a missing P/E);
//! - a blank line: one separates groups, two in a row end the feed, after
//!   which the final record is re-delivered once to trigger the last flush.
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Core types: `Quote`, `StockRecord`, `FeedEvent` |
//! | [`parser`] | Schema-driven line parsing |
//! | [`feed`] | Sources, dispatcher/observer fan-out, end-of-feed detection |
//! | [`reports`] | The three report aggregators |
//! | [`sink`] | Append-only report sinks |
//! | [`config`] | Output destination configuration |

pub mod config;
pub mod error;
pub mod feed;
pub mod parser;
pub mod reports;
pub mod sink;
pub mod types;

// Re-exports - Core types
pub use error::{ReportError, Result};
pub use types::{FeedEvent, Quote, StockRecord, PE_RATIO_MISSING};

// Re-exports - Parsing
pub use parser::{parse_line, MISSING_VALUE_MARKER};

// Re-exports - Feed ingestion
pub use feed::{
    tokenize, DispatcherStats, EndOfFeedDetector, FeedDispatcher, FeedSource, FeedStats,
    ReportObserver, SharedObserver, TickerFile, TokenizedLine, VecSource, END_OF_FEED_BLANK_RUN,
};

// Re-exports - Reports
pub use reports::{
    AverageReport, AverageReportStats, RecordCloseReport, RecordCloseStats, RunningMean,
    SelectedStocksReport, SelectedStocksStats, DEFAULT_WATCH_LIST,
};

// Re-exports - Output
pub use config::ReportPaths;
pub use sink::{ReportSink, SinkStats};
