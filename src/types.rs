//! Core data types for the ticker feed and its derived reports.
//!
//! A feed line parses into exactly one [`FeedEvent`]. Quote lines become
//! [`Quote`]s, which the dispatcher stamps with the pending snapshot label to
//! form the [`StockRecord`] view that observers receive.

use serde::{Deserialize, Serialize};

/// Sentinel value for a missing P/E ratio.
///
/// The upstream format marks an absent P/E with `-` (or occasionally other
/// non-numeric text); it is the only field with a documented missing case.
pub const PE_RATIO_MISSING: f64 = -1.0;

/// One parsed quote line, not yet assigned to a snapshot.
///
/// Field order matches the fixed record schema of the feed format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Full company name (leading fields of the line, joined)
    pub company: String,

    /// Ticker symbol (e.g., "MCD")
    pub ticker: String,

    /// Current (closing) price
    pub current: f64,

    /// Day change in dollars
    pub dollar_change: f64,

    /// Day change in percent
    pub percent_change: f64,

    /// Year-to-date change in percent
    pub ytd_change: f64,

    /// 52-week high
    pub high: f64,

    /// 52-week low
    pub low: f64,

    /// Price/earnings ratio, [`PE_RATIO_MISSING`] when absent
    pub pe_ratio: f64,
}

impl Quote {
    /// Stamp this quote with the snapshot label it was delivered under.
    pub fn into_record(self, snapshot: impl Into<String>) -> StockRecord {
        StockRecord {
            snapshot: snapshot.into(),
            quote: self,
        }
    }
}

/// A quote stamped with its snapshot label.
///
/// This is the read-only view broadcast to report observers. Within one
/// snapshot, every record delivered carries the same `snapshot` label until a
/// record with a different label (or the end-of-feed signal) is observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Label of the snapshot this record belongs to
    pub snapshot: String,

    /// The underlying quote data
    pub quote: Quote,
}

impl StockRecord {
    /// Ticker symbol shorthand.
    #[inline]
    pub fn ticker(&self) -> &str {
        &self.quote.ticker
    }

    /// Check whether the current price closed within 1% of the 52-week
    /// high or low.
    ///
    /// The condition is `current + current/100 >= high` or
    /// `current - current/100 <= low`, i.e. boundary values exactly at the
    /// 1% threshold are included.
    pub fn is_near_52_week_extreme(&self) -> bool {
        let one_percent = self.quote.current / 100.0;
        self.quote.current + one_percent >= self.quote.high
            || self.quote.current - one_percent <= self.quote.low
    }

    /// Check whether the P/E ratio was missing in the source line.
    pub fn pe_ratio_missing(&self) -> bool {
        self.quote.pe_ratio == PE_RATIO_MISSING
    }
}

/// One parsed feed line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedEvent {
    /// A label line opening the next snapshot group. Carries no stock data
    /// and is never broadcast on its own.
    Timestamp(String),

    /// A stock quote line.
    Quote(Quote),

    /// The blank-line convention: re-deliver the latest record unchanged.
    /// Emitted by the feed source once two consecutive blank lines mark true
    /// end-of-input, and propagated verbatim to trigger the final flush.
    Repeat,
}
