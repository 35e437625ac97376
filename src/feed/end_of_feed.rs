//! End-of-feed detection for the ticker stream.
//!
//! The feed has no explicit end-of-stream marker. Its termination convention
//! is re-delivery: once the source sees two consecutive blank lines, the last
//! record is delivered one more time, and a consecutively repeated ticker is
//! the signal that the feed is done and pending groups must flush.
//!
//! Each aggregator owns its own detector so that a period of unsubscription
//! cannot desynchronize the shared notion of "last ticker seen".
//!
//! # Example
//!
//! ```
//! use ticker_reports::EndOfFeedDetector;
//!
//! let mut detector = EndOfFeedDetector::new();
//! assert!(!detector.observe("ACM"));
//! assert!(!detector.observe("MCD"));
//! assert!(detector.observe("MCD")); // re-delivery
//! assert!(detector.is_finished());
//! ```

/// Detects the feed's repeated-ticker termination convention.
///
/// # Caveat
///
/// Ticker equality is an implicit protocol: two genuinely distinct adjacent
/// records sharing a ticker would be misread as end-of-feed. The upstream
/// feed never produces that shape (tickers are unique within a snapshot and
/// every snapshot has more than one record), so observable behavior is
/// preserved rather than redesigned, but the fragility lives here, in one
/// place.
#[derive(Debug, Clone, Default)]
pub struct EndOfFeedDetector {
    /// Ticker of the previously observed record
    last_ticker: Option<String>,

    /// Latched once the termination signal has been seen
    finished: bool,
}

impl EndOfFeedDetector {
    /// Create a new detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the ticker of the next delivered record.
    ///
    /// Returns `true` when this delivery is the end-of-feed signal (the same
    /// ticker as the immediately preceding record, or any delivery after the
    /// signal has latched). The tracker advances on every call, including for
    /// records the owning aggregator otherwise ignores.
    pub fn observe(&mut self, ticker: &str) -> bool {
        if self.finished {
            return true;
        }

        let repeated = self.last_ticker.as_deref() == Some(ticker);
        if repeated {
            self.finished = true;
        } else {
            self.last_ticker = Some(ticker.to_string());
        }

        repeated
    }

    /// Whether the termination signal has been observed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Ticker of the most recently observed record.
    pub fn last_ticker(&self) -> Option<&str> {
        self.last_ticker.as_deref()
    }

    /// Reset the detector to its initial state.
    pub fn reset(&mut self) {
        self.last_ticker = None;
        self.finished = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_record_is_not_a_signal() {
        let mut detector = EndOfFeedDetector::new();
        assert!(!detector.observe("ACM"));
        assert!(!detector.is_finished());
        assert_eq!(detector.last_ticker(), Some("ACM"));
    }

    #[test]
    fn test_distinct_consecutive_tickers() {
        let mut detector = EndOfFeedDetector::new();
        assert!(!detector.observe("ACM"));
        assert!(!detector.observe("MCD"));
        assert!(!detector.observe("ACM")); // non-adjacent repeat is fine
        assert!(!detector.is_finished());
    }

    #[test]
    fn test_consecutive_repeat_latches() {
        let mut detector = EndOfFeedDetector::new();
        detector.observe("ACM");
        detector.observe("MCD");
        assert!(detector.observe("MCD"));
        assert!(detector.is_finished());

        // Anything after the latch still reads as finished.
        assert!(detector.observe("XYZ"));
    }

    #[test]
    fn test_reset() {
        let mut detector = EndOfFeedDetector::new();
        detector.observe("ACM");
        detector.observe("ACM");
        assert!(detector.is_finished());

        detector.reset();
        assert!(!detector.is_finished());
        assert!(detector.last_ticker().is_none());
        assert!(!detector.observe("ACM"));
    }
}
