//! Feed dispatcher: parse, stamp, and fan out.
//!
//! The dispatcher owns the authoritative mutable view of the feed: the most
//! recent timestamp label and the most recent stamped record. Every
//! successfully parsed quote is broadcast to the subscribed observers in
//! subscription order; a repeat signal re-broadcasts the unchanged latest
//! view, which is how the final flush reaches the aggregators.
//!
//! Observers are shared handles (`Rc<RefCell<_>>`): the run is single
//! threaded, the driver keeps its own handles, and identity is pointer
//! equality, so unsubscribing and later resubscribing the same observer
//! resumes its accumulated state.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::parser::parse_line;
use crate::types::{FeedEvent, StockRecord};

// ============================================================================
// Observer contract
// ============================================================================

/// Capability contract implemented by each report aggregator.
pub trait ReportObserver {
    /// Short name used for logging and diagnostics.
    fn name(&self) -> &str;

    /// Receive the latest record view.
    ///
    /// The record is read-only for the duration of the notification. An `Err`
    /// return is fatal for this observer's remaining output: the dispatcher
    /// retires it from the subscription list and continues the run.
    fn update(&mut self, record: &StockRecord) -> Result<()>;
}

/// Shared observer handle; identity is `Rc::ptr_eq`.
pub type SharedObserver = Rc<RefCell<dyn ReportObserver>>;

// ============================================================================
// Dispatcher
// ============================================================================

/// Statistics for feed dispatch.
#[derive(Debug, Clone, Default)]
pub struct DispatcherStats {
    /// Timestamp label lines seen
    pub timestamps_seen: u64,

    /// Quote records broadcast (repeat re-deliveries included)
    pub records_broadcast: u64,

    /// Repeat signals seen
    pub repeats_seen: u64,

    /// Observers retired after a failed update
    pub observers_retired: u64,
}

/// Broadcasts parsed feed events to subscribed report observers.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use ticker_reports::{AverageReport, FeedDispatcher, SharedObserver};
///
/// let mut dispatcher = FeedDispatcher::new();
/// let averages: SharedObserver =
///     Rc::new(RefCell::new(AverageReport::new("Averages.dat")));
/// dispatcher.subscribe(&averages);
///
/// let line: Vec<String> = "2020-01-01".split(' ').map(String::from).collect();
/// dispatcher.ingest(&line)?;
/// # Ok::<(), ticker_reports::ReportError>(())
/// ```
#[derive(Default)]
pub struct FeedDispatcher {
    /// Label pending for the next group of records
    pending_label: String,

    /// Latest stamped record (the broadcast view)
    latest: Option<StockRecord>,

    /// Subscribed observers, in subscription order
    observers: Vec<SharedObserver>,

    /// Statistics
    stats: DispatcherStats,
}

impl FeedDispatcher {
    /// Create a dispatcher with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer. Idempotent: a handle already subscribed is not
    /// added twice. Takes effect on the next broadcast.
    pub fn subscribe(&mut self, observer: &SharedObserver) {
        if !self.is_subscribed(observer) {
            log::debug!("Subscribing observer `{}`", observer.borrow().name());
            self.observers.push(Rc::clone(observer));
        }
    }

    /// Unsubscribe an observer. Idempotent: unknown handles are a no-op.
    /// The observer keeps its internal state and can be resubscribed later.
    pub fn unsubscribe(&mut self, observer: &SharedObserver) {
        let before = self.observers.len();
        self.observers.retain(|o| !Rc::ptr_eq(o, observer));
        if self.observers.len() < before {
            log::debug!("Unsubscribed observer `{}`", observer.borrow().name());
        }
    }

    /// Whether the given handle is currently subscribed.
    pub fn is_subscribed(&self, observer: &SharedObserver) -> bool {
        self.observers.iter().any(|o| Rc::ptr_eq(o, observer))
    }

    /// Number of currently subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Ingest one tokenized feed line.
    ///
    /// * A timestamp label is stored as the pending snapshot label; labels
    ///   carry no reportable row, so nothing is broadcast.
    /// * A quote is stamped with the pending label, stored as the latest
    ///   view, and broadcast.
    /// * A repeat signal re-broadcasts the unchanged latest view.
    ///
    /// # Errors
    ///
    /// Parse failures of required fields propagate; they are fatal for this
    /// ingest call. Observer failures are not: the failing observer is
    /// retired and the run continues.
    pub fn ingest(&mut self, tokens: &[String]) -> Result<()> {
        match parse_line(tokens)? {
            FeedEvent::Timestamp(label) => {
                log::debug!("Snapshot label: {label}");
                self.pending_label = label;
                self.stats.timestamps_seen += 1;
            }
            FeedEvent::Quote(quote) => {
                self.latest = Some(quote.into_record(self.pending_label.clone()));
                self.broadcast();
            }
            FeedEvent::Repeat => {
                self.stats.repeats_seen += 1;
                if self.latest.is_some() {
                    self.broadcast();
                } else {
                    log::debug!("Repeat signal before any record; nothing to re-deliver");
                }
            }
        }
        Ok(())
    }

    /// Get the latest record view, if any record has been seen.
    pub fn latest(&self) -> Option<&StockRecord> {
        self.latest.as_ref()
    }

    /// Get statistics.
    pub fn stats(&self) -> &DispatcherStats {
        &self.stats
    }

    /// Notify every subscribed observer of the latest record, in order.
    ///
    /// An observer whose update fails is retired after the pass; subscription
    /// changes made by the driver never affect an in-flight broadcast.
    fn broadcast(&mut self) {
        let record = match &self.latest {
            Some(record) => record.clone(),
            None => return,
        };
        self.stats.records_broadcast += 1;

        let mut failed: Vec<usize> = Vec::new();
        for (index, observer) in self.observers.iter().enumerate() {
            let mut observer = observer.borrow_mut();
            if let Err(e) = observer.update(&record) {
                log::error!(
                    "Observer `{}` failed and is retired: {e}",
                    observer.name()
                );
                failed.push(index);
            }
        }

        for index in failed.into_iter().rev() {
            self.observers.remove(index);
            self.stats.observers_retired += 1;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;

    /// Records every delivery it receives.
    struct Recording {
        name: String,
        seen: Vec<(String, String)>,
        fail_after: Option<usize>,
    }

    impl Recording {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                seen: Vec::new(),
                fail_after: None,
            }
        }
    }

    impl ReportObserver for Recording {
        fn name(&self) -> &str {
            &self.name
        }

        fn update(&mut self, record: &StockRecord) -> Result<()> {
            if let Some(limit) = self.fail_after {
                if self.seen.len() >= limit {
                    return Err(ReportError::generic("forced failure"));
                }
            }
            self.seen
                .push((record.snapshot.clone(), record.ticker().to_string()));
            Ok(())
        }
    }

    fn tokens(line: &str) -> Vec<String> {
        line.split(' ').map(String::from).collect()
    }

    fn shared(observer: Recording) -> Rc<RefCell<Recording>> {
        Rc::new(RefCell::new(observer))
    }

    #[test]
    fn test_timestamp_is_not_broadcast() {
        let mut dispatcher = FeedDispatcher::new();
        let obs = shared(Recording::new("rec"));
        let handle: SharedObserver = obs.clone();
        dispatcher.subscribe(&handle);

        dispatcher.ingest(&tokens("2020-01-01")).unwrap();
        assert!(obs.borrow().seen.is_empty());
        assert_eq!(dispatcher.stats().timestamps_seen, 1);
        assert_eq!(dispatcher.stats().records_broadcast, 0);
    }

    #[test]
    fn test_quote_is_stamped_and_broadcast() {
        let mut dispatcher = FeedDispatcher::new();
        let obs = shared(Recording::new("rec"));
        let handle: SharedObserver = obs.clone();
        dispatcher.subscribe(&handle);

        dispatcher.ingest(&tokens("2020-01-01")).unwrap();
        dispatcher.ingest(&tokens("Acme ACM 50 1 2 3 55 45 10")).unwrap();

        assert_eq!(
            obs.borrow().seen,
            vec![("2020-01-01".to_string(), "ACM".to_string())]
        );
        assert_eq!(dispatcher.latest().unwrap().ticker(), "ACM");
    }

    #[test]
    fn test_repeat_rebroadcasts_latest_view() {
        let mut dispatcher = FeedDispatcher::new();
        let obs = shared(Recording::new("rec"));
        let handle: SharedObserver = obs.clone();
        dispatcher.subscribe(&handle);

        dispatcher.ingest(&tokens("2020-01-01")).unwrap();
        dispatcher.ingest(&tokens("Acme ACM 50 1 2 3 55 45 10")).unwrap();
        dispatcher.ingest(&tokens("")).unwrap();

        let seen = &obs.borrow().seen;
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], seen[1]);
        assert_eq!(dispatcher.stats().repeats_seen, 1);
    }

    #[test]
    fn test_repeat_before_any_record_is_ignored() {
        let mut dispatcher = FeedDispatcher::new();
        let obs = shared(Recording::new("rec"));
        let handle: SharedObserver = obs.clone();
        dispatcher.subscribe(&handle);

        dispatcher.ingest(&tokens("")).unwrap();
        assert!(obs.borrow().seen.is_empty());
        assert_eq!(dispatcher.stats().repeats_seen, 1);
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let mut dispatcher = FeedDispatcher::new();
        let obs = shared(Recording::new("rec"));
        let handle: SharedObserver = obs.clone();

        dispatcher.subscribe(&handle);
        dispatcher.subscribe(&handle);
        assert_eq!(dispatcher.observer_count(), 1);

        dispatcher.ingest(&tokens("Acme ACM 50 1 2 3 55 45 10")).unwrap();
        assert_eq!(obs.borrow().seen.len(), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent_and_state_preserving() {
        let mut dispatcher = FeedDispatcher::new();
        let obs = shared(Recording::new("rec"));
        let handle: SharedObserver = obs.clone();
        dispatcher.subscribe(&handle);

        dispatcher.ingest(&tokens("Acme ACM 50 1 2 3 55 45 10")).unwrap();

        dispatcher.unsubscribe(&handle);
        dispatcher.unsubscribe(&handle); // no-op
        assert_eq!(dispatcher.observer_count(), 0);

        // Delivered only while unsubscribed: never seen.
        dispatcher.ingest(&tokens("Beta BET 60 1 2 3 65 55 10")).unwrap();

        dispatcher.subscribe(&handle);
        dispatcher.ingest(&tokens("Gamma GAM 70 1 2 3 75 65 10")).unwrap();

        let seen = &obs.borrow().seen;
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].1, "ACM");
        assert_eq!(seen[1].1, "GAM");
    }

    #[test]
    fn test_failing_observer_is_retired_without_stopping_the_run() {
        let mut dispatcher = FeedDispatcher::new();
        let healthy = shared(Recording::new("healthy"));
        let mut failing_inner = Recording::new("failing");
        failing_inner.fail_after = Some(1);
        let failing = shared(failing_inner);

        let healthy_handle: SharedObserver = healthy.clone();
        let failing_handle: SharedObserver = failing.clone();
        dispatcher.subscribe(&failing_handle);
        dispatcher.subscribe(&healthy_handle);

        dispatcher.ingest(&tokens("Acme ACM 50 1 2 3 55 45 10")).unwrap();
        dispatcher.ingest(&tokens("Beta BET 60 1 2 3 65 55 10")).unwrap();
        dispatcher.ingest(&tokens("Gamma GAM 70 1 2 3 75 65 10")).unwrap();

        assert_eq!(dispatcher.observer_count(), 1);
        assert_eq!(dispatcher.stats().observers_retired, 1);
        assert_eq!(failing.borrow().seen.len(), 1);
        assert_eq!(healthy.borrow().seen.len(), 3);
    }

    #[test]
    fn test_malformed_field_propagates_from_ingest() {
        let mut dispatcher = FeedDispatcher::new();
        let err = dispatcher
            .ingest(&tokens("Acme ACM bad 1 2 3 55 45 10"))
            .unwrap_err();
        assert!(matches!(err, ReportError::MalformedField { .. }));
    }
}
