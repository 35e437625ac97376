//! Dynamic subscribe/unsubscribe demonstration.
//!
//! Simulates a live feed where the averages observer drops out mid-feed and
//! resubscribes later: records delivered while unsubscribed are never seen,
//! and resubscription resumes accumulation from the preserved state.
//!
//! Run with: cargo run --example subscription_churn

use std::cell::RefCell;
use std::rc::Rc;

use ticker_reports::{AverageReport, FeedDispatcher, FeedSource, SharedObserver, VecSource};

fn main() {
    env_logger::init();

    println!("=================================================================");
    println!("Ticker Reports - Subscription Churn Example");
    println!("=================================================================\n");

    let out_path = std::env::temp_dir().join(format!(
        "churn_demo_{}_Averages.dat",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&out_path);

    // A two-snapshot feed, terminated by the double-blank convention.
    let feed = VecSource::new(
        [
            "Jan 30, 2009 10:30 AM",
            "Acme Holdings ACM 50 1 2 3 60 40 10",
            "Boeing Co BA 42.5 0.5 1.2 -3.1 48 30 13",
            "McDonald's Corp MCD 57 0.4 0.7 -8.2 67 50 30",
            "Jan 30, 2009 11:00 AM",
            "Acme Holdings ACM 52 2 4 5 60 40 10",
            "Boeing Co BA 43 1 2.3 -2 48 30 13",
            "McDonald's Corp MCD 58 1.4 2.4 -7 67 50 30",
            "",
            "",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    );

    let averages = Rc::new(RefCell::new(AverageReport::new(&out_path)));
    let handle: SharedObserver = averages.clone();

    let mut dispatcher = FeedDispatcher::new();
    dispatcher.subscribe(&handle);
    println!("✓ Averages observer subscribed\n");

    // Unsubscribe after the third record, resubscribe two records later.
    const UNSUB_AFTER: u64 = 3;
    const RESUB_AFTER: u64 = 5;

    for tokens in feed.lines().expect("in-memory source cannot fail") {
        dispatcher
            .ingest(&tokens)
            .expect("demo feed is well-formed");

        let delivered = dispatcher.stats().records_broadcast;
        if delivered == UNSUB_AFTER && dispatcher.is_subscribed(&handle) {
            dispatcher.unsubscribe(&handle);
            println!(
                "✗ Unsubscribed after {} records (buffered samples: {})",
                delivered,
                averages.borrow().sample_count()
            );
        }
        if delivered == RESUB_AFTER && !dispatcher.is_subscribed(&handle) {
            dispatcher.subscribe(&handle);
            println!("✓ Resubscribed after {delivered} records\n");
        }
    }

    let report = averages.borrow();
    println!("Feed complete.");
    println!("  Records seen by observer: {}", report.stats().records_seen);
    println!("  Groups flushed: {}", report.stats().groups_flushed);
    println!("  Output: {}", out_path.display());
    println!();

    match std::fs::read_to_string(&out_path) {
        Ok(contents) => {
            println!("--- {} ---", out_path.display());
            print!("{contents}");
            println!("---");
        }
        Err(_) => println!("(no output file was written)"),
    }

    let _ = std::fs::remove_file(&out_path);
}
