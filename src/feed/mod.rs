//! Feed ingestion: sources, dispatch, and end-of-feed detection.

mod dispatcher;
mod end_of_feed;
mod source;

pub use dispatcher::{DispatcherStats, FeedDispatcher, ReportObserver, SharedObserver};
pub use end_of_feed::EndOfFeedDetector;
pub use source::{
    tokenize, BlankRunFilter, FeedSource, FeedStats, FileLines, TickerFile, TokenizedLine,
    VecSource, END_OF_FEED_BLANK_RUN,
};
