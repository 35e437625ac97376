//! Feed sources: where tokenized lines come from.
//!
//! The engine consumes pre-tokenized lines; this module is the collaborator
//! that produces them. [`TickerFile`] streams a `.dat` feed file, applying
//! the format's two conventions:
//!
//! - whitespace normalization (runs of spaces collapse during tokenization),
//! - end-of-input detection: two consecutive blank lines mark true
//!   end-of-input, at which point a single repeat line (one empty token) is
//!   emitted so the downstream dispatcher re-delivers the final record.
//!
//! [`VecSource`] is a simple in-memory source for tests and simulations.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Consecutive blank lines that mark true end-of-input.
pub const END_OF_FEED_BLANK_RUN: u32 = 2;

/// One tokenized feed line.
pub type TokenizedLine = Vec<String>;

/// Tokenize one raw feed line.
///
/// Non-blank lines split on whitespace with runs collapsed; a blank line
/// becomes the single-empty-token repeat shape the parser recognizes.
pub fn tokenize(line: &str) -> TokenizedLine {
    if line.trim().is_empty() {
        vec![String::new()]
    } else {
        line.split_whitespace().map(String::from).collect()
    }
}

// ============================================================================
// Feed source trait
// ============================================================================

/// Trait for feed sources.
///
/// `lines()` consumes `self` to allow single-pass iteration; a source is
/// good for exactly one run.
pub trait FeedSource {
    /// The iterator type for tokenized lines.
    type Lines: Iterator<Item = TokenizedLine>;

    /// Consume the source and return an iterator over tokenized lines.
    fn lines(self) -> Result<Self::Lines>;
}

// ============================================================================
// Vector source (for testing)
// ============================================================================

/// A simple in-memory source of raw feed lines.
///
/// Applies the same tokenization and blank-run handling as [`TickerFile`],
/// so a test can feed literal `.dat` content line by line.
///
/// # Example
///
/// ```
/// use ticker_reports::{FeedSource, VecSource};
///
/// let source = VecSource::new(vec![
///     "2020-01-01".to_string(),
///     "Acme ACM 50 1 2 3 55 45 10".to_string(),
///     String::new(),
///     String::new(),
/// ]);
///
/// let lines: Vec<_> = source.lines().unwrap().collect();
/// assert_eq!(lines.len(), 3); // two data lines + one repeat line
/// ```
pub struct VecSource {
    raw_lines: Vec<String>,
}

impl VecSource {
    /// Create a new vector source from raw (untokenized) lines.
    pub fn new(raw_lines: Vec<String>) -> Self {
        Self { raw_lines }
    }
}

impl FeedSource for VecSource {
    type Lines = BlankRunFilter<std::vec::IntoIter<String>>;

    fn lines(self) -> Result<Self::Lines> {
        Ok(BlankRunFilter::new(self.raw_lines.into_iter()))
    }
}

// ============================================================================
// Ticker file source
// ============================================================================

/// Statistics for feed file loading.
#[derive(Debug, Clone, Default)]
pub struct FeedStats {
    /// Raw lines read from the file
    pub lines_read: u64,

    /// Blank lines encountered
    pub blank_lines: u64,

    /// File size in bytes
    pub file_size: u64,
}

/// Feed source for `.dat` ticker files.
///
/// # Example
///
/// ```no_run
/// use ticker_reports::{FeedSource, TickerFile};
///
/// let source = TickerFile::new("Ticker.dat")?;
/// for tokens in source.lines()? {
///     // hand tokens to the dispatcher
/// }
/// # Ok::<(), ticker_reports::ReportError>(())
/// ```
pub struct TickerFile {
    /// Path to the feed file
    path: PathBuf,

    /// Statistics
    stats: FeedStats,
}

impl TickerFile {
    /// Create a new feed file source.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or its metadata cannot
    /// be read.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(ReportError::generic(format!(
                "Feed file not found: {}",
                path.display()
            )));
        }

        let file_size = std::fs::metadata(&path)
            .map_err(|e| ReportError::generic(format!("Failed to read file metadata: {e}")))?
            .len();

        Ok(Self {
            path,
            stats: FeedStats {
                file_size,
                ..Default::default()
            },
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get statistics.
    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    /// Read all tokenized lines into a Vec.
    ///
    /// Convenience for small feeds; large feeds should stream via
    /// [`FeedSource::lines`].
    pub fn read_all(self) -> Result<Vec<TokenizedLine>> {
        Ok(self.lines()?.collect())
    }
}

impl FeedSource for TickerFile {
    type Lines = BlankRunFilter<FileLines>;

    fn lines(self) -> Result<Self::Lines> {
        let file = File::open(&self.path)
            .map_err(|e| ReportError::generic(format!("Failed to open feed file: {e}")))?;
        let reader = BufReader::new(file);

        Ok(BlankRunFilter::new(FileLines {
            inner: reader.lines(),
            stats: self.stats,
        }))
    }
}

/// Raw line iterator over a feed file.
///
/// An I/O error mid-stream is logged and terminates iteration; the partial
/// feed processed so far stands.
pub struct FileLines {
    inner: Lines<BufReader<File>>,
    stats: FeedStats,
}

impl Iterator for FileLines {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next()? {
            Ok(line) => {
                self.stats.lines_read += 1;
                if line.trim().is_empty() {
                    self.stats.blank_lines += 1;
                }
                Some(line)
            }
            Err(e) => {
                log::error!("Failed to read feed line: {e}");
                None
            }
        }
    }
}

impl FileLines {
    /// Get current statistics.
    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }
}

// ============================================================================
// Blank-run filter
// ============================================================================

/// Applies the feed's blank-line convention to a raw line stream.
///
/// Single blank lines separate groups and are dropped. Once
/// [`END_OF_FEED_BLANK_RUN`] consecutive blank lines are seen, one repeat
/// line (single empty token) is emitted and the stream ends; a non-blank
/// line resets the run.
pub struct BlankRunFilter<I: Iterator<Item = String>> {
    inner: I,
    blank_run: u32,
    done: bool,
}

impl<I: Iterator<Item = String>> BlankRunFilter<I> {
    fn new(inner: I) -> Self {
        Self {
            inner,
            blank_run: 0,
            done: false,
        }
    }
}

impl<I: Iterator<Item = String>> Iterator for BlankRunFilter<I> {
    type Item = TokenizedLine;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let raw = self.inner.next()?;

            if raw.trim().is_empty() {
                self.blank_run += 1;
                if self.blank_run == END_OF_FEED_BLANK_RUN {
                    self.done = true;
                    return Some(vec![String::new()]);
                }
                continue;
            }

            self.blank_run = 0;
            return Some(tokenize(&raw));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique_temp_path(name: &str) -> PathBuf {
        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "feed_test_{}_{}_{}.dat",
            std::process::id(),
            name,
            counter
        ))
    }

    #[test]
    fn test_tokenize_collapses_whitespace_runs() {
        assert_eq!(
            tokenize("Acme  ACM 50"),
            vec!["Acme".to_string(), "ACM".to_string(), "50".to_string()]
        );
    }

    #[test]
    fn test_tokenize_blank_line() {
        assert_eq!(tokenize(""), vec![String::new()]);
        assert_eq!(tokenize("   "), vec![String::new()]);
    }

    #[test]
    fn test_vec_source_single_blank_is_dropped() {
        let source = VecSource::new(vec![
            "a A 1 1 1 1 1 1 1".to_string(),
            String::new(),
            "b B 2 2 2 2 2 2 2".to_string(),
        ]);

        let lines: Vec<_> = source.lines().unwrap().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][0], "a");
        assert_eq!(lines[1][0], "b");
    }

    #[test]
    fn test_vec_source_double_blank_emits_repeat_and_stops() {
        let source = VecSource::new(vec![
            "a A 1 1 1 1 1 1 1".to_string(),
            String::new(),
            String::new(),
            "never delivered".to_string(),
        ]);

        let lines: Vec<_> = source.lines().unwrap().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], vec![String::new()]);
    }

    #[test]
    fn test_vec_source_nonblank_resets_run() {
        let source = VecSource::new(vec![
            "a A 1 1 1 1 1 1 1".to_string(),
            String::new(),
            "b B 2 2 2 2 2 2 2".to_string(),
            String::new(),
            String::new(),
        ]);

        let lines: Vec<_> = source.lines().unwrap().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], vec![String::new()]);
    }

    #[test]
    fn test_ticker_file_nonexistent() {
        let result = TickerFile::new("/nonexistent/Ticker.dat");
        assert!(result.is_err());
    }

    #[test]
    fn test_ticker_file_round_trip() {
        let path = unique_temp_path("round_trip");
        fs::write(
            &path,
            "2020-01-01\nAcme ACM 50 1 2 3 55 45 10\n\n\n",
        )
        .unwrap();

        let source = TickerFile::new(&path).unwrap();
        assert!(source.stats().file_size > 0);

        let lines = source.read_all().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], vec!["2020-01-01".to_string()]);
        assert_eq!(lines[1].len(), 9);
        assert_eq!(lines[2], vec![String::new()]);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_ticker_file_normalizes_double_spaces() {
        // The historical format pads the second numeric column with an
        // extra space.
        let path = unique_temp_path("double_space");
        fs::write(&path, "Acme ACM 50 1  2 3 55 45 10 \n\n\n").unwrap();

        let source = TickerFile::new(&path).unwrap();
        let lines = source.read_all().unwrap();
        assert_eq!(lines[0].len(), 9);
        assert_eq!(lines[0][3], "1");
        assert_eq!(lines[0][4], "2");

        let _ = fs::remove_file(&path);
    }
}
