//! Append-only report sinks.
//!
//! Each aggregator owns one sink, bound to one output destination. A flush is
//! a scoped append-and-close: the file handle is acquired, the group is
//! written through a buffered writer, the writer is flushed, and the handle
//! is released. Earlier groups stay durable on disk even if a later flush
//! fails, and a destination that never receives a group is never created.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};

/// Statistics for a report sink.
#[derive(Debug, Clone, Default)]
pub struct SinkStats {
    /// Groups appended so far
    pub groups_written: u64,

    /// Content lines written (excluding group separators)
    pub lines_written: u64,
}

/// Append-only sink for one report destination.
///
/// Every flushed group is written as its content lines followed by a single
/// blank separator line.
///
/// # Example
///
/// ```no_run
/// use ticker_reports::ReportSink;
///
/// let mut sink = ReportSink::new("Averages.dat");
/// sink.append_group(&["2020-01-01 50".to_string()])?;
/// # Ok::<(), ticker_reports::ReportError>(())
/// ```
#[derive(Debug)]
pub struct ReportSink {
    /// Output destination
    path: PathBuf,

    /// Statistics
    stats: SinkStats,
}

impl ReportSink {
    /// Create a sink bound to a destination path.
    ///
    /// The file is not touched until the first group is appended.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stats: SinkStats::default(),
        }
    }

    /// Append one finalized group, terminated by a blank line.
    ///
    /// # Errors
    ///
    /// [`ReportError::SinkWrite`] if the destination cannot be opened or
    /// written. A sink failure is fatal for the owning aggregator's remaining
    /// output; callers do not retry.
    pub fn append_group(&mut self, lines: &[String]) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;

        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{line}").map_err(|e| self.write_error(e))?;
        }
        // Group separator
        writeln!(writer).map_err(|e| self.write_error(e))?;
        writer.flush().map_err(|e| self.write_error(e))?;

        self.stats.groups_written += 1;
        self.stats.lines_written += lines.len() as u64;

        log::debug!(
            "Appended group of {} line(s) to {}",
            lines.len(),
            self.path.display()
        );

        Ok(())
    }

    /// Get the destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get statistics.
    pub fn stats(&self) -> &SinkStats {
        &self.stats
    }

    fn write_error(&self, err: std::io::Error) -> ReportError {
        ReportError::SinkWrite {
            path: self.path.display().to_string(),
            detail: err.to_string(),
        }
    }
}
