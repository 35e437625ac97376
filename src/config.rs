//! Report destination configuration.
//!
//! Destination naming is an external concern: the engine only ever sees a
//! [`ReportSink`](crate::ReportSink) per aggregator. `ReportPaths` is how the
//! driver (or a config file) names the three destinations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Output destinations for the three report types.
///
/// Defaults match the historical output names of the feed simulation.
///
/// # Example
///
/// ```
/// use ticker_reports::ReportPaths;
///
/// let paths = ReportPaths::default().with_output_dir("out");
/// assert_eq!(paths.averages.to_str().unwrap(), "out/Averages.dat");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPaths {
    /// Destination for the per-snapshot average report
    pub averages: PathBuf,

    /// Destination for the 52-week record-close report
    pub record_close: PathBuf,

    /// Destination for the watch-list detail report
    pub selected: PathBuf,
}

impl Default for ReportPaths {
    fn default() -> Self {
        Self {
            averages: PathBuf::from("Averages.dat"),
            record_close: PathBuf::from("Record Close.dat"),
            selected: PathBuf::from("Selected Stocks.dat"),
        }
    }
}

impl ReportPaths {
    /// Create the default layout rooted in the given directory.
    pub fn with_output_dir(self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            averages: rebase(dir, &self.averages),
            record_close: rebase(dir, &self.record_close),
            selected: rebase(dir, &self.selected),
        }
    }

    /// Override the averages destination.
    pub fn with_averages(mut self, path: impl Into<PathBuf>) -> Self {
        self.averages = path.into();
        self
    }

    /// Override the record-close destination.
    pub fn with_record_close(mut self, path: impl Into<PathBuf>) -> Self {
        self.record_close = path.into();
        self
    }

    /// Override the watch-list destination.
    pub fn with_selected(mut self, path: impl Into<PathBuf>) -> Self {
        self.selected = path.into();
        self
    }

    /// Save configuration to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }

    /// Load configuration from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

/// Rebase a destination's file name onto a directory.
fn rebase(dir: &Path, path: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) => dir.join(name),
        None => dir.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    #[test]
    fn test_default_names() {
        let paths = ReportPaths::default();
        assert_eq!(paths.averages, PathBuf::from("Averages.dat"));
        assert_eq!(paths.record_close, PathBuf::from("Record Close.dat"));
        assert_eq!(paths.selected, PathBuf::from("Selected Stocks.dat"));
    }

    #[test]
    fn test_with_output_dir() {
        let paths = ReportPaths::default().with_output_dir("reports/out");
        assert_eq!(paths.averages, PathBuf::from("reports/out/Averages.dat"));
        assert_eq!(paths.selected, PathBuf::from("reports/out/Selected Stocks.dat"));
    }

    #[test]
    fn test_builder_overrides() {
        let paths = ReportPaths::default()
            .with_averages("avg.txt")
            .with_record_close("rc.txt");
        assert_eq!(paths.averages, PathBuf::from("avg.txt"));
        assert_eq!(paths.record_close, PathBuf::from("rc.txt"));
        assert_eq!(paths.selected, PathBuf::from("Selected Stocks.dat"));
    }

    #[test]
    fn test_json_round_trip() {
        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "report_paths_{}_{counter}.json",
            std::process::id()
        ));

        let paths = ReportPaths::default().with_output_dir("out");
        paths.save_json(&path).unwrap();
        let loaded = ReportPaths::load_json(&path).unwrap();
        assert_eq!(paths, loaded);

        let _ = std::fs::remove_file(&path);
    }
}
