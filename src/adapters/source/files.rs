//! Filesystem Report Source - Locust `--csv` Output Files
//!
//! Reads the stats and failures files written by `locust --csv=<prefix>`.
//! Paths are fixed at construction; each open hits the filesystem again so
//! a report rewritten by Locust between scrapes is picked up.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::ports::report_source::{ReportKind, ReportSource};

/// Report source backed by two files on disk.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    /// Path to `*_stats.csv`.
    stats_path: PathBuf,
    /// Path to `*_failures.csv`.
    failures_path: PathBuf,
}

impl CsvFileSource {
    /// Create a new file source.
    pub fn new(stats_path: impl Into<PathBuf>, failures_path: impl Into<PathBuf>) -> Self {
        Self {
            stats_path: stats_path.into(),
            failures_path: failures_path.into(),
        }
    }

    /// Path backing the given report.
    pub fn path(&self, kind: ReportKind) -> &Path {
        match kind {
            ReportKind::Stats => &self.stats_path,
            ReportKind::Failures => &self.failures_path,
        }
    }
}

impl ReportSource for CsvFileSource {
    fn open(&self, kind: ReportKind) -> io::Result<Box<dyn Read + Send>> {
        let path = self.path(kind);
        trace!(report = %kind, path = %path.display(), "Opening report");

        // io::Error from File::open does not carry the path
        let with_path = |e: io::Error| io::Error::new(e.kind(), format!("{}: {e}", path.display()));
        let file = File::open(path).map_err(with_path)?;

        // opening a directory succeeds on unix, reading it does not
        if file.metadata().map_err(with_path)?.is_dir() {
            return Err(with_path(io::ErrorKind::IsADirectory.into()));
        }

        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file_names_path() {
        let source = CsvFileSource::new("/nonexistent/stats.csv", "/nonexistent/failures.csv");
        let Err(err) = source.open(ReportKind::Failures) else {
            panic!("expected open to fail");
        };
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("/nonexistent/failures.csv"));
    }

    #[test]
    fn test_open_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvFileSource::new(dir.path(), dir.path().join("failures.csv"));
        let Err(err) = source.open(ReportKind::Stats) else {
            panic!("expected open to fail");
        };
        assert_eq!(err.kind(), io::ErrorKind::IsADirectory);
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }

    #[test]
    fn test_open_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let stats = dir.path().join("stats.csv");
        std::fs::write(&stats, "Type,Name\n").unwrap();

        let source = CsvFileSource::new(&stats, dir.path().join("failures.csv"));
        let mut buf = String::new();
        source
            .open(ReportKind::Stats)
            .unwrap()
            .read_to_string(&mut buf)
            .unwrap();
        assert_eq!(buf, "Type,Name\n");
    }
}
