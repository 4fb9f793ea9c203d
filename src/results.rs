use std::fmt;
use std::time::Duration;

use crate::error::TreeplanError;

/// The output of a completed copy run.
///
/// A run never stops on a per-entry failure; those land in `errors` and the
/// remaining entries are still processed.
#[derive(Debug, Default)]
pub struct CopyReport {
    /// Entries in the mapping snapshot.
    pub scanned: usize,

    /// Entries accepted by the filter and copied successfully.
    pub copied: usize,

    /// Entries rejected by the filter.
    pub skipped: usize,

    /// Entries accepted by the filter whose copy failed.
    pub errors: Vec<TreeplanError>,

    /// Wall-clock time of the run.
    pub duration: Duration,
}

impl CopyReport {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for CopyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[COPY] scanned={} copied={} skipped={} errors={} in {:.3}s",
            self.scanned,
            self.copied,
            self.skipped,
            self.error_count(),
            self.duration.as_secs_f64()
        )
    }
}
