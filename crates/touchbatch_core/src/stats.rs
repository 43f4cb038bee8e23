//! Flush statistics.

use std::fmt;

/// Summary of one completed outermost flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Drain-and-write passes executed.
    pub passes: usize,
    /// Batched writes issued, one per (column, class) pair per pass.
    pub batches: usize,
    /// (record, column) pairs written.
    pub records: usize,
}

impl FlushStats {
    /// Returns true if nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches == 0
    }
}

impl fmt::Display for FlushStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passes, {} batches, {} records",
            self.passes, self.batches, self.records
        )
    }
}
