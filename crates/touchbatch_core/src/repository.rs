//! Persistence-layer traits.
//!
//! The coordinator never talks to a database directly. It asks a
//! [`TimestampColumns`] implementation which columns a class touches by
//! default, and hands drained work to a [`TouchRepository`] one
//! (class, column) pair at a time.

use crate::error::TouchResult;
use crate::state::TouchSink;
use crate::types::{ClassTag, Column, RecordId};

/// Default timestamp columns per class.
pub trait TimestampColumns {
    /// Returns the columns to touch when a registration names none.
    ///
    /// An empty result makes the registration a no-op.
    fn default_timestamp_columns(&self, class: &ClassTag) -> Vec<Column>;
}

/// Executes batched timestamp updates.
///
/// # Invariants
///
/// - `batch_update` sets `column` to the current time for exactly `ids`
/// - all `ids` belong to `class`
/// - touches cascaded from the write go through `sink`
pub trait TouchRepository: TimestampColumns {
    /// Updates `column` on every record in `ids`.
    ///
    /// # Errors
    ///
    /// Any error aborts the flush and is returned from the scope close.
    fn batch_update(
        &mut self,
        class: &ClassTag,
        column: &Column,
        ids: &[RecordId],
        sink: &mut TouchSink<'_>,
    ) -> TouchResult<()>;
}

/// A repository that writes nothing and has no default columns.
///
/// Closing a scope against it discards the queued touches.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRepository;

impl TimestampColumns for NoopRepository {
    fn default_timestamp_columns(&self, _class: &ClassTag) -> Vec<Column> {
        Vec::new()
    }
}

impl TouchRepository for NoopRepository {
    fn batch_update(
        &mut self,
        _class: &ClassTag,
        _column: &Column,
        _ids: &[RecordId],
        _sink: &mut TouchSink<'_>,
    ) -> TouchResult<()> {
        Ok(())
    }
}
