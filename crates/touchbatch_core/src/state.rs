//! Touch bookkeeping shared by the coordinator and the cascade sink.

use crate::batch::{ClassBatch, ColumnBatch};
use crate::pending::{PendingSet, WrittenSet};
use crate::repository::TimestampColumns;
use crate::types::{Column, RecordKey, TouchRecord};
use std::collections::HashSet;
use tracing::trace;

/// Pending and written touches for one outermost scope.
///
/// For any column, a key is never both pending and written.
#[derive(Debug, Default)]
pub(crate) struct TouchState {
    pending: PendingSet,
    written: WrittenSet,
    /// Keys known to have a row. Only ever grows until cleared.
    persisted: HashSet<RecordKey>,
}

impl TouchState {
    /// Queues `record` under each resolved column.
    pub(crate) fn register<D>(&mut self, record: &TouchRecord, columns: &[&str], defaults: &D)
    where
        D: TimestampColumns + ?Sized,
    {
        let resolved: Vec<Column> = if columns.is_empty() {
            defaults.default_timestamp_columns(record.class())
        } else {
            columns.iter().map(|c| Column::from(*c)).collect()
        };

        if record.is_persisted() {
            self.persisted.insert(record.key().clone());
        }

        if resolved.is_empty() {
            trace!(record = %record.key(), "no timestamp columns, touch ignored");
            return;
        }

        for column in &resolved {
            if self.written.contains(column, record.key()) {
                trace!(record = %record.key(), %column, "already written in this scope");
                continue;
            }
            self.pending.insert(column, record.key().clone());
        }
    }

    pub(crate) fn mark_persisted(&mut self, key: &RecordKey) {
        self.persisted.insert(key.clone());
    }

    pub(crate) fn has_pending_persisted(&self) -> bool {
        self.pending.keys().any(|k| self.persisted.contains(k))
    }

    /// Moves every persisted pending key into the written set.
    ///
    /// Unpersisted keys stay pending.
    pub(crate) fn drain_for_flush(&mut self) -> Vec<ColumnBatch> {
        let persisted = &self.persisted;
        let drained = self.pending.take_where(|k| persisted.contains(k));

        drained
            .into_iter()
            .map(|(column, keys)| {
                for key in &keys {
                    self.written.insert(&column, key.clone());
                }
                ColumnBatch::group(column, keys)
            })
            .collect()
    }

    /// Undoes the drain of `work`: back to pending, out of written.
    pub(crate) fn requeue<'b, I>(&mut self, work: I)
    where
        I: IntoIterator<Item = (&'b Column, &'b ClassBatch)>,
    {
        for (column, class) in work {
            for key in class.keys() {
                self.written.remove(column, &key);
                self.pending.insert(column, key);
            }
        }
    }

    pub(crate) fn pending(&self) -> &PendingSet {
        &self.pending
    }

    pub(crate) fn written(&self) -> &WrittenSet {
        &self.written
    }

    pub(crate) fn clear_written(&mut self) {
        self.written.clear();
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
        self.written.clear();
        self.persisted.clear();
    }
}

/// Registration handle passed to [`crate::TouchRepository::batch_update`].
///
/// A batched write may cascade touches to related records (a child
/// touching its parent). Those go through the sink and are picked up by
/// the next flush pass. The sink cannot open or close scopes.
#[derive(Debug)]
pub struct TouchSink<'a> {
    state: &'a mut TouchState,
}

impl<'a> TouchSink<'a> {
    pub(crate) fn new(state: &'a mut TouchState) -> Self {
        Self { state }
    }

    /// Queues a cascaded touch.
    ///
    /// With no `columns`, `defaults` supplies them; a repository usually
    /// passes itself.
    pub fn register<D>(&mut self, record: &TouchRecord, columns: &[&str], defaults: &D)
    where
        D: TimestampColumns + ?Sized,
    {
        self.state.register(record, columns, defaults);
    }

    /// Marks a queued record as having a row.
    pub fn mark_persisted(&mut self, key: &RecordKey) {
        self.state.mark_persisted(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassTag, RecordId};

    struct Defaults;

    impl TimestampColumns for Defaults {
        fn default_timestamp_columns(&self, class: &ClassTag) -> Vec<Column> {
            match class.as_str() {
                "Person" => vec![Column::from("updated_at")],
                _ => Vec::new(),
            }
        }
    }

    fn person(id: u64) -> TouchRecord {
        TouchRecord::persisted("Person", RecordId::from_u64(id))
    }

    #[test]
    fn empty_columns_use_defaults() {
        let mut state = TouchState::default();
        state.register(&person(1), &[], &Defaults);

        let col = Column::from("updated_at");
        assert!(state.pending().contains(&col, person(1).key()));
    }

    #[test]
    fn no_default_columns_is_noop() {
        let mut state = TouchState::default();
        let pet = TouchRecord::persisted("Pet", RecordId::from_u64(1));
        state.register(&pet, &[], &Defaults);

        assert!(state.pending().is_empty());
        assert!(!state.has_pending_persisted());
    }

    #[test]
    fn persisted_flag_kept_without_default_columns() {
        let mut state = TouchState::default();
        let id = RecordId::from_u64(1);
        state.register(&TouchRecord::unpersisted("Toy", id), &["x"], &Defaults);
        assert!(!state.has_pending_persisted());

        // Toy has no default columns; the save still promotes the queued touch.
        state.register(&TouchRecord::persisted("Toy", id), &[], &Defaults);

        assert!(state.has_pending_persisted());
        let drained = state.drain_for_flush();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].ids_for(&ClassTag::new("Toy")), Some(&[id][..]));
    }

    #[test]
    fn written_pair_is_not_requeued() {
        let mut state = TouchState::default();
        state.register(&person(1), &["x"], &Defaults);
        let drained = state.drain_for_flush();
        assert_eq!(drained.len(), 1);

        state.register(&person(1), &["x"], &Defaults);
        assert!(state.pending().is_empty());

        // A different column for the same record is still accepted.
        state.register(&person(1), &["y"], &Defaults);
        assert_eq!(state.pending().len(), 1);
    }

    #[test]
    fn drain_leaves_unpersisted_records() {
        let mut state = TouchState::default();
        let fresh = TouchRecord::unpersisted("Person", RecordId::new());
        state.register(&fresh, &["x"], &Defaults);
        state.register(&person(1), &["x"], &Defaults);

        let drained = state.drain_for_flush();

        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].record_count(), 1);
        assert!(state.pending().contains(&Column::from("x"), fresh.key()));
        assert!(!state.has_pending_persisted());
    }

    #[test]
    fn mark_persisted_makes_record_drainable() {
        let mut state = TouchState::default();
        let fresh = TouchRecord::unpersisted("Person", RecordId::new());
        state.register(&fresh, &["x"], &Defaults);
        assert!(!state.has_pending_persisted());

        state.mark_persisted(fresh.key());
        assert!(state.has_pending_persisted());
    }

    #[test]
    fn requeue_restores_pending() {
        let mut state = TouchState::default();
        state.register(&person(1), &["x"], &Defaults);
        let drained = state.drain_for_flush();
        assert!(state.written().contains(&Column::from("x"), person(1).key()));

        state.requeue(
            drained
                .iter()
                .flat_map(|b| b.classes().iter().map(move |c| (b.column(), c))),
        );

        assert!(state.written().is_empty());
        assert!(state.pending().contains(&Column::from("x"), person(1).key()));
    }
}
