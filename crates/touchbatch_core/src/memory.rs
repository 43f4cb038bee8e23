//! In-memory touch repository.

use crate::error::{TouchError, TouchResult};
use crate::repository::{TimestampColumns, TouchRepository};
use crate::state::TouchSink;
use crate::types::{ClassTag, Column, RecordId, RecordKey, TouchRecord};
use std::collections::{HashMap, HashSet};

/// One batched write received by a [`MemoryRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCall {
    /// Class written.
    pub class: ClassTag,
    /// Column set to the current time.
    pub column: Column,
    /// Records updated.
    pub ids: Vec<RecordId>,
    /// Logical timestamp written.
    pub at: u64,
}

#[derive(Debug, Clone)]
struct CascadeRule {
    target: TouchRecord,
    columns: Vec<Column>,
}

type Slot = (RecordKey, Column);

/// A [`TouchRepository`] that keeps everything in memory.
///
/// Timestamps come from a logical clock that ticks once per batched
/// write. Association callbacks are modelled as cascade rules: writing a
/// record under a column registers another record through the sink.
///
/// Useful for tests and for running the coordinator without a database.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    defaults: HashMap<ClassTag, Vec<Column>>,
    cascades: HashMap<Slot, Vec<CascadeRule>>,
    promotions: HashMap<Slot, Vec<RecordKey>>,
    runaway: HashSet<(ClassTag, Column)>,
    failure: Option<(ClassTag, Column)>,
    writes: Vec<WriteCall>,
    touched_at: HashMap<Slot, u64>,
    touch_counts: HashMap<Slot, usize>,
    clock: u64,
}

impl MemoryRepository {
    /// Creates an empty repository with no default columns.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default timestamp columns for `class`.
    #[must_use]
    pub fn with_default_columns(mut self, class: &str, columns: &[&str]) -> Self {
        self.set_default_columns(class, columns);
        self
    }

    /// Sets the default timestamp columns for `class`.
    pub fn set_default_columns(&mut self, class: &str, columns: &[&str]) {
        self.defaults.insert(
            ClassTag::new(class),
            columns.iter().map(|c| Column::from(*c)).collect(),
        );
    }

    /// Writing `trigger` under `column` registers `target` under `columns`.
    ///
    /// Empty `columns` means the target's default columns.
    pub fn cascade(
        &mut self,
        trigger: RecordKey,
        column: &str,
        target: TouchRecord,
        columns: &[&str],
    ) {
        self.cascades
            .entry((trigger, Column::from(column)))
            .or_default()
            .push(CascadeRule {
                target,
                columns: columns.iter().map(|c| Column::from(*c)).collect(),
            });
    }

    /// Writing `trigger` under `column` marks `target` as persisted.
    pub fn promote(&mut self, trigger: RecordKey, column: &str, target: RecordKey) {
        self.promotions
            .entry((trigger, Column::from(column)))
            .or_default()
            .push(target);
    }

    /// Every write of `class` under `column` registers a brand new record
    /// of the same class. The flush never settles on its own.
    pub fn cascade_forever(&mut self, class: &str, column: &str) {
        self.runaway.insert((ClassTag::new(class), Column::from(column)));
    }

    /// Makes writes of `class` under `column` fail.
    pub fn fail_on(&mut self, class: &str, column: &str) {
        self.failure = Some((ClassTag::new(class), Column::from(column)));
    }

    /// Removes any injected failure.
    pub fn clear_failure(&mut self) {
        self.failure = None;
    }

    /// Returns every batched write received, in order.
    #[must_use]
    pub fn writes(&self) -> &[WriteCall] {
        &self.writes
    }

    /// Returns how many times `key` was written under `column`.
    #[must_use]
    pub fn touch_count(&self, key: &RecordKey, column: &str) -> usize {
        self.touch_counts
            .get(&(key.clone(), Column::from(column)))
            .copied()
            .unwrap_or(0)
    }

    /// Returns the last logical timestamp written to `key.column`.
    #[must_use]
    pub fn touched_at(&self, key: &RecordKey, column: &str) -> Option<u64> {
        self.touched_at
            .get(&(key.clone(), Column::from(column)))
            .copied()
    }
}

impl TimestampColumns for MemoryRepository {
    fn default_timestamp_columns(&self, class: &ClassTag) -> Vec<Column> {
        self.defaults.get(class).cloned().unwrap_or_default()
    }
}

impl TouchRepository for MemoryRepository {
    fn batch_update(
        &mut self,
        class: &ClassTag,
        column: &Column,
        ids: &[RecordId],
        sink: &mut TouchSink<'_>,
    ) -> TouchResult<()> {
        if self
            .failure
            .as_ref()
            .is_some_and(|(c, col)| c == class && col == column)
        {
            return Err(TouchError::repository(format!(
                "update of {class}.{column} rejected"
            )));
        }

        self.clock += 1;
        let now = self.clock;
        self.writes.push(WriteCall {
            class: class.clone(),
            column: column.clone(),
            ids: ids.to_vec(),
            at: now,
        });

        for id in ids {
            let slot = (RecordKey::new(class.clone(), *id), column.clone());
            self.touched_at.insert(slot.clone(), now);
            *self.touch_counts.entry(slot.clone()).or_insert(0) += 1;

            if let Some(targets) = self.promotions.get(&slot) {
                for target in targets {
                    sink.mark_persisted(target);
                }
            }
            if let Some(rules) = self.cascades.get(&slot) {
                for rule in rules {
                    let columns: Vec<&str> = rule.columns.iter().map(Column::as_str).collect();
                    sink.register(&rule.target, &columns, &*self);
                }
            }
            if self.runaway.contains(&(class.clone(), column.clone())) {
                let fresh = TouchRecord::persisted(class.clone(), RecordId::new());
                sink.register(&fresh, &[column.as_str()], &*self);
            }
        }

        Ok(())
    }
}
