//! Deferred touch coordinator.

use crate::batch::{ClassBatch, ColumnBatch};
use crate::config::{CoordinatorConfig, FailurePolicy};
use crate::error::{TouchError, TouchResult};
use crate::repository::{TimestampColumns, TouchRepository};
use crate::state::{TouchSink, TouchState};
use crate::stats::FlushStats;
use crate::types::{Column, RecordKey, TouchRecord};
use tracing::{debug, trace, warn};

/// Defers and coalesces touches until the outermost scope closes.
///
/// One coordinator serves one execution context (a worker, a thread, a
/// request). It is passed explicitly to whatever intercepts touch calls;
/// there is no global instance.
///
/// ## Scopes
///
/// Scopes nest through a counter. Every nested scope shares the same
/// pending state, so touches registered at any depth end up in a single
/// flush when the depth returns to zero.
///
/// ## Flushing
///
/// The flush drains all persisted pending records, writes them one
/// (column, class) batch at a time, and repeats while the writes cascade
/// new persisted touches. A (record, column) pair is written at most once
/// per outermost scope.
///
/// # Example
///
/// ```ignore
/// let mut coord = TouchCoordinator::new();
/// coord.enter_scope();
/// coord.register(&pet, &[], &repo);
/// coord.register(&pet, &["neutered_at"], &repo);
/// let stats = coord.exit_scope(&mut repo)?;
/// ```
#[derive(Debug, Default)]
pub struct TouchCoordinator {
    state: TouchState,
    depth: usize,
    config: CoordinatorConfig,
}

impl TouchCoordinator {
    /// Creates a coordinator with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::default())
    }

    /// Creates a coordinator with an explicit configuration.
    #[must_use]
    pub fn with_config(config: CoordinatorConfig) -> Self {
        Self {
            state: TouchState::default(),
            depth: 0,
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Returns the number of open scopes.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns true while at least one scope is open.
    #[must_use]
    pub fn is_delaying(&self) -> bool {
        self.depth > 0
    }

    /// Opens a (possibly nested) scope.
    pub fn enter_scope(&mut self) {
        self.depth += 1;
    }

    /// Closes a scope.
    ///
    /// Closing the outermost scope flushes all pending touches through
    /// `repo` and then clears the state. Returns the flush statistics in
    /// that case and `None` while scopes remain open.
    ///
    /// # Errors
    ///
    /// Returns [`TouchError::NoOpenScope`] if no scope is open, leaving the
    /// coordinator untouched. Any repository error aborts the flush and is
    /// returned as is; the state is then handled per
    /// [`CoordinatorConfig::failure_policy`] and the depth is zero.
    pub fn exit_scope<R>(&mut self, repo: &mut R) -> TouchResult<Option<FlushStats>>
    where
        R: TouchRepository + ?Sized,
    {
        self.depth = self.depth.checked_sub(1).ok_or(TouchError::NoOpenScope)?;
        if self.depth > 0 {
            return Ok(None);
        }

        match self.flush(repo) {
            Ok(stats) => {
                self.state.clear();
                debug!(%stats, "touch flush complete");
                Ok(Some(stats))
            }
            Err(err) => {
                let policy = self.config.failure_policy;
                match policy {
                    FailurePolicy::Discard => self.state.clear(),
                    FailurePolicy::Retain => self.state.clear_written(),
                }
                warn!(error = %err, ?policy, "touch flush failed");
                Err(err)
            }
        }
    }

    /// Closes a scope without flushing.
    ///
    /// If this closes the outermost scope, every queued touch is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TouchError::NoOpenScope`] if no scope is open.
    pub fn abort_scope(&mut self) -> TouchResult<()> {
        self.depth = self.depth.checked_sub(1).ok_or(TouchError::NoOpenScope)?;
        if self.depth == 0 {
            debug!(
                pending = self.state.pending().len(),
                "outermost touch scope aborted"
            );
            self.state.clear();
        }
        Ok(())
    }

    /// Runs `f` inside a scope.
    ///
    /// The scope is always closed: with a flush if `f` succeeds, with
    /// [`Self::abort_scope`] if it fails.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or the flush error on success of `f`.
    pub fn delay_touching<R, F, T, E>(&mut self, repo: &mut R, f: F) -> Result<T, E>
    where
        R: TouchRepository + ?Sized,
        F: FnOnce(&mut Self, &mut R) -> Result<T, E>,
        E: From<TouchError>,
    {
        self.enter_scope();
        match f(self, repo) {
            Ok(value) => {
                self.exit_scope(repo)?;
                Ok(value)
            }
            Err(err) => {
                // An unbalanced closure may already have closed our scope;
                // its own error is the one worth reporting.
                if self.abort_scope().is_err() {
                    warn!("touch scope closed inside delay_touching closure");
                }
                Err(err)
            }
        }
    }

    /// Queues a touch of `record`.
    ///
    /// With empty `columns`, `defaults` supplies the columns. Pairs already
    /// written in this outermost scope are skipped. Registration outside
    /// any scope waits for the next outermost close.
    pub fn register<D>(&mut self, record: &TouchRecord, columns: &[&str], defaults: &D)
    where
        D: TimestampColumns + ?Sized,
    {
        self.state.register(record, columns, defaults);
    }

    /// Marks a queued record as persisted so the next pass writes it.
    pub fn mark_persisted(&mut self, key: &RecordKey) {
        self.state.mark_persisted(key);
    }

    /// Returns true if any pending record has a row to update.
    #[must_use]
    pub fn has_pending_persisted(&self) -> bool {
        self.state.has_pending_persisted()
    }

    /// Drains all persisted pending records, grouped by column then class.
    ///
    /// Columns come out in first-registration order. Drained pairs move to
    /// the written set; unpersisted records stay pending.
    pub fn drain_for_flush(&mut self) -> Vec<ColumnBatch> {
        self.state.drain_for_flush()
    }

    /// Returns the number of pending (record, column) pairs.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.state.pending().len()
    }

    /// Returns the number of (record, column) pairs written in this scope.
    #[must_use]
    pub fn written_len(&self) -> usize {
        self.state.written().len()
    }

    /// Returns true if `key` is queued under `column`.
    #[must_use]
    pub fn is_pending(&self, key: &RecordKey, column: &str) -> bool {
        self.state.pending().contains(&Column::from(column), key)
    }

    /// Returns true if `key` was written under `column` in this scope.
    #[must_use]
    pub fn is_written(&self, key: &RecordKey, column: &str) -> bool {
        self.state.written().contains(&Column::from(column), key)
    }

    /// Returns the pending columns in first-registration order.
    pub fn pending_columns(&self) -> impl Iterator<Item = &Column> {
        self.state.pending().columns()
    }

    /// Returns true if nothing is pending or written.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.state.pending().is_empty() && self.state.written().is_empty()
    }

    fn flush<R>(&mut self, repo: &mut R) -> TouchResult<FlushStats>
    where
        R: TouchRepository + ?Sized,
    {
        let mut stats = FlushStats::default();

        while self.state.has_pending_persisted() {
            if stats.passes >= self.config.max_flush_passes {
                return Err(TouchError::flush_pass_limit(stats.passes));
            }
            stats.passes += 1;

            let batches = self.state.drain_for_flush();
            let work: Vec<(&Column, &ClassBatch)> = batches
                .iter()
                .flat_map(|b| b.classes().iter().map(move |c| (b.column(), c)))
                .collect();
            debug!(pass = stats.passes, batches = work.len(), "touch flush pass");

            for (idx, &(column, class)) in work.iter().enumerate() {
                trace!(class = %class.class(), %column, records = class.ids().len(), "batch update");
                let mut sink = TouchSink::new(&mut self.state);
                if let Err(err) = repo.batch_update(class.class(), column, class.ids(), &mut sink)
                {
                    if self.config.failure_policy == FailurePolicy::Retain {
                        self.state.requeue(work[idx..].iter().copied());
                    }
                    return Err(err);
                }
                stats.batches += 1;
                stats.records += class.ids().len();
            }
        }

        Ok(stats)
    }
}
