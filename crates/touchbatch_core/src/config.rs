//! Coordinator configuration.

/// What happens to queued touches when a flush fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Drop all pending and written state. The next scope starts clean.
    #[default]
    Discard,
    /// Put the unwritten batches back in the pending set so the next
    /// outermost scope flushes them. The written set is still cleared.
    Retain,
}

/// Configuration for a [`crate::TouchCoordinator`].
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Post-failure handling of pending state.
    pub failure_policy: FailurePolicy,

    /// Upper bound on drain-and-write passes in one flush.
    pub max_flush_passes: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Discard,
            max_flush_passes: 1024,
        }
    }
}

impl CoordinatorConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the failure policy.
    #[must_use]
    pub const fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sets the maximum number of flush passes.
    #[must_use]
    pub const fn max_flush_passes(mut self, passes: usize) -> Self {
        self.max_flush_passes = passes;
        self
    }
}
