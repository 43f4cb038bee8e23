//! Property-based test generators using proptest.
//!
//! Provides strategies for generating touch registrations and nested
//! scope plans over a small, fixed class and column vocabulary.

use proptest::prelude::*;
use touchbatch_core::{MemoryRepository, RecordId, TouchRecord};

/// Classes used by generated registrations.
pub const CLASSES: [&str; 3] = ["Person", "Pet", "Toy"];

/// Columns used by generated registrations. Includes the empty column.
pub const COLUMNS: [&str; 4] = ["", "updated_at", "neutered_at", "seen_at"];

/// Repository whose defaults match the generated vocabulary.
///
/// `Toy` has no default columns, so default-column registrations of toys
/// are no-ops.
pub fn generated_repository() -> MemoryRepository {
    MemoryRepository::new()
        .with_default_columns("Person", &["updated_at"])
        .with_default_columns("Pet", &["updated_at", "seen_at"])
        .with_default_columns("Toy", &[])
}

/// One generated call to `register`.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Record class, one of [`CLASSES`].
    pub class: &'static str,
    /// Primary key.
    pub id: u64,
    /// Whether the record has a row.
    pub persisted: bool,
    /// Explicit columns; empty means defaults.
    pub columns: Vec<&'static str>,
}

impl Registration {
    /// Builds the record this registration refers to.
    pub fn record(&self) -> TouchRecord {
        let id = RecordId::from_u64(self.id);
        if self.persisted {
            TouchRecord::persisted(self.class, id)
        } else {
            TouchRecord::unpersisted(self.class, id)
        }
    }
}

/// Strategy for generating a record class.
pub fn class_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CLASSES.to_vec())
}

/// Strategy for generating an explicit column list (possibly empty).
pub fn columns_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(COLUMNS.to_vec()), 0..3)
}

/// Strategy for generating a single registration.
///
/// Ids are drawn from a small range so duplicates are common.
pub fn registration_strategy() -> impl Strategy<Value = Registration> {
    (class_strategy(), 1u64..6, prop::bool::weighted(0.8), columns_strategy()).prop_map(
        |(class, id, persisted, columns)| Registration {
            class,
            id,
            persisted,
            columns,
        },
    )
}

/// Strategy for generating a flat sequence of registrations.
pub fn registrations_strategy(
    min: usize,
    max: usize,
) -> impl Strategy<Value = Vec<Registration>> {
    prop::collection::vec(registration_strategy(), min..max)
}

/// Strategy for generating registrations per nesting level.
///
/// Level `n` is registered with `n + 1` scopes open.
pub fn scope_plan_strategy() -> impl Strategy<Value = Vec<Vec<Registration>>> {
    prop::collection::vec(registrations_strategy(0, 8), 1..5)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn registration_uses_vocabulary(reg in registration_strategy()) {
            prop_assert!(CLASSES.contains(&reg.class));
            prop_assert!(reg.columns.iter().all(|c| COLUMNS.contains(c)));
            prop_assert_eq!(reg.record().is_persisted(), reg.persisted);
        }

        #[test]
        fn scope_plan_is_non_empty(plan in scope_plan_strategy()) {
            prop_assert!(!plan.is_empty());
            prop_assert!(plan.len() < 5);
        }
    }
}
