//! # TouchBatch Core
//!
//! Deferred, coalesced timestamp touches.
//!
//! Saving a record usually touches a timestamp column, and association
//! callbacks cascade that touch to parents, grandparents and so on. Done
//! eagerly, a deep graph issues one UPDATE per touch. This crate queues
//! touches for the length of a (possibly nested) scope and writes them at
//! the outermost close, one batch per (column, class) pair.
//!
//! This crate provides:
//! - [`TouchCoordinator`]: scope nesting, registration and the fixpoint flush
//! - [`TouchRepository`] / [`TimestampColumns`]: the persistence-layer seam
//! - [`MemoryRepository`]: an in-memory repository for tests
//!
//! ## Example
//!
//! ```rust
//! use touchbatch_core::{MemoryRepository, RecordId, TouchCoordinator, TouchRecord};
//!
//! let mut repo = MemoryRepository::new().with_default_columns("Pet", &["updated_at"]);
//! let mut coord = TouchCoordinator::new();
//! let pet = TouchRecord::persisted("Pet", RecordId::from_u64(1));
//!
//! coord.enter_scope();
//! coord.register(&pet, &[], &repo);
//! coord.register(&pet, &[], &repo);
//! let stats = coord.exit_scope(&mut repo).unwrap().unwrap();
//!
//! assert_eq!(stats.batches, 1);
//! assert_eq!(repo.touch_count(pet.key(), "updated_at"), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod config;
mod coordinator;
mod error;
mod memory;
mod pending;
mod repository;
mod state;
mod stats;
mod types;

pub use batch::{ClassBatch, ColumnBatch};
pub use config::{CoordinatorConfig, FailurePolicy};
pub use coordinator::TouchCoordinator;
pub use error::{TouchError, TouchResult};
pub use memory::{MemoryRepository, WriteCall};
pub use repository::{NoopRepository, TimestampColumns, TouchRepository};
pub use state::TouchSink;
pub use stats::FlushStats;
pub use types::{ClassTag, Column, RecordId, RecordKey, TouchRecord};
