//! Benchmark utilities.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use rand::Rng;
use touchbatch_core::{RecordId, TouchRecord};

/// Classes used by generated workloads.
pub const CLASSES: [&str; 4] = ["Person", "Pet", "Toy", "Vet"];

/// Generate `count` persisted records spread over [`CLASSES`].
///
/// Ids are drawn from `0..distinct`, so a small `distinct` produces many
/// duplicate registrations.
pub fn random_records(count: usize, distinct: u64) -> Vec<TouchRecord> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let class = CLASSES[rng.gen_range(0..CLASSES.len())];
            TouchRecord::persisted(class, RecordId::from_u64(rng.gen_range(0..distinct)))
        })
        .collect()
}
