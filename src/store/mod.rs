//! Snapshot persistence.
//!
//! Stores are namespaced by test name; within a namespace each page lives
//! under the identifier produced by [`SnapshotKey`].

mod fs;
mod key;
mod memory;

pub use fs::FsSnapshotStore;
pub use key::{kebab_case, test_namespace, SnapshotKey};
pub use memory::MemorySnapshotStore;

use crate::raster::RasterPage;
use crate::reconcile::StoreMutation;
use crate::utils::error::StoreError;
use log::debug;
use rayon::prelude::*;

/// Durable storage of accepted page snapshots.
///
/// `delete` of a missing snapshot succeeds, so every operation is idempotent
/// per key and writes to distinct ordinals may run concurrently.
pub trait SnapshotStore: Send + Sync {
    /// Snapshots for `test_name` in ordinal order, stopping at the first gap
    fn list(&self, test_name: &str) -> Result<Vec<RasterPage>, StoreError>;

    fn write(&self, test_name: &str, ordinal: usize, page: &RasterPage)
        -> Result<(), StoreError>;

    fn delete(&self, test_name: &str, ordinal: usize) -> Result<(), StoreError>;

    /// Persist a review composite for a changed page
    fn write_diff(
        &self,
        test_name: &str,
        ordinal: usize,
        composite: &RasterPage,
    ) -> Result<(), StoreError>;

    /// Remove every review composite left by earlier runs of `test_name`
    fn clear_diffs(&self, test_name: &str) -> Result<(), StoreError>;
}

/// Apply pending mutations, concurrently across ordinals.
///
/// Mutations committed before a failure are not rolled back.
pub fn apply_mutations<S: SnapshotStore + ?Sized>(
    store: &S,
    test_name: &str,
    mutations: &[StoreMutation],
) -> Result<(), StoreError> {
    debug!("Applying {} snapshot mutation(s)", mutations.len());

    mutations.par_iter().try_for_each(|mutation| match mutation {
        StoreMutation::Write { ordinal, page } => store.write(test_name, *ordinal, page),
        StoreMutation::Delete { ordinal } => store.delete(test_name, *ordinal),
    })
}
