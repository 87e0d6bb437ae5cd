//! In-process snapshot store, for embedding and tests.

use super::key::{test_namespace, SnapshotKey};
use super::SnapshotStore;
use crate::raster::RasterPage;
use crate::utils::error::StoreError;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<BTreeMap<SnapshotKey, RasterPage>>,
    diffs: Mutex<BTreeMap<SnapshotKey, RasterPage>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with snapshots at ordinals 1..=n
    pub fn with_snapshots(test_name: &str, pages: Vec<RasterPage>) -> Result<Self, StoreError> {
        let store = Self::new();
        for (index, page) in pages.iter().enumerate() {
            store.write(test_name, index + 1, page)?;
        }
        Ok(store)
    }

    /// Review composites currently held for `test_name`, by ordinal
    pub fn diffs(&self, test_name: &str) -> Result<Vec<(usize, RasterPage)>, StoreError> {
        let namespace = test_namespace(test_name)?;
        Ok(lock(&self.diffs)?
            .iter()
            .filter(|(key, _)| key.namespace() == namespace)
            .map(|(key, page)| (key.ordinal(), page.clone()))
            .collect())
    }

    /// Number of stored snapshots across all tests
    pub fn len(&self) -> usize {
        self.snapshots.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex.lock().map_err(|_| StoreError::Poisoned)
}

impl SnapshotStore for MemorySnapshotStore {
    fn list(&self, test_name: &str) -> Result<Vec<RasterPage>, StoreError> {
        let snapshots = lock(&self.snapshots)?;
        let mut pages = Vec::new();
        for ordinal in 1.. {
            match snapshots.get(&SnapshotKey::new(test_name, ordinal)?) {
                Some(page) => pages.push(page.clone()),
                None => break,
            }
        }
        Ok(pages)
    }

    fn write(&self, test_name: &str, ordinal: usize, page: &RasterPage) -> Result<(), StoreError> {
        let key = SnapshotKey::new(test_name, ordinal)?;
        lock(&self.snapshots)?.insert(key, page.clone());
        Ok(())
    }

    fn delete(&self, test_name: &str, ordinal: usize) -> Result<(), StoreError> {
        let key = SnapshotKey::new(test_name, ordinal)?;
        lock(&self.snapshots)?.remove(&key);
        Ok(())
    }

    fn write_diff(
        &self,
        test_name: &str,
        ordinal: usize,
        composite: &RasterPage,
    ) -> Result<(), StoreError> {
        let key = SnapshotKey::new(test_name, ordinal)?;
        lock(&self.diffs)?.insert(key, composite.clone());
        Ok(())
    }

    fn clear_diffs(&self, test_name: &str) -> Result<(), StoreError> {
        let namespace = test_namespace(test_name)?;
        lock(&self.diffs)?.retain(|key, _| key.namespace() != namespace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_stops_at_gap() {
        let page = RasterPage::filled(1, 1, [0, 0, 0, 255]);
        let store = MemorySnapshotStore::new();
        store.write("t", 1, &page).unwrap();
        store.write("t", 3, &page).unwrap();

        assert_eq!(store.list("t").unwrap().len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let page = RasterPage::filled(1, 1, [0, 0, 0, 255]);
        let store = MemorySnapshotStore::with_snapshots("first", vec![page.clone()]).unwrap();

        assert!(store.list("second").unwrap().is_empty());
        store.write_diff("second", 1, &page).unwrap();
        store.clear_diffs("first").unwrap();
        assert_eq!(store.diffs("second").unwrap().len(), 1);
    }
}
