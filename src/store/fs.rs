//! Filesystem snapshot store.
//!
//! Snapshots live in a `__pdf_snapshots__` directory next to the test file,
//! one PNG per page: `<identifier>.png`, plus `<identifier>-diff.png` review
//! composites for pages that failed the last run.

use super::key::{test_namespace, SnapshotKey};
use super::SnapshotStore;
use crate::raster::RasterPage;
use crate::utils::config::{DIFF_SUFFIX, SNAPSHOTS_DIR_NAME, SNAPSHOT_SUFFIX};
use crate::utils::error::StoreError;
use log::{debug, info};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    dir: PathBuf,
}

impl FsSnapshotStore {
    /// Store rooted at an explicit directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in `__pdf_snapshots__` beside `test_path`
    pub fn for_test_file(test_path: impl AsRef<Path>) -> Self {
        let parent = test_path
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(parent.join(SNAPSHOTS_DIR_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self, test_name: &str, ordinal: usize) -> Result<PathBuf, StoreError> {
        let key = SnapshotKey::new(test_name, ordinal)?;
        Ok(self.dir.join(format!("{}.png", key.identifier())))
    }

    pub fn diff_path(&self, test_name: &str, ordinal: usize) -> Result<PathBuf, StoreError> {
        let key = SnapshotKey::new(test_name, ordinal)?;
        Ok(self.dir.join(format!("{}{}", key.identifier(), DIFF_SUFFIX)))
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| io_error(&self.dir, source))
    }

    fn write_png(&self, path: &Path, page: &RasterPage) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let png = page.to_png().map_err(|source| StoreError::Corrupt {
            identifier: path.display().to_string(),
            source,
        })?;
        fs::write(path, png).map_err(|source| io_error(path, source))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn list(&self, test_name: &str) -> Result<Vec<RasterPage>, StoreError> {
        let mut pages = Vec::new();

        for ordinal in 1.. {
            let path = self.snapshot_path(test_name, ordinal)?;
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == ErrorKind::NotFound => break,
                Err(source) => return Err(io_error(&path, source)),
            };
            let page = RasterPage::from_png(&bytes).map_err(|source| StoreError::Corrupt {
                identifier: path.display().to_string(),
                source,
            })?;
            pages.push(page);
        }

        debug!(
            "Found {} snapshot(s) for {:?} in {}",
            pages.len(),
            test_name,
            self.dir.display()
        );
        Ok(pages)
    }

    fn write(&self, test_name: &str, ordinal: usize, page: &RasterPage) -> Result<(), StoreError> {
        let path = self.snapshot_path(test_name, ordinal)?;
        self.write_png(&path, page)
    }

    fn delete(&self, test_name: &str, ordinal: usize) -> Result<(), StoreError> {
        let path = self.snapshot_path(test_name, ordinal)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(io_error(&path, source)),
        }
    }

    fn write_diff(
        &self,
        test_name: &str,
        ordinal: usize,
        composite: &RasterPage,
    ) -> Result<(), StoreError> {
        let path = self.diff_path(test_name, ordinal)?;
        self.write_png(&path, composite)?;
        info!("Diff written to: {}", path.display());
        Ok(())
    }

    fn clear_diffs(&self, test_name: &str) -> Result<(), StoreError> {
        // Any ordinal: "NN_<slug>-<digest>-snap-diff.png"
        let namespace = test_namespace(test_name)?;
        let suffix = format!("_{}{}{}", namespace, SNAPSHOT_SUFFIX, DIFF_SUFFIX);

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(source) => return Err(io_error(&self.dir, source)),
        };

        for entry in entries {
            let path = entry.map_err(|source| io_error(&self.dir, source))?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let is_stale_diff = name
                .strip_suffix(&suffix)
                .is_some_and(|ordinal| !ordinal.is_empty() && ordinal.chars().all(|c| c.is_ascii_digit()));

            if is_stale_diff {
                fs::remove_file(&path).map_err(|source| io_error(&path, source))?;
                debug!("Removed stale diff {}", path.display());
            }
        }

        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
