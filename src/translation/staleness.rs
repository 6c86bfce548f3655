/*!
 * Modification-time tracking to skip work already done in this run.
 *
 * The tracker is an explicitly constructed value handed to the orchestrator, not
 * global state. Clones share the underlying record.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use log::debug;
use parking_lot::Mutex;

/// Record of `(path, modification time)` pairs already processed
#[derive(Debug, Clone, Default)]
pub struct StalenessTracker {
    records: Arc<Mutex<HashMap<PathBuf, SystemTime>>>,
}

impl StalenessTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// True unless `path` was recorded with a modification time at or after `modified`
    pub fn is_newer(&self, path: &Path, modified: SystemTime) -> bool {
        let records = self.records.lock();
        Self::newer_than_record(&records, path, modified)
    }

    /// Store `modified` for `path`, overwriting any previous record
    pub fn record_modified(&self, path: &Path, modified: SystemTime) {
        self.records.lock().insert(path.to_path_buf(), modified);
    }

    /// Check and record under one lock.
    ///
    /// Returns true if the caller won the right to process `path`; concurrent callers
    /// for the same path and time cannot both get true.
    pub fn claim(&self, path: &Path, modified: SystemTime) -> bool {
        let mut records = self.records.lock();
        if !Self::newer_than_record(&records, path, modified) {
            debug!("Already processed {:?} at this modification time", path);
            return false;
        }
        records.insert(path.to_path_buf(), modified);
        true
    }

    /// Number of recorded paths
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// True if nothing was recorded yet
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    fn newer_than_record(records: &HashMap<PathBuf, SystemTime>, path: &Path, modified: SystemTime) -> bool {
        match records.get(path) {
            Some(seen) => modified > *seen,
            None => true,
        }
    }
}
