//! Generic download-cache-then-transform dataset loader.
//!
//! Each dataset is a plain descriptor (name, source, recorded checksum,
//! duration/event column names) paired with a pure transform function; there
//! is no per-dataset type. The cache always holds the raw table exactly as
//! downloaded, so the transforms can change without invalidating it.

use std::path::PathBuf;

use arrow::record_batch::RecordBatch;
use tracing::{info, warn};

use crate::cache::DataCache;
use crate::error::Result;
use crate::fetch::{self, registry};

mod survival;

pub use survival::{flchain, gbsg, nwtco, rotterdam};

/// Where a dataset's raw CSV comes from.
#[derive(Debug, Clone, Copy)]
pub enum Source {
    /// Fixed download URL.
    Direct(&'static str),
    /// Resolved through the Rdatasets index by (package, item).
    Rdatasets {
        package: &'static str,
        item: &'static str,
    },
}

/// A named survival dataset and the cache it reads through.
#[derive(Debug)]
pub struct Dataset {
    name: &'static str,
    source: Source,
    expected_checksum: &'static str,
    /// Time-to-event (or censoring) column.
    pub col_duration: &'static str,
    /// Event indicator column, 1 = event, 0 = censored.
    pub col_event: &'static str,
    transform: fn(RecordBatch) -> Result<RecordBatch>,
    cache: DataCache,
}

impl Dataset {
    pub(crate) fn new(
        name: &'static str,
        source: Source,
        expected_checksum: &'static str,
        col_duration: &'static str,
        col_event: &'static str,
        transform: fn(RecordBatch) -> Result<RecordBatch>,
    ) -> Self {
        Self {
            name,
            source,
            expected_checksum,
            col_duration,
            col_event,
            transform,
            cache: DataCache::from_env(),
        }
    }

    /// Same dataset, reading through a different cache root.
    pub fn with_data_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache = DataCache::new(root);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Path of the cached raw table.
    pub fn path(&self) -> PathBuf {
        self.cache.path_for(self.name)
    }

    pub fn is_cached(&self) -> bool {
        self.cache.exists(self.name)
    }

    /// The dataset as a record batch, downloading into the cache first if
    /// missing. With `processed` the dataset transform is applied to the
    /// freshly loaded raw table; otherwise the raw table is returned as-is.
    pub fn read_df(&self, processed: bool) -> Result<RecordBatch> {
        if !self.cache.exists(self.name) {
            self.download()?;
        }
        let raw = self.cache.load(self.name)?;
        if processed {
            (self.transform)(raw)
        } else {
            Ok(raw)
        }
    }

    fn download(&self) -> Result<()> {
        let batch = match self.source {
            Source::Direct(url) => fetch::fetch_table(url)?,
            Source::Rdatasets { package, item } => {
                let entry = registry::fetch_entry(package, item)?;
                let batch = fetch::fetch_table(&entry.csv)?;
                self.cache.store_info(self.name, &entry)?;
                batch
            }
        };
        let path = self.cache.store(self.name, &batch)?;
        info!(name = self.name, rows = batch.num_rows(), path = %path.display(), "dataset cached");
        Ok(())
    }

    /// Compare the cached file's checksum against the recorded known-good
    /// value. Runs only when called; `read_df` never invokes it. A mismatch
    /// warns and returns false, leaving the decision to the caller.
    pub fn check_integrity(&self) -> Result<bool> {
        let actual = self.cache.checksum(self.name)?;
        let ok = actual == self.expected_checksum;
        if !ok {
            warn!(
                name = self.name,
                expected = self.expected_checksum,
                actual = %actual,
                "checksum mismatch; delete the local copy to force a fresh download"
            );
        }
        Ok(ok)
    }

    /// Drop the cached file (and metadata sidecar) if present.
    pub fn delete_local_copy(&self) -> Result<()> {
        self.cache.delete(self.name)
    }
}

/// Every known dataset.
pub fn all() -> Vec<Dataset> {
    vec![flchain(), gbsg(), nwtco(), rotterdam()]
}
