//! Filesystem cache mapping dataset names to Arrow IPC (Feather) files under
//! a single root directory.
//!
//! The cache holds raw tables only; processed views are recomputed on read so
//! transform changes never invalidate cached downloads. Files are replaced
//! wholesale via a tmp-write-then-rename, never mutated in place.

use std::{
    env,
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use arrow::compute::concat_batches;
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use glob::glob;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::Result;
use crate::fetch::registry::RegistryEntry;

/// Environment variable overriding the cache root directory.
pub const DATA_DIR_ENV: &str = "SURVDATA_DATA_DIR";

const TABLE_EXT: &str = "feather";

/// Registry metadata captured when a dataset was downloaded, persisted as a
/// `<name>_info.json` sidecar next to the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    #[serde(flatten)]
    pub entry: RegistryEntry,
    /// RFC 3339 UTC timestamp of the download.
    pub retrieved: String,
}

#[derive(Debug, Clone)]
pub struct DataCache {
    root: PathBuf,
}

impl DataCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root taken from `SURVDATA_DATA_DIR`, falling back to `data/`.
    pub fn from_env() -> Self {
        let root = env::var(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<name>.feather`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, TABLE_EXT))
    }

    fn info_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}_info.json", name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// SHA-256 over the raw bytes of the cached file, as lowercase hex.
    /// A missing file surfaces the underlying io error.
    pub fn checksum(&self, name: &str) -> Result<String> {
        let mut file = File::open(self.path_for(name))?;
        let mut hasher = Sha256::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hex::encode(hasher.finalize()))
    }

    /// Remove the cached table and its info sidecar; absent files are not an
    /// error.
    pub fn delete(&self, name: &str) -> Result<()> {
        for path in [self.path_for(name), self.info_path(name)] {
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Persist `batch` as `<name>.feather`. Writes to a `.tmp` sibling first
    /// and renames over any previous copy, so readers only ever see a whole
    /// file.
    pub fn store(&self, name: &str, batch: &RecordBatch) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(name);
        let tmp = self.root.join(format!(".{}.{}.tmp", name, TABLE_EXT));

        let file = File::create(&tmp)?;
        let mut writer = FileWriter::try_new(BufWriter::new(file), batch.schema().as_ref())?;
        writer.write(batch)?;
        writer.finish()?;
        writer.into_inner()?.flush()?;

        fs::rename(&tmp, &path)?;
        debug!(name, rows = batch.num_rows(), path = %path.display(), "stored table");
        Ok(path)
    }

    /// Load the cached table, concatenating all record batches in the file.
    pub fn load(&self, name: &str) -> Result<RecordBatch> {
        let file = File::open(self.path_for(name))?;
        let reader = FileReader::try_new(BufReader::new(file), None)?;
        let schema = reader.schema();
        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(concat_batches(&schema, &batches)?)
    }

    /// Names of every cached dataset under the root, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let pattern = format!("{}/*.{}", self.root.display(), TABLE_EXT);
        let mut names = Vec::new();
        for entry in glob(&pattern)? {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    warn!("skipping unreadable cache entry: {e}");
                    continue;
                }
            };
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Write the `<name>_info.json` sidecar, same tmp-then-rename as `store`.
    pub fn store_info(&self, name: &str, entry: &RegistryEntry) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let info = DatasetInfo {
            entry: entry.clone(),
            retrieved: Utc::now().to_rfc3339(),
        };
        let tmp = self.root.join(format!(".{}_info.json.tmp", name));
        let mut file = File::create(&tmp)?;
        serde_json::to_writer_pretty(&mut file, &info)?;
        file.write_all(b"\n")?;
        fs::rename(&tmp, self.info_path(name))?;
        Ok(())
    }

    pub fn load_info(&self, name: &str) -> Result<DatasetInfo> {
        let file = File::open(self.info_path(name))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
