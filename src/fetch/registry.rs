//! Lookup of third-party datasets through the Rdatasets master index, a
//! single well-known CSV with one row per (package, item) pair.

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DatasetError, Result};

pub const INDEX_URL: &str =
    "https://raw.githubusercontent.com/vincentarelbundock/Rdatasets/master/datasets.csv";

/// One row of the index. Columns not listed here are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    #[serde(rename = "Package")]
    pub package: String,
    #[serde(rename = "Item")]
    pub item: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Rows")]
    pub rows: u64,
    #[serde(rename = "Cols")]
    pub cols: u64,
    /// Download URL of the dataset itself.
    #[serde(rename = "CSV")]
    pub csv: String,
    #[serde(rename = "Doc")]
    pub doc: String,
}

/// Scan index rows for the (package, item) pair.
pub fn find_entry(reader: impl Read, package: &str, item: &str) -> Result<RegistryEntry> {
    let mut rdr = csv::Reader::from_reader(reader);
    for row in rdr.deserialize::<RegistryEntry>() {
        let entry = row?;
        if entry.package == package && entry.item == item {
            return Ok(entry);
        }
    }
    Err(DatasetError::NotFound {
        package: package.to_string(),
        item: item.to_string(),
    })
}

/// Download the index and look up one dataset. A miss returns `NotFound`
/// without touching the local cache.
pub fn fetch_entry(package: &str, item: &str) -> Result<RegistryEntry> {
    info!(package, item, "resolving dataset through the rdatasets index");
    let resp = super::client().get(INDEX_URL).send()?.error_for_status()?;
    let body = resp.bytes()?;
    let entry = find_entry(body.as_ref(), package, item)?;
    info!(url = %entry.csv, "resolved");
    Ok(entry)
}
