//! Blocking HTTP download of CSV tables.
//!
//! Transport failures propagate unchanged to the caller; there are no retries
//! and no fallback sources.

use arrow::record_batch::RecordBatch;
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::Result;
use crate::frame;

pub mod registry;

static CLIENT: Lazy<Client> = Lazy::new(Client::new);

/// Shared blocking HTTP client.
pub(crate) fn client() -> &'static Client {
    &CLIENT
}

/// Download the CSV at `url_str` and parse it into a record batch.
pub fn fetch_table(url_str: &str) -> Result<RecordBatch> {
    let url = Url::parse(url_str)?;
    info!(%url, "downloading csv");
    let resp = client().get(url.as_str()).send()?.error_for_status()?;
    let body = resp.bytes()?;
    debug!(bytes = body.len(), "download complete");
    frame::parse_csv(&body)
}
