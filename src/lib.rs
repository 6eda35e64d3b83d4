//! Convenience loaders for a handful of named survival-analysis datasets.
//!
//! Each dataset is downloaded once from a public CSV mirror, cached under the
//! data directory as an Arrow IPC (Feather) file, and optionally passed
//! through a dataset-specific column transform on read:
//!
//! ```no_run
//! use survdata::datasets;
//!
//! # fn main() -> survdata::Result<()> {
//! let flchain = datasets::flchain();
//! let df = flchain.read_df(true)?;
//! println!("{} rows, duration column `{}`", df.num_rows(), flchain.col_duration);
//! # Ok(())
//! # }
//! ```
//!
//! The cache root defaults to `data/` and can be overridden with the
//! `SURVDATA_DATA_DIR` environment variable.

pub mod cache;
pub mod datasets;
pub mod error;
pub mod fetch;
pub mod frame;

pub use cache::DataCache;
pub use datasets::{Dataset, Source};
pub use error::{DatasetError, Result};
