use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

/// Everything that can go wrong while resolving, downloading or reading a
/// dataset. Failures are terminal for the calling operation; nothing in the
/// crate retries or falls back.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset `{package}/{item}` not found in registry")]
    NotFound { package: String, item: String },

    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("csv decode error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("column `{0}` missing from table")]
    MissingColumn(String),
}
