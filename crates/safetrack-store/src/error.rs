use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("no results for query")]
    NoResults,

    #[error("unknown {kind} id: {id}")]
    UnknownRecord { kind: &'static str, id: String },

    #[error("column {column:?} in table {table:?}: {reason}")]
    Column {
        table: &'static str,
        column: &'static str,
        reason: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value: {0}")]
    Core(#[from] safetrack_core::CoreError),

    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] ::duckdb::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("{0}")]
    Other(String),
}
