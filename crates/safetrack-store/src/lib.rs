//! Storage layer: in-memory record set, Parquet/JSON loading, DuckDB (feature `duckdb`).

pub mod decode;
mod error;
mod load;
mod records;

pub use error::StoreError;
pub use load::{load_dataset, load_dataset_dir, load_dataset_json, read_parquet, table_path};
pub use records::{EvaluationCache, RecordSet};

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;
