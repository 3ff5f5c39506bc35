//! Loading a [`Dataset`] from a JSON file or a directory of Parquet tables.

use std::path::Path;

use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use safetrack_core::{Dataset, tables};
use tracing::info;

use crate::StoreError;
use crate::decode::{
    decode_areas, decode_attestations, decode_personnel, decode_qualifications,
    decode_requirements,
};

/// Read a Parquet file into Arrow RecordBatches.
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches: Result<Vec<RecordBatch>, _> = reader.collect();
    Ok(batches?)
}

/// Path of a table's Parquet file inside a data directory.
pub fn table_path(data_dir: &Path, table: &str) -> std::path::PathBuf {
    data_dir.join(format!("{table}.parquet"))
}

/// Load all five tables from `<data_dir>/<table>.parquet`.
pub fn load_dataset_dir(data_dir: &Path) -> Result<Dataset, StoreError> {
    let read = |table: &str| read_parquet(&table_path(data_dir, table));

    let dataset = Dataset {
        areas: decode_areas(&read(tables::AREAS)?)?,
        personnel: decode_personnel(&read(tables::PERSONNEL)?)?,
        requirements: decode_requirements(&read(tables::REQUIREMENTS)?)?,
        qualifications: decode_qualifications(&read(tables::QUALIFICATIONS)?)?,
        attestations: decode_attestations(&read(tables::ATTESTATIONS)?)?,
    };
    log_loaded(data_dir, &dataset);
    Ok(dataset)
}

/// Load a dataset serialized as JSON.
pub fn load_dataset_json(path: &Path) -> Result<Dataset, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    let dataset: Dataset = serde_json::from_reader(std::io::BufReader::new(file))?;
    log_loaded(path, &dataset);
    Ok(dataset)
}

/// Load from a Parquet directory or a JSON file, depending on what `path` is.
pub fn load_dataset(path: &Path) -> Result<Dataset, StoreError> {
    if path.is_dir() {
        load_dataset_dir(path)
    } else {
        load_dataset_json(path)
    }
}

fn log_loaded(source: &Path, dataset: &Dataset) {
    info!(
        source = %source.display(),
        areas = dataset.areas.len(),
        personnel = dataset.personnel.len(),
        requirements = dataset.requirements.len(),
        qualifications = dataset.qualifications.len(),
        attestations = dataset.attestations.len(),
        "loaded dataset"
    );
}
