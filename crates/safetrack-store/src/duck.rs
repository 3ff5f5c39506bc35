//! DuckDB storage for the compliance record tables.

use std::path::Path;

use arrow::record_batch::RecordBatch;
use duckdb::Connection;
use safetrack_core::{Dataset, tables};
use tracing::info;

use crate::StoreError;
use crate::decode::{
    decode_areas, decode_attestations, decode_personnel, decode_qualifications,
    decode_requirements,
};
use crate::load::table_path;

/// DuckDB store holding the five record tables.
///
/// Tables are imported from Parquet once and then queried in place, so a
/// person's documents can be fetched without decoding the whole data set.
/// Use [`open`](Self::open) for in-memory and [`open_persistent`](Self::open_persistent)
/// for file-backed storage that survives across process restarts.
pub struct DuckStore {
    conn: Connection,
}

impl DuckStore {
    /// Open an in-memory DuckDB database.
    pub fn open() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Open or create a persistent DuckDB database at the given path.
    ///
    /// If the file already exists, tables are available immediately without
    /// re-importing from Parquet. Use [`has_tables`](Self::has_tables) to check
    /// whether import is needed.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Check whether all record tables exist.
    pub fn has_tables(&self) -> bool {
        tables::ALL.iter().all(|t| self.count(t).is_ok())
    }

    /// Load `<table>.parquet` into the table of the same name.
    pub fn load_table(&self, table: &'static str, path: &Path) -> Result<(), StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        let sql = format!(
            "CREATE OR REPLACE TABLE {table} AS SELECT * FROM read_parquet({})",
            sql_literal(&path.to_string_lossy())
        );
        self.conn.execute_batch(&sql)?;
        let count = self.count(table)?;
        info!(table, count, "loaded table");
        Ok(())
    }

    /// Load every record table from a directory of `<table>.parquet` files.
    pub fn load_all(&self, data_dir: &Path) -> Result<(), StoreError> {
        for table in tables::ALL {
            self.load_table(table, &table_path(data_dir, table))?;
        }
        Ok(())
    }

    /// Number of rows in a record table.
    pub fn count(&self, table: &str) -> Result<usize, StoreError> {
        let sql = format!("SELECT count(*)::BIGINT AS cnt FROM {table}");
        let batches = self.query_arrow(&sql)?;
        let batch = batches.first().ok_or(StoreError::NoResults)?;
        let col = batch
            .column(0)
            .as_any()
            .downcast_ref::<arrow::array::Int64Array>()
            .ok_or_else(|| StoreError::Other("count column not i64".into()))?;
        Ok(col.value(0) as usize)
    }

    // ── Per-person lookups ──

    pub fn qualifications_for(&self, personnel_id: &str) -> Result<Vec<RecordBatch>, StoreError> {
        self.select_for_person(tables::QUALIFICATIONS, personnel_id)
    }

    pub fn attestations_for(&self, personnel_id: &str) -> Result<Vec<RecordBatch>, StoreError> {
        self.select_for_person(tables::ATTESTATIONS, personnel_id)
    }

    fn select_for_person(
        &self,
        table: &'static str,
        personnel_id: &str,
    ) -> Result<Vec<RecordBatch>, StoreError> {
        let sql = format!("SELECT * FROM {table} WHERE personnel_id = ? ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([personnel_id])?.collect();
        Ok(batches)
    }

    /// Decode every table into a [`Dataset`].
    pub fn dataset(&self) -> Result<Dataset, StoreError> {
        let all = |table: &str| self.query_arrow(&format!("SELECT * FROM {table} ORDER BY rowid"));
        Ok(Dataset {
            areas: decode_areas(&all(tables::AREAS)?)?,
            personnel: decode_personnel(&all(tables::PERSONNEL)?)?,
            requirements: decode_requirements(&all(tables::REQUIREMENTS)?)?,
            qualifications: decode_qualifications(&all(tables::QUALIFICATIONS)?)?,
            attestations: decode_attestations(&all(tables::ATTESTATIONS)?)?,
        })
    }

    // ── Escape hatch ──

    /// Execute arbitrary SQL and return Arrow RecordBatches.
    pub fn query_arrow(&self, sql: &str) -> Result<Vec<RecordBatch>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([])?.collect();
        Ok(batches)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Quote `s` as a SQL string literal.
fn sql_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::tests::write_fixture;
    use tempfile::TempDir;

    #[test]
    fn open_in_memory() {
        let store = DuckStore::open().unwrap();
        let batches = store.query_arrow("SELECT 1 AS x").unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].num_rows(), 1);
    }

    #[test]
    fn load_missing_file_errors() {
        let store = DuckStore::open().unwrap();
        let result = store.load_table(tables::AREAS, Path::new("/nonexistent/areas.parquet"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn has_tables_false_for_empty_memory() {
        let store = DuckStore::open().unwrap();
        assert!(!store.has_tables());
    }

    #[test]
    fn quotes_in_paths_are_escaped() {
        assert_eq!(sql_literal("/data/o'brien"), "'/data/o''brien'");

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("o'brien");
        std::fs::create_dir(&dir).unwrap();
        write_fixture(&dir);

        let store = DuckStore::open().unwrap();
        store.load_all(&dir).unwrap();
        assert_eq!(store.count(tables::PERSONNEL).unwrap(), 1);
    }

    #[test]
    fn load_all_and_count() {
        let tmp = TempDir::new().unwrap();
        write_fixture(tmp.path());
        let store = DuckStore::open().unwrap();
        store.load_all(tmp.path()).unwrap();
        assert!(store.has_tables());
        assert_eq!(store.count(tables::QUALIFICATIONS).unwrap(), 1);
        assert_eq!(store.count(tables::ATTESTATIONS).unwrap(), 1);
    }

    #[test]
    fn per_person_lookup() {
        let tmp = TempDir::new().unwrap();
        write_fixture(tmp.path());
        let store = DuckStore::open().unwrap();
        store.load_all(tmp.path()).unwrap();

        let quals = decode_qualifications(&store.qualifications_for("personnel-1").unwrap()).unwrap();
        assert_eq!(quals.len(), 1);
        assert_eq!(quals[0].certificate_number, "ДПО-2025-001");

        let none = store.attestations_for("personnel-404").unwrap();
        let rows: usize = none.iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 0);
    }

    #[test]
    fn persistent_load_and_reopen() {
        let data = TempDir::new().unwrap();
        write_fixture(data.path());
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("safetrack.duckdb");

        let store = DuckStore::open_persistent(&db_path).unwrap();
        assert!(!store.has_tables());
        store.load_all(data.path()).unwrap();
        drop(store);

        // Second open: tables already present, no import needed.
        let store = DuckStore::open_persistent(&db_path).unwrap();
        assert!(store.has_tables());
        let dataset = store.dataset().unwrap();
        assert_eq!(dataset.personnel[0].full_name, "Иванов Иван Иванович");
        assert_eq!(dataset.requirements[0].area_codes, vec!["Б.3"]);
    }
}
