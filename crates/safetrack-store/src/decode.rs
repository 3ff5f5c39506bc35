//! Decoding Arrow RecordBatches into SafeTrack records.
//!
//! Expects the column names of [`safetrack_core::tables`]. String columns may
//! be `Utf8` or `LargeUtf8` (DuckDB exports the latter); date columns may be
//! `Date32` or ISO 8601 strings. Extra columns are ignored.

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, LargeListArray, LargeStringArray, ListArray,
    StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use safetrack_core::dates::parse_date;
use safetrack_core::tables;
use safetrack_core::{
    AttestationRecord, Personnel, PersonnelStatus, PositionRequirement, QualificationRecord,
    RequiredArea,
};

use crate::StoreError;

pub fn decode_areas(batches: &[RecordBatch]) -> Result<Vec<RequiredArea>, StoreError> {
    decode_rows(tables::AREAS, batches, |t, row| {
        Ok(RequiredArea {
            code: t.string("code", row)?,
            name: t.string("name", row)?,
            category: t.string("category", row)?.parse()?,
            requires_dpo: t.opt_bool("requires_dpo", row)?.unwrap_or(false),
        })
    })
}

pub fn decode_personnel(batches: &[RecordBatch]) -> Result<Vec<Personnel>, StoreError> {
    decode_rows(tables::PERSONNEL, batches, |t, row| {
        let status = match t.opt_string("status", row)? {
            Some(s) => s.parse()?,
            None => PersonnelStatus::default(),
        };
        Ok(Personnel {
            id: t.string("id", row)?,
            full_name: t.string("full_name", row)?,
            position: t.string("position", row)?,
            organization_id: t.opt_string("organization_id", row)?,
            organization_name: t.opt_string("organization_name", row)?,
            status,
        })
    })
}

pub fn decode_requirements(
    batches: &[RecordBatch],
) -> Result<Vec<PositionRequirement>, StoreError> {
    decode_rows(tables::REQUIREMENTS, batches, |t, row| {
        Ok(PositionRequirement {
            organization_id: t.string("organization_id", row)?,
            position: t.string("position", row)?,
            area_codes: t.string_list("area_codes", row)?,
        })
    })
}

pub fn decode_qualifications(
    batches: &[RecordBatch],
) -> Result<Vec<QualificationRecord>, StoreError> {
    decode_rows(tables::QUALIFICATIONS, batches, |t, row| {
        Ok(QualificationRecord {
            id: t.string("id", row)?,
            personnel_id: t.string("personnel_id", row)?,
            program_name: t.string("program_name", row)?,
            certificate_number: t.string("certificate_number", row)?,
            issue_date: t.date("issue_date", row)?,
            expiry_date: t.date("expiry_date", row)?,
        })
    })
}

pub fn decode_attestations(
    batches: &[RecordBatch],
) -> Result<Vec<AttestationRecord>, StoreError> {
    decode_rows(tables::ATTESTATIONS, batches, |t, row| {
        Ok(AttestationRecord {
            id: t.string("id", row)?,
            personnel_id: t.string("personnel_id", row)?,
            area: t.string("area", row)?,
            protocol_number: t.string("protocol_number", row)?,
            expiry_date: t.date("expiry_date", row)?,
            attestation_type: t.string("attestation_type", row)?.parse()?,
        })
    })
}

fn decode_rows<T>(
    table: &'static str,
    batches: &[RecordBatch],
    mut decode: impl FnMut(&TableBatch<'_>, usize) -> Result<T, StoreError>,
) -> Result<Vec<T>, StoreError> {
    let total: usize = batches.iter().map(|b| b.num_rows()).sum();
    let mut out = Vec::with_capacity(total);
    for batch in batches {
        let t = TableBatch { table, batch };
        for row in 0..batch.num_rows() {
            out.push(decode(&t, row)?);
        }
    }
    Ok(out)
}

/// A batch tagged with its table name for error reporting.
struct TableBatch<'a> {
    table: &'static str,
    batch: &'a RecordBatch,
}

impl TableBatch<'_> {
    fn error(&self, column: &'static str, reason: impl Into<String>) -> StoreError {
        StoreError::Column {
            table: self.table,
            column,
            reason: reason.into(),
        }
    }

    fn column(&self, column: &'static str) -> Result<&ArrayRef, StoreError> {
        self.batch
            .column_by_name(column)
            .ok_or_else(|| self.error(column, "missing"))
    }

    fn string(&self, column: &'static str, row: usize) -> Result<String, StoreError> {
        let col = self.column(column)?;
        if col.is_null(row) {
            return Err(self.error(column, format!("null at row {row}")));
        }
        get_string(col.as_ref(), row).ok_or_else(|| self.unexpected_type(column, col.data_type()))
    }

    /// Null or absent columns decode as `None`.
    fn opt_string(&self, column: &'static str, row: usize) -> Result<Option<String>, StoreError> {
        let Some(col) = self.batch.column_by_name(column) else {
            return Ok(None);
        };
        if col.is_null(row) {
            return Ok(None);
        }
        get_string(col.as_ref(), row)
            .map(Some)
            .ok_or_else(|| self.unexpected_type(column, col.data_type()))
    }

    fn opt_bool(&self, column: &'static str, row: usize) -> Result<Option<bool>, StoreError> {
        let Some(col) = self.batch.column_by_name(column) else {
            return Ok(None);
        };
        if col.is_null(row) {
            return Ok(None);
        }
        col.as_any()
            .downcast_ref::<BooleanArray>()
            .map(|arr| Some(arr.value(row)))
            .ok_or_else(|| self.unexpected_type(column, col.data_type()))
    }

    fn date(&self, column: &'static str, row: usize) -> Result<NaiveDate, StoreError> {
        let col = self.column(column)?;
        if col.is_null(row) {
            return Err(self.error(column, format!("null at row {row}")));
        }
        if let Some(arr) = col.as_any().downcast_ref::<Date32Array>() {
            return arr
                .value_as_date(row)
                .ok_or_else(|| self.error(column, format!("date out of range at row {row}")));
        }
        match get_string(col.as_ref(), row) {
            Some(s) => Ok(parse_date(&s)?),
            None => Err(self.unexpected_type(column, col.data_type())),
        }
    }

    fn string_list(&self, column: &'static str, row: usize) -> Result<Vec<String>, StoreError> {
        let col = self.column(column)?;
        if col.is_null(row) {
            return Ok(Vec::new());
        }
        get_string_list(col.as_ref(), row)
            .ok_or_else(|| self.unexpected_type(column, col.data_type()))
    }

    fn unexpected_type(&self, column: &'static str, data_type: &DataType) -> StoreError {
        self.error(column, format!("unexpected type {data_type}"))
    }
}

// ── Arrow extraction helpers ──

/// Extract a string value from an Arrow array (handles Utf8 and LargeUtf8).
fn get_string(col: &dyn Array, row: usize) -> Option<String> {
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row).to_string())
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row).to_string())
        })
}

/// Extract a list of strings from a List or LargeList column.
fn get_string_list(col: &dyn Array, row: usize) -> Option<Vec<String>> {
    if let Some(list) = col.as_any().downcast_ref::<ListArray>() {
        return strings_from_array(list.value(row).as_ref());
    }
    if let Some(list) = col.as_any().downcast_ref::<LargeListArray>() {
        return strings_from_array(list.value(row).as_ref());
    }
    None
}

fn strings_from_array(arr: &dyn Array) -> Option<Vec<String>> {
    let mut out = Vec::with_capacity(arr.len());
    for i in 0..arr.len() {
        if arr.is_null(i) {
            continue;
        }
        out.push(get_string(arr, i)?);
    }
    Some(out)
}
