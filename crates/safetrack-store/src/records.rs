//! In-memory record set with explicit memoization of evaluations.
//!
//! [`RecordSet`] owns a [`Dataset`] and takes a new version on every mutation.
//! Writes are last-writer-wins. Versions are drawn from one process-wide
//! counter, so two record sets that diverged from a common clone never share
//! a version. [`EvaluationCache`] keys results by
//! `(personnel_id, version, today)`, so any mutation invalidates every
//! cached evaluation without the record set tracking its readers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use safetrack_core::{
    AreaStatus, AttestationRecord, Dataset, EvaluationPolicy, GapReport, QualificationRecord,
    RequiredArea, analyze, evaluate_person,
};
use tracing::debug;

use crate::StoreError;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// Versioned in-memory records. A clone shares its version until either copy
/// is mutated.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    data: Dataset,
    policy: EvaluationPolicy,
    version: u64,
}

impl RecordSet {
    pub fn new(data: Dataset) -> Self {
        Self {
            data,
            policy: EvaluationPolicy::default(),
            version: next_version(),
        }
    }

    pub fn with_policy(mut self, policy: EvaluationPolicy) -> Self {
        self.policy = policy;
        self.bump();
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    pub fn policy(&self) -> &EvaluationPolicy {
        &self.policy
    }

    /// Replaced on every mutation; unique across record sets in the process.
    pub fn version(&self) -> u64 {
        self.version
    }

    // ── Qualifications ──

    /// Insert a qualification, replacing any existing record with the same id.
    pub fn add_qualification(&mut self, record: QualificationRecord) {
        match self.data.qualifications.iter_mut().find(|q| q.id == record.id) {
            Some(existing) => *existing = record,
            None => self.data.qualifications.push(record),
        }
        self.bump();
    }

    pub fn update_qualification(
        &mut self,
        id: &str,
        update: impl FnOnce(&mut QualificationRecord),
    ) -> Result<(), StoreError> {
        let record = self
            .data
            .qualifications
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| unknown("qualification", id))?;
        update(record);
        self.bump();
        Ok(())
    }

    pub fn delete_qualification(&mut self, id: &str) -> Result<QualificationRecord, StoreError> {
        let idx = self
            .data
            .qualifications
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| unknown("qualification", id))?;
        let removed = self.data.qualifications.remove(idx);
        self.bump();
        Ok(removed)
    }

    pub fn qualifications_for<'a>(&'a self, personnel_id: &'a str) -> Vec<&'a QualificationRecord> {
        self.data.qualifications_for(personnel_id).collect()
    }

    // ── Attestations ──

    /// Insert an attestation, replacing any existing record with the same id.
    pub fn add_attestation(&mut self, record: AttestationRecord) {
        match self.data.attestations.iter_mut().find(|a| a.id == record.id) {
            Some(existing) => *existing = record,
            None => self.data.attestations.push(record),
        }
        self.bump();
    }

    pub fn update_attestation(
        &mut self,
        id: &str,
        update: impl FnOnce(&mut AttestationRecord),
    ) -> Result<(), StoreError> {
        let record = self
            .data
            .attestations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| unknown("attestation", id))?;
        update(record);
        self.bump();
        Ok(())
    }

    pub fn delete_attestation(&mut self, id: &str) -> Result<AttestationRecord, StoreError> {
        let idx = self
            .data
            .attestations
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| unknown("attestation", id))?;
        let removed = self.data.attestations.remove(idx);
        self.bump();
        Ok(removed)
    }

    pub fn attestations_for<'a>(&'a self, personnel_id: &'a str) -> Vec<&'a AttestationRecord> {
        self.data.attestations_for(personnel_id).collect()
    }

    // ── Evaluation ──

    /// Required areas for a person; empty when no competency matrix row applies.
    pub fn required_areas_for(&self, personnel_id: &str) -> Result<Vec<RequiredArea>, StoreError> {
        let person = self
            .data
            .person(personnel_id)
            .ok_or_else(|| unknown("personnel", personnel_id))?;
        Ok(self.data.required_areas_for(person).unwrap_or_default())
    }

    /// Evaluate a person's required areas as of `today`.
    pub fn evaluate_person(
        &self,
        personnel_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<AreaStatus>, StoreError> {
        let person = self
            .data
            .person(personnel_id)
            .ok_or_else(|| unknown("personnel", personnel_id))?;
        Ok(evaluate_person(&self.data, person, &self.policy, today).unwrap_or_default())
    }

    pub fn gap_report(&self, today: NaiveDate) -> GapReport {
        analyze(&self.data, &self.policy, today)
    }

    fn bump(&mut self) {
        self.version = next_version();
        debug!(version = self.version, "record set changed");
    }
}

fn unknown(kind: &'static str, id: &str) -> StoreError {
    StoreError::UnknownRecord {
        kind,
        id: id.to_string(),
    }
}

/// Memoized person evaluations, owned by the caller.
#[derive(Debug, Default)]
pub struct EvaluationCache {
    entries: HashMap<(String, NaiveDate), CacheEntry>,
    hits: u64,
    misses: u64,
}

#[derive(Debug)]
struct CacheEntry {
    version: u64,
    policy: EvaluationPolicy,
    statuses: Arc<Vec<AreaStatus>>,
}

impl EvaluationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached evaluation for `personnel_id` at the record set's current version.
    pub fn get_or_evaluate(
        &mut self,
        records: &RecordSet,
        personnel_id: &str,
        today: NaiveDate,
    ) -> Result<Arc<Vec<AreaStatus>>, StoreError> {
        let version = records.version();
        let policy = *records.policy();
        let key = (personnel_id.to_string(), today);
        if let Some(entry) = self.entries.get(&key)
            && entry.version == version
            && entry.policy == policy
        {
            self.hits += 1;
            return Ok(Arc::clone(&entry.statuses));
        }

        self.misses += 1;
        let statuses = Arc::new(records.evaluate_person(personnel_id, today)?);
        self.entries.retain(|_, e| e.version == version);
        self.entries.insert(
            key,
            CacheEntry {
                version,
                policy,
                statuses: Arc::clone(&statuses),
            },
        );
        Ok(statuses)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
