//! Per-area compliance evaluation.
//!
//! [`evaluate`] pairs each required area with the first qualification and the
//! first attestation that refer to it and derives an [`OverallStatus`]. The
//! result is a view over the current records and date; it is never stored.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::CoreError;
use crate::dates::whole_months;
use crate::matching::find_match;
use crate::model::{AttestationRecord, QualificationRecord, RequiredArea};

/// Compliance state of one person for one required area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Compliant,
    /// Training certificate missing.
    NeedsDpo,
    /// Training held, attestation missing.
    NeedsAttestation,
    Expired,
    ExpiringSoon,
    /// Neither document held.
    MissingAll,
}

impl OverallStatus {
    pub const ALL: [OverallStatus; 6] = [
        Self::Compliant,
        Self::NeedsDpo,
        Self::NeedsAttestation,
        Self::Expired,
        Self::ExpiringSoon,
        Self::MissingAll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::NeedsDpo => "needs_dpo",
            Self::NeedsAttestation => "needs_attestation",
            Self::Expired => "expired",
            Self::ExpiringSoon => "expiring_soon",
            Self::MissingAll => "missing_all",
        }
    }

    /// Both documents held and in date, whether or not renewal is near.
    pub fn is_covered(&self) -> bool {
        matches!(self, Self::Compliant | Self::ExpiringSoon)
    }
}

impl FromStr for OverallStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| CoreError::UnknownTag {
                kind: "overall status",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables for status derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationPolicy {
    /// A document with this many whole months left or fewer is expiring soon.
    pub expiring_soon_months: i32,
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        Self {
            expiring_soon_months: 3,
        }
    }
}

/// Expiry of a matched document relative to the evaluation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryFacts {
    pub expiry_date: NaiveDate,
    pub is_expired: bool,
    /// Whole months left; negative once expired.
    pub months_until_expiry: i32,
}

impl ExpiryFacts {
    pub fn new(expiry_date: NaiveDate, today: NaiveDate) -> Self {
        Self {
            expiry_date,
            is_expired: expiry_date < today,
            months_until_expiry: whole_months(today, expiry_date),
        }
    }
}

/// A record matched to an area, with its expiry facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matched<R> {
    pub record: R,
    pub expiry: ExpiryFacts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaStatus {
    pub area: RequiredArea,
    pub qualification: Option<Matched<QualificationRecord>>,
    pub attestation: Option<Matched<AttestationRecord>>,
    pub overall_status: OverallStatus,
}

/// Evaluate every required area with the default [`EvaluationPolicy`].
///
/// Output order follows `required_areas`. Missing records are ordinary
/// states, not errors.
pub fn evaluate(
    required_areas: &[RequiredArea],
    qualifications: &[QualificationRecord],
    attestations: &[AttestationRecord],
    today: NaiveDate,
) -> Vec<AreaStatus> {
    evaluate_with(
        &EvaluationPolicy::default(),
        required_areas,
        qualifications,
        attestations,
        today,
    )
}

/// Evaluate every required area under an explicit policy.
pub fn evaluate_with(
    policy: &EvaluationPolicy,
    required_areas: &[RequiredArea],
    qualifications: &[QualificationRecord],
    attestations: &[AttestationRecord],
    today: NaiveDate,
) -> Vec<AreaStatus> {
    required_areas
        .iter()
        .map(|area| {
            let qualification = find_match(qualifications, area).map(|q| Matched {
                record: q.clone(),
                expiry: ExpiryFacts::new(q.expiry_date, today),
            });
            let attestation = find_match(attestations, area).map(|a| Matched {
                record: a.clone(),
                expiry: ExpiryFacts::new(a.expiry_date, today),
            });
            let overall_status = derive_status(
                policy,
                qualification.as_ref().map(|m| &m.expiry),
                attestation.as_ref().map(|m| &m.expiry),
            );
            AreaStatus {
                area: area.clone(),
                qualification,
                attestation,
                overall_status,
            }
        })
        .collect()
}

/// Status from the two matched documents. The first matching rule wins:
///
/// 1. neither document → `missing_all`
/// 2. no training certificate → `needs_dpo`
/// 3. training certificate expired → `expired`
/// 4. no attestation → `needs_attestation`
/// 5. attestation expired → `expired`
/// 6. either within the warning window → `expiring_soon`
/// 7. otherwise → `compliant`
pub fn derive_status(
    policy: &EvaluationPolicy,
    qualification: Option<&ExpiryFacts>,
    attestation: Option<&ExpiryFacts>,
) -> OverallStatus {
    let Some(qualification) = qualification else {
        return if attestation.is_none() {
            OverallStatus::MissingAll
        } else {
            OverallStatus::NeedsDpo
        };
    };
    if qualification.is_expired {
        return OverallStatus::Expired;
    }
    let Some(attestation) = attestation else {
        return OverallStatus::NeedsAttestation;
    };
    if attestation.is_expired {
        return OverallStatus::Expired;
    }

    let window = policy.expiring_soon_months;
    if qualification.months_until_expiry <= window || attestation.months_until_expiry <= window {
        OverallStatus::ExpiringSoon
    } else {
        OverallStatus::Compliant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AreaCategory, AttestationType};
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn plus(days: u64) -> NaiveDate {
        today().checked_add_days(Days::new(days)).unwrap()
    }

    fn minus(days: u64) -> NaiveDate {
        today().checked_sub_days(Days::new(days)).unwrap()
    }

    fn electro() -> RequiredArea {
        RequiredArea {
            code: "Б.3".into(),
            name: "Эксплуатация объектов электроэнергетики".into(),
            category: AreaCategory::EnergySafety,
            requires_dpo: true,
        }
    }

    fn basics() -> RequiredArea {
        RequiredArea {
            code: "А.1".into(),
            name: "Основы промышленной безопасности".into(),
            category: AreaCategory::IndustrialSafety,
            requires_dpo: true,
        }
    }

    fn qualification(program: &str, expiry_date: NaiveDate) -> QualificationRecord {
        QualificationRecord {
            id: "dpo-1".into(),
            personnel_id: "personnel-1".into(),
            program_name: program.into(),
            certificate_number: "ДПО-2025-0042".into(),
            issue_date: minus(30),
            expiry_date,
        }
    }

    fn attestation(area: &str, expiry_date: NaiveDate) -> AttestationRecord {
        AttestationRecord {
            id: "att-1".into(),
            personnel_id: "personnel-1".into(),
            area: area.into(),
            protocol_number: "ПР-117".into(),
            expiry_date,
            attestation_type: AttestationType::Rostechnadzor,
        }
    }

    fn status_of(
        quals: &[QualificationRecord],
        atts: &[AttestationRecord],
    ) -> OverallStatus {
        let result = evaluate(&[electro()], quals, atts, today());
        assert_eq!(result.len(), 1);
        result[0].overall_status
    }

    #[test]
    fn nothing_held_is_missing_all() {
        assert_eq!(status_of(&[], &[]), OverallStatus::MissingAll);
    }

    #[test]
    fn unrelated_records_are_missing_all() {
        let quals = [qualification("Охрана труда", plus(400))];
        let atts = [attestation("А.1 Основы", plus(400))];
        assert_eq!(status_of(&quals, &atts), OverallStatus::MissingAll);
    }

    #[test]
    fn attestation_without_training_needs_dpo() {
        let atts = [attestation("Область Б.3", plus(400))];
        assert_eq!(status_of(&[], &atts), OverallStatus::NeedsDpo);
    }

    #[test]
    fn valid_training_without_attestation_needs_attestation() {
        let quals = [qualification(
            "Эксплуатация объектов электроэнергетики",
            plus(400),
        )];
        assert_eq!(status_of(&quals, &[]), OverallStatus::NeedsAttestation);
    }

    #[test]
    fn training_expired_yesterday_is_expired() {
        let quals = [qualification(
            "Эксплуатация объектов электроэнергетики",
            minus(1),
        )];
        assert_eq!(status_of(&quals, &[]), OverallStatus::Expired);
    }

    #[test]
    fn expired_training_outranks_missing_attestation() {
        let quals = [qualification("Б.3", minus(10))];
        assert_eq!(status_of(&quals, &[]), OverallStatus::Expired);
    }

    #[test]
    fn expired_attestation_is_expired() {
        let quals = [qualification("Б.3", plus(400))];
        let atts = [attestation("Б.3", minus(3))];
        assert_eq!(status_of(&quals, &atts), OverallStatus::Expired);
    }

    #[test]
    fn expiry_day_itself_is_still_valid() {
        let quals = [qualification("Б.3", today())];
        assert_eq!(status_of(&quals, &[]), OverallStatus::NeedsAttestation);
    }

    #[test]
    fn attestation_expiring_in_two_months_is_expiring_soon() {
        let quals = [qualification("Б.3", plus(400))];
        let atts = [attestation("Б.3", plus(61))];
        assert_eq!(status_of(&quals, &atts), OverallStatus::ExpiringSoon);
    }

    #[test]
    fn training_expiring_soon_is_expiring_soon() {
        let quals = [qualification("Б.3", plus(20))];
        let atts = [attestation("Б.3", plus(700))];
        assert_eq!(status_of(&quals, &atts), OverallStatus::ExpiringSoon);
    }

    #[test]
    fn both_far_from_expiry_is_compliant() {
        let quals = [qualification("Б.3", plus(400))];
        let atts = [attestation("б.3 электроэнергетика", plus(800))];
        assert_eq!(status_of(&quals, &atts), OverallStatus::Compliant);
    }

    #[test]
    fn three_whole_months_left_is_still_expiring_soon() {
        // 2026-03-10 → 2026-07-09 is three whole months.
        let quals = [qualification("Б.3", NaiveDate::from_ymd_opt(2026, 7, 9).unwrap())];
        let atts = [attestation("Б.3", plus(800))];
        assert_eq!(status_of(&quals, &atts), OverallStatus::ExpiringSoon);

        let quals = [qualification("Б.3", NaiveDate::from_ymd_opt(2026, 7, 10).unwrap())];
        assert_eq!(status_of(&quals, &atts), OverallStatus::Compliant);
    }

    #[test]
    fn custom_policy_widens_window() {
        let policy = EvaluationPolicy {
            expiring_soon_months: 12,
        };
        let quals = [qualification("Б.3", plus(200))];
        let atts = [attestation("Б.3", plus(800))];
        let result = evaluate_with(&policy, &[electro()], &quals, &atts, today());
        assert_eq!(result[0].overall_status, OverallStatus::ExpiringSoon);
    }

    #[test]
    fn facts_are_populated_for_matches() {
        let quals = [qualification("Б.3", plus(400))];
        let atts = [attestation("Б.3", minus(40))];
        let result = evaluate(&[electro()], &quals, &atts, today());
        let status = &result[0];

        let q = status.qualification.as_ref().unwrap();
        assert_eq!(q.record.certificate_number, "ДПО-2025-0042");
        assert!(!q.expiry.is_expired);
        assert_eq!(q.expiry.months_until_expiry, 13);

        let a = status.attestation.as_ref().unwrap();
        assert_eq!(a.record.protocol_number, "ПР-117");
        assert!(a.expiry.is_expired);
        assert_eq!(a.expiry.months_until_expiry, -1);
    }

    #[test]
    fn output_follows_required_area_order() {
        let quals = [
            qualification("Основы промышленной безопасности", plus(400)),
            qualification("Б.3", plus(400)),
        ];
        let result = evaluate(&[electro(), basics()], &quals, &[], today());
        let codes: Vec<&str> = result.iter().map(|s| s.area.code.as_str()).collect();
        assert_eq!(codes, vec!["Б.3", "А.1"]);
        assert!(
            result
                .iter()
                .all(|s| s.overall_status == OverallStatus::NeedsAttestation)
        );
    }

    #[test]
    fn empty_required_areas_yield_empty_result() {
        let quals = [qualification("Б.3", plus(400))];
        assert!(evaluate(&[], &quals, &[], today()).is_empty());
    }

    #[test]
    fn status_tags_roundtrip() {
        for st in OverallStatus::ALL {
            assert_eq!(st.as_str().parse::<OverallStatus>().unwrap(), st);
        }
        assert!(OverallStatus::ExpiringSoon.is_covered());
        assert!(!OverallStatus::NeedsAttestation.is_covered());
    }
}
