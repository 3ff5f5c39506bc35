//! Organisation-wide competency gap analysis.
//!
//! Each active person's required areas come from the competency matrix
//! (organisation + position). An area counts as missing when the person does
//! not hold in-date training and attestation for it.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::evaluate::{AreaStatus, EvaluationPolicy, OverallStatus, evaluate_with};
use crate::model::{
    AreaCategory, AttestationRecord, Dataset, Personnel, PersonnelStatus, QualificationRecord,
};
use crate::summary::percent_of;

/// Number of most-missing area codes listed per category.
const TOP_MISSING: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Risk from the exact share of held areas; `low` whenever nothing is
    /// missing. Thresholds compare before rounding, so 74.5% is `high`.
    pub fn assess(required: usize, missing: usize) -> Self {
        let held = required.saturating_sub(missing);
        if missing == 0 {
            Self::Low
        } else if held * 100 < required * 50 {
            Self::Critical
        } else if held * 100 < required * 75 {
            Self::High
        } else {
            Self::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingArea {
    pub code: String,
    pub category: AreaCategory,
    pub status: OverallStatus,
}

/// Gap analysis for one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapAnalysis {
    pub personnel_id: String,
    pub full_name: String,
    pub position: String,
    pub organization_id: String,
    pub organization_name: String,
    /// Required area codes; empty when no competency matrix row applies.
    pub required_areas: Vec<String>,
    pub missing_areas: Vec<MissingArea>,
    pub has_all_required: bool,
    pub completion_rate: u32,
    pub risk_level: RiskLevel,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationStats {
    pub organization_id: String,
    pub organization_name: String,
    pub total_personnel: usize,
    pub compliant: usize,
    pub compliance_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaCount {
    pub code: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub category: AreaCategory,
    pub total_required: usize,
    pub total_missing: usize,
    pub most_missing_areas: Vec<AreaCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapReport {
    pub as_of: NaiveDate,
    pub total_personnel: usize,
    pub compliant_personnel: usize,
    pub non_compliant_personnel: usize,
    pub critical_gaps: usize,
    pub high_risk_gaps: usize,
    pub compliance_rate: u32,
    pub gaps: Vec<GapAnalysis>,
    pub by_organization: Vec<OrganizationStats>,
    pub by_category: Vec<CategoryStats>,
}

/// Evaluate one person's required areas against their own records.
///
/// Returns `None` when no competency matrix row applies to the person.
pub fn evaluate_person(
    data: &Dataset,
    person: &Personnel,
    policy: &EvaluationPolicy,
    today: NaiveDate,
) -> Option<Vec<AreaStatus>> {
    let areas = data.required_areas_for(person)?;
    let qualifications: Vec<QualificationRecord> =
        data.qualifications_for(&person.id).cloned().collect();
    let attestations: Vec<AttestationRecord> =
        data.attestations_for(&person.id).cloned().collect();
    Some(evaluate_with(
        policy,
        &areas,
        &qualifications,
        &attestations,
        today,
    ))
}

/// Analyse every active person attached to an organisation.
pub fn analyze(data: &Dataset, policy: &EvaluationPolicy, today: NaiveDate) -> GapReport {
    let gaps: Vec<GapAnalysis> = data
        .personnel
        .iter()
        .filter(|p| p.status == PersonnelStatus::Active)
        .filter_map(|person| {
            let organization_id = person.organization_id.clone()?;
            Some(analyze_person(data, person, organization_id, policy, today))
        })
        .collect();

    let total_personnel = gaps.len();
    let compliant_personnel = gaps.iter().filter(|g| g.has_all_required).count();
    let critical_gaps = gaps
        .iter()
        .filter(|g| g.risk_level == RiskLevel::Critical)
        .count();
    let high_risk_gaps = gaps
        .iter()
        .filter(|g| g.risk_level == RiskLevel::High)
        .count();

    let report = GapReport {
        as_of: today,
        total_personnel,
        compliant_personnel,
        non_compliant_personnel: total_personnel - compliant_personnel,
        critical_gaps,
        high_risk_gaps,
        compliance_rate: percent_of(compliant_personnel, total_personnel),
        by_organization: organization_stats(&gaps),
        by_category: category_stats(data, &gaps),
        gaps,
    };

    info!(
        personnel = report.total_personnel,
        compliant = report.compliant_personnel,
        critical = report.critical_gaps,
        high = report.high_risk_gaps,
        "competency gap analysis complete"
    );
    report
}

fn analyze_person(
    data: &Dataset,
    person: &Personnel,
    organization_id: String,
    policy: &EvaluationPolicy,
    today: NaiveDate,
) -> GapAnalysis {
    let organization_name = person
        .organization_name
        .clone()
        .unwrap_or_else(|| organization_id.clone());

    let Some(statuses) = evaluate_person(data, person, policy, today) else {
        debug!(personnel_id = %person.id, position = %person.position, "no competency matrix row");
        return GapAnalysis {
            personnel_id: person.id.clone(),
            full_name: person.full_name.clone(),
            position: person.position.clone(),
            organization_id,
            organization_name,
            required_areas: Vec::new(),
            missing_areas: Vec::new(),
            has_all_required: false,
            completion_rate: 0,
            risk_level: RiskLevel::Low,
            as_of: today,
        };
    };

    let missing_areas: Vec<MissingArea> = statuses
        .iter()
        .filter(|s| !s.overall_status.is_covered())
        .map(|s| MissingArea {
            code: s.area.code.clone(),
            category: s.area.category,
            status: s.overall_status,
        })
        .collect();

    let required = statuses.len();
    let missing = missing_areas.len();
    let completion_rate = percent_of(required - missing, required);
    let risk_level = RiskLevel::assess(required, missing);
    debug!(
        personnel_id = %person.id,
        required,
        missing,
        risk = risk_level.as_str(),
        "evaluated person"
    );

    GapAnalysis {
        personnel_id: person.id.clone(),
        full_name: person.full_name.clone(),
        position: person.position.clone(),
        organization_id,
        organization_name,
        required_areas: statuses.into_iter().map(|s| s.area.code).collect(),
        missing_areas,
        has_all_required: missing == 0,
        completion_rate,
        risk_level,
        as_of: today,
    }
}

fn organization_stats(gaps: &[GapAnalysis]) -> Vec<OrganizationStats> {
    let mut by_org: BTreeMap<&str, OrganizationStats> = BTreeMap::new();
    for gap in gaps {
        let stats = by_org
            .entry(gap.organization_id.as_str())
            .or_insert_with(|| OrganizationStats {
                organization_id: gap.organization_id.clone(),
                organization_name: gap.organization_name.clone(),
                total_personnel: 0,
                compliant: 0,
                compliance_rate: 0,
            });
        stats.total_personnel += 1;
        if gap.has_all_required {
            stats.compliant += 1;
        }
    }
    by_org
        .into_values()
        .map(|mut stats| {
            stats.compliance_rate = percent_of(stats.compliant, stats.total_personnel);
            stats
        })
        .collect()
}

fn category_stats(data: &Dataset, gaps: &[GapAnalysis]) -> Vec<CategoryStats> {
    let mut required: BTreeMap<AreaCategory, usize> = BTreeMap::new();
    let mut missing: BTreeMap<AreaCategory, HashMap<&str, usize>> = BTreeMap::new();

    for gap in gaps {
        for code in &gap.required_areas {
            if let Some(area) = data.area(code) {
                *required.entry(area.category).or_insert(0) += 1;
            }
        }
        for area in &gap.missing_areas {
            *missing
                .entry(area.category)
                .or_default()
                .entry(area.code.as_str())
                .or_insert(0) += 1;
        }
    }

    required
        .into_iter()
        .map(|(category, total_required)| {
            let counts = missing.remove(&category).unwrap_or_default();
            let total_missing = counts.values().sum();
            let mut most_missing_areas: Vec<AreaCount> = counts
                .into_iter()
                .map(|(code, count)| AreaCount {
                    code: code.to_string(),
                    count,
                })
                .collect();
            most_missing_areas.sort_by(|a, b| b.count.cmp(&a.count).then(a.code.cmp(&b.code)));
            most_missing_areas.truncate(TOP_MISSING);
            CategoryStats {
                category,
                total_required,
                total_missing,
                most_missing_areas,
            }
        })
        .collect()
}
