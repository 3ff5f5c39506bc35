//! Person- or dashboard-level roll-up of area statuses.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::evaluate::{AreaStatus, OverallStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceSummary {
    pub compliant: usize,
    pub total: usize,
    /// Area count per status tag.
    pub by_status: BTreeMap<&'static str, usize>,
}

impl ComplianceSummary {
    pub fn from_statuses(statuses: &[AreaStatus]) -> Self {
        let mut by_status = BTreeMap::new();
        for status in statuses {
            *by_status.entry(status.overall_status.as_str()).or_insert(0) += 1;
        }
        Self {
            compliant: by_status
                .get(OverallStatus::Compliant.as_str())
                .copied()
                .unwrap_or(0),
            total: statuses.len(),
            by_status,
        }
    }

    pub fn count(&self, status: OverallStatus) -> usize {
        self.by_status.get(status.as_str()).copied().unwrap_or(0)
    }

    /// Compliant share rounded to a whole percent; 0 when nothing is required.
    pub fn percent(&self) -> u32 {
        percent_of(self.compliant, self.total)
    }
}

/// `part / whole` as a rounded percentage, 0 for an empty whole.
pub fn percent_of(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AreaCategory, RequiredArea};

    fn status(code: &str, overall_status: OverallStatus) -> AreaStatus {
        AreaStatus {
            area: RequiredArea {
                code: code.into(),
                name: code.into(),
                category: AreaCategory::LaborSafety,
                requires_dpo: false,
            },
            qualification: None,
            attestation: None,
            overall_status,
        }
    }

    #[test]
    fn empty_is_zero_not_nan() {
        let summary = ComplianceSummary::from_statuses(&[]);
        assert_eq!(summary.compliant, 0);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.percent(), 0);
    }

    #[test]
    fn counts_only_compliant() {
        let statuses = [
            status("А.1", OverallStatus::Compliant),
            status("Б.3", OverallStatus::ExpiringSoon),
            status("Г.1", OverallStatus::Compliant),
        ];
        let summary = ComplianceSummary::from_statuses(&statuses);
        assert_eq!(summary.compliant, 2);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.percent(), 67);
        assert_eq!(summary.count(OverallStatus::ExpiringSoon), 1);
        assert_eq!(summary.count(OverallStatus::Expired), 0);
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent_of(1, 8), 13);
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(5, 5), 100);
    }
}
