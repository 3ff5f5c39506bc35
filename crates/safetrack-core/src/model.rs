//! Record types for certification areas, personnel, and the documents they hold.
//!
//! Records link to [`RequiredArea`]s only through free text (a qualification's
//! program name, an attestation's area); see [`crate::matching`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Safety domain a certification area belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaCategory {
    IndustrialSafety,
    EnergySafety,
    LaborSafety,
    Ecology,
}

impl AreaCategory {
    pub const ALL: [AreaCategory; 4] = [
        Self::IndustrialSafety,
        Self::EnergySafety,
        Self::LaborSafety,
        Self::Ecology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IndustrialSafety => "industrial_safety",
            Self::EnergySafety => "energy_safety",
            Self::LaborSafety => "labor_safety",
            Self::Ecology => "ecology",
        }
    }
}

impl FromStr for AreaCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::UnknownTag {
                kind: "area category",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for AreaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body that issued an attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttestationType {
    /// Federal regulator commission.
    Rostechnadzor,
    /// The employer's own attestation commission.
    CompanyCommission,
}

impl AttestationType {
    pub const ALL: [AttestationType; 2] = [Self::Rostechnadzor, Self::CompanyCommission];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rostechnadzor => "rostechnadzor",
            Self::CompanyCommission => "company_commission",
        }
    }
}

impl FromStr for AttestationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownTag {
                kind: "attestation type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for AttestationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonnelStatus {
    #[default]
    Active,
    Dismissed,
}

impl PersonnelStatus {
    pub const ALL: [PersonnelStatus; 2] = [Self::Active, Self::Dismissed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Dismissed => "dismissed",
        }
    }
}

impl FromStr for PersonnelStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| CoreError::UnknownTag {
                kind: "personnel status",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for PersonnelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A certification area a position must hold, e.g. `Б.3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredArea {
    pub code: String,
    pub name: String,
    pub category: AreaCategory,
    /// Whether a training (DPO) certificate is a prerequisite for attestation.
    #[serde(default)]
    pub requires_dpo: bool,
}

/// Training (DPO) certificate held by a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationRecord {
    pub id: String,
    pub personnel_id: String,
    pub program_name: String,
    pub certificate_number: String,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Formal attestation held by a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    pub id: String,
    pub personnel_id: String,
    /// Free text; matched against [`RequiredArea`] code or name.
    pub area: String,
    pub protocol_number: String,
    pub expiry_date: NaiveDate,
    pub attestation_type: AttestationType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personnel {
    pub id: String,
    pub full_name: String,
    pub position: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub status: PersonnelStatus,
}

/// Competency matrix row: the area codes a position in an organisation must hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRequirement {
    pub organization_id: String,
    pub position: String,
    pub area_codes: Vec<String>,
}

/// The full record set an evaluation runs over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub areas: Vec<RequiredArea>,
    #[serde(default)]
    pub personnel: Vec<Personnel>,
    #[serde(default)]
    pub requirements: Vec<PositionRequirement>,
    #[serde(default)]
    pub qualifications: Vec<QualificationRecord>,
    #[serde(default)]
    pub attestations: Vec<AttestationRecord>,
}

impl Dataset {
    pub fn person(&self, id: &str) -> Option<&Personnel> {
        self.personnel.iter().find(|p| p.id == id)
    }

    pub fn area(&self, code: &str) -> Option<&RequiredArea> {
        self.areas.iter().find(|a| a.code == code)
    }

    /// The competency matrix row for a person's organisation and position.
    pub fn requirement_for(&self, person: &Personnel) -> Option<&PositionRequirement> {
        let org = person.organization_id.as_deref()?;
        self.requirements
            .iter()
            .find(|r| r.organization_id == org && r.position == person.position)
    }

    /// Resolve a person's required areas from the area catalog.
    ///
    /// Returns `None` when no competency matrix row applies. Codes missing
    /// from the catalog are skipped.
    pub fn required_areas_for(&self, person: &Personnel) -> Option<Vec<RequiredArea>> {
        let requirement = self.requirement_for(person)?;
        let areas = requirement
            .area_codes
            .iter()
            .filter_map(|code| {
                let area = self.area(code);
                if area.is_none() {
                    tracing::warn!(
                        code = %code,
                        position = %requirement.position,
                        "required area code not in catalog"
                    );
                }
                area.cloned()
            })
            .collect();
        Some(areas)
    }

    pub fn qualifications_for<'a>(
        &'a self,
        personnel_id: &'a str,
    ) -> impl Iterator<Item = &'a QualificationRecord> + 'a {
        self.qualifications
            .iter()
            .filter(move |q| q.personnel_id == personnel_id)
    }

    pub fn attestations_for<'a>(
        &'a self,
        personnel_id: &'a str,
    ) -> impl Iterator<Item = &'a AttestationRecord> + 'a {
        self.attestations
            .iter()
            .filter(move |a| a.personnel_id == personnel_id)
    }
}
