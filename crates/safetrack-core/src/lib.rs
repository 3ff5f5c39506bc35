pub mod dates;
mod error;
pub mod evaluate;
pub mod gap;
pub mod matching;
pub mod model;
pub mod schema;
pub mod summary;
pub mod validity;

pub use error::CoreError;
pub use evaluate::{
    AreaStatus, EvaluationPolicy, ExpiryFacts, Matched, OverallStatus, derive_status, evaluate,
    evaluate_with,
};
pub use gap::{GapAnalysis, GapReport, RiskLevel, analyze, evaluate_person};
pub use matching::{RecordText, matches_area};
pub use model::{
    AreaCategory, AttestationRecord, AttestationType, Dataset, Personnel, PersonnelStatus,
    PositionRequirement, QualificationRecord, RequiredArea,
};
pub use schema::tables;
pub use summary::ComplianceSummary;
pub use validity::CertificateStatus;
