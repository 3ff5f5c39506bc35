/// Arrow schema definitions for the compliance record tables.
///
/// Dates are `Date32`. Decoders in `safetrack-store` also accept ISO strings
/// in date columns and `LargeUtf8` in place of `Utf8`.
pub mod tables {
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    pub const AREAS: &str = "areas";
    pub const PERSONNEL: &str = "personnel";
    pub const REQUIREMENTS: &str = "requirements";
    pub const QUALIFICATIONS: &str = "qualifications";
    pub const ATTESTATIONS: &str = "attestations";

    /// Every table, in load order.
    pub const ALL: [&str; 5] = [AREAS, PERSONNEL, REQUIREMENTS, QUALIFICATIONS, ATTESTATIONS];

    /// Schema for the certification area catalog.
    pub fn areas_schema() -> Schema {
        Schema::new(vec![
            Field::new("code", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("category", DataType::Utf8, false),
            Field::new("requires_dpo", DataType::Boolean, true),
        ])
    }

    pub fn personnel_schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("full_name", DataType::Utf8, false),
            Field::new("position", DataType::Utf8, false),
            Field::new("organization_id", DataType::Utf8, true),
            Field::new("organization_name", DataType::Utf8, true),
            Field::new("status", DataType::Utf8, true),
        ])
    }

    /// Schema for competency matrix rows.
    pub fn requirements_schema() -> Schema {
        Schema::new(vec![
            Field::new("organization_id", DataType::Utf8, false),
            Field::new("position", DataType::Utf8, false),
            Field::new(
                "area_codes",
                DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
                false,
            ),
        ])
    }

    /// Schema for training (DPO) certificates.
    pub fn qualifications_schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("personnel_id", DataType::Utf8, false),
            Field::new("program_name", DataType::Utf8, false),
            Field::new("certificate_number", DataType::Utf8, false),
            Field::new("issue_date", DataType::Date32, false),
            Field::new("expiry_date", DataType::Date32, false),
        ])
    }

    pub fn attestations_schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("personnel_id", DataType::Utf8, false),
            Field::new("area", DataType::Utf8, false),
            Field::new("protocol_number", DataType::Utf8, false),
            Field::new("expiry_date", DataType::Date32, false),
            Field::new("attestation_type", DataType::Utf8, false),
        ])
    }
}
