//! Linking documents to certification areas.
//!
//! Records carry no area identifier, only free text. A record belongs to an
//! area when its text contains the area's code or name, compared
//! case-insensitively. All matching goes through [`matches_area`] so the
//! strategy can be replaced without touching status derivation.

use crate::model::{AttestationRecord, QualificationRecord, RequiredArea};

/// A record whose free-text field identifies the area it covers.
pub trait RecordText {
    fn match_text(&self) -> &str;
}

impl RecordText for QualificationRecord {
    fn match_text(&self) -> &str {
        &self.program_name
    }
}

impl RecordText for AttestationRecord {
    fn match_text(&self) -> &str {
        &self.area
    }
}

/// Whether `text` refers to `area` by code or by name.
///
/// Empty codes or names are ignored: they would otherwise match every record.
pub fn matches_area(text: &str, area: &RequiredArea) -> bool {
    let haystack = text.to_lowercase();
    [area.code.as_str(), area.name.as_str()]
        .into_iter()
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
        .any(|needle| haystack.contains(&needle.to_lowercase()))
}

/// First record in `records` that refers to `area`.
pub fn find_match<'a, R, I>(records: I, area: &RequiredArea) -> Option<&'a R>
where
    R: RecordText + 'a,
    I: IntoIterator<Item = &'a R>,
{
    records
        .into_iter()
        .find(|r| matches_area(r.match_text(), area))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AreaCategory;
    use chrono::NaiveDate;

    fn electro() -> RequiredArea {
        RequiredArea {
            code: "Б.3".into(),
            name: "Эксплуатация объектов электроэнергетики".into(),
            category: AreaCategory::EnergySafety,
            requires_dpo: true,
        }
    }

    fn qualification(id: &str, program: &str) -> QualificationRecord {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        QualificationRecord {
            id: id.into(),
            personnel_id: "p1".into(),
            program_name: program.into(),
            certificate_number: format!("ДПО-{id}"),
            issue_date: day,
            expiry_date: day,
        }
    }

    #[test]
    fn matches_by_code_anywhere_in_text() {
        assert!(matches_area("Промышленная безопасность. Область Б.3", &electro()));
        assert!(matches_area("Б.3", &electro()));
    }

    #[test]
    fn matches_by_name_case_insensitive() {
        assert!(matches_area(
            "ЭКСПЛУАТАЦИЯ ОБЪЕКТОВ ЭЛЕКТРОЭНЕРГЕТИКИ (повышение квалификации)",
            &electro()
        ));
        assert!(matches_area(
            "курс: эксплуатация объектов электроэнергетики",
            &electro()
        ));
    }

    #[test]
    fn code_case_folds_cyrillic() {
        assert!(matches_area("область б.3", &electro()));
    }

    #[test]
    fn unrelated_text_does_not_match() {
        assert!(!matches_area("Охрана труда для руководителей", &electro()));
        assert!(!matches_area("Б.1 Химически опасные объекты", &electro()));
    }

    #[test]
    fn blank_needles_never_match() {
        let area = RequiredArea {
            code: "".into(),
            name: "  ".into(),
            category: AreaCategory::Ecology,
            requires_dpo: false,
        };
        assert!(!matches_area("anything at all", &area));
    }

    #[test]
    fn find_match_returns_first_in_order() {
        let records = vec![
            qualification("1", "Охрана труда"),
            qualification("2", "Область Б.3, первичная"),
            qualification("3", "Область Б.3, повторная"),
        ];
        let found = find_match(&records, &electro()).unwrap();
        assert_eq!(found.id, "2");
        assert!(find_match(&records[..1], &electro()).is_none());
    }
}
