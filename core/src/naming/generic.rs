use crate::error::Result;
use crate::extraction::{names, FieldMap};
use crate::naming::sanitize::sanitize_component;
use crate::naming::{SeriesLayout, UNKNOWN_SERIES};
use std::path::PathBuf;

/// General-purpose storage layout
///
/// `{patientId}_{PATIENTNAME}/{studyDate}/{seriesNumber}_{seriesName}`,
/// with the patient name collapsed and uppercased. A missing or empty
/// series description falls back to the `Unk_Series` placeholder.
pub struct GenericLayout;

impl SeriesLayout for GenericLayout {
    fn derive(&self, fields: &FieldMap) -> Result<PathBuf> {
        let pid = fields.require(names::PATIENT_ID)?.to_string();
        let pname = fields
            .require(names::PATIENT_NAME)?
            .collapsed()
            .to_uppercase();
        let date = fields.require(names::STUDY_DATE)?.to_string();
        let number = fields.require(names::SERIES_NUMBER)?.to_string();

        let series_name = match fields.get(names::SERIES_DESCRIPTION) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => UNKNOWN_SERIES.to_string(),
        };

        let patient_dir = sanitize_component(&format!("{}_{}", pid, pname));
        let study_dir = sanitize_component(&date);
        let leaf = sanitize_component(&format!("{}_{}", number, series_name));

        Ok(PathBuf::from(patient_dir).join(study_dir).join(leaf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::FieldValue;

    fn base_fields() -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert(names::PATIENT_ID, FieldValue::text("P1"));
        fields.insert(
            names::PATIENT_NAME,
            FieldValue::PersonName(vec!["Doe".to_string(), "Jane".to_string()]),
        );
        fields.insert(names::STUDY_DATE, FieldValue::text("20200202"));
        fields.insert(names::SERIES_NUMBER, FieldValue::Int(3));
        fields.insert(names::SERIES_DESCRIPTION, FieldValue::text("arterial"));
        fields
    }

    #[test]
    fn test_derive_layout() {
        let path = GenericLayout.derive(&base_fields()).unwrap();
        assert_eq!(path, PathBuf::from("P1_DOEJANE/20200202/3_arterial"));
    }

    #[test]
    fn test_empty_description_uses_placeholder() {
        let mut fields = base_fields();
        fields.insert(names::SERIES_DESCRIPTION, FieldValue::text(""));
        let path = GenericLayout.derive(&fields).unwrap();
        assert_eq!(path, PathBuf::from("P1_DOEJANE/20200202/3_Unk_Series"));
    }

    #[test]
    fn test_absent_description_uses_placeholder() {
        let mut fields = base_fields();
        fields.insert(names::SERIES_DESCRIPTION, FieldValue::text(""));
        let with_empty = GenericLayout.derive(&fields).unwrap();

        let mut fields = FieldMap::new();
        fields.insert(names::PATIENT_ID, FieldValue::text("P1"));
        fields.insert(
            names::PATIENT_NAME,
            FieldValue::PersonName(vec!["Doe".to_string(), "Jane".to_string()]),
        );
        fields.insert(names::STUDY_DATE, FieldValue::text("20200202"));
        fields.insert(names::SERIES_NUMBER, FieldValue::Int(3));
        let with_absent = GenericLayout.derive(&fields).unwrap();

        assert_eq!(with_empty, with_absent);
    }

    #[test]
    fn test_description_is_sanitized() {
        let mut fields = base_fields();
        fields.insert(names::SERIES_DESCRIPTION, FieldValue::text("ax/t1:post"));
        let path = GenericLayout.derive(&fields).unwrap();
        assert_eq!(path, PathBuf::from("P1_DOEJANE/20200202/3_ax_t1post"));
    }

    #[test]
    fn test_missing_patient_id_is_an_error() {
        let mut fields = FieldMap::new();
        fields.insert(names::PATIENT_NAME, FieldValue::text("Doe"));
        fields.insert(names::STUDY_DATE, FieldValue::text("20200202"));
        fields.insert(names::SERIES_NUMBER, FieldValue::Int(3));
        assert!(GenericLayout.derive(&fields).is_err());
    }
}
