use crate::error::Result;
use crate::extraction::{names, FieldMap};
use crate::naming::sanitize::sanitize_component;
use crate::naming::{SeriesLayout, UNKNOWN_SERIES};
use std::path::PathBuf;

/// SOP Class UID for MR Image Storage
pub const MR_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.4";

/// Leaf bucket for anything that is not an MR image
pub const RAW_DATA_LEAF: &str = "raw_data_storage";

/// MR acquisition layout
///
/// Directory component is always `{patientId}_{patientname}/{studyDate}`
/// with the patient name collapsed and lowercased. The leaf depends on
/// the SOP class: MR images get `sanitizedDescription@seriesTime`,
/// everything else lands in the fixed `raw_data_storage` bucket.
pub struct MrModalityLayout;

impl SeriesLayout for MrModalityLayout {
    fn derive(&self, fields: &FieldMap) -> Result<PathBuf> {
        let pid = fields.require(names::PATIENT_ID)?.to_string();
        let pname = fields
            .require(names::PATIENT_NAME)?
            .collapsed()
            .to_lowercase();
        let date = fields.require(names::STUDY_DATE)?.to_string();

        let patient_dir = sanitize_component(&format!("{}_{}", pid, pname));
        let study_dir = sanitize_component(&date);

        let sop_class = fields.require(names::SOP_CLASS_UID)?.to_string();
        let leaf = if sop_class == MR_IMAGE_STORAGE {
            let description = match fields.get(names::SERIES_DESCRIPTION) {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => UNKNOWN_SERIES.to_string(),
            };
            let time = fields.require(names::SERIES_TIME)?.to_string();
            format!("{}@{}", sanitize_component(&description), time)
        } else {
            RAW_DATA_LEAF.to_string()
        };

        Ok(PathBuf::from(patient_dir).join(study_dir).join(leaf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::FieldValue;

    fn mr_fields(description: &str) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert(names::PATIENT_ID, FieldValue::text("P1"));
        fields.insert(
            names::PATIENT_NAME,
            FieldValue::PersonName(vec!["Doe".to_string(), "Jane".to_string()]),
        );
        fields.insert(names::STUDY_DATE, FieldValue::text("20200202"));
        fields.insert(names::SOP_CLASS_UID, FieldValue::text(MR_IMAGE_STORAGE));
        fields.insert(names::SERIES_DESCRIPTION, FieldValue::text(description));
        fields.insert(names::SERIES_TIME, FieldValue::text("0930"));
        fields
    }

    #[test]
    fn test_mr_series_path() {
        let path = MrModalityLayout.derive(&mr_fields("T1*axial")).unwrap();
        assert_eq!(
            path,
            PathBuf::from("P1_doejane/20200202/T1 staraxial@0930")
        );
    }

    #[test]
    fn test_empty_description_becomes_unknown_series() {
        let path = MrModalityLayout.derive(&mr_fields("")).unwrap();
        assert_eq!(
            path,
            PathBuf::from("P1_doejane/20200202/Unk_Series@0930")
        );
    }

    #[test]
    fn test_sanitization_order_in_leaf() {
        let mut fields = mr_fields("A*B/C:D");
        fields.insert(names::SERIES_TIME, FieldValue::text("1200"));
        let path = MrModalityLayout.derive(&fields).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "A starB_CD@1200"
        );
    }

    #[test]
    fn test_non_mr_sop_class_goes_to_raw_bucket() {
        let mut fields = mr_fields("T1*axial");
        // CT Image Storage
        fields.insert(
            names::SOP_CLASS_UID,
            FieldValue::text("1.2.840.10008.5.1.4.1.1.2"),
        );
        let path = MrModalityLayout.derive(&fields).unwrap();
        assert_eq!(
            path,
            PathBuf::from("P1_doejane/20200202/raw_data_storage")
        );
    }

    #[test]
    fn test_default_sop_class_sentinel_goes_to_raw_bucket() {
        let mut fields = mr_fields("T1*axial");
        fields.insert(names::SOP_CLASS_UID, FieldValue::text("NoSOPClassUIDTag"));
        let path = MrModalityLayout.derive(&fields).unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), "raw_data_storage");
    }

    #[test]
    fn test_plain_text_patient_name_is_folded() {
        let mut fields = mr_fields("flair");
        fields.insert(names::PATIENT_NAME, FieldValue::text("Doe Jane"));
        let path = MrModalityLayout.derive(&fields).unwrap();
        assert!(path.starts_with("P1_doejane"));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = MrModalityLayout.derive(&mr_fields("T1*axial")).unwrap();
        let b = MrModalityLayout.derive(&mr_fields("T1*axial")).unwrap();
        assert_eq!(a, b);
    }
}
