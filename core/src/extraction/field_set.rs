use crate::error::{Result, TidyError};
use crate::extraction::tag_spec::{FieldValue, TagSpec};
use crate::extraction::tags;
use dicom_object::DefaultDicomObject;
use std::collections::HashMap;

/// Logical field names used by the built-in naming layouts
pub mod names {
    pub const SOP_CLASS_UID: &str = "SOPClassUID";
    pub const PATIENT_NAME: &str = "PatientName";
    pub const PATIENT_ID: &str = "PatientID";
    pub const STUDY_DATE: &str = "StudyDate";
    pub const SERIES_DESCRIPTION: &str = "SeriesDescription";
    pub const SERIES_TIME: &str = "SeriesTime";
    pub const SERIES_NUMBER: &str = "SeriesNumber";
}

/// Field values extracted from one file, keyed by logical name
///
/// Produced fresh per input file and consumed once by the naming layout.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    values: HashMap<String, FieldValue>,
}

impl FieldMap {
    /// Creates an empty field map
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value under a logical name
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    /// Returns the value for a logical name, if extracted
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Returns the value for a logical name, or a MissingField error
    ///
    /// Used by layouts for fields they cannot derive a path without.
    pub fn require(&self, name: &str) -> Result<&FieldValue> {
        self.values
            .get(name)
            .ok_or_else(|| TidyError::MissingField(name.to_string()))
    }

    /// Number of extracted fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the map holds no fields
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Named collection of tag specs applied to every input file
///
/// Fully configurable per deployment; each field defaults independently,
/// so a partially tagged file still yields a complete map.
#[derive(Debug, Clone)]
pub struct FieldExtractorSet {
    specs: Vec<(String, TagSpec)>,
}

impl FieldExtractorSet {
    /// Creates a set from (name, spec) pairs
    pub fn new(specs: Vec<(String, TagSpec)>) -> Self {
        Self { specs }
    }

    /// The standard field set covering both built-in layouts
    ///
    /// StudyDate, SeriesDescription and SeriesTime are addressed by
    /// explicit tag pair, the rest by standard name, exercising both
    /// addressing modes the way deployments configure them.
    pub fn standard() -> Self {
        Self::new(vec![
            (
                names::SOP_CLASS_UID.to_string(),
                TagSpec::by_name("SOPClassUID", "NoSOPClassUIDTag"),
            ),
            (
                names::PATIENT_NAME.to_string(),
                TagSpec::by_name("PatientName", "NoPatientNameTag"),
            ),
            (
                names::PATIENT_ID.to_string(),
                TagSpec::by_name("PatientID", "NoPatientIDTag"),
            ),
            (
                names::STUDY_DATE.to_string(),
                TagSpec::by_code(tags::STUDY_DATE, "NoStudyDateTag"),
            ),
            (
                names::SERIES_DESCRIPTION.to_string(),
                TagSpec::by_code(tags::SERIES_DESCRIPTION, ""),
            ),
            (
                names::SERIES_TIME.to_string(),
                TagSpec::by_code(tags::SERIES_TIME, "NoSeriesTimeTag"),
            ),
            (
                names::SERIES_NUMBER.to_string(),
                TagSpec::by_name("SeriesNumber", "0"),
            ),
        ])
    }

    /// Number of configured fields
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Applies every configured spec to a parsed DICOM object
    ///
    /// # Errors
    ///
    /// Absent attributes default per field and never error; a present but
    /// unconvertible attribute fails the whole extraction, which the
    /// driver records as a per-file failure.
    pub fn extract_all(&self, dcm: &DefaultDicomObject) -> Result<FieldMap> {
        let mut map = FieldMap::new();
        for (name, spec) in &self.specs {
            map.insert(name.clone(), spec.extract(dcm)?);
        }
        Ok(map)
    }
}
