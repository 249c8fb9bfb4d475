use crate::error::{Result, TidyError};
use crate::extraction::tags;
use dicom_core::header::Header;
use dicom_core::{Tag, VR};
use dicom_object::mem::InMemElement;
use dicom_object::DefaultDicomObject;
use std::fmt;

/// A value extracted for one logical field
///
/// DICOM attributes carry more structure than plain strings; the naming
/// layouts need to distinguish person names (multi-component values that
/// are joined and case-folded) and integers (series numbers) from free
/// text.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Free-text value, trimmed
    Text(String),
    /// Integer value (IS/US/UL/SS/SL value representations)
    Int(i64),
    /// Person name split into its `^`-separated components
    PersonName(Vec<String>),
}

impl FieldValue {
    /// Creates a text value
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// Converts a dataset element into a field value based on its VR
    ///
    /// # Errors
    ///
    /// Returns an error if the element is present but cannot be converted
    /// (e.g. a sequence), which is a per-file failure rather than an
    /// expected absence.
    pub fn from_element(elem: &InMemElement) -> Result<Self> {
        match elem.vr() {
            VR::PN => {
                let raw = elem.to_str()?;
                let components = raw
                    .split('^')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect();
                Ok(FieldValue::PersonName(components))
            }
            VR::IS | VR::US | VR::UL | VR::SS | VR::SL => {
                Ok(FieldValue::Int(elem.to_int::<i64>()?))
            }
            // UID values are NUL-padded to even length on disk
            _ => Ok(FieldValue::Text(
                elem.to_str()?.trim_end_matches('\0').trim().to_string(),
            )),
        }
    }

    /// Returns whether the value is textually empty
    ///
    /// An empty string or a person name with no components counts as
    /// empty; integers never do.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Int(_) => false,
            FieldValue::PersonName(components) => components.is_empty(),
        }
    }

    /// Collapses the value into a single path-component token
    ///
    /// Person-name components are joined without a separator and interior
    /// spaces are stripped, so `Doe^Jane` becomes `DoeJane`. Case is left
    /// to the naming layout.
    pub fn collapsed(&self) -> String {
        let joined = match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Int(n) => n.to_string(),
            FieldValue::PersonName(components) => components.concat(),
        };
        joined.replace(' ', "")
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::PersonName(components) => write!(f, "{}", components.join("^")),
        }
    }
}

/// Addressing mode for one metadata field
///
/// Exactly one mode, by construction: either the standard attribute
/// mnemonic or an explicit (group, element) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAddress {
    /// Standard attribute name, e.g. `PatientName`
    ByName(String),
    /// Explicit binary tag
    ByCode(Tag),
}

impl fmt::Display for TagAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagAddress::ByName(name) => write!(f, "{}", name),
            TagAddress::ByCode(tag) => write!(f, "{}", tag),
        }
    }
}

/// Specification of one logical metadata field
///
/// Immutable once constructed. Lookup absence resolves to the configured
/// default rather than an error; an absent optional tag is expected data,
/// not a failure.
#[derive(Debug, Clone)]
pub struct TagSpec {
    address: TagAddress,
    file_meta: bool,
    default: FieldValue,
}

impl TagSpec {
    /// Creates a spec addressed by standard attribute name
    pub fn by_name(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            address: TagAddress::ByName(name.into()),
            file_meta: false,
            default: FieldValue::Text(default.into()),
        }
    }

    /// Creates a spec addressed by explicit (group, element) tag
    pub fn by_code(tag: Tag, default: impl Into<String>) -> Self {
        Self {
            address: TagAddress::ByCode(tag),
            file_meta: false,
            default: FieldValue::Text(default.into()),
        }
    }

    /// Scopes the lookup to the file-meta segment
    pub fn in_file_meta(mut self) -> Self {
        self.file_meta = true;
        self
    }

    /// Builds a spec from configuration parts, validating the addressing
    ///
    /// # Errors
    ///
    /// Fails when neither or both addressing modes are given, or when the
    /// (group, element) pair is only half specified. These indicate a
    /// deployment misconfiguration and abort the run.
    pub fn from_parts(
        field: &str,
        standard_name: Option<String>,
        group: Option<u16>,
        element: Option<u16>,
        file_meta: bool,
        default_value: Option<String>,
    ) -> Result<Self> {
        let code = match (group, element) {
            (Some(g), Some(e)) => Some(Tag(g, e)),
            (None, None) => None,
            _ => {
                return Err(TidyError::FieldSpec(
                    field.to_string(),
                    "group_id and element_id must be given together".to_string(),
                ))
            }
        };

        let address = match (standard_name, code) {
            (Some(name), None) => TagAddress::ByName(name),
            (None, Some(tag)) => TagAddress::ByCode(tag),
            (Some(_), Some(_)) => {
                return Err(TidyError::FieldSpec(
                    field.to_string(),
                    "standard_name and group_id/element_id are mutually exclusive".to_string(),
                ))
            }
            (None, None) => {
                return Err(TidyError::FieldSpec(
                    field.to_string(),
                    "either standard_name or group_id/element_id is required".to_string(),
                ))
            }
        };

        Ok(Self {
            address,
            file_meta,
            default: FieldValue::Text(default_value.unwrap_or_default()),
        })
    }

    /// Returns the addressing mode
    pub fn address(&self) -> &TagAddress {
        &self.address
    }

    /// Returns the default substituted on lookup absence
    pub fn default_value(&self) -> &FieldValue {
        &self.default
    }

    /// Extracts this field's value from a parsed DICOM object
    ///
    /// # Errors
    ///
    /// Returns an error only when the attribute is present but cannot be
    /// converted; absence yields the default.
    pub fn extract(&self, dcm: &DefaultDicomObject) -> Result<FieldValue> {
        if self.file_meta {
            let tag = match &self.address {
                TagAddress::ByCode(tag) => Some(*tag),
                TagAddress::ByName(name) => tags::meta_tag_by_name(name),
            };
            let value = tag.and_then(|t| tags::meta_string_value(dcm.meta(), t));
            Ok(value.map(FieldValue::Text).unwrap_or_else(|| self.default.clone()))
        } else {
            let elem = match &self.address {
                TagAddress::ByName(name) => dcm.element_by_name(name).ok(),
                TagAddress::ByCode(tag) => dcm.element(*tag).ok(),
            };
            match elem {
                Some(elem) => FieldValue::from_element(elem),
                None => Ok(self.default.clone()),
            }
        }
    }
}
