pub mod generic;
pub mod mr;
pub mod sanitize;

pub use generic::GenericLayout;
pub use mr::MrModalityLayout;
pub use sanitize::sanitize_component;

use crate::error::Result;
use crate::extraction::FieldMap;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Placeholder used when a series has no usable description
pub const UNKNOWN_SERIES: &str = "Unk_Series";

/// Strategy for deriving a destination path from extracted fields
///
/// Implementations are pure: same field values, same relative path, and
/// no I/O. The driver joins the result onto the output root.
pub trait SeriesLayout {
    /// Derives the relative destination path for one file
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when the field map lacks a value the
    /// layout cannot do without.
    fn derive(&self, fields: &FieldMap) -> Result<PathBuf>;
}

/// Closed registry of naming policies, selected by configuration
///
/// Replaces runtime plugin loading with a statically typed choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    /// `{pid}_{PATIENTNAME}/{date}/{number}_{series}`
    #[default]
    Generic,
    /// MR-aware layout with a `raw_data_storage` bucket for other modalities
    MrModality,
}

impl LayoutKind {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            LayoutKind::Generic => "generic",
            LayoutKind::MrModality => "mr-modality",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Returns the layout implementation for a configured kind
pub fn layout(kind: LayoutKind) -> &'static dyn SeriesLayout {
    match kind {
        LayoutKind::Generic => &GenericLayout,
        LayoutKind::MrModality => &MrModalityLayout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_kind_names() {
        assert_eq!(LayoutKind::Generic.simple_name(), "generic");
        assert_eq!(LayoutKind::MrModality.simple_name(), "mr-modality");
        assert_eq!(LayoutKind::default(), LayoutKind::Generic);
    }

    #[test]
    fn test_layout_kind_deserializes_kebab_case() {
        let kind: LayoutKind = serde_json::from_str("\"mr-modality\"").unwrap();
        assert_eq!(kind, LayoutKind::MrModality);
    }
}
