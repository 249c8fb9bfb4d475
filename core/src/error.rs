use thiserror::Error;

/// Result type for dcmtidy operations
pub type Result<T> = std::result::Result<T, TidyError>;

/// Error types for dcmtidy operations
#[derive(Error, Debug)]
pub enum TidyError {
    /// DICOM reading error
    #[error("DICOM error: {0}")]
    Dicom(String),

    /// A field required by the naming layout is absent from the field map
    #[error("missing field: {0}")]
    MissingField(String),

    /// A tag value is present but cannot be converted
    #[error("invalid tag value: {0}")]
    InvalidValue(String),

    /// A field extractor specification is malformed
    #[error("invalid field spec `{0}`: {1}")]
    FieldSpec(String, String),

    /// Run configuration error
    #[error("config error: {0}")]
    Config(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for TidyError {
    fn from(e: dicom_object::ReadError) -> Self {
        TidyError::Dicom(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for TidyError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        TidyError::InvalidValue(format!("{}", e))
    }
}

impl From<serde_json::Error> for TidyError {
    fn from(e: serde_json::Error) -> Self {
        TidyError::Config(format!("{}", e))
    }
}
