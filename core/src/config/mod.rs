use crate::error::{Result, TidyError};
use crate::extraction::{FieldExtractorSet, TagSpec};
use crate::naming::LayoutKind;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Run-level choice between copying and moving files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Leave sources in place
    Copy,
    /// Relocate sources into the output tree
    #[default]
    Move,
}

impl TransferMode {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            TransferMode::Copy => "copy",
            TransferMode::Move => "move",
        }
    }
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

fn default_batch_size() -> usize {
    1024
}

/// One entry of the custom `fields` table
///
/// Uses the deployment config format: either a standard attribute
/// mnemonic or a hex `group_id`/`element_id` pair, e.g.
/// `{"group_id": "0008", "element_id": "103E", "default_value": "unk"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub standard_name: Option<String>,
    pub group_id: Option<String>,
    pub element_id: Option<String>,
    #[serde(default)]
    pub file_meta: bool,
    pub default_value: Option<String>,
}

impl FieldSpec {
    fn into_tag_spec(self, field: &str) -> Result<TagSpec> {
        let group = self
            .group_id
            .as_deref()
            .map(|s| parse_hex_id(field, s))
            .transpose()?;
        let element = self
            .element_id
            .as_deref()
            .map(|s| parse_hex_id(field, s))
            .transpose()?;
        TagSpec::from_parts(
            field,
            self.standard_name,
            group,
            element,
            self.file_meta,
            self.default_value,
        )
    }
}

fn parse_hex_id(field: &str, s: &str) -> Result<u16> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    u16::from_str_radix(trimmed, 16).map_err(|_| {
        TidyError::FieldSpec(field.to_string(), format!("invalid hex tag id `{}`", s))
    })
}

/// Run configuration, loaded from a JSON document
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Root of the unorganized input tree
    pub in_dir: PathBuf,

    /// Root the derived hierarchy is created under
    pub out_dir: PathBuf,

    /// Copy or move (default move)
    #[serde(default)]
    pub mode: TransferMode,

    /// Treat leaf directories as whole series units
    #[serde(default)]
    pub fast: bool,

    /// Work items accumulated before a batch is flushed
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Naming policy applied to extracted fields
    #[serde(default)]
    pub layout: LayoutKind,

    /// Custom field extractor table; empty means the standard set
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSpec>,
}

impl RunConfig {
    /// Creates a default configuration for the given roots
    pub fn new(in_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            in_dir: in_dir.into(),
            out_dir: out_dir.into(),
            mode: TransferMode::default(),
            fast: false,
            batch_size: default_batch_size(),
            layout: LayoutKind::default(),
            fields: BTreeMap::new(),
        }
    }

    /// Loads a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Fails on unreadable files or malformed JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: RunConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Checks cross-field constraints
    ///
    /// # Errors
    ///
    /// All violations here are deployment misconfigurations and abort
    /// the run before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TidyError::Config("batch_size must be nonzero".to_string()));
        }
        if self.fast && self.mode == TransferMode::Copy {
            return Err(TidyError::Config(
                "fast mode moves whole directories and cannot copy".to_string(),
            ));
        }
        if self.out_dir == self.in_dir || self.out_dir.starts_with(&self.in_dir) {
            return Err(TidyError::Config(
                "out_dir must not be inside in_dir".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the field extractor set for this run
    ///
    /// # Errors
    ///
    /// Fails when a custom field spec is malformed.
    pub fn extractor_set(&self) -> Result<FieldExtractorSet> {
        if self.fields.is_empty() {
            return Ok(FieldExtractorSet::standard());
        }
        let mut specs = Vec::with_capacity(self.fields.len());
        for (name, field) in self.fields.clone() {
            let spec = field.into_tag_spec(&name)?;
            specs.push((name, spec));
        }
        Ok(FieldExtractorSet::new(specs))
    }
}
