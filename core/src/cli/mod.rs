pub mod report;

pub use report::RunReport;

use crate::config::{RunConfig, TransferMode};
use crate::error::{Result, TidyError};
use crate::naming::LayoutKind;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for dcmtidy
#[derive(Parser, Debug)]
#[command(name = "dcmtidy")]
#[command(about = "Reorganize DICOM trees into a patient/date/series hierarchy")]
#[command(version)]
pub struct Cli {
    /// Input root (overrides the config file)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Output root (overrides the config file)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Path to a JSON run configuration
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Copy files instead of moving them
    #[arg(long)]
    pub copy: bool,

    /// Treat leaf directories as whole series units
    #[arg(long)]
    pub fast: bool,

    /// Naming layout
    #[arg(short, long)]
    pub layout: Option<LayoutArg>,

    /// Work items per processing batch
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Naming layout options
#[derive(Debug, Clone, ValueEnum)]
pub enum LayoutArg {
    /// Generic patient/date/numbered-series layout
    Generic,
    /// MR-aware layout with a raw_data_storage bucket for other modalities
    MrModality,
}

impl From<LayoutArg> for LayoutKind {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Generic => LayoutKind::Generic,
            LayoutArg::MrModality => LayoutKind::MrModality,
        }
    }
}

impl Cli {
    /// Resolves the effective run configuration
    ///
    /// Starts from the config file when given, otherwise from the
    /// positional roots; explicit flags override file values.
    ///
    /// # Errors
    ///
    /// Fails when neither source supplies both roots, or when the
    /// resolved configuration is invalid.
    pub fn resolve(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => match (&self.input, &self.output) {
                (Some(input), Some(output)) => RunConfig::new(input.clone(), output.clone()),
                _ => {
                    return Err(TidyError::Config(
                        "an input and an output root are required (positional arguments or --config)"
                            .to_string(),
                    ))
                }
            },
        };

        if let Some(input) = &self.input {
            config.in_dir = input.clone();
        }
        if let Some(output) = &self.output {
            config.out_dir = output.clone();
        }
        if self.copy {
            config.mode = TransferMode::Copy;
        }
        if self.fast {
            config.fast = true;
        }
        if let Some(layout) = self.layout.clone() {
            config.layout = layout.into();
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_positional_roots() {
        let cli = Cli::try_parse_from(["dcmtidy", "/data/in", "/data/out"]).unwrap();
        let config = cli.resolve().unwrap();

        assert_eq!(config.in_dir, PathBuf::from("/data/in"));
        assert_eq!(config.out_dir, PathBuf::from("/data/out"));
        assert_eq!(config.mode, TransferMode::Move);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"in_dir": "/a", "out_dir": "/b", "layout": "generic"}}"#
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "dcmtidy",
            "--config",
            file.path().to_str().unwrap(),
            "--copy",
            "--layout",
            "mr-modality",
        ])
        .unwrap();
        let config = cli.resolve().unwrap();

        assert_eq!(config.in_dir, PathBuf::from("/a"));
        assert_eq!(config.mode, TransferMode::Copy);
        assert_eq!(config.layout, LayoutKind::MrModality);
    }

    #[test]
    fn test_missing_roots_is_an_error() {
        let cli = Cli::try_parse_from(["dcmtidy"]).unwrap();
        assert!(matches!(cli.resolve(), Err(TidyError::Config(_))));
    }

    #[test]
    fn test_layout_arg_conversion() {
        assert_eq!(LayoutKind::from(LayoutArg::Generic), LayoutKind::Generic);
        assert_eq!(
            LayoutKind::from(LayoutArg::MrModality),
            LayoutKind::MrModality
        );
    }
}
