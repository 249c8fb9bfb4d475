pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod migrate;
pub mod naming;

pub use config::{RunConfig, TransferMode};
pub use error::{Result, TidyError};
pub use extraction::{FieldExtractorSet, FieldMap, FieldValue, TagAddress, TagSpec};
pub use migrate::{MigrationDriver, RunSummary};
pub use naming::{LayoutKind, SeriesLayout};
