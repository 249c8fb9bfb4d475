pub mod field_set;
pub mod tag_spec;
pub mod tags;

pub use field_set::{names, FieldExtractorSet, FieldMap};
pub use tag_spec::{FieldValue, TagAddress, TagSpec};
