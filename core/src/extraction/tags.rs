use dicom_core::Tag;
use dicom_object::meta::FileMetaTable;

// Tags addressed by the standard field set
pub use dicom_dictionary_std::tags::{
    PATIENT_ID, PATIENT_NAME, SERIES_DESCRIPTION, SERIES_NUMBER, SERIES_TIME, SOP_CLASS_UID,
    STUDY_DATE,
};

// File-meta group tags (group 0002 lives in its own header segment)
pub const MEDIA_STORAGE_SOP_CLASS_UID: Tag = Tag(0x0002, 0x0002);
pub const MEDIA_STORAGE_SOP_INSTANCE_UID: Tag = Tag(0x0002, 0x0003);
pub const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);
pub const IMPLEMENTATION_CLASS_UID: Tag = Tag(0x0002, 0x0012);
pub const IMPLEMENTATION_VERSION_NAME: Tag = Tag(0x0002, 0x0013);
pub const SOURCE_APPLICATION_ENTITY_TITLE: Tag = Tag(0x0002, 0x0016);

/// Reads a group-0002 attribute out of the file-meta table.
///
/// The meta segment is a fixed set of typed fields rather than a free-form
/// dataset, so lookup is a closed mapping. UID values keep their trailing
/// NUL padding on disk; it is stripped here.
pub fn meta_string_value(meta: &FileMetaTable, tag: Tag) -> Option<String> {
    let raw = match tag {
        MEDIA_STORAGE_SOP_CLASS_UID => Some(meta.media_storage_sop_class_uid.clone()),
        MEDIA_STORAGE_SOP_INSTANCE_UID => Some(meta.media_storage_sop_instance_uid.clone()),
        TRANSFER_SYNTAX_UID => Some(meta.transfer_syntax.clone()),
        IMPLEMENTATION_CLASS_UID => Some(meta.implementation_class_uid.clone()),
        IMPLEMENTATION_VERSION_NAME => meta.implementation_version_name.clone(),
        SOURCE_APPLICATION_ENTITY_TITLE => meta.source_application_entity_title.clone(),
        _ => None,
    };
    raw.map(|s| s.trim_end_matches('\0').trim().to_string())
}

/// Resolves a standard file-meta attribute name to its group-0002 tag.
///
/// Returns `None` for names outside the file-meta segment.
pub fn meta_tag_by_name(name: &str) -> Option<Tag> {
    match name {
        "MediaStorageSOPClassUID" => Some(MEDIA_STORAGE_SOP_CLASS_UID),
        "MediaStorageSOPInstanceUID" => Some(MEDIA_STORAGE_SOP_INSTANCE_UID),
        "TransferSyntaxUID" => Some(TRANSFER_SYNTAX_UID),
        "ImplementationClassUID" => Some(IMPLEMENTATION_CLASS_UID),
        "ImplementationVersionName" => Some(IMPLEMENTATION_VERSION_NAME),
        "SourceApplicationEntityTitle" => Some(SOURCE_APPLICATION_ENTITY_TITLE),
        _ => None,
    }
}
