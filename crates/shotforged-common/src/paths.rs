//! Extension tables for classifying ingested files and delivery outputs.
//!
//! Lookups accept extensions with or without the leading dot and in any case.
//! Tables are ordered slices rather than maps: when an extension belongs to
//! more than one family the first entry wins, and callers rely on that order.

use crate::Family;

/// Families and the extensions that imply them, in lookup order.
const FAMILY_EXTENSIONS: &[(Family, &[&str])] = &[
    (Family::Render, &["exr", "tif", "jpg", "jpeg"]),
    (Family::Pointcache, &["abc"]),
    (Family::Camera, &["abc", "fbx"]),
    (Family::Reference, &["mov", "mp4", "mxf", "avi", "wmv"]),
    (
        Family::Workfile,
        &["nk", "ma", "mb", "hip", "sfx", "mocha", "psd"],
    ),
    (Family::Distortion, &["nk", "exr"]),
    (Family::ColorGrade, &["ccc", "cc"]),
];

/// Extensions whose representation name differs from the bare extension.
const REPRESENTATION_NAMES: &[(&str, &str)] = &[
    ("nk", "nuke"),
    ("ma", "maya"),
    ("mb", "maya"),
    ("hip", "houdini"),
    ("sfx", "silhouette"),
    ("mocha", "mocha"),
    ("psd", "photoshop"),
];

/// Extensions a camera export may use.
const CAMERA_EXTENSIONS: &[&str] = &["abc", "fbx"];

/// Output extensions that are never frame sequences.
const SINGLE_FILE_EXTENSIONS: &[&str] = &["mov", "mp4", "png", "jpg", "jpeg"];

/// Strip a leading dot and lowercase an extension.
///
/// ```
/// use shotforged_common::paths::normalize_extension;
///
/// assert_eq!(normalize_extension(".EXR"), "exr");
/// assert_eq!(normalize_extension("mov"), "mov");
/// ```
pub fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

/// First family whose extension list contains `ext`.
pub fn family_for_extension(ext: &str) -> Option<Family> {
    let ext = normalize_extension(ext);
    FAMILY_EXTENSIONS
        .iter()
        .find(|(_, exts)| exts.contains(&ext.as_str()))
        .map(|(family, _)| *family)
}

/// Every family claiming `ext`, in table order.
///
/// More than one entry means [`family_for_extension`] had to break a tie.
pub fn families_for_extension(ext: &str) -> Vec<Family> {
    let ext = normalize_extension(ext);
    FAMILY_EXTENSIONS
        .iter()
        .filter(|(_, exts)| exts.contains(&ext.as_str()))
        .map(|(family, _)| *family)
        .collect()
}

/// Representation name for an extension; unmapped extensions use themselves.
///
/// ```
/// use shotforged_common::paths::representation_name;
///
/// assert_eq!(representation_name(".mb"), "maya");
/// assert_eq!(representation_name(".exr"), "exr");
/// ```
pub fn representation_name(ext: &str) -> String {
    let ext = normalize_extension(ext);
    REPRESENTATION_NAMES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or(ext)
}

pub fn is_camera_extension(ext: &str) -> bool {
    CAMERA_EXTENSIONS.contains(&normalize_extension(ext).as_str())
}

/// Check if an output extension always produces a single file.
///
/// ```
/// use shotforged_common::paths::is_single_file_extension;
///
/// assert!(is_single_file_extension("mov"));
/// assert!(!is_single_file_extension("exr"));
/// ```
pub fn is_single_file_extension(ext: &str) -> bool {
    SINGLE_FILE_EXTENSIONS.contains(&normalize_extension(ext).as_str())
}

#[must_use]
pub fn single_file_extensions() -> &'static [&'static str] {
    SINGLE_FILE_EXTENSIONS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_for_extension() {
        assert_eq!(family_for_extension(".exr"), Some(Family::Render));
        assert_eq!(family_for_extension("tif"), Some(Family::Render));
        assert_eq!(family_for_extension(".mov"), Some(Family::Reference));
        assert_eq!(family_for_extension(".ccc"), Some(Family::ColorGrade));
        assert_eq!(family_for_extension(".psd"), Some(Family::Workfile));
        assert_eq!(family_for_extension(".txt"), None);
        assert_eq!(family_for_extension(""), None);

        // Case insensitive
        assert_eq!(family_for_extension(".EXR"), Some(Family::Render));
    }

    #[test]
    fn test_shared_extensions_resolve_in_table_order() {
        assert_eq!(family_for_extension(".abc"), Some(Family::Pointcache));
        assert_eq!(
            families_for_extension(".abc"),
            vec![Family::Pointcache, Family::Camera]
        );

        assert_eq!(family_for_extension(".nk"), Some(Family::Workfile));
        assert_eq!(
            families_for_extension(".nk"),
            vec![Family::Workfile, Family::Distortion]
        );

        assert_eq!(
            families_for_extension(".exr"),
            vec![Family::Render, Family::Distortion]
        );
        assert_eq!(families_for_extension(".fbx"), vec![Family::Camera]);
    }

    #[test]
    fn test_representation_name() {
        assert_eq!(representation_name(".nk"), "nuke");
        assert_eq!(representation_name(".ma"), "maya");
        assert_eq!(representation_name(".hip"), "houdini");
        assert_eq!(representation_name(".sfx"), "silhouette");
        assert_eq!(representation_name(".mocha"), "mocha");
        assert_eq!(representation_name(".psd"), "photoshop");
        assert_eq!(representation_name(".abc"), "abc");
        assert_eq!(representation_name("MOV"), "mov");
    }

    #[test]
    fn test_single_file_extensions() {
        for ext in single_file_extensions() {
            assert!(is_single_file_extension(ext));
        }
        assert!(is_single_file_extension(".JPG"));
        assert!(!is_single_file_extension("dpx"));
        assert!(!is_single_file_extension("tif"));
    }

    #[test]
    fn test_camera_extensions() {
        assert!(is_camera_extension(".abc"));
        assert!(is_camera_extension("FBX"));
        assert!(!is_camera_extension(".exr"));
    }
}
