//! Family, representation and subset inference for a matched file.
//!
//! Runs after [`crate::FilenameMatcher`]: the extension picks a family and a
//! representation name, keyword sniffing on the full path may override the
//! family or task, and the subset name is finished from the captured pieces.

use shotforged_common::paths::{
    families_for_extension, family_for_extension, is_camera_extension, normalize_extension,
    representation_name,
};
use shotforged_common::{Family, OutsourceTask};
use tracing::{debug, error, warn};

use crate::model::MatchResult;

/// Field replaced by a keyword hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuzzyOverride {
    Family(Family),
    Task(OutsourceTask),
}

/// Path keywords and the override they trigger.
///
/// Every entry whose keyword appears in the lowercased path is applied in
/// table order, so a later entry beats an earlier one on the same field.
pub const FUZZY_NAME_OVERRIDES: &[(&[&str], FuzzyOverride)] = &[
    (&["_cam", "camera"], FuzzyOverride::Family(Family::Camera)),
    (
        &["_mm", "_trk", "matchmove", "tracking"],
        FuzzyOverride::Task(OutsourceTask::Track),
    ),
    (
        &["distortion", "distortion_node"],
        FuzzyOverride::Family(Family::Distortion),
    ),
];

/// Publish fields inferred for one matched file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Classification {
    pub family: Family,
    pub representation_name: String,
    pub task: Option<String>,
    pub subset: Option<String>,
}

/// Family for an extension, breaking ties by table order and by a `camera`
/// keyword in the path.
///
/// ```
/// use shotforged_common::Family;
/// use shotforged_parser::classify::family_from_extension;
///
/// assert_eq!(family_from_extension(".abc", "/pkg/sh010_fx.abc"), Family::Pointcache);
/// assert_eq!(family_from_extension(".abc", "/pkg/camera/sh010.abc"), Family::Camera);
/// assert_eq!(family_from_extension(".xyz", "/pkg/sh010.xyz"), Family::Unknown);
/// ```
pub fn family_from_extension(extension: &str, path: &str) -> Family {
    let mut family = match family_for_extension(extension) {
        Some(family) => {
            let families = families_for_extension(extension);
            if families.len() > 1 {
                warn!(
                    "Extension '{}' maps to families {:?}, using '{}' (first in table)",
                    extension, families, family
                );
            }
            family
        }
        None => {
            warn!("Couldn't find a family for the file extension '{}'", extension);
            Family::Unknown
        }
    };

    if is_camera_extension(extension) && path.to_lowercase().contains("camera") {
        debug!("Found 'camera' in path '{}', assuming it's a camera product", path);
        family = Family::Camera;
    }
    family
}

/// Insert `_` before capitals not already after `_`, then lowercase.
///
/// ```
/// use shotforged_parser::classify::split_camel_case;
///
/// assert_eq!(split_camel_case("cleanPlate"), "clean_plate");
/// assert_eq!(split_camel_case("roto_MainChar"), "roto_main_char");
/// assert_eq!(split_camel_case("CC"), "c_c");
/// ```
pub fn split_camel_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;
    for c in name.chars() {
        if c.is_uppercase() && previous.is_some_and(|p| p != '_') {
            result.push('_');
        }
        result.extend(c.to_lowercase());
        previous = Some(c);
    }
    result
}

/// Subset name from the captured subset, variant and final task.
///
/// The variant's trailing `_` is dropped before it is appended, and the task
/// is prefixed whenever there is both a task and a subset.
pub fn finish_subset(subset: Option<&str>, variant: Option<&str>, task: Option<&str>) -> Option<String> {
    let variant = variant
        .map(|v| v.rsplit_once('_').map_or(v, |(head, _)| head))
        .filter(|v| !v.is_empty());

    let subset = match (subset, variant) {
        (Some(subset), Some(variant)) => Some(format!("{subset}_{variant}")),
        (Some(subset), None) => Some(subset.to_string()),
        (None, Some(variant)) => Some(variant.to_string()),
        (None, None) => None,
    }?;

    let subset = match task {
        Some(task) => format!("{task}_{subset}"),
        None => subset,
    };
    Some(split_camel_case(&subset))
}

/// Infer family, representation, final task and subset for a match.
///
/// Tasks produced by keyword overrides are kept only if they are in `tasks`.
pub fn classify<S: AsRef<str>>(result: &MatchResult, tasks: &[S]) -> Classification {
    let extension = normalize_extension(&result.extension);
    let mut family = family_from_extension(&extension, &result.path);
    let representation_name = representation_name(&extension);
    let mut task = result.task.clone();

    let lower_path = result.path.to_lowercase();
    for (keywords, fuzzy) in FUZZY_NAME_OVERRIDES {
        for keyword in *keywords {
            if !lower_path.contains(keyword) {
                continue;
            }
            debug!(
                "Found fuzzy name '{}' in '{}', applying {:?}",
                keyword, result.filename, fuzzy
            );
            match fuzzy {
                FuzzyOverride::Family(f) => family = *f,
                FuzzyOverride::Task(t) => task = Some(t.as_str().to_string()),
            }
        }
    }

    if let Some(name) = task.as_deref() {
        match tasks.iter().find(|known| known.as_ref().eq_ignore_ascii_case(name)) {
            Some(known) => task = Some(known.as_ref().to_string()),
            None => {
                error!(
                    "Task '{}' in '{}' is not one of the supported tasks",
                    name, result.path
                );
                task = None;
            }
        }
    }

    let subset = finish_subset(result.subset.as_deref(), result.variant.as_deref(), task.as_deref());

    Classification {
        family,
        representation_name,
        task,
        subset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilenameMatcher;

    const TASKS: [&str; 5] = ["roto", "paint", "comp", "track", "edit"];

    fn classify_path(codes: &[&str], path: &str) -> Classification {
        let result = FilenameMatcher::new(codes, &TASKS).match_filename(path);
        classify(&result, &TASKS)
    }

    #[test]
    fn test_strict_render() {
        let c = classify_path(&["uni_pg_0455"], "uni_pg_0455_plt_01_roto_output-01_v001.1001.exr");
        assert_eq!(c.family, Family::Render);
        assert_eq!(c.representation_name, "exr");
        assert_eq!(c.task.as_deref(), Some("roto"));
        assert_eq!(c.subset.as_deref(), Some("roto_plt_01_output-01"));
    }

    #[test]
    fn test_extension_table_order_is_pinned() {
        // abc is pointcache before camera, nk is workfile before distortion
        assert_eq!(family_from_extension("abc", "/a/sh010.abc"), Family::Pointcache);
        assert_eq!(family_from_extension("nk", "/a/sh010.nk"), Family::Workfile);
        assert_eq!(family_from_extension("exr", "/a/sh010.exr"), Family::Render);
    }

    #[test]
    fn test_camera_keyword_only_for_camera_extensions() {
        assert_eq!(family_from_extension("fbx", "/a/Camera/sh010.fbx"), Family::Camera);
        assert_eq!(family_from_extension("exr", "/a/camera/sh010.exr"), Family::Render);
    }

    #[test]
    fn test_fuzzy_camera_override() {
        let c = classify_path(&["uni_pg_0455"], "/io/uni_pg_0455_plate_track_v001_cam.mov");
        assert_eq!(c.family, Family::Camera);
    }

    #[test]
    fn test_fuzzy_task_override() {
        let c = classify_path(&["uni_pg_0455"], "/io/matchmove/uni_pg_0455_plate_comp_v001.nk");
        assert_eq!(c.task.as_deref(), Some("track"));
        assert_eq!(c.family, Family::Workfile);
        assert_eq!(c.representation_name, "nuke");
        assert_eq!(c.subset.as_deref(), Some("track_plate"));
    }

    #[test]
    fn test_last_fuzzy_match_wins() {
        // Both the camera and distortion entries hit; distortion comes later.
        let c = classify_path(&["uni_pg_0455"], "/io/camera_distortion/uni_pg_0455_lens_track_v001.nk");
        assert_eq!(c.family, Family::Distortion);
    }

    #[test]
    fn test_fuzzy_task_dropped_when_unsupported() {
        let result = FilenameMatcher::new(&["uni_pg_0455"], &["roto"])
            .match_filename("/io/tracking/uni_pg_0455_plate_roto_v001.exr");
        let c = classify(&result, &["roto"]);
        assert_eq!(c.task, None);
        assert_eq!(c.subset.as_deref(), Some("plate"));
    }

    #[test]
    fn test_unknown_extension() {
        let c = classify_path(&["uni_pg_0455"], "/io/uni_pg_0455_notes_edit_v001.txt");
        assert_eq!(c.family, Family::Unknown);
        assert_eq!(c.representation_name, "txt");
    }

    #[test]
    fn test_finish_subset() {
        assert_eq!(
            finish_subset(Some("plate"), Some("main_"), Some("roto")).as_deref(),
            Some("roto_plate_main")
        );
        assert_eq!(finish_subset(Some("cleanPlate"), None, None).as_deref(), Some("clean_plate"));
        assert_eq!(finish_subset(None, Some("alt_"), Some("paint")).as_deref(), Some("paint_alt"));
        assert_eq!(finish_subset(None, None, Some("paint")), None);
        assert_eq!(finish_subset(Some("a"), Some("_"), None).as_deref(), Some("a"));
    }

    #[test]
    fn test_split_camel_case() {
        assert_eq!(split_camel_case("MP01"), "m_p01");
        assert_eq!(split_camel_case("already_snake"), "already_snake");
        assert_eq!(split_camel_case("_Lead"), "_lead");
        assert_eq!(split_camel_case(""), "");
    }
}
