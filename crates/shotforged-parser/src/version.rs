//! Version labels in file paths (`_v001`, `.v12`).

use regex::Regex;
use shotforged_common::{Error, Result};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{error, info};

static RE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[._]v([0-9]+)").expect("version pattern is valid"));

/// Digits of the last version label in `path`, padding preserved.
///
/// ```
/// use shotforged_parser::version::get_version_from_path;
///
/// assert_eq!(get_version_from_path("/work/sh010_comp_v004.nk").as_deref(), Some("004"));
/// assert_eq!(get_version_from_path("/work/v002/sh010.V013.nk").as_deref(), Some("013"));
/// assert_eq!(get_version_from_path("/work/sh010.nk"), None);
/// ```
pub fn get_version_from_path(path: &str) -> Option<String> {
    let version = RE_VERSION
        .captures_iter(path)
        .last()
        .map(|caps| caps[1].to_string());
    if version.is_none() {
        error!("'{}' is missing a version string, for example 'v004'", path);
    }
    version
}

/// Path of the next version of `path` that doesn't exist on disk yet.
///
/// The last version label in the file stem is bumped with its padding kept;
/// stems without a label get `_v001`. Existing files starting with the new
/// name up to its label are skipped over.
pub fn version_up(path: &str) -> Result<String> {
    let file_path = Path::new(path);
    let dirname = file_path.parent().unwrap_or_else(|| Path::new(""));
    let basename = file_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| Error::invalid_input(format!("no file name in '{path}'")))?;
    let ext = file_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let (new_basename, new_label) = match RE_VERSION.find_iter(&basename).last() {
        None => {
            info!("Creating version...");
            let label = "_v001".to_string();
            (format!("{basename}{label}"), label)
        }
        Some(found) => {
            let label = found.as_str();
            let digits = &label[2..];
            let padding = digits.len();
            let next: u64 = digits.parse::<u64>().map_err(|e| {
                Error::invalid_input(format!("bad version '{label}' in '{path}': {e}"))
            })? + 1;
            let new_label = format!("{}{:0padding$}", &label[..2], next);
            let new_basename = format!(
                "{}{}{}",
                &basename[..found.start()],
                new_label,
                &basename[found.end()..]
            );
            (new_basename, new_label)
        }
    };

    let new_path = dirname
        .join(format!("{new_basename}{ext}"))
        .to_string_lossy()
        .into_owned();
    if new_path == path {
        return Err(Error::invalid_input(format!(
            "created path is the same as current file: {path}"
        )));
    }

    // Clash on anything sharing the name up to the new label.
    let clash_prefix = match new_basename.find(&new_label) {
        Some(index) => &new_basename[..index + new_label.len()],
        None => new_basename.as_str(),
    };

    let search_dir = if dirname.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dirname
    };
    for entry in fs::read_dir(search_dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name.ends_with(&ext) && name.starts_with(clash_prefix) {
            info!("Skipping existing version {}", new_label);
            return version_up(&new_path);
        }
    }

    info!("New version {}", new_label);
    Ok(new_path)
}
