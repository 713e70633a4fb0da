//! Frame-token utilities shared by sequence discovery and delivery paths.
//!
//! A frame token is the run right before the extension of a sequence member:
//! literal digits (`1001`), a printf placeholder (`%04d`, `%d`), a glob star
//! (`*`) or hash padding (`####`). Negative frames are not supported.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::sequence::{SequenceCollector, SequenceGroup};

/// Frame token (any of the supported forms) followed by the extension.
static RE_FRAME_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<prefix>\w+[._])(?P<frame>(?:\*|%0?\d*d|\d|#)+)\.(?P<extension>\w+\.?(?:sc|gz)?)$",
    )
    .expect("frame number pattern is valid")
});

static RE_FRAME_PADDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^%0(\d+)d$").expect("frame padding pattern is valid"));

/// Digits directly before the final extension.
static RE_TRAILING_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<digits>\d+)(?P<extension>\.\w+)$").expect("trailing digits pattern is valid")
});

static RE_PRINTF_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(0?)(\d*)d").expect("printf token pattern is valid"));

/// Number of padding digits implied by a frame token.
///
/// ```
/// use shotforged_parser::frames::get_padding_from_frame;
///
/// assert_eq!(get_padding_from_frame("1001"), Some(4));
/// assert_eq!(get_padding_from_frame("001001"), Some(6));
/// assert_eq!(get_padding_from_frame("%08d"), Some(8));
/// assert_eq!(get_padding_from_frame("%d"), None);
/// ```
pub fn get_padding_from_frame(frame_token: &str) -> Option<usize> {
    if !frame_token.is_empty() && frame_token.bytes().all(|b| b.is_ascii_digit()) {
        return Some(frame_token.len());
    }
    if !frame_token.is_empty() && frame_token.bytes().all(|b| b == b'#') {
        return Some(frame_token.len());
    }
    RE_FRAME_PADDING
        .captures(frame_token)
        .and_then(|caps| caps[1].parse().ok())
}

fn split_dir(path: &str) -> (&str, &str) {
    match path.rfind(['/', '\\']) {
        Some(idx) => (&path[..=idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Frame token found in a file name, if any.
pub fn frame_token(path: &str) -> Option<String> {
    let (_, filename) = split_dir(path);
    RE_FRAME_NUMBER
        .captures(filename)
        .map(|caps| caps["frame"].to_string())
}

/// Replace the frame token of a path's file name with `token`.
///
/// With `padding` set, the token is repeated once per padding digit of the
/// original frame token, so `("a.1001.exr", "#", true)` gives `a.####.exr`.
/// Paths without a frame token are returned unchanged.
///
/// ```
/// use shotforged_parser::frames::replace_frame_number_with_token;
///
/// assert_eq!(
///     replace_frame_number_with_token("/plates/sh010.1001.exr", "*", false),
///     "/plates/sh010.*.exr"
/// );
/// assert_eq!(
///     replace_frame_number_with_token("/plates/sh010.%04d.exr", "#", true),
///     "/plates/sh010.####.exr"
/// );
/// ```
pub fn replace_frame_number_with_token(path: &str, token: &str, padding: bool) -> String {
    let (root, filename) = split_dir(path);

    let Some(caps) = RE_FRAME_NUMBER.captures(filename) else {
        return path.to_string();
    };

    let mut token = token.to_string();
    if padding {
        if let Some(length) = get_padding_from_frame(&caps["frame"]) {
            token = token.repeat(length);
        }
    }

    let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
    let replaced = format!(
        "{}{}{}.{}",
        &filename[..whole.start],
        &caps["prefix"],
        token,
        &caps["extension"]
    );
    format!("{root}{replaced}")
}

/// Replace the digits before the extension with the same number of `#`.
///
/// ```
/// use shotforged_parser::frames::replace_frame_digits_with_hashes;
///
/// assert_eq!(
///     replace_frame_digits_with_hashes("/out/sh010_v003.001001.exr"),
///     "/out/sh010_v003.######.exr"
/// );
/// assert_eq!(replace_frame_digits_with_hashes("/out/notes.txt"), "/out/notes.txt");
/// ```
pub fn replace_frame_digits_with_hashes(path: &str) -> String {
    RE_TRAILING_DIGITS
        .replace(path, |caps: &regex::Captures<'_>| {
            format!("{}{}", "#".repeat(caps["digits"].len()), &caps["extension"])
        })
        .into_owned()
}

/// Expand a `#`-padded or printf-style path into one path per frame.
///
/// Paths with no frame placeholder are returned as the only expected file.
pub fn expected_files(path: &str, frame_start: i64, frame_end: i64) -> Vec<String> {
    let (dirname, filename) = split_dir(path);

    let mut filename = filename.to_string();
    if filename.contains('#') {
        let parts: Vec<&str> = filename.split('#').collect();
        let padding = format!("%0{}d", parts.len() - 1);
        filename = format!("{}{}{}", parts[0], padding, parts[parts.len() - 1]);
    }

    if !filename.contains('%') {
        return vec![path.to_string()];
    }

    (frame_start..=frame_end)
        .map(|frame| {
            let name = format_frame(&filename, frame);
            format!("{dirname}{name}").replace('\\', "/")
        })
        .collect()
}

/// Substitute every printf frame token in `template` with `frame`.
pub fn format_frame(template: &str, frame: i64) -> String {
    RE_PRINTF_TOKEN
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let width: usize = caps[2].parse().unwrap_or(0);
            if &caps[1] == "0" {
                format!("{frame:0width$}")
            } else {
                format!("{frame:width$}")
            }
        })
        .into_owned()
}

/// Map every path to its frame string, or `None` for single files.
///
/// Unlike package scanning, a lone numbered file counts as a one-frame
/// sequence here.
pub fn collect_frames<S: AsRef<str>>(files: &[S]) -> Vec<(String, Option<String>)> {
    let groups = SequenceCollector::new().minimum_items(1).collect(files);

    let mut sources = Vec::new();
    for group in groups {
        if group.is_sequence() {
            for index in &group.frame_indexes {
                let frame = group.format_index(*index);
                sources.push((format!("{}{}{}", group.head, frame, group.tail), Some(frame)));
            }
        } else {
            sources.push((group.head.clone(), None));
        }
    }
    sources
}

/// Files and frame range of the sequence a path belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceInfo {
    pub files: Vec<String>,
    pub extension: String,
    pub frame_start: i64,
    pub frame_end: i64,
}

/// Find every sibling frame of `file_path` on disk and summarise the sequence.
///
/// Single files report a one-frame range: their own frame token if they have
/// one, otherwise `1-1`. Returns `None` when the glob finds nothing.
pub fn convert_to_sequence(file_path: &str) -> Option<SequenceInfo> {
    let escaped = glob::Pattern::escape(file_path);
    let file_pattern = replace_frame_number_with_token(&escaped, "*", false);

    let found: Vec<String> = match glob::glob(&file_pattern) {
        Ok(paths) => paths
            .filter_map(|entry| entry.ok())
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
        Err(e) => {
            warn!("Invalid glob pattern '{}': {}", file_pattern, e);
            return None;
        }
    };
    debug!("Glob '{}' found {} files", file_pattern, found.len());

    let groups = SequenceCollector::new().collect(&found);
    let sequences: Vec<&SequenceGroup> = groups.iter().filter(|g| g.is_sequence()).collect();

    let is_remainder = groups
        .iter()
        .any(|g| !g.is_sequence() && g.head == file_path);
    if is_remainder || (sequences.is_empty() && Path::new(file_path).is_file()) {
        let (_, filename) = split_dir(file_path);
        return Some(match RE_FRAME_NUMBER.captures(filename) {
            Some(caps) => {
                let frame = caps["frame"].parse().unwrap_or(1);
                SequenceInfo {
                    files: vec![file_path.to_string()],
                    extension: caps["extension"].to_string(),
                    frame_start: frame,
                    frame_end: frame,
                }
            }
            None => SequenceInfo {
                files: vec![file_path.to_string()],
                extension: Path::new(file_path)
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                frame_start: 1,
                frame_end: 1,
            },
        });
    }

    let Some(collection) = sequences.first() else {
        warn!("Couldn't find a collection for file pattern '{}'.", file_pattern);
        return None;
    };

    if sequences.len() > 1 {
        warn!(
            "More than one sequence found for the file pattern '{}'. Using only first one: {}",
            file_pattern,
            collection.format_pattern()
        );
    }

    let (frame_start, frame_end) = collection.frame_range()?;
    Some(SequenceInfo {
        files: collection.file_paths(),
        extension: collection.tail.trim_start_matches('.').to_string(),
        frame_start,
        frame_end,
    })
}
