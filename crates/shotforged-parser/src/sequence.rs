//! Frame-sequence collection.
//!
//! Groups a flat file listing into numbered sequences and single files. A
//! sequence member is any name ending in a run of literal digits right before
//! its extension (`plate.1001.exr`, `plate_1001.exr`, `sim.0012.bgeo.sc`).

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, warn};

static RE_SEQUENCE_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<head>.*\D)?(?P<frame>\d+)(?P<tail>\.[A-Za-z][A-Za-z0-9]*(?:\.(?:sc|gz))?)$")
        .expect("sequence member pattern is valid")
});

/// A frame sequence, or a single file when `frame_indexes` is empty.
///
/// Single files keep their whole path in `head` and an empty `tail`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceGroup {
    pub head: String,
    pub tail: String,
    pub frame_indexes: BTreeSet<i64>,
    /// Digit width shared by every member, `None` when widths vary.
    pub padding: Option<usize>,
}

impl SequenceGroup {
    /// A group holding one non-sequence file.
    pub fn single(path: impl Into<String>) -> Self {
        Self {
            head: path.into(),
            tail: String::new(),
            frame_indexes: BTreeSet::new(),
            padding: None,
        }
    }

    pub fn is_sequence(&self) -> bool {
        !self.frame_indexes.is_empty()
    }

    /// First and last frame, `None` for single files.
    pub fn frame_range(&self) -> Option<(i64, i64)> {
        let first = *self.frame_indexes.first()?;
        let last = *self.frame_indexes.last()?;
        Some((first, last))
    }

    /// Printf-style frame token: `%04d`, or `%d` without fixed padding.
    pub fn padding_token(&self) -> String {
        match self.padding {
            Some(width) if width > 1 => format!("%0{width}d"),
            _ => "%d".to_string(),
        }
    }

    /// Frame number rendered with this group's padding.
    pub fn format_index(&self, index: i64) -> String {
        match self.padding {
            Some(width) => format!("{index:0width$}"),
            None => index.to_string(),
        }
    }

    /// `{head}{padding}{tail}` for sequences, the path itself for single files.
    ///
    /// ```
    /// use shotforged_parser::SequenceCollector;
    ///
    /// let groups = SequenceCollector::new().collect(&["sh010.1001.exr", "sh010.1002.exr"]);
    /// assert_eq!(groups[0].format_pattern(), "sh010.%04d.exr");
    /// ```
    pub fn format_pattern(&self) -> String {
        if self.is_sequence() {
            format!("{}{}{}", self.head, self.padding_token(), self.tail)
        } else {
            self.head.clone()
        }
    }

    /// Every member path, in frame order.
    pub fn file_paths(&self) -> Vec<String> {
        if !self.is_sequence() {
            return vec![self.head.clone()];
        }
        self.frame_indexes
            .iter()
            .map(|index| format!("{}{}{}", self.head, self.format_index(*index), self.tail))
            .collect()
    }
}

impl fmt::Display for SequenceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frame_range() {
            Some((start, end)) => write!(f, "{} [{}-{}]", self.format_pattern(), start, end),
            None => f.write_str(&self.head),
        }
    }
}

/// Groups file paths into [`SequenceGroup`]s.
///
/// Output is independent of input order: groups are sorted by their
/// formatted pattern.
#[derive(Debug, Clone)]
pub struct SequenceCollector {
    minimum_items: usize,
}

impl Default for SequenceCollector {
    fn default() -> Self {
        Self { minimum_items: 2 }
    }
}

impl SequenceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smallest member count that still forms a sequence (default 2).
    pub fn minimum_items(mut self, minimum_items: usize) -> Self {
        self.minimum_items = minimum_items.max(1);
        self
    }

    pub fn collect<S: AsRef<str>>(&self, files: &[S]) -> Vec<SequenceGroup> {
        let mut candidates: BTreeMap<(String, String), Vec<(String, String)>> = BTreeMap::new();
        let mut singles: BTreeSet<String> = BTreeSet::new();

        for file in files {
            let file = file.as_ref();
            match RE_SEQUENCE_MEMBER.captures(file) {
                Some(caps) if caps["frame"].parse::<i64>().is_err() => {
                    warn!(
                        "Frame number '{}' in '{}' is out of range, keeping it as a single file",
                        &caps["frame"], file
                    );
                    singles.insert(file.to_string());
                }
                Some(caps) => {
                    let head = caps.name("head").map_or("", |m| m.as_str()).to_string();
                    candidates
                        .entry((head, caps["tail"].to_string()))
                        .or_default()
                        .push((caps["frame"].to_string(), file.to_string()));
                }
                None => {
                    singles.insert(file.to_string());
                }
            }
        }

        let mut groups = Vec::new();
        for ((head, tail), members) in candidates {
            for (padding, members) in split_by_padding(&head, &tail, members) {
                if members.len() < self.minimum_items {
                    singles.extend(members.into_iter().map(|(_, path)| path));
                    continue;
                }
                let frame_indexes = members
                    .iter()
                    .filter_map(|(token, _)| token.parse::<i64>().ok())
                    .collect();
                groups.push(SequenceGroup {
                    head: head.clone(),
                    tail: tail.clone(),
                    frame_indexes,
                    padding,
                });
            }
        }

        groups.extend(singles.into_iter().map(SequenceGroup::single));
        groups.sort_by(|a, b| {
            a.format_pattern()
                .cmp(&b.format_pattern())
                .then_with(|| a.frame_range().cmp(&b.frame_range()))
        });

        debug!("Collected {} groups from {} files", groups.len(), files.len());
        groups
    }
}

type Members = Vec<(String, String)>;

/// Split one head/tail bucket into groups of consistent padding.
///
/// Same-width tokens share that width as padding. Mixed widths without any
/// zero-padded token are one unpadded sequence (`998`..`1002`). Mixed widths
/// with zero padding are ambiguous and split per width.
fn split_by_padding(head: &str, tail: &str, members: Members) -> Vec<(Option<usize>, Members)> {
    let widths: BTreeSet<usize> = members.iter().map(|(token, _)| token.len()).collect();

    if widths.len() == 1 {
        let width = widths.first().copied();
        return vec![(width, members)];
    }

    let zero_padded = members
        .iter()
        .any(|(token, _)| token.len() > 1 && token.starts_with('0'));
    if !zero_padded {
        return vec![(None, members)];
    }

    warn!(
        "Ambiguous frame padding for '{}#{}' (widths {:?}), splitting into one sequence per width",
        head, tail, widths
    );
    let mut by_width: BTreeMap<usize, Members> = BTreeMap::new();
    for member in members {
        by_width.entry(member.0.len()).or_default().push(member);
    }
    by_width
        .into_iter()
        .map(|(width, members)| (Some(width), members))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(files: &[&str]) -> Vec<SequenceGroup> {
        SequenceCollector::new().collect(files)
    }

    #[test]
    fn test_single_sequence() {
        let groups = collect(&["/r/plate.1001.exr", "/r/plate.1002.exr", "/r/plate.1003.exr"]);
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.head, "/r/plate.");
        assert_eq!(group.tail, ".exr");
        assert_eq!(group.padding, Some(4));
        assert_eq!(group.frame_range(), Some((1001, 1003)));
        assert_eq!(group.format_pattern(), "/r/plate.%04d.exr");
    }

    #[test]
    fn test_order_independence() {
        let forward = collect(&["a.1001.exr", "a.1002.exr", "a.1005.exr", "notes.txt"]);
        let backward = collect(&["notes.txt", "a.1005.exr", "a.1002.exr", "a.1001.exr"]);
        assert_eq!(forward, backward);
        let seq = forward.iter().find(|g| g.is_sequence()).unwrap();
        assert_eq!(
            seq.frame_indexes.iter().copied().collect::<Vec<_>>(),
            vec![1001, 1002, 1005]
        );
    }

    #[test]
    fn test_overflowing_frames_are_singles() {
        let huge = ["shot.99999999999999999999.exr", "shot.99999999999999999998.exr"];
        let groups = collect(&huge);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| !g.is_sequence()));
        assert_eq!(groups[0].format_pattern(), "shot.99999999999999999998.exr");

        let mixed = collect(&["shot.1001.exr", "shot.1002.exr", "shot.99999999999999999999.exr"]);
        assert_eq!(mixed.len(), 2);
        let seq = mixed.iter().find(|g| g.is_sequence()).unwrap();
        assert_eq!(seq.frame_range(), Some((1001, 1002)));
    }

    #[test]
    fn test_non_matching_files_are_singletons() {
        let groups = collect(&["edit.mov", "README", "plate.%04d.exr", "plate.####.exr"]);
        assert_eq!(groups.len(), 4);
        assert!(groups.iter().all(|g| !g.is_sequence()));
        assert!(groups.iter().all(|g| g.frame_indexes.is_empty()));
    }

    #[test]
    fn test_lone_numbered_file_is_single() {
        let groups = collect(&["shot_v001.mov"]);
        assert_eq!(groups, vec![SequenceGroup::single("shot_v001.mov")]);
    }

    #[test]
    fn test_minimum_items_one() {
        let groups = SequenceCollector::new()
            .minimum_items(1)
            .collect(&["plate.1001.exr"]);
        assert!(groups[0].is_sequence());
        assert_eq!(groups[0].frame_range(), Some((1001, 1001)));
    }

    #[test]
    fn test_separate_heads_and_tails() {
        let groups = collect(&["a.1001.exr", "a.1002.exr", "b.1001.exr", "b.1002.exr", "a.1001.jpg", "a.1002.jpg"]);
        assert_eq!(groups.len(), 3);
        let patterns: Vec<String> = groups.iter().map(|g| g.format_pattern()).collect();
        assert_eq!(patterns, vec!["a.%04d.exr", "a.%04d.jpg", "b.%04d.exr"]);
    }

    #[test]
    fn test_unpadded_mixed_widths() {
        let groups = collect(&["a.998.exr", "a.999.exr", "a.1000.exr"]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].padding, None);
        assert_eq!(groups[0].format_pattern(), "a.%d.exr");
        assert_eq!(groups[0].file_paths(), vec!["a.998.exr", "a.999.exr", "a.1000.exr"]);
    }

    #[test]
    fn test_ambiguous_padding_is_split() {
        let groups = collect(&["a.0998.exr", "a.0999.exr", "a.01000.exr", "a.01001.exr"]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].padding, Some(4));
        assert_eq!(groups[1].padding, Some(5));
    }

    #[test]
    fn test_compound_extension() {
        let groups = collect(&["sim.0001.bgeo.sc", "sim.0002.bgeo.sc"]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tail, ".bgeo.sc");
    }

    #[test]
    fn test_underscore_frame_separator() {
        let groups = collect(&["plate_1001.dpx", "plate_1002.dpx"]);
        assert_eq!(groups[0].head, "plate_");
    }

    #[test]
    fn test_display() {
        let groups = collect(&["a.1001.exr", "a.1002.exr"]);
        assert_eq!(groups[0].to_string(), "a.%04d.exr [1001-1002]");
    }
}
