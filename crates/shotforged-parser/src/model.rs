//! Match result types.

use std::fmt;

/// Which tier of the filename cascade produced a match.
///
/// Variants are ordered from most to least trustworthy, so `Strict < Substring`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Confidence {
    /// Known entity code and known task, full structure.
    Strict,
    /// Structural match with unvalidated shot code and task.
    Generic,
    /// Nothing matched; fields are best effort.
    #[default]
    Fallback,
    /// Entity code found as a substring of the path.
    Substring,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "STRICT",
            Self::Generic => "GENERIC",
            Self::Fallback => "FALLBACK",
            Self::Substring => "SUBSTRING",
        }
    }

    /// Whether a human should look at the result before it is published.
    ///
    /// ```
    /// use shotforged_parser::Confidence;
    ///
    /// assert!(!Confidence::Strict.needs_review());
    /// assert!(!Confidence::Generic.needs_review());
    /// assert!(Confidence::Substring.needs_review());
    /// ```
    pub fn needs_review(&self) -> bool {
        matches!(self, Self::Fallback | Self::Substring)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields extracted from one vendor file name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchResult {
    /// Full path the match was run against.
    pub path: String,
    pub filename: String,
    pub shot_code: Option<String>,
    pub subset: Option<String>,
    /// Always one of the known task names, or `None`.
    pub task: Option<String>,
    pub variant: Option<String>,
    pub delivery_version: Option<u32>,
    /// Extension including the leading dot, as it appears in the name.
    pub extension: String,
    /// Frame token (`1001`, `%04d`, `####`) without its separator.
    pub frame_token: Option<String>,
    pub confidence: Confidence,
}

impl MatchResult {
    /// An empty result for `path`, the starting point of every tier.
    pub fn new(path: &str) -> Self {
        let filename = path.rsplit(['/', '\\']).next().unwrap_or(path).to_string();
        let extension = match filename.rfind('.') {
            Some(idx) if idx > 0 => filename[idx..].to_string(),
            _ => String::new(),
        };
        Self {
            path: path.to_string(),
            filename,
            extension,
            ..Default::default()
        }
    }

    /// No entity code was found; the caller files this as unassigned.
    pub fn is_unassigned(&self) -> bool {
        self.shot_code.is_none()
    }

    pub fn needs_review(&self) -> bool {
        self.confidence.needs_review()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_order() {
        assert!(Confidence::Strict < Confidence::Generic);
        assert!(Confidence::Generic < Confidence::Fallback);
        assert!(Confidence::Fallback < Confidence::Substring);
    }

    #[test]
    fn test_confidence_display() {
        assert_eq!(Confidence::Strict.to_string(), "STRICT");
        assert_eq!(Confidence::Substring.to_string(), "SUBSTRING");
    }

    #[test]
    fn test_new_result() {
        let result = MatchResult::new("/proj/uni/io/From_ax/sh010_edit_v001.mov");
        assert_eq!(result.filename, "sh010_edit_v001.mov");
        assert_eq!(result.extension, ".mov");
        assert!(result.is_unassigned());
        assert_eq!(result.confidence, Confidence::Fallback);
    }

    #[test]
    fn test_new_result_without_extension() {
        let result = MatchResult::new("README");
        assert_eq!(result.extension, "");
        let hidden = MatchResult::new("/a/.hidden");
        assert_eq!(hidden.extension, "");
    }
}
