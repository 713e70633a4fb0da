//! Strict and generic tiers: full-structure regex matches.

use regex::{Captures, Regex};
use tracing::debug;

use super::patterns::{parse_version, strict_filename_re, GENERIC_FILENAME_RE};
use super::MatchStrategy;
use crate::model::{Confidence, MatchResult};

/// A tier that matches `{shot_code}_{subset}_{task}_{variant?}_{version}{frame?}{ext}`.
pub struct StructuralStrategy {
    name: &'static str,
    regex: Regex,
    confidence: Confidence,
}

impl StructuralStrategy {
    /// Shot code and task must come from the given lists.
    ///
    /// `None` when there are no codes or tasks to constrain against.
    pub fn strict<S: AsRef<str>>(codes: &[S], tasks: &[S]) -> Option<Self> {
        let regex = strict_filename_re(codes, tasks)?;
        debug!("Strict regular expression: {}", regex.as_str());
        Some(Self {
            name: "strict",
            regex,
            confidence: Confidence::Strict,
        })
    }

    /// Shot code and task are matched by shape only.
    pub fn generic() -> Self {
        Self {
            name: "generic",
            regex: GENERIC_FILENAME_RE.clone(),
            confidence: Confidence::Generic,
        }
    }

    fn fill(&self, caps: &Captures<'_>, path: &str) -> MatchResult {
        let group = |name: &str| caps.name(name).map(|m| m.as_str().to_string());

        let mut result = MatchResult::new(path);
        result.shot_code = group("shot_code");
        result.subset = group("subset");
        result.task = group("task");
        result.variant = group("variant");
        result.delivery_version = caps
            .name("delivery_version")
            .and_then(|m| parse_version(m.as_str()));
        if let Some(extension) = group("extension") {
            result.extension = extension;
        }
        result.frame_token = caps
            .name("frame")
            .map(|m| m.as_str().trim_start_matches('.').to_string());
        result.confidence = self.confidence;
        result
    }
}

impl MatchStrategy for StructuralStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn confidence(&self) -> Confidence {
        self.confidence
    }

    fn try_match(&self, path: &str, filename: &str) -> Option<MatchResult> {
        let caps = self.regex.captures(filename)?;
        Some(self.fill(&caps, path))
    }
}
