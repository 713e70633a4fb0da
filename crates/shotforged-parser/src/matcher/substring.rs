//! Substring tier: find a known entity code anywhere in the path.

use tracing::{debug, warn};

use super::patterns::{parse_version, FALLBACK_FILENAME_RE};
use super::MatchStrategy;
use crate::model::{Confidence, MatchResult};

/// A code found inside a longer string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainedName {
    /// Index of the winning name in the searched list.
    pub index: usize,
    /// Lowercased text that was found, with the project prefix removed when
    /// the project-stripped pass matched.
    pub matched: String,
    /// Whether the project-stripped pass produced the match.
    pub stripped: bool,
}

/// Find the first of `names` contained in `haystack`, ignoring case.
///
/// Names are tried in list order and the first hit wins, even when a later
/// name is a longer, better match. When no full name is contained, names
/// starting with `{project_code}_` are retried with that prefix removed.
///
/// ```
/// use shotforged_parser::matcher::find_containing;
///
/// let names = ["uni_pg_0455", "uni_pg_0460"];
/// let found = find_containing("/io/From_ax/pg_0460_plate_v001.mov", &names, Some("uni")).unwrap();
/// assert_eq!(found.index, 1);
/// assert_eq!(found.matched, "pg_0460");
/// assert!(found.stripped);
/// ```
pub fn find_containing<S: AsRef<str>>(
    haystack: &str,
    names: &[S],
    project_code: Option<&str>,
) -> Option<ContainedName> {
    let haystack = haystack.to_lowercase();

    let hits: Vec<usize> = names
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            let name = name.as_ref();
            !name.is_empty() && haystack.contains(&name.to_lowercase())
        })
        .map(|(index, _)| index)
        .collect();

    if let Some(&index) = hits.first() {
        if hits.len() > 1 {
            let others: Vec<&str> = hits[1..].iter().map(|i| names[*i].as_ref()).collect();
            warn!(
                "Ambiguous name match in '{}': using '{}' (first in list), also found {:?}",
                haystack,
                names[index].as_ref(),
                others
            );
        }
        return Some(ContainedName {
            index,
            matched: names[index].as_ref().to_lowercase(),
            stripped: false,
        });
    }

    let project_code = project_code.filter(|code| !code.is_empty())?;
    let prefix = format!("{}_", project_code.to_lowercase());

    let mut skipped = 0usize;
    for (index, name) in names.iter().enumerate() {
        let name = name.as_ref().to_lowercase();
        let Some(short) = name.strip_prefix(&prefix) else {
            skipped += 1;
            continue;
        };
        if !short.is_empty() && haystack.contains(short) {
            return Some(ContainedName {
                index,
                matched: short.to_string(),
                stripped: true,
            });
        }
    }

    if skipped > 0 {
        warn!(
            "{} names don't start with project code '{}', skipped them when searching without it",
            skipped, project_code
        );
    }
    None
}

/// Best-effort fields from the fallback pattern, applied to `name`.
pub(crate) fn apply_fallback(result: &mut MatchResult, name: &str) -> bool {
    let Some(caps) = FALLBACK_FILENAME_RE.captures(name) else {
        return false;
    };
    result.subset = caps.name("subset").map(|m| m.as_str().to_string());
    result.delivery_version = caps
        .name("delivery_version")
        .and_then(|m| parse_version(m.as_str()));
    if let Some(extension) = caps.name("extension") {
        result.extension = extension.as_str().to_string();
    }
    result.frame_token = caps
        .name("frame")
        .map(|m| m.as_str().trim_start_matches('.').to_string());
    true
}

/// Scans the whole path for known codes containing an underscore.
pub struct SubstringStrategy {
    codes: Vec<String>,
    project_code: Option<String>,
}

impl SubstringStrategy {
    /// Codes without an underscore are dropped: short codes false-positive
    /// too easily.
    pub fn new<S: AsRef<str>>(codes: &[S], project_code: Option<&str>) -> Self {
        let codes = codes
            .iter()
            .map(|code| code.as_ref().to_string())
            .filter(|code| code.contains('_'))
            .collect();
        Self {
            codes,
            project_code: project_code.map(str::to_string),
        }
    }
}

impl MatchStrategy for SubstringStrategy {
    fn name(&self) -> &'static str {
        "substring"
    }

    fn confidence(&self) -> Confidence {
        Confidence::Substring
    }

    fn try_match(&self, path: &str, filename: &str) -> Option<MatchResult> {
        let found = find_containing(path, &self.codes, self.project_code.as_deref())?;
        let code = &self.codes[found.index];
        debug!("Found code '{}' in path '{}'", code, path);

        let mut result = MatchResult::new(path);
        result.shot_code = Some(code.clone());
        result.confidence = Confidence::Substring;

        // Drop the code and the separator that followed it.
        let simple: String = filename
            .to_lowercase()
            .replace(&found.matched, "")
            .chars()
            .skip(1)
            .collect();
        debug!(
            "Trying fallback pattern on '{}' after removing '{}'",
            simple, found.matched
        );
        apply_fallback(&mut result, &simple);

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_in_list_wins() {
        let names = ["AB_01", "AB_010"];
        let found = find_containing("/pkg/ab_010_plate.mov", &names, None).unwrap();
        assert_eq!(found.index, 0);
        assert_eq!(found.matched, "ab_01");
    }

    #[test]
    fn test_no_match_without_project_code() {
        let names = ["uni_pg_0455"];
        assert!(find_containing("/pkg/pg_0455_plate.mov", &names, None).is_none());
    }

    #[test]
    fn test_unprefixed_names_are_skipped() {
        let names = ["other_0010", "uni_pg_0455"];
        let found = find_containing("/pkg/pg_0455_plate.mov", &names, Some("uni")).unwrap();
        assert_eq!(found.index, 1);
    }

    #[test]
    fn test_codes_without_underscore_are_ignored() {
        let strategy = SubstringStrategy::new(&["sh010", "uni_pg_0455"], None);
        let path = "/pkg/sh010/notes.txt";
        assert!(strategy.try_match(path, "notes.txt").is_none());
    }

    #[test]
    fn test_substring_derives_fields() {
        let strategy = SubstringStrategy::new(&["uni_pg_0455"], None);
        let path = "/pkg/renders/UNI_PG_0455-denoise_v004.%04d.exr";
        let result = strategy
            .try_match(path, "UNI_PG_0455-denoise_v004.%04d.exr")
            .unwrap();

        assert_eq!(result.shot_code.as_deref(), Some("uni_pg_0455"));
        assert_eq!(result.subset.as_deref(), Some("denoise"));
        assert_eq!(result.delivery_version, Some(4));
        assert_eq!(result.frame_token.as_deref(), Some("%04d"));
        assert_eq!(result.confidence, Confidence::Substring);
    }

    #[test]
    fn test_substring_code_in_directory() {
        let strategy = SubstringStrategy::new(&["uni_pg_0455"], None);
        let path = "/pkg/uni_pg_0455/tracking.nk";
        let result = strategy.try_match(path, "tracking.nk").unwrap();
        assert_eq!(result.shot_code.as_deref(), Some("uni_pg_0455"));
        assert_eq!(result.subset, None);
        assert_eq!(result.extension, ".nk");
    }
}
